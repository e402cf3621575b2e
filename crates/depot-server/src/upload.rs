//! Artifact upload
//!
//! Commit headers are validated first and every problem is reported at
//! once. The multipart body is read completely before anything is written,
//! so a rejected upload leaves the store untouched.

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::http::{HeaderMap, StatusCode};
use depot_core::{Metadata, parse_commit_date, validate_artifact_name, validate_revision};

use crate::error::ApiError;
use crate::state::AppState;

pub const REVISION_HEADER: &str = "x-commit-revision";
pub const BRANCH_HEADER: &str = "x-commit-branch";
pub const AUTHOR_HEADER: &str = "x-commit-author";
pub const MESSAGE_HEADER: &str = "x-commit-message";
pub const DATE_HEADER: &str = "x-commit-date";

/// Multipart field carrying the artifact
pub const FILE_FIELD: &str = "file";

/// POST /api/upload
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<StatusCode, ApiError> {
    let metadata = commit_metadata(&headers).map_err(ApiError::Validation)?;
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let (filename, content) = read_file_field(&mut multipart).await?;

    tracing::info!("Uploading {} (rev: {})", filename, metadata.revision);
    state.store.save(&metadata, &filename, &content).await?;

    Ok(StatusCode::CREATED)
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
        .filter(|value| !value.is_empty())
}

/// Build metadata from the `X-Commit-*` headers
pub fn commit_metadata(headers: &HeaderMap) -> Result<Metadata, Vec<String>> {
    let mut errors = Vec::new();

    let date = header(headers, DATE_HEADER).and_then(parse_commit_date);
    if date.is_none() {
        errors.push("Missing X-Commit-Date header or invalid date format".to_string());
    }

    let revision = header(headers, REVISION_HEADER);
    match revision {
        None => errors.push("Missing X-Commit-Revision header".to_string()),
        Some(rev) if validate_revision(rev).is_err() => {
            errors.push(format!("Invalid X-Commit-Revision header: {}", rev));
        }
        Some(_) => {}
    }

    let author = header(headers, AUTHOR_HEADER);
    if author.is_none() {
        errors.push("Missing X-Commit-Author header".to_string());
    }

    let message = header(headers, MESSAGE_HEADER);
    if message.is_none() {
        errors.push("Missing X-Commit-Message header".to_string());
    }

    match (revision, author, message, date) {
        (Some(revision), Some(author), Some(message), Some(date)) if errors.is_empty() => {
            Ok(Metadata {
                revision: revision.to_string(),
                branch: header(headers, BRANCH_HEADER).map(str::to_string),
                author: author.to_string(),
                message: message.to_string(),
                date,
            })
        }
        _ => Err(errors),
    }
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::BadRequest(e.body_text())
    }
}

/// Strip any client-side directory from an uploaded file name
fn base_name(filename: &str) -> &str {
    filename.rsplit(['/', '\\']).next().unwrap_or(filename)
}

async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Bytes), ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().map(base_name).unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(ApiError::Validation(vec![
                "Missing file name for file form field".to_string(),
            ]));
        }
        if validate_artifact_name(&filename).is_err() {
            return Err(ApiError::Validation(vec![format!(
                "Invalid file name: {}",
                filename
            )]));
        }

        let content = field.bytes().await.map_err(multipart_error)?;
        return Ok((filename, content));
    }

    Err(ApiError::Validation(vec![
        "Missing file form field".to_string(),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    fn complete() -> Vec<(&'static str, &'static str)> {
        vec![
            (REVISION_HEADER, "3f2a9c1d"),
            (AUTHOR_HEADER, "Jane Doe"),
            (MESSAGE_HEADER, "Fix packaging"),
            (DATE_HEADER, "2024-03-01T12:00:00+01:00"),
        ]
    }

    #[test]
    fn test_complete_headers() {
        let metadata = commit_metadata(&headers(&complete())).unwrap();
        assert_eq!(metadata.revision, "3f2a9c1d");
        assert_eq!(metadata.branch, None);
        assert_eq!(metadata.date.year(), 2024);
    }

    #[test]
    fn test_branch_is_optional() {
        let mut pairs = complete();
        pairs.push((BRANCH_HEADER, "release/1.2"));
        let metadata = commit_metadata(&headers(&pairs)).unwrap();
        assert_eq!(metadata.branch.as_deref(), Some("release/1.2"));
    }

    #[test]
    fn test_one_message_per_missing_field() {
        let errors = commit_metadata(&HeaderMap::new()).unwrap_err();
        assert_eq!(
            errors,
            vec![
                "Missing X-Commit-Date header or invalid date format",
                "Missing X-Commit-Revision header",
                "Missing X-Commit-Author header",
                "Missing X-Commit-Message header",
            ]
        );
    }

    #[test]
    fn test_single_missing_field() {
        let pairs: Vec<_> = complete()
            .into_iter()
            .filter(|(name, _)| *name != AUTHOR_HEADER)
            .collect();
        let errors = commit_metadata(&headers(&pairs)).unwrap_err();
        assert_eq!(errors, vec!["Missing X-Commit-Author header"]);
    }

    #[test]
    fn test_invalid_date_and_revision() {
        let mut pairs = complete();
        pairs[0] = (REVISION_HEADER, "../../etc");
        pairs[3] = (DATE_HEADER, "yesterday");
        let errors = commit_metadata(&headers(&pairs)).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("invalid date format"));
        assert!(errors[1].starts_with("Invalid X-Commit-Revision header"));
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("app-linux-amd64.zip"), "app-linux-amd64.zip");
        assert_eq!(base_name("build/out/app-linux-amd64.zip"), "app-linux-amd64.zip");
        assert_eq!(base_name("C:\\out\\app-windows-x64.exe"), "app-windows-x64.exe");
    }
}
