//! HTML build index

use std::fmt::Write;
use std::time::Duration;

use depot_core::{ArtifactRef, Listing, ListingEntry};
use time::OffsetDateTime;
use time::macros::format_description;

const TEMPLATE: &str = include_str!("index.html");

/// Render the listing into the index page
pub fn render_index(
    listing: &Listing,
    link_base: &str,
    updated_at: OffsetDateTime,
    generation_time: Duration,
) -> String {
    let mut rows = String::new();
    if listing.is_empty() {
        rows.push_str("<tr><td colspan=\"6\" class=\"empty\">No builds uploaded yet.</td></tr>\n");
    }
    for entry in listing.entries() {
        render_row(&mut rows, entry, link_base);
    }

    let updated_at = updated_at
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second] UTC"
        ))
        .unwrap_or_default();

    TEMPLATE
        .replace("{{rows}}", &rows)
        .replace("{{count}}", &listing.len().to_string())
        .replace("{{updated_at}}", &updated_at)
        .replace("{{generation_time}}", &format!("{:?}", generation_time))
}

fn render_row(out: &mut String, entry: &ListingEntry, link_base: &str) {
    let metadata = &entry.metadata;
    let date = metadata
        .date
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute] [offset_hour sign:mandatory]:[offset_minute]"
        ))
        .unwrap_or_default();

    let mut links = String::new();
    for (platform, filename) in &entry.artifacts {
        let href = ArtifactRef {
            revision: entry.revision(),
            filename,
        }
        .location(link_base);
        let _ = write!(
            links,
            "<a href=\"{}\" title=\"{}\">{}</a>",
            escape(&href),
            escape(filename),
            escape(platform)
        );
    }

    let _ = writeln!(
        out,
        "<tr><td><code title=\"{}\">{}</code></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"artifacts\">{}</td></tr>",
        escape(&metadata.revision),
        escape(metadata.short_revision()),
        escape(metadata.branch.as_deref().unwrap_or("")),
        escape(&metadata.author),
        escape(&metadata.message),
        escape(&date),
        links
    );
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            // Keeps template placeholders out of user text
            '{' => escaped.push_str("&#123;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_core::{Metadata, RevisionSnapshot, StoreSnapshot};
    use time::macros::datetime;

    fn listing() -> Listing {
        Listing::build(StoreSnapshot {
            revisions: vec![RevisionSnapshot {
                name: "3f2a9c1d7be04e55".to_string(),
                metadata: Some(Metadata {
                    revision: "3f2a9c1d7be04e55".to_string(),
                    branch: Some("main".to_string()),
                    author: "Jane <jane@example.com>".to_string(),
                    message: "Fix \"quoted\" build".to_string(),
                    date: datetime!(2024-03-01 12:30 +01:00),
                }),
                files: vec![
                    "app-darwin-arm64.zip".to_string(),
                    "app-linux-amd64.tar.gz".to_string(),
                ],
            }],
        })
    }

    #[test]
    fn test_render_rows() {
        let html = render_index(
            &listing(),
            "/d",
            datetime!(2024-03-02 08:00 UTC),
            Duration::from_millis(3),
        );

        assert!(html.contains("<code title=\"3f2a9c1d7be04e55\">3f2a9c1d</code>"));
        assert!(html.contains("href=\"/d/3f2a9c1d7be04e55/app-linux-amd64.tar.gz\""));
        assert!(html.contains(">darwin</a>"));
        assert!(html.contains("2024-03-01 12:30 +01:00"));
        assert!(html.contains("Updated at 2024-03-02 08:00:00 UTC, generated in 3ms"));
        assert!(html.contains("1 revisions."));
    }

    #[test]
    fn test_render_escapes_metadata() {
        let html = render_index(&listing(), "/d", OffsetDateTime::UNIX_EPOCH, Duration::ZERO);
        assert!(html.contains("Jane &lt;jane@example.com&gt;"));
        assert!(html.contains("Fix &quot;quoted&quot; build"));
        assert!(!html.contains("<jane@"));
    }

    #[test]
    fn test_render_empty() {
        let html = render_index(
            &Listing::default(),
            "/d",
            OffsetDateTime::UNIX_EPOCH,
            Duration::ZERO,
        );
        assert!(html.contains("No builds uploaded yet."));
        assert!(!html.contains("{{"));
    }
}
