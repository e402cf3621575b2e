//! Filesystem-backed artifact store
//!
//! Layout: `<root>/<revision>/.metadata.json` plus sibling artifact files.
//! Directory entries are returned sorted by name so scan order is the same
//! on every platform.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use depot_core::layout::staging_name;
use depot_core::{METADATA_FILE, Metadata, validate_artifact_name, validate_revision};
use uuid::Uuid;

use crate::{ArtifactStore, Result, StorageError};

/// Artifact store rooted at a local directory
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open a store, creating the root directory if it doesn't exist
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| StorageError::Unavailable {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// Open an existing store without creating anything
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        match std::fs::metadata(&root) {
            Ok(meta) if meta.is_dir() => Ok(Self { root }),
            Ok(_) => Err(StorageError::Unavailable {
                path: root,
                source: std::io::Error::new(ErrorKind::NotADirectory, "not a directory"),
            }),
            Err(source) => Err(StorageError::Unavailable { path: root, source }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn revision_dir(&self, revision: &str) -> Result<PathBuf> {
        validate_revision(revision)?;
        Ok(self.root.join(revision))
    }

    fn unavailable(&self, source: std::io::Error) -> StorageError {
        StorageError::Unavailable {
            path: self.root.clone(),
            source,
        }
    }
}

/// Write `content` to a hidden sibling and rename it over `dir/name`
async fn write_staged(dir: &Path, name: &str, content: &[u8]) -> Result<()> {
    let staging = dir.join(staging_name(name, &Uuid::new_v4().simple().to_string()));
    let target = dir.join(name);

    let written = match tokio::fs::write(&staging, content).await {
        Ok(()) => tokio::fs::rename(&staging, &target).await,
        Err(e) => Err(e),
    };

    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(e.into());
    }
    Ok(())
}

async fn sorted_entries(dir: &Path, want_dirs: bool) -> std::io::Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
        if is_dir != want_dirs {
            continue;
        }
        // Non UTF-8 names can't be revisions or artifact names
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}

#[async_trait]
impl ArtifactStore for FsStore {
    async fn save(&self, metadata: &Metadata, filename: &str, content: &[u8]) -> Result<()> {
        let dir = self.revision_dir(&metadata.revision)?;
        validate_artifact_name(filename)?;
        let record = metadata.to_json_pretty()?;

        tokio::fs::create_dir_all(&dir).await?;

        // Artifact first: a new revision only shows up once its record exists
        write_staged(&dir, filename, content).await?;
        write_staged(&dir, METADATA_FILE, &record).await?;

        tracing::debug!(
            revision = %metadata.revision,
            file = %filename,
            bytes = content.len(),
            "stored artifact"
        );
        Ok(())
    }

    async fn read_metadata(&self, revision: &str) -> Result<Metadata> {
        let path = self.revision_dir(revision)?.join(METADATA_FILE);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::RevisionNotFound(revision.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        Metadata::from_json(&bytes).map_err(|e| StorageError::MetadataUnreadable {
            revision: revision.to_string(),
            reason: e.to_string(),
        })
    }

    async fn list_revisions(&self) -> Result<Vec<String>> {
        let names = sorted_entries(&self.root, true)
            .await
            .map_err(|e| self.unavailable(e))?;

        Ok(names
            .into_iter()
            .filter(|name| validate_revision(name).is_ok())
            .collect())
    }

    async fn list_files(&self, revision: &str) -> Result<Vec<String>> {
        let dir = self.revision_dir(revision)?;
        match sorted_entries(&dir, false).await {
            Ok(names) => Ok(names),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::RevisionNotFound(revision.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn read_artifact(&self, revision: &str, filename: &str) -> Result<Vec<u8>> {
        let dir = self.revision_dir(revision)?;
        validate_artifact_name(filename)?;
        let path = dir.join(filename);

        let not_found = || StorageError::ArtifactNotFound {
            revision: revision.to_string(),
            filename: filename.to_string(),
        };

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(not_found()),
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        }

        Ok(tokio::fs::read(&path).await?)
    }
}
