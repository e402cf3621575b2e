//! Artifact store capability

use async_trait::async_trait;
use depot_core::{Metadata, RevisionSnapshot, StoreSnapshot};

use crate::Result;

/// Durable storage of revisions and their artifact files
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Write the metadata record and one artifact for `metadata.revision`.
    /// Both overwrite whatever was stored under the same names.
    async fn save(&self, metadata: &Metadata, filename: &str, content: &[u8]) -> Result<()>;

    /// Read the metadata record of a revision
    async fn read_metadata(&self, revision: &str) -> Result<Metadata>;

    /// Names of all revision directories, in scan order
    async fn list_revisions(&self) -> Result<Vec<String>>;

    /// Every entry of a revision directory, reserved names included
    async fn list_files(&self, revision: &str) -> Result<Vec<String>>;

    /// Content of a stored artifact
    async fn read_artifact(&self, revision: &str, filename: &str) -> Result<Vec<u8>>;

    /// Gather everything the listing builder needs.
    ///
    /// Only a failure to enumerate revisions is an error. A revision whose
    /// metadata cannot be read is reported without metadata, and one whose
    /// files cannot be listed is reported with none.
    async fn snapshot(&self) -> Result<StoreSnapshot> {
        let names = self.list_revisions().await?;
        let mut revisions = Vec::with_capacity(names.len());

        for name in names {
            let metadata = match self.read_metadata(&name).await {
                Ok(metadata) => Some(metadata),
                Err(e) => {
                    tracing::debug!(revision = %name, error = %e, "skipping revision metadata");
                    None
                }
            };

            let files = if metadata.is_some() {
                self.list_files(&name).await.unwrap_or_else(|e| {
                    tracing::warn!(revision = %name, error = %e, "cannot list revision files");
                    Vec::new()
                })
            } else {
                Vec::new()
            };

            revisions.push(RevisionSnapshot {
                name,
                metadata,
                files,
            });
        }

        Ok(StoreSnapshot { revisions })
    }
}
