//! Error types for depot-storage

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    /// The store root itself cannot be read
    #[error("Store unavailable at {}: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Revision not found: {0}")]
    RevisionNotFound(String),

    #[error("Artifact not found: {revision}/{filename}")]
    ArtifactNotFound { revision: String, filename: String },

    #[error("Metadata unreadable for revision {revision}: {reason}")]
    MetadataUnreadable { revision: String, reason: String },

    #[error(transparent)]
    Core(#[from] depot_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RevisionNotFound(_)
                | Self::ArtifactNotFound { .. }
                | Self::MetadataUnreadable { .. }
        )
    }
}
