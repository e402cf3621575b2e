//! Storage layer for depot
//!
//! This crate provides:
//! - The `ArtifactStore` capability consumed by the server
//! - A filesystem implementation keyed by revision directory

pub mod error;
pub mod fs;
pub mod store;

pub use error::{Result, StorageError};
pub use fs::FsStore;
pub use store::ArtifactStore;
