//! Core domain models and logic for depot
//!
//! This crate contains:
//! - Domain models (Metadata, Listing, Badge)
//! - Platform matching for artifact file names
//! - Listing builder and resolution policies (latest artifact, build status)
//!
//! Nothing in here touches the filesystem; the store hands over a
//! [`StoreSnapshot`] and everything else is computed from it.

pub mod badge;
pub mod error;
pub mod layout;
pub mod listing;
pub mod metadata;
pub mod platform;

pub use badge::{Badge, BuildStatus};
pub use error::{Error, Result};
pub use layout::{METADATA_FILE, is_reserved_name, validate_artifact_name, validate_revision};
pub use listing::{ArtifactRef, Listing, ListingEntry, RevisionSnapshot, StoreSnapshot};
pub use metadata::{Metadata, parse_commit_date};
pub use platform::extract_platform;
