//! Listing builder and resolution policies
//!
//! The listing is rebuilt from a [`StoreSnapshot`] on every request and is
//! ordered newest-first by commit date. Both policies below depend on that
//! ordering: "latest" is the first match and "status" is the head entry.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::badge::BuildStatus;
use crate::layout::is_reserved_name;
use crate::metadata::Metadata;
use crate::platform::extract_platform;

/// One revision directory as read from the store, in scan order
#[derive(Debug, Clone)]
pub struct RevisionSnapshot {
    /// Directory name, which is the revision identifier
    pub name: String,
    /// `None` when the metadata record is missing or unreadable
    pub metadata: Option<Metadata>,
    /// Every entry of the directory, reserved names included
    pub files: Vec<String>,
}

/// Raw view of the whole store handed to [`Listing::build`]
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub revisions: Vec<RevisionSnapshot>,
}

/// A revision together with its artifacts keyed by platform
#[derive(Debug, Clone, Serialize)]
pub struct ListingEntry {
    #[serde(flatten)]
    pub metadata: Metadata,
    /// platform -> artifact file name
    pub artifacts: BTreeMap<String, String>,
}

impl ListingEntry {
    pub fn revision(&self) -> &str {
        &self.metadata.revision
    }
}

/// Location of one artifact in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactRef<'a> {
    pub revision: &'a str,
    pub filename: &'a str,
}

impl ArtifactRef<'_> {
    /// `{base}/{revision}/{filename}` with both segments percent-encoded
    pub fn location(&self, base: &str) -> String {
        format!(
            "{}/{}/{}",
            base.trim_end_matches('/'),
            urlencoding::encode(self.revision),
            urlencoding::encode(self.filename)
        )
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Listing {
    entries: Vec<ListingEntry>,
}

impl Listing {
    /// Build the ordered listing.
    ///
    /// Revisions without metadata are dropped. Within a revision, a later
    /// file in scan order replaces an earlier one with the same platform.
    /// Entries are sorted newest-first; equal dates keep scan order.
    pub fn build(snapshot: StoreSnapshot) -> Self {
        let mut entries: Vec<ListingEntry> = snapshot
            .revisions
            .into_iter()
            .filter_map(|revision| {
                let mut metadata = revision.metadata?;
                // The directory name is authoritative for links
                metadata.revision = revision.name;

                let mut artifacts = BTreeMap::new();
                for file in revision.files {
                    if is_reserved_name(&file) {
                        continue;
                    }
                    let platform = match extract_platform(&file) {
                        Some(platform) => platform.to_owned(),
                        None => continue,
                    };
                    artifacts.insert(platform, file);
                }

                Some(ListingEntry {
                    metadata,
                    artifacts,
                })
            })
            .collect();

        entries.sort_by(|a, b| b.metadata.date.cmp(&a.metadata.date));

        Self { entries }
    }

    pub fn entries(&self) -> &[ListingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn newest(&self) -> Option<&ListingEntry> {
        self.entries.first()
    }

    /// Artifact for `platform` from the newest revision that has one
    pub fn latest_artifact(&self, platform: &str) -> Option<ArtifactRef<'_>> {
        self.entries.iter().find_map(|entry| {
            entry.artifacts.get(platform).map(|filename| ArtifactRef {
                revision: entry.revision(),
                filename,
            })
        })
    }

    /// Status of the newest revision only. `None` when nothing is stored.
    pub fn build_status(&self, platform: &str) -> Option<BuildStatus> {
        self.newest()
            .map(|entry| BuildStatus::from_present(entry.artifacts.contains_key(platform)))
    }

    /// Every platform seen across the listing, sorted
    pub fn platforms(&self) -> Vec<&str> {
        let mut platforms: Vec<&str> = self
            .entries
            .iter()
            .flat_map(|entry| entry.artifacts.keys().map(String::as_str))
            .collect();
        platforms.sort_unstable();
        platforms.dedup();
        platforms
    }
}
