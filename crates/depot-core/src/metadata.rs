//! Revision metadata domain model

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::Result;

/// Commit information recorded once per stored revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub revision: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub author: String,
    pub message: String,
    /// When the commit was made, not when it was uploaded
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

impl Metadata {
    /// Serialize as the indented JSON written to the metadata record
    pub fn to_json_pretty(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Strict parse of a metadata record. Missing fields are an error.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let mut metadata: Metadata = serde_json::from_slice(bytes)?;
        // Older records store an absent branch as ""
        if metadata.branch.as_deref().is_some_and(str::is_empty) {
            metadata.branch = None;
        }
        Ok(metadata)
    }

    pub fn short_revision(&self) -> &str {
        match self.revision.char_indices().nth(8) {
            Some((idx, _)) => &self.revision[..idx],
            None => &self.revision,
        }
    }
}

/// Parse the commit date sent by uploaders: `YYYY-MM-DDTHH:MM:SS±HH:MM`.
pub fn parse_commit_date(value: &str) -> Option<OffsetDateTime> {
    let format = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
    );
    OffsetDateTime::parse(value, format).ok()
}
