//! Naming rules for the on-disk store layout
//!
//! `<root>/<revision>/.metadata.json` holds the metadata record and every
//! other file in the revision directory is an artifact. Revisions and
//! artifact names become path components, so both are restricted to a
//! single non-hidden segment.

use crate::{Error, Result};

/// Reserved name of the metadata record inside a revision directory
pub const METADATA_FILE: &str = ".metadata.json";

/// Suffix of in-flight files written before being renamed into place
pub const STAGING_SUFFIX: &str = ".partial";

/// Longest path component most filesystems accept, in bytes
pub const MAX_COMPONENT_LEN: usize = 255;

/// Bytes a staging name adds around the target name: two dots, a 32-digit
/// nonce and the suffix
const STAGING_OVERHEAD: usize = 2 + 32 + STAGING_SUFFIX.len();

/// Longest artifact name whose staging sibling still fits in one component
pub const MAX_ARTIFACT_NAME_LEN: usize = MAX_COMPONENT_LEN - STAGING_OVERHEAD;

/// Names inside a revision directory that are never artifacts
pub fn is_reserved_name(name: &str) -> bool {
    name == METADATA_FILE || (name.starts_with('.') && name.ends_with(STAGING_SUFFIX))
}

/// Hidden sibling name used while `name` is being written
pub fn staging_name(name: &str, nonce: &str) -> String {
    format!(".{name}.{nonce}{STAGING_SUFFIX}")
}

pub fn validate_revision(revision: &str) -> Result<()> {
    validate_component("revision", revision, MAX_COMPONENT_LEN)
}

pub fn validate_artifact_name(filename: &str) -> Result<()> {
    validate_component("file name", filename, MAX_ARTIFACT_NAME_LEN)
}

fn validate_component(kind: &str, value: &str, max_len: usize) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidName(format!("{kind} must not be empty")));
    }
    if value.contains(['/', '\\', '\0']) {
        return Err(Error::InvalidName(format!(
            "{kind} must not contain path separators: {value}"
        )));
    }
    if value.starts_with('.') {
        return Err(Error::InvalidName(format!(
            "{kind} must not start with '.': {value}"
        )));
    }
    if value.len() > max_len {
        return Err(Error::InvalidName(format!(
            "{kind} is longer than {max_len} bytes"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_names() {
        assert!(is_reserved_name(METADATA_FILE));
        assert!(is_reserved_name(&staging_name("app-linux-amd64.tar.gz", "1234")));
        assert!(!is_reserved_name("app-linux-amd64.tar.gz"));
        assert!(!is_reserved_name("notes.partial"));
    }

    #[test]
    fn test_valid_components() {
        assert!(validate_revision("3f2a9c1d7be04e55").is_ok());
        assert!(validate_revision("v1.2.0").is_ok());
        assert!(validate_artifact_name("app-linux-amd64.tar.gz").is_ok());
    }

    #[test]
    fn test_rejects_traversal_and_hidden_names() {
        for bad in ["", ".", "..", "../etc", "a/b", "a\\b", ".metadata.json", ".hidden"] {
            assert!(validate_revision(bad).is_err(), "accepted {bad:?}");
            assert!(validate_artifact_name(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_artifact_name_leaves_room_for_staging() {
        let longest = format!("app-linux-{}", "a".repeat(MAX_ARTIFACT_NAME_LEN - 10));
        assert!(validate_artifact_name(&longest).is_ok());
        let staged = staging_name(&longest, &"0".repeat(32));
        assert_eq!(staged.len(), MAX_COMPONENT_LEN);

        let too_long = format!("{longest}a");
        assert!(validate_artifact_name(&too_long).is_err());
        assert!(validate_revision(&too_long).is_ok());
        assert!(validate_revision(&"r".repeat(MAX_COMPONENT_LEN + 1)).is_err());
    }
}
