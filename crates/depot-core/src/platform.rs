//! Platform extraction from artifact file names
//!
//! Artifacts are discoverable only when uploaders follow the
//! `<app>-<platform>-<rest>` naming convention. The platform is the
//! shortest run of characters between the first two hyphens; a name
//! without such a segment carries no platform and is left out of the
//! listing.

use regex::Regex;
use std::sync::LazyLock;

// Matches: -linux- in app-linux-amd64.tar.gz
static PLATFORM_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-(.*?)-").unwrap());

pub fn extract_platform(filename: &str) -> Option<&str> {
    PLATFORM_REGEX
        .captures(filename)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|platform| !platform.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conventional_names() {
        assert_eq!(extract_platform("app-linux-amd64.tar.gz"), Some("linux"));
        assert_eq!(extract_platform("myapp-darwin-arm64.zip"), Some("darwin"));
        assert_eq!(extract_platform("tool-windows-x64.exe"), Some("windows"));
    }

    #[test]
    fn test_first_segment_wins() {
        assert_eq!(extract_platform("a-b-c-d"), Some("b"));
        assert_eq!(extract_platform("app-linux-musl-x86_64"), Some("linux"));
    }

    #[test]
    fn test_names_without_platform() {
        assert_eq!(extract_platform("app.zip"), None);
        assert_eq!(extract_platform("app-linux.zip"), None);
        assert_eq!(extract_platform("app--amd64.zip"), None);
        assert_eq!(extract_platform(""), None);
    }
}
