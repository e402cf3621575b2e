//! Build status badges

use serde::Serialize;

/// Outcome of the most recent build for a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    Passing,
    Failed,
}

impl BuildStatus {
    pub fn from_present(present: bool) -> Self {
        if present { Self::Passing } else { Self::Failed }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passing => "passing",
            Self::Failed => "failed",
        }
    }

    pub fn badge(self) -> Badge {
        match self {
            Self::Passing => Badge {
                label: "build",
                message: "passing",
                color: "brightgreen",
            },
            Self::Failed => Badge {
                label: "build",
                message: "failed",
                color: "red",
            },
        }
    }
}

/// Static badge rendered by an external image service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub label: &'static str,
    pub message: &'static str,
    pub color: &'static str,
}

impl Badge {
    /// Image URL under a shields-style base, e.g. `{base}/build-passing-brightgreen`
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/{}-{}-{}",
            base_url.trim_end_matches('/'),
            self.label,
            self.message,
            self.color
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://img.shields.io/badge";

    #[test]
    fn test_passing_badge() {
        let badge = BuildStatus::Passing.badge();
        assert_eq!(badge.url(BASE), "https://img.shields.io/badge/build-passing-brightgreen");
    }

    #[test]
    fn test_failed_badge() {
        let badge = BuildStatus::from_present(false).badge();
        assert_eq!(badge.url(&format!("{BASE}/")), "https://img.shields.io/badge/build-failed-red");
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&BuildStatus::Passing).unwrap(), "\"passing\"");
        assert_eq!(BuildStatus::Failed.as_str(), "failed");
    }
}
