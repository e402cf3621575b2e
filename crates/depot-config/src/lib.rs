use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the depot server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root of the artifact store
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Bearer token required for uploads. Usually supplied as `API_TOKEN`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub artifacts: ArtifactsConfig,

    #[serde(default)]
    pub badge: BadgeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// Path prefix under which artifacts are served
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Absolute origin prepended to artifact links, e.g. `https://builds.example.com`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeConfig {
    #[serde(default = "default_badge_url")]
    pub base_url: String,

    #[serde(default)]
    pub mode: BadgeMode,
}

/// How `/status/{platform}` answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BadgeMode {
    /// Serve the badge image bytes
    #[default]
    Inline,
    /// Redirect to the badge image URL
    Redirect,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            api_token: None,
            server: ServerConfig::default(),
            artifacts: ArtifactsConfig::default(),
            badge: BadgeConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            public_url: None,
        }
    }
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self {
            base_url: default_badge_url(),
            mode: BadgeMode::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload_bytes() -> usize {
    100 * 1024 * 1024
}

fn default_base_path() -> String {
    "/d".to_string()
}

fn default_badge_url() -> String {
    "https://img.shields.io/badge".to_string()
}

impl ArtifactsConfig {
    /// Prefix for artifact links: `public_url` + `base_path`
    pub fn link_base(&self) -> String {
        let path = self.base_path.trim_end_matches('/');
        match &self.public_url {
            Some(origin) => format!("{}{}", origin.trim_end_matches('/'), path),
            None => path.to_string(),
        }
    }
}

impl Config {
    /// Load config from `path`, or from the default location when it exists,
    /// then apply environment overrides
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Config::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// `API_TOKEN`, `PORT` and `DEPOT_DATA_DIR` take precedence over the file
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("API_TOKEN") {
            self.api_token = Some(token);
        }
        if let Some(port) = lookup("PORT").filter(|p| !p.is_empty()) {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid PORT: {}", port))?;
        }
        if let Some(dir) = lookup("DEPOT_DATA_DIR").filter(|d| !d.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Checks needed before serving
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_token().is_none() {
            bail!("API_TOKEN env not specified");
        }
        let base = &self.artifacts.base_path;
        if !base.starts_with('/') || base.trim_end_matches('/').is_empty() {
            bail!("artifacts.base_path must be a non-root absolute path: {}", base);
        }
        Ok(())
    }

    /// Upload token, if one is configured and not blank
    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "depot", "depot") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.depot/config.toml")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.max_upload_bytes, 100 * 1024 * 1024);
        assert_eq!(config.artifacts.base_path, "/d");
        assert_eq!(config.badge.mode, BadgeMode::Inline);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(parsed.badge.base_url, config.badge.base_url);
    }

    #[test]
    fn test_partial_file() {
        let parsed: Config = toml::from_str(
            r#"
            data_dir = "/srv/builds"

            [badge]
            mode = "redirect"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.data_dir, PathBuf::from("/srv/builds"));
        assert_eq!(parsed.badge.mode, BadgeMode::Redirect);
        assert_eq!(parsed.server.host, "0.0.0.0");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("depot.toml");
        std::fs::write(&path, "[server]\nport = 9000\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert!(Config::from_file(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("API_TOKEN", "s3cret"),
                ("PORT", "9090"),
                ("DEPOT_DATA_DIR", "/var/lib/depot"),
            ]))
            .unwrap();

        assert_eq!(config.api_token(), Some("s3cret"));
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/depot"));
    }

    #[test]
    fn test_invalid_port() {
        let mut config = Config::default();
        assert!(config.apply_env(env(&[("PORT", "http")])).is_err());
    }

    #[test]
    fn test_validate_requires_token() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config.api_token = Some("   ".to_string());
        assert!(config.validate().is_err());

        config.api_token = Some("s3cret".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_base_path() {
        let mut config = Config {
            api_token: Some("s3cret".to_string()),
            ..Config::default()
        };
        config.artifacts.base_path = "d".to_string();
        assert!(config.validate().is_err());
        config.artifacts.base_path = "/".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_link_base() {
        let mut artifacts = ArtifactsConfig::default();
        assert_eq!(artifacts.link_base(), "/d");

        artifacts.public_url = Some("https://builds.example.com/".to_string());
        assert_eq!(artifacts.link_base(), "https://builds.example.com/d");
    }
}
