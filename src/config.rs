//! Editor settings: which server to talk to and where exports go.

use crate::{HttpMapService, MapService, OfflineMapService, TransportError};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Env var naming a config file to read instead of the default
pub const CONFIG_PATH_ENV: &str = "GRID_MAP_EDITOR_CONFIG";
/// Env var overriding the server URL (`offline` for the in-process service)
pub const SERVER_ENV: &str = "GRID_MAP_EDITOR_SERVER";
/// Env var overriding the export directory
pub const OUTPUT_DIR_ENV: &str = "GRID_MAP_EDITOR_OUTPUT_DIR";

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "grid_map_editor.toml";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

const OFFLINE: &str = "offline";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Map server base URL; absent or `"offline"` uses the in-process service
    pub server_url: Option<String>,

    /// Directory exported maps are written to
    pub output_dir: PathBuf,

    pub request_timeout_secs: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            server_url: Some(DEFAULT_SERVER_URL.to_string()),
            output_dir: PathBuf::from("."),
            request_timeout_secs: 30,
        }
    }
}

impl EditorConfig {
    /// Load from the environment: config file (if any), then env overrides
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()));

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_overrides(
            std::env::var(SERVER_ENV).ok(),
            std::env::var(OUTPUT_DIR_ENV).ok(),
        );
        Ok(config)
    }

    /// Read a TOML config file; missing keys take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Self = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Apply env-style overrides on top of the file values
    pub fn apply_overrides(&mut self, server: Option<String>, output_dir: Option<String>) {
        if let Some(server) = server.filter(|s| !s.trim().is_empty()) {
            self.server_url = Some(server.trim().to_string());
        }
        if let Some(dir) = output_dir.filter(|d| !d.trim().is_empty()) {
            self.output_dir = PathBuf::from(dir);
        }
    }

    /// Server URL, or `None` when the offline service should be used
    pub fn server_url(&self) -> Option<&str> {
        self.server_url
            .as_deref()
            .filter(|url| !url.eq_ignore_ascii_case(OFFLINE))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The service this config points at
    pub fn build_service(&self) -> Result<Arc<dyn MapService>, TransportError> {
        match self.server_url() {
            Some(url) => {
                info!(url, "Using map server");
                Ok(Arc::new(HttpMapService::new(url, self.request_timeout())?))
            }
            None => {
                info!("Using offline map service");
                Ok(Arc::new(OfflineMapService::new()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();

        assert_eq!(config.server_url(), Some(DEFAULT_SERVER_URL));
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("editor.toml");
        std::fs::write(&path, "output_dir = \"maps\"\n").unwrap();

        let config = EditorConfig::from_file(&path).unwrap();

        assert_eq!(config.output_dir, PathBuf::from("maps"));
        assert_eq!(config.server_url(), Some(DEFAULT_SERVER_URL));
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_full_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("editor.toml");
        std::fs::write(
            &path,
            "server_url = \"http://maps.local:8080/\"\noutput_dir = \"/tmp/out\"\nrequest_timeout_secs = 5\n",
        )
        .unwrap();

        let config = EditorConfig::from_file(&path).unwrap();

        assert_eq!(config.server_url(), Some("http://maps.local:8080/"));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_bad_file_names_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.toml");
        std::fs::write(&path, "request_timeout_secs = \"soon\"").unwrap();

        let err = EditorConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));

        let missing = EditorConfig::from_file(&temp_dir.path().join("absent.toml"));
        assert!(missing.is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = EditorConfig::default();

        config.apply_overrides(Some("offline".to_string()), Some("exports".to_string()));
        assert_eq!(config.server_url(), None);
        assert_eq!(config.output_dir, PathBuf::from("exports"));

        // Blank values leave the current setting alone
        config.apply_overrides(Some("  ".to_string()), None);
        assert_eq!(config.server_url(), None);
    }

    #[test]
    fn test_build_offline_service() {
        let mut config = EditorConfig::default();
        config.server_url = None;

        let service = config.build_service().unwrap();

        assert_eq!(
            service.fetch_example().unwrap(),
            OfflineMapService::example_payload()
        );
    }
}
