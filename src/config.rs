use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Endpoint used when neither the config file nor the environment names one
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/api/chat";

/// Text shown in place of a reply when a request fails
pub const DEFAULT_FALLBACK_MESSAGE: &str = "connection failed";

/// Environment variable that overrides the configured endpoint
pub const ENDPOINT_ENV: &str = "MURMUR_ENDPOINT";

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chat endpoint receiving `{"message": ...}` POSTs
    pub endpoint: String,

    /// Reply text used for any failed request
    pub fallback_message: String,

    /// Delay between two reveal steps, in milliseconds
    pub reveal_interval_ms: u64,

    /// Upper bound on a single request, in seconds
    pub request_timeout_secs: u64,

    /// UI preferences
    pub ui: UiConfig,
}

/// UI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub title: String,
    pub tagline: String,
    pub show_timestamps: bool,
    pub scroll_step: u16,
}

/// Values passed on the command line; they win over file and environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub reveal_interval_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
            reveal_interval_ms: 30,
            request_timeout_secs: 60,
            ui: UiConfig::default(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            title: "murmur".to_string(),
            tagline: "say something and watch it answer".to_string(),
            show_timestamps: true,
            scroll_step: 5,
        }
    }
}

impl Config {
    /// Directory holding the config file and logs (`~/.murmur`)
    pub fn home_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".murmur"))
    }

    /// Location of the default config file
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join("config.toml"))
    }

    /// Load a config file (defaults when absent), then apply the environment
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::read_from(path)?;
        config.apply_endpoint_override(std::env::var(ENDPOINT_ENV).ok());
        Ok(config)
    }

    /// Read a config file without consulting the environment
    pub fn read_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Save configuration as pretty TOML
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Replace the endpoint with a non-blank value from the environment
    pub fn apply_endpoint_override(&mut self, value: Option<String>) {
        if let Some(endpoint) = value.filter(|v| !v.trim().is_empty()) {
            self.endpoint = endpoint.trim().to_string();
        }
    }

    /// Apply command line values
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(endpoint) = &overrides.endpoint {
            self.endpoint = endpoint.clone();
        }
        if let Some(interval) = overrides.reveal_interval_ms {
            self.reveal_interval_ms = interval;
        }
        if let Some(timeout) = overrides.request_timeout_secs {
            self.request_timeout_secs = timeout;
        }
    }

    /// Reveal step; never zero since tokio intervals reject a zero period
    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::read_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.fallback_message, "connection failed");
        assert_eq!(config.reveal_interval(), Duration::from_millis(30));
    }

    #[test]
    fn save_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.endpoint = "https://chat.example.com/api".to_string();
        config.ui.show_timestamps = false;
        config.save_to(&path).unwrap();

        assert_eq!(Config::read_from(&path).unwrap(), config);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "endpoint = \"http://10.0.0.2/chat\"\n[ui]\ntitle = \"hey\"\n").unwrap();

        let config = Config::read_from(&path).unwrap();
        assert_eq!(config.endpoint, "http://10.0.0.2/chat");
        assert_eq!(config.ui.title, "hey");
        assert_eq!(config.ui.scroll_step, 5);
        assert_eq!(config.request_timeout_secs, 60);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "endpoint = [").unwrap();

        let err = Config::read_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }

    #[test]
    fn endpoint_override_ignores_blank_values() {
        let mut config = Config::default();
        config.apply_endpoint_override(Some("   ".to_string()));
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);

        config.apply_endpoint_override(Some(" http://override/chat ".to_string()));
        assert_eq!(config.endpoint, "http://override/chat");
    }

    #[test]
    fn command_line_overrides_win() {
        let mut config = Config::default();
        config.apply_overrides(&ConfigOverrides {
            endpoint: Some("http://cli/chat".to_string()),
            reveal_interval_ms: Some(0),
            request_timeout_secs: Some(5),
        });

        assert_eq!(config.endpoint, "http://cli/chat");
        assert_eq!(config.reveal_interval(), Duration::from_millis(1));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }
}
