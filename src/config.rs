// ⚙️ Configuration - TOML file with serde defaults
//
// Lookup order: --config flag, then <config_dir>/cma-dashboard/config.toml.
// A missing file yields the defaults; a malformed one is an error.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_DIR: &str = "cma-dashboard";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub database_file: String,
    pub mls: MlsConfig,
    pub server: ServerConfig,
    pub notifications: NotificationConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MlsConfig {
    pub delay_ms: u64,
    pub timeout_ms: u64,
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub success_ms: u64,
    pub error_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoAccount {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub accounts: Vec<DemoAccount>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: default_data_dir(),
            database_file: "cma.db".to_string(),
            mls: MlsConfig::default(),
            server: ServerConfig::default(),
            notifications: NotificationConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl Default for MlsConfig {
    fn default() -> Self {
        MlsConfig {
            delay_ms: 1500,
            timeout_ms: 10_000,
            debounce_ms: 1000,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        NotificationConfig {
            success_ms: 3000,
            error_ms: 5000,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            accounts: vec![
                DemoAccount {
                    email: "demo@example.com".to_string(),
                    password: "demo123".to_string(),
                },
                DemoAccount {
                    email: "agent@example.com".to_string(),
                    password: "agent123".to_string(),
                },
            ],
        }
    }
}

impl MlsConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl NotificationConfig {
    pub fn success(&self) -> Duration {
        Duration::from_millis(self.success_ms)
    }

    pub fn error(&self) -> Duration {
        Duration::from_millis(self.error_ms)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => return Ok(Config::default()),
            },
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Config::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Config> {
        Ok(toml::from_str(contents)?)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("cma-dashboard.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.database_file, "cma.db");
        assert_eq!(config.mls.delay(), Duration::from_millis(1500));
        assert_eq!(config.mls.timeout(), Duration::from_secs(10));
        assert_eq!(config.notifications.error(), Duration::from_secs(5));
        assert_eq!(config.server.bind, "0.0.0.0:3000");
        assert_eq!(config.auth.accounts.len(), 2);
        assert!(config.database_path().ends_with("cma.db"));
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = Config::from_toml(
            r#"
            data_dir = "/tmp/cma"

            [mls]
            delay_ms = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/cma"));
        assert_eq!(config.mls.delay_ms, 10);
        assert_eq!(config.mls.timeout_ms, 10_000);
        assert_eq!(config.notifications.success_ms, 3000);

        println!("✅ Partial config test PASSED");
    }

    #[test]
    fn test_load_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("absent.toml");
        assert_eq!(Config::load(Some(&missing)).unwrap(), Config::default());

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "data_dir = [").unwrap();
        assert!(Config::load(Some(&broken)).is_err());
    }
}
