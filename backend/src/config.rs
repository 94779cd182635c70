//! # Application Configuration
//!
//! Settings are read from a YAML file, then secrets and the port are
//! overridden from the environment (a `.env` file is honoured).
//!
//! ## YAML Format
//!
//! ```yaml
//! server:
//!   host: "127.0.0.1"
//!   port: 5000
//! storage:
//!   backend: json        # or sqlite
//!   path: "bills.json"
//! completion:
//!   model: "gemini-1.5-flash"
//!   timeout_secs: 30
//! mail:
//!   enabled: true
//!   from_email: "reminders@example.com"
//! cors:
//!   allowed_origins: ["http://localhost:3000"]
//! static_dir: "public"
//! classification:
//!   auto_categorize_on_create: false
//! ```
//!
//! Every section is optional. A missing file means all defaults.
//!
//! ## Environment
//!
//! - `BILL_TRACKER_CONFIG`: path of the YAML file (default `bill_tracker.yaml`)
//! - `GEMINI_API_KEY`, `SMTP_USERNAME`, `SMTP_PASSWORD`: secrets
//! - `BILL_TRACKER_PORT`: listen port

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::email_service::EmailConfig;
use crate::domain::prompts::PromptConfig;

pub const CONFIG_PATH_ENV: &str = "BILL_TRACKER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "bill_tracker.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Json,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Json,
            path: PathBuf::from("bills.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// No key means the completion service is disabled
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    pub auto_categorize_on_create: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub completion: CompletionConfig,
    pub mail: EmailConfig,
    pub cors: CorsConfig,
    /// Directory served for paths no route matches
    pub static_dir: Option<PathBuf>,
    pub classification: ClassificationConfig,
    pub prompts: PromptConfig,
}

impl AppConfig {
    /// Load from the configured YAML file and the process environment
    pub fn load() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                warn!("Failed to read .env file: {}", e);
            }
        }

        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(Path::new(&path))?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a YAML file; a missing file gives the defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply secrets and the port from `lookup` (the environment in production)
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = present("GEMINI_API_KEY") {
            self.completion.api_key = Some(key);
        }
        if let Some(username) = present("SMTP_USERNAME") {
            self.mail.username = username;
        }
        if let Some(password) = present("SMTP_PASSWORD") {
            self.mail.password = password;
        }
        if let Some(port) = present("BILL_TRACKER_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid BILL_TRACKER_PORT '{}'", port))?;
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.server.host, self.server.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.storage.backend, StorageBackend::Json);
        assert_eq!(config.completion.model, "gemini-1.5-flash");
        assert_eq!(config.completion.api_key, None);
        assert_eq!(config.mail.smtp_server, "smtp.gmail.com");
        assert!(!config.mail.enabled);
        assert!(!config.classification.auto_categorize_on_create);
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:5000");
    }

    #[test]
    fn test_partial_yaml() {
        let config = AppConfig::from_yaml_str(
            r#"
storage:
  backend: sqlite
  path: data/bills.db
classification:
  auto_categorize_on_create: true
cors:
  allowed_origins: ["http://localhost:3000"]
"#,
        )
        .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.storage.path, PathBuf::from("data/bills.db"));
        assert!(config.classification.auto_categorize_on_create);
        assert_eq!(config.cors.allowed_origins, vec!["http://localhost:3000".to_string()]);
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.prompts, PromptConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("GEMINI_API_KEY", "secret-key"),
            ("SMTP_USERNAME", "mailer"),
            ("SMTP_PASSWORD", "hunter2"),
            ("BILL_TRACKER_PORT", "8080"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.completion.api_key.as_deref(), Some("secret-key"));
        assert_eq!(config.mail.username, "mailer");
        assert_eq!(config.mail.password, "hunter2");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let mut config = AppConfig::default();
        let result = config.apply_env_overrides(|key| {
            (key == "BILL_TRACKER_PORT").then(|| "not-a-port".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::from_file(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(AppConfig::from_yaml_str("storage:\n  backend: mongo\n").is_err());
    }
}
