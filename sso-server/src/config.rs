//! Server configuration, loaded from a YAML file
//!
//! ```yaml
//! env: local
//! storage_path: ./storage/sso.db
//! token_ttl_secs: 3600
//! http:
//!   port: 8080
//!   timeout_ms: 5000
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sso_auth::{AuthConfig, HashParams};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file does not exist: {0}")]
    Missing(String),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Environment tag selecting log verbosity (local, dev, staging, prod)
    #[serde(default = "default_env")]
    pub env: String,
    /// SQLite database path
    pub storage_path: String,
    /// Lifetime of issued tokens in seconds
    pub token_ttl_secs: u64,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub hashing: HashParams,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-request deadline in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_env() -> String {
    "local".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_ms() -> u64 {
    5000
}

impl ServerConfig {
    /// Load and validate configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::Missing(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_path.trim().is_empty() {
            return Err(ConfigError::Invalid("storage_path is required".into()));
        }
        if self.http.timeout_ms == 0 {
            return Err(ConfigError::Invalid("http.timeout_ms must be positive".into()));
        }
        self.auth_config()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Engine settings derived from this config
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::new()
            .with_token_ttl_secs(self.token_ttl_secs)
            .with_hash_params(self.hashing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = "storage_path: ./storage/sso.db\ntoken_ttl_secs: 3600\n";

    #[test]
    fn test_defaults() {
        let cfg = ServerConfig::from_yaml(MINIMAL).unwrap();
        assert_eq!(cfg.env, "local");
        assert_eq!(cfg.http.port, 8080);
        assert_eq!(cfg.http.timeout(), Duration::from_secs(5));
        assert_eq!(cfg.hashing, HashParams::default());
        assert_eq!(cfg.auth_config().token_ttl_secs, 3600);
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
env: prod
storage_path: /var/lib/sso/sso.db
token_ttl_secs: 900
http:
  port: 50051
  timeout_ms: 250
hashing:
  memory_kib: 4096
  iterations: 3
  parallelism: 2
"#;
        let cfg = ServerConfig::from_yaml(yaml).unwrap();
        assert_eq!(cfg.env, "prod");
        assert_eq!(cfg.http.port, 50051);
        assert_eq!(cfg.http.timeout_ms, 250);
        assert_eq!(cfg.auth_config().hash_params.iterations, 3);
    }

    #[test]
    fn test_missing_required_fields() {
        assert!(matches!(
            ServerConfig::from_yaml("token_ttl_secs: 10\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            ServerConfig::from_yaml("storage_path: ''\ntoken_ttl_secs: 10\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ServerConfig::from_yaml("storage_path: x.db\ntoken_ttl_secs: 0\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_unrepresentable_token_ttl_rejected() {
        let yaml = format!("storage_path: x.db\ntoken_ttl_secs: {}\n", u64::MAX);
        assert!(matches!(ServerConfig::from_yaml(&yaml), Err(ConfigError::Invalid(_))));

        let yaml = "storage_path: x.db\ntoken_ttl_secs: 9223372036854775\n";
        assert!(matches!(ServerConfig::from_yaml(yaml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let cfg = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.storage_path, "./storage/sso.db");

        assert!(matches!(
            ServerConfig::from_file("/definitely/not/here.yaml"),
            Err(ConfigError::Missing(_))
        ));
    }
}
