//! Configuration loading for huginnd.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.huginn/config.toml` (user)
//! 3. `/etc/huginn/config.toml` (system)
//! 4. built-in defaults
//!
//! Secrets are loaded separately with mandatory permission checks:
//! 1. `~/.huginn/secrets.toml` (user, must be 0600)
//! 2. `/etc/huginn/secrets.toml` (system, must be 0600)
//! 3. environment variables (`GOOGLE_API_KEY`, `HF_API_KEY`)

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::pipeline::{DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH, PipelineConfig};
use crate::store::DEFAULT_DATABASE_URL;
use crate::{HuginnError, Result};

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub classification: ClassificationConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub local: Option<LocalConfig>,
}

/// Server network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8000).
    #[serde(default = "default_address")]
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1:8000".to_string()
}

/// Which classification backend to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Hosted generative model.
    #[default]
    Gemini,
    /// Hosted zero-shot classifier.
    HuggingFace,
    /// Local zero-shot classifier.
    Local,
}

impl BackendKind {
    /// Secrets key for the backend's credential, if it needs one.
    pub fn secret_name(&self) -> Option<&'static str> {
        match self {
            Self::Gemini => Some("google"),
            Self::HuggingFace => Some("huggingface"),
            Self::Local => None,
        }
    }
}

/// Classification pipeline settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationConfig {
    #[serde(default)]
    pub backend: BackendKind,
    /// Model override; each backend has its own default.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            model: None,
            min_length: default_min_length(),
            max_length: default_max_length(),
        }
    }
}

impl ClassificationConfig {
    /// Pipeline settings over the full label set.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .min_length(self.min_length)
            .max_length(self.max_length)
    }
}

fn default_min_length() -> usize {
    DEFAULT_MIN_LENGTH
}

fn default_max_length() -> usize {
    DEFAULT_MAX_LENGTH
}

/// Audit-log database settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

/// Local inference configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalConfig {
    /// Device to use: "cpu" or "cuda" (default: "cpu").
    #[serde(default = "default_device")]
    pub device: String,
    /// Directory for model downloads.
    #[serde(default)]
    pub models_dir: Option<PathBuf>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            models_dir: None,
        }
    }
}

fn default_device() -> String {
    "cpu".to_string()
}

/// Secrets configuration (API keys).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub google: Option<ApiKeySecret>,
    #[serde(default)]
    pub huggingface: Option<ApiKeySecret>,
}

/// A single API key secret.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeySecret {
    pub api_key: String,
}

/// Provider name → environment variable name mapping.
const PROVIDER_ENV_VARS: &[(&str, &str)] = &[
    ("google", "GOOGLE_API_KEY"),
    ("huggingface", "HF_API_KEY"),
];

impl Config {
    /// Load configuration from the standard locations, or defaults if none exist.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided; must exist)
    /// 2. `~/.huginn/config.toml`
    /// 3. `/etc/huginn/config.toml`
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse a specific config file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            HuginnError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            HuginnError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path, if any.
    pub fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(HuginnError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".huginn").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/huginn/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Returns empty secrets if no file exists (keys may come from env vars).
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".huginn").join("secrets.toml");
            if user_secrets.exists() {
                Self::check_permissions(&user_secrets)?;
                return Self::load_from_file(&user_secrets);
            }
        }

        let system_secrets = PathBuf::from("/etc/huginn/secrets.toml");
        if system_secrets.exists() {
            Self::check_permissions(&system_secrets)?;
            return Self::load_from_file(&system_secrets);
        }

        Ok(Secrets::default())
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            HuginnError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            HuginnError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            HuginnError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        if mode & 0o077 != 0 {
            return Err(HuginnError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// Get API key for a provider, falling back to the corresponding environment variable.
    pub fn api_key(&self, provider: &str) -> Option<String> {
        let from_file = match provider {
            "google" => self.google.as_ref(),
            "huggingface" => self.huggingface.as_ref(),
            _ => None,
        }
        .map(|s| s.api_key.clone());

        from_file.or_else(|| {
            PROVIDER_ENV_VARS
                .iter()
                .find(|(name, _)| *name == provider)
                .and_then(|(_, env_var)| std::env::var(env_var).ok())
                .filter(|key| !key.is_empty())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.server.address, "127.0.0.1:8000");
        assert_eq!(config.classification.backend, BackendKind::Gemini);
        assert_eq!(config.classification.min_length, 10);
        assert_eq!(config.classification.max_length, 2000);
        assert_eq!(config.database.url, "sqlite://classification_logs.db");
        assert!(config.local.is_none());
    }

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [server]
            address = "0.0.0.0:8000"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.address, "0.0.0.0:8000");
        assert_eq!(config.classification.max_length, 2000);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [server]
            address = "127.0.0.1:9000"

            [classification]
            backend = "huggingface"
            model = "facebook/bart-large-mnli"
            min_length = 5
            max_length = 1024

            [database]
            url = "sqlite:///var/lib/huginn/logs.db"

            [local]
            device = "cuda"
            models_dir = "/opt/models"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.classification.backend, BackendKind::HuggingFace);
        assert_eq!(
            config.classification.model.as_deref(),
            Some("facebook/bart-large-mnli")
        );
        assert_eq!(config.database.url, "sqlite:///var/lib/huginn/logs.db");

        let pipeline = config.classification.pipeline_config();
        assert_eq!(pipeline.min_length, 5);
        assert_eq!(pipeline.max_length, 1024);

        let local = config.local.unwrap();
        assert_eq!(local.device, "cuda");
        assert_eq!(local.models_dir, Some(PathBuf::from("/opt/models")));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let toml = r#"
            [classification]
            backend = "openai"
        "#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn parse_secrets() {
        let toml = r#"
            [google]
            api_key = "AIza-test-key"
        "#;
        let secrets: Secrets = toml::from_str(toml).unwrap();
        assert_eq!(secrets.google.as_ref().unwrap().api_key, "AIza-test-key");
        assert!(secrets.huggingface.is_none());
    }

    #[test]
    fn api_key_from_secrets() {
        let secrets = Secrets {
            google: Some(ApiKeySecret {
                api_key: "from-file".to_string(),
            }),
            ..Default::default()
        };
        assert_eq!(secrets.api_key("google"), Some("from-file".to_string()));
        assert_eq!(secrets.api_key("nonexistent"), None);
    }

    #[test]
    fn backend_secret_names() {
        assert_eq!(BackendKind::Gemini.secret_name(), Some("google"));
        assert_eq!(BackendKind::HuggingFace.secret_name(), Some("huggingface"));
        assert_eq!(BackendKind::Local.secret_name(), None);
    }

    #[test]
    fn config_not_found_returns_error() {
        let result = Config::load(Some(Path::new("/nonexistent/config.toml")));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
    }

    #[test]
    fn load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[classification]\nbackend = \"local\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.classification.backend, BackendKind::Local);
    }
}
