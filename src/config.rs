use anyhow::Result;
use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for GeoTNB
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GeoTnbConfig {
    /// Backend connection settings
    pub api: ApiConfig,
    /// Session persistence
    pub auth: AuthConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend root, e.g. `http://localhost:8080/api`
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Applies to uploads and downloads
    pub file_transfer_timeout_seconds: u64,
    /// 0 disables the GET cache
    pub cache_ttl_seconds: u64,
    pub cache_capacity: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_seconds: 30,
            file_transfer_timeout_seconds: 60,
            cache_ttl_seconds: 60,
            cache_capacity: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Where tokens and the current user are persisted
    pub token_file: PathBuf,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_file: PathBuf::from(".geotnb/session.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter when RUST_LOG is unset
    pub log_level: String,
    /// JSON lines instead of the human formatter
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl GeoTnbConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (geotnb.toml, .geotnb-rc)
    /// 3. Environment variables (GEOTNB_API__BASE_URL and so on)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Same as [`GeoTnbConfig::load`] with configuration files looked up in `dir`.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let mut builder = Config::builder();

        let toml_path = dir.join("geotnb.toml");
        if toml_path.exists() {
            builder = builder.add_source(File::from(toml_path));
        }

        let rc_path = dir.join(".geotnb-rc");
        if rc_path.exists() {
            builder = builder.add_source(File::from(rc_path).format(FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("GEOTNB")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let geotnb_config: GeoTnbConfig = config.try_deserialize()?;
        Ok(geotnb_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<GeoTnbConfig, anyhow::Error>> = std::sync::LazyLock::new(|| {
    let _ = GeoTnbConfig::load_env_file();
    GeoTnbConfig::load()
});

/// Get the global configuration
pub fn config() -> Result<&'static GeoTnbConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let config = config()?;
    tracing::info!(base_url = %config.api.base_url, "Configuration loaded successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_files() {
        let dir = TempDir::new().unwrap();
        let config = GeoTnbConfig::load_from(dir.path()).unwrap();
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.api.file_transfer_timeout_seconds, 60);
        assert_eq!(config.auth.token_file, PathBuf::from(".geotnb/session.json"));
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("geotnb.toml"),
            "[api]\nbase_url = \"https://tnb.example.ma/api\"\ncache_ttl_seconds = 0\n",
        )
        .unwrap();

        let config = GeoTnbConfig::load_from(dir.path()).unwrap();
        assert_eq!(config.api.base_url, "https://tnb.example.ma/api");
        assert_eq!(config.api.cache_ttl_seconds, 0);
        assert_eq!(config.api.timeout_seconds, 30);
    }

    #[test]
    fn saved_file_loads_back() {
        let dir = TempDir::new().unwrap();
        let mut config = GeoTnbConfig::default();
        config.observability.json_logs = true;
        config.save_to_file(dir.path().join("geotnb.toml")).unwrap();

        let loaded = GeoTnbConfig::load_from(dir.path()).unwrap();
        assert!(loaded.observability.json_logs);
    }
}
