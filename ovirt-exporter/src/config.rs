//! Configuration management for the exporter
//!
//! Settings are layered, later sources overriding earlier ones:
//! 1. Default values
//! 2. Configuration file (TOML format)
//! 3. Environment variables (`OVIRT_EXPORTER_*`)
//! 4. Command line flags (applied by the binary)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub collector: CollectorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on, `:9325` binds every interface
    pub listen_address: String,
    /// Path under which metrics are exposed
    pub metrics_path: String,
}

/// Engine API access
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API root, e.g. `https://engine.example.org/ovirt-engine/api`
    pub url: String,
    pub username: String,
    pub password: String,
    /// File to read the password from, takes precedence over `password`
    pub password_file: Option<PathBuf>,
    /// Accept any TLS certificate from the engine
    pub insecure_cert: bool,
    /// Timeout of a single API request
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub with_snapshots: bool,
    pub with_network: bool,
    pub with_disks: bool,
    /// Upper bound of API requests in flight during a scrape
    pub max_concurrent_requests: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Directory for log files
    pub log_dir: PathBuf,
    pub file_logging_enabled: bool,
    /// JSON lines on the console instead of plain text
    pub json_format: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: ":9325".to_string(),
            metrics_path: "/metrics".to_string(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: "https://localhost/ovirt-engine/api/".to_string(),
            username: "user@internal".to_string(),
            password: String::new(),
            password_file: None,
            insecure_cert: false,
            timeout_secs: 30,
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            with_snapshots: true,
            with_network: true,
            with_disks: true,
            max_concurrent_requests: 16,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: PathBuf::from("/var/log/ovirt-exporter"),
            file_logging_enabled: false,
            json_format: false,
        }
    }
}

impl ExporterConfig {
    /// Load from the optional config file and the environment
    ///
    /// An explicit `path` must exist and parse. Without one the standard
    /// locations are searched and a broken file is reported and ignored.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::find_config_file() {
                Some(found) => Self::load_from_file(&found).unwrap_or_else(|e| {
                    eprintln!("Ignoring config file: {}", e);
                    Self::default()
                }),
                None => Self::default(),
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_path_buf(), e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            std::env::var("OVIRT_EXPORTER_CONFIG").ok().map(PathBuf::from),
            Some(PathBuf::from("/etc/ovirt-exporter/config.toml")),
            Some(PathBuf::from("./ovirt-exporter.toml")),
        ];

        paths.into_iter().flatten().find(|p| p.exists())
    }

    /// Apply `OVIRT_EXPORTER_*` overrides read through `var`
    pub fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        let flag = |key: &str| var(key).and_then(|v| v.parse::<bool>().ok());

        // Server
        if let Some(address) = var("OVIRT_EXPORTER_LISTEN_ADDRESS") {
            self.server.listen_address = address;
        }
        if let Some(path) = var("OVIRT_EXPORTER_METRICS_PATH") {
            self.server.metrics_path = path;
        }

        // API
        if let Some(url) = var("OVIRT_EXPORTER_API_URL") {
            self.api.url = url;
        }
        if let Some(username) = var("OVIRT_EXPORTER_API_USERNAME") {
            self.api.username = username;
        }
        if let Some(password) = var("OVIRT_EXPORTER_API_PASSWORD") {
            self.api.password = password;
        }
        if let Some(path) = var("OVIRT_EXPORTER_API_PASSWORD_FILE") {
            self.api.password_file = Some(PathBuf::from(path));
        }
        if let Some(insecure) = flag("OVIRT_EXPORTER_API_INSECURE_CERT") {
            self.api.insecure_cert = insecure;
        }
        if let Some(timeout) = var("OVIRT_EXPORTER_API_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.api.timeout_secs = timeout;
        }

        // Collectors
        if let Some(enabled) = flag("OVIRT_EXPORTER_WITH_SNAPSHOTS") {
            self.collector.with_snapshots = enabled;
        }
        if let Some(enabled) = flag("OVIRT_EXPORTER_WITH_NETWORK") {
            self.collector.with_network = enabled;
        }
        if let Some(enabled) = flag("OVIRT_EXPORTER_WITH_DISKS") {
            self.collector.with_disks = enabled;
        }
        if let Some(max) = var("OVIRT_EXPORTER_MAX_CONCURRENT_REQUESTS").and_then(|v| v.parse().ok()) {
            self.collector.max_concurrent_requests = max;
        }

        // Logging
        if let Some(level) = var("OVIRT_EXPORTER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(path) = var("OVIRT_EXPORTER_LOG_DIR") {
            self.logging.log_dir = PathBuf::from(path);
        }
        if let Some(enabled) = flag("OVIRT_EXPORTER_FILE_LOGGING") {
            self.logging.file_logging_enabled = enabled;
        }
        if let Some(json) = flag("OVIRT_EXPORTER_LOG_JSON") {
            self.logging.json_format = json;
        }
    }

    /// Replace `api.password` with the content of `api.password_file`, if set
    pub fn resolve_password(&mut self) -> Result<(), ConfigError> {
        if let Some(path) = &self.api.password_file {
            let content = std::fs::read_to_string(path)
                .map_err(|e| ConfigError::FileRead(path.clone(), e.to_string()))?;
            self.api.password = content.trim_end_matches(['\r', '\n']).to_string();
        }

        Ok(())
    }

    /// `host:port` to bind for `server.listen_address`
    ///
    /// An empty host (`:9325`) means every interface. Host names are kept
    /// as given and resolved when binding.
    pub fn listen_addr(&self) -> Result<String, ConfigError> {
        let invalid = || ConfigError::Validation(format!("Invalid listen address '{}'", self.server.listen_address));

        let (host, port) = self.server.listen_address.rsplit_once(':').ok_or_else(invalid)?;
        port.parse::<u16>().map_err(|_| invalid())?;

        let host = if host.is_empty() { "0.0.0.0" } else { host };
        Ok(format!("{}:{}", host, port))
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.url.trim().is_empty() {
            return Err(ConfigError::Validation("API URL cannot be empty".to_string()));
        }
        url::Url::parse(&self.api.url)
            .map_err(|e| ConfigError::Validation(format!("Invalid API URL '{}': {}", self.api.url, e)))?;

        let path = &self.server.metrics_path;
        if !path.starts_with('/') || path == "/" {
            return Err(ConfigError::Validation(format!(
                "Metrics path '{}' must start with '/' and cannot be the root",
                path
            )));
        }

        self.listen_addr()?;

        if self.collector.max_concurrent_requests == 0 {
            return Err(ConfigError::Validation(
                "max_concurrent_requests must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0:?}: {1}")]
    FileRead(PathBuf, String),
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Config validation failed: {0}")]
    Validation(String),
}
