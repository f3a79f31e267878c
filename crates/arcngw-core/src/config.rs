use crate::error::{NgwError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable naming an optional TOML config file
pub const CONFIG_PATH_ENV: &str = "ARCNGW_CONFIG";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for the gateway
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub ngw_host: ConfigValue<Option<String>>,
    pub ngw_login: ConfigValue<Option<String>>,
    pub ngw_password: ConfigValue<Option<String>>,
    pub port: ConfigValue<u16>,
    pub cors_origin: ConfigValue<String>,
    pub request_timeout_secs: ConfigValue<u64>,
    pub ticket_ttl_secs: ConfigValue<u64>,
    pub map_wkid: ConfigValue<u32>,
    pub backend_srs: ConfigValue<u32>,
    pub client_srs: ConfigValue<u32>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            ngw_host: ConfigValue::new(None, ConfigSource::Default),
            ngw_login: ConfigValue::new(None, ConfigSource::Default),
            ngw_password: ConfigValue::new(None, ConfigSource::Default),
            port: ConfigValue::new(8080, ConfigSource::Default),
            cors_origin: ConfigValue::new("*".to_string(), ConfigSource::Default),
            request_timeout_secs: ConfigValue::new(30, ConfigSource::Default),
            ticket_ttl_secs: ConfigValue::new(3600, ConfigSource::Default),
            map_wkid: ConfigValue::new(28417, ConfigSource::Default),
            backend_srs: ConfigValue::new(3857, ConfigSource::Default),
            client_srs: ConfigValue::new(4326, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| NgwError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| NgwError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(ngw) = file_config.ngw {
            if let Some(host) = ngw.host {
                self.ngw_host.update(Some(host), ConfigSource::File);
            }
            if let Some(login) = ngw.login {
                self.ngw_login.update(Some(login), ConfigSource::File);
            }
            if let Some(password) = ngw.password {
                self.ngw_password.update(Some(password), ConfigSource::File);
            }
            if let Some(timeout) = ngw.request_timeout_secs {
                self.request_timeout_secs.update(timeout, ConfigSource::File);
            }
            if let Some(ttl) = ngw.ticket_ttl_secs {
                self.ticket_ttl_secs.update(ttl, ConfigSource::File);
            }
            if let Some(srs) = ngw.srs {
                self.backend_srs.update(srs, ConfigSource::File);
            }
        }

        if let Some(server) = file_config.server {
            if let Some(port) = server.port {
                self.port.update(port, ConfigSource::File);
            }
            if let Some(origin) = server.cors_origin {
                self.cors_origin.update(origin, ConfigSource::File);
            }
            if let Some(wkid) = server.map_wkid {
                self.map_wkid.update(wkid, ConfigSource::File);
            }
            if let Some(srs) = server.client_srs {
                self.client_srs.update(srs, ConfigSource::File);
            }
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        if let Ok(host) = env::var("NGW_HOST") {
            self.ngw_host.update(Some(host), ConfigSource::Environment);
        }
        if let Ok(login) = env::var("NGW_LOGIN") {
            self.ngw_login.update(Some(login), ConfigSource::Environment);
        }
        if let Ok(password) = env::var("NGW_PASSWORD") {
            self.ngw_password.update(Some(password), ConfigSource::Environment);
        }
        if let Ok(origin) = env::var("ARCNGW_CORS_ORIGIN") {
            self.cors_origin.update(origin, ConfigSource::Environment);
        }

        if let Some(port) = parse_env("ARCNGW_PORT") {
            self.port.update(port, ConfigSource::Environment);
        }
        if let Some(timeout) = parse_env("ARCNGW_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs.update(timeout, ConfigSource::Environment);
        }
        if let Some(ttl) = parse_env("ARCNGW_TICKET_TTL_SECS") {
            self.ticket_ttl_secs.update(ttl, ConfigSource::Environment);
        }
        if let Some(wkid) = parse_env("ARCNGW_MAP_WKID") {
            self.map_wkid.update(wkid, ConfigSource::Environment);
        }
        if let Some(srs) = parse_env("ARCNGW_BACKEND_SRS") {
            self.backend_srs.update(srs, ConfigSource::Environment);
        }
        if let Some(srs) = parse_env("ARCNGW_CLIENT_SRS") {
            self.client_srs.update(srs, ConfigSource::Environment);
        }

        self
    }

    /// Resolve into a validated configuration
    pub fn build(self) -> Result<GatewayConfig> {
        let host = required(self.ngw_host.value, "NGW_HOST")?;
        if !(host.starts_with("http://") || host.starts_with("https://")) {
            return Err(NgwError::ConfigInvalid {
                key: "NGW_HOST".to_string(),
                reason: format!("expected an http(s) URL, got '{}'", host),
            });
        }
        if self.request_timeout_secs.value == 0 {
            return Err(NgwError::ConfigInvalid {
                key: "ARCNGW_REQUEST_TIMEOUT_SECS".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(GatewayConfig {
            ngw: BackendConfig {
                host: host.trim_end_matches('/').to_string(),
                login: required(self.ngw_login.value, "NGW_LOGIN")?,
                password: required(self.ngw_password.value, "NGW_PASSWORD")?,
                request_timeout: Duration::from_secs(self.request_timeout_secs.value),
                ticket_ttl: Duration::from_secs(self.ticket_ttl_secs.value),
                srs: self.backend_srs.value,
            },
            port: self.port.value,
            cors_origin: self.cors_origin.value,
            map_wkid: self.map_wkid.value,
            client_srs: self.client_srs.value,
        })
    }
}

fn required(value: Option<String>, key: &str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| NgwError::ConfigMissing { key: key.to_string() })
}

fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {} value '{}': ignoring", key, raw);
            None
        }
    }
}

/// Backend connection settings
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub host: String,
    pub login: String,
    pub password: String,
    pub request_timeout: Duration,
    pub ticket_ttl: Duration,
    pub srs: u32,
}

/// Resolved gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub ngw: BackendConfig,
    pub port: u16,
    pub cors_origin: String,
    pub map_wkid: u32,
    pub client_srs: u32,
}

impl GatewayConfig {
    /// Defaults, then the optional `ARCNGW_CONFIG` file, then environment
    pub fn load() -> Result<Self> {
        let mut layered = LayeredConfig::with_defaults();
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            layered = layered.load_from_file(path)?;
        }
        layered.load_from_env().build()
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

/// File configuration structure (for TOML deserialization)
#[derive(Debug, Deserialize)]
struct FileConfig {
    ngw: Option<FileBackendSection>,
    server: Option<FileServerSection>,
}

#[derive(Debug, Deserialize)]
struct FileBackendSection {
    host: Option<String>,
    login: Option<String>,
    password: Option<String>,
    request_timeout_secs: Option<u64>,
    ticket_ttl_secs: Option<u64>,
    srs: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct FileServerSection {
    port: Option<u16>,
    cors_origin: Option<String>,
    map_wkid: Option<u32>,
    client_srs: Option<u32>,
}
