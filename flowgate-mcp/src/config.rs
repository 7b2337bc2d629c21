// flowgate-mcp/src/config.rs
// ============================================================================
// Module: Flowgate Configuration
// Description: Configuration loading and validation for the MCP server.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: flowgate-admin, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from an optional TOML file with strict size
//! limits; missing or invalid configuration fails closed. The admin base
//! URL is resolved exactly once at startup — file value, then the
//! `FLOWGATE_ADMIN_URL` environment variable — and threaded into the
//! gateway at construction so call-time behavior never reads ambient
//! process state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use flowgate_admin::AdminGatewayConfig;
use flowgate_admin::gateway::DEFAULT_BASE_URL;
use flowgate_admin::gateway::DEFAULT_CONNECT_TIMEOUT_MS;
use flowgate_admin::gateway::DEFAULT_REQUEST_TIMEOUT_MS;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "flowgate.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "FLOWGATE_CONFIG";
/// Environment variable selecting the admin base URL.
pub const ADMIN_URL_ENV_VAR: &str = "FLOWGATE_ADMIN_URL";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;
/// Minimum allowed gateway timeout in milliseconds.
const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum allowed gateway timeout in milliseconds.
const MAX_TIMEOUT_MS: u64 = 300_000;
/// Default maximum JSON-RPC request body size in bytes.
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
/// Maximum allowed JSON-RPC request body size in bytes.
const MAX_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// SECTION: Configuration Model
// ============================================================================

/// Top-level Flowgate MCP configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowgateConfig {
    /// Admin API connection settings.
    #[serde(default)]
    pub admin: AdminConfig,
    /// MCP server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Admin API connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    /// Admin API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// MCP transport selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerTransport {
    /// JSON-RPC over stdin/stdout with Content-Length framing.
    Stdio,
    /// JSON-RPC over HTTP POST.
    Http,
}

impl ServerTransport {
    /// Returns a stable label for the transport.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Http => "http",
        }
    }
}

/// MCP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Transport used to serve JSON-RPC requests.
    #[serde(default = "default_transport")]
    pub transport: ServerTransport,
    /// Bind address for the HTTP transport.
    #[serde(default)]
    pub bind: Option<String>,
    /// Maximum allowed request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: default_transport(),
            bind: None,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default admin base URL.
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Default connect timeout.
const fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

/// Default request timeout.
const fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

/// Default transport.
const fn default_transport() -> ServerTransport {
    ServerTransport::Stdio
}

/// Default request body limit.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

// ============================================================================
// SECTION: Loading and Validation
// ============================================================================

impl FlowgateConfig {
    /// Loads configuration, resolving environment overrides once.
    ///
    /// Path precedence: explicit path, then `FLOWGATE_CONFIG`, then
    /// `flowgate.toml` in the working directory when present, then
    /// built-in defaults. `FLOWGATE_ADMIN_URL` overrides the admin base
    /// URL regardless of source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a named file is unreadable or invalid.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit_path
            .map(PathBuf::from)
            .or_else(|| env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from));
        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_NAME);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        if let Ok(url) = env::var(ADMIN_URL_ENV_VAR) {
            config.admin.base_url = url;
        }
        Ok(config)
    }

    /// Parses configuration from a TOML file with a size cap.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is unreadable, oversized, or
    /// not valid TOML for this model.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let metadata = fs::metadata(path)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid(format!(
                "config file exceeds {MAX_CONFIG_FILE_SIZE} bytes"
            )));
        }
        let text = fs::read_to_string(path)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        toml::from_str(&text).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Validates the configuration, failing closed on any inconsistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when any setting is out of bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.admin.base_url)
            .map_err(|err| ConfigError::Invalid(format!("admin.base_url: {err}")))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Invalid(format!(
                "admin.base_url: unsupported scheme '{}'",
                url.scheme()
            )));
        }
        for (name, value) in [
            ("admin.connect_timeout_ms", self.admin.connect_timeout_ms),
            ("admin.request_timeout_ms", self.admin.request_timeout_ms),
        ] {
            if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name}: {value} outside [{MIN_TIMEOUT_MS}, {MAX_TIMEOUT_MS}]"
                )));
            }
        }
        if self.server.max_body_bytes == 0 || self.server.max_body_bytes > MAX_MAX_BODY_BYTES {
            return Err(ConfigError::Invalid(format!(
                "server.max_body_bytes: {} outside [1, {MAX_MAX_BODY_BYTES}]",
                self.server.max_body_bytes
            )));
        }
        if self.server.transport == ServerTransport::Http {
            let bind = self
                .server
                .bind
                .as_ref()
                .ok_or_else(|| ConfigError::Invalid("server.bind required for http".to_string()))?;
            bind.parse::<SocketAddr>()
                .map_err(|err| ConfigError::Invalid(format!("server.bind: {err}")))?;
        }
        Ok(())
    }

    /// Returns the gateway configuration derived from this config.
    #[must_use]
    pub fn gateway_config(&self) -> AdminGatewayConfig {
        AdminGatewayConfig {
            base_url: self.admin.base_url.clone(),
            connect_timeout_ms: self.admin.connect_timeout_ms,
            request_timeout_ms: self.admin.request_timeout_ms,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// Config file is not valid TOML for this model.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Config contents are out of bounds or inconsistent.
    #[error("invalid config: {0}")]
    Invalid(String),
}
