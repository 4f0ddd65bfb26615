//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the loader.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the route loader.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LoaderConfig {
    /// Directory holding the route tree. Required at registration time.
    pub base_dir: Option<PathBuf>,

    /// How files map onto index modules and sibling methods.
    pub layout: LayoutConfig,

    /// Directory scanning settings.
    pub scan: ScanConfig,

    /// Environment flag injection.
    pub environment: EnvironmentConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// HTTP server settings for the bundled binary.
    pub server: ServerConfig,
}

impl LoaderConfig {
    /// Minimal configuration rooted at `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
            ..Default::default()
        }
    }
}

/// How sibling methods that ask for injection are bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MethodBinding {
    /// Injectables receive the owning node's full injection context.
    #[default]
    ContextAware,
    /// Injectables receive only the injections handed down by the caller,
    /// without the node's index exports or environment flags.
    PassThrough,
}

/// Route directory layout.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// File stem of the per-directory initializer module.
    pub index_stem: String,

    /// Accepted module file extensions (without the dot).
    pub extensions: Vec<String>,

    /// Binding mode for injectable sibling methods.
    pub binding: MethodBinding,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            index_stem: "index".to_string(),
            extensions: vec!["rs".to_string()],
            binding: MethodBinding::ContextAware,
        }
    }
}

/// Directory scanner configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory names skipped entirely (dependency and build output trees).
    pub ignore: Vec<String>,

    /// Whether to follow symbolic links.
    pub follow_symlinks: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ignore: vec!["node_modules".to_string(), "target".to_string()],
            follow_symlinks: false,
        }
    }
}

/// Environment flag configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Variable holding the active environment name.
    pub variable: String,

    /// Prefix of the boolean flag injected for the active environment.
    pub flag_sigil: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            variable: "NODE_ENV".to_string(),
            flag_sigil: "$".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}
