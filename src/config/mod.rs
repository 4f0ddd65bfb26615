//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → LoaderConfig (validated, immutable)
//!     → handed to RouteLoader inside LoaderOptions
//! ```
//!
//! # Design Decisions
//! - Config is read once; the loader runs once per process
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::LoaderConfig;
pub use schema::{EnvironmentConfig, LayoutConfig, MethodBinding, ObservabilityConfig, ScanConfig, ServerConfig};
pub use validation::{validate_config, ValidationError};
