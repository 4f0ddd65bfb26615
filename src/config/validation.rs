//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check layout settings produce a usable naming convention
//! - Validate addresses when the features using them are enabled
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LoaderConfig → Result<(), Vec<ValidationError>>
//! - A missing `base_dir` is not a validation error; the registration
//!   driver rejects it when it is actually needed

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::LoaderConfig;
use crate::routing::tree::is_plain_identifier;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("layout.index_stem {0:?} must be a plain identifier")]
    InvalidIndexStem(String),

    #[error("layout.extensions must not be empty")]
    NoExtensions,

    #[error("layout.extensions entry {0:?} must be non-empty and contain no dot")]
    InvalidExtension(String),

    #[error("environment.variable must not be empty")]
    EmptyEnvironmentVariable,

    #[error("environment.flag_sigil {0:?} must be non-empty and contain no dot")]
    InvalidFlagSigil(String),

    #[error("{field} {value:?} is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &LoaderConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !is_plain_identifier(&config.layout.index_stem) {
        errors.push(ValidationError::InvalidIndexStem(
            config.layout.index_stem.clone(),
        ));
    }

    if config.layout.extensions.is_empty() {
        errors.push(ValidationError::NoExtensions);
    }
    for ext in &config.layout.extensions {
        if !is_plain_identifier(ext) {
            errors.push(ValidationError::InvalidExtension(ext.clone()));
        }
    }

    if config.environment.variable.trim().is_empty() {
        errors.push(ValidationError::EmptyEnvironmentVariable);
    }
    let sigil = &config.environment.flag_sigil;
    if sigil.is_empty() || sigil.contains('.') {
        errors.push(ValidationError::InvalidFlagSigil(sigil.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "server.bind_address",
            value: config.server.bind_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&LoaderConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = LoaderConfig::default();
        config.layout.index_stem = "in.dex".into();
        config.layout.extensions = vec!["".into(), "tar.gz".into()];
        config.environment.variable = " ".into();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::InvalidIndexStem("in.dex".into())));
        assert!(errors.contains(&ValidationError::InvalidExtension("tar.gz".into())));
        assert!(errors.contains(&ValidationError::EmptyEnvironmentVariable));
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut config = LoaderConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());
    }
}
