//! Fatal registration errors.

use thiserror::Error;

use crate::config::ValidationError;
use crate::routing::ScanError;

/// Errors that stop registration before any route is registered.
///
/// Everything else (broken modules, missing members, failing
/// initializers) is recovered from and reported as a diagnostic.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// No route directory configured.
    #[error("base_dir missing")]
    MissingBaseDir,

    /// Layout or environment settings unusable.
    #[error("invalid loader configuration: {}", join(.0))]
    Config(Vec<ValidationError>),

    /// The route directory could not be listed.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(LoaderError::MissingBaseDir.to_string(), "base_dir missing");

        let err = LoaderError::Config(vec![
            ValidationError::NoExtensions,
            ValidationError::EmptyEnvironmentVariable,
        ]);
        assert_eq!(
            err.to_string(),
            "invalid loader configuration: layout.extensions must not be empty, environment.variable must not be empty"
        );
    }
}
