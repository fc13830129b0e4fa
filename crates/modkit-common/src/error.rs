//! Unified error types for the modkit workspace.
//!
//! All crates in the workspace share this single error enum; module authors
//! can bridge arbitrary failures in through the `anyhow` variant.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{ModuleId, PackageStatus, ServiceId};

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum ModkitError {
    /// A requested service is absent from the registry, the resolved cache,
    /// and every delegated container, and no listener recovered it.
    #[error("service not found: {id}")]
    NotFound {
        /// Identifier of the missing service.
        id: ServiceId,
    },

    /// A resolved service does not hold the type requested by the caller.
    #[error("service '{id}' does not hold the requested type")]
    TypeMismatch {
        /// Identifier of the mistyped service.
        id: ServiceId,
    },

    /// An operation was attempted outside its legal lifecycle phase.
    #[error("cannot {action} while the package is {status}")]
    InvalidState {
        /// Description of the attempted operation.
        action: String,
        /// Status the package was in at the time.
        status: PackageStatus,
    },

    /// An executable module failed during boot.
    #[error("execution of module '{module}' failed")]
    Execution {
        /// Identifier of the failing module.
        module: ModuleId,
        /// The failure reported by the module.
        #[source]
        source: Box<ModkitError>,
    },

    /// A package with the same name is already connected.
    #[error("package '{package}' is already connected")]
    AlreadyConnected {
        /// Name of the package that was offered twice.
        package: String,
    },

    /// A package connection precondition was violated.
    #[error("connection to package '{package}' refused: {reason}")]
    ConnectionRefused {
        /// Name of the package that could not be connected.
        package: String,
        /// Description of the violated precondition.
        reason: String,
    },

    /// A configuration or property value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// An arbitrary failure raised by module-author code.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ModkitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_service() {
        let err = ModkitError::NotFound {
            id: ServiceId::new("mailer"),
        };
        assert_eq!(err.to_string(), "service not found: mailer");
    }

    #[test]
    fn invalid_state_names_action_and_status() {
        let err = ModkitError::InvalidState {
            action: "add module".into(),
            status: PackageStatus::Booted,
        };
        assert_eq!(err.to_string(), "cannot add module while the package is booted");
    }

    #[test]
    fn execution_error_chains_its_source() {
        let inner = ModkitError::NotFound {
            id: ServiceId::new("db"),
        };
        let err = ModkitError::Execution {
            module: ModuleId::new("migrations"),
            source: Box::new(inner),
        };
        assert_eq!(err.to_string(), "execution of module 'migrations' failed");
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("service not found: db"));
    }
}
