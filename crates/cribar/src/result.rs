//! Result and error types for Cribar.
//!
//! Every error in this crate is a configuration error: it is raised while a
//! guard or environment descriptor is being constructed, never while one is
//! being evaluated. Evaluation itself is total.

use thiserror::Error;

/// Result type for Cribar operations
pub type CribarResult<T> = Result<T, CribarError>;

/// Errors that can occur in Cribar
///
/// All variants surface at setup time. A malformed guard that silently
/// matched everything (or nothing) would corrupt suite coverage, so these
/// are never downgraded to a skip.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CribarError {
    /// Guard metadata referenced a dimension that is not driver/browser/platform
    #[error("Unknown guard dimension '{name}'. Expected one of: driver, browser, platform")]
    UnknownDimension {
        /// The unrecognized dimension key
        name: String,
    },

    /// A dimension value is not part of the enumerated set
    #[error("Unknown {dimension} value '{value}'")]
    UnknownValue {
        /// Dimension the value was given for
        dimension: &'static str,
        /// The unrecognized value
        value: String,
    },

    /// A required environment variable is missing
    #[error("Missing environment variable {variable}. The descriptor must be fully populated")]
    MissingEnvironment {
        /// Name of the missing variable
        variable: &'static str,
    },

    /// Guard metadata could not be parsed
    #[error("Malformed guard metadata: {message}")]
    Metadata {
        /// Parser error message
        message: String,
    },
}
