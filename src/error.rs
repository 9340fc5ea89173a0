//! Common error types for the autoplay engine

use thiserror::Error;

/// Common result type for autoplay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the continuation engine
///
/// `Config` and `Validation` are fatal/caller-facing and surface
/// immediately. `Auth` and `SourceUnavailable` are recoverable: the
/// components sitting on the queue-end path convert them into "no
/// candidate" rather than letting them reach the host.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or incomplete autoplay configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid arguments passed to a caller-facing mutator
    #[error("Validation error: {0}")]
    Validation(String),

    /// Credential exchange with the recommendation API failed
    #[error("Auth error: {0}")]
    Auth(String),

    /// A recommendation or search source failed (transport or parse)
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),
}
