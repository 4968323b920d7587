//! Error types for the carousel crate.
//!
//! Nothing here is fatal to the widget. A [`LoadError`] ends in the error
//! indicator of the one container it belongs to, and configuration problems
//! surface only when a host explicitly parses a configuration document.

use thiserror::Error;

/// Reasons an image load can fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// The image source does not exist.
    #[error("image not found: {0}")]
    NotFound(String),

    /// The image data could not be decoded.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// The image could not be fetched.
    #[error("network error: {0}")]
    Network(String),

    /// The request was cancelled before it completed.
    #[error("image load cancelled")]
    Cancelled,

    /// Any other loader-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Errors raised while reading a carousel configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The document is not valid TOML or has the wrong shape.
    #[error("failed to parse carousel configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be written back out.
    #[error("failed to serialize carousel configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A color field is not a `#RRGGBB` or `#RRGGBBAA` string.
    #[error("invalid color for `{field}`: {value:?}")]
    InvalidColor { field: &'static str, value: String },

    /// A dimension field is negative, zero where that is meaningless, or not finite.
    #[error("invalid value for `{field}`: {value}")]
    InvalidDimension { field: &'static str, value: f32 },
}

/// Umbrella error for carousel operations that can fail.
#[derive(Error, Debug)]
pub enum CarouselError {
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Image loading error.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// A loader worker thread could not be started.
    #[error("failed to spawn loader worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}

/// Result type for carousel operations.
pub type CarouselResult<T> = Result<T, CarouselError>;
