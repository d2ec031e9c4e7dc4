use thiserror::Error;

use crate::pipeline::source::SourceKind;

/// Fatal errors: the run is aborted before any source is touched.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("At least one data source must be provided")]
    NoSources,

    #[error("At least one transformation must be specified")]
    EmptyChain,

    #[error(
        "Output format must be one of: {} (got '{0}')",
        crate::constants::get_supported_formats().join(", ")
    )]
    UnsupportedFormat(String),

    #[error("Compression level must be between 0 and 9 (got {0})")]
    CompressionLevelOutOfRange(i64),

    #[error("Invalid validation rule '{name}': {message}")]
    InvalidRule { name: String, message: String },

    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Raised by the run deadline (timeout or external cancellation).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("operation cancelled: run deadline reached")]
pub struct Cancelled;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("database error: {0}")]
    Database(String),

    #[error("HTTP request failed: {0}")]
    Network(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("stream error: {0}")]
    Stream(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Transformation '{0}' is not supported")]
    UnknownTransformation(String),

    #[error("Transformation '{step}' failed after {attempts} attempts: {message}")]
    RetriesExhausted {
        step: String,
        attempts: u32,
        message: String,
    },
}

/// Per-source failures. The orchestrator counts these as failures and keeps going.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("{field} is required for {kind} data sources")]
    MissingLocator { kind: SourceKind, field: &'static str },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("empty data received")]
    EmptyPayload,

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("Validation failed for rule: {rule}")]
    ValidationFailed { rule: String },

    #[error("a result named '{0}' was already stored in this run")]
    DuplicateName(String),

    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

impl SourceError {
    /// Short label used for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            SourceError::MissingLocator { .. } => "missing_locator",
            SourceError::Fetch(_) => "fetch",
            SourceError::EmptyPayload => "empty_payload",
            SourceError::Transform(_) => "transform",
            SourceError::ValidationFailed { .. } => "validation",
            SourceError::DuplicateName(_) => "duplicate_name",
            SourceError::Cancelled(_) => "cancelled",
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
