/// Pipeline-wide constants shared across stages.
use std::time::Duration;

// Output format names (matched case-insensitively)
pub const FORMAT_JSON: &str = "json";
pub const FORMAT_XML: &str = "xml";
pub const FORMAT_CSV: &str = "csv";
pub const FORMAT_YAML: &str = "yaml";

// Built-in transformation names
pub const TRANSFORM_UPPERCASE: &str = "uppercase";
pub const TRANSFORM_LOWERCASE: &str = "lowercase";
pub const TRANSFORM_REVERSE: &str = "reverse";
pub const TRANSFORM_HASH: &str = "hash";

/// Total attempts for a single transformation step, first try included.
pub const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Backoff unit; attempt `n` waits `n` units before the next try.
pub const RETRY_BACKOFF_UNIT: Duration = Duration::from_millis(100);

/// Upper bound on bytes consumed from a stream source.
pub const MAX_STREAM_BYTES: u64 = 4096;

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_COMPRESSION_LEVEL: i64 = 5;
pub const DEFAULT_FORMAT: &str = FORMAT_JSON;

// Environment variables read by the binary
pub const ENV_CONFIG_PATH: &str = "DATAMILL_CONFIG";
pub const ENV_LOG_DIR: &str = "DATAMILL_LOG_DIR";

/// Get all supported output format names
pub fn get_supported_formats() -> Vec<&'static str> {
    vec![FORMAT_JSON, FORMAT_XML, FORMAT_CSV, FORMAT_YAML]
}
