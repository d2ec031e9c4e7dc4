use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use std::fmt;

use crate::error::ConfigError;
use crate::pipeline::processing::transform::sha256_base64;

/// Size-reduction policy selector, 0 through 9.
///
/// * 0: identity
/// * 1-3: strip spaces, `\n` and `\r`
/// * 4-6: Base64 of the UTF-8 bytes (reversible, larger than the input)
/// * 7-9: SHA-256 digest, Base64 encoded. The input cannot be recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    pub const NONE: CompressionLevel = CompressionLevel(0);

    pub fn new(level: i64) -> Result<Self, ConfigError> {
        match u8::try_from(level) {
            Ok(l) if l <= 9 => Ok(Self(l)),
            _ => Err(ConfigError::CompressionLevelOutOfRange(level)),
        }
    }

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn compress(data: &str, level: CompressionLevel) -> String {
    match level.0 {
        0 => data.to_string(),
        1..=3 => data
            .chars()
            .filter(|c| !matches!(c, ' ' | '\n' | '\r'))
            .collect(),
        4..=6 => STANDARD.encode(data.as_bytes()),
        _ => sha256_base64(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(l: i64) -> CompressionLevel {
        CompressionLevel::new(l).unwrap()
    }

    #[test]
    fn test_level_bounds() {
        assert!(CompressionLevel::new(0).is_ok());
        assert!(CompressionLevel::new(9).is_ok());
        assert!(matches!(
            CompressionLevel::new(-1),
            Err(ConfigError::CompressionLevelOutOfRange(-1))
        ));
        assert!(matches!(
            CompressionLevel::new(10),
            Err(ConfigError::CompressionLevelOutOfRange(10))
        ));
    }

    #[test]
    fn test_level_zero_is_identity() {
        assert_eq!(compress(" a \n b ", CompressionLevel::NONE), " a \n b ");
    }

    #[test]
    fn test_low_levels_strip_whitespace() {
        for l in 1..=3 {
            assert_eq!(compress(" a \r\n b\tc", level(l)), "ab\tc");
        }
    }

    #[test]
    fn test_mid_levels_are_reversible() {
        let encoded = compress("héllo wörld", level(5));
        let decoded = STANDARD.decode(&encoded).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "héllo wörld");
        assert!(encoded.len() > "héllo wörld".len());
    }

    #[test]
    fn test_high_levels_are_irreversible_fixed_size_digest() {
        let short = compress("hello", level(8));
        let long = compress(&"hello".repeat(1000), level(8));
        assert_eq!(short.len(), 44);
        assert_eq!(long.len(), 44);
        assert_ne!(short, long);

        // Decoding yields the 32 digest bytes, not the original text.
        let decoded = STANDARD.decode(&short).unwrap();
        assert_eq!(decoded.len(), 32);
        assert_ne!(decoded, b"hello".to_vec());
        assert!(!short.contains("hello"));
    }
}
