use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Stable content fingerprint used as part of the cache key.
pub fn fingerprint(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub source: String,
    pub step: String,
    pub fingerprint: String,
}

impl CacheKey {
    pub fn new(source: &str, step: &str, input: &str) -> Self {
        Self {
            source: source.to_string(),
            step: step.to_lowercase(),
            fingerprint: fingerprint(input),
        }
    }
}

/// Memoized transformation outputs for a single run. Nothing is evicted;
/// the whole cache is dropped with the run.
#[derive(Debug, Default)]
pub struct TransformCache {
    entries: HashMap<CacheKey, String>,
    hits: usize,
}

impl TransformCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a previously computed output, counting a hit when found.
    pub fn get(&mut self, key: &CacheKey) -> Option<&str> {
        let value = self.entries.get(key)?;
        self.hits += 1;
        Some(value.as_str())
    }

    pub fn insert(&mut self, key: CacheKey, output: String) {
        self.entries.insert(key, output);
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
