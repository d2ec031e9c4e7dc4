use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;

use crate::constants::{TRANSFORM_HASH, TRANSFORM_LOWERCASE, TRANSFORM_REVERSE, TRANSFORM_UPPERCASE};

/// A named text-to-text step.
///
/// Built-in steps never fail. The `Result` exists for registered steps that
/// do I/O or are otherwise non-deterministic; the chain retries them.
pub trait Transformation: Send + Sync {
    fn apply(&self, input: &str) -> anyhow::Result<String>;
}

impl<F> Transformation for F
where
    F: Fn(&str) -> anyhow::Result<String> + Send + Sync,
{
    fn apply(&self, input: &str) -> anyhow::Result<String> {
        self(input)
    }
}

pub struct Uppercase;

impl Transformation for Uppercase {
    fn apply(&self, input: &str) -> anyhow::Result<String> {
        Ok(input.to_uppercase())
    }
}

pub struct Lowercase;

impl Transformation for Lowercase {
    fn apply(&self, input: &str) -> anyhow::Result<String> {
        Ok(input.to_lowercase())
    }
}

pub struct Reverse;

impl Transformation for Reverse {
    fn apply(&self, input: &str) -> anyhow::Result<String> {
        Ok(input.chars().rev().collect())
    }
}

pub struct Hash;

impl Transformation for Hash {
    fn apply(&self, input: &str) -> anyhow::Result<String> {
        Ok(sha256_base64(input))
    }
}

/// SHA-256 of the UTF-8 bytes, standard Base64 encoded (always 44 chars).
pub fn sha256_base64(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    STANDARD.encode(digest)
}

/// Name → transformation mapping. Names are case-insensitive.
///
/// Built once, then handed to the pipeline and never mutated during a run.
#[derive(Clone)]
pub struct TransformRegistry {
    transformations: HashMap<String, Arc<dyn Transformation>>,
}

impl TransformRegistry {
    /// Registry with no transformations at all.
    pub fn empty() -> Self {
        Self {
            transformations: HashMap::new(),
        }
    }

    /// Registry holding the four built-in transformations.
    pub fn builtin() -> Self {
        Self::empty()
            .with(TRANSFORM_UPPERCASE, Uppercase)
            .with(TRANSFORM_LOWERCASE, Lowercase)
            .with(TRANSFORM_REVERSE, Reverse)
            .with(TRANSFORM_HASH, Hash)
    }

    /// Register (or replace) a transformation under `name`.
    pub fn with(mut self, name: &str, transformation: impl Transformation + 'static) -> Self {
        self.transformations
            .insert(name.to_lowercase(), Arc::new(transformation));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn Transformation> {
        self.transformations
            .get(&name.to_lowercase())
            .map(|t| t.as_ref())
    }

    /// List all registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.transformations.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
