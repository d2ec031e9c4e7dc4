// Transformation chain: registry lookup, memoization and retry with backoff

pub mod cache;
pub mod registry;

pub use cache::{fingerprint, CacheKey, TransformCache};
pub use registry::{sha256_base64, TransformRegistry, Transformation};

use tracing::{instrument, warn};

use crate::constants::{MAX_RETRY_ATTEMPTS, RETRY_BACKOFF_UNIT};
use crate::error::{SourceError, TransformError};
use crate::metrics::PipelineMetrics;
use crate::pipeline::deadline::Deadline;
use crate::pipeline::run_log::RunLog;

/// Applies an ordered list of transformation names to one source's text.
pub struct TransformChain<'a> {
    registry: &'a TransformRegistry,
    steps: &'a [String],
}

impl<'a> TransformChain<'a> {
    pub fn new(registry: &'a TransformRegistry, steps: &'a [String]) -> Self {
        Self { registry, steps }
    }

    /// Run every step in order. `cache` is `None` when caching is disabled.
    ///
    /// Stops at the first unknown step, exhausted retry, or fired deadline;
    /// the deadline is checked after every step.
    #[instrument(skip_all, fields(source = %source_name, steps = self.steps.len()))]
    pub async fn apply(
        &self,
        source_name: &str,
        input: String,
        mut cache: Option<&mut TransformCache>,
        deadline: &Deadline,
        log: &mut RunLog,
    ) -> Result<String, SourceError> {
        let mut text = input;

        for step in self.steps {
            let key = CacheKey::new(source_name, step, &text);
            let cached = cache
                .as_deref_mut()
                .and_then(|c| c.get(&key).map(str::to_owned));

            text = match cached {
                Some(hit) => {
                    PipelineMetrics::record_cache_hit();
                    log.push(format!("Cache hit for transformation: {}", step));
                    hit
                }
                None => {
                    let output = self.apply_step(step, &text, deadline, log).await?;
                    if let Some(c) = cache.as_deref_mut() {
                        c.insert(key, output.clone());
                    }
                    log.push(format!("Applied transformation: {}", step));
                    output
                }
            };

            deadline.check()?;
        }

        Ok(text)
    }

    async fn apply_step(
        &self,
        step: &str,
        input: &str,
        deadline: &Deadline,
        log: &mut RunLog,
    ) -> Result<String, SourceError> {
        let Some(transformation) = self.registry.get(step) else {
            log.push(format!("Error: Unknown transformation '{}'", step));
            return Err(TransformError::UnknownTransformation(step.to_string()).into());
        };

        let mut attempt = 1;
        loop {
            match transformation.apply(input) {
                Ok(output) => return Ok(output),
                Err(e) if attempt < MAX_RETRY_ATTEMPTS => {
                    warn!(step, attempt, error = %e, "transformation failed, retrying");
                    PipelineMetrics::record_retry();
                    log.push(format!(
                        "Retry {}/{} for transformation '{}' due to: {}",
                        attempt, MAX_RETRY_ATTEMPTS, step, e
                    ));
                    deadline.sleep(RETRY_BACKOFF_UNIT * attempt).await?;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(TransformError::RetriesExhausted {
                        step: step.to_string(),
                        attempts: attempt,
                        message: e.to_string(),
                    }
                    .into());
                }
            }
        }
    }
}
