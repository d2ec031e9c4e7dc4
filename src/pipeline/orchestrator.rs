use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::constants::{DEFAULT_COMPRESSION_LEVEL, DEFAULT_FORMAT, DEFAULT_TIMEOUT_MS};
use crate::error::{ConfigError, SourceError};
use crate::metrics::PipelineMetrics;
use crate::pipeline::deadline::Deadline;
use crate::pipeline::ingestion::{Collaborators, SourceFetcher};
use crate::pipeline::output::{format_output, OutputFormat};
use crate::pipeline::processing::compress::{compress, CompressionLevel};
use crate::pipeline::processing::normalize::normalize;
use crate::pipeline::processing::transform::{TransformCache, TransformChain, TransformRegistry};
use crate::pipeline::processing::validate::{ValidationRules, Verdict};
use crate::pipeline::run_log::RunLog;
use crate::pipeline::source::DataSource;

/// Everything the caller supplies for one run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub sources: Vec<DataSource>,
    pub chain: Vec<String>,
    pub rules: ValidationRules,
    pub format: String,
    pub compression_level: i64,
    pub cache_enabled: bool,
    pub timeout_ms: u64,
    /// Optional external cancellation, merged with the timeout.
    pub cancel: Option<CancellationToken>,
}

impl RunRequest {
    pub fn new(sources: Vec<DataSource>, chain: Vec<String>) -> Self {
        Self {
            sources,
            chain,
            rules: ValidationRules::new(),
            format: DEFAULT_FORMAT.to_string(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            cache_enabled: true,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            cancel: None,
        }
    }

    pub fn rules(mut self, rules: ValidationRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn compression_level(mut self, level: i64) -> Self {
        self.compression_level = level;
        self
    }

    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn cancel_with(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Aggregate output of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub document: String,
    pub success_count: usize,
    pub failure_count: usize,
    pub elapsed_millis: u64,
    pub log: Vec<String>,
    pub format: OutputFormat,
    pub compression_level: CompressionLevel,
    pub cache_enabled: bool,
    pub cache_hit_count: usize,
}

/// Request after up-front validation.
struct ValidatedRun {
    format: OutputFormat,
    level: CompressionLevel,
}

/// Drives sources one at a time through fetch, transform, validate,
/// normalize and compress, then formats whatever succeeded.
pub struct Pipeline {
    registry: TransformRegistry,
    fetcher: SourceFetcher,
}

impl Pipeline {
    pub fn new(registry: TransformRegistry, collaborators: Collaborators) -> Self {
        Self {
            registry,
            fetcher: SourceFetcher::new(collaborators),
        }
    }

    fn validate_request(request: &RunRequest) -> Result<ValidatedRun, ConfigError> {
        if request.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        if request.chain.is_empty() {
            return Err(ConfigError::EmptyChain);
        }
        let format = request.format.parse::<OutputFormat>()?;
        let level = CompressionLevel::new(request.compression_level)?;
        Ok(ValidatedRun { format, level })
    }

    /// Execute one run. Only configuration problems are returned as errors;
    /// per-source failures are counted and logged in the result.
    #[instrument(skip_all, fields(sources = request.sources.len(), format = %request.format))]
    pub async fn run(&self, request: RunRequest) -> Result<RunResult, ConfigError> {
        let ValidatedRun { format, level } = Self::validate_request(&request)?;

        PipelineMetrics::record_run_started();
        let started = Instant::now();
        let timeout = Duration::from_millis(request.timeout_ms);
        let deadline = match &request.cancel {
            Some(token) => Deadline::with_token(timeout, token.clone()),
            None => Deadline::after(timeout),
        };

        let chain = TransformChain::new(&self.registry, &request.chain);
        let mut cache = request.cache_enabled.then(TransformCache::new);
        let mut log = RunLog::new();
        let mut results: Vec<(String, String)> = Vec::new();
        let mut success_count = 0;
        let mut failure_count = 0;

        for (index, source) in request.sources.iter().enumerate() {
            if deadline.is_expired() {
                let skipped = request.sources.len() - index;
                warn!(skipped, "deadline reached before all sources were started");
                log.push(format!("Deadline reached; {} source(s) not started", skipped));
                break;
            }

            log.push(format!("Processing source: {} ({})", source.name, source.kind()));

            let outcome = self
                .process_source(source, &chain, &request.rules, level, cache.as_mut(), &deadline, &mut log)
                .await
                .and_then(|value| {
                    if results.iter().any(|(name, _)| name == &source.name) {
                        return Err(SourceError::DuplicateName(source.name.clone()));
                    }
                    Ok(value)
                });

            match outcome {
                Ok(value) => {
                    results.push((source.name.clone(), value));
                    success_count += 1;
                    PipelineMetrics::record_source_success(source.kind());
                    log.push(format!("Successfully processed source: {}", source.name));
                }
                Err(err) => {
                    failure_count += 1;
                    PipelineMetrics::record_source_failure(source.kind(), err.label());
                    match &err {
                        SourceError::Cancelled(_) => {
                            log.push(format!(
                                "Processing of {} was cancelled due to timeout",
                                source.name
                            ));
                        }
                        // Already narrated when the rule failed.
                        SourceError::ValidationFailed { .. } => {}
                        SourceError::EmptyPayload => {
                            log.push(format!("Warning: Empty data received from {}", source.name));
                        }
                        _ => {
                            log.push(format!("Error processing {}: {}", source.name, err));
                        }
                    }
                    warn!(source = %source.name, error = %err, "source failed");
                }
            }
        }

        let document = format_output(&results, format);
        let elapsed = started.elapsed();
        PipelineMetrics::record_run_duration(elapsed.as_secs_f64());
        info!(
            success_count,
            failure_count,
            elapsed_ms = elapsed.as_millis() as u64,
            "pipeline run finished"
        );

        Ok(RunResult {
            document,
            success_count,
            failure_count,
            elapsed_millis: elapsed.as_millis() as u64,
            log: log.into_lines(),
            format,
            compression_level: level,
            cache_enabled: request.cache_enabled,
            cache_hit_count: cache.as_ref().map_or(0, TransformCache::hits),
        })
    }

    /// Per-source state machine: Pending → Fetched → Transformed → Validated
    /// → Normalized → Compressed. Any error leaves the source failed.
    #[allow(clippy::too_many_arguments)]
    async fn process_source(
        &self,
        source: &DataSource,
        chain: &TransformChain<'_>,
        rules: &ValidationRules,
        level: CompressionLevel,
        cache: Option<&mut TransformCache>,
        deadline: &Deadline,
        log: &mut RunLog,
    ) -> Result<String, SourceError> {
        let raw = self.fetcher.fetch(source, deadline).await?;
        if raw.is_empty() {
            return Err(SourceError::EmptyPayload);
        }

        let transformed = chain.apply(&source.name, raw, cache, deadline, log).await?;

        if !rules.is_empty() {
            if let Verdict::Fail { rule } = rules.validate(&transformed) {
                log.push(format!("Validation failed for rule: {}", rule));
                return Err(SourceError::ValidationFailed { rule });
            }
            log.push("All validation rules passed");
        }

        let normalized = normalize(source, &transformed);

        if level.is_none() {
            return Ok(normalized);
        }
        let compressed = compress(&normalized, level);
        log.push(format!("Compressed data with level {}", level));
        Ok(compressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::{HttpClientPort, HttpGetResult};
    use crate::infra::{InMemoryStreams, StaticDatabase, TokioFileReader};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NoHttp;

    #[async_trait]
    impl HttpClientPort for NoHttp {
        async fn get(&self, url: &str) -> Result<HttpGetResult, String> {
            Err(format!("connection refused: {}", url))
        }
    }

    fn pipeline(registry: TransformRegistry) -> Pipeline {
        Pipeline::new(
            registry,
            Collaborators {
                files: Arc::new(TokioFileReader),
                database: Arc::new(
                    StaticDatabase::default()
                        .with("q1", "alpha")
                        .with("q2", "beta")
                        .with("blank", ""),
                ),
                http: Arc::new(NoHttp),
                streams: Arc::new(InMemoryStreams::default().with("s", b"\x02 gamma \x03".to_vec())),
            },
        )
    }

    fn chain(steps: &[&str]) -> Vec<String> {
        steps.iter().map(|s| s.to_string()).collect()
    }

    fn request(sources: Vec<DataSource>, steps: &[&str]) -> RunRequest {
        RunRequest::new(sources, chain(steps)).compression_level(0)
    }

    #[tokio::test]
    async fn test_config_errors_abort_before_any_source() {
        let p = pipeline(TransformRegistry::builtin());
        let db = vec![DataSource::database("d", "q1")];

        assert!(matches!(
            p.run(request(vec![], &["uppercase"])).await,
            Err(ConfigError::NoSources)
        ));
        assert!(matches!(
            p.run(request(db.clone(), &[])).await,
            Err(ConfigError::EmptyChain)
        ));
        assert!(matches!(
            p.run(request(db.clone(), &["uppercase"]).format("protobuf")).await,
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            p.run(request(db.clone(), &["uppercase"]).compression_level(-1)).await,
            Err(ConfigError::CompressionLevelOutOfRange(-1))
        ));
        assert!(matches!(
            p.run(request(db, &["uppercase"]).compression_level(10)).await,
            Err(ConfigError::CompressionLevelOutOfRange(10))
        ));
    }

    #[tokio::test]
    async fn test_unknown_transformation_fails_only_its_source() {
        let p = pipeline(TransformRegistry::builtin());
        let result = p
            .run(request(
                vec![DataSource::database("d1", "q1"), DataSource::database("d2", "q2")],
                &["uppercase", "frobnicate"],
            ))
            .await
            .unwrap();

        assert_eq!(result.success_count, 0);
        assert_eq!(result.failure_count, 2);
        assert!(result
            .log
            .iter()
            .any(|l| l == "Error processing d1: Transformation 'frobnicate' is not supported"));
    }

    #[tokio::test]
    async fn test_results_keep_input_order_and_skip_failures() {
        let p = pipeline(TransformRegistry::builtin());
        let result = p
            .run(request(
                vec![
                    DataSource::database("second", "q2"),
                    DataSource::api("broken", "http://127.0.0.1:1/json"),
                    DataSource::database("first", "q1"),
                    DataSource::stream("s"),
                ],
                &["uppercase"],
            ))
            .await
            .unwrap();

        assert_eq!(result.success_count, 3);
        assert_eq!(result.failure_count, 1);
        assert_eq!(
            result.document,
            "{\"results\": {\"second\": \"BETA\",\"first\": \"ALPHA\",\"s\": \"GAMMA\"}}"
        );
    }

    #[tokio::test]
    async fn test_validation_failure_is_logged_and_counted() {
        let p = pipeline(TransformRegistry::builtin());
        let rules = ValidationRules::new()
            .with("non_empty", |s: &str| !s.is_empty())
            .with("starts_with_a", |s: &str| s.starts_with('A'));
        let result = p
            .run(
                request(
                    vec![DataSource::database("a", "q1"), DataSource::database("b", "q2")],
                    &["uppercase"],
                )
                .rules(rules),
            )
            .await
            .unwrap();

        assert_eq!((result.success_count, result.failure_count), (1, 1));
        assert!(result.log.contains(&"All validation rules passed".to_string()));
        assert!(result.log.contains(&"Validation failed for rule: starts_with_a".to_string()));
        assert!(!result.document.contains("\"b\""));
    }

    #[tokio::test]
    async fn test_empty_payload_fails_source() {
        let p = pipeline(TransformRegistry::builtin());
        let result = p
            .run(request(vec![DataSource::database("blank", "blank")], &["uppercase"]))
            .await
            .unwrap();
        assert_eq!(result.failure_count, 1);
        assert!(result.log.contains(&"Warning: Empty data received from blank".to_string()));
    }

    #[tokio::test]
    async fn test_duplicate_name_fails_second_source_and_shares_cache() {
        let p = pipeline(TransformRegistry::builtin());
        let result = p
            .run(request(
                vec![DataSource::database("dup", "q1"), DataSource::database("dup", "q1")],
                &["uppercase"],
            ))
            .await
            .unwrap();

        assert_eq!((result.success_count, result.failure_count), (1, 1));
        assert_eq!(result.cache_hit_count, 1);
        assert_eq!(result.document, "{\"results\": {\"dup\": \"ALPHA\"}}");
    }

    #[tokio::test]
    async fn test_cache_disabled_reports_zero_hits() {
        let p = pipeline(TransformRegistry::builtin());
        let result = p
            .run(
                request(vec![DataSource::database("d", "q1")], &["lowercase", "lowercase"])
                    .cache_enabled(false),
            )
            .await
            .unwrap();
        assert_eq!(result.cache_hit_count, 0);
        assert!(!result.cache_enabled);
    }

    #[tokio::test]
    async fn test_compression_is_logged_when_enabled() {
        let p = pipeline(TransformRegistry::builtin());
        let result = p
            .run(request(vec![DataSource::database("d", "q1")], &["uppercase"]).compression_level(5))
            .await
            .unwrap();
        assert!(result.log.contains(&"Compressed data with level 5".to_string()));
        assert_eq!(result.document, "{\"results\": {\"d\": \"QUxQSEE=\"}}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_visits_no_sources() {
        let p = pipeline(TransformRegistry::builtin());
        let result = p
            .run(request(vec![DataSource::database("d", "q1")], &["uppercase"]).timeout_ms(0))
            .await
            .unwrap();
        assert_eq!(result.success_count + result.failure_count, 0);
        assert_eq!(result.log, vec!["Deadline reached; 1 source(s) not started".to_string()]);
        assert_eq!(result.document, "{\"results\": {}}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_cancel_stops_iteration() {
        let token = CancellationToken::new();
        token.cancel();
        let p = pipeline(TransformRegistry::builtin());
        let result = p
            .run(request(vec![DataSource::database("d", "q1")], &["uppercase"]).cancel_with(token))
            .await
            .unwrap();
        assert_eq!(result.success_count + result.failure_count, 0);
    }
}
