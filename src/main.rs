use anyhow::Context;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use datamill::app::ports::StreamPort;
use datamill::config::Config;
use datamill::constants::{ENV_CONFIG_PATH, ENV_LOG_DIR};
use datamill::infra::{InMemoryStreams, ReqwestHttp, StaticDatabase, StdinStream, TokioFileReader};
use datamill::logging;
use datamill::pipeline::ingestion::Collaborators;
use datamill::pipeline::processing::transform::TransformRegistry;
use datamill::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "datamill")]
#[command(about = "Fetch, transform, validate and aggregate data from multiple sources")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline described by a TOML file
    Run {
        /// Pipeline file (defaults to $DATAMILL_CONFIG, then pipeline.toml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output format override: json, xml, csv or yaml
        #[arg(long)]
        format: Option<String>,
        /// Compression level override (0-9)
        #[arg(long, allow_negative_numbers = true)]
        compression_level: Option<i64>,
        /// Disable the transformation cache
        #[arg(long)]
        no_cache: bool,
        /// Run timeout override in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Write the document here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Print the full run summary as JSON instead of just the document
        #[arg(long)]
        summary_json: bool,
        /// Print a Prometheus snapshot of the run's metrics to stderr
        #[arg(long)]
        metrics: bool,
    },
    /// List the available transformation names
    Transforms,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Transforms => {
            for name in TransformRegistry::builtin().names() {
                println!("{}", name);
            }
        }
        Commands::Run {
            config,
            format,
            compression_level,
            no_cache,
            timeout_ms,
            output,
            summary_json,
            metrics,
        } => {
            let config_path = config
                .or_else(|| std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("pipeline.toml"));
            let mut config = Config::load(&config_path)
                .with_context(|| format!("loading {}", config_path.display()))?;

            if config.logging.dir.is_none() {
                config.logging.dir = std::env::var(ENV_LOG_DIR).ok();
            }
            let _guard = logging::init_logging(&config.logging);
            let prometheus = if metrics { datamill::metrics::install_recorder() } else { None };

            let mut request = config.to_request()?;
            if let Some(format) = format {
                request = request.format(format);
            }
            if let Some(level) = compression_level {
                request = request.compression_level(level);
            }
            if no_cache {
                request = request.cache_enabled(false);
            }
            if let Some(timeout_ms) = timeout_ms {
                request = request.timeout_ms(timeout_ms);
            }

            // Ctrl-C cancels the run the same way the deadline does
            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupt received, cancelling run");
                    on_signal.cancel();
                }
            });
            request = request.cancel_with(cancel);

            let streams: Arc<dyn StreamPort> = if config.streams.is_empty() {
                Arc::new(StdinStream)
            } else {
                let buffers: HashMap<String, Vec<u8>> = config
                    .streams
                    .iter()
                    .map(|(name, text)| (name.clone(), text.clone().into_bytes()))
                    .collect();
                Arc::new(InMemoryStreams::new(buffers))
            };

            let pipeline = Pipeline::new(
                TransformRegistry::builtin(),
                Collaborators {
                    files: Arc::new(TokioFileReader),
                    database: Arc::new(StaticDatabase::new(config.database.fixtures.clone())),
                    http: Arc::new(ReqwestHttp::new()),
                    streams,
                },
            );

            info!("Starting pipeline run from {}", config_path.display());
            let result = match pipeline.run(request).await {
                Ok(result) => result,
                Err(e) => {
                    error!("Pipeline run aborted: {}", e);
                    return Err(e.into());
                }
            };
            info!(
                "Pipeline finished: {} succeeded, {} failed in {}ms",
                result.success_count, result.failure_count, result.elapsed_millis
            );

            let rendered = if summary_json {
                serde_json::to_string_pretty(&result)?
            } else {
                result.document.clone()
            };
            match output {
                Some(path) => {
                    tokio::fs::write(&path, rendered)
                        .await
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!("Wrote output to {}", path.display());
                }
                None => println!("{}", rendered),
            }

            if let Some(handle) = prometheus {
                eprintln!("{}", handle.render());
            }
        }
    }

    Ok(())
}
