// Data processing pipeline: ingestion, processing, output formatting and orchestration

pub mod deadline;
pub mod ingestion;
pub mod orchestrator;
pub mod output;
pub mod processing;
pub mod run_log;
pub mod source;

// Re-export key types for callers driving a run
pub use deadline::Deadline;
pub use orchestrator::{Pipeline, RunRequest, RunResult};
pub use output::OutputFormat;
pub use source::{DataSource, SourceKind, SourceLocator};
