// Pipeline ingestion: resolving a data source into its raw text payload

pub mod fetcher;

pub use fetcher::{Collaborators, SourceFetcher};
