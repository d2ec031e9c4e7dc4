use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{debug, instrument};

use crate::app::ports::{DatabasePort, FileReaderPort, HttpClientPort, StreamPort};
use crate::constants::MAX_STREAM_BYTES;
use crate::error::{FetchError, SourceError};
use crate::pipeline::deadline::Deadline;
use crate::pipeline::source::{DataSource, SourceKind, SourceLocator};

/// The external collaborators a fetch may need, one per source kind.
#[derive(Clone)]
pub struct Collaborators {
    pub files: Arc<dyn FileReaderPort>,
    pub database: Arc<dyn DatabasePort>,
    pub http: Arc<dyn HttpClientPort>,
    pub streams: Arc<dyn StreamPort>,
}

/// Resolves a [`DataSource`] into raw text.
#[derive(Clone)]
pub struct SourceFetcher {
    collaborators: Collaborators,
}

impl SourceFetcher {
    pub fn new(collaborators: Collaborators) -> Self {
        Self { collaborators }
    }

    /// Fetch the payload for `source`. A deadline firing mid-fetch yields
    /// `SourceError::Cancelled`, never a `FetchError`.
    #[instrument(skip(self, source, deadline), fields(source = %source.name, kind = %source.kind()))]
    pub async fn fetch(&self, source: &DataSource, deadline: &Deadline) -> Result<String, SourceError> {
        match &source.locator {
            SourceLocator::File { path } => {
                require(path, SourceKind::File, "File path")?;
                let content = deadline.run(self.collaborators.files.read(path)).await?;
                content.map_err(|e| {
                    SourceError::from(FetchError::Io {
                        path: path.clone(),
                        source: e,
                    })
                })
            }
            SourceLocator::Database { query } => {
                require(query, SourceKind::Database, "SQL query")?;
                let rows = deadline.run(self.collaborators.database.execute(query)).await?;
                rows.map_err(|e| FetchError::Database(e).into())
            }
            SourceLocator::Api { url } => {
                require(url, SourceKind::Api, "URL")?;
                let response = deadline
                    .run(self.collaborators.http.get(url))
                    .await?
                    .map_err(FetchError::Network)?;
                debug!(status = response.status, bytes = response.body.len(), "api response");
                if !response.is_success() {
                    return Err(FetchError::HttpStatus {
                        status: response.status,
                        url: url.clone(),
                    }
                    .into());
                }
                Ok(String::from_utf8_lossy(&response.body).into_owned())
            }
            SourceLocator::Stream => {
                let bytes = deadline.run(self.read_stream(&source.name)).await?;
                let bytes = bytes.map_err(FetchError::Stream)?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
        }
    }

    async fn read_stream(&self, source_name: &str) -> std::io::Result<Vec<u8>> {
        let reader = self.collaborators.streams.open(source_name).await?;
        let mut buffer = Vec::new();
        reader.take(MAX_STREAM_BYTES).read_to_end(&mut buffer).await?;
        Ok(buffer)
    }
}

fn require(value: &str, kind: SourceKind, field: &'static str) -> Result<(), SourceError> {
    if value.is_empty() {
        return Err(SourceError::MissingLocator { kind, field });
    }
    Ok(())
}
