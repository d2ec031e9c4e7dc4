use crate::app::ports::{ByteStream, StreamPort};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Cursor;

/// Serves each stream source from a preloaded byte buffer keyed by source name.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStreams {
    buffers: HashMap<String, Vec<u8>>,
}

impl InMemoryStreams {
    pub fn new(buffers: HashMap<String, Vec<u8>>) -> Self {
        Self { buffers }
    }

    pub fn with(mut self, source_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.buffers.insert(source_name.into(), bytes.into());
        self
    }
}

#[async_trait]
impl StreamPort for InMemoryStreams {
    async fn open(&self, source_name: &str) -> std::io::Result<ByteStream> {
        let bytes = self.buffers.get(source_name).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no stream registered for source '{}'", source_name),
            )
        })?;
        Ok(Box::new(Cursor::new(bytes)))
    }
}

/// Every stream source reads from the process's standard input.
pub struct StdinStream;

#[async_trait]
impl StreamPort for StdinStream {
    async fn open(&self, _source_name: &str) -> std::io::Result<ByteStream> {
        Ok(Box::new(tokio::io::stdin()))
    }
}
