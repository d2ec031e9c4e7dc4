use crate::app::ports::FileReaderPort;
use async_trait::async_trait;

pub struct TokioFileReader;

#[async_trait]
impl FileReaderPort for TokioFileReader {
    async fn read(&self, path: &str) -> std::io::Result<String> {
        tokio::fs::read_to_string(path).await
    }
}
