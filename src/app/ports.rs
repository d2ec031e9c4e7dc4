use async_trait::async_trait;
use tokio::io::AsyncRead;

// Collaborators the core consumes but does not implement. Adapters live in `crate::infra`.

#[async_trait]
pub trait FileReaderPort: Send + Sync {
    async fn read(&self, path: &str) -> std::io::Result<String>;
}

#[async_trait]
pub trait DatabasePort: Send + Sync {
    async fn execute(&self, query: &str) -> Result<String, String>;
}

#[async_trait]
pub trait HttpClientPort: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpGetResult, String>;
}

#[derive(Clone, Debug)]
pub struct HttpGetResult {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpGetResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub type ByteStream = Box<dyn AsyncRead + Send + Unpin>;

#[async_trait]
pub trait StreamPort: Send + Sync {
    /// Open the byte supply backing the named stream source.
    async fn open(&self, source_name: &str) -> std::io::Result<ByteStream>;
}
