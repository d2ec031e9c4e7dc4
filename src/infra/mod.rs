// Infrastructure adapters implementing the ports in `crate::app::ports`.

pub mod database;
pub mod file_reader;
pub mod http_client;
pub mod stream;

pub use database::StaticDatabase;
pub use file_reader::TokioFileReader;
pub use http_client::ReqwestHttp;
pub use stream::{InMemoryStreams, StdinStream};
