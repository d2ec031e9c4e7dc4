use crate::app::ports::{HttpClientPort, HttpGetResult};
use async_trait::async_trait;

pub struct ReqwestHttp {
    client: reqwest::Client,
}

impl ReqwestHttp {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestHttp {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClientPort for ReqwestHttp {
    async fn get(&self, url: &str) -> Result<HttpGetResult, String> {
        let resp = self.client.get(url).send().await.map_err(|e| e.to_string())?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await.map_err(|e| e.to_string())?.to_vec();
        Ok(HttpGetResult { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_get_returns_status_and_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/json/items");
                then.status(200).body("{\"a\": 1}");
            })
            .await;

        let http = ReqwestHttp::new();
        let result = http.get(&server.url("/json/items")).await.unwrap();

        mock.assert_async().await;
        assert!(result.is_success());
        assert_eq!(result.body, b"{\"a\": 1}".to_vec());
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported_not_raised() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404);
            })
            .await;

        let result = ReqwestHttp::new().get(&server.url("/missing")).await.unwrap();
        assert_eq!(result.status, 404);
        assert!(!result.is_success());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_error() {
        let result = ReqwestHttp::new().get("http://127.0.0.1:1/").await;
        assert!(result.is_err());
    }
}
