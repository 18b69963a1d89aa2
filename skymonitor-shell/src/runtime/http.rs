//! `Fetcher` sur reqwest : chemins relatifs à l'URL du backend.

use crate::config::BackendConf;
use crate::fetch::{FetchError, Fetcher};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(conf: &BackendConf) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(conf.timeout_ms))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self { client, base_url: conf.base_url.trim_end_matches('/').to_string() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read(response: reqwest::Response) -> Result<String, FetchError> {
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        response.text().await.map_err(|e| FetchError::Body(e.to_string()))
    }
}

impl Fetcher for HttpFetcher {
    fn get_text<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, FetchError>> {
        async move {
            let response = self
                .client
                .get(self.url(path))
                .header("User-Agent", "skymonitor-shell")
                .send()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;
            Self::read(response).await
        }
        .boxed()
    }

    fn post_json<'a>(
        &'a self,
        path: &'a str,
        body: serde_json::Value,
    ) -> BoxFuture<'a, Result<String, FetchError>> {
        async move {
            let response = self
                .client
                .post(self.url(path))
                .json(&body)
                .send()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;
            Self::read(response).await
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_base_and_path() {
        let conf = BackendConf { base_url: "http://localhost:5000/".into(), timeout_ms: 1000 };
        let fetcher = HttpFetcher::new(&conf).unwrap();
        assert_eq!(fetcher.url("/api/postes"), "http://localhost:5000/api/postes");
    }
}
