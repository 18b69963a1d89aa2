/*!
Fetcher simulé pour tests sans backend

Chaque chemin reçoit une réponse préenregistrée ; un chemin inconnu répond 404.
Toutes les requêtes sont journalisées pour les assertions.
*/

use futures::future::{self, BoxFuture};
use futures::FutureExt;
use serde_json::Value;
use skymonitor_shell::fetch::{FetchError, Fetcher};
use skymonitor_shell::state::{new_state, snapshot, Shared};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedRequest {
    Get(String),
    Post { path: String, body: Value },
}

#[derive(Clone, Default)]
pub struct StubFetcher {
    responses: Shared<HashMap<String, Result<String, FetchError>>>,
    requests: Shared<Vec<RecordedRequest>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self { responses: new_state(HashMap::new()), requests: new_state(Vec::new()) }
    }

    /// Réponse 200 avec ce corps
    pub fn respond(&self, path: &str, body: impl Into<String>) {
        self.responses.lock().insert(path.to_string(), Ok(body.into()));
    }

    pub fn respond_json(&self, path: &str, body: &Value) {
        self.respond(path, body.to_string());
    }

    pub fn fail(&self, path: &str, error: FetchError) {
        self.responses.lock().insert(path.to_string(), Err(error));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        snapshot(&self.requests)
    }

    /// Nombre de GET émis sur ce chemin
    pub fn get_count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| matches!(r, RecordedRequest::Get(p) if p == path))
            .count()
    }

    fn lookup(&self, path: &str) -> Result<String, FetchError> {
        self.responses.lock().get(path).cloned().unwrap_or(Err(FetchError::Status(404)))
    }
}

impl Fetcher for StubFetcher {
    fn get_text<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, FetchError>> {
        self.requests.lock().push(RecordedRequest::Get(path.to_string()));
        log::debug!("🌐 [STUB] GET {path}");
        future::ready(self.lookup(path)).boxed()
    }

    fn post_json<'a>(&'a self, path: &'a str, body: Value) -> BoxFuture<'a, Result<String, FetchError>> {
        log::debug!("🌐 [STUB] POST {path}: {body}");
        self.requests.lock().push(RecordedRequest::Post { path: path.to_string(), body });
        future::ready(self.lookup(path)).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_stub_responses_and_recording() {
        let stub = StubFetcher::new();
        stub.respond("/postes", "<main>ok</main>");
        stub.fail("/api/postes", FetchError::Status(500));

        assert_eq!(stub.get_text("/postes").await.unwrap(), "<main>ok</main>");
        assert_eq!(stub.get_text("/api/postes").await, Err(FetchError::Status(500)));
        assert_eq!(stub.get_text("/nope").await, Err(FetchError::Status(404)));
        stub.post_json("/api/scan/network", json!({"network": "10.0.0.0/24"})).await.ok();

        assert_eq!(stub.get_count("/postes"), 1);
        assert_eq!(stub.requests().len(), 4);
    }
}
