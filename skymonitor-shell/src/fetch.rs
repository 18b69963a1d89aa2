use futures::future::BoxFuture;

/// Échecs réseau vus par la navigation et les initialiseurs de pages
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("invalid response body: {0}")]
    Body(String),
}

/// Accès au backend (`fetch` du navigateur).
///
/// Les chemins sont relatifs à l'origine du tableau de bord (`/dashboard`,
/// `/api/serveurs`...). Un statut non-2xx est une erreur.
pub trait Fetcher: Send + Sync {
    fn get_text<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, FetchError>>;

    fn post_json<'a>(
        &'a self,
        path: &'a str,
        body: serde_json::Value,
    ) -> BoxFuture<'a, Result<String, FetchError>>;
}
