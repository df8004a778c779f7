use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::ApiError;
use crate::session::SessionStore;

/// Whether a request carries the session's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    None,
    /// Attach the bearer token; fail with `NotAuthenticated` before sending if
    /// there is no session.
    Required,
    /// A credential exchange (login, register). No bearer is sent and a 401
    /// means the submitted credentials were wrong, so the session is untouched.
    Exchange,
}

/// Describes one call; [`AuthFetch`] turns it into an HTTP request.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    auth: Auth,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            auth: Auth::None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn authenticated(mut self) -> Self {
        self.auth = Auth::Required;
        self
    }

    pub fn credential_exchange(mut self) -> Self {
        self.auth = Auth::Exchange;
        self
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn query_pairs<K: AsRef<str>>(mut self, pairs: impl IntoIterator<Item = (K, String)>) -> Self {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.as_ref().to_string(), v)));
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidInput(format!("Failed to encode request body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn auth(&self) -> Auth {
        self.auth
    }
}

/// The one place HTTP calls go through.
///
/// Attaches the bearer credential and turns a 401 into a session expiry: the
/// session is cleared and the auth-error signal raised before the caller sees
/// `AuthenticationExpired`. Credential exchanges are the exception and fail
/// with `InvalidCredentials` instead. Nothing is retried.
#[derive(Clone)]
pub struct AuthFetch {
    http: Client,
    base_url: Url,
    session: Arc<SessionStore>,
}

impl AuthFetch {
    pub fn new(base_url: Url, session: Arc<SessionStore>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            session,
        }
    }

    pub fn with_timeout(base_url: Url, session: Arc<SessionStore>, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> Result<Url, ApiError> {
        // Plain concatenation keeps any path prefix on the base URL.
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{}{}", base, path))?)
    }

    pub async fn send(&self, request: Request) -> Result<Response, ApiError> {
        let token = match request.auth {
            Auth::None | Auth::Exchange => None,
            Auth::Required => Some(self.session.token().ok_or(ApiError::NotAuthenticated)?),
        };

        let url = self.url_for(&request.path)?;
        debug!("{} {}", request.method, url);

        let mut builder = self
            .http
            .request(request.method.clone(), url.clone())
            .header("Accept", "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!("{} {} failed: {}", request.method, url, e);
            ApiError::Network(e)
        })?;

        let status = response.status();
        debug!("{} {} -> {}", request.method, url, status);

        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED if request.auth == Auth::Exchange => {
                let message = response.text().await.unwrap_or_default();
                warn!("{} {} rejected the credentials", request.method, url);
                Err(ApiError::InvalidCredentials(message.trim().to_string()))
            }
            StatusCode::UNAUTHORIZED => {
                warn!("Auth error detected on {} {}, logging out", request.method, url);
                self.session.expire();
                Err(ApiError::AuthenticationExpired)
            }
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            _ => {
                let body = response.text().await.unwrap_or_default();
                let message = if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("unknown error").to_string()
                } else {
                    body.trim().to_string()
                };
                warn!("{} {} failed: {} - {}", request.method, url, status, message);
                Err(ApiError::RequestFailed {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    pub async fn send_json<T: DeserializeOwned>(&self, request: Request) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// For endpoints whose success body is irrelevant.
    pub async fn send_empty(&self, request: Request) -> Result<(), ApiError> {
        self.send(request).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moviebox_config::MemoryPersistence;

    fn fetch(base: &str) -> AuthFetch {
        let session = Arc::new(SessionStore::initialize(MemoryPersistence::new()));
        AuthFetch::new(Url::parse(base).unwrap(), session)
    }

    #[test]
    fn test_url_for_keeps_base_prefix() {
        let f = fetch("http://localhost:8080/backend/");
        assert_eq!(
            f.url_for("/api/movie/all").unwrap().as_str(),
            "http://localhost:8080/backend/api/movie/all"
        );
        let f = fetch("http://localhost:8080");
        assert_eq!(f.url_for("/api/movie/all").unwrap().as_str(), "http://localhost:8080/api/movie/all");
    }

    #[tokio::test]
    async fn test_required_auth_fails_fast_without_session() {
        // Port 9 (discard) is never contacted: the check happens first.
        let f = fetch("http://127.0.0.1:9");
        let err = f
            .send(Request::get("/api/user/movie/all").authenticated())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));
    }

    #[test]
    fn test_request_builder() {
        let r = Request::patch("/api/user/movie/rating")
            .authenticated()
            .query("listType", "favorite");
        assert_eq!(r.method(), &Method::PATCH);
        assert_eq!(r.auth(), Auth::Required);
        assert_eq!(r.query, vec![("listType".to_string(), "favorite".to_string())]);

        let r = Request::post("/api/user/auth").credential_exchange();
        assert_eq!(r.auth(), Auth::Exchange);
    }
}
