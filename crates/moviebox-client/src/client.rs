use moviebox_config::{Config, SessionPersistence};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::auth::AuthClient;
use crate::error::ApiError;
use crate::fetch::AuthFetch;
use crate::movies::MovieClient;
use crate::reviews::ReviewClient;
use crate::session::SessionStore;

/// All resource clients wired to one session and one HTTP client.
#[derive(Clone)]
pub struct Moviebox {
    pub auth: AuthClient,
    pub movies: MovieClient,
    pub reviews: ReviewClient,
    fetch: AuthFetch,
}

impl Moviebox {
    pub fn new(fetch: AuthFetch) -> Self {
        Self {
            auth: AuthClient::new(fetch.clone()),
            movies: MovieClient::new(fetch.clone()),
            reviews: ReviewClient::new(fetch.clone()),
            fetch,
        }
    }

    pub fn connect(base_url: Url, session: Arc<SessionStore>) -> Self {
        Self::new(AuthFetch::new(base_url, session))
    }

    /// Restore the persisted session and build clients for the configured API.
    pub fn from_config(config: &Config, persistence: impl SessionPersistence + 'static) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.api.base_url)?;
        let session = Arc::new(SessionStore::initialize(persistence));
        let fetch = AuthFetch::with_timeout(base_url, session, Duration::from_secs(config.api.timeout_seconds))?;
        Ok(Self::new(fetch))
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.fetch.session()
    }

    pub fn base_url(&self) -> &Url {
        self.fetch.base_url()
    }
}
