use moviebox_models::{AuthResponse, Identity, LoginRequest, RegisterRequest, RegisterResponse};
use tracing::info;

use crate::error::ApiError;
use crate::fetch::{AuthFetch, Request};

const REGISTER_PATH: &str = "/api/user/register";
const LOGIN_PATH: &str = "/api/user/auth";

#[derive(Clone)]
pub struct AuthClient {
    fetch: AuthFetch,
}

impl AuthClient {
    pub fn new(fetch: AuthFetch) -> Self {
        Self { fetch }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        info!("Registering {}", request.email);
        self.fetch
            .send_json(Request::post(REGISTER_PATH).credential_exchange().json(request)?)
            .await
    }

    /// Exchange credentials for a token and start a session.
    pub async fn login(&self, request: &LoginRequest) -> Result<Identity, ApiError> {
        info!("Logging in {}", request.email);
        let response: AuthResponse = self
            .fetch
            .send_json(Request::post(LOGIN_PATH).credential_exchange().json(request)?)
            .await?;
        let session = response.into_session();
        self.fetch
            .session()
            .login(session.identity.clone(), session.token);
        Ok(session.identity)
    }

    /// Create the account, then log in with the same credentials.
    pub async fn register_and_login(&self, request: &RegisterRequest) -> Result<Identity, ApiError> {
        self.register(request).await?;
        self.login(&LoginRequest {
            email: request.email.clone(),
            password: request.password.clone(),
        })
        .await
    }

    pub fn logout(&self) {
        self.fetch.session().logout();
    }
}
