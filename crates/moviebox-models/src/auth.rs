use serde::{Deserialize, Serialize};

/// Who is logged in. `username` is the display name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub username: String,
}

/// An identity together with its bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: Identity,
    pub token: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("token", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
    pub email: String,
}

impl AuthResponse {
    pub fn into_session(self) -> Session {
        Session {
            identity: Identity {
                email: self.email,
                username: self.username,
            },
            token: self.token,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub username: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_debug_masks_token() {
        let session = AuthResponse {
            token: "secret-token".to_string(),
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
        }
        .into_session();
        let printed = format!("{:?}", session);
        assert!(!printed.contains("secret-token"));
        assert!(printed.contains("ana@example.com"));
    }
}
