use moviebox_config::SessionPersistence;
use moviebox_models::{Identity, Session};
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

/// Broadcast whenever the server rejects a credential. Carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthError;

const AUTH_ERROR_CAPACITY: usize = 16;

/// Single source of truth for who is logged in.
///
/// Every transition writes (or clears) the token/username/email triple as one
/// unit, then fans out to subscribers before returning.
pub struct SessionStore {
    persistence: Box<dyn SessionPersistence>,
    current: Mutex<Option<Session>>,
    identity_tx: watch::Sender<Option<Identity>>,
    auth_error_tx: broadcast::Sender<AuthError>,
}

impl SessionStore {
    /// Rebuild the session from persisted fields without contacting the server.
    ///
    /// An incomplete triple counts as logged out and is cleared.
    pub fn initialize(persistence: impl SessionPersistence + 'static) -> Self {
        let session = match persistence.read() {
            Ok(fields) if fields.is_empty() => None,
            Ok(fields) => match fields.into_session() {
                Some(session) => {
                    debug!("Restored session for {}", session.identity.email);
                    Some(session)
                }
                None => {
                    warn!("Persisted session is incomplete, treating as logged out");
                    if let Err(e) = persistence.clear() {
                        warn!("Failed to clear incomplete session: {}", e);
                    }
                    None
                }
            },
            Err(e) => {
                warn!("Failed to read persisted session: {}", e);
                None
            }
        };

        let (identity_tx, _) = watch::channel(session.as_ref().map(|s| s.identity.clone()));
        let (auth_error_tx, _) = broadcast::channel(AUTH_ERROR_CAPACITY);

        Self {
            persistence: Box::new(persistence),
            current: Mutex::new(session),
            identity_tx,
            auth_error_tx,
        }
    }

    pub fn identity(&self) -> Option<Identity> {
        self.current.lock().as_ref().map(|s| s.identity.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.current.lock().as_ref().map(|s| s.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.lock().is_some()
    }

    /// Latest identity, updated synchronously on every transition.
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity_tx.subscribe()
    }

    pub fn auth_errors(&self) -> broadcast::Receiver<AuthError> {
        self.auth_error_tx.subscribe()
    }

    pub fn login(&self, identity: Identity, token: String) {
        let session = Session { identity, token };
        let mut current = self.current.lock();
        if let Err(e) = self.persistence.write(&session) {
            warn!("Failed to persist session, it will not survive a restart: {}", e);
        }
        info!("Logged in as {}", session.identity.username);
        self.identity_tx.send_replace(Some(session.identity.clone()));
        *current = Some(session);
    }

    /// Idempotent: logging out with no session changes nothing.
    pub fn logout(&self) {
        if self.clear() {
            info!("Logged out");
        }
    }

    /// The server rejected a credential. Same effect as [`logout`](Self::logout),
    /// plus a global [`AuthError`] broadcast. Whatever session is active at
    /// that moment is cleared, even one that logged in after the rejected
    /// request was sent.
    pub fn expire(&self) {
        if self.clear() {
            warn!("Session expired, logged out");
        }
        self.broadcast_auth_error();
    }

    fn broadcast_auth_error(&self) {
        // No receivers is fine
        let _ = self.auth_error_tx.send(AuthError);
    }

    /// Returns whether there was a session to clear.
    fn clear(&self) -> bool {
        let mut current = self.current.lock();
        if current.is_none() {
            return false;
        }
        if let Err(e) = self.persistence.clear() {
            warn!("Failed to clear persisted session: {}", e);
        }
        *current = None;
        self.identity_tx.send_replace(None);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moviebox_config::credentials::{EMAIL_KEY, TOKEN_KEY, USERNAME_KEY};
    use moviebox_config::{MemoryPersistence, SessionFile};
    use std::sync::Arc;

    fn ana() -> Identity {
        Identity {
            email: "ana@example.com".to_string(),
            username: "ana".to_string(),
        }
    }

    #[test]
    fn test_login_survives_restart() {
        let shared = Arc::new(MemoryPersistence::new());
        let store = SessionStore::initialize(shared.clone());
        store.login(ana(), "tok".to_string());
        drop(store);

        let restarted = SessionStore::initialize(shared.clone());
        assert_eq!(restarted.identity(), Some(ana()));
        assert_eq!(restarted.token().as_deref(), Some("tok"));
    }

    #[test]
    fn test_login_survives_restart_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");

        let store = SessionStore::initialize(SessionFile::new(path.clone()));
        store.login(ana(), "tok".to_string());

        let restarted = SessionStore::initialize(SessionFile::new(path));
        assert_eq!(restarted.identity(), Some(ana()));
    }

    #[test]
    fn test_partial_state_is_logged_out_and_cleared() {
        let shared = Arc::new(MemoryPersistence::with_fields(&[
            (TOKEN_KEY, "tok"),
            (USERNAME_KEY, "ana"),
        ]));
        let store = SessionStore::initialize(shared.clone());
        assert!(!store.is_authenticated());
        assert!(shared.is_empty());
    }

    #[test]
    fn test_logout_leaves_no_fields() {
        let shared = Arc::new(MemoryPersistence::new());
        let store = SessionStore::initialize(shared.clone());
        store.login(ana(), "tok".to_string());
        assert_eq!(shared.len(), 3);

        store.logout();
        assert!(shared.is_empty());
        assert_eq!(store.identity(), None);
        // Second logout is a no-op
        store.logout();
    }

    #[test]
    fn test_subscribers_see_transitions_immediately() {
        let store = SessionStore::initialize(MemoryPersistence::new());
        let rx = store.subscribe();
        assert_eq!(*rx.borrow(), None);

        store.login(ana(), "tok".to_string());
        assert_eq!(*rx.borrow(), Some(ana()));

        store.logout();
        assert_eq!(*rx.borrow(), None);
    }

    #[test]
    fn test_expire_clears_and_broadcasts() {
        let shared = Arc::new(MemoryPersistence::new());
        let store = SessionStore::initialize(shared.clone());
        let mut errors = store.auth_errors();
        store.login(ana(), "tok".to_string());

        store.expire();
        assert!(!store.is_authenticated());
        assert!(shared.is_empty());
        assert_eq!(errors.try_recv(), Ok(AuthError));

        // Already cleared: still signals, still no error
        store.expire();
        assert_eq!(errors.try_recv(), Ok(AuthError));
    }

    #[test]
    fn test_expire_clears_whichever_session_is_active() {
        let shared = Arc::new(MemoryPersistence::with_fields(&[
            (TOKEN_KEY, "old"),
            (USERNAME_KEY, "ana"),
            (EMAIL_KEY, "ana@example.com"),
        ]));
        let store = SessionStore::initialize(shared.clone());
        store.login(ana(), "new".to_string());

        store.expire();
        assert!(!store.is_authenticated());
        assert!(shared.is_empty());
    }
}
