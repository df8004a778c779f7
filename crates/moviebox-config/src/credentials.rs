use anyhow::Result;
use moviebox_models::{Identity, Session};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

pub const TOKEN_KEY: &str = "token";
pub const USERNAME_KEY: &str = "username";
pub const EMAIL_KEY: &str = "email";

const SESSION_KEYS: [&str; 3] = [TOKEN_KEY, USERNAME_KEY, EMAIL_KEY];

/// The three persisted session fields as they were found, possibly incomplete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredFields {
    pub token: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl StoredFields {
    fn from_map(map: &HashMap<String, String>) -> Self {
        Self {
            token: map.get(TOKEN_KEY).cloned(),
            username: map.get(USERNAME_KEY).cloned(),
            email: map.get(EMAIL_KEY).cloned(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.username.is_none() && self.email.is_none()
    }

    /// A session only exists when all three fields are present.
    pub fn into_session(self) -> Option<Session> {
        match (self.token, self.username, self.email) {
            (Some(token), Some(username), Some(email)) => Some(Session {
                identity: Identity { email, username },
                token,
            }),
            _ => None,
        }
    }
}

/// Durable storage for the token/username/email triple.
///
/// Implementations must write and remove the three fields as one unit.
pub trait SessionPersistence: Send + Sync {
    fn read(&self) -> Result<StoredFields>;
    fn write(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

impl<T: SessionPersistence + ?Sized> SessionPersistence for std::sync::Arc<T> {
    fn read(&self) -> Result<StoredFields> {
        (**self).read()
    }

    fn write(&self, session: &Session) -> Result<()> {
        (**self).write(session)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct SessionData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

/// Session fields kept in a TOML file in the config directory.
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        let data: SessionData = toml::from_str(&content)?;
        Ok(data.data)
    }

    fn save(&self, data: HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&SessionData { data })?;
        // Write-then-rename so readers never observe a half-written triple.
        let tmp = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionPersistence for SessionFile {
    fn read(&self) -> Result<StoredFields> {
        Ok(StoredFields::from_map(&self.load()?))
    }

    fn write(&self, session: &Session) -> Result<()> {
        let mut data = self.load().unwrap_or_default();
        data.insert(TOKEN_KEY.to_string(), session.token.clone());
        data.insert(USERNAME_KEY.to_string(), session.identity.username.clone());
        data.insert(EMAIL_KEY.to_string(), session.identity.email.clone());
        self.save(data)
    }

    fn clear(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut data = self.load().unwrap_or_default();
        for key in SESSION_KEYS {
            data.remove(key);
        }
        if data.is_empty() {
            std::fs::remove_file(&self.path)?;
            return Ok(());
        }
        self.save(data)
    }
}

/// In-process persistence; survives a `SessionStore` rebuild but not the process.
#[derive(Default)]
pub struct MemoryPersistence {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed arbitrary fields, including incomplete sets.
    pub fn with_fields(fields: &[(&str, &str)]) -> Self {
        let data = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            data: Mutex::new(data),
        }
    }

    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }
}

impl SessionPersistence for MemoryPersistence {
    fn read(&self) -> Result<StoredFields> {
        Ok(StoredFields::from_map(&self.data.lock()))
    }

    fn write(&self, session: &Session) -> Result<()> {
        let mut data = self.data.lock();
        data.insert(TOKEN_KEY.to_string(), session.token.clone());
        data.insert(USERNAME_KEY.to_string(), session.identity.username.clone());
        data.insert(EMAIL_KEY.to_string(), session.identity.email.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut data = self.data.lock();
        for key in SESSION_KEYS {
            data.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session() -> Session {
        Session {
            identity: Identity {
                email: "ana@example.com".to_string(),
                username: "ana".to_string(),
            },
            token: "tok-123".to_string(),
        }
    }

    #[test]
    fn test_session_file_write_and_read() {
        let dir = TempDir::new().unwrap();
        let file = SessionFile::new(dir.path().join("session.toml"));
        file.write(&session()).unwrap();

        let reopened = SessionFile::new(dir.path().join("session.toml"));
        let fields = reopened.read().unwrap();
        assert_eq!(fields.token.as_deref(), Some("tok-123"));
        assert_eq!(fields.into_session(), Some(session()));
    }

    #[test]
    fn test_session_file_clear_removes_all_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.toml");
        let file = SessionFile::new(path.clone());
        file.write(&session()).unwrap();
        file.clear().unwrap();

        assert!(!path.exists());
        assert!(file.read().unwrap().is_empty());
        // Clearing twice is a no-op
        file.clear().unwrap();
    }

    #[test]
    fn test_session_file_clear_keeps_unrelated_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.toml");
        std::fs::write(&path, "token = \"t\"\nusername = \"u\"\nemail = \"e\"\ntheme = \"dark\"\n").unwrap();

        let file = SessionFile::new(path.clone());
        file.clear().unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("theme"));
        assert!(!content.contains("token"));
    }

    #[test]
    fn test_partial_fields_are_not_a_session() {
        let memory = MemoryPersistence::with_fields(&[(TOKEN_KEY, "t"), (EMAIL_KEY, "e")]);
        let fields = memory.read().unwrap();
        assert!(!fields.is_empty());
        assert_eq!(fields.into_session(), None);
    }

    #[test]
    fn test_memory_clear() {
        let memory = MemoryPersistence::new();
        memory.write(&session()).unwrap();
        assert_eq!(memory.len(), 3);
        memory.clear().unwrap();
        assert!(memory.is_empty());
    }
}
