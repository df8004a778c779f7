pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{ApiConfig, Config, LoggingConfig, API_URL_ENV};
pub use credentials::{MemoryPersistence, SessionFile, SessionPersistence, StoredFields};
pub use paths::{container_base_path, PathManager};
