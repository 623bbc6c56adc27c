use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Duration;

use crate::auth::SessionKeys;
use crate::error::{Error, Result};

/// Name of the environment variable consulted when no --session-secret
/// flag is given.
pub const SESSION_SECRET_ENV: &str = "TEAHOUSE_SESSION_SECRET";

const DEFAULT_SESSION_TTL_DAYS: i64 = 30;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Secret for signing session tokens. Never logged.
    pub session_secret: String,
    pub session_ttl: Duration,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("teahouse.db")
    }

    pub fn session_keys(&self) -> Result<SessionKeys> {
        if self.session_secret.is_empty() {
            return Err(Error::Config(format!(
                "session secret is required (flag --session-secret or {SESSION_SECRET_ENV})"
            )));
        }
        Ok(SessionKeys::new(
            self.session_secret.as_bytes(),
            self.session_ttl,
        ))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            session_secret: String::new(),
            session_ttl: Duration::days(DEFAULT_SESSION_TTL_DAYS),
        }
    }
}
