use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::config::ServerConfig;

/// A minted curator session.
#[derive(Debug, Clone)]
pub struct CuratorSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Password-gated curator mode. A password from the server-side allowlist
/// is exchanged for an expiring bearer token; every subsequent request is
/// validated against the session table here, never client-side.
#[derive(Clone)]
pub struct CuratorAuth {
    passwords: Vec<String>,
    ttl_secs: u64,
    sessions: Arc<Mutex<HashMap<String, DateTime<Utc>>>>,
}

impl CuratorAuth {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            passwords: config.curator_passwords.clone(),
            ttl_secs: config.session_ttl_secs,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Curator mode is locked until at least one password is configured.
    pub fn is_configured(&self) -> bool {
        !self.passwords.is_empty()
    }

    /// Exchange a password for a session token. `None` on a wrong password
    /// or when curator mode is unconfigured.
    pub fn login(&self, password: &str) -> Option<CuratorSession> {
        if !self.passwords.iter().any(|p| p == password) {
            return None;
        }

        let token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + Duration::seconds(self.ttl_secs as i64);

        let mut sessions = self.sessions.lock().unwrap();
        sessions.retain(|_, expiry| *expiry > Utc::now());
        sessions.insert(token.clone(), expires_at);

        Some(CuratorSession { token, expires_at })
    }

    /// Validate a bearer token against the live session table.
    pub fn validate(&self, token: &str) -> bool {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get(token) {
            Some(expiry) if *expiry > Utc::now() => true,
            Some(_) => {
                sessions.remove(token);
                false
            }
            None => false,
        }
    }
}
