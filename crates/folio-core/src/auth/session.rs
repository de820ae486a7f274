use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Token lifetime in hours. The backend issues day-long JWTs.
const TOKEN_EXPIRY_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionData {
    pub token: String,
    pub email: String,
    /// API the token was issued by; a token is useless against another one.
    pub api_url: String,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::hours(TOKEN_EXPIRY_HOURS)
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self) -> i64 {
        (self.expires_at() - Utc::now()).num_minutes().max(0)
    }
}

pub struct Session {
    dir: PathBuf,
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir, data: None }
    }

    /// Load session from disk. Returns false when missing or expired.
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .context("Failed to read session file")?;
            let data: SessionData = serde_json::from_str(&contents)
                .context("Failed to parse session file")?;

            if !data.is_expired() {
                self.data = Some(data);
                return Ok(true);
            }
            debug!(email = %data.email, "Saved session has expired");
        }
        Ok(false)
    }

    /// Save session to disk
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            std::fs::write(path, contents)?;
        }
        Ok(())
    }

    /// Clear session data
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Update session with new data
    pub fn update(&mut self, data: SessionData) {
        self.data = Some(data);
    }

    /// Get the bearer token if a session is loaded
    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.token.as_str())
    }

    /// Check if session is valid (exists and not expired)
    pub fn is_valid(&self) -> bool {
        self.data.as_ref().map(|d| !d.is_expired()).unwrap_or(false)
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(created_at: DateTime<Utc>) -> SessionData {
        SessionData {
            token: "jwt-token".to_string(),
            email: "admin@example.com".to_string(),
            api_url: "http://localhost:5000/api".to_string(),
            created_at,
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "folio-session-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_session_expiry() {
        let fresh = sample(Utc::now());
        assert!(!fresh.is_expired());
        assert!(fresh.minutes_until_expiry() > 60 * 23);

        let old = sample(Utc::now() - Duration::hours(TOKEN_EXPIRY_HOURS + 1));
        assert!(old.is_expired());
        assert_eq!(old.minutes_until_expiry(), 0);
    }

    #[test]
    fn test_session_save_load_clear() {
        let dir = temp_dir("roundtrip");
        let mut session = Session::new(dir.clone());
        assert!(!session.load().unwrap());
        assert!(!session.is_valid());

        let data = sample(Utc::now());
        session.update(data.clone());
        session.save().unwrap();

        let mut reloaded = Session::new(dir.clone());
        assert!(reloaded.load().unwrap());
        assert_eq!(reloaded.data.as_ref(), Some(&data));
        assert_eq!(reloaded.token(), Some("jwt-token"));

        reloaded.clear().unwrap();
        assert!(reloaded.token().is_none());
        assert!(!Session::new(dir.clone()).load().unwrap());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_expired_session_not_loaded() {
        let dir = temp_dir("expired");
        let mut session = Session::new(dir.clone());
        session.update(sample(Utc::now() - Duration::hours(TOKEN_EXPIRY_HOURS * 2)));
        session.save().unwrap();

        let mut reloaded = Session::new(dir.clone());
        assert!(!reloaded.load().unwrap());
        assert!(reloaded.data.is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
