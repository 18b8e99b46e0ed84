use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::domain::AppError;

// Fixed demo credentials, there is no user database behind this
const ADMIN_EMAIL: &str = "admin@admin.com";
const ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A logged-in session: opaque token plus the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Check the given credentials against the fixed admin account.
pub fn authenticate(email: &str, password: &str) -> Option<User> {
    if email == ADMIN_EMAIL && password == ADMIN_PASSWORD {
        Some(User {
            id: "admin-001".to_string(),
            email: ADMIN_EMAIL.to_string(),
            name: "Admin User".to_string(),
            role: Role::Admin,
        })
    } else {
        None
    }
}

pub fn issue_token(rng: &mut impl Rng) -> String {
    let bytes: [u8; 16] = rng.r#gen();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Persists the session flag to a small JSON file so a restart stays
/// logged in. The terminal counterpart of the browser's local storage.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A missing or unreadable session file just means "not logged in".
    pub fn load(&self) -> Option<Session> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("No stored session at {:?}: {}", self.path, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(session) => {
                info!("Restored session from {:?}", self.path);
                Some(session)
            }
            Err(e) => {
                warn!("Ignoring malformed session file {:?}: {}", self.path, e);
                None
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<(), AppError> {
        let raw = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, raw)?;
        info!("Stored session for {} at {:?}", session.user.email, self.path);
        Ok(())
    }

    pub fn clear(&self) -> Result<(), AppError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Cleared stored session at {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn accepts_the_demo_credentials() {
        let user = authenticate("admin@admin.com", "admin123").unwrap();
        assert_eq!(user.name, "Admin User");
        assert!(user.is_admin());
    }

    #[test]
    fn rejects_anything_else() {
        assert!(authenticate("admin@admin.com", "wrong").is_none());
        assert!(authenticate("user@example.com", "admin123").is_none());
        assert!(authenticate("", "").is_none());
    }

    #[test]
    fn tokens_are_32_hex_chars() {
        let mut rng = StdRng::seed_from_u64(1);
        let token = issue_token(&mut rng);
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, issue_token(&mut rng));
    }

    #[test]
    fn session_round_trips_through_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        assert!(store.load().is_none());

        let session = Session {
            token: "deadbeef".to_string(),
            user: authenticate("admin@admin.com", "admin123").unwrap(),
        };
        store.save(&session).unwrap();
        assert_eq!(store.load(), Some(session));

        store.clear().unwrap();
        assert!(store.load().is_none());
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn malformed_session_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(SessionStore::new(path).load().is_none());
    }
}
