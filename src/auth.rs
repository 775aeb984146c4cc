//! Session persistence and the login/register/restore flows
//!
//! The backend hands out a bearer token on login. It is kept as JSON next to
//! the other data files so the next start can reuse it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::model::{AuthResponse, BackendClient, User};

pub const SESSION_FILE: &str = "session.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl From<AuthResponse> for Session {
    fn from(response: AuthResponse) -> Self {
        Self {
            token: response.token,
            user: response.user,
        }
    }
}

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SESSION_FILE),
        }
    }

    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        tracing::debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            tracing::info!("Session cleared");
        }
        Ok(())
    }
}

pub async fn login(backend: &BackendClient, store: &SessionStore, email: &str, password: &str) -> Result<Session> {
    let session = Session::from(backend.login(email, password).await?);
    store.save(&session)?;
    Ok(session)
}

pub async fn register(
    backend: &BackendClient,
    store: &SessionStore,
    username: &str,
    email: &str,
    password: &str,
) -> Result<Session> {
    let session = Session::from(backend.register(username, email, password).await?);
    store.save(&session)?;
    Ok(session)
}

/// Reuse a stored session if the backend still accepts its token.
///
/// A rejected token clears the stored session. Network failures keep it, so
/// the next start can try again.
pub async fn restore_session(backend: &BackendClient, store: &SessionStore) -> Result<Option<User>> {
    let Some(session) = store.load()? else {
        tracing::info!("No stored session found");
        return Ok(None);
    };

    backend.set_token(Some(session.token.clone())).await;
    match backend.me().await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, username = %user.username, "Session restored");
            Ok(Some(user))
        }
        Err(ApiError::AuthRequired) => {
            tracing::warn!("Stored session rejected, logging out");
            backend.set_token(None).await;
            store.clear()?;
            Ok(None)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not validate session, using it offline");
            Ok(Some(session.user))
        }
    }
}

pub async fn logout(backend: &BackendClient, store: &SessionStore) -> Result<()> {
    backend.set_token(None).await;
    store.clear()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            token: "tok-123".to_string(),
            user: User {
                id: "u1".to_string(),
                username: "ana".to_string(),
                email: "ana@example.com".to_string(),
            },
        }
    }

    #[test]
    fn store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(&dir.path().join("data"));
        assert_eq!(store.load().unwrap(), None);

        store.save(&session()).unwrap();
        assert_eq!(store.load().unwrap(), Some(session()));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[tokio::test]
    async fn restore_without_session_is_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());
        let backend = BackendClient::new("http://localhost:9").unwrap();

        assert_eq!(restore_session(&backend, &store).await.unwrap(), None);
        assert!(!backend.is_authenticated().await);
    }
}
