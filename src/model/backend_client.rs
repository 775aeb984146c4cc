//! Client for the playlist/auth backend

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;

use super::jamendo_client::CatalogTrack;
use crate::error::{ApiError, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<CatalogTrack>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Bearer-token client. Clones share the token.
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(20))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    // ========================================================================
    // Auth
    // ========================================================================

    /// Log in and keep the returned token for later requests.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        tracing::debug!(email, "Logging in");
        let request = self
            .http
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }));
        let response: AuthResponse = Self::send(request).await?;

        self.set_token(Some(response.token.clone())).await;
        tracing::info!(user_id = %response.user.id, username = %response.user.username, "Login successful");
        Ok(response)
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<AuthResponse> {
        tracing::debug!(username, email, "Registering account");
        let request = self.http.post(self.url("/auth/register")).json(&json!({
            "username": username,
            "email": email,
            "password": password,
        }));
        let response: AuthResponse = Self::send(request).await?;

        self.set_token(Some(response.token.clone())).await;
        tracing::info!(user_id = %response.user.id, "Account registered");
        Ok(response)
    }

    pub async fn me(&self) -> Result<User> {
        Self::send(self.authed(Method::GET, "/auth/me").await?).await
    }

    // ========================================================================
    // Playlists
    // ========================================================================

    pub async fn playlists(&self) -> Result<Vec<Playlist>> {
        Self::send(self.authed(Method::GET, "/playlists").await?).await
    }

    pub async fn create_playlist(&self, name: &str) -> Result<Playlist> {
        let request = self
            .authed(Method::POST, "/playlists")
            .await?
            .json(&json!({ "name": name }));
        let playlist: Playlist = Self::send(request).await?;
        tracing::info!(playlist_id = %playlist.id, name, "Playlist created");
        Ok(playlist)
    }

    pub async fn playlist(&self, id: &str) -> Result<Playlist> {
        Self::send(self.authed(Method::GET, &format!("/playlists/{}", id)).await?).await
    }

    pub async fn rename_playlist(&self, id: &str, name: &str) -> Result<Playlist> {
        let request = self
            .authed(Method::PATCH, &format!("/playlists/{}", id))
            .await?
            .json(&json!({ "name": name }));
        Self::send(request).await
    }

    pub async fn delete_playlist(&self, id: &str) -> Result<()> {
        Self::send_empty(self.authed(Method::DELETE, &format!("/playlists/{}", id)).await?).await?;
        tracing::info!(playlist_id = id, "Playlist deleted");
        Ok(())
    }

    pub async fn add_track_to_playlist(&self, id: &str, track: &CatalogTrack) -> Result<Playlist> {
        let request = self
            .authed(Method::POST, &format!("/playlists/{}/tracks", id))
            .await?
            .json(&json!({ "track": track }));
        Self::send(request).await
    }

    pub async fn remove_track_from_playlist(&self, id: &str, track_id: &str) -> Result<Playlist> {
        let path = format!("/playlists/{}/tracks/{}", id, track_id);
        Self::send(self.authed(Method::DELETE, &path).await?).await
    }

    // ========================================================================
    // Liked songs
    // ========================================================================

    pub async fn liked_tracks(&self) -> Result<Vec<CatalogTrack>> {
        Self::send(self.authed(Method::GET, "/liked").await?).await
    }

    pub async fn like_track(&self, track: &CatalogTrack) -> Result<()> {
        let request = self
            .authed(Method::POST, "/liked")
            .await?
            .json(&json!({ "track": track }));
        Self::send_empty(request).await
    }

    pub async fn unlike_track(&self, track_id: &str) -> Result<()> {
        Self::send_empty(self.authed(Method::DELETE, &format!("/liked/{}", track_id)).await?).await
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.token.read().await.clone().ok_or(ApiError::AuthRequired)?;
        Ok(self.http.request(method, self.url(path)).bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = Self::checked(request).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn send_empty(request: RequestBuilder) -> Result<()> {
        Self::checked(request).await?;
        Ok(())
    }

    async fn checked(request: RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), body = %body, "Backend request failed");
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::AuthRequired);
        }
        Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}

/// Pull `message`/`error` out of a JSON error body, else use the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .or_else(|| value.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_json_fields() {
        assert_eq!(error_message(r#"{"message":"Playlist not found"}"#), "Playlist not found");
        assert_eq!(error_message(r#"{"error":"Bad input"}"#), "Bad input");
        assert_eq!(error_message("plain failure"), "plain failure");
    }

    #[test]
    fn playlist_tolerates_missing_fields() {
        let playlist: Playlist = serde_json::from_str(r#"{"id":"p1","name":"Road trip"}"#).unwrap();
        assert!(playlist.tracks.is_empty());
        assert!(playlist.created_at.is_none());

        let playlist: Playlist = serde_json::from_str(
            r#"{"id":"p2","name":"Focus","createdAt":"2024-03-01T10:00:00Z","tracks":[{"id":"9","name":"Song"}]}"#,
        )
        .unwrap();
        assert_eq!(playlist.tracks[0].name, "Song");
        assert!(playlist.created_at.is_some());
    }

    #[tokio::test]
    async fn requests_without_token_need_auth() {
        let client = BackendClient::new("http://localhost:9").unwrap();
        assert!(matches!(client.playlists().await, Err(ApiError::AuthRequired)));
        assert!(!client.is_authenticated().await);
    }
}
