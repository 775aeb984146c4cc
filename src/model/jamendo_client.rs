//! Jamendo v3.0 catalog client

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::CatalogConfig;
use crate::error::{ApiError, Result};

/// A track as the catalog returns it. The backend stores the same shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogTrack {
    pub id: String,
    pub name: String,
    /// Length in seconds
    pub duration: u64,
    pub artist_id: String,
    pub artist_name: String,
    pub album_id: String,
    pub album_name: String,
    pub image: String,
    pub album_image: String,
    /// Stream URL; empty when the track cannot be streamed
    pub audio: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogArtist {
    pub id: String,
    pub name: String,
    pub image: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    headers: EnvelopeHeaders,
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EnvelopeHeaders {
    status: String,
    code: i64,
    error_message: String,
    results_count: u64,
}

/// Read-only client for the public Jamendo API.
#[derive(Clone)]
pub struct JamendoClient {
    http: Client,
    base_url: String,
    client_id: String,
    page_size: u32,
}

impl JamendoClient {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(20))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("jamendo-rs/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            page_size: config.page_size,
        })
    }

    pub fn has_client_id(&self) -> bool {
        !self.client_id.is_empty()
    }

    pub async fn search_tracks(&self, query: &str) -> Result<Vec<CatalogTrack>> {
        self.fetch("tracks", &[("search", query.to_string())]).await
    }

    pub async fn popular_tracks(&self) -> Result<Vec<CatalogTrack>> {
        self.fetch("tracks", &[("order", "popularity_total".to_string())])
            .await
    }

    pub async fn artist_tracks(&self, artist_id: &str) -> Result<Vec<CatalogTrack>> {
        self.fetch("tracks", &[("artist_id", artist_id.to_string())])
            .await
    }

    pub async fn album_tracks(&self, album_id: &str) -> Result<Vec<CatalogTrack>> {
        self.fetch("tracks", &[("album_id", album_id.to_string())])
            .await
    }

    pub async fn track(&self, id: &str) -> Result<Option<CatalogTrack>> {
        let tracks: Vec<CatalogTrack> = self.fetch("tracks", &[("id", id.to_string())]).await?;
        Ok(tracks.into_iter().next())
    }

    pub async fn search_artists(&self, query: &str) -> Result<Vec<CatalogArtist>> {
        self.fetch("artists", &[("namesearch", query.to_string())])
            .await
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let url = format!("{}/{}/", self.base_url, endpoint);
        tracing::debug!(url = %url, params = ?params, "Catalog request");

        let mut query: Vec<(&str, String)> = vec![
            ("client_id", self.client_id.clone()),
            ("format", "json".to_string()),
            ("limit", self.page_size.to_string()),
        ];
        if endpoint == "tracks" {
            query.push(("audioformat", "mp32".to_string()));
        }
        query.extend(params.iter().cloned());

        let response = self.http.get(&url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(format!("Invalid catalog response: {}", e)))?;

        if envelope.headers.status != "success" {
            tracing::warn!(
                code = envelope.headers.code,
                error = %envelope.headers.error_message,
                "Catalog request rejected"
            );
            return Err(ApiError::Catalog {
                code: envelope.headers.code,
                message: envelope.headers.error_message,
            });
        }

        tracing::debug!(
            endpoint,
            results = envelope.headers.results_count,
            "Catalog request successful"
        );
        Ok(envelope.results)
    }
}
