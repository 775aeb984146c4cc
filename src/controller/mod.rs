//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and view, and drives the playback core.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key and mouse event handling
//! - `playback`: Transport, likes, playlist edits and the queue view
//! - `navigation`: Library/playlist/search/artist navigation

mod input;
mod playback;
mod navigation;

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::ApiError;
use crate::model::AppModel;
use crate::player::PlaybackController;

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) player: PlaybackController,
    seek_step_ms: u64,
}

impl AppController {
    pub fn new(model: Arc<Mutex<AppModel>>, player: PlaybackController, seek_step_ms: u64) -> Self {
        Self {
            model,
            player,
            seek_step_ms,
        }
    }

    pub fn player(&self) -> &PlaybackController {
        &self.player
    }

    /// Run a transport action in the background so a slow load never blocks
    /// the draw loop. Newer loads supersede older ones inside the player.
    pub(crate) fn spawn<F, Fut>(&self, action: F)
    where
        F: FnOnce(AppController) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(action(self.clone()));
    }

    pub(crate) fn format_error(error: &anyhow::Error) -> String {
        let Some(api_error) = error.downcast_ref::<ApiError>() else {
            return format!("Error: {}", error);
        };

        match api_error {
            ApiError::AuthRequired => "Please log in first (jamendo-rs login).".to_string(),
            ApiError::Catalog { message, .. } => {
                format!("Catalog error: {}. Check your Jamendo client_id.", message)
            }
            ApiError::Request(e) if e.is_connect() || e.is_timeout() => {
                "Network error. Check your connection.".to_string()
            }
            other => match other.status_code() {
                Some(404) => "Not found. It may have been deleted.".to_string(),
                Some(429) => "Rate limited. Please wait a moment.".to_string(),
                Some(status) if status >= 500 => "Server error. Try again later.".to_string(),
                _ => format!("Error: {}", other),
            },
        }
    }

    pub(crate) async fn report_error(&self, error: anyhow::Error) {
        let message = Self::format_error(&error);
        let model = self.model.lock().await;
        model.set_content_loading(false).await;
        model.set_error(message).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_api_errors() {
        let auth = anyhow::Error::new(ApiError::AuthRequired);
        assert_eq!(AppController::format_error(&auth), "Please log in first (jamendo-rs login).");

        let missing = anyhow::Error::new(ApiError::Status {
            status: 404,
            message: "no such playlist".into(),
        });
        assert_eq!(AppController::format_error(&missing), "Not found. It may have been deleted.");

        let catalog = anyhow::Error::new(ApiError::Catalog {
            code: 5,
            message: "Invalid client_id".into(),
        });
        assert!(AppController::format_error(&catalog).contains("client_id"));

        let other = anyhow::anyhow!("disk full");
        assert_eq!(AppController::format_error(&other), "Error: disk full");
    }
}
