//! Playback, likes, playlist edits and the queue view

use crate::model::{ActiveSection, CatalogTrack, ContentView, PlaylistItem};
use crate::player::PlayableItem;

use super::AppController;

impl AppController {
    pub async fn toggle_playback(&self) {
        let before = self.player.snapshot().await;
        tracing::debug!(is_playing = before.is_playing, phase = ?before.phase, "Toggling playback");
        self.player.toggle_play_pause().await;
    }

    pub async fn next_track(&self) {
        tracing::debug!("Skipping to next track");
        self.player.next().await;
        self.refresh_queue_if_visible().await;
    }

    pub async fn previous_track(&self) {
        self.player.previous().await;
        self.refresh_queue_if_visible().await;
    }

    /// Jump `seek_step_ms` backward or forward in the current track.
    pub async fn seek_relative(&self, forward: bool) {
        let snapshot = self.player.snapshot().await;
        if snapshot.current_item.is_none() {
            return;
        }
        let target = if forward {
            snapshot.position_ms.saturating_add(self.seek_step_ms)
        } else {
            snapshot.position_ms.saturating_sub(self.seek_step_ms)
        };
        self.player.seek_to(target).await;
    }

    pub async fn toggle_now_playing(&self) {
        let visible = self.player.toggle_now_playing_visible().await;
        tracing::debug!(visible, "Now playing panel toggled");
    }

    /// Make `list` the play queue and start playing the track at `index`.
    pub async fn play_track_list(&self, list: &[CatalogTrack], index: usize) {
        let Some(selected) = list.get(index).map(PlayableItem::from) else {
            return;
        };

        if !selected.is_playable() {
            let model = self.model.lock().await;
            model.set_error("This track has no audio stream.".to_string()).await;
        }

        let items: Vec<PlayableItem> = list.iter().map(PlayableItem::from).collect();
        self.player.set_queue(items).await;
        self.player.play_external_item(selected).await;
        self.refresh_queue_if_visible().await;
    }

    pub async fn toggle_liked_track(&self) {
        let (selected, backend, cache) = {
            let model = self.model.lock().await;
            (
                model.get_selected_track().await,
                model.backend.clone(),
                model.liked_cache.clone(),
            )
        };
        let Some(row) = selected else {
            return;
        };

        if row.track.id.is_empty() {
            tracing::warn!("Cannot toggle liked status: track ID is empty");
            let model = self.model.lock().await;
            model.set_error("Cannot like/unlike: track has no ID".to_string()).await;
            return;
        }

        let track_id = row.track.id.clone();
        tracing::debug!(track_id, liked = row.liked, "Toggling liked status for track");

        let result = if row.liked {
            backend.unlike_track(&track_id).await
        } else {
            backend.like_track(&row.track).await
        };

        match result {
            Ok(()) => {
                let new_liked_status = !row.liked;
                if new_liked_status {
                    cache.add(track_id.clone()).await;
                } else {
                    cache.remove(&track_id).await;
                }
                if let Err(e) = cache.save_to_disk().await {
                    tracing::warn!(error = %e, "Failed to persist liked tracks cache");
                }

                let model = self.model.lock().await;
                model.update_track_liked_status(&track_id, new_liked_status).await;

                let status = if new_liked_status { "added to" } else { "removed from" };
                tracing::info!(track_id, status, "Track liked status toggled");
            }
            Err(e) => {
                tracing::error!(track_id, error = %e, "Failed to toggle liked status");
                self.report_error(e.into()).await;
            }
        }
    }

    /// Fill the liked cache from the backend, or from disk when offline.
    pub async fn sync_liked_tracks(&self) {
        let (backend, cache) = {
            let model = self.model.lock().await;
            (model.backend.clone(), model.liked_cache.clone())
        };

        if !backend.is_authenticated().await {
            cache.clear().await;
            return;
        }

        match backend.liked_tracks().await {
            Ok(tracks) => {
                cache.update(tracks.into_iter().map(|t| t.id).collect()).await;
                if let Err(e) = cache.save_to_disk().await {
                    tracing::warn!(error = %e, "Failed to persist liked tracks cache");
                }
                tracing::info!(count = cache.len().await, "Liked tracks synced");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch liked tracks, using disk cache");
                match cache.load_from_disk().await {
                    Ok(loaded) => tracing::debug!(loaded, "Liked tracks cache loaded from disk"),
                    Err(e) => tracing::warn!(error = %e, "Failed to read liked tracks cache"),
                }
            }
        }
    }

    pub async fn open_playlist_picker(&self) {
        let model = self.model.lock().await;
        let Some(row) = model.get_selected_track().await else {
            return;
        };

        if !model.backend.is_authenticated().await {
            model.set_error("Please log in first (jamendo-rs login).".to_string()).await;
            return;
        }
        if model.get_ui_state().await.playlists.is_empty() {
            model
                .set_error("No playlists yet. Create one with `jamendo-rs playlists create <name>`.".to_string())
                .await;
            return;
        }
        model.open_playlist_picker(row.track).await;
    }

    pub async fn add_track_to_playlist(&self, playlist: &PlaylistItem, track: &CatalogTrack) {
        let backend = self.model.lock().await.backend.clone();

        let result = backend.add_track_to_playlist(&playlist.id, track).await;
        crate::log_api_result!("add_track_to_playlist", result);
        match result {
            Ok(updated) => {
                tracing::info!(playlist_id = %playlist.id, track_id = %track.id, "Track added to playlist");
                let model = self.model.lock().await;
                let rows = model.mark_liked(updated.tracks.clone()).await;
                model.refresh_playlist_if_visible(&updated, rows).await;
                drop(model);
                self.load_user_playlists().await;
            }
            Err(e) => self.report_error(e.into()).await,
        }
    }

    /// Remove the highlighted track from the open playlist.
    pub async fn remove_selected_from_playlist(&self) {
        let (target, backend) = {
            let model = self.model.lock().await;
            let target = match model.get_content_state().await.view {
                ContentView::PlaylistDetail { detail, selected_index } => detail
                    .tracks
                    .get(selected_index)
                    .map(|row| (detail.id.clone(), row.track.id.clone())),
                _ => None,
            };
            (target, model.backend.clone())
        };
        let Some((playlist_id, track_id)) = target else {
            return;
        };

        let result = backend.remove_track_from_playlist(&playlist_id, &track_id).await;
        crate::log_api_result!("remove_track_from_playlist", result);
        match result {
            Ok(updated) => {
                let model = self.model.lock().await;
                let rows = model.mark_liked(updated.tracks.clone()).await;
                model.refresh_playlist_if_visible(&updated, rows).await;
                drop(model);
                self.load_user_playlists().await;
            }
            Err(e) => self.report_error(e.into()).await,
        }
    }

    pub async fn show_queue(&self) {
        let items = self.player.queue_items().await;
        let current = self.player.snapshot().await.queue_index;
        tracing::debug!(len = items.len(), current = ?current, "Showing play queue");

        let model = self.model.lock().await;
        model.set_queue_view(items, current).await;
        model.set_active_section(ActiveSection::MainContent).await;
    }

    pub async fn refresh_queue_if_visible(&self) {
        let model = self.model.lock().await;
        if !model.is_queue_view_visible().await {
            return;
        }
        let items = self.player.queue_items().await;
        model.update_queue_if_visible(items).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::Mutex;

    use super::*;
    use crate::config::{CatalogConfig, PlayerConfig};
    use crate::model::{AppModel, BackendClient, JamendoClient, LikedTracksCache, SelectedItem, TrackRow};
    use crate::player::testing::{Call, FakeEngine};
    use crate::player::PlaybackController;

    fn track(id: &str, audio: &str) -> CatalogTrack {
        CatalogTrack {
            id: id.to_string(),
            name: format!("Track {}", id),
            artist_name: "Artist".to_string(),
            duration: 180,
            audio: audio.to_string(),
            ..Default::default()
        }
    }

    fn controller(dir: &tempfile::TempDir) -> (AppController, Arc<FakeEngine>) {
        let engine = FakeEngine::new();
        let player = PlaybackController::start(engine.clone(), &PlayerConfig::default());
        let model = AppModel::new(
            JamendoClient::new(&CatalogConfig::default()).unwrap(),
            BackendClient::new("http://localhost:9").unwrap(),
            LikedTracksCache::new(dir.path().join("liked.json")),
        );
        (AppController::new(Arc::new(Mutex::new(model)), player, 5000), engine)
    }

    #[tokio::test]
    async fn playing_from_a_list_queues_the_list() {
        let dir = tempfile::tempdir().unwrap();
        let (app, engine) = controller(&dir);
        let list = vec![track("1", "https://cdn/1.mp3"), track("2", "https://cdn/2.mp3")];

        app.play_track_list(&list, 1).await;

        let snapshot = app.player.snapshot().await;
        assert_eq!(snapshot.queue_len, 2);
        assert_eq!(snapshot.queue_index, Some(1));
        assert_eq!(engine.loads(), vec![Some("https://cdn/2.mp3".to_string())]);
        app.player.shutdown().await;
    }

    #[tokio::test]
    async fn silent_track_raises_a_toast() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _engine) = controller(&dir);

        app.play_track_list(&[track("1", "")], 0).await;

        assert!(app.model.lock().await.has_error().await);
        assert!(app.player.snapshot().await.current_item.is_none());
        app.player.shutdown().await;
    }

    #[tokio::test]
    async fn seek_steps_clamp_at_zero() {
        let dir = tempfile::tempdir().unwrap();
        let (app, engine) = controller(&dir);
        app.play_track_list(&[track("1", "https://cdn/1.mp3")], 0).await;

        app.seek_relative(false).await;
        app.seek_relative(true).await;

        let seeks: Vec<Call> = engine
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Seek(_)))
            .collect();
        assert_eq!(seeks, vec![Call::Seek(0), Call::Seek(5000)]);
        app.player.shutdown().await;
    }

    #[tokio::test]
    async fn queue_view_follows_the_player() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _engine) = controller(&dir);
        let list = vec![track("1", "https://cdn/1.mp3"), track("2", "https://cdn/2.mp3")];
        app.play_track_list(&list, 0).await;

        app.show_queue().await;
        {
            let model = app.model.lock().await;
            assert!(model.is_queue_view_visible().await);
            model.set_popular(vec![TrackRow::new(track("3", "https://cdn/3.mp3"))]).await;
        }

        let selected = app.model.lock().await.get_selected_content_item().await;
        match selected {
            Some(SelectedItem::Track { list, index }) => {
                app.handle_selected_item(SelectedItem::Track { list, index }).await;
            }
            other => panic!("unexpected selection: {:?}", other),
        }
        assert_eq!(app.player.queue_items().await.len(), 1);
        app.player.shutdown().await;
    }

    #[tokio::test]
    async fn liking_requires_a_login() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _engine) = controller(&dir);
        {
            let model = app.model.lock().await;
            model.set_popular(vec![TrackRow::new(track("1", "https://cdn/1.mp3"))]).await;
        }

        app.toggle_liked_track().await;

        let model = app.model.lock().await;
        assert!(model.has_error().await);
        assert!(!model.liked_cache.is_liked("1").await);
        drop(model);
        app.player.shutdown().await;
    }
}
