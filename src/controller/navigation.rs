//! Navigation-related controller methods (library, playlists, search, artists)

use crate::model::{ActiveSection, LibraryItem, PlaylistDetail, SearchResults, SelectedItem};
use super::AppController;

impl AppController {
    pub async fn perform_search(&self, query: &str) {
        tracing::debug!(query, "Performing search");
        let jamendo = {
            let model = self.model.lock().await;
            model.set_content_loading(true).await;
            model.jamendo.clone()
        };

        let result = futures::try_join!(jamendo.search_tracks(query), jamendo.search_artists(query));
        match result {
            Ok((tracks, artists)) => {
                tracing::info!(
                    query,
                    tracks = tracks.len(),
                    artists = artists.len(),
                    "Search completed successfully"
                );
                let model = self.model.lock().await;
                let mut results = SearchResults {
                    tracks: model.mark_liked(tracks).await,
                    artists,
                    ..Default::default()
                };
                results.determine_best_match(query);
                model.set_search_results(results).await;
                // Switch to MainContent section to show results
                model.set_active_section(ActiveSection::MainContent).await;
            }
            Err(e) => {
                tracing::error!(query, error = %e, "Search failed");
                self.report_error(e.into()).await;
            }
        }
    }

    pub async fn load_user_playlists(&self) {
        let backend = self.model.lock().await.backend.clone();
        if !backend.is_authenticated().await {
            return;
        }

        let result = backend.playlists().await;
        crate::log_api_result!("list_playlists", result);
        match result {
            Ok(playlists) => {
                let model = self.model.lock().await;
                model.set_playlists(&playlists).await;
            }
            Err(e) => self.report_error(e.into()).await,
        }
    }

    pub async fn open_playlist(&self, playlist_id: &str) {
        let backend = {
            let model = self.model.lock().await;
            model.set_content_loading(true).await;
            model.backend.clone()
        };

        match backend.playlist(playlist_id).await {
            Ok(playlist) => {
                tracing::info!(playlist_id, tracks = playlist.tracks.len(), "Playlist opened");
                let model = self.model.lock().await;
                let detail = PlaylistDetail {
                    id: playlist.id,
                    name: playlist.name,
                    tracks: model.mark_liked(playlist.tracks).await,
                };
                model.set_playlist_detail(detail).await;
                model.set_active_section(ActiveSection::MainContent).await;
            }
            Err(e) => {
                tracing::error!(playlist_id, error = %e, "Failed to open playlist");
                self.report_error(e.into()).await;
            }
        }
    }

    pub async fn open_library_item(&self, item: LibraryItem) {
        tracing::debug!(item = item.label(), "Opening library item");
        if item == LibraryItem::PlayQueue {
            self.show_queue().await;
            self.model.lock().await.set_active_section(ActiveSection::MainContent).await;
            return;
        }

        let (jamendo, backend) = {
            let model = self.model.lock().await;
            model.set_content_loading(true).await;
            (model.jamendo.clone(), model.backend.clone())
        };

        let result = match item {
            LibraryItem::Popular => jamendo.popular_tracks().await,
            _ => backend.liked_tracks().await,
        };

        match result {
            Ok(tracks) => {
                let model = self.model.lock().await;
                if item == LibraryItem::LikedSongs {
                    model
                        .liked_cache
                        .update(tracks.iter().map(|t| t.id.clone()).collect())
                        .await;
                }
                let rows = model.mark_liked(tracks).await;
                match item {
                    LibraryItem::Popular => model.set_popular(rows).await,
                    _ => model.set_liked_songs(rows).await,
                }
                model.set_active_section(ActiveSection::MainContent).await;
            }
            Err(e) => {
                tracing::error!(item = item.label(), error = %e, "Failed to open library item");
                self.report_error(e.into()).await;
            }
        }
    }

    pub async fn open_artist(&self, artist_id: &str, artist_name: &str) {
        if artist_id.is_empty() {
            return;
        }

        let jamendo = {
            let model = self.model.lock().await;
            model.set_content_loading(true).await;
            model.jamendo.clone()
        };

        match jamendo.artist_tracks(artist_id).await {
            Ok(tracks) => {
                tracing::info!(artist_id, tracks = tracks.len(), "Artist tracks loaded");
                let model = self.model.lock().await;
                let rows = model.mark_liked(tracks).await;
                model.set_artist_tracks(artist_name, rows).await;
            }
            Err(e) => {
                tracing::error!(artist_id, error = %e, "Failed to load artist tracks");
                self.report_error(e.into()).await;
            }
        }
    }

    /// Open the artist of the highlighted track.
    pub async fn open_selected_artist(&self) {
        let selected = self.model.lock().await.get_selected_track().await;
        if let Some(row) = selected {
            self.open_artist(&row.track.artist_id, &row.track.artist_name).await;
        }
    }

    /// Open the album of the highlighted track.
    pub async fn open_selected_album(&self) {
        let selected = self.model.lock().await.get_selected_track().await;
        let Some(row) = selected else {
            return;
        };
        let (album_id, album_name) = (row.track.album_id, row.track.album_name);
        if album_id.is_empty() {
            return;
        }

        let jamendo = {
            let model = self.model.lock().await;
            model.set_content_loading(true).await;
            model.jamendo.clone()
        };

        match jamendo.album_tracks(&album_id).await {
            Ok(tracks) => {
                tracing::info!(album_id = %album_id, tracks = tracks.len(), "Album tracks loaded");
                let model = self.model.lock().await;
                let rows = model.mark_liked(tracks).await;
                model.set_album_tracks(&album_name, rows).await;
            }
            Err(e) => {
                tracing::error!(album_id = %album_id, error = %e, "Failed to load album tracks");
                self.report_error(e.into()).await;
            }
        }
    }

    pub async fn handle_selected_item(&self, item: SelectedItem) {
        match item {
            SelectedItem::Track { list, index } => {
                self.play_track_list(&list, index).await;
            }
            SelectedItem::Artist { id, name } => {
                self.open_artist(&id, &name).await;
            }
            SelectedItem::QueueEntry { index } => {
                self.player.play_by_index(index).await;
            }
        }
    }
}
