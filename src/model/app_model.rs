//! Main application model with state management

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;

use super::backend_client::{BackendClient, Playlist};
use super::cache::LikedTracksCache;
use super::content::{ContentState, ContentView, PlaylistDetail, SearchResults, TrackRow};
use super::jamendo_client::{CatalogTrack, JamendoClient};
use super::types::{
    ActiveSection, BarArea, LibraryItem, PlaylistItem, SearchResultSection, SelectedItem, UiState,
};
use crate::player::{PlayableItem, ScrubCoordinator};

const ERROR_DISPLAY_SECS: u64 = 5;

/// Main application model containing all UI-side state
pub struct AppModel {
    pub jamendo: JamendoClient,
    pub backend: BackendClient,
    pub liked_cache: LikedTracksCache,
    pub ui_state: Arc<Mutex<UiState>>,
    pub content_state: Arc<Mutex<ContentState>>,
    pub should_quit: Arc<Mutex<bool>>,
    pub scrub: Arc<Mutex<ScrubCoordinator>>,
}

impl AppModel {
    pub fn new(jamendo: JamendoClient, backend: BackendClient, liked_cache: LikedTracksCache) -> Self {
        Self {
            jamendo,
            backend,
            liked_cache,
            ui_state: Arc::new(Mutex::new(UiState::default())),
            content_state: Arc::new(Mutex::new(ContentState::default())),
            should_quit: Arc::new(Mutex::new(false)),
            scrub: Arc::new(Mutex::new(ScrubCoordinator::default())),
        }
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    // ========================================================================
    // Sidebar & top bar
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn cycle_section_forward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.next();
    }

    pub async fn cycle_section_backward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.prev();
    }

    pub async fn set_active_section(&self, section: ActiveSection) {
        self.ui_state.lock().await.active_section = section;
    }

    pub async fn move_selection_up(&self) {
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Library => {
                state.library_selected = state.library_selected.saturating_sub(1);
            }
            ActiveSection::Playlists => {
                state.playlist_selected = state.playlist_selected.saturating_sub(1);
            }
            _ => {}
        }
    }

    pub async fn move_selection_down(&self) {
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Library => {
                if state.library_selected < LibraryItem::ALL.len() - 1 {
                    state.library_selected += 1;
                }
            }
            ActiveSection::Playlists => {
                if state.playlist_selected < state.playlists.len().saturating_sub(1) {
                    state.playlist_selected += 1;
                }
            }
            _ => {}
        }
    }

    pub async fn selected_library_item(&self) -> LibraryItem {
        let state = self.ui_state.lock().await;
        LibraryItem::ALL[state.library_selected.min(LibraryItem::ALL.len() - 1)]
    }

    pub async fn append_to_search(&self, c: char) {
        self.ui_state.lock().await.search_query.push(c);
    }

    pub async fn backspace_search(&self) {
        self.ui_state.lock().await.search_query.pop();
    }

    pub async fn update_search_query(&self, query: String) {
        self.ui_state.lock().await.search_query = query;
    }

    pub async fn set_playlists(&self, playlists: &[Playlist]) {
        let mut state = self.ui_state.lock().await;
        state.playlists = playlists
            .iter()
            .map(|p| PlaylistItem {
                id: p.id.clone(),
                name: p.name.clone(),
                track_count: p.tracks.len(),
            })
            .collect();
        state.playlist_selected = state.playlist_selected.min(state.playlists.len().saturating_sub(1));
    }

    pub async fn get_selected_playlist(&self) -> Option<PlaylistItem> {
        let state = self.ui_state.lock().await;
        state.playlists.get(state.playlist_selected).cloned()
    }

    pub async fn set_account(&self, username: Option<String>) {
        self.ui_state.lock().await.account = username;
    }

    // ========================================================================
    // Error toast & overlays
    // ========================================================================

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state.lock().await.error_message.is_some()
    }

    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed().as_secs() >= ERROR_DISPLAY_SECS {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }

    pub async fn show_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = true;
    }

    pub async fn hide_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = false;
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }

    pub async fn open_playlist_picker(&self, track: CatalogTrack) {
        let mut state = self.ui_state.lock().await;
        state.picker_track = Some(track);
        state.picker_selected = 0;
        state.show_playlist_picker = true;
    }

    pub async fn hide_playlist_picker(&self) {
        let mut state = self.ui_state.lock().await;
        state.show_playlist_picker = false;
        state.picker_track = None;
    }

    pub async fn is_playlist_picker_open(&self) -> bool {
        self.ui_state.lock().await.show_playlist_picker
    }

    pub async fn picker_move_up(&self) {
        let mut state = self.ui_state.lock().await;
        state.picker_selected = state.picker_selected.saturating_sub(1);
    }

    pub async fn picker_move_down(&self) {
        let mut state = self.ui_state.lock().await;
        if state.picker_selected < state.playlists.len().saturating_sub(1) {
            state.picker_selected += 1;
        }
    }

    /// The playlist highlighted in the picker and the track to add to it.
    pub async fn picker_selection(&self) -> Option<(PlaylistItem, CatalogTrack)> {
        let state = self.ui_state.lock().await;
        let playlist = state.playlists.get(state.picker_selected)?.clone();
        let track = state.picker_track.clone()?;
        Some((playlist, track))
    }

    // ========================================================================
    // Progress bar scrubbing
    // ========================================================================

    pub async fn set_progress_bar(&self, area: BarArea) {
        self.ui_state.lock().await.progress_bar = Some(area);
        self.scrub.lock().await.set_bar_width(area.width as f64);
    }

    pub async fn progress_bar(&self) -> Option<BarArea> {
        self.ui_state.lock().await.progress_bar
    }

    // ========================================================================
    // Main content
    // ========================================================================

    pub async fn get_content_state(&self) -> ContentState {
        self.content_state.lock().await.clone()
    }

    pub async fn set_content_loading(&self, loading: bool) {
        self.content_state.lock().await.is_loading = loading;
    }

    pub async fn set_search_results(&self, results: SearchResults) {
        let initial_section = results.best_match;
        self.show_root_view(ContentView::SearchResults {
            results,
            section: initial_section,
            track_index: 0,
            artist_index: 0,
        })
        .await;
    }

    pub async fn set_popular(&self, tracks: Vec<TrackRow>) {
        self.show_root_view(ContentView::Popular {
            tracks,
            selected_index: 0,
        })
        .await;
    }

    pub async fn set_liked_songs(&self, tracks: Vec<TrackRow>) {
        self.show_root_view(ContentView::LikedSongs {
            tracks,
            selected_index: 0,
        })
        .await;
    }

    pub async fn set_playlist_detail(&self, detail: PlaylistDetail) {
        self.show_root_view(ContentView::PlaylistDetail {
            detail,
            selected_index: 0,
        })
        .await;
    }

    pub async fn set_artist_tracks(&self, artist_name: &str, tracks: Vec<TrackRow>) {
        self.push_view(ContentView::Collection {
            heading: format!("🎤 {}", artist_name),
            tracks,
            selected_index: 0,
        })
        .await;
    }

    pub async fn set_album_tracks(&self, album_name: &str, tracks: Vec<TrackRow>) {
        self.push_view(ContentView::Collection {
            heading: format!("💿 {}", album_name),
            tracks,
            selected_index: 0,
        })
        .await;
    }

    pub async fn set_queue_view(&self, items: Vec<PlayableItem>, current: Option<usize>) {
        let mut state = self.content_state.lock().await;
        if !matches!(state.view, ContentView::Empty | ContentView::Queue { .. }) {
            let previous_view = state.view.clone();
            state.navigation_stack.push(previous_view);
        }
        state.view = ContentView::Queue {
            items,
            selected_index: current.unwrap_or(0),
        };
        state.is_loading = false;
    }

    pub async fn is_queue_view_visible(&self) -> bool {
        matches!(self.content_state.lock().await.view, ContentView::Queue { .. })
    }

    /// Refresh the queue view in place, keeping the selection in range.
    pub async fn update_queue_if_visible(&self, new_items: Vec<PlayableItem>) {
        let mut state = self.content_state.lock().await;
        if let ContentView::Queue { items, selected_index } = &mut state.view {
            *selected_index = (*selected_index).min(new_items.len().saturating_sub(1));
            *items = new_items;
        }
    }

    /// Replace the playlist detail if it shows `playlist`.
    pub async fn refresh_playlist_if_visible(&self, playlist: &Playlist, rows: Vec<TrackRow>) {
        let mut state = self.content_state.lock().await;
        if let ContentView::PlaylistDetail { detail, selected_index } = &mut state.view {
            if detail.id == playlist.id {
                detail.name = playlist.name.clone();
                detail.tracks = rows;
                *selected_index = (*selected_index).min(detail.tracks.len().saturating_sub(1));
            }
        }
    }

    pub async fn navigate_back(&self) -> bool {
        let mut state = self.content_state.lock().await;
        if let Some(previous_view) = state.navigation_stack.pop() {
            state.view = previous_view;
            true
        } else {
            state.view = ContentView::Empty;
            false
        }
    }

    pub async fn navigate_search_section(&self) {
        let mut state = self.content_state.lock().await;
        if let ContentView::SearchResults { section, .. } = &mut state.view {
            *section = section.toggle();
        }
    }

    pub async fn content_move_up(&self) {
        let mut state = self.content_state.lock().await;
        if let Some((index, _)) = Self::selection_mut(&mut state.view) {
            *index = index.saturating_sub(1);
        }
    }

    pub async fn content_move_down(&self) {
        let mut state = self.content_state.lock().await;
        if let Some((index, len)) = Self::selection_mut(&mut state.view) {
            if *index < len.saturating_sub(1) {
                *index += 1;
            }
        }
    }

    pub async fn get_selected_content_item(&self) -> Option<SelectedItem> {
        let state = self.content_state.lock().await;
        match &state.view {
            ContentView::SearchResults {
                results,
                section: SearchResultSection::Artists,
                artist_index,
                ..
            } => results.artists.get(*artist_index).map(|a| SelectedItem::Artist {
                id: a.id.clone(),
                name: a.name.clone(),
            }),
            ContentView::Queue { items, selected_index } => {
                (*selected_index < items.len()).then_some(SelectedItem::QueueEntry { index: *selected_index })
            }
            view => {
                let (rows, index) = Self::track_list(view)?;
                (index < rows.len()).then(|| SelectedItem::Track {
                    list: TrackRow::tracks(rows),
                    index,
                })
            }
        }
    }

    /// The highlighted catalog track, when the view shows one.
    pub async fn get_selected_track(&self) -> Option<TrackRow> {
        let state = self.content_state.lock().await;
        let (rows, index) = Self::track_list(&state.view)?;
        let row = rows.get(index).cloned();
        if let Some(row) = &row {
            tracing::debug!(track_id = %row.track.id, liked = row.liked, "Selected track");
        }
        row
    }

    pub async fn update_track_liked_status(&self, track_id: &str, liked: bool) {
        let mut state = self.content_state.lock().await;
        let rows: Option<&mut Vec<TrackRow>> = match &mut state.view {
            ContentView::SearchResults { results, .. } => Some(&mut results.tracks),
            ContentView::Popular { tracks, .. }
            | ContentView::Collection { tracks, .. } => Some(tracks),
            ContentView::PlaylistDetail { detail, .. } => Some(&mut detail.tracks),
            ContentView::LikedSongs { tracks, .. } => {
                // Unliked songs stay listed until the view is reopened
                Some(tracks)
            }
            _ => None,
        };
        if let Some(rows) = rows {
            for row in rows.iter_mut().filter(|r| r.track.id == track_id) {
                row.liked = liked;
            }
        }
    }

    /// Wrap catalog tracks in rows, flagging the liked ones.
    pub async fn mark_liked(&self, tracks: Vec<CatalogTrack>) -> Vec<TrackRow> {
        let mut rows = Vec::with_capacity(tracks.len());
        for track in tracks {
            let liked = self.liked_cache.is_liked(&track.id).await;
            rows.push(TrackRow { track, liked });
        }
        rows
    }

    async fn show_root_view(&self, view: ContentView) {
        let mut state = self.content_state.lock().await;
        state.navigation_stack.clear();
        state.view = view;
        state.is_loading = false;
    }

    async fn push_view(&self, view: ContentView) {
        let mut state = self.content_state.lock().await;
        if !matches!(state.view, ContentView::Empty) {
            let previous_view = state.view.clone();
            state.navigation_stack.push(previous_view);
        }
        state.view = view;
        state.is_loading = false;
    }

    fn track_list(view: &ContentView) -> Option<(&[TrackRow], usize)> {
        match view {
            ContentView::SearchResults {
                results,
                section: SearchResultSection::Tracks,
                track_index,
                ..
            } => Some((results.tracks.as_slice(), *track_index)),
            ContentView::Popular { tracks, selected_index }
            | ContentView::LikedSongs { tracks, selected_index }
            | ContentView::Collection { tracks, selected_index, .. } => Some((tracks.as_slice(), *selected_index)),
            ContentView::PlaylistDetail { detail, selected_index } => {
                Some((detail.tracks.as_slice(), *selected_index))
            }
            _ => None,
        }
    }

    fn selection_mut(view: &mut ContentView) -> Option<(&mut usize, usize)> {
        match view {
            ContentView::SearchResults {
                results,
                section,
                track_index,
                artist_index,
            } => match section {
                SearchResultSection::Tracks => Some((track_index, results.tracks.len())),
                SearchResultSection::Artists => Some((artist_index, results.artists.len())),
            },
            ContentView::Popular { tracks, selected_index }
            | ContentView::LikedSongs { tracks, selected_index }
            | ContentView::Collection { tracks, selected_index, .. } => Some((selected_index, tracks.len())),
            ContentView::PlaylistDetail { detail, selected_index } => Some((selected_index, detail.tracks.len())),
            ContentView::Queue { items, selected_index } => Some((selected_index, items.len())),
            ContentView::Empty => None,
        }
    }
}
