//! Content view state: search results, track lists, playlists and the play queue

use super::jamendo_client::{CatalogArtist, CatalogTrack};
use super::types::SearchResultSection;
use crate::player::PlayableItem;

/// A catalog track as shown in a list
#[derive(Clone, Debug, PartialEq)]
pub struct TrackRow {
    pub track: CatalogTrack,
    pub liked: bool,
}

impl TrackRow {
    pub fn new(track: CatalogTrack) -> Self {
        Self { track, liked: false }
    }

    pub fn tracks(rows: &[TrackRow]) -> Vec<CatalogTrack> {
        rows.iter().map(|row| row.track.clone()).collect()
    }
}

/// Combined search results
#[derive(Clone, Debug, Default)]
pub struct SearchResults {
    pub tracks: Vec<TrackRow>,
    pub artists: Vec<CatalogArtist>,
    pub best_match: SearchResultSection,
}

impl SearchResults {
    /// Pick the tab to open first from how closely the top results match.
    pub fn determine_best_match(&mut self, query: &str) {
        let query_lower = query.to_lowercase();

        // Exact artist matches win (searching "Tryad" should show the artist)
        let artist_score = self
            .artists
            .first()
            .map(|a| {
                let name_lower = a.name.to_lowercase();
                if name_lower == query_lower {
                    100
                } else if name_lower.starts_with(&query_lower) {
                    80
                } else {
                    0
                }
            })
            .unwrap_or(0);

        let track_score = self
            .tracks
            .first()
            .map(|t| {
                let name_lower = t.track.name.to_lowercase();
                let artist_lower = t.track.artist_name.to_lowercase();
                if name_lower == query_lower {
                    95
                } else if name_lower.starts_with(&query_lower) || artist_lower.starts_with(&query_lower) {
                    75
                } else if name_lower.contains(&query_lower) || artist_lower.contains(&query_lower) {
                    55
                } else {
                    0
                }
            })
            .unwrap_or(0);

        self.best_match = if artist_score > track_score || (self.tracks.is_empty() && !self.artists.is_empty()) {
            SearchResultSection::Artists
        } else {
            SearchResultSection::Tracks
        };
    }
}

/// Playlist detail view data
#[derive(Clone, Debug)]
pub struct PlaylistDetail {
    pub id: String,
    pub name: String,
    pub tracks: Vec<TrackRow>,
}

/// Represents the current view in the main content area
#[derive(Clone, Debug, Default)]
pub enum ContentView {
    #[default]
    Empty,
    SearchResults {
        results: SearchResults,
        section: SearchResultSection,
        track_index: usize,
        artist_index: usize,
    },
    Popular {
        tracks: Vec<TrackRow>,
        selected_index: usize,
    },
    LikedSongs {
        tracks: Vec<TrackRow>,
        selected_index: usize,
    },
    /// An artist's or an album's tracks
    Collection {
        heading: String,
        tracks: Vec<TrackRow>,
        selected_index: usize,
    },
    PlaylistDetail {
        detail: PlaylistDetail,
        selected_index: usize,
    },
    /// The controller's play queue
    Queue {
        items: Vec<PlayableItem>,
        selected_index: usize,
    },
}

/// State for the main content area
#[derive(Clone, Debug, Default)]
pub struct ContentState {
    pub view: ContentView,
    pub navigation_stack: Vec<ContentView>,
    pub is_loading: bool,
}
