//! Model module - Application state and data types
//!
//! - `types`: Core type definitions (sections, UI state, selections)
//! - `content`: Content view data (search results, track lists, playlists, queue)
//! - `cache`: Liked tracks cache for fast lookup
//! - `jamendo_client`: Jamendo catalog client
//! - `backend_client`: Playlist/auth backend client
//! - `app_model`: Main application model with state management methods

mod types;
mod content;
mod cache;
mod jamendo_client;
mod backend_client;
mod app_model;

pub use types::{
    ActiveSection, BarArea, LibraryItem, PlaylistItem, SearchResultSection, SelectedItem, UiState,
};

pub use content::{ContentState, ContentView, PlaylistDetail, SearchResults, TrackRow};

pub use cache::{LikedTracksCache, LIKED_TRACKS_CACHE_FILE};

pub use jamendo_client::{CatalogArtist, CatalogTrack, JamendoClient};

pub use backend_client::{AuthResponse, BackendClient, Playlist, User};

pub use app_model::AppModel;
