//! Core type definitions for the application

use std::time::Instant;

use super::jamendo_client::CatalogTrack;

/// Which section of the UI is currently active/focused
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveSection {
    Search,
    Library,
    Playlists,
    MainContent,
}

impl ActiveSection {
    pub fn next(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::Library,
            ActiveSection::Library => ActiveSection::Playlists,
            ActiveSection::Playlists => ActiveSection::MainContent,
            ActiveSection::MainContent => ActiveSection::Search,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::MainContent,
            ActiveSection::Library => ActiveSection::Search,
            ActiveSection::Playlists => ActiveSection::Library,
            ActiveSection::MainContent => ActiveSection::Playlists,
        }
    }
}

/// Entries of the Library section, in display order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LibraryItem {
    Popular,
    LikedSongs,
    PlayQueue,
}

impl LibraryItem {
    pub const ALL: [LibraryItem; 3] = [LibraryItem::Popular, LibraryItem::LikedSongs, LibraryItem::PlayQueue];

    pub fn label(self) -> &'static str {
        match self {
            LibraryItem::Popular => "Popular",
            LibraryItem::LikedSongs => "Liked songs",
            LibraryItem::PlayQueue => "Play queue",
        }
    }
}

/// A user's playlist (for sidebar display)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaylistItem {
    pub id: String,
    pub name: String,
    pub track_count: usize,
}

/// Which section of search results is selected
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SearchResultSection {
    #[default]
    Tracks,
    Artists,
}

impl SearchResultSection {
    pub fn toggle(self) -> Self {
        match self {
            Self::Tracks => Self::Artists,
            Self::Artists => Self::Tracks,
        }
    }
}

/// Represents a selected item for action handling
#[derive(Clone, Debug)]
pub enum SelectedItem {
    /// A track inside a list; Enter queues the whole list
    Track { list: Vec<CatalogTrack>, index: usize },
    Artist { id: String, name: String },
    QueueEntry { index: usize },
}

/// Screen position of the progress gauge's inner bar
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BarArea {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl BarArea {
    pub fn contains(&self, column: u16, row: u16) -> bool {
        column >= self.x
            && column < self.x.saturating_add(self.width)
            && row >= self.y
            && row < self.y.saturating_add(self.height)
    }

    /// Column offset from the start of the bar, clamped to the bar.
    pub fn offset(&self, column: u16) -> f64 {
        column.saturating_sub(self.x).min(self.width) as f64
    }
}

/// UI state for the application
#[derive(Clone)]
pub struct UiState {
    pub active_section: ActiveSection,
    pub search_query: String,
    pub library_selected: usize,
    pub playlists: Vec<PlaylistItem>,
    pub playlist_selected: usize,
    /// Logged-in username, if any
    pub account: Option<String>,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub show_help_popup: bool,
    pub show_playlist_picker: bool,
    pub picker_selected: usize,
    /// Track waiting to be added through the playlist picker
    pub picker_track: Option<CatalogTrack>,
    pub progress_bar: Option<BarArea>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_section: ActiveSection::Search,
            search_query: String::new(),
            library_selected: 0,
            playlists: vec![],
            playlist_selected: 0,
            account: None,
            error_message: None,
            error_timestamp: None,
            show_help_popup: false,
            show_playlist_picker: false,
            picker_selected: 0,
            picker_track: None,
            progress_bar: None,
        }
    }
}
