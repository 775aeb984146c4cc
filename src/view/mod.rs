//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (formatting, scrollable lists)
//! - `layout`: Main layout structure (top bar, sidebar)
//! - `content`: Main content area rendering
//! - `progress`: Mini-player gauge
//! - `overlays`: Modal overlays (error, playlist picker, help, now playing)

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use crate::model::{ContentState, UiState};
use crate::player::{PlaybackSnapshot, ScrubCoordinator};

pub use utils::format_duration;

pub struct AppView;

impl AppView {
    /// Draw one frame. Returns the inner area of the progress gauge, which
    /// the controller uses for mouse hit testing.
    pub fn render(
        frame: &mut Frame,
        playback: &PlaybackSnapshot,
        scrub: &ScrubCoordinator,
        ui_state: &UiState,
        content_state: &ContentState,
    ) -> Rect {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + account
                Constraint::Min(0),    // Main content (sidebar + content)
                Constraint::Length(3), // Mini-player gauge
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], ui_state);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30), // Sidebar (Library + Playlists)
                Constraint::Percentage(70), // Main content
            ])
            .split(chunks[1]);

        layout::render_sidebar(frame, main_chunks[0], ui_state);

        if playback.now_playing_visible {
            overlays::render_now_playing(frame, chunks[1], playback, scrub);
        } else {
            content::render_main_content(frame, main_chunks[1], ui_state, content_state, playback);
        }

        let bar = progress::render_progress_bar(frame, chunks[2], playback, scrub);

        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }

        if ui_state.show_playlist_picker {
            overlays::render_playlist_picker(frame, ui_state);
        }

        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }

        bar
    }
}
