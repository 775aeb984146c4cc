//! Playable items and the read-only playback snapshot

use serde::{Deserialize, Serialize};

use crate::model::CatalogTrack;

/// One playable unit. Replaced wholesale, never mutated in place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayableItem {
    pub title: String,
    pub artist: String,
    pub artwork_uri: String,
    /// Items without an audio URI can never be loaded into the engine.
    pub audio_uri: Option<String>,
    /// Catalog id, when the item came from the catalog
    pub track_id: Option<String>,
    /// Catalog-supplied duration, used when the engine cannot tell
    pub duration_ms: Option<u64>,
}

impl PlayableItem {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, audio_uri: Option<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            artwork_uri: String::new(),
            audio_uri: audio_uri.filter(|uri| !uri.trim().is_empty()),
            track_id: None,
            duration_ms: None,
        }
    }

    pub fn is_playable(&self) -> bool {
        self.audio_uri.is_some()
    }
}

impl From<&CatalogTrack> for PlayableItem {
    fn from(track: &CatalogTrack) -> Self {
        let artwork_uri = if track.image.is_empty() {
            track.album_image.clone()
        } else {
            track.image.clone()
        };

        Self {
            title: track.name.clone(),
            artist: track.artist_name.clone(),
            artwork_uri,
            audio_uri: Some(track.audio.trim().to_string()).filter(|uri| !uri.is_empty()),
            track_id: Some(track.id.clone()).filter(|id| !id.is_empty()),
            duration_ms: (track.duration > 0).then(|| track.duration * 1000),
        }
    }
}

/// Where the controller's state machine currently is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    /// No current item
    #[default]
    Idle,
    /// Load issued, waiting for the engine to report playback
    Loading,
    Playing,
    /// Stopped on an item. After a failed load or a finish with nothing to
    /// advance to the source is also unloaded, and play reloads it.
    Paused,
}

/// Read-only view of playback state for the UI
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaybackSnapshot {
    pub phase: PlaybackPhase,
    pub is_playing: bool,
    pub current_item: Option<PlayableItem>,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub queue_index: Option<usize>,
    pub queue_len: usize,
    pub now_playing_visible: bool,
}

impl PlaybackSnapshot {
    /// Fraction of the track played, 0 when the duration is unknown.
    pub fn progress(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        (self.position_ms as f64 / self.duration_ms as f64).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_track(audio: &str, image: &str, album_image: &str) -> CatalogTrack {
        CatalogTrack {
            id: "1886257".to_string(),
            name: "Wanderer".to_string(),
            duration: 214,
            artist_id: "7".to_string(),
            artist_name: "Tryad".to_string(),
            album_id: "12".to_string(),
            album_name: "Listen".to_string(),
            image: image.to_string(),
            album_image: album_image.to_string(),
            audio: audio.to_string(),
        }
    }

    #[test]
    fn catalog_track_conversion() {
        let item = PlayableItem::from(&catalog_track("https://cdn/a.mp3", "", "https://img/album.jpg"));
        assert_eq!(item.title, "Wanderer");
        assert_eq!(item.artist, "Tryad");
        assert_eq!(item.artwork_uri, "https://img/album.jpg");
        assert_eq!(item.audio_uri.as_deref(), Some("https://cdn/a.mp3"));
        assert_eq!(item.duration_ms, Some(214_000));
        assert_eq!(item.track_id.as_deref(), Some("1886257"));
    }

    #[test]
    fn blank_audio_is_not_playable() {
        let item = PlayableItem::from(&catalog_track("   ", "https://img/t.jpg", ""));
        assert!(!item.is_playable());
        assert_eq!(item.artwork_uri, "https://img/t.jpg");

        assert!(!PlayableItem::new("t", "a", Some(String::new())).is_playable());
    }

    #[test]
    fn progress_handles_unknown_duration() {
        let mut snapshot = PlaybackSnapshot::default();
        snapshot.position_ms = 5_000;
        assert_eq!(snapshot.progress(), 0.0);

        snapshot.duration_ms = 20_000;
        assert!((snapshot.progress() - 0.25).abs() < f64::EPSILON);

        snapshot.position_ms = 40_000;
        assert_eq!(snapshot.progress(), 1.0);
    }
}
