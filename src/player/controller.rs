//! Playback controller - the single owner of the audio engine and the queue
//!
//! UI code talks to the engine only through this type. Every transport call
//! updates the snapshot optimistically and then sequences through the engine
//! adapter; engine status events (see `events.rs`) reconcile the snapshot
//! afterwards. Engine failures end in a stopped state, never in an error.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::PlayerConfig;

use super::engine::{AudioEngine, EngineAdapter, SourceToken, Subscription};
use super::item::{PlayableItem, PlaybackPhase, PlaybackSnapshot};
use super::queue::Queue;

#[derive(Default)]
pub(super) struct PlayerState {
    pub(super) queue: Queue,
    pub(super) phase: PlaybackPhase,
    pub(super) is_playing: bool,
    pub(super) current: Option<PlayableItem>,
    pub(super) position_ms: u64,
    pub(super) duration_ms: u64,
    /// Whether the engine holds a playable source for `current`
    pub(super) source_loaded: bool,
    /// Bumped by every load; a load whose number is stale has been superseded
    pub(super) load_seq: u64,
    /// Token of the source `current` plays from. Statuses for any other
    /// source are dropped under the lock.
    pub(super) source: SourceToken,
    pub(super) now_playing_visible: bool,
}

pub(super) struct Inner {
    pub(super) adapter: EngineAdapter,
    pub(super) state: Mutex<PlayerState>,
    subscription: Mutex<Option<Subscription>>,
    restart_threshold_ms: u64,
}

/// Process-wide playback service. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct PlaybackController {
    pub(super) inner: Arc<Inner>,
}

/// Engine work left over after the state lock has already switched items
pub(super) enum PendingLoad {
    Track {
        item: PlayableItem,
        uri: String,
        seq: u64,
        token: SourceToken,
    },
    Clear {
        token: SourceToken,
    },
}

enum ToggleAction {
    Nothing,
    Pause { seq: u64, was: PlaybackPhase },
    Resume,
    Reload(PendingLoad),
}

impl PlaybackController {
    /// Take ownership of `engine` and start listening to its status events.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(engine: Arc<dyn AudioEngine>, config: &PlayerConfig) -> Self {
        let inner = Arc::new_cyclic(|weak| {
            let adapter = EngineAdapter::new(engine);
            let subscription = Self::start_status_listener(&adapter, weak.clone());
            Inner {
                adapter,
                state: Mutex::new(PlayerState::default()),
                subscription: Mutex::new(Some(subscription)),
                restart_threshold_ms: config.restart_threshold_ms,
            }
        });

        tracing::info!(
            restart_threshold_ms = config.restart_threshold_ms,
            "Playback controller started"
        );
        Self { inner }
    }

    /// Stop listening to the engine, then release it. Safe to call twice.
    pub async fn shutdown(&self) {
        if let Some(mut subscription) = self.inner.subscription.lock().await.take() {
            subscription.dispose();
        }
        self.inner.adapter.release().await;

        let mut state = self.inner.state.lock().await;
        state.load_seq += 1;
        state.source = SourceToken::default();
        state.is_playing = false;
        state.source_loaded = false;
        tracing::info!("Playback controller shut down");
    }

    // ========================================================================
    // Queue
    // ========================================================================

    /// Replace the play queue. Items without audio are dropped.
    pub async fn set_queue(&self, items: Vec<PlayableItem>) {
        let mut state = self.inner.state.lock().await;
        state.queue.set_items(items);
        tracing::info!(
            len = state.queue.len(),
            current_index = ?state.queue.current_index(),
            "Play queue replaced"
        );
    }

    pub async fn queue_items(&self) -> Vec<PlayableItem> {
        self.inner.state.lock().await.queue.items().to_vec()
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Play the queue item at `index` and make it current.
    pub async fn play_by_index(&self, index: usize) {
        let pending = {
            let mut state = self.inner.state.lock().await;
            self.begin_queue_item(&mut state, index)
        };
        if let Some(pending) = pending {
            self.run_load(pending).await;
        }
    }

    /// Play an item outside of the queue. Next/previous become no-ops until
    /// a queue item is played again.
    pub async fn play_item(&self, item: PlayableItem) {
        let pending = {
            let mut state = self.inner.state.lock().await;
            self.begin_playback(&mut state, item, None)
        };
        self.run_load(pending).await;
    }

    /// Play a track picked somewhere in the UI, reusing its queue position
    /// when the same audio URI is already queued (first match wins).
    pub async fn play_external_item(&self, item: PlayableItem) {
        let pending = {
            let mut state = self.inner.state.lock().await;
            let queued = item
                .audio_uri
                .as_deref()
                .and_then(|uri| state.queue.find_by_audio_uri(uri));
            match queued {
                Some(index) => {
                    tracing::debug!(index, title = %item.title, "Track found in queue");
                    self.begin_queue_item(&mut state, index)
                }
                None => Some(self.begin_playback(&mut state, item, None)),
            }
        };
        if let Some(pending) = pending {
            self.run_load(pending).await;
        }
    }

    pub async fn toggle_play_pause(&self) {
        let action = {
            let mut state = self.inner.state.lock().await;
            let phase = state.phase;
            match phase {
                PlaybackPhase::Idle => ToggleAction::Nothing,
                was @ (PlaybackPhase::Loading | PlaybackPhase::Playing) => {
                    state.is_playing = false;
                    state.phase = PlaybackPhase::Paused;
                    ToggleAction::Pause {
                        seq: state.load_seq,
                        was,
                    }
                }
                PlaybackPhase::Paused if !state.source_loaded => match state.current.clone() {
                    Some(item) => {
                        tracing::debug!(title = %item.title, "Source not loaded, reloading before play");
                        let index = state.queue.current_index();
                        ToggleAction::Reload(self.begin_playback(&mut state, item, index))
                    }
                    None => ToggleAction::Nothing,
                },
                PlaybackPhase::Paused => {
                    state.is_playing = true;
                    state.phase = PlaybackPhase::Playing;
                    ToggleAction::Resume
                }
            }
        };

        match action {
            ToggleAction::Nothing => tracing::debug!("Toggle ignored, nothing loaded"),
            ToggleAction::Pause { seq, was } => {
                tracing::debug!("Pausing playback");
                if !self.inner.adapter.pause().await {
                    // The engine kept playing; the snapshot follows it
                    let mut state = self.inner.state.lock().await;
                    if state.load_seq == seq && state.phase == PlaybackPhase::Paused {
                        state.is_playing = true;
                        state.phase = was;
                    }
                }
            }
            ToggleAction::Resume => {
                tracing::debug!("Resuming playback");
                if !self.inner.adapter.play().await {
                    self.mark_stopped().await;
                }
            }
            ToggleAction::Reload(pending) => self.run_load(pending).await,
        }
    }

    pub async fn next(&self) {
        let pending = {
            let mut state = self.inner.state.lock().await;
            match state.queue.advance() {
                Some(index) => self.begin_queue_item(&mut state, index),
                None => {
                    tracing::debug!("Next ignored, no queue position");
                    None
                }
            }
        };
        if let Some(pending) = pending {
            self.run_load(pending).await;
        }
    }

    /// Restart the current track when past the restart threshold, otherwise
    /// go to the previous queue item.
    pub async fn previous(&self) {
        let mut state = self.inner.state.lock().await;
        if state.current.is_some() && state.position_ms > self.inner.restart_threshold_ms {
            drop(state);
            tracing::debug!("Restarting current track");
            self.seek_to(0).await;
            return;
        }

        let pending = match state.queue.retreat() {
            Some(index) => self.begin_queue_item(&mut state, index),
            None => {
                tracing::debug!("Previous ignored, no queue position");
                None
            }
        };
        drop(state);
        if let Some(pending) = pending {
            self.run_load(pending).await;
        }
    }

    /// Seek within the current track, clamped to its duration when known.
    pub async fn seek_to(&self, position_ms: u64) {
        let target = {
            let mut state = self.inner.state.lock().await;
            if state.current.is_none() {
                return;
            }
            let target = if state.duration_ms > 0 {
                position_ms.min(state.duration_ms)
            } else {
                position_ms
            };
            state.position_ms = target;
            target
        };

        tracing::debug!(position_ms = target, "Seeking");
        if !self.inner.adapter.seek(target).await {
            self.mark_stopped().await;
        }
    }

    // ========================================================================
    // Snapshot & panel visibility
    // ========================================================================

    pub async fn snapshot(&self) -> PlaybackSnapshot {
        let state = self.inner.state.lock().await;
        PlaybackSnapshot {
            phase: state.phase,
            is_playing: state.is_playing,
            current_item: state.current.clone(),
            position_ms: state.position_ms,
            duration_ms: state.duration_ms,
            queue_index: state.queue.current_index(),
            queue_len: state.queue.len(),
            now_playing_visible: state.now_playing_visible,
        }
    }

    pub async fn now_playing_visible(&self) -> bool {
        self.inner.state.lock().await.now_playing_visible
    }

    pub async fn set_now_playing_visible(&self, visible: bool) {
        self.inner.state.lock().await.now_playing_visible = visible;
    }

    pub async fn toggle_now_playing_visible(&self) -> bool {
        let mut state = self.inner.state.lock().await;
        state.now_playing_visible = !state.now_playing_visible;
        state.now_playing_visible
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Switch `state` to the queue item at `index`.
    pub(super) fn begin_queue_item(&self, state: &mut PlayerState, index: usize) -> Option<PendingLoad> {
        match state.queue.get(index).cloned() {
            Some(item) => Some(self.begin_playback(state, item, Some(index))),
            None => {
                tracing::warn!(index, "No queue item at index");
                None
            }
        }
    }

    /// Make `item` current and take a fresh source token for it, all under
    /// the caller's lock. The engine is driven afterwards by
    /// [`run_load`](Self::run_load).
    ///
    /// An item without audio clears playback instead.
    pub(super) fn begin_playback(
        &self,
        state: &mut PlayerState,
        item: PlayableItem,
        index: Option<usize>,
    ) -> PendingLoad {
        state.load_seq += 1;
        state.source = self.inner.adapter.begin_load();
        state.position_ms = 0;
        state.duration_ms = 0;
        state.source_loaded = false;

        let Some(uri) = item.audio_uri.clone() else {
            tracing::warn!(title = %item.title, "Track has no audio, clearing playback");
            state.queue.set_current(None);
            state.current = None;
            state.phase = PlaybackPhase::Idle;
            state.is_playing = false;
            return PendingLoad::Clear { token: state.source };
        };

        tracing::info!(title = %item.title, artist = %item.artist, index = ?index, "Loading track");
        state.queue.set_current(index);
        state.current = Some(item.clone());
        state.is_playing = true;
        state.phase = PlaybackPhase::Loading;
        PendingLoad::Track {
            item,
            uri,
            seq: state.load_seq,
            token: state.source,
        }
    }

    pub(super) async fn run_load(&self, pending: PendingLoad) {
        let (item, uri, seq, token) = match pending {
            PendingLoad::Clear { token } => {
                self.inner.adapter.load_source(None, token).await;
                return;
            }
            PendingLoad::Track { item, uri, seq, token } => (item, uri, seq, token),
        };

        let loaded = self.inner.adapter.load_source(Some(&uri), token).await;

        {
            let mut state = self.inner.state.lock().await;
            if state.load_seq != seq {
                tracing::debug!(title = %item.title, "Load superseded by a newer request");
                return;
            }
            if !loaded {
                state.is_playing = false;
                state.phase = PlaybackPhase::Paused;
                return;
            }
            state.source_loaded = true;
            if !state.is_playing {
                tracing::debug!(title = %item.title, "Paused while loading, not starting playback");
                state.phase = PlaybackPhase::Paused;
                return;
            }
        }

        if !self.inner.adapter.play().await {
            let mut state = self.inner.state.lock().await;
            if state.load_seq == seq {
                state.is_playing = false;
                state.phase = PlaybackPhase::Paused;
            }
        }
    }

    async fn mark_stopped(&self) {
        let mut state = self.inner.state.lock().await;
        state.is_playing = false;
        if state.current.is_some() {
            state.phase = PlaybackPhase::Paused;
        }
    }
}
