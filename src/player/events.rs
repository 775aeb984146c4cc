//! Engine status handling for the playback controller

use std::sync::Weak;

use super::controller::{Inner, PlaybackController};
use super::engine::{EngineAdapter, StatusUpdate, Subscription};
use super::item::PlaybackPhase;

impl PlaybackController {
    /// Subscribe the controller behind `controller` to engine statuses.
    ///
    /// Each event upgrades the handle and runs against the live controller,
    /// so auto-advance always sees the queue as it is now.
    pub(super) fn start_status_listener(adapter: &EngineAdapter, controller: Weak<Inner>) -> Subscription {
        tracing::info!("Starting engine status listener");

        adapter.subscribe(move |update| {
            let controller = controller.clone();
            async move {
                match controller.upgrade() {
                    Some(inner) => PlaybackController { inner }.handle_status(update).await,
                    None => tracing::trace!("Status arrived after controller was dropped"),
                }
            }
        })
    }

    pub(super) async fn handle_status(&self, update: StatusUpdate) {
        let advance = {
            let mut state = self.inner.state.lock().await;
            if update.source != state.source {
                tracing::trace!(source = update.source.0, "Status for a replaced source dropped");
                return;
            }
            if state.current.is_none() {
                return;
            }

            state.position_ms = update.position_ms;
            if update.duration_ms > 0 {
                state.duration_ms = update.duration_ms;
            } else if state.duration_ms == 0 {
                state.duration_ms = state
                    .current
                    .as_ref()
                    .and_then(|item| item.duration_ms)
                    .unwrap_or(0);
            }

            if !update.did_just_finish {
                match state.phase {
                    PlaybackPhase::Loading => {
                        if update.is_playing {
                            tracing::debug!(position_ms = update.position_ms, "Playback started");
                            state.phase = PlaybackPhase::Playing;
                        }
                    }
                    PlaybackPhase::Playing | PlaybackPhase::Paused => {
                        state.is_playing = update.is_playing;
                        state.phase = if update.is_playing {
                            PlaybackPhase::Playing
                        } else {
                            PlaybackPhase::Paused
                        };
                    }
                    PlaybackPhase::Idle => {}
                }
                tracing::trace!(
                    position_ms = update.position_ms,
                    duration_ms = update.duration_ms,
                    is_playing = update.is_playing,
                    "Engine status"
                );
                return;
            }

            let title = state.current.as_ref().map(|item| item.title.clone()).unwrap_or_default();
            tracing::info!(title = %title, "Track finished");

            state.is_playing = false;
            state.phase = PlaybackPhase::Paused;
            state.source_loaded = false;
            if state.duration_ms > 0 {
                state.position_ms = state.duration_ms;
            }

            // The next item is taken under the same lock as the finish
            match state.queue.advance() {
                Some(index) => self.begin_queue_item(&mut state, index),
                None => {
                    tracing::debug!("Nothing to advance to after finish");
                    None
                }
            }
        };

        if let Some(pending) = advance {
            self.run_load(pending).await;
        }
    }
}
