//! Seek bar scrubbing: preview while dragging, seek once on release

use super::controller::PlaybackController;

/// Ephemeral drag state, only meaningful while a gesture is active
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrubState {
    pub is_scrubbing: bool,
    pub preview_ratio: Option<f64>,
}

/// Turns a drag over a progress bar into a single committed seek.
#[derive(Clone, Debug)]
pub struct ScrubCoordinator {
    bar_width: f64,
    state: ScrubState,
}

impl ScrubCoordinator {
    pub fn new(bar_width: f64) -> Self {
        Self {
            bar_width,
            state: ScrubState::default(),
        }
    }

    pub fn set_bar_width(&mut self, bar_width: f64) {
        self.bar_width = bar_width;
    }

    pub fn state(&self) -> ScrubState {
        self.state
    }

    pub fn is_scrubbing(&self) -> bool {
        self.state.is_scrubbing
    }

    pub fn begin(&mut self, x: f64) {
        self.state = ScrubState {
            is_scrubbing: true,
            preview_ratio: Some(self.ratio_at(x)),
        };
    }

    /// Move the preview. Ignored unless a drag is in progress.
    pub fn update(&mut self, x: f64) {
        if self.state.is_scrubbing {
            self.state.preview_ratio = Some(self.ratio_at(x));
        }
    }

    /// Abandon the drag without seeking.
    pub fn cancel(&mut self) {
        self.state = ScrubState::default();
    }

    /// Where a commit would seek to, given the track duration.
    pub fn commit_target(&self, duration_ms: u64) -> Option<u64> {
        if !self.state.is_scrubbing || duration_ms == 0 {
            return None;
        }
        self.state
            .preview_ratio
            .map(|ratio| (ratio * duration_ms as f64).floor() as u64)
    }

    /// End the drag, seeking the player once when a target is known.
    ///
    /// Scrub state is cleared whatever the outcome.
    pub async fn commit(&mut self, player: &PlaybackController) -> Option<u64> {
        let duration_ms = player.snapshot().await.duration_ms;
        let target = self.commit_target(duration_ms);
        self.state = ScrubState::default();

        if let Some(target) = target {
            tracing::debug!(position_ms = target, "Committing scrub");
            player.seek_to(target).await;
        }
        target
    }

    /// Position to show: the preview while dragging, otherwise the live one.
    pub fn display_position_ms(&self, live_ms: u64, duration_ms: u64) -> u64 {
        match (self.state.is_scrubbing, self.state.preview_ratio) {
            (true, Some(ratio)) => (ratio * duration_ms as f64).floor() as u64,
            _ => live_ms,
        }
    }

    fn ratio_at(&self, x: f64) -> f64 {
        if self.bar_width <= 0.0 {
            return 0.0;
        }
        (x / self.bar_width).clamp(0.0, 1.0)
    }
}

impl Default for ScrubCoordinator {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::engine::testing::{Call, FakeEngine};
    use super::super::item::PlayableItem;
    use super::*;
    use crate::config::PlayerConfig;

    #[test]
    fn begin_computes_preview_ratio() {
        let mut scrub = ScrubCoordinator::new(200.0);
        scrub.begin(50.0);
        assert_eq!(scrub.state().preview_ratio, Some(0.25));
        assert!(scrub.is_scrubbing());
        assert_eq!(scrub.commit_target(100_000), Some(25_000));
    }

    #[test]
    fn ratio_is_clamped_to_bar() {
        let mut scrub = ScrubCoordinator::new(200.0);
        scrub.begin(-30.0);
        assert_eq!(scrub.state().preview_ratio, Some(0.0));
        scrub.update(450.0);
        assert_eq!(scrub.state().preview_ratio, Some(1.0));
    }

    #[test]
    fn update_without_begin_is_ignored() {
        let mut scrub = ScrubCoordinator::new(100.0);
        scrub.update(40.0);
        assert_eq!(scrub.state(), ScrubState::default());
    }

    #[test]
    fn preview_overrides_live_position() {
        let mut scrub = ScrubCoordinator::new(100.0);
        assert_eq!(scrub.display_position_ms(1_234, 60_000), 1_234);

        scrub.begin(50.0);
        assert_eq!(scrub.display_position_ms(1_234, 60_000), 30_000);

        scrub.cancel();
        assert_eq!(scrub.display_position_ms(1_234, 60_000), 1_234);
    }

    #[test]
    fn zero_width_bar_previews_start() {
        let mut scrub = ScrubCoordinator::default();
        scrub.begin(10.0);
        assert_eq!(scrub.state().preview_ratio, Some(0.0));
    }

    #[tokio::test]
    async fn commit_seeks_once_and_clears() {
        let engine = FakeEngine::new();
        let player = PlaybackController::start(engine.clone(), &PlayerConfig::default());
        player
            .play_item(PlayableItem::new("Track", "Artist", Some("a".to_string())))
            .await;
        engine.emit(true, 0, 100_000, false);
        for _ in 0..100 {
            if player.snapshot().await.duration_ms == 100_000 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let mut scrub = ScrubCoordinator::new(200.0);
        scrub.begin(10.0);
        scrub.update(50.0);

        assert_eq!(scrub.commit(&player).await, Some(25_000));
        assert_eq!(scrub.state(), ScrubState::default());
        assert_eq!(player.snapshot().await.position_ms, 25_000);

        let seeks: Vec<Call> = engine
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Seek(_)))
            .collect();
        assert_eq!(seeks, vec![Call::Seek(25_000)]);

        assert_eq!(scrub.commit(&player).await, None);
    }

    #[tokio::test]
    async fn commit_without_duration_only_clears() {
        let engine = FakeEngine::new();
        let player = PlaybackController::start(engine.clone(), &PlayerConfig::default());

        let mut scrub = ScrubCoordinator::new(200.0);
        scrub.begin(100.0);
        assert_eq!(scrub.commit(&player).await, None);
        assert!(!scrub.is_scrubbing());
        assert!(engine.calls().is_empty());
    }
}
