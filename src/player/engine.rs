//! Audio engine contract and the adapter that isolates the controller from it
//!
//! An [`AudioEngine`] is whatever actually produces sound (rodio on desktop,
//! a scripted fake in tests). The [`EngineAdapter`] wraps exactly one engine,
//! turns every engine failure into a logged "not playing" outcome and makes
//! sure status events for a replaced source never reach subscribers.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Identifies one loaded source. Statuses carry the token of the source
/// they describe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct SourceToken(pub u64);

/// Raw status as reported by an engine
#[derive(Clone, Debug, PartialEq)]
pub struct EngineStatus {
    pub source: SourceToken,
    pub playing: bool,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub did_just_finish: bool,
}

/// Status delivered to adapter subscribers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Source the status describes
    pub source: SourceToken,
    pub is_playing: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub did_just_finish: bool,
}

impl From<&EngineStatus> for StatusUpdate {
    fn from(status: &EngineStatus) -> Self {
        Self {
            source: status.source,
            is_playing: status.playing,
            position_ms: status.position.as_millis() as u64,
            duration_ms: status.duration.map(|d| d.as_millis() as u64).unwrap_or(0),
            did_just_finish: status.did_just_finish,
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to fetch audio: {0}")]
    Fetch(String),

    #[error("Unsupported or corrupted audio: {0}")]
    Decode(String),

    #[error("Audio output unavailable: {0}")]
    Output(String),

    #[error("Seek failed: {0}")]
    Seek(String),

    #[error("Audio engine has been released")]
    Released,
}

/// Platform audio playback primitive.
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Replace the loaded source. `None` unloads and stops playback.
    async fn load(&self, source: Option<&str>, token: SourceToken) -> Result<(), EngineError>;

    /// Start or resume. Does nothing when no source is loaded.
    async fn play(&self) -> Result<(), EngineError>;

    async fn pause(&self) -> Result<(), EngineError>;

    async fn seek(&self, position: Duration) -> Result<(), EngineError>;

    /// Open the status stream, replacing any previous listener.
    fn status_events(&self) -> mpsc::UnboundedReceiver<EngineStatus>;

    /// Free the underlying playback resource.
    async fn release(&self) -> Result<(), EngineError>;
}

/// Handle to an active status subscription.
///
/// Disposing stops further callbacks. Dropping the handle disposes it.
pub struct Subscription {
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    fn new(task: JoinHandle<()>) -> Self {
        Self { task: Some(task) }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn dispose(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("Engine status subscription disposed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Wraps the single audio engine instance.
pub struct EngineAdapter {
    engine: Arc<dyn AudioEngine>,
    next_token: AtomicU64,
    current_token: Arc<AtomicU64>,
    last_duration_ms: Arc<AtomicU64>,
    released: AtomicBool,
}

impl EngineAdapter {
    pub fn new(engine: Arc<dyn AudioEngine>) -> Self {
        Self {
            engine,
            next_token: AtomicU64::new(1),
            current_token: Arc::new(AtomicU64::new(0)),
            last_duration_ms: Arc::new(AtomicU64::new(0)),
            released: AtomicBool::new(false),
        }
    }

    /// Load `uri`, or unload when `None`. Returns whether a source is loaded.
    pub async fn load(&self, uri: Option<&str>) -> bool {
        let token = self.begin_load();
        self.load_source(uri, token).await
    }

    /// Issue the token for the next source and make it current.
    ///
    /// From here on anything the engine still reports about the previous
    /// source is dropped. Callers that keep their own copy of the current
    /// token take it in the same critical section that swaps their item.
    pub fn begin_load(&self) -> SourceToken {
        let token = SourceToken(self.next_token.fetch_add(1, Ordering::SeqCst));
        self.current_token.store(token.0, Ordering::SeqCst);
        self.last_duration_ms.store(0, Ordering::SeqCst);
        token
    }

    /// Hand `uri` to the engine under a token from [`begin_load`](Self::begin_load).
    pub async fn load_source(&self, uri: Option<&str>, token: SourceToken) -> bool {
        if self.released.load(Ordering::SeqCst) {
            tracing::warn!("Load requested after engine release");
            return false;
        }

        match self.engine.load(uri, token).await {
            Ok(()) => {
                tracing::debug!(token = token.0, uri = ?uri, "Engine source loaded");
                uri.is_some()
            }
            Err(e) => {
                tracing::warn!(uri = ?uri, error = %e, "Engine failed to load source");
                false
            }
        }
    }

    pub async fn play(&self) -> bool {
        match self.engine.play().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Engine failed to play");
                false
            }
        }
    }

    pub async fn pause(&self) -> bool {
        match self.engine.pause().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Engine failed to pause");
                false
            }
        }
    }

    /// Seek, clamped to the last duration the engine reported.
    pub async fn seek(&self, position_ms: u64) -> bool {
        let duration_ms = self.last_duration_ms.load(Ordering::SeqCst);
        let target = if duration_ms > 0 { position_ms.min(duration_ms) } else { position_ms };

        match self.engine.seek(Duration::from_millis(target)).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(position_ms = target, error = %e, "Engine failed to seek");
                false
            }
        }
    }

    /// Deliver engine statuses for the current source to `on_status`, in order.
    ///
    /// The token check here only thins the stream. A status can pass it and
    /// then wait while a newer load starts, so `on_status` must compare
    /// `StatusUpdate::source` again under its own lock.
    pub fn subscribe<F, Fut>(&self, on_status: F) -> Subscription
    where
        F: Fn(StatusUpdate) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut events = self.engine.status_events();
        let current_token = self.current_token.clone();
        let last_duration_ms = self.last_duration_ms.clone();

        let task = tokio::spawn(async move {
            while let Some(status) = events.recv().await {
                if status.source.0 != current_token.load(Ordering::SeqCst) {
                    tracing::trace!(token = status.source.0, "Dropping status for replaced source");
                    continue;
                }

                let update = StatusUpdate::from(&status);
                if update.duration_ms > 0 {
                    last_duration_ms.store(update.duration_ms, Ordering::SeqCst);
                }
                on_status(update).await;
            }
            tracing::debug!("Engine status stream closed");
        });

        Subscription::new(task)
    }

    /// Release the engine. Only the first call reaches the engine.
    pub async fn release(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        self.current_token.store(0, Ordering::SeqCst);
        match self.engine.release().await {
            Ok(()) => tracing::info!("Audio engine released"),
            Err(e) => tracing::warn!(error = %e, "Audio engine release reported an error"),
        }
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::testing::{Call, FakeEngine};
    use super::*;

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn load_failure_is_reported_not_raised() {
        let engine = FakeEngine::new();
        engine.fail_uris.lock().unwrap().push("https://cdn/broken.mp3".to_string());
        let adapter = EngineAdapter::new(engine.clone());

        assert!(!adapter.load(Some("https://cdn/broken.mp3")).await);
        assert!(adapter.load(Some("https://cdn/ok.mp3")).await);
        assert!(!adapter.load(None).await);
    }

    #[tokio::test]
    async fn statuses_for_replaced_source_are_dropped() {
        let engine = FakeEngine::new();
        let adapter = EngineAdapter::new(engine.clone());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        let _subscription = adapter.subscribe(move |update| {
            let sink = sink.clone();
            async move { sink.lock().unwrap().push(update) }
        });

        adapter.load(Some("first")).await;
        let first = engine.current_token();
        adapter.load(Some("second")).await;

        engine.emit_for(first, false, 9_000, 9_000, true);
        engine.emit(true, 100, 9_000, false);
        settle().await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].source, engine.current_token());
        assert_eq!(seen[0].position_ms, 100);
        assert!(!seen[0].did_just_finish);
    }

    #[tokio::test]
    async fn seek_clamps_to_reported_duration() {
        let engine = FakeEngine::new();
        let adapter = EngineAdapter::new(engine.clone());
        let _subscription = adapter.subscribe(|_| async {});

        adapter.seek(50_000).await;
        adapter.load(Some("track")).await;
        engine.emit(true, 0, 30_000, false);
        settle().await;
        adapter.seek(50_000).await;

        let seeks: Vec<Call> = engine
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Seek(_)))
            .collect();
        assert_eq!(seeks, vec![Call::Seek(50_000), Call::Seek(30_000)]);
    }

    #[tokio::test]
    async fn disposed_subscription_stops_callbacks() {
        let engine = FakeEngine::new();
        let adapter = EngineAdapter::new(engine.clone());
        let count = Arc::new(AtomicU64::new(0));

        let counter = count.clone();
        let mut subscription = adapter.subscribe(move |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        adapter.load(Some("track")).await;

        engine.emit(true, 400, 10_000, false);
        settle().await;
        assert!(subscription.is_active());

        subscription.dispose();
        subscription.dispose();
        engine.emit(true, 800, 10_000, false);
        settle().await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!subscription.is_active());
    }

    #[tokio::test]
    async fn release_reaches_engine_once() {
        let engine = FakeEngine::new();
        let adapter = EngineAdapter::new(engine.clone());

        adapter.release().await;
        adapter.release().await;
        assert!(adapter.is_released());
        assert!(!adapter.load(Some("late")).await);

        let releases = engine.calls().into_iter().filter(|c| *c == Call::Release).count();
        assert_eq!(releases, 1);
    }
}
