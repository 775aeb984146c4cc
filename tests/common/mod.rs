//! Shared helpers for the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use jamendo_rs::config::PlayerConfig;
use jamendo_rs::player::{
    AudioEngine, EngineError, EngineStatus, PlayableItem, PlaybackController, PlaybackSnapshot, SourceToken,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Load(Option<String>),
    Play,
    Pause,
    Seek(u64),
    Release,
}

/// Engine that records every call and lets the test push status events.
#[derive(Default)]
pub struct ScriptedEngine {
    calls: Mutex<Vec<Call>>,
    token: AtomicU64,
    events: Mutex<Option<mpsc::UnboundedSender<EngineStatus>>>,
}

impl ScriptedEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn loads(&self) -> Vec<Option<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Load(uri) => Some(uri),
                _ => None,
            })
            .collect()
    }

    pub fn seeks(&self) -> Vec<u64> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Seek(ms) => Some(ms),
                _ => None,
            })
            .collect()
    }

    pub fn token(&self) -> SourceToken {
        SourceToken(self.token.load(Ordering::SeqCst))
    }

    pub fn emit(&self, playing: bool, position_ms: u64, duration_ms: u64, finished: bool) {
        self.emit_for(self.token(), playing, position_ms, duration_ms, finished);
    }

    pub fn emit_for(&self, token: SourceToken, playing: bool, position_ms: u64, duration_ms: u64, finished: bool) {
        if let Some(sender) = self.events.lock().unwrap().as_ref() {
            let _ = sender.send(EngineStatus {
                source: token,
                playing,
                position: Duration::from_millis(position_ms),
                duration: (duration_ms > 0).then(|| Duration::from_millis(duration_ms)),
                did_just_finish: finished,
            });
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AudioEngine for ScriptedEngine {
    async fn load(&self, source: Option<&str>, token: SourceToken) -> Result<(), EngineError> {
        self.record(Call::Load(source.map(str::to_string)));
        self.token.store(token.0, Ordering::SeqCst);
        Ok(())
    }

    async fn play(&self) -> Result<(), EngineError> {
        self.record(Call::Play);
        Ok(())
    }

    async fn pause(&self) -> Result<(), EngineError> {
        self.record(Call::Pause);
        Ok(())
    }

    async fn seek(&self, position: Duration) -> Result<(), EngineError> {
        self.record(Call::Seek(position.as_millis() as u64));
        Ok(())
    }

    fn status_events(&self) -> mpsc::UnboundedReceiver<EngineStatus> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.events.lock().unwrap() = Some(tx);
        rx
    }

    async fn release(&self) -> Result<(), EngineError> {
        self.record(Call::Release);
        *self.events.lock().unwrap() = None;
        Ok(())
    }
}

pub fn item(title: &str, audio: Option<&str>) -> PlayableItem {
    PlayableItem::new(title, "Test Artist", audio.map(str::to_string))
}

pub fn start(engine: &Arc<ScriptedEngine>) -> PlaybackController {
    PlaybackController::start(engine.clone(), &PlayerConfig::default())
}

/// Poll the snapshot until `check` holds. Status events are handled on a
/// spawned task, so assertions on them cannot be made synchronously.
pub async fn eventually<F>(player: &PlaybackController, check: F) -> PlaybackSnapshot
where
    F: Fn(&PlaybackSnapshot) -> bool,
{
    for _ in 0..200 {
        let snapshot = player.snapshot().await;
        if check(&snapshot) {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached: {:?}", player.snapshot().await);
}

/// Wait until the engine has seen `count` loads.
pub async fn loads_reach(engine: &ScriptedEngine, count: usize) -> Vec<Option<String>> {
    for _ in 0..200 {
        let loads = engine.loads();
        if loads.len() >= count {
            return loads;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("engine saw only {:?}", engine.loads());
}
