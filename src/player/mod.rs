//! Playback core: queue, engine adapter, controller and seek bar scrubbing
//!
//! The UI never touches an `AudioEngine` directly; it goes through
//! [`PlaybackController`], which owns the engine for the life of the process.

mod controller;
mod engine;
mod events;
mod item;
mod queue;
mod scrub;

pub use controller::PlaybackController;
pub use engine::{
    AudioEngine, EngineAdapter, EngineError, EngineStatus, SourceToken, StatusUpdate, Subscription,
};
pub use item::{PlayableItem, PlaybackPhase, PlaybackSnapshot};
pub use queue::Queue;
pub use scrub::{ScrubCoordinator, ScrubState};

#[cfg(test)]
pub(crate) use engine::testing;
