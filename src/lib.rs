//! Terminal client for the Jamendo catalog with a local playback core.

#[cfg(feature = "audio")]
pub mod audio;
pub mod auth;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;
pub mod player;
pub mod view;
