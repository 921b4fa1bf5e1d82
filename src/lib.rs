//! speakwave - terminal text-to-speech studio
//!
//! Type text, hear it spoken, see its waveform and export it as MP3.
//! Speech comes from whichever engine is installed (espeak-ng, Windows
//! SAPI or a configurable command such as gtts-cli).

pub mod audio;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod platform;
pub mod session;
pub mod speech;
pub mod ui;

pub use error::{Result, SpeakwaveError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "speakwave";
