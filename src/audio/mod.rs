//! Playback, format conversion and waveform decoding

pub mod convert;
pub mod playback;
pub mod waveform;

pub use convert::{FfmpegTranscoder, Transcoder};
pub use playback::{Player, RodioPlayer};
pub use waveform::Waveform;
