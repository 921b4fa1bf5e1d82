//! Speech synthesis system

pub mod backends;
pub mod request;
pub mod synth;

pub use request::{AudioAsset, AudioFormat, SpeechRequest, VoiceSelector};
pub use synth::{create_synth, Synthesizer};
