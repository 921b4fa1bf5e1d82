//! Speech synthesizer abstraction
//!
//! Every backend turns a `SpeechRequest` into a sound file on disk. The
//! session only talks to this trait, so it never needs to know which engine
//! is installed on the host.

use super::backends::command::CommandSynth;
use super::backends::espeak::EspeakSynth;
use super::backends::sapi::SapiSynth;
use super::{AudioAsset, AudioFormat, SpeechRequest};
use crate::config::{BackendChoice, Config};
use crate::platform::has_windows_speech;
use crate::{Result, SpeakwaveError};
use log::info;
use std::path::Path;
use std::sync::Arc;

/// Speech synthesizer trait
///
/// Implementations are shared with background tasks, so they must be
/// callable through `&self` from any thread.
pub trait Synthesizer: Send + Sync {
    /// Short backend name for the status line and logs
    fn name(&self) -> &str;

    /// Format of the files `synthesize` writes
    fn output_format(&self) -> AudioFormat;

    /// Whether the pitch of a request has any effect
    fn supports_pitch(&self) -> bool;

    /// Synthesize `request` into `output`
    ///
    /// Blocks until the file is complete.
    fn synthesize(&self, request: &SpeechRequest, output: &Path) -> Result<AudioAsset>;
}

/// Create the synthesizer selected in the configuration
///
/// With `backend = auto` the platform decides the order:
///
/// **Windows / WSL:**
/// 1. Windows SAPI via PowerShell
/// 2. espeak-ng
/// 3. Configured command (gtts-cli by default)
///
/// **Everything else:**
/// 1. espeak-ng
/// 2. Configured command
pub fn create_synth(config: &Config) -> Result<Arc<dyn Synthesizer>> {
    match config.backend() {
        BackendChoice::Espeak => {
            let synth = EspeakSynth::new()?.with_language(&config.language());
            Ok(Arc::new(synth))
        }
        BackendChoice::Sapi => Ok(Arc::new(SapiSynth::new()?)),
        BackendChoice::Command => Ok(Arc::new(CommandSynth::from_config(config)?)),
        BackendChoice::Auto => auto_detect(config),
    }
}

fn auto_detect(config: &Config) -> Result<Arc<dyn Synthesizer>> {
    let mut tried = Vec::new();

    if has_windows_speech() {
        info!("Trying Windows SAPI backend...");
        match SapiSynth::new() {
            Ok(synth) => {
                info!("✓ Successfully initialized Windows SAPI backend");
                return Ok(Arc::new(synth));
            }
            Err(e) => {
                info!("✗ Windows SAPI backend unavailable: {}", e);
                tried.push(format!("Windows SAPI ({})", e));
            }
        }
    }

    info!("Trying espeak-ng backend...");
    match EspeakSynth::new() {
        Ok(synth) => {
            let synth = synth.with_language(&config.language());
            info!("✓ Successfully initialized espeak-ng backend");
            return Ok(Arc::new(synth));
        }
        Err(e) => {
            info!("✗ espeak-ng backend unavailable: {}", e);
            tried.push(format!("espeak-ng ({})", e));
        }
    }

    info!("Trying command backend ({})...", config.command_program());
    match CommandSynth::from_config(config) {
        Ok(synth) => {
            info!("✓ Successfully initialized command backend");
            Ok(Arc::new(synth))
        }
        Err(e) => {
            tried.push(format!("{} ({})", config.command_program(), e));
            Err(SpeakwaveError::Synthesis(format!(
                "No speech backend available on {}. Tried:\n  {}\n\
                 Install espeak-ng (sudo apt install espeak-ng) or gTTS (pip install gTTS).",
                std::env::consts::OS,
                tried.join("\n  ")
            )))
        }
    }
}
