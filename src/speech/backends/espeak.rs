//! espeak-ng backend
//!
//! Runs `espeak-ng --stdin -w <file>` once per request. The text goes in on
//! stdin so nothing the user types can be mistaken for a command-line flag.
//!
//! Dependencies:
//! - espeak-ng (install with: sudo apt install espeak-ng)

use crate::platform::{find_program, run_with_input};
use crate::speech::{AudioAsset, AudioFormat, SpeechRequest, Synthesizer, VoiceSelector};
use crate::{Result, SpeakwaveError};
use log::debug;
use std::path::Path;
use std::process::{Command, Stdio};

/// espeak-ng's default speaking rate in words per minute
const DEFAULT_WPM: u32 = 175;

/// espeak-ng's default pitch (0-99 scale)
const DEFAULT_PITCH: u32 = 50;

/// espeak-ng backend writing WAV files
pub struct EspeakSynth {
    /// Path to espeak-ng
    espeak_path: String,

    /// Base language for voice names
    language: String,
}

impl EspeakSynth {
    /// Create a new espeak-ng synthesizer
    ///
    /// Verifies espeak-ng is installed
    pub fn new() -> Result<Self> {
        debug!("Creating espeak-ng backend");

        let espeak_path = Self::find_espeak()?;
        debug!("Found espeak-ng at: {}", espeak_path);

        Ok(Self {
            espeak_path,
            language: "en".to_string(),
        })
    }

    /// Use `language` as the base of the voice names
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    /// Find espeak-ng executable
    fn find_espeak() -> Result<String> {
        find_program(&["espeak-ng", "/usr/bin/espeak-ng", "espeak"], &["--version"]).ok_or_else(
            || {
                SpeakwaveError::Synthesis(
                    "espeak-ng not found. Install with: sudo apt install espeak-ng".to_string(),
                )
            },
        )
    }

    /// Convert a speed percentage (50-200) to espeak words per minute
    fn speed_to_wpm(speed: u16) -> u32 {
        // 100% = 175 wpm (espeak default), clamped to espeak's 80-450 range
        (DEFAULT_WPM * speed as u32 / 100).clamp(80, 450)
    }

    /// Convert a pitch percentage (50-200) to espeak's 0-99 pitch
    fn pitch_to_espeak(pitch: u16) -> u32 {
        // 100% = 50 (espeak default)
        (DEFAULT_PITCH * pitch as u32 / 100).min(99)
    }

    /// espeak-ng voice variant for a voice type
    fn voice_name(&self, voice: VoiceSelector) -> String {
        let variant = match voice {
            VoiceSelector::Male => "m3",
            VoiceSelector::Female => "f3",
            VoiceSelector::Robotic => "robosoft",
        };
        format!("{}+{}", self.language, variant)
    }

    /// Build the espeak-ng invocation for a request
    fn build_command(&self, request: &SpeechRequest, output: &Path) -> Command {
        let mut cmd = Command::new(&self.espeak_path);
        cmd.arg("--stdin");
        cmd.arg("-w").arg(output);
        cmd.arg("-v").arg(self.voice_name(request.voice()));
        cmd.arg("-s").arg(Self::speed_to_wpm(request.speed()).to_string());
        if let Some(pitch) = request.pitch() {
            cmd.arg("-p").arg(Self::pitch_to_espeak(pitch).to_string());
        }
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::piped());
        cmd
    }
}

impl Synthesizer for EspeakSynth {
    fn name(&self) -> &str {
        "espeak-ng"
    }

    fn output_format(&self) -> AudioFormat {
        AudioFormat::Wav
    }

    fn supports_pitch(&self) -> bool {
        true
    }

    fn synthesize(&self, request: &SpeechRequest, output: &Path) -> Result<AudioAsset> {
        let mut cmd = self.build_command(request, output);
        debug!("Running {:?}", cmd);

        let result = run_with_input(&mut cmd, request.text().as_bytes(), "espeak-ng")?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(SpeakwaveError::Synthesis(format!(
                "espeak-ng exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        debug!("espeak-ng wrote {}", output.display());
        Ok(AudioAsset::new(output, AudioFormat::Wav, request.clone()))
    }
}
