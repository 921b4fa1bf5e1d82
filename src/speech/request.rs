//! Speech requests and the audio assets produced from them

use crate::{Result, SpeakwaveError};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Slowest speed the controls allow, in percent of normal
pub const MIN_SPEED: u16 = 50;
/// Fastest speed the controls allow, in percent of normal
pub const MAX_SPEED: u16 = 200;
/// Lowest pitch the controls allow, in percent of normal
pub const MIN_PITCH: u16 = 50;
/// Highest pitch the controls allow, in percent of normal
pub const MAX_PITCH: u16 = 200;

/// Voice type picked in the voice controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VoiceSelector {
    Male,
    #[default]
    Female,
    Robotic,
}

impl VoiceSelector {
    /// All selectable voices in display order
    pub const ALL: [VoiceSelector; 3] = [
        VoiceSelector::Male,
        VoiceSelector::Female,
        VoiceSelector::Robotic,
    ];

    pub fn label(self) -> &'static str {
        match self {
            VoiceSelector::Male => "Male",
            VoiceSelector::Female => "Female",
            VoiceSelector::Robotic => "Robotic",
        }
    }

    /// Next voice, wrapping around
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous voice, wrapping around
    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for VoiceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VoiceSelector {
    type Err = SpeakwaveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(VoiceSelector::Male),
            "female" => Ok(VoiceSelector::Female),
            "robotic" | "robot" => Ok(VoiceSelector::Robotic),
            other => Err(SpeakwaveError::Config(format!("Unknown voice type '{}'", other))),
        }
    }
}

/// One play or save action's input
///
/// Built from the UI controls when the user presses Play or Save and never
/// changed after that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    text: String,
    voice: VoiceSelector,
    speed: u16,
    pitch: Option<u16>,
}

impl SpeechRequest {
    /// Create a request; the text is trimmed and speed/pitch are clamped into range
    pub fn new(text: &str, voice: VoiceSelector, speed: u16, pitch: Option<u16>) -> Self {
        Self {
            text: text.trim().to_string(),
            voice,
            speed: speed.clamp(MIN_SPEED, MAX_SPEED),
            pitch: pitch.map(|p| p.clamp(MIN_PITCH, MAX_PITCH)),
        }
    }

    /// Request with the default voice, normal speed and no pitch change
    pub fn with_text(text: &str) -> Self {
        Self::new(text, VoiceSelector::default(), 100, None)
    }

    /// Reject requests whose text is empty after trimming
    pub fn validate(&self) -> Result<()> {
        if self.text.is_empty() {
            return Err(SpeakwaveError::EmptyInput);
        }
        Ok(())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn voice(&self) -> VoiceSelector {
        self.voice
    }

    /// Speed in percent of the engine's normal rate
    pub fn speed(&self) -> u16 {
        self.speed
    }

    /// Pitch in percent of the engine's normal pitch, if one was requested
    pub fn pitch(&self) -> Option<u16> {
        self.pitch
    }

    /// Copy of this request with the pitch dropped
    pub fn without_pitch(&self) -> Self {
        Self {
            pitch: None,
            ..self.clone()
        }
    }
}

/// Container format of a generated sound file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    Wav,
    Mp3,
}

impl AudioFormat {
    pub fn extension(self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
        }
    }

    /// Parse a file extension or format name (with or without the dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "wav" | "wave" => Some(AudioFormat::Wav),
            "mp3" => Some(AudioFormat::Mp3),
            _ => None,
        }
    }

    /// Guess the format from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A generated sound file and the request it came from
#[derive(Debug, Clone)]
pub struct AudioAsset {
    pub path: PathBuf,
    pub format: AudioFormat,
    pub request: SpeechRequest,
}

impl AudioAsset {
    pub fn new(path: impl Into<PathBuf>, format: AudioFormat, request: SpeechRequest) -> Self {
        Self {
            path: path.into(),
            format,
            request,
        }
    }
}
