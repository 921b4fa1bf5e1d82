//! Error types for speakwave

use std::io;
use thiserror::Error;

/// Main error type for speakwave
#[derive(Error, Debug)]
pub enum SpeakwaveError {
    #[error("Please enter some text first")]
    EmptyInput,

    #[error("Save cancelled")]
    SaveCancelled,

    #[error("Another action is still running")]
    Busy,

    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Other(String),
}

impl SpeakwaveError {
    /// Short text for the status line
    ///
    /// User-input conditions are shown verbatim, everything else is
    /// prefixed the way the play action reports failures.
    pub fn status_message(&self) -> String {
        match self {
            SpeakwaveError::EmptyInput | SpeakwaveError::SaveCancelled | SpeakwaveError::Busy => {
                self.to_string()
            }
            other => format!("Error: {}", other),
        }
    }

    /// True for conditions caused by user input rather than a failing collaborator
    pub fn is_user_condition(&self) -> bool {
        matches!(
            self,
            SpeakwaveError::EmptyInput | SpeakwaveError::SaveCancelled | SpeakwaveError::Busy
        )
    }
}

/// Result type alias for speakwave operations
pub type Result<T> = std::result::Result<T, SpeakwaveError>;

impl From<hound::Error> for SpeakwaveError {
    fn from(e: hound::Error) -> Self {
        SpeakwaveError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_for_user_conditions() {
        assert_eq!(
            SpeakwaveError::EmptyInput.status_message(),
            "Please enter some text first"
        );
        assert_eq!(SpeakwaveError::SaveCancelled.status_message(), "Save cancelled");
        assert!(SpeakwaveError::Busy.is_user_condition());
    }

    #[test]
    fn test_status_message_for_failures() {
        let err = SpeakwaveError::Conversion("ffmpeg not found".to_string());
        assert_eq!(err.status_message(), "Error: Conversion error: ffmpeg not found");
        assert!(!err.is_user_condition());
    }
}
