//! Messages from background tasks to the UI thread

use super::PlaybackState;
use crate::audio::Waveform;
use std::path::PathBuf;

/// Something a background task wants the UI thread to know
///
/// Tasks never touch the UI directly; they send these over the session
/// channel and the UI applies them on its own turn.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A new waveform is ready to replace the plot
    Waveform(Waveform),
    /// The task changed the playback state
    PlaybackState(PlaybackState),
    /// Audio started; the stop control becomes usable
    PlaybackStarted,
    /// The play task is over; `stopped` is true when the user cut it short
    PlaybackFinished { stopped: bool },
    /// An MP3 export completed
    Saved(PathBuf),
    /// An action failed; carries the status line text
    Failed(String),
}
