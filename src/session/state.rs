//! Playback state and control enablement

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Where the session is in its play cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PlaybackState {
    Idle = 0,
    Playing = 1,
    Stopped = 2,
}

impl PlaybackState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => PlaybackState::Playing,
            2 => PlaybackState::Stopped,
            _ => PlaybackState::Idle,
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Playing => "playing",
            PlaybackState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Atomic holder for `PlaybackState`, shared between the UI thread and the play task
#[derive(Debug)]
pub struct PlaybackCell(AtomicU8);

impl PlaybackCell {
    pub fn new(state: PlaybackState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub fn get(&self) -> PlaybackState {
        PlaybackState::from_u8(self.0.load(Ordering::SeqCst))
    }

    pub fn set(&self, state: PlaybackState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }

    /// Move from `current` to `new` only if the cell still holds `current`
    pub fn transition(&self, current: PlaybackState, new: PlaybackState) -> bool {
        self.0
            .compare_exchange(current as u8, new as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

impl Default for PlaybackCell {
    fn default() -> Self {
        Self::new(PlaybackState::Idle)
    }
}

/// Which buttons are currently usable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub play: bool,
    pub save: bool,
    pub stop: bool,
}

impl Controls {
    /// Nothing running: play and save enabled
    pub fn ready() -> Self {
        Self {
            play: true,
            save: true,
            stop: false,
        }
    }

    /// Synthesizing or saving: everything disabled
    pub fn working() -> Self {
        Self {
            play: false,
            save: false,
            stop: false,
        }
    }

    /// Audio playing: only stop enabled
    pub fn playing() -> Self {
        Self {
            play: false,
            save: false,
            stop: true,
        }
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_round_trip() {
        let cell = PlaybackCell::default();
        assert_eq!(cell.get(), PlaybackState::Idle);
        cell.set(PlaybackState::Playing);
        assert_eq!(cell.get(), PlaybackState::Playing);
    }

    #[test]
    fn test_transition_requires_expected_state() {
        let cell = PlaybackCell::new(PlaybackState::Stopped);
        assert!(!cell.transition(PlaybackState::Playing, PlaybackState::Idle));
        assert_eq!(cell.get(), PlaybackState::Stopped);

        cell.set(PlaybackState::Playing);
        assert!(cell.transition(PlaybackState::Playing, PlaybackState::Idle));
        assert_eq!(cell.get(), PlaybackState::Idle);
    }

    #[test]
    fn test_controls_presets() {
        assert_eq!(Controls::default(), Controls::ready());
        assert!(!Controls::ready().stop);
        assert!(Controls::playing().stop && !Controls::playing().play);
        let working = Controls::working();
        assert!(!working.play && !working.save && !working.stop);
    }
}
