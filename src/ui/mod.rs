//! Full-screen terminal front end

pub mod app;
pub mod editor;
pub mod keymap;
pub mod prompt;
pub mod view;
pub mod waveform;

pub use app::App;
pub use waveform::WaveformPanel;

use crate::config::Config;
use crate::session::Session;
use crate::{Result, SpeakwaveError};
use crossterm::{
    cursor::Show,
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{debug, warn};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};

/// RAII guard that puts the terminal into TUI mode
///
/// Restores the terminal on drop, including when the UI loop bails out
/// with an error.
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn new() -> Result<Self> {
        enable_raw_mode()
            .map_err(|e| SpeakwaveError::Terminal(format!("Failed to enable raw mode: {}", e)))?;
        let guard = Self { _private: () };

        execute!(io::stdout(), EnterAlternateScreen, EnableBracketedPaste).map_err(|e| {
            SpeakwaveError::Terminal(format!("Failed to enter alternate screen: {}", e))
        })?;
        debug!("Terminal in TUI mode");
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen, Show) {
            warn!("Failed to leave alternate screen: {}", e);
        }
        if let Err(e) = disable_raw_mode() {
            warn!("Failed to disable raw mode: {}", e);
        }
        debug!("Terminal restored");
    }
}

/// Run the UI until the user quits, then shut the session down
///
/// The caller must hold a `TerminalGuard`.
pub fn run(config: &Config, session: &mut Session) -> Result<()> {
    let mut terminal: Terminal<CrosstermBackend<Stdout>> =
        Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;

    let mut app = App::new(config, session);
    let result = app.run(&mut terminal, session);

    let removed = session.shutdown();
    debug!("Shutdown attempted {} temp file(s)", removed);
    result
}
