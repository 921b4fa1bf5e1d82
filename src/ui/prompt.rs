//! Save prompt for collecting the export path
//!
//! Modal: while it is open every key goes here first.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::debug;
use std::path::PathBuf;

/// Path suggested when the prompt opens
pub const DEFAULT_FILE_NAME: &str = "speech.mp3";

/// What the prompt wants the app to do after a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// Keep the prompt open
    Pending,
    /// Prompt closed; `None` means the user backed out
    Done(Option<PathBuf>),
}

/// Handler that collects a path until Enter or Esc
#[derive(Debug, Clone)]
pub struct SavePrompt {
    buffer: String,
}

impl SavePrompt {
    pub fn new() -> Self {
        Self {
            buffer: DEFAULT_FILE_NAME.to_string(),
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn process(&mut self, key: &KeyEvent) -> PromptOutcome {
        match key.code {
            KeyCode::Enter => {
                let path = self.buffer.trim();
                debug!("SavePrompt: accepting '{}'", path);
                if path.is_empty() {
                    PromptOutcome::Done(None)
                } else {
                    PromptOutcome::Done(Some(expand_home(path)))
                }
            }

            KeyCode::Esc => {
                debug!("SavePrompt: cancelled");
                PromptOutcome::Done(None)
            }

            KeyCode::Backspace => {
                self.buffer.pop();
                PromptOutcome::Pending
            }

            // Ctrl+U clears the line like a shell
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.buffer.clear();
                PromptOutcome::Pending
            }

            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.buffer.push(c);
                PromptOutcome::Pending
            }

            _ => PromptOutcome::Pending,
        }
    }
}

impl Default for SavePrompt {
    fn default() -> Self {
        Self::new()
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
