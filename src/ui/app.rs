//! Application state and input dispatch

use super::editor::TextEditor;
use super::keymap::{create_default_keymap, lookup, Action, KeyChord};
use super::prompt::{PromptOutcome, SavePrompt};
use super::view;
use super::waveform::WaveformPanel;
use crate::clipboard::get_from_clipboard;
use crate::config::Config;
use crate::session::Session;
use crate::speech::request::{MAX_PITCH, MAX_SPEED, MIN_PITCH, MIN_SPEED};
use crate::speech::{SpeechRequest, VoiceSelector};
use crate::{Result, SpeakwaveError};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, info, warn};
use ratatui::backend::Backend;
use ratatui::Terminal;
use std::cell::Cell;
use std::collections::HashMap;
use std::time::Duration;

/// How long to wait for input before pumping session events again
const TICK: Duration = Duration::from_millis(50);

/// Slider step in percent
pub const SLIDER_STEP: u16 = 10;

/// Control that receives Left/Right and typed text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Text,
    Voice,
    Speed,
    Pitch,
}

impl Focus {
    const ORDER: [Focus; 4] = [Focus::Text, Focus::Voice, Focus::Speed, Focus::Pitch];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|&f| f == self).unwrap_or(0)
    }
}

/// Front-end state: everything on screen except what the session owns
pub struct App {
    pub(crate) editor: TextEditor,
    pub(crate) voice: VoiceSelector,
    pub(crate) speed: u16,
    pub(crate) pitch: u16,
    pub(crate) pitch_enabled: bool,
    pub(crate) backend: String,
    pub(crate) focus: Focus,
    pub(crate) prompt: Option<SavePrompt>,
    pub(crate) panel: WaveformPanel,
    /// Width of the text box at the last draw, for Up/Down
    pub(crate) text_width: Cell<u16>,
    keymap: HashMap<KeyChord, Action>,
    should_quit: bool,
}

impl App {
    /// Initial state from the config defaults and the session's backend
    pub fn new(config: &Config, session: &Session) -> Self {
        let keymap = create_default_keymap();
        debug!("Keymap has {} bindings", keymap.len());

        Self {
            editor: TextEditor::new(),
            voice: config.voice(),
            speed: config.speed(),
            pitch: config.pitch(),
            pitch_enabled: session.supports_pitch(),
            backend: session.synth_name().to_string(),
            focus: Focus::Text,
            prompt: None,
            panel: WaveformPanel::new(),
            text_width: Cell::new(u16::MAX),
            keymap,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn text(&self) -> &str {
        self.editor.text()
    }

    pub fn speed(&self) -> u16 {
        self.speed
    }

    pub fn pitch(&self) -> u16 {
        self.pitch
    }

    pub fn voice(&self) -> VoiceSelector {
        self.voice
    }

    pub fn is_prompting(&self) -> bool {
        self.prompt.is_some()
    }

    /// Snapshot of the inputs for one action
    pub fn request(&self) -> SpeechRequest {
        let pitch = self.pitch_enabled.then_some(self.pitch);
        SpeechRequest::new(self.editor.text(), self.voice, self.speed, pitch)
    }

    /// Main loop: pump session events, redraw, wait for input
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>, session: &mut Session) -> Result<()> {
        info!("Entering UI loop");

        while !self.should_quit() {
            session.process_events(&mut self.panel);
            terminal.draw(|frame| view::draw(frame, self, session))?;

            if event::poll(TICK)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(session, key),
                    Event::Paste(text) => {
                        if self.focus == Focus::Text && self.prompt.is_none() {
                            self.editor.insert_str(&text);
                        }
                    }
                    _ => {}
                }
            }
        }

        info!("Leaving UI loop");
        Ok(())
    }

    /// Dispatch one key press
    pub fn handle_key(&mut self, session: &mut Session, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }

        if let Some(prompt) = self.prompt.as_mut() {
            if let PromptOutcome::Done(destination) = prompt.process(&key) {
                self.prompt = None;
                if let Err(e) = session.save_as_mp3(self.request(), destination) {
                    log_rejection("Save", &e);
                }
            }
            return;
        }

        match lookup(&self.keymap, &key) {
            Some(action) => self.perform(session, action),
            None => self.edit(&key),
        }
    }

    fn perform(&mut self, session: &mut Session, action: Action) {
        let controls = session.controls();
        match action {
            Action::Play if controls.play => {
                if let Err(e) = session.play_text(self.request()) {
                    log_rejection("Play", &e);
                }
            }
            Action::Save if controls.save => {
                let request = self.request();
                if request.validate().is_err() {
                    // Reports the empty-text status without opening the prompt
                    let _ = session.save_as_mp3(request, None);
                } else {
                    self.prompt = Some(SavePrompt::new());
                }
            }
            Action::Stop if controls.stop => session.stop_playback(),
            Action::Quit => self.should_quit = true,
            Action::Paste => self.paste(session),
            Action::FocusNext => self.cycle_focus(1),
            Action::FocusPrev => self.cycle_focus(Focus::ORDER.len() - 1),
            Action::Decrease => self.adjust(false),
            Action::Increase => self.adjust(true),
            _ => debug!("{:?} ignored: control disabled", action),
        }
    }

    fn paste(&mut self, session: &mut Session) {
        if self.focus != Focus::Text {
            return;
        }
        match get_from_clipboard() {
            Ok(text) => self.editor.insert_str(&text),
            Err(e) => {
                warn!("Paste failed: {}", e);
                session.set_status(e.status_message());
            }
        }
    }

    fn cycle_focus(&mut self, step: usize) {
        let len = Focus::ORDER.len();
        let mut idx = self.focus.index();
        loop {
            idx = (idx + step) % len;
            let next = Focus::ORDER[idx];
            if next != Focus::Pitch || self.pitch_enabled {
                self.focus = next;
                break;
            }
        }
    }

    fn adjust(&mut self, up: bool) {
        match self.focus {
            Focus::Text if up => self.editor.move_right(),
            Focus::Text => self.editor.move_left(),
            Focus::Voice => {
                self.voice = if up { self.voice.next() } else { self.voice.prev() };
            }
            Focus::Speed => self.speed = step_slider(self.speed, up, MIN_SPEED, MAX_SPEED),
            Focus::Pitch => self.pitch = step_slider(self.pitch, up, MIN_PITCH, MAX_PITCH),
        }
    }

    /// Unbound keys: text editing when the text area has focus
    fn edit(&mut self, key: &KeyEvent) {
        if self.focus != Focus::Text {
            return;
        }
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.editor.insert_char(c)
            }
            KeyCode::Enter => self.editor.insert_char('\n'),
            KeyCode::Backspace => self.editor.backspace(),
            KeyCode::Delete => self.editor.delete(),
            KeyCode::Home => self.editor.move_home(),
            KeyCode::End => self.editor.move_end(),
            KeyCode::Up => self.editor.move_up(self.text_width.get()),
            KeyCode::Down => self.editor.move_down(self.text_width.get()),
            _ => {}
        }
    }
}

/// Log an action that did not start; the status line already shows why
fn log_rejection(action: &str, err: &SpeakwaveError) {
    if err.is_user_condition() {
        debug!("{} not started: {}", action, err);
    } else {
        warn!("{} not started: {}", action, err);
    }
}

/// Move a percent slider one step, staying within `min..=max`
pub fn step_slider(value: u16, up: bool, min: u16, max: u16) -> u16 {
    let next = if up {
        value.saturating_add(SLIDER_STEP)
    } else {
        value.saturating_sub(SLIDER_STEP)
    };
    next.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{Player, Transcoder};
    use crate::session::SessionSettings;
    use crate::speech::{AudioAsset, AudioFormat, Synthesizer};
    use std::path::Path;
    use std::sync::Arc;

    struct MuteSynth;

    impl Synthesizer for MuteSynth {
        fn name(&self) -> &str {
            "mute"
        }

        fn output_format(&self) -> AudioFormat {
            AudioFormat::Wav
        }

        fn supports_pitch(&self) -> bool {
            false
        }

        fn synthesize(&self, _request: &SpeechRequest, _output: &Path) -> Result<AudioAsset> {
            Err(SpeakwaveError::Synthesis("mute".to_string()))
        }
    }

    struct IdlePlayer;

    impl Player for IdlePlayer {
        fn load(&self, _path: &Path) -> Result<()> {
            Ok(())
        }

        fn play(&self) -> Result<()> {
            Ok(())
        }

        fn is_busy(&self) -> bool {
            false
        }

        fn stop(&self) -> Result<()> {
            Ok(())
        }
    }

    struct NoTranscoder;

    impl Transcoder for NoTranscoder {
        fn transcode(&self, _source: &Path, _destination: &Path, _target: AudioFormat) -> Result<()> {
            Ok(())
        }
    }

    fn app() -> (App, Session) {
        let session = Session::new(
            Arc::new(MuteSynth),
            Arc::new(NoTranscoder),
            Arc::new(IdlePlayer),
            SessionSettings {
                poll_interval: Duration::from_millis(5),
                temp_dir: std::env::temp_dir(),
            },
        );
        let app = App::new(&Config::defaults(), &session);
        (app, session)
    }

    fn press(app: &mut App, session: &mut Session, code: KeyCode) {
        app.handle_key(session, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_quit_key_ends_loop() {
        let (mut app, mut session) = app();
        assert!(!app.should_quit());
        app.handle_key(
            &mut session,
            KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit());
    }

    #[test]
    fn test_up_down_move_through_text() {
        let (mut app, mut session) = app();
        app.editor.insert_str("first line\nsecond");
        app.text_width.set(40);

        press(&mut app, &mut session, KeyCode::Up);
        assert_eq!(app.editor.cursor(), 6);
        press(&mut app, &mut session, KeyCode::Down);
        assert_eq!(app.editor.cursor(), 17);

        // Wrapped at 4 columns "second" spans two rows
        app.text_width.set(4);
        press(&mut app, &mut session, KeyCode::Up);
        assert_eq!(app.editor.cursor(), 13);
    }

    #[test]
    fn test_pitch_skipped_when_unsupported() {
        let (mut app, mut session) = app();
        assert!(!app.pitch_enabled);
        for _ in 0..3 {
            press(&mut app, &mut session, KeyCode::Tab);
        }
        assert_eq!(app.focus(), Focus::Text);
        assert_eq!(app.request().pitch(), None);
    }

    #[test]
    fn test_step_slider_clamps() {
        assert_eq!(step_slider(100, true, 50, 200), 110);
        assert_eq!(step_slider(100, false, 50, 200), 90);
        assert_eq!(step_slider(200, true, 50, 200), 200);
        assert_eq!(step_slider(55, false, 50, 200), 50);
    }

    #[test]
    fn test_focus_order() {
        assert_eq!(Focus::Text.index(), 0);
        assert_eq!(Focus::Pitch.index(), 3);
    }
}
