//! Speech session orchestration
//!
//! The `Session` lives on the UI thread. Play and save actions each run on
//! one short-lived background thread which reports back through a channel
//! of `SessionEvent`s; the UI drains that channel with `process_events`.
//! Only one action may be in flight at a time.

pub mod events;
pub mod state;
pub mod temp_files;

pub use events::SessionEvent;
pub use state::{Controls, PlaybackCell, PlaybackState};
pub use temp_files::TempFileRegistry;

use crate::audio::{FfmpegTranscoder, Player, RodioPlayer, Transcoder, Waveform};
use crate::config::Config;
use crate::speech::{create_synth, AudioFormat, SpeechRequest, Synthesizer};
use crate::{Result, SpeakwaveError};
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub const STATUS_READY: &str = "Ready";
pub const STATUS_PROCESSING: &str = "Processing...";
pub const STATUS_SAVING: &str = "Processing and saving...";
pub const STATUS_PLAYING: &str = "Playing...";
pub const STATUS_STOPPED: &str = "Stopped";

/// Receives waveforms to draw
pub trait Visualizer {
    /// Replace the current plot with `waveform`
    fn render(&mut self, waveform: &Waveform);
}

/// Tunables for a session
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Interval between playback busy checks
    pub poll_interval: Duration,
    /// Directory for temporary audio files
    pub temp_dir: PathBuf,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            ..Self::default()
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            temp_dir: std::env::temp_dir(),
        }
    }
}

/// State shared between the UI thread and background tasks
struct Shared {
    synth: Arc<dyn Synthesizer>,
    transcoder: Arc<dyn Transcoder>,
    player: Arc<dyn Player>,
    playback: PlaybackCell,
    in_flight: AtomicBool,
    temp_files: TempFileRegistry,
    poll_interval: Duration,
    events: Sender<SessionEvent>,
    /// Wakes the play task's busy poll when playback is stopped
    stop_tx: Sender<()>,
    stop_rx: Receiver<()>,
}

impl Shared {
    fn emit(&self, event: SessionEvent) {
        // The receiver only disappears when the session is gone
        let _ = self.events.send(event);
    }

    /// Ask a running play task to finish now instead of at its next poll
    fn signal_stop(&self) {
        // A full slot already carries a pending stop
        let _ = self.stop_tx.try_send(());
    }

    fn set_playback(&self, state: PlaybackState) {
        self.playback.set(state);
        self.emit(SessionEvent::PlaybackState(state));
    }

    /// Path to a WAV rendition of `path`, converting when needed
    fn decodable(&self, path: &Path, format: AudioFormat) -> Result<PathBuf> {
        if format == AudioFormat::Wav {
            return Ok(path.to_path_buf());
        }
        let wav = self.temp_files.create(AudioFormat::Wav)?;
        self.transcoder.transcode(path, &wav, AudioFormat::Wav)?;
        Ok(wav)
    }

    /// Decode and publish a waveform; failures are only logged
    fn publish_waveform(&self, path: &Path) {
        match Waveform::from_wav_file(path) {
            Ok(waveform) => self.emit(SessionEvent::Waveform(waveform)),
            Err(e) => warn!("Error displaying waveform: {}", e),
        }
    }

    fn run_play(&self, request: &SpeechRequest) -> Result<()> {
        // Drop a stop aimed at the previous task
        while self.stop_rx.try_recv().is_ok() {}

        let output = self.temp_files.create(self.synth.output_format())?;
        let asset = self.synth.synthesize(request, &output)?;
        info!("Synthesized {} ({})", asset.path.display(), asset.format);

        let wav = self.decodable(&asset.path, asset.format)?;
        self.publish_waveform(&wav);

        self.player.load(&asset.path)?;
        self.player.play()?;

        self.set_playback(PlaybackState::Playing);
        self.emit(SessionEvent::PlaybackStarted);

        while self.player.is_busy() && self.playback.get() == PlaybackState::Playing {
            match self.stop_rx.recv_timeout(self.poll_interval) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
        }

        if self
            .playback
            .transition(PlaybackState::Playing, PlaybackState::Idle)
        {
            debug!("Playback finished");
            self.emit(SessionEvent::PlaybackState(PlaybackState::Idle));
            self.emit(SessionEvent::PlaybackFinished { stopped: false });
        } else {
            debug!("Playback stopped by user");
            self.emit(SessionEvent::PlaybackFinished { stopped: true });
        }
        Ok(())
    }

    fn run_save(&self, request: &SpeechRequest, destination: &Path) -> Result<()> {
        if self.synth.output_format() == AudioFormat::Mp3 {
            self.synth.synthesize(request, destination)?;
            return Ok(());
        }

        let output = self.temp_files.create(self.synth.output_format())?;
        let asset = self.synth.synthesize(request, &output)?;

        // An undecodable intermediate aborts the export
        let waveform = Waveform::from_wav_file(&asset.path)?;
        debug!(
            "WAV file is valid. Sample rate: {}, samples: {}",
            waveform.sample_rate(),
            waveform.len()
        );

        self.transcoder
            .transcode(&asset.path, destination, AudioFormat::Mp3)?;
        self.emit(SessionEvent::Waveform(waveform));
        Ok(())
    }
}

/// Clears the in-flight flag when a task ends, even by panic
struct InFlightGuard(Arc<Shared>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.in_flight.store(false, Ordering::SeqCst);
    }
}

/// Speech session orchestrator
pub struct Session {
    shared: Arc<Shared>,
    events: Receiver<SessionEvent>,
    controls: Controls,
    status: String,
}

impl Session {
    /// Create a session around the given collaborators
    pub fn new(
        synth: Arc<dyn Synthesizer>,
        transcoder: Arc<dyn Transcoder>,
        player: Arc<dyn Player>,
        settings: SessionSettings,
    ) -> Self {
        let (tx, rx) = unbounded();
        let (stop_tx, stop_rx) = bounded(1);
        info!("Session using {} synthesis", synth.name());

        Self {
            shared: Arc::new(Shared {
                synth,
                transcoder,
                player,
                playback: PlaybackCell::default(),
                in_flight: AtomicBool::new(false),
                temp_files: TempFileRegistry::new(settings.temp_dir),
                poll_interval: settings.poll_interval,
                events: tx,
                stop_tx,
                stop_rx,
            }),
            events: rx,
            controls: Controls::ready(),
            status: STATUS_READY.to_string(),
        }
    }

    /// Create a session with the configured backend, ffmpeg and the default audio device
    pub fn from_config(config: &Config) -> Result<Self> {
        let synth = create_synth(config)?;
        let transcoder = Arc::new(FfmpegTranscoder::new(&config.ffmpeg(), &config.bitrate()));
        let player = Arc::new(RodioPlayer::new()?);
        Ok(Self::new(
            synth,
            transcoder,
            player,
            SessionSettings::from_config(config),
        ))
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Override the status line, e.g. for front-end notices
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.shared.playback.get()
    }

    /// True while a play or save task is running
    pub fn is_running(&self) -> bool {
        self.shared.in_flight.load(Ordering::SeqCst)
    }

    pub fn synth_name(&self) -> &str {
        self.shared.synth.name()
    }

    /// Whether the active backend honours the pitch control
    pub fn supports_pitch(&self) -> bool {
        self.shared.synth.supports_pitch()
    }

    pub fn temp_files(&self) -> Vec<PathBuf> {
        self.shared.temp_files.paths()
    }

    fn reject(&mut self, err: SpeakwaveError) -> Result<()> {
        self.status = err.status_message();
        Err(err)
    }

    fn try_claim(&self) -> bool {
        self.shared
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Wait for a play task that was just stopped to release the slot
    ///
    /// The stop signal wakes the task at once, so this normally takes far
    /// less than one poll interval.
    fn claim_after_stop(&self) -> bool {
        if self.playback_state() != PlaybackState::Stopped {
            return false;
        }
        let deadline = Instant::now() + self.shared.poll_interval;
        while Instant::now() < deadline {
            if self.try_claim() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        self.try_claim()
    }

    /// Claim the single in-flight slot
    fn begin(&mut self) -> Result<InFlightGuard> {
        if !self.try_claim() && !self.claim_after_stop() {
            self.status = SpeakwaveError::Busy.status_message();
            return Err(SpeakwaveError::Busy);
        }
        Ok(InFlightGuard(Arc::clone(&self.shared)))
    }

    fn spawn<F>(&mut self, name: &str, guard: InFlightGuard, task: F) -> Result<()>
    where
        F: FnOnce(&Shared) + Send + 'static,
    {
        let result = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let guard = guard;
                task(&*guard.0);
            });

        if let Err(e) = result {
            error!("Failed to spawn {}: {}", name, e);
            self.controls = Controls::ready();
            return self.reject(SpeakwaveError::Io(e));
        }
        Ok(())
    }

    /// Synthesize and play `request` in the background
    pub fn play_text(&mut self, request: SpeechRequest) -> Result<()> {
        if let Err(e) = request.validate() {
            return self.reject(e);
        }
        let guard = self.begin()?;

        let request = if self.supports_pitch() {
            request
        } else {
            request.without_pitch()
        };

        debug!("Play requested: {} chars", request.text().len());
        self.controls = Controls::working();
        self.status = STATUS_PROCESSING.to_string();

        self.spawn("speakwave-play", guard, move |shared| {
            if let Err(e) = shared.run_play(&request) {
                error!("Play failed: {}", e);
                shared.emit(SessionEvent::Failed(e.status_message()));
            }
        })
    }

    /// Halt playback and re-arm the play/save controls
    ///
    /// Harmless when nothing is playing.
    pub fn stop_playback(&mut self) {
        let was_playing = self
            .shared
            .playback
            .transition(PlaybackState::Playing, PlaybackState::Stopped);

        if was_playing {
            self.shared.signal_stop();
        }
        if let Err(e) = self.shared.player.stop() {
            warn!("Player stop failed: {}", e);
        }

        self.controls = Controls::ready();
        if was_playing {
            debug!("Playback stopped");
            self.status = STATUS_STOPPED.to_string();
        }
    }

    /// Synthesize `request` and export it as MP3 to `destination`
    ///
    /// `None` means the user dismissed the file prompt.
    pub fn save_as_mp3(
        &mut self,
        request: SpeechRequest,
        destination: Option<PathBuf>,
    ) -> Result<()> {
        if let Err(e) = request.validate() {
            return self.reject(e);
        }
        let Some(destination) = destination else {
            return self.reject(SpeakwaveError::SaveCancelled);
        };
        let guard = self.begin()?;

        let destination = with_mp3_extension(destination);
        let request = if self.supports_pitch() {
            request
        } else {
            request.without_pitch()
        };

        debug!("Save requested: {}", destination.display());
        self.controls = Controls::working();
        self.status = STATUS_SAVING.to_string();

        self.spawn("speakwave-save", guard, move |shared| {
            match shared.run_save(&request, &destination) {
                Ok(()) => {
                    info!("Saved {}", destination.display());
                    shared.emit(SessionEvent::Saved(destination));
                }
                Err(SpeakwaveError::Decode(msg)) => {
                    error!("Intermediate WAV is invalid: {}", msg);
                    shared.emit(SessionEvent::Failed(format!("Invalid WAV file: {}", msg)));
                }
                Err(e) => {
                    error!("Save failed: {}", e);
                    shared.emit(SessionEvent::Failed(format!("Error saving file: {}", e)));
                }
            }
        })
    }

    /// Decode `path` and hand it to the visualizer right away
    ///
    /// Decode failures are logged and leave the previous plot in place.
    pub fn display_waveform(&self, path: &Path, visualizer: &mut dyn Visualizer) -> bool {
        match Waveform::from_wav_file(path) {
            Ok(waveform) => {
                visualizer.render(&waveform);
                true
            }
            Err(e) => {
                warn!("Error displaying waveform: {}", e);
                false
            }
        }
    }

    /// Apply every event the background tasks have sent so far
    ///
    /// Never blocks. Returns the applied events in arrival order.
    pub fn process_events(&mut self, visualizer: &mut dyn Visualizer) -> Vec<SessionEvent> {
        let mut applied = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            self.apply(&event, visualizer);
            applied.push(event);
        }
        applied
    }

    fn apply(&mut self, event: &SessionEvent, visualizer: &mut dyn Visualizer) {
        match event {
            SessionEvent::Waveform(waveform) => visualizer.render(waveform),
            SessionEvent::PlaybackState(state) => debug!("Playback state: {}", state),
            SessionEvent::PlaybackStarted => {
                self.controls = Controls::playing();
                self.status = STATUS_PLAYING.to_string();
            }
            // stop_playback already re-armed the controls; a new action may own them now
            SessionEvent::PlaybackFinished { stopped: true } => {}
            SessionEvent::PlaybackFinished { stopped: false } => {
                self.controls = Controls::ready();
                self.status = STATUS_READY.to_string();
            }
            SessionEvent::Saved(path) => {
                self.controls = Controls::ready();
                self.status = format!("Saved to {}", path.display());
            }
            SessionEvent::Failed(message) => {
                self.controls = Controls::ready();
                self.status = message.clone();
            }
        }
    }

    /// Stop playback and delete every temp file
    ///
    /// Returns how many temp paths were attempted.
    pub fn shutdown(&mut self) -> usize {
        info!("Shutting down session");
        if self
            .shared
            .playback
            .transition(PlaybackState::Playing, PlaybackState::Stopped)
        {
            self.shared.signal_stop();
        }
        if let Err(e) = self.shared.player.stop() {
            warn!("Player stop failed: {}", e);
        }
        self.shared.temp_files.cleanup()
    }
}

/// Append `.mp3` when the chosen path has no extension
pub fn with_mp3_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(AudioFormat::Mp3.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_mp3_extension() {
        assert_eq!(
            with_mp3_extension(PathBuf::from("out/speech")),
            PathBuf::from("out/speech.mp3")
        );
        assert_eq!(
            with_mp3_extension(PathBuf::from("speech.wav")),
            PathBuf::from("speech.wav")
        );
    }
}
