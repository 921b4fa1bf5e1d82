//! Configuration management

use crate::speech::{AudioFormat, VoiceSelector};
use crate::{Result, SpeakwaveError};
use ini::Ini;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which synthesis backend to create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendChoice {
    /// Probe the platform and take the first backend that works
    Auto,
    /// espeak-ng writing WAV files
    Espeak,
    /// Windows SAPI through PowerShell
    Sapi,
    /// User-configured external command
    Command,
}

impl BackendChoice {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(BackendChoice::Auto),
            "espeak" | "espeak-ng" => Some(BackendChoice::Espeak),
            "sapi" | "windows" => Some(BackendChoice::Sapi),
            "command" => Some(BackendChoice::Command),
            _ => None,
        }
    }
}

/// Application configuration
///
/// Read from `~/.speakwave.cfg`. The file is optional: every getter falls
/// back to the built-in default when a key is missing or unparsable.
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path
    path: PathBuf,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from an explicit path
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(&path)
                .map_err(|e| SpeakwaveError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, using defaults");
            Self::default_config()
        };

        Ok(Self { ini, path })
    }

    /// Configuration built purely from defaults
    pub fn defaults() -> Self {
        Self {
            ini: Self::default_config(),
            path: Self::config_path(),
        }
    }

    /// Parse configuration from INI text
    pub fn parse_str(contents: &str) -> Result<Self> {
        let ini = Ini::load_from_str(contents)
            .map_err(|e| SpeakwaveError::IniParse(format!("Failed to parse config: {}", e)))?;
        Ok(Self {
            ini,
            path: Self::config_path(),
        })
    }

    /// Get config file path (~/.speakwave.cfg)
    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".speakwave.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create default configuration
    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("speech"))
            .set("backend", "auto")
            .set("voice", "Female")
            .set("speed", "100")
            .set("pitch", "100")
            .set("language", "en");

        ini.with_section(Some("command"))
            .set("program", "gtts-cli")
            .set("args", "--lang {lang} --output {output} {text}")
            .set("format", "mp3");

        ini.with_section(Some("export"))
            .set("ffmpeg", "ffmpeg")
            .set("bitrate", "192k");

        ini.with_section(Some("playback"))
            .set("poll_interval_ms", "100");

        ini
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
            .to_string()
    }

    /// Get an integer value from config
    pub fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    /// Requested synthesis backend
    pub fn backend(&self) -> BackendChoice {
        BackendChoice::parse(&self.get_string("speech", "backend", "auto"))
            .unwrap_or(BackendChoice::Auto)
    }

    /// Initial voice selection
    pub fn voice(&self) -> VoiceSelector {
        self.get_string("speech", "voice", "Female")
            .parse()
            .unwrap_or_default()
    }

    /// Initial speed in percent (50-200)
    pub fn speed(&self) -> u16 {
        self.get_int("speech", "speed", 100).clamp(50, 200) as u16
    }

    /// Initial pitch in percent (50-200)
    pub fn pitch(&self) -> u16 {
        self.get_int("speech", "pitch", 100).clamp(50, 200) as u16
    }

    /// Language code handed to engines that take one
    pub fn language(&self) -> String {
        self.get_string("speech", "language", "en")
    }

    /// Program run by the command backend
    pub fn command_program(&self) -> String {
        self.get_string("command", "program", "gtts-cli")
    }

    /// Argument template for the command backend
    pub fn command_args(&self) -> String {
        self.get_string("command", "args", "--lang {lang} --output {output} {text}")
    }

    /// File format the command backend writes
    pub fn command_format(&self) -> AudioFormat {
        AudioFormat::from_extension(&self.get_string("command", "format", "mp3"))
            .unwrap_or(AudioFormat::Mp3)
    }

    /// ffmpeg executable used for conversions
    pub fn ffmpeg(&self) -> String {
        self.get_string("export", "ffmpeg", "ffmpeg")
    }

    /// MP3 export bitrate as passed to ffmpeg
    pub fn bitrate(&self) -> String {
        self.get_string("export", "bitrate", "192k")
    }

    /// How often the playback task checks whether audio is still playing
    pub fn poll_interval(&self) -> Duration {
        let ms = self.get_int("playback", "poll_interval_ms", 100).clamp(10, 1000);
        Duration::from_millis(ms as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::defaults();
        assert_eq!(config.backend(), BackendChoice::Auto);
        assert_eq!(config.voice(), VoiceSelector::Female);
        assert_eq!(config.speed(), 100);
        assert_eq!(config.pitch(), 100);
        assert_eq!(config.bitrate(), "192k");
        assert_eq!(config.command_format(), AudioFormat::Mp3);
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_values_are_clamped() {
        let config = Config::parse_str("[speech]\nspeed = 500\npitch = 10\n").unwrap();
        assert_eq!(config.speed(), 200);
        assert_eq!(config.pitch(), 50);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config =
            Config::parse_str("[speech]\nbackend = festival\nvoice = Alien\nspeed = fast\n").unwrap();
        assert_eq!(config.backend(), BackendChoice::Auto);
        assert_eq!(config.voice(), VoiceSelector::Female);
        assert_eq!(config.speed(), 100);
    }

    #[test]
    fn test_backend_aliases() {
        assert_eq!(BackendChoice::parse("espeak-ng"), Some(BackendChoice::Espeak));
        assert_eq!(BackendChoice::parse(" SAPI "), Some(BackendChoice::Sapi));
        assert_eq!(BackendChoice::parse("command"), Some(BackendChoice::Command));
        assert_eq!(BackendChoice::parse("nope"), None);
    }

    #[test]
    fn test_set_overrides() {
        let mut config = Config::defaults();
        config.set("export", "bitrate", "128k");
        assert_eq!(config.bitrate(), "128k");
    }
}
