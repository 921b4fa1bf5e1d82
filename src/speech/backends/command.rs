//! External command backend
//!
//! Runs any program that can write speech to a file, configured in the
//! `[command]` section. The default drives `gtts-cli`, which produces MP3.
//!
//! Argument placeholders:
//! - `{text}`: the text to speak, always passed as a single argument
//! - `{output}`: the file to write
//! - `{lang}`: the configured language code
//! - `{speed}`: speed in percent (100 = normal)
//! - `{pitch}`: pitch in percent (100 = normal)

use crate::config::Config;
use crate::speech::{AudioAsset, AudioFormat, SpeechRequest, Synthesizer};
use crate::{Result, SpeakwaveError};
use log::{debug, error};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\w+)\}").expect("valid regex"));

/// Backend that shells out to a configured synthesis program
pub struct CommandSynth {
    program: String,
    args: Vec<String>,
    format: AudioFormat,
    language: String,
}

impl CommandSynth {
    /// Create the backend from the `[command]` config section
    ///
    /// Fails when the program cannot be found on PATH.
    pub fn from_config(config: &Config) -> Result<Self> {
        let program = config.command_program();
        if find_on_path(&program).is_none() {
            return Err(SpeakwaveError::Synthesis(format!(
                "'{}' not found on PATH",
                program
            )));
        }

        Ok(Self::new(
            &program,
            &config.command_args(),
            config.command_format(),
            &config.language(),
        ))
    }

    /// Create the backend without probing for the program
    pub fn new(program: &str, args: &str, format: AudioFormat, language: &str) -> Self {
        debug!("Creating command backend: {} {}", program, args);
        Self {
            program: program.to_string(),
            args: args.split_whitespace().map(str::to_string).collect(),
            format,
            language: language.to_string(),
        }
    }

    /// Expand the argument template for one request
    fn expand_args(&self, request: &SpeechRequest, output: &Path) -> Vec<String> {
        let output = output.to_string_lossy();
        let speed = request.speed().to_string();
        let pitch = request.pitch().unwrap_or(100).to_string();

        self.args
            .iter()
            .map(|arg| {
                PLACEHOLDER
                    .replace_all(arg, |caps: &Captures| match &caps[1] {
                        "text" => request.text().to_string(),
                        "output" => output.to_string(),
                        "lang" => self.language.clone(),
                        "speed" => speed.clone(),
                        "pitch" => pitch.clone(),
                        _ => caps[0].to_string(),
                    })
                    .into_owned()
            })
            .collect()
    }
}

impl Synthesizer for CommandSynth {
    fn name(&self) -> &str {
        &self.program
    }

    fn output_format(&self) -> AudioFormat {
        self.format
    }

    fn supports_pitch(&self) -> bool {
        self.args.iter().any(|arg| arg.contains("{pitch}"))
    }

    fn synthesize(&self, request: &SpeechRequest, output: &Path) -> Result<AudioAsset> {
        let args = self.expand_args(request, output);
        debug!("Running {} with {} args", self.program, args.len());

        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                error!("Failed to run {}: {}", self.program, e);
                SpeakwaveError::Synthesis(format!("Failed to start {}: {}", self.program, e))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(SpeakwaveError::Synthesis(format!(
                "{} exited with {}: {}",
                self.program,
                result.status,
                stderr.trim()
            )));
        }

        if !output.exists() {
            return Err(SpeakwaveError::Synthesis(format!(
                "{} finished but did not write {}",
                self.program,
                output.display()
            )));
        }

        Ok(AudioAsset::new(output, self.format, request.clone()))
    }
}

/// Locate a program the way the shell would
fn find_on_path(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths).find_map(|dir| {
        let full = dir.join(program);
        if full.is_file() {
            return Some(full);
        }
        let exe = full.with_extension("exe");
        exe.is_file().then_some(exe)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::VoiceSelector;

    #[test]
    fn test_expand_args_keeps_text_whole() {
        let synth = CommandSynth::new(
            "gtts-cli",
            "--lang {lang} --output {output} {text}",
            AudioFormat::Mp3,
            "en",
        );
        let request = SpeechRequest::with_text("Hello brave world");
        let args = synth.expand_args(&request, Path::new("/tmp/x.mp3"));
        assert_eq!(
            args,
            vec!["--lang", "en", "--output", "/tmp/x.mp3", "Hello brave world"]
        );
    }

    #[test]
    fn test_speed_and_pitch_placeholders() {
        let synth = CommandSynth::new(
            "say",
            "-r {speed} -p {pitch} -o {output} {unknown}",
            AudioFormat::Wav,
            "en",
        );
        assert!(synth.supports_pitch());

        let request = SpeechRequest::new("hi", VoiceSelector::Male, 150, Some(80));
        let args = synth.expand_args(&request, Path::new("o.wav"));
        assert_eq!(args, vec!["-r", "150", "-p", "80", "-o", "o.wav", "{unknown}"]);
    }

    #[test]
    fn test_pitch_support_follows_template() {
        let synth = CommandSynth::new("gtts-cli", "--output {output} {text}", AudioFormat::Mp3, "en");
        assert!(!synth.supports_pitch());
        assert_eq!(synth.output_format(), AudioFormat::Mp3);
        assert_eq!(synth.name(), "gtts-cli");
    }

    #[test]
    fn test_missing_program_is_rejected() {
        let mut config = Config::defaults();
        config.set("command", "program", "speakwave-no-such-engine");
        assert!(CommandSynth::from_config(&config).is_err());
    }
}
