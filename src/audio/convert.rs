//! Format conversion through ffmpeg
//!
//! Used in two directions: MP3 → WAV so the waveform can be decoded, and
//! WAV → MP3 for export.

use crate::speech::AudioFormat;
use crate::{Result, SpeakwaveError};
use log::{debug, error};
use std::path::Path;
use std::process::{Command, Stdio};

/// Converts a sound file into another container/codec
pub trait Transcoder: Send + Sync {
    /// Write `source` to `destination` encoded as `target`
    fn transcode(&self, source: &Path, destination: &Path, target: AudioFormat) -> Result<()>;
}

/// Transcoder backed by the `ffmpeg` command-line tool
pub struct FfmpegTranscoder {
    /// Path to ffmpeg
    ffmpeg_path: String,

    /// MP3 bitrate, e.g. "192k"
    bitrate: String,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: &str, bitrate: &str) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.to_string(),
            bitrate: bitrate.to_string(),
        }
    }

    /// Build the ffmpeg invocation for one conversion
    fn build_command(&self, source: &Path, destination: &Path, target: AudioFormat) -> Command {
        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.arg("-y").arg("-loglevel").arg("error");
        cmd.arg("-i").arg(source);
        match target {
            AudioFormat::Mp3 => {
                cmd.arg("-codec:a").arg("libmp3lame");
                cmd.arg("-b:a").arg(&self.bitrate);
            }
            AudioFormat::Wav => {
                cmd.arg("-codec:a").arg("pcm_s16le");
            }
        }
        cmd.arg("-f").arg(target.extension());
        cmd.arg(destination);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::piped());
        cmd
    }
}

impl Transcoder for FfmpegTranscoder {
    fn transcode(&self, source: &Path, destination: &Path, target: AudioFormat) -> Result<()> {
        let mut cmd = self.build_command(source, destination, target);
        debug!("Running {:?}", cmd);

        let output = cmd.output().map_err(|e| {
            error!("Failed to run ffmpeg: {}", e);
            SpeakwaveError::Conversion(format!(
                "Failed to start {} (is ffmpeg installed?): {}",
                self.ffmpeg_path, e
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeakwaveError::Conversion(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        debug!(
            "Converted {} -> {} ({})",
            source.display(),
            destination.display(),
            target
        );
        Ok(())
    }
}
