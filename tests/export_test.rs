//! MP3 export through a real ffmpeg
//!
//! ffmpeg is probed first; the tests print a notice and pass when it is not
//! installed or was built without the MP3 encoder.

use speakwave::audio::{FfmpegTranscoder, Transcoder, Waveform};
use speakwave::platform::find_program;
use speakwave::speech::AudioFormat;
use speakwave::SpeakwaveError;
use std::fs;
use std::path::Path;

const SAMPLE_RATE: u32 = 22050;

fn write_tone(path: &Path, secs: f64) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    let samples = (secs * SAMPLE_RATE as f64) as usize;
    for i in 0..samples {
        let t = i as f64 / SAMPLE_RATE as f64;
        let s = (t * 440.0 * std::f64::consts::TAU).sin() * 16000.0;
        writer.write_sample(s as i16).unwrap();
    }
    writer.finalize().unwrap();
}

/// ID3v2 tag or a bare MPEG audio frame sync
fn looks_like_mp3(bytes: &[u8]) -> bool {
    bytes.starts_with(b"ID3") || (bytes.len() > 1 && bytes[0] == 0xFF && bytes[1] & 0xE0 == 0xE0)
}

#[test]
fn test_wav_exported_as_mp3_and_read_back() {
    let Some(ffmpeg) = find_program(&["ffmpeg"], &["-version"]) else {
        println!("⚠ Skipping MP3 export test (ffmpeg not installed)");
        return;
    };
    let transcoder = FfmpegTranscoder::new(&ffmpeg, "128k");

    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("speech.wav");
    let mp3 = dir.path().join("speech.mp3");
    let back = dir.path().join("decoded.wav");
    write_tone(&wav, 0.5);

    match transcoder.transcode(&wav, &mp3, AudioFormat::Mp3) {
        Ok(()) => {}
        Err(SpeakwaveError::Conversion(msg)) if msg.contains("libmp3lame") => {
            println!("⚠ Skipping MP3 export test (ffmpeg lacks libmp3lame): {}", msg);
            return;
        }
        Err(e) => panic!("MP3 export failed: {}", e),
    }

    let bytes = fs::read(&mp3).unwrap();
    assert!(!bytes.is_empty());
    assert!(looks_like_mp3(&bytes), "Not an MP3 header: {:02x?}", &bytes[..bytes.len().min(4)]);

    transcoder
        .transcode(&mp3, &back, AudioFormat::Wav)
        .expect("MP3 should decode back to WAV");
    let wave = Waveform::from_wav_file(&back).expect("ffmpeg wrote bad WAV");
    assert!(!wave.is_empty());
    assert_eq!(wave.sample_rate(), SAMPLE_RATE);
    assert!(wave.duration_secs() > 0.3);
    println!("✓ ffmpeg round trip produced {} samples", wave.len());
}

#[test]
fn test_missing_ffmpeg_reports_conversion_error() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("speech.wav");
    write_tone(&wav, 0.1);

    let transcoder = FfmpegTranscoder::new("speakwave-no-such-ffmpeg", "192k");
    let dest = dir.path().join("speech.mp3");
    match transcoder.transcode(&wav, &dest, AudioFormat::Mp3) {
        Err(SpeakwaveError::Conversion(msg)) => assert!(msg.contains("is ffmpeg installed?")),
        other => panic!("expected a conversion error, got {:?}", other),
    }
    assert!(!dest.exists());
}

#[test]
fn test_mp3_header_check() {
    assert!(looks_like_mp3(b"ID3\x04\x00"));
    assert!(looks_like_mp3(&[0xFF, 0xFB, 0x90, 0x64]));
    assert!(!looks_like_mp3(b"RIFF"));
    assert!(!looks_like_mp3(&[0xFF]));
}
