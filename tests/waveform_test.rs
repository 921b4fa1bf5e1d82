//! Waveform decoding tests
//!
//! Writes small WAV fixtures with hound and checks the decoded plot data

use speakwave::audio::Waveform;
use speakwave::SpeakwaveError;
use std::fs;
use std::path::Path;

fn write_wav_i16(path: &Path, channels: u16, sample_rate: u32, samples: &[i16]) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn test_stereo_is_averaged_and_normalized() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stereo.wav");
    // Frames: (1000, 3000), (-4000, 0), (500, 500)
    write_wav_i16(&path, 2, 8000, &[1000, 3000, -4000, 0, 500, 500]);

    let wave = Waveform::from_wav_file(&path).expect("Failed to decode");

    assert_eq!(wave.sample_rate(), 8000);
    assert_eq!(wave.len(), 3);
    // Means are 2000, -2000, 500; the peak is 2000
    let expected = [1.0, -1.0, 0.25];
    for (got, want) in wave.samples().iter().zip(expected) {
        assert!((got - want).abs() < 1e-9, "{} != {}", got, want);
    }
}

#[test]
fn test_float_wav_decodes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("float.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for s in [0.0f32, 0.25, -0.5, 0.125] {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();

    let wave = Waveform::from_wav_file(&path).unwrap();
    assert_eq!(wave.len(), 4);
    assert!((wave.samples()[2] + 1.0).abs() < 1e-9);
    assert!((wave.duration_secs() - 4.0 / 16000.0).abs() < 1e-12);
}

#[test]
fn test_time_axis_matches_duration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mono.wav");
    let samples: Vec<i16> = (0..800).map(|i| ((i % 50) * 100) as i16).collect();
    write_wav_i16(&path, 1, 8000, &samples);

    let wave = Waveform::from_wav_file(&path).unwrap();
    let points = wave.points();
    assert_eq!(points.len(), 800);
    assert_eq!(points[0].0, 0.0);
    assert!((points[799].0 - 0.1).abs() < 1e-12);
    assert!(points.iter().all(|(_, y)| (-1.0..=1.0).contains(y)));
}

#[test]
fn test_silent_file_stays_silent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("silence.wav");
    write_wav_i16(&path, 1, 8000, &[0; 64]);

    let wave = Waveform::from_wav_file(&path).unwrap();
    assert!(wave.samples().iter().all(|&s| s == 0.0));
}

#[test]
fn test_invalid_file_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("text.wav");
    fs::write(&path, "not audio").unwrap();

    match Waveform::from_wav_file(&path) {
        Err(SpeakwaveError::Decode(_)) => {}
        other => panic!("Expected decode error, got {:?}", other.map(|w| w.len())),
    }
}
