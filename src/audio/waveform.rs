//! Waveform extraction for the plot
//!
//! Decodes a WAV file, folds all channels into one and scales the result so
//! the loudest sample sits at ±1.

use crate::Result;
use hound::{SampleFormat, WavReader};
use log::debug;
use std::path::Path;

/// Guard added to the peak so silent input does not divide by zero
pub const NORMALIZE_EPSILON: f64 = 1e-10;

/// Normalized mono samples ready for plotting
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    sample_rate: u32,
    samples: Vec<f64>,
}

impl Waveform {
    /// Decode a WAV file into a normalized mono waveform
    pub fn from_wav_file(path: &Path) -> Result<Self> {
        let reader = WavReader::open(path)?;
        let spec = reader.spec();
        debug!(
            "Decoding {}: {} Hz, {} channel(s), {} bit {:?}",
            path.display(),
            spec.sample_rate,
            spec.channels,
            spec.bits_per_sample,
            spec.sample_format
        );

        let raw: Vec<f64> = match spec.sample_format {
            SampleFormat::Float => reader
                .into_samples::<f32>()
                .map(|s| s.map(f64::from))
                .collect::<std::result::Result<_, _>>()?,
            SampleFormat::Int => reader
                .into_samples::<i32>()
                .map(|s| s.map(f64::from))
                .collect::<std::result::Result<_, _>>()?,
        };

        Ok(Self::from_interleaved(spec.sample_rate, spec.channels, &raw))
    }

    /// Build a waveform from interleaved samples of any scale
    pub fn from_interleaved(sample_rate: u32, channels: u16, interleaved: &[f64]) -> Self {
        let mono = mix_to_mono(interleaved, channels);
        Self {
            sample_rate,
            samples: normalize(&mono),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Normalized samples in [-1, 1]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length of the audio in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// (time in seconds, amplitude) for every sample
    pub fn points(&self) -> Vec<(f64, f64)> {
        time_axis(self.samples.len(), self.sample_rate)
            .into_iter()
            .zip(self.samples.iter().copied())
            .collect()
    }

    /// Down-sample to at most `2 * buckets` points keeping each bucket's extremes
    ///
    /// A terminal chart is a few hundred cells wide; plotting every sample
    /// of a few seconds of speech would be wasted work.
    pub fn envelope(&self, buckets: usize) -> Vec<(f64, f64)> {
        if buckets == 0 || self.samples.len() <= buckets * 2 {
            return self.points();
        }

        let times = time_axis(self.samples.len(), self.sample_rate);
        let chunk = self.samples.len().div_ceil(buckets);
        let mut points = Vec::with_capacity(buckets * 2);

        for (i, window) in self.samples.chunks(chunk).enumerate() {
            let start = i * chunk;
            let (mut min_idx, mut max_idx) = (0, 0);
            for (j, &s) in window.iter().enumerate() {
                if s < window[min_idx] {
                    min_idx = j;
                }
                if s > window[max_idx] {
                    max_idx = j;
                }
            }
            // Keep the two extremes in the order they occur
            let (first, second) = if min_idx <= max_idx {
                (min_idx, max_idx)
            } else {
                (max_idx, min_idx)
            };
            points.push((times[start + first], window[first]));
            points.push((times[start + second], window[second]));
        }

        points
    }
}

/// Collapse interleaved frames to one channel by averaging
///
/// A trailing partial frame is dropped.
pub fn mix_to_mono(interleaved: &[f64], channels: u16) -> Vec<f64> {
    let channels = channels.max(1) as usize;
    if channels == 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f64>() / channels as f64)
        .collect()
}

/// Divide every sample by the peak magnitude (plus a small epsilon)
pub fn normalize(samples: &[f64]) -> Vec<f64> {
    let peak = samples.iter().fold(0.0_f64, |acc, s| acc.max(s.abs()));
    let scale = peak + NORMALIZE_EPSILON;
    samples.iter().map(|s| s / scale).collect()
}

/// `len` evenly spaced instants from 0 to `len / sample_rate` seconds inclusive
pub fn time_axis(len: usize, sample_rate: u32) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let end = if sample_rate == 0 {
                0.0
            } else {
                len as f64 / sample_rate as f64
            };
            let step = end / (len - 1) as f64;
            (0..len).map(|i| i as f64 * step).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix_to_mono_averages_channels() {
        let stereo = [1.0, 3.0, -2.0, 2.0, 5.0, 7.0];
        assert_eq!(mix_to_mono(&stereo, 2), vec![2.0, 0.0, 6.0]);

        let three = [3.0, 6.0, 9.0, 0.0, 0.0, 3.0, 1.0];
        assert_eq!(mix_to_mono(&three, 3), vec![6.0, 1.0]);
    }

    #[test]
    fn test_mix_to_mono_single_channel_is_identity() {
        assert_eq!(mix_to_mono(&[0.5, -0.5], 1), vec![0.5, -0.5]);
        assert_eq!(mix_to_mono(&[0.5, -0.5], 0), vec![0.5, -0.5]);
    }

    #[test]
    fn test_normalize_reaches_unit_peak() {
        let out = normalize(&[100.0, -20000.0, 5000.0]);
        assert!(out.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!((out[1] + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_silence_is_zero() {
        assert_eq!(normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn test_time_axis_spans_duration() {
        let axis = time_axis(5, 4);
        assert_eq!(axis.len(), 5);
        assert_eq!(axis[0], 0.0);
        assert!((axis[4] - 1.25).abs() < 1e-12);
        assert!(time_axis(0, 8000).is_empty());
        assert_eq!(time_axis(1, 8000), vec![0.0]);
    }

    #[test]
    fn test_envelope_keeps_extremes() {
        let samples: Vec<f64> = (0..1000).map(|i| ((i as f64) / 10.0).sin()).collect();
        let wave = Waveform::from_interleaved(1000, 1, &samples);
        let env = wave.envelope(50);
        assert!(env.len() <= 100);

        let max = env.iter().map(|p| p.1).fold(f64::MIN, f64::max);
        let min = env.iter().map(|p| p.1).fold(f64::MAX, f64::min);
        let true_max = wave.samples().iter().copied().fold(f64::MIN, f64::max);
        let true_min = wave.samples().iter().copied().fold(f64::MAX, f64::min);
        assert_eq!(max, true_max);
        assert_eq!(min, true_min);
        assert!(env.windows(2).all(|w| w[0].0 <= w[1].0));
    }

    #[test]
    fn test_short_envelope_returns_all_points() {
        let wave = Waveform::from_interleaved(8000, 1, &[0.1, 0.2, 0.3]);
        assert_eq!(wave.envelope(10).len(), 3);
        assert!((wave.duration_secs() - 3.0 / 8000.0).abs() < 1e-12);
    }
}
