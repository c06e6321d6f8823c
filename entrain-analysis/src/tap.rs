//! FFT analysis taps fed by the signal graph
//!
//! A tap captures the most recent window of pre-limiter samples and exposes
//! frequency-domain views of it: dB magnitudes for peak detection and a
//! byte-quantized scale for visualization.

use std::sync::Arc;

use parking_lot::Mutex;
use rustfft::{num_complex::Complex, FftPlanner};
use std::f32::consts::PI;

/// dB value mapped to byte 0
const MIN_DECIBELS: f32 = -100.0;
/// dB value mapped to byte 255
const MAX_DECIBELS: f32 = -30.0;
/// Floor for the dB view (silence / empty bins)
const DB_FLOOR: f32 = -160.0;
/// Exponential smoothing applied to linear magnitudes between snapshots
const SMOOTHING: f32 = 0.8;

/// A tap shared between the audio thread and the UI thread
pub type SharedTap = Arc<Mutex<AnalysisTap>>;

/// Create a shared tap with the given transform window size
pub fn shared_tap(fft_size: usize) -> SharedTap {
    Arc::new(Mutex::new(AnalysisTap::new(fft_size)))
}

/// One frequency-domain snapshot of a tap
///
/// Ephemeral: recomputed every visualization frame or verification tick.
#[derive(Clone, Debug, Default)]
pub struct SpectrumSample {
    /// Magnitude per bin in dB (floored at -160)
    pub db: Vec<f32>,
    /// Magnitude per bin quantized to 0-255 over the [-100, -30] dB range
    pub bytes: Vec<u8>,
}

impl SpectrumSample {
    /// Number of frequency bins (half the transform window)
    pub fn bin_count(&self) -> usize {
        self.db.len()
    }
}

/// Analysis tap with a fixed transform window
///
/// Keeps a ring of the most recent `fft_size` samples; `sample()` windows
/// them, transforms, and returns smoothed magnitudes.
pub struct AnalysisTap {
    fft_size: usize,
    fft: Arc<dyn rustfft::Fft<f32>>,
    window: Vec<f32>,
    ring: Vec<f32>,
    write_pos: usize,
    smoothed: Vec<f32>,
    /// Pre-allocated FFT buffer to avoid allocation in sample()
    fft_buffer: Vec<Complex<f32>>,
}

impl AnalysisTap {
    /// Create a tap. `fft_size` must be a power of two.
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        // Pre-compute Hann window
        let window: Vec<f32> = (0..fft_size)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / fft_size as f32).cos()))
            .collect();

        Self {
            fft_size,
            fft,
            window,
            ring: vec![0.0; fft_size],
            write_pos: 0,
            smoothed: vec![0.0; fft_size / 2],
            fft_buffer: vec![Complex::new(0.0, 0.0); fft_size],
        }
    }

    /// Transform window size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of frequency bins produced per snapshot
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Append samples from the signal graph, overwriting the oldest
    pub fn push(&mut self, samples: &[f32]) {
        for &s in samples {
            self.ring[self.write_pos] = s;
            self.write_pos = (self.write_pos + 1) % self.fft_size;
        }
    }

    /// Compute a frequency-domain snapshot of the current window
    pub fn sample(&mut self) -> SpectrumSample {
        // Unroll the ring into chronological order with windowing applied
        for i in 0..self.fft_size {
            let ring_idx = (self.write_pos + i) % self.fft_size;
            self.fft_buffer[i] = Complex::new(self.ring[ring_idx] * self.window[i], 0.0);
        }

        self.fft.process(&mut self.fft_buffer);

        // Amplitude-normalized magnitudes: a full-scale sine reads ~1.0.
        // Hann coherent gain is 0.5, hence the 4/N factor.
        let scale = 4.0 / self.fft_size as f32;
        let bins = self.bin_count();
        let mut db = Vec::with_capacity(bins);
        let mut bytes = Vec::with_capacity(bins);

        for (i, c) in self.fft_buffer.iter().take(bins).enumerate() {
            let mag = c.norm() * scale;
            let smoothed = self.smoothed[i] * SMOOTHING + mag * (1.0 - SMOOTHING);
            self.smoothed[i] = smoothed;

            let level_db = if smoothed > 0.0 {
                (20.0 * smoothed.log10()).max(DB_FLOOR)
            } else {
                DB_FLOOR
            };
            db.push(level_db);

            let t = (level_db - MIN_DECIBELS) / (MAX_DECIBELS - MIN_DECIBELS);
            bytes.push((t.clamp(0.0, 1.0) * 255.0) as u8);
        }

        SpectrumSample { db, bytes }
    }

    /// Clear captured samples and smoothing state
    pub fn reset(&mut self) {
        self.ring.fill(0.0);
        self.smoothed.fill(0.0);
        self.write_pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fill a tap with a pure sine and return one settled snapshot
    fn snapshot_of_sine(fft_size: usize, freq: f32, sample_rate: f32) -> SpectrumSample {
        let mut tap = AnalysisTap::new(fft_size);
        let samples: Vec<f32> = (0..fft_size)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate).sin())
            .collect();
        tap.push(&samples);
        // Run the smoothing filter to steady state
        let mut sample = tap.sample();
        for _ in 0..40 {
            sample = tap.sample();
        }
        sample
    }

    #[test]
    fn test_sine_peaks_at_expected_bin() {
        let fft_size = 2048;
        let sample_rate = 48000.0;
        // Pick an exact bin center so there is no spectral leakage ambiguity
        let bin = 40;
        let freq = bin as f32 * sample_rate / fft_size as f32;

        let sample = snapshot_of_sine(fft_size, freq, sample_rate);
        let max_bin = sample
            .db
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();

        assert_eq!(max_bin, bin);
    }

    #[test]
    fn test_byte_scale_saturates_on_loud_bin() {
        let sample = snapshot_of_sine(2048, 937.5, 48000.0);
        let max_byte = sample.bytes.iter().copied().max().unwrap();
        // A full-scale sine sits far above -30 dB
        assert_eq!(max_byte, 255);
    }

    #[test]
    fn test_silence_reads_as_floor() {
        let mut tap = AnalysisTap::new(1024);
        let sample = tap.sample();
        assert!(sample.db.iter().all(|&d| d <= MIN_DECIBELS));
        assert!(sample.bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_bin_count_is_half_window() {
        let mut tap = AnalysisTap::new(4096);
        assert_eq!(tap.bin_count(), 2048);
        assert_eq!(tap.sample().bin_count(), 2048);
    }
}
