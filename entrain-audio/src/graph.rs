//! Signal graph for a live session
//!
//! Oscillator topology per the session mode, analysis tap feeds, and the
//! shaping chain (compressor into smoothed master gain). One graph exists
//! per running session; the output backend owns it for the session's
//! lifetime and drops it on stop.

use entrain_analysis::SharedTap;

use crate::compressor::DynamicsCompressor;
use crate::config::{Mode, SessionConfig};
use crate::osc::SineOscillator;

/// Headroom factor applied under the user volume
const MASTER_HEADROOM: f32 = 0.5;
/// Per-oscillator gain feeding the stereo merge in binaural mode
const CHANNEL_GAIN: f32 = 0.5;
/// Master gain smoothing coefficient (~100 ms ramp at 48 kHz, matches the
/// live volume ramp)
const MASTER_SMOOTH_COEFF: f32 = 0.9998;

/// Oscillator bank, one or two voices depending on mode
enum Voices {
    Pure(SineOscillator),
    Binaural {
        left: SineOscillator,
        right: SineOscillator,
    },
}

/// Live signal graph: oscillators -> taps (pre-limiter) -> compressor ->
/// master gain
pub struct ToneGraph {
    voices: Voices,
    compressor: DynamicsCompressor,
    master_gain: f32,
    smoothed_gain: f32,
    detail_tap: SharedTap,
    display_tap: SharedTap,
    /// Scratch for the per-callback tap flush
    tap_buf: Vec<f32>,
}

impl ToneGraph {
    pub fn new(
        config: &SessionConfig,
        sample_rate: u32,
        detail_tap: SharedTap,
        display_tap: SharedTap,
    ) -> Self {
        let voices = match config.mode {
            Mode::Pure => Voices::Pure(SineOscillator::new(config.carrier_hz, sample_rate)),
            Mode::Binaural => Voices::Binaural {
                left: SineOscillator::new(config.carrier_hz, sample_rate),
                right: SineOscillator::new(config.carrier_hz + config.beat_hz, sample_rate),
            },
        };

        let master_gain = config.volume * MASTER_HEADROOM;
        Self {
            voices,
            compressor: DynamicsCompressor::new(sample_rate),
            master_gain,
            smoothed_gain: master_gain,
            detail_tap,
            display_tap,
            tap_buf: Vec::with_capacity(4096),
        }
    }

    pub fn oscillator_count(&self) -> usize {
        match self.voices {
            Voices::Pure(_) => 1,
            Voices::Binaural { .. } => 2,
        }
    }

    /// Oscillator frequencies: (left/only, right)
    pub fn oscillator_frequencies(&self) -> (f32, Option<f32>) {
        match &self.voices {
            Voices::Pure(osc) => (osc.frequency_hz(), None),
            Voices::Binaural { left, right } => {
                (left.frequency_hz(), Some(right.frequency_hz()))
            }
        }
    }

    /// Retarget the master gain; the change ramps over ~100 ms
    pub fn set_volume(&mut self, volume: f32) {
        self.master_gain = volume.clamp(0.0, 1.0) * MASTER_HEADROOM;
    }

    /// Fill an interleaved stereo buffer and feed the analysis taps
    pub fn process(&mut self, out: &mut [f32]) {
        self.tap_buf.clear();

        for frame in out.chunks_exact_mut(2) {
            let (mut left, mut right, tap_in) = match &mut self.voices {
                Voices::Pure(osc) => {
                    let s = osc.next_sample();
                    (s, s, s)
                }
                Voices::Binaural { left, right } => {
                    let l = left.next_sample() * CHANNEL_GAIN;
                    let r = right.next_sample() * CHANNEL_GAIN;
                    // Taps see the stereo downmix of the merged signal
                    (l, r, (l + r) * 0.5)
                }
            };
            self.tap_buf.push(tap_in);

            // Shaping chain: compressor then smoothed master gain
            self.compressor.process_frame(&mut left, &mut right);
            self.smoothed_gain = MASTER_SMOOTH_COEFF * self.smoothed_gain
                + (1.0 - MASTER_SMOOTH_COEFF) * self.master_gain;
            frame[0] = left * self.smoothed_gain;
            frame[1] = right * self.smoothed_gain;
        }

        // One tap flush per callback; skip on contention rather than block
        if let Some(mut tap) = self.detail_tap.try_lock() {
            tap.push(&self.tap_buf);
        }
        if let Some(mut tap) = self.display_tap.try_lock() {
            tap.push(&self.tap_buf);
        }
    }
}
