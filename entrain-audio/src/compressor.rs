//! Dynamics compressor for the output shaping chain
//!
//! Fixed-parameter soft-knee compressor: -12 dB threshold, 10 dB knee,
//! 8:1 ratio, with a peak envelope follower. Sits between the oscillators
//! and the master gain to keep the summed tones from clipping.

/// Threshold in dBFS
const THRESHOLD_DB: f32 = -12.0;
/// Knee width in dB
const KNEE_DB: f32 = 10.0;
/// Compression ratio above the knee
const RATIO: f32 = 8.0;
/// Envelope attack time in ms
const ATTACK_MS: f32 = 3.0;
/// Envelope release time in ms
const RELEASE_MS: f32 = 250.0;

/// Soft-knee dynamics compressor over interleaved stereo frames
pub struct DynamicsCompressor {
    attack_coeff: f32,
    release_coeff: f32,
    envelope: f32,
    current_gr_db: f32,
}

impl DynamicsCompressor {
    pub fn new(sample_rate: u32) -> Self {
        let sr = sample_rate as f32;
        Self {
            attack_coeff: (-1.0 / (sr * ATTACK_MS / 1000.0)).exp(),
            release_coeff: (-1.0 / (sr * RELEASE_MS / 1000.0)).exp(),
            envelope: 0.0,
            current_gr_db: 0.0,
        }
    }

    /// Current gain reduction in dB (for metering)
    pub fn gain_reduction_db(&self) -> f32 {
        self.current_gr_db
    }

    /// Gain in dB for a detector level in dB, soft knee around the threshold
    fn gain_for_level_db(level_db: f32) -> f32 {
        let over = level_db - THRESHOLD_DB;
        let half_knee = KNEE_DB / 2.0;

        if over <= -half_knee {
            0.0
        } else if over < half_knee {
            // Quadratic interpolation through the knee region
            let t = over + half_knee;
            -(t * t) / (2.0 * KNEE_DB) * (1.0 - 1.0 / RATIO)
        } else {
            -over * (1.0 - 1.0 / RATIO)
        }
    }

    /// Process one stereo frame in place
    #[inline]
    pub fn process_frame(&mut self, left: &mut f32, right: &mut f32) {
        let peak = left.abs().max(right.abs());

        // Peak envelope follower
        let coeff = if peak > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = coeff * self.envelope + (1.0 - coeff) * peak;

        let level_db = 20.0 * self.envelope.max(1e-6).log10();
        let gain_db = Self::gain_for_level_db(level_db);
        self.current_gr_db = -gain_db;

        let gain = 10.0f32.powf(gain_db / 20.0);
        *left *= gain;
        *right *= gain;
    }

    pub fn reset(&mut self) {
        self.envelope = 0.0;
        self.current_gr_db = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_sine(comp: &mut DynamicsCompressor, amplitude: f32, frames: usize) -> f32 {
        let mut peak_out: f32 = 0.0;
        for i in 0..frames {
            let s = amplitude * (i as f32 * 0.05).sin();
            let mut l = s;
            let mut r = s;
            comp.process_frame(&mut l, &mut r);
            // Measure after the envelope settles
            if i > frames / 2 {
                peak_out = peak_out.max(l.abs());
            }
        }
        peak_out
    }

    #[test]
    fn test_quiet_signal_passes_through() {
        let mut comp = DynamicsCompressor::new(48000);
        // -12 dB threshold with a 10 dB knee: knee opens near -17 dB.
        // 0.05 is about -26 dB, well below it.
        let peak = run_sine(&mut comp, 0.05, 48000);
        assert!((peak - 0.05).abs() < 0.002, "peak {peak}");
    }

    #[test]
    fn test_loud_signal_is_reduced() {
        let mut comp = DynamicsCompressor::new(48000);
        let peak = run_sine(&mut comp, 1.0, 48000);
        assert!(peak < 0.6, "expected gain reduction, peak {peak}");
        assert!(comp.gain_reduction_db() > 3.0);
    }

    #[test]
    fn test_gain_curve_is_monotonic() {
        let mut prev = f32::INFINITY;
        for level in [-40.0, -20.0, -17.0, -12.0, -8.0, -3.0, 0.0] {
            let g = DynamicsCompressor::gain_for_level_db(level);
            assert!(g <= 0.0);
            assert!(g <= prev + 1e-6);
            prev = g;
        }
    }
}
