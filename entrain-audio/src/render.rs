//! Offline session rendering
//!
//! Renders the session's oscillator topology to a fixed-length buffer
//! without touching the live output path: same voices, a single
//! volume * 0.5 gain, no dynamics stage.

use crate::config::{InvalidConfig, Mode, SessionConfig};
use crate::osc::SineOscillator;

/// Export renders always use this rate, independent of the output device
pub const EXPORT_SAMPLE_RATE: u32 = 48000;
/// Export renders are always stereo
pub const EXPORT_CHANNELS: u16 = 2;

/// Headroom factor applied under the user volume, matching the live graph
const MASTER_HEADROOM: f32 = 0.5;

/// A completed offline render
pub struct RenderedAudio {
    /// Interleaved samples, channels within a frame
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl RenderedAudio {
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels as usize
    }
}

/// Render a full session to an interleaved stereo buffer
pub fn render_session(config: &SessionConfig) -> Result<RenderedAudio, InvalidConfig> {
    config.validate()?;

    let frames = config.duration_secs as usize * EXPORT_SAMPLE_RATE as usize;
    let gain = config.volume * MASTER_HEADROOM;
    let mut samples = Vec::with_capacity(frames * EXPORT_CHANNELS as usize);

    match config.mode {
        Mode::Pure => {
            let mut osc = SineOscillator::new(config.carrier_hz, EXPORT_SAMPLE_RATE);
            for _ in 0..frames {
                let s = osc.next_sample() * gain;
                samples.push(s);
                samples.push(s);
            }
        }
        Mode::Binaural => {
            let mut left = SineOscillator::new(config.carrier_hz, EXPORT_SAMPLE_RATE);
            let mut right =
                SineOscillator::new(config.carrier_hz + config.beat_hz, EXPORT_SAMPLE_RATE);
            for _ in 0..frames {
                samples.push(left.next_sample() * gain);
                samples.push(right.next_sample() * gain);
            }
        }
    }

    Ok(RenderedAudio {
        samples,
        channels: EXPORT_CHANNELS,
        sample_rate: EXPORT_SAMPLE_RATE,
    })
}

/// Download name for an exported session, e.g. `binaural_528Hz_1800s.wav`
pub fn export_file_name(config: &SessionConfig) -> String {
    format!(
        "{}_{}Hz_{}s.wav",
        config.mode.as_str(),
        config.carrier_hz,
        config.duration_secs
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_length_matches_duration() {
        let config = SessionConfig {
            mode: Mode::Binaural,
            carrier_hz: 528.0,
            beat_hz: 10.0,
            volume: 0.35,
            duration_secs: 2,
        };
        let audio = render_session(&config).unwrap();
        assert_eq!(audio.frame_count(), 2 * 48000);
        assert_eq!(audio.samples.len(), 2 * 48000 * 2);
    }

    #[test]
    fn test_render_respects_headroom_gain() {
        let config = SessionConfig {
            mode: Mode::Pure,
            carrier_hz: 440.0,
            volume: 1.0,
            duration_secs: 1,
            ..Default::default()
        };
        let audio = render_session(&config).unwrap();
        let peak = audio.samples.iter().fold(0.0f32, |m, &s| m.max(s.abs()));
        assert!(peak <= 0.5 + 1e-4);
        assert!(peak > 0.45);
    }

    #[test]
    fn test_binaural_channels_differ() {
        let config = SessionConfig {
            mode: Mode::Binaural,
            carrier_hz: 200.0,
            beat_hz: 10.0,
            volume: 0.5,
            duration_secs: 1,
        };
        let audio = render_session(&config).unwrap();

        // Count rising zero crossings per channel; they differ by beat_hz
        let mut crossings = [0u32; 2];
        for ch in 0..2 {
            let mut prev = audio.samples[ch];
            for frame in 1..audio.frame_count() {
                let s = audio.samples[frame * 2 + ch];
                if prev < 0.0 && s >= 0.0 {
                    crossings[ch] += 1;
                }
                prev = s;
            }
        }
        let diff = crossings[1] as i32 - crossings[0] as i32;
        assert!((9..=11).contains(&diff), "crossing diff {diff}");
    }

    #[test]
    fn test_export_file_name() {
        let config = SessionConfig {
            mode: Mode::Binaural,
            carrier_hz: 528.0,
            beat_hz: 10.0,
            volume: 0.35,
            duration_secs: 1800,
        };
        assert_eq!(export_file_name(&config), "binaural_528Hz_1800s.wav");

        let config = SessionConfig {
            mode: Mode::Pure,
            carrier_hz: 432.5,
            duration_secs: 600,
            ..config
        };
        assert_eq!(export_file_name(&config), "pure_432.5Hz_600s.wav");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SessionConfig {
            duration_secs: 0,
            ..Default::default()
        };
        assert!(render_session(&config).is_err());
    }
}
