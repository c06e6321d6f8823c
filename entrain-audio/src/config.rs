//! Session configuration

use thiserror::Error;

/// Tone generation mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Single tone at the carrier frequency on both channels
    Pure,
    /// Left channel at the carrier, right at carrier + beat
    #[default]
    Binaural,
}

impl Mode {
    /// Lowercase name used in export file names
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Pure => "pure",
            Mode::Binaural => "binaural",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Mode::Pure => Mode::Binaural,
            Mode::Binaural => Mode::Pure,
        }
    }
}

/// Validation failures for a session configuration
#[derive(Debug, Error, PartialEq)]
pub enum InvalidConfig {
    #[error("carrier frequency must be positive, got {0} Hz")]
    NonPositiveCarrier(f32),
    #[error("beat frequency must not be negative, got {0} Hz")]
    NegativeBeat(f32),
    #[error("volume must be within 0.0..=1.0, got {0}")]
    VolumeOutOfRange(f32),
    #[error("session duration must be positive")]
    ZeroDuration,
}

/// Immutable per-session configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    pub mode: Mode,
    pub carrier_hz: f32,
    /// Ignored for signal generation in pure mode
    pub beat_hz: f32,
    /// Linear volume in 0.0..=1.0
    pub volume: f32,
    pub duration_secs: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Binaural,
            carrier_hz: 528.0,
            beat_hz: 10.0,
            volume: 0.35,
            duration_secs: 1800,
        }
    }
}

impl SessionConfig {
    /// Reject degenerate configurations before any graph is built
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if !(self.carrier_hz > 0.0) {
            return Err(InvalidConfig::NonPositiveCarrier(self.carrier_hz));
        }
        if self.beat_hz < 0.0 {
            return Err(InvalidConfig::NegativeBeat(self.beat_hz));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(InvalidConfig::VolumeOutOfRange(self.volume));
        }
        if self.duration_secs == 0 {
            return Err(InvalidConfig::ZeroDuration);
        }
        Ok(())
    }

    pub fn duration_ms(&self) -> u64 {
        u64::from(self.duration_secs) * 1000
    }

    /// Frequency of the right-channel oscillator
    pub fn right_hz(&self) -> f32 {
        match self.mode {
            Mode::Pure => self.carrier_hz,
            Mode::Binaural => self.carrier_hz + self.beat_hz,
        }
    }
}
