//! Output backend capability
//!
//! The session controller drives tone playback through this interface:
//! the production implementation owns a cpal stream, the null
//! implementation produces taps without touching a device (tests,
//! headless use).

use entrain_analysis::{shared_tap, SharedTap};
use thiserror::Error;

use crate::config::{InvalidConfig, SessionConfig};

/// Transform window of the pitch-detection tap
pub const DETAIL_FFT_SIZE: usize = 4096;
/// Transform window of the faster-updating visualization tap
pub const DISPLAY_FFT_SIZE: usize = 2048;

/// Errors surfaced when starting playback or rendering
#[derive(Debug, Error)]
pub enum AudioError {
    /// The output device or stream could not be created
    #[error("audio output unavailable: {0}")]
    ResourceUnavailable(String),
    #[error(transparent)]
    Config(#[from] InvalidConfig),
}

/// Handles to a started tone: the backend retains the graph and stream,
/// the caller gets the analysis taps
#[derive(Clone)]
pub struct ActiveTone {
    pub sample_rate: u32,
    pub detail_tap: SharedTap,
    pub display_tap: SharedTap,
}

/// Tone playback capability injected into the session controller
pub trait AudioBackend: Send {
    /// Build the signal graph and begin playback.
    ///
    /// Implementations stop any previous tone first; two graphs never
    /// overlap. Errors leave no resources allocated.
    fn start(&mut self, config: &SessionConfig) -> Result<ActiveTone, AudioError>;

    /// Ramp the live master gain to a new volume. No-op when stopped.
    fn set_volume(&mut self, volume: f32);

    /// Tear down the graph and release the output device. Idempotent;
    /// individual teardown failures are swallowed.
    fn stop(&mut self);

    /// Whether a tone is currently live
    fn is_open(&self) -> bool;
}

/// Backend with no audio device: allocates taps and tracks open state
///
/// The taps stay silent unless a test pushes samples into them.
#[derive(Default)]
pub struct NullBackend {
    tone: Option<ActiveTone>,
}

impl NullBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioBackend for NullBackend {
    fn start(&mut self, config: &SessionConfig) -> Result<ActiveTone, AudioError> {
        config.validate()?;
        let tone = ActiveTone {
            sample_rate: 48000,
            detail_tap: shared_tap(DETAIL_FFT_SIZE),
            display_tap: shared_tap(DISPLAY_FFT_SIZE),
        };
        self.tone = Some(tone.clone());
        Ok(tone)
    }

    fn set_volume(&mut self, _volume: f32) {}

    fn stop(&mut self) {
        self.tone = None;
    }

    fn is_open(&self) -> bool {
        self.tone.is_some()
    }
}
