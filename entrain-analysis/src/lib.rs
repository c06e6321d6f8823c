//! Spectral analysis for ENTRAIN
//!
//! Provides the FFT analysis taps fed by the signal graph, the
//! parabolic-interpolation peak detector, and the multi-sample
//! frequency verification routine.

mod peak;
mod tap;
mod verify;

pub use peak::{estimate_peak, PeakEstimate};
pub use tap::{shared_tap, AnalysisTap, SharedTap, SpectrumSample};
pub use verify::{
    VerificationOutcome, VerificationReport, VerificationSampler, VERIFY_RANGE_HZ,
    VERIFY_SAMPLE_COUNT, VERIFY_SAMPLE_PERIOD_MS,
};
