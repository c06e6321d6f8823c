//! Session lifecycle controller
//!
//! Owns all session-scoped state: the audio backend handle, the active
//! session, the periodic tick, the verification sampler, and the
//! statistics. The host loop calls tick() at frame rate; the controller
//! gates itself to the 100 ms tick period internally.

use crossbeam_channel::{bounded, Receiver, Sender};
use thiserror::Error;
use tracing::{info, warn};

use entrain_analysis::{
    estimate_peak, PeakEstimate, VerificationReport, VerificationSampler, VERIFY_RANGE_HZ,
};
use entrain_audio::{ActiveTone, AudioBackend, AudioError, InvalidConfig, SessionConfig};

use crate::clock::Clock;
use crate::stats::SessionStatistics;
use crate::store::StatisticsStore;

/// Session tick period
pub const TICK_PERIOD_MS: u64 = 100;

/// Controller status as seen by the UI
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Running,
    Stopped,
}

/// Per-session state; a fresh instance is created by every start()
#[derive(Clone, Copy, Debug)]
pub struct SessionState {
    pub status: SessionStatus,
    pub started_at_ms: u64,
    pub config: SessionConfig,
}

/// Elapsed/remaining snapshot for display
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionProgress {
    pub elapsed_ms: u64,
    pub remaining_ms: u64,
    /// Completed fraction in 0.0..=1.0
    pub fraction: f32,
}

/// Events emitted toward the UI layer; the controller formats no
/// user-facing strings
#[derive(Clone, Debug)]
pub enum SessionEvent {
    Started { carrier_hz: f32 },
    Stopped,
    SessionComplete,
    Verification(VerificationReport),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] InvalidConfig),
    #[error(transparent)]
    Audio(#[from] AudioError),
    #[error("no active session")]
    NoActiveSession,
}

struct ActiveSession {
    state: SessionState,
    tone: ActiveTone,
    last_tick_ms: u64,
    verifier: Option<VerificationSampler>,
}

/// Session controller state machine
///
/// Capabilities (backend, store, clock) are injected; independent
/// controller instances do not share state.
pub struct SessionController {
    backend: Box<dyn AudioBackend>,
    store: Box<dyn StatisticsStore>,
    clock: Box<dyn Clock>,
    stats: SessionStatistics,
    active: Option<ActiveSession>,
    last_session: Option<SessionState>,
    event_tx: Sender<SessionEvent>,
    event_rx: Receiver<SessionEvent>,
}

impl SessionController {
    pub fn new(
        backend: Box<dyn AudioBackend>,
        mut store: Box<dyn StatisticsStore>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let stats = match store.load() {
            Ok(stats) => stats,
            Err(e) => {
                warn!("failed to load statistics, starting empty: {e}");
                SessionStatistics::default()
            }
        };

        let (event_tx, event_rx) = bounded(64);
        Self {
            backend,
            store,
            clock,
            stats,
            active: None,
            last_session: None,
            event_tx,
            event_rx,
        }
    }

    /// Receiver for session events; clone per consumer
    pub fn events(&self) -> Receiver<SessionEvent> {
        self.event_rx.clone()
    }

    /// Begin a session. Stops any running session first; a failed start
    /// leaves the controller idle and the previous statistics untouched.
    pub fn start(&mut self, config: SessionConfig) -> Result<(), SessionError> {
        config.validate()?;
        self.stop();

        let tone = self.backend.start(&config)?;
        let now = self.clock.now_ms();
        info!(
            carrier_hz = config.carrier_hz,
            mode = config.mode.as_str(),
            duration_secs = config.duration_secs,
            "session started"
        );

        self.active = Some(ActiveSession {
            state: SessionState {
                status: SessionStatus::Running,
                started_at_ms: now,
                config,
            },
            tone,
            last_tick_ms: now,
            verifier: None,
        });
        self.emit(SessionEvent::Started {
            carrier_hz: config.carrier_hz,
        });
        Ok(())
    }

    /// End the current session. No-op when nothing is running.
    ///
    /// Statistics are finalized before any resources are released.
    pub fn stop(&mut self) {
        let Some(mut active) = self.active.take() else {
            return;
        };

        let elapsed_ms = self
            .clock
            .now_ms()
            .saturating_sub(active.state.started_at_ms);
        self.stats
            .record_session(active.state.config.carrier_hz, elapsed_ms);
        if let Err(e) = self.store.save(&self.stats) {
            warn!("failed to persist statistics: {e}");
        }

        self.backend.stop();
        active.state.status = SessionStatus::Stopped;
        self.last_session = Some(active.state);
        info!(elapsed_ms, "session stopped");
        self.emit(SessionEvent::Stopped);
    }

    /// Advance the session clock; called from the host loop at frame rate
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        let Some(active) = &mut self.active else {
            return;
        };
        if now.saturating_sub(active.last_tick_ms) < TICK_PERIOD_MS {
            return;
        }
        active.last_tick_ms = now;

        // One verification sample per tick while a run is active
        let mut report = None;
        if let Some(verifier) = &mut active.verifier {
            let sample = active.tone.detail_tap.lock().sample();
            let peak = estimate_peak(&sample.db, active.tone.sample_rate, VERIFY_RANGE_HZ);
            report = verifier.push(peak.frequency_hz);
            if report.is_some() {
                active.verifier = None;
            }
        }

        let expired =
            now.saturating_sub(active.state.started_at_ms) >= active.state.config.duration_ms();

        if let Some(report) = report {
            self.emit(SessionEvent::Verification(report));
        }
        if expired {
            self.stop();
            self.emit(SessionEvent::SessionComplete);
        }
    }

    /// Arm a verification run against the given target frequency
    pub fn begin_verify(&mut self, target_hz: f32) -> Result<(), SessionError> {
        let Some(active) = &mut self.active else {
            return Err(SessionError::NoActiveSession);
        };
        active.verifier = Some(VerificationSampler::new(target_hz));
        Ok(())
    }

    /// Samples collected so far in an in-flight verification run
    pub fn verification_progress(&self) -> Option<(usize, usize)> {
        self.active
            .as_ref()
            .and_then(|a| a.verifier.as_ref())
            .map(|v| v.progress())
    }

    /// Ramp the live master gain; no-op when idle
    pub fn set_volume(&mut self, volume: f32) {
        if self.active.is_some() {
            self.backend.set_volume(volume);
        }
    }

    pub fn status(&self) -> SessionStatus {
        if self.active.is_some() {
            SessionStatus::Running
        } else {
            SessionStatus::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// The most recently ended session, terminal state included
    pub fn last_session(&self) -> Option<&SessionState> {
        self.last_session.as_ref()
    }

    /// Configuration of the running session
    pub fn config(&self) -> Option<&SessionConfig> {
        self.active.as_ref().map(|a| &a.state.config)
    }

    /// Analysis taps of the running session
    pub fn tone(&self) -> Option<&ActiveTone> {
        self.active.as_ref().map(|a| &a.tone)
    }

    pub fn statistics(&self) -> &SessionStatistics {
        &self.stats
    }

    /// Current detected peak over the audible range, for display
    pub fn detected_peak(&self, range_hz: (f32, f32)) -> Option<PeakEstimate> {
        let active = self.active.as_ref()?;
        let sample = active.tone.detail_tap.lock().sample();
        Some(estimate_peak(&sample.db, active.tone.sample_rate, range_hz))
    }

    /// Elapsed/remaining time of the running session
    pub fn progress(&self) -> Option<SessionProgress> {
        let active = self.active.as_ref()?;
        let elapsed_ms = self
            .clock
            .now_ms()
            .saturating_sub(active.state.started_at_ms);
        let total_ms = active.state.config.duration_ms();
        let remaining_ms = total_ms.saturating_sub(elapsed_ms);
        Some(SessionProgress {
            elapsed_ms,
            remaining_ms,
            fraction: ((total_ms - remaining_ms) as f32 / total_ms as f32).clamp(0.0, 1.0),
        })
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.event_tx.try_send(event);
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;
    use entrain_audio::{Mode, NullBackend};
    use std::f32::consts::PI;

    fn controller_with_clock(clock: ManualClock) -> SessionController {
        SessionController::new(
            Box::new(NullBackend::new()),
            Box::new(MemoryStore::new()),
            Box::new(clock),
        )
    }

    fn test_config() -> SessionConfig {
        SessionConfig {
            mode: Mode::Binaural,
            carrier_hz: 528.0,
            beat_hz: 10.0,
            volume: 0.35,
            duration_secs: 1800,
        }
    }

    fn drain(rx: &Receiver<SessionEvent>) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(e) = rx.try_recv() {
            events.push(e);
        }
        events
    }

    #[test]
    fn test_start_then_stop_updates_statistics() {
        let clock = ManualClock::new(1_000);
        let mut ctl = controller_with_clock(clock.clone());

        ctl.start(test_config()).unwrap();
        assert_eq!(ctl.status(), SessionStatus::Running);

        ctl.stop();
        assert_eq!(ctl.status(), SessionStatus::Idle);
        assert_eq!(ctl.last_session().unwrap().status, SessionStatus::Stopped);
        assert_eq!(ctl.statistics().total_sessions, 1);
        // Near-instant stop records zero minutes
        assert_eq!(ctl.statistics().total_minutes, 0);
        assert_eq!(ctl.statistics().favorite_frequencies.get("528"), Some(&1));
    }

    #[test]
    fn test_double_stop_is_idempotent() {
        let mut ctl = controller_with_clock(ManualClock::new(0));
        ctl.start(test_config()).unwrap();
        ctl.stop();
        ctl.stop();
        assert_eq!(ctl.statistics().total_sessions, 1);
    }

    #[test]
    fn test_elapsed_minutes_are_floored() {
        let clock = ManualClock::new(0);
        let mut ctl = controller_with_clock(clock.clone());
        ctl.start(test_config()).unwrap();
        clock.advance(150_000); // 2.5 minutes
        ctl.stop();
        assert_eq!(ctl.statistics().total_minutes, 2);
    }

    #[test]
    fn test_restart_while_running_stops_previous() {
        let clock = ManualClock::new(0);
        let mut ctl = controller_with_clock(clock.clone());
        let events = ctl.events();

        ctl.start(test_config()).unwrap();
        clock.advance(5_000);
        ctl.start(SessionConfig {
            carrier_hz: 440.0,
            ..test_config()
        })
        .unwrap();

        // Implicit stop recorded the first session
        assert_eq!(ctl.statistics().total_sessions, 1);
        assert_eq!(ctl.config().unwrap().carrier_hz, 440.0);

        let events = drain(&events);
        assert!(matches!(events[0], SessionEvent::Started { carrier_hz } if carrier_hz == 528.0));
        assert!(matches!(events[1], SessionEvent::Stopped));
        assert!(matches!(events[2], SessionEvent::Started { carrier_hz } if carrier_hz == 440.0));
    }

    #[test]
    fn test_invalid_config_leaves_running_session_alone() {
        let mut ctl = controller_with_clock(ManualClock::new(0));
        ctl.start(test_config()).unwrap();

        let bad = SessionConfig {
            volume: 7.0,
            ..test_config()
        };
        assert!(matches!(ctl.start(bad), Err(SessionError::Config(_))));
        assert!(ctl.is_running());
        assert_eq!(ctl.statistics().total_sessions, 0);
    }

    #[test]
    fn test_session_expires_via_tick() {
        let clock = ManualClock::new(0);
        let mut ctl = controller_with_clock(clock.clone());
        let events = ctl.events();

        ctl.start(SessionConfig {
            duration_secs: 2,
            ..test_config()
        })
        .unwrap();

        clock.advance(1_900);
        ctl.tick();
        assert!(ctl.is_running());

        clock.advance(200);
        ctl.tick();
        assert!(!ctl.is_running());

        let events = drain(&events);
        assert!(matches!(events.last(), Some(SessionEvent::SessionComplete)));
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::Stopped)));
    }

    #[test]
    fn test_tick_is_gated_to_period() {
        let clock = ManualClock::new(0);
        let mut ctl = controller_with_clock(clock.clone());
        ctl.start(test_config()).unwrap();
        ctl.begin_verify(528.0).unwrap();

        // Sub-period ticks collect nothing
        for _ in 0..5 {
            clock.advance(10);
            ctl.tick();
        }
        assert_eq!(ctl.verification_progress(), Some((0, 10)));

        clock.advance(100);
        ctl.tick();
        assert_eq!(ctl.verification_progress(), Some((1, 10)));
    }

    #[test]
    fn test_verify_without_session_fails_fast() {
        let mut ctl = controller_with_clock(ManualClock::new(0));
        assert!(matches!(
            ctl.begin_verify(440.0),
            Err(SessionError::NoActiveSession)
        ));
    }

    #[test]
    fn test_verification_of_live_tap() {
        let clock = ManualClock::new(0);
        let mut ctl = controller_with_clock(clock.clone());
        let events = ctl.events();

        ctl.start(SessionConfig {
            mode: Mode::Pure,
            carrier_hz: 440.0,
            ..test_config()
        })
        .unwrap();

        // Feed the detail tap a clean 440 Hz tone at the backend rate
        {
            let tone = ctl.tone().unwrap();
            let sr = tone.sample_rate as f32;
            let mut tap = tone.detail_tap.lock();
            let n = tap.fft_size();
            let sine: Vec<f32> = (0..n)
                .map(|i| (2.0 * PI * 440.0 * i as f32 / sr).sin())
                .collect();
            tap.push(&sine);
        }

        ctl.begin_verify(440.0).unwrap();
        for _ in 0..10 {
            clock.advance(100);
            ctl.tick();
        }

        let report = drain(&events)
            .into_iter()
            .find_map(|e| match e {
                SessionEvent::Verification(r) => Some(r),
                _ => None,
            })
            .expect("verification completes after 10 ticks");
        assert_eq!(report.target_hz, 440.0);
        // One FFT bin at 4096/48000 is ~11.7 Hz; parabolic refinement
        // lands well inside 1% of 440
        assert!(report.is_verified(), "detected {}", report.detected_hz);
    }

    #[test]
    fn test_progress_reports_remaining() {
        let clock = ManualClock::new(0);
        let mut ctl = controller_with_clock(clock.clone());
        ctl.start(SessionConfig {
            duration_secs: 60,
            ..test_config()
        })
        .unwrap();

        clock.advance(15_000);
        let p = ctl.progress().unwrap();
        assert_eq!(p.elapsed_ms, 15_000);
        assert_eq!(p.remaining_ms, 45_000);
        assert!((p.fraction - 0.25).abs() < 1e-6);
    }
}
