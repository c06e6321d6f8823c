//! Session lifecycle for ENTRAIN
//!
//! The controller state machine, the injectable time and persistence
//! capabilities, session statistics, and the Solfeggio preset tables.

mod clock;
mod config;
mod controller;
mod presets;
mod stats;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AppConfig;
pub use controller::{
    SessionController, SessionError, SessionEvent, SessionProgress, SessionState, SessionStatus,
    TICK_PERIOD_MS,
};
pub use presets::{
    beat_band_for, preset_for, BeatBand, SolfeggioPreset, BEAT_BANDS, SOLFEGGIO_PRESETS,
};
pub use stats::{frequency_key, SessionStatistics};
pub use store::{MemoryStore, SqliteStore, StatisticsStore, StoreError};
