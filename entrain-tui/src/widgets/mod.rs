//! UI widgets for ENTRAIN

mod bars;
mod controls;
mod presets;
mod spectrum;
mod stats;
mod status_bar;
mod timer;

pub use bars::BarSpectrumWidget;
pub use controls::ControlsWidget;
pub use presets::PresetListWidget;
pub use spectrum::SpectrumLineWidget;
pub use stats::StatsWidget;
pub use status_bar::StatusBarWidget;
pub use timer::{format_mm_ss, TimerWidget};
