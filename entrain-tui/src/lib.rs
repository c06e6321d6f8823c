//! Terminal UI for ENTRAIN - widgets, theme, and layout

mod app;
mod theme;
pub mod widgets;

pub use app::{App, Field, SpectrumView, VerifyDisplay};
pub use theme::{Theme, MIDNIGHT, PHOSPHOR};
pub use widgets::{
    format_mm_ss, BarSpectrumWidget, ControlsWidget, PresetListWidget, SpectrumLineWidget,
    StatsWidget, StatusBarWidget, TimerWidget,
};
