//! UI application state
//!
//! Holds the session form, popup state, the latest spectrum snapshots,
//! and the message line. The render loop runs while `running` is set;
//! quitting clears it instead of inspecting backend resource state.

use entrain_analysis::{SpectrumSample, VerificationReport};
use entrain_audio::SessionConfig;
use entrain_session::{SessionEvent, SolfeggioPreset, SOLFEGGIO_PRESETS};

/// Editable form fields, in navigation order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Mode,
    Carrier,
    Beat,
    Volume,
    Duration,
}

impl Field {
    pub fn next(self) -> Self {
        match self {
            Field::Mode => Field::Carrier,
            Field::Carrier => Field::Beat,
            Field::Beat => Field::Volume,
            Field::Volume => Field::Duration,
            Field::Duration => Field::Mode,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Field::Mode => Field::Duration,
            Field::Carrier => Field::Mode,
            Field::Beat => Field::Carrier,
            Field::Volume => Field::Beat,
            Field::Duration => Field::Volume,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Mode => "Mode",
            Field::Carrier => "Carrier",
            Field::Beat => "Beat",
            Field::Volume => "Volume",
            Field::Duration => "Duration",
        }
    }
}

/// Verification display state
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum VerifyDisplay {
    #[default]
    Hidden,
    /// Samples collected / total
    InProgress(usize, usize),
    Done(VerificationReport),
}

/// Spectrum snapshots refreshed each frame while a session runs
#[derive(Clone, Debug, Default)]
pub struct SpectrumView {
    pub display: Option<SpectrumSample>,
    pub detail: Option<SpectrumSample>,
    pub peak_hz: Option<f32>,
    pub sample_rate: u32,
}

/// Top-level UI state
pub struct App {
    /// Render loop keeps going while set
    pub running: bool,
    /// Session form being edited
    pub form: SessionConfig,
    pub selected: Field,
    pub message: Option<String>,
    /// Carrier of the playing session, for the status indicator
    pub active_carrier: Option<f32>,
    pub verify: VerifyDisplay,
    pub spectra: SpectrumView,
    pub show_presets: bool,
    pub preset_index: usize,
    pub show_stats: bool,
}

impl App {
    pub fn new(form: SessionConfig) -> Self {
        Self {
            running: true,
            form,
            selected: Field::Carrier,
            message: None,
            active_carrier: None,
            verify: VerifyDisplay::Hidden,
            spectra: SpectrumView::default(),
            show_presets: false,
            preset_index: 0,
            show_stats: false,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
    }

    /// Fold a controller event into the display state
    pub fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Started { carrier_hz } => {
                self.active_carrier = Some(carrier_hz);
                self.set_message("Session started");
            }
            SessionEvent::Stopped => {
                self.active_carrier = None;
                self.spectra = SpectrumView::default();
                self.set_message("Session stopped");
            }
            SessionEvent::SessionComplete => {
                self.set_message("Session complete!");
            }
            SessionEvent::Verification(report) => {
                self.verify = VerifyDisplay::Done(report);
            }
        }
    }

    /// Nudge the selected field. `dir` is +1 or -1.
    pub fn adjust_selected(&mut self, dir: f32) {
        match self.selected {
            Field::Mode => self.form.mode = self.form.mode.toggle(),
            Field::Carrier => {
                self.form.carrier_hz = (self.form.carrier_hz + dir).clamp(1.0, 20_000.0);
            }
            Field::Beat => {
                self.form.beat_hz = (self.form.beat_hz + dir * 0.5).clamp(0.0, 40.0);
            }
            Field::Volume => {
                self.form.volume = (self.form.volume + dir * 0.05).clamp(0.0, 1.0);
            }
            Field::Duration => {
                let step = 60.0 * dir;
                let secs = self.form.duration_secs as f32 + step;
                self.form.duration_secs = secs.clamp(60.0, 4.0 * 3600.0) as u32;
            }
        }
    }

    pub fn select_next_field(&mut self) {
        self.selected = self.selected.next();
    }

    pub fn select_prev_field(&mut self) {
        self.selected = self.selected.prev();
    }

    /// Move the preset picker selection
    pub fn move_preset_selection(&mut self, down: bool) {
        let len = SOLFEGGIO_PRESETS.len();
        self.preset_index = if down {
            (self.preset_index + 1) % len
        } else {
            (self.preset_index + len - 1) % len
        };
    }

    pub fn selected_preset(&self) -> &'static SolfeggioPreset {
        &SOLFEGGIO_PRESETS[self.preset_index]
    }

    /// Apply a preset to the session form
    pub fn apply_preset(&mut self, preset: &SolfeggioPreset) {
        self.form = preset.config;
        self.set_message(format!("{}Hz - {} configured", preset.frequency, preset.name));
        self.show_presets = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entrain_audio::Mode;

    #[test]
    fn test_field_navigation_cycles() {
        let mut field = Field::Mode;
        for _ in 0..5 {
            field = field.next();
        }
        assert_eq!(field, Field::Mode);
        assert_eq!(Field::Mode.prev(), Field::Duration);
    }

    #[test]
    fn test_adjust_volume_clamps() {
        let mut app = App::new(SessionConfig::default());
        app.selected = Field::Volume;
        for _ in 0..40 {
            app.adjust_selected(1.0);
        }
        assert_eq!(app.form.volume, 1.0);
    }

    #[test]
    fn test_apply_preset_fills_form() {
        let mut app = App::new(SessionConfig::default());
        app.show_presets = true;
        app.preset_index = 4; // 528 Hz
        let preset = app.selected_preset();
        app.apply_preset(preset);

        assert_eq!(app.form.carrier_hz, 528.0);
        assert_eq!(app.form.mode, Mode::Binaural);
        assert!(!app.show_presets);
    }

    #[test]
    fn test_session_events_update_indicator() {
        let mut app = App::new(SessionConfig::default());
        app.handle_session_event(SessionEvent::Started { carrier_hz: 528.0 });
        assert_eq!(app.active_carrier, Some(528.0));

        app.handle_session_event(SessionEvent::Stopped);
        assert_eq!(app.active_carrier, None);
        assert!(app.spectra.display.is_none());
    }
}
