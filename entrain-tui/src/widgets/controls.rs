//! Session controls widget - the editable configuration form

use entrain_audio::SessionConfig;
use entrain_session::beat_band_for;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::app::Field;
use crate::theme::Theme;

/// Widget for the session configuration form
pub struct ControlsWidget<'a> {
    form: &'a SessionConfig,
    selected: Field,
    theme: &'a Theme,
}

impl<'a> ControlsWidget<'a> {
    pub fn new(form: &'a SessionConfig, selected: Field, theme: &'a Theme) -> Self {
        Self {
            form,
            selected,
            theme,
        }
    }

    fn value_for(&self, field: Field) -> String {
        match field {
            Field::Mode => self.form.mode.as_str().to_string(),
            Field::Carrier => format!("{} Hz", self.form.carrier_hz),
            Field::Beat => format!("{} Hz", self.form.beat_hz),
            Field::Volume => format!("{:.0}%", self.form.volume * 100.0),
            Field::Duration => format!("{} min", self.form.duration_secs / 60),
        }
    }

    fn row(&self, field: Field) -> Line<'_> {
        let marker = if field == self.selected { "▸ " } else { "  " };
        let value_style = if field == self.selected {
            self.theme.highlight()
        } else {
            self.theme.normal()
        };
        Line::from(vec![
            Span::styled(marker, self.theme.title()),
            Span::styled(format!("{:<10}", field.label()), self.theme.dim()),
            Span::styled(self.value_for(field), value_style),
        ])
    }
}

impl Widget for ControlsWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .title(Span::styled(" CONTROLS ", self.theme.title()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = vec![
            self.row(Field::Mode),
            self.row(Field::Carrier),
            self.row(Field::Beat),
            self.row(Field::Volume),
            self.row(Field::Duration),
        ];

        // Brainwave band the configured beat falls into
        let band = beat_band_for(self.form.beat_hz)
            .map(|b| b.description)
            .unwrap_or("Custom Frequency");
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            band,
            ratatui::style::Style::from(self.theme.accent),
        ));

        Paragraph::new(lines).render(inner, buf);
    }
}
