//! Solfeggio preset picker - centered popup list

use entrain_session::SOLFEGGIO_PRESETS;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Widget},
};

use crate::theme::Theme;

/// Widget for the preset selection popup
pub struct PresetListWidget<'a> {
    selected: usize,
    theme: &'a Theme,
}

impl<'a> PresetListWidget<'a> {
    pub fn new(selected: usize, theme: &'a Theme) -> Self {
        Self { selected, theme }
    }

    /// Centered popup area within the terminal
    pub fn popup_area(screen: Rect) -> Rect {
        let width = 56.min(screen.width);
        let height = (SOLFEGGIO_PRESETS.len() as u16 + 2).min(screen.height);
        Rect {
            x: screen.x + (screen.width.saturating_sub(width)) / 2,
            y: screen.y + (screen.height.saturating_sub(height)) / 2,
            width,
            height,
        }
    }
}

impl Widget for PresetListWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let items: Vec<ListItem> = SOLFEGGIO_PRESETS
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let minutes = p.config.duration_secs / 60;
                let line = Line::from(vec![
                    Span::styled(format!("{:>3} Hz  ", p.frequency), self.theme.title()),
                    Span::styled(format!("{:<30}", p.name), self.theme.normal()),
                    Span::styled(
                        format!("{} {:>2}min", p.config.mode.as_str(), minutes),
                        self.theme.dim(),
                    ),
                ]);
                if i == self.selected {
                    ListItem::new(line).style(self.theme.highlight())
                } else {
                    ListItem::new(line)
                }
            })
            .collect();

        List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.border())
                    .title(Span::styled(" SOLFEGGIO PRESETS ", self.theme.title())),
            )
            .render(area, buf);
    }
}
