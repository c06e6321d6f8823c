//! Statistics panel - lifetime totals and most-played frequencies

use entrain_session::SessionStatistics;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::theme::Theme;

/// Widget for the statistics popup
pub struct StatsWidget<'a> {
    stats: &'a SessionStatistics,
    theme: &'a Theme,
}

impl<'a> StatsWidget<'a> {
    pub fn new(stats: &'a SessionStatistics, theme: &'a Theme) -> Self {
        Self { stats, theme }
    }

    /// Centered popup area within the terminal
    pub fn popup_area(screen: Rect) -> Rect {
        let width = 40.min(screen.width);
        let height = 9.min(screen.height);
        Rect {
            x: screen.x + (screen.width.saturating_sub(width)) / 2,
            y: screen.y + (screen.height.saturating_sub(height)) / 2,
            width,
            height,
        }
    }
}

impl Widget for StatsWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let mut lines = vec![
            Line::from(vec![
                Span::styled("Total sessions  ", self.theme.dim()),
                Span::styled(self.stats.total_sessions.to_string(), self.theme.normal()),
            ]),
            Line::from(vec![
                Span::styled("Total minutes   ", self.theme.dim()),
                Span::styled(self.stats.total_minutes.to_string(), self.theme.normal()),
            ]),
            Line::raw(""),
            Line::styled("Top frequencies", ratatui::style::Style::from(self.theme.accent)),
        ];

        let top = self.stats.top_frequencies(3);
        if top.is_empty() {
            lines.push(Line::styled("none yet", self.theme.dim()));
        } else {
            for (freq, count) in top {
                lines.push(Line::from(vec![
                    Span::styled(format!("{freq} Hz  "), self.theme.normal()),
                    Span::styled(format!("({count} times)"), self.theme.dim()),
                ]));
            }
        }

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.border())
                    .title(Span::styled(" STATISTICS ", self.theme.title())),
            )
            .render(area, buf);
    }
}
