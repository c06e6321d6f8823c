//! Session timer widget - elapsed/remaining readout with progress gauge

use entrain_session::SessionProgress;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget},
};

use crate::theme::Theme;

/// Format milliseconds as MM:SS
pub fn format_mm_ss(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    format!("{minutes:02}:{seconds:02}")
}

/// Widget for the session clock
pub struct TimerWidget<'a> {
    progress: Option<SessionProgress>,
    theme: &'a Theme,
}

impl<'a> TimerWidget<'a> {
    pub fn new(progress: Option<SessionProgress>, theme: &'a Theme) -> Self {
        Self { progress, theme }
    }
}

impl Widget for TimerWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .title(Span::styled(" SESSION ", self.theme.title()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 2 {
            return;
        }

        let Some(p) = self.progress else {
            Paragraph::new(Line::styled("no session", self.theme.dim())).render(inner, buf);
            return;
        };

        let readout = Line::from(vec![
            Span::styled("elapsed ", self.theme.dim()),
            Span::styled(format_mm_ss(p.elapsed_ms), self.theme.normal()),
            Span::styled("   remaining ", self.theme.dim()),
            Span::styled(format_mm_ss(p.remaining_ms), self.theme.normal()),
        ]);
        Paragraph::new(readout).render(
            Rect {
                height: 1,
                ..inner
            },
            buf,
        );

        let gauge_area = Rect {
            y: inner.y + 1,
            height: 1,
            ..inner
        };
        Gauge::default()
            .ratio(f64::from(p.fraction))
            .gauge_style(ratatui::style::Style::default().fg(self.theme.accent))
            .use_unicode(true)
            .render(gauge_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mm_ss() {
        assert_eq!(format_mm_ss(0), "00:00");
        assert_eq!(format_mm_ss(61_000), "01:01");
        assert_eq!(format_mm_ss(1_800_000), "30:00");
        assert_eq!(format_mm_ss(599_900), "09:59");
    }
}
