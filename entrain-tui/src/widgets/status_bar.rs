//! Status bar widget - playback indicator, message line, key hints

use entrain_analysis::VerificationOutcome;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::app::VerifyDisplay;
use crate::theme::Theme;

const KEY_HINTS: &str = "space:play/stop v:verify x:export p:presets t:stats q:quit";

/// Widget for the bottom status line
pub struct StatusBarWidget<'a> {
    active_carrier: Option<f32>,
    message: Option<&'a str>,
    verify: VerifyDisplay,
    theme: &'a Theme,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(active_carrier: Option<f32>, theme: &'a Theme) -> Self {
        Self {
            active_carrier,
            message: None,
            verify: VerifyDisplay::Hidden,
            theme,
        }
    }

    pub fn message(mut self, msg: Option<&'a str>) -> Self {
        self.message = msg;
        self
    }

    pub fn verification(mut self, verify: VerifyDisplay) -> Self {
        self.verify = verify;
        self
    }

    fn indicator(&self) -> Line<'static> {
        match self.active_carrier {
            Some(hz) => Line::from(vec![
                Span::raw("["),
                Span::styled(format!("PLAYING {hz}Hz"), self.theme.highlight()),
                Span::raw("]"),
            ]),
            None => Line::from(vec![
                Span::raw("["),
                Span::styled("IDLE", self.theme.dim()),
                Span::raw("]"),
            ]),
        }
    }

    fn verification_line(&self) -> Option<Line<'static>> {
        match self.verify {
            VerifyDisplay::Hidden => None,
            VerifyDisplay::InProgress(done, total) => Some(Line::styled(
                format!("analyzing frequency... {done}/{total}"),
                ratatui::style::Style::from(self.theme.warning),
            )),
            VerifyDisplay::Done(report) => {
                let line = match report.outcome {
                    VerificationOutcome::Verified { accuracy_pct } => Line::styled(
                        format!(
                            "verified: expected {}Hz detected {:.1}Hz accuracy {accuracy_pct:.1}%",
                            report.target_hz, report.detected_hz
                        ),
                        ratatui::style::Style::from(self.theme.accent),
                    ),
                    VerificationOutcome::Deviation { diff_hz, diff_pct } => Line::styled(
                        format!(
                            "deviation: expected {}Hz detected {:.1}Hz off by {diff_hz:.1}Hz ({diff_pct:.1}%)",
                            report.target_hz, report.detected_hz
                        ),
                        ratatui::style::Style::from(self.theme.warning),
                    ),
                };
                Some(line)
            }
        }
    }
}

impl Widget for StatusBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let chunks = Layout::horizontal([
            Constraint::Length(20), // Playback indicator
            Constraint::Min(24),    // Message / verification area
            Constraint::Length(KEY_HINTS.len() as u16 + 1),
        ])
        .split(area);

        Paragraph::new(self.indicator()).render(chunks[0], buf);

        let content = if let Some(line) = self.verification_line() {
            line
        } else if let Some(msg) = self.message {
            Line::styled(msg.to_string(), self.theme.normal())
        } else {
            Line::raw("")
        };
        Paragraph::new(content).render(chunks[1], buf);

        Paragraph::new(Line::styled(KEY_HINTS, self.theme.dim())).render(chunks[2], buf);
    }
}
