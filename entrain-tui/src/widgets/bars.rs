//! Bar spectrum widget - byte-quantized frequency data as colored bars

use entrain_analysis::SpectrumSample;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::Span,
    widgets::{Block, Borders, Widget},
};

use crate::theme::Theme;

/// Characters for vertical bar rendering (8 levels)
const BAR_CHARS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Fraction of the spectrum the bars cover; low bins carry the tones
const VISIBLE_BINS: f32 = 0.4;

/// Widget for the fast-updating bar visualization (display tap)
pub struct BarSpectrumWidget<'a> {
    sample: Option<&'a SpectrumSample>,
    theme: &'a Theme,
}

impl<'a> BarSpectrumWidget<'a> {
    pub fn new(sample: Option<&'a SpectrumSample>, theme: &'a Theme) -> Self {
        Self { sample, theme }
    }

    /// Get full height bar representation
    fn render_bar(level: f32, height: u16) -> Vec<char> {
        let total_levels = (level.clamp(0.0, 1.0) * 8.0 * height as f32) as usize;
        let full_blocks = total_levels / 8;
        let partial = total_levels % 8;

        let mut bar = Vec::with_capacity(height as usize);

        // Build from bottom to top
        for row in 0..height as usize {
            let ch = if row < full_blocks {
                '█'
            } else if row == full_blocks && partial > 0 {
                BAR_CHARS[partial]
            } else {
                ' '
            };
            bar.push(ch);
        }

        bar
    }
}

impl Widget for BarSpectrumWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .title(Span::styled(" VISUALIZER ", self.theme.title()));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 1 || inner.width < 4 {
            return;
        }

        let Some(sample) = self.sample else {
            return;
        };
        let bins = sample.bytes.len();
        if bins == 0 {
            return;
        }

        let width = inner.width as usize;
        let height = inner.height;
        let shown = (bins as f32 * VISIBLE_BINS) as usize;

        for col in 0..width {
            let bin = col * shown / width;
            let level = sample.bytes[bin] as f32 / 255.0;
            let bar = Self::render_bar(level, height);
            let style = self.theme.bar_style(bin, bins);

            let x = inner.x + col as u16;
            for (row, &ch) in bar.iter().enumerate() {
                if ch != ' ' {
                    let y = inner.y + inner.height - 1 - row as u16;
                    buf[(x, y)].set_char(ch).set_style(style);
                }
            }
        }
    }
}
