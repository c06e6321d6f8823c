//! Spectrum line widget - detail-tap magnitudes with frequency markers
//!
//! Plots the byte data on the 128-centered scale and overlays vertical
//! markers at the carrier (and carrier + beat in binaural mode), plus the
//! detected peak readout.

use entrain_analysis::SpectrumSample;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::Span,
    widgets::{Block, Borders, Widget},
};

use crate::theme::Theme;

/// Peak readouts inside this distance of the carrier snap to 0.1 Hz
const SNAP_RANGE_HZ: f32 = 10.0;

/// Widget for the continuous spectrum view (detail tap)
pub struct SpectrumLineWidget<'a> {
    sample: Option<&'a SpectrumSample>,
    sample_rate: u32,
    carrier_hz: f32,
    /// Second marker at carrier + beat, binaural sessions only
    beat_marker_hz: Option<f32>,
    peak_hz: Option<f32>,
    theme: &'a Theme,
}

impl<'a> SpectrumLineWidget<'a> {
    pub fn new(
        sample: Option<&'a SpectrumSample>,
        sample_rate: u32,
        carrier_hz: f32,
        theme: &'a Theme,
    ) -> Self {
        Self {
            sample,
            sample_rate,
            carrier_hz,
            beat_marker_hz: None,
            peak_hz: None,
            theme,
        }
    }

    pub fn beat_marker(mut self, hz: Option<f32>) -> Self {
        self.beat_marker_hz = hz;
        self
    }

    pub fn peak(mut self, hz: Option<f32>) -> Self {
        self.peak_hz = hz;
        self
    }

    /// Peak value for display, snapped near the carrier
    fn display_peak(&self) -> Option<f32> {
        let peak = self.peak_hz?;
        if (peak - self.carrier_hz).abs() < SNAP_RANGE_HZ {
            Some((peak * 10.0).round() / 10.0)
        } else {
            Some(peak)
        }
    }

    /// Column for a frequency, mapped across the nyquist range
    fn column_for(&self, hz: f32, width: u16) -> Option<u16> {
        let nyquist = self.sample_rate as f32 / 2.0;
        if nyquist <= 0.0 {
            return None;
        }
        let col = (hz / nyquist * width as f32) as u16;
        (col < width).then_some(col)
    }

    fn draw_marker(
        &self,
        buf: &mut Buffer,
        inner: Rect,
        hz: f32,
        label_row: u16,
        style: ratatui::style::Style,
    ) {
        let Some(col) = self.column_for(hz, inner.width) else {
            return;
        };
        let x = inner.x + col;
        for y in inner.y..inner.y + inner.height {
            buf[(x, y)].set_char('│').set_style(style);
        }

        let label = format!("{hz}Hz");
        let label_x = x.saturating_add(1);
        if label_x + label.len() as u16 <= inner.x + inner.width {
            buf.set_string(label_x, inner.y + label_row, &label, style);
        }
    }
}

impl Widget for SpectrumLineWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = match self.display_peak() {
            Some(peak) => format!(" SPECTRUM  peak {peak:.1} Hz "),
            None => " SPECTRUM ".to_string(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .title(Span::styled(title, self.theme.title()));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 2 || inner.width < 8 {
            return;
        }

        if let Some(sample) = self.sample {
            let bins = sample.bytes.len();
            if bins > 0 {
                // 128-centered byte scale: v in 0..=2 spans the full height
                for col in 0..inner.width as usize {
                    let bin = col * bins / inner.width as usize;
                    let v = sample.bytes[bin] as f32 / 128.0;
                    let h = ((v * inner.height as f32) / 2.0) as u16;
                    if h > 0 {
                        let y = inner.y + inner.height - h.min(inner.height);
                        buf[(inner.x + col as u16, y)]
                            .set_char('·')
                            .set_style(self.theme.normal());
                    }
                }
            }
        }

        self.draw_marker(buf, inner, self.carrier_hz, 0, self.theme.carrier_marker_style());
        if let Some(hz) = self.beat_marker_hz {
            self.draw_marker(buf, inner, hz, 1, self.theme.beat_marker_style());
        }
    }
}
