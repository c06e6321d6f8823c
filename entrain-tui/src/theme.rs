//! Color theme for the ENTRAIN interface

use ratatui::style::{Color, Modifier, Style};

/// Theme configuration for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    /// Primary foreground color (text, borders)
    pub fg: Color,
    /// Dimmed foreground (secondary text)
    pub fg_dim: Color,
    /// Background color
    pub bg: Color,
    /// Highlight color (selected fields, active elements)
    pub highlight: Color,
    /// Accent color (meters, detected peak)
    pub accent: Color,
    /// Warning color (deviation reports)
    pub warning: Color,
    /// Error/danger color
    pub danger: Color,
    /// Carrier frequency marker in the spectrum view
    pub carrier_marker: Color,
    /// Beat (carrier + beat) marker in the spectrum view
    pub beat_marker: Color,
}

impl Theme {
    /// Get style for normal text
    pub fn normal(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    /// Get style for dimmed text
    pub fn dim(&self) -> Style {
        Style::default().fg(self.fg_dim).bg(self.bg)
    }

    /// Get style for highlighted/selected items
    pub fn highlight(&self) -> Style {
        Style::default()
            .fg(self.bg)
            .bg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    /// Get style for borders
    pub fn border(&self) -> Style {
        Style::default().fg(self.fg_dim)
    }

    /// Get title style
    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    /// Get style for the bar spectrum, hue swept across the bin index
    pub fn bar_style(&self, bin: usize, total_bins: usize) -> Style {
        let hue = (bin as f32 / total_bins as f32) * 180.0 + 180.0;
        Style::default().fg(hsl_to_rgb(hue, 0.7, 0.5))
    }

    pub fn carrier_marker_style(&self) -> Style {
        Style::default().fg(self.carrier_marker)
    }

    pub fn beat_marker_style(&self) -> Style {
        Style::default().fg(self.beat_marker)
    }
}

/// Convert an HSL color (hue in degrees, s/l in 0..=1) to a terminal RGB
fn hsl_to_rgb(hue: f32, s: f32, l: f32) -> Color {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    Color::Rgb(
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    )
}

/// Deep-water default theme
pub const MIDNIGHT: Theme = Theme {
    name: "midnight",
    fg: Color::Rgb(180, 200, 220),        // pale blue-grey
    fg_dim: Color::Rgb(90, 100, 115),     // dimmed
    bg: Color::Rgb(8, 10, 16),            // near black, blue tint
    highlight: Color::Rgb(120, 200, 255), // sky blue
    accent: Color::Rgb(80, 220, 180),     // sea green
    warning: Color::Rgb(250, 210, 90),    // soft yellow
    danger: Color::Rgb(255, 110, 110),    // soft red
    carrier_marker: Color::Rgb(255, 100, 100),
    beat_marker: Color::Rgb(100, 255, 100),
};

/// Classic phosphor green alternative
pub const PHOSPHOR: Theme = Theme {
    name: "phosphor",
    fg: Color::Rgb(51, 255, 51),
    fg_dim: Color::Rgb(25, 128, 25),
    bg: Color::Rgb(0, 10, 0),
    highlight: Color::Rgb(180, 255, 180),
    accent: Color::Rgb(100, 255, 100),
    warning: Color::Rgb(255, 255, 100),
    danger: Color::Rgb(255, 100, 100),
    carrier_marker: Color::Rgb(255, 100, 100),
    beat_marker: Color::Rgb(200, 255, 120),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), Color::Rgb(255, 0, 0));
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), Color::Rgb(0, 255, 0));
        assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), Color::Rgb(0, 0, 255));
    }

    #[test]
    fn test_bar_hue_sweep_varies() {
        let theme = &MIDNIGHT;
        // Sweep runs from cyan-ish toward magenta across the bins
        assert_ne!(theme.bar_style(0, 128), theme.bar_style(127, 128));
    }
}
