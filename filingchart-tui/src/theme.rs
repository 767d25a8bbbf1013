//! Parrot/neon theme tokens for the filingchart TUI
//!
//! Candles and chrome use the neon palette on a dark background. Marker and
//! legend colors come from the form categories themselves so the terminal
//! matches every other surface that draws the overlay.

use ratatui::style::{Color, Modifier, Style};

use filingchart_core::domain::{FormCategory, Rgb};

/// Parrot/neon theme for the filingchart TUI
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Near-black background (primary surface)
    pub background: Color,
    /// Electric cyan accent (focus, highlights)
    pub accent: Color,
    /// Neon green (up candles)
    pub positive: Color,
    /// Hot pink (down candles, errors)
    pub negative: Color,
    /// Neon orange (notices, warnings)
    pub warning: Color,
    /// Cool purple (secondary info)
    pub neutral: Color,
    /// Steel blue (axes, muted text)
    pub muted: Color,
    /// White (primary text)
    pub text_primary: Color,
    /// Light gray (secondary text)
    pub text_secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::parrot_neon()
    }
}

impl Theme {
    pub fn parrot_neon() -> Self {
        Self {
            background: Color::Rgb(18, 18, 20),
            accent: Color::Rgb(0, 255, 255),
            positive: Color::Rgb(0, 255, 128),
            negative: Color::Rgb(255, 20, 147),
            warning: Color::Rgb(255, 140, 0),
            neutral: Color::Rgb(147, 112, 219),
            muted: Color::Rgb(100, 149, 237),
            text_primary: Color::White,
            text_secondary: Color::Rgb(170, 170, 170),
        }
    }

    /// Candle color by direction.
    pub fn candle_color(&self, up: bool) -> Color {
        if up {
            self.positive
        } else {
            self.negative
        }
    }

    pub fn category_color(&self, category: FormCategory) -> Color {
        rgb(category.color())
    }
}

pub fn rgb(c: Rgb) -> Color {
    Color::Rgb(c.0, c.1, c.2)
}

// Shared styles used by the ui modules.

pub fn accent() -> Style {
    Style::default().fg(Theme::default().accent)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(Theme::default().muted)
}

pub fn neutral() -> Style {
    Style::default().fg(Theme::default().neutral)
}

pub fn warning() -> Style {
    Style::default().fg(Theme::default().warning)
}

pub fn negative() -> Style {
    Style::default().fg(Theme::default().negative)
}

pub fn text() -> Style {
    Style::default().fg(Theme::default().text_primary)
}

pub fn text_secondary() -> Style {
    Style::default().fg(Theme::default().text_secondary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_creation() {
        let theme = Theme::default();
        assert_eq!(theme.background, Color::Rgb(18, 18, 20));
        assert_eq!(theme.accent, Color::Rgb(0, 255, 255));
    }

    #[test]
    fn test_candle_color() {
        let theme = Theme::default();
        assert_eq!(theme.candle_color(true), theme.positive);
        assert_eq!(theme.candle_color(false), theme.negative);
    }

    #[test]
    fn test_category_colors_follow_domain() {
        let theme = Theme::default();
        assert_eq!(
            theme.category_color(FormCategory::AnnualReport),
            Color::Rgb(0x3b, 0x82, 0xf6)
        );
        assert_eq!(
            theme.category_color(FormCategory::AnnualReport),
            theme.category_color(FormCategory::QuarterlyReport)
        );
        assert_eq!(
            theme.category_color(FormCategory::CurrentReport),
            Color::Rgb(0xea, 0xb3, 0x08)
        );
        assert_eq!(
            theme.category_color(FormCategory::InsiderTransaction),
            Color::Rgb(0xa8, 0x55, 0xf7)
        );
        assert_eq!(
            theme.category_color(FormCategory::News),
            Color::Rgb(0x22, 0xc5, 0x5e)
        );
    }
}
