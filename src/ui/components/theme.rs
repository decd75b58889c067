//! Theme definitions for the picker.
//!
//! Muted base colours with a single accent for matches and focus, plus
//! warning/danger tones for the destructive confirm prompts.

use ratatui::style::{Color, Modifier, Style};

pub mod colors {
    use ratatui::style::Color;

    // ═══════════════════════════════════════════════════════════════════════════
    // BASE COLORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Elevated surface - popups
    pub const BG_SURFACE: Color = Color::Rgb(36, 40, 59); // #24283b

    /// Selected row
    pub const BG_HIGHLIGHT: Color = Color::Rgb(41, 46, 66); // #292e42

    pub const BORDER: Color = Color::Rgb(59, 66, 97); // #3b4261

    pub const BORDER_FOCUS: Color = Color::Rgb(125, 145, 200); // #7d91c8

    // ═══════════════════════════════════════════════════════════════════════════
    // TEXT COLORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub const TEXT_PRIMARY: Color = Color::Rgb(192, 202, 245); // #c0caf5

    /// Muted text - dates, ages, hints
    pub const TEXT_MUTED: Color = Color::Rgb(105, 114, 158); // #696e9e

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCENT / STATUS COLORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub const ACCENT_PRIMARY: Color = Color::Rgb(122, 162, 247); // #7aa2f7

    pub const ACCENT_SECONDARY: Color = Color::Rgb(187, 154, 247); // #bb9af7

    pub const STATUS_SUCCESS: Color = Color::Rgb(115, 218, 202); // #73daca

    pub const STATUS_WARNING: Color = Color::Rgb(224, 175, 104); // #e0af68

    pub const STATUS_ERROR: Color = Color::Rgb(247, 118, 142); // #f7768e
}

#[derive(Clone, Copy)]
pub struct ThemePalette {
    pub accent: Color,
    pub accent_alt: Color,
    pub fg: Color,
    pub surface: Color,
    pub hint: Color,
    pub border: Color,
    pub warning: Color,
    pub danger: Color,
}

impl ThemePalette {
    /// Light theme for bright terminals
    pub fn light() -> Self {
        Self {
            accent: Color::Rgb(47, 107, 231),     // Rich blue
            accent_alt: Color::Rgb(124, 93, 198), // Purple
            fg: Color::Rgb(36, 41, 46),           // Near-black
            surface: Color::Rgb(240, 241, 245),   // Light gray
            hint: Color::Rgb(125, 134, 144),      // Medium gray
            border: Color::Rgb(216, 222, 228),    // Border gray
            warning: Color::Rgb(177, 133, 41),    // Amber
            danger: Color::Rgb(200, 60, 80),      // Red
        }
    }

    pub fn dark() -> Self {
        Self {
            accent: colors::ACCENT_PRIMARY,
            accent_alt: colors::ACCENT_SECONDARY,
            fg: colors::TEXT_PRIMARY,
            surface: colors::BG_SURFACE,
            hint: colors::TEXT_MUTED,
            border: colors::BORDER,
            warning: colors::STATUS_WARNING,
            danger: colors::STATUS_ERROR,
        }
    }

    /// Pick a palette from `COLORFGBG` (`"15;0"` style); dark unless the background is light.
    pub fn detect() -> Self {
        let light_bg = std::env::var("COLORFGBG")
            .ok()
            .and_then(|v| v.rsplit(';').next().and_then(|bg| bg.parse::<u8>().ok()))
            .is_some_and(|bg| bg == 7 || bg == 15);
        if light_bg { Self::light() } else { Self::dark() }
    }

    /// Title style - accent colored with bold modifier
    pub fn title(self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn hint_style(self) -> Style {
        Style::default().fg(self.hint)
    }

    pub fn border_style(self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn border_focus_style(self) -> Style {
        Style::default().fg(colors::BORDER_FOCUS)
    }

    /// Matched characters inside a name
    pub fn match_style(self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    /// Selected row
    pub fn selected_style(self) -> Style {
        Style::default()
            .bg(colors::BG_HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn danger_style(self) -> Style {
        Style::default().fg(self.danger).add_modifier(Modifier::BOLD)
    }

    pub fn warning_style(self) -> Style {
        Style::default()
            .fg(self.warning)
            .add_modifier(Modifier::BOLD)
    }
}

/// Keyboard shortcut style (footer legend)
pub fn kbd_style(palette: ThemePalette) -> Style {
    Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD)
}

/// Style for a `0..=1` score badge
pub fn score_style(score: f64, palette: ThemePalette) -> Style {
    let (color, modifier) = if score >= 0.7 {
        (colors::STATUS_SUCCESS, Modifier::BOLD)
    } else if score >= 0.3 {
        (palette.accent, Modifier::empty())
    } else {
        (palette.hint, Modifier::DIM)
    };
    Style::default().fg(color).add_modifier(modifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_style_tiers() {
        let p = ThemePalette::dark();
        assert_eq!(score_style(0.9, p).fg, Some(colors::STATUS_SUCCESS));
        assert_eq!(score_style(0.5, p).fg, Some(p.accent));
        assert_eq!(score_style(0.1, p).fg, Some(p.hint));
    }
}
