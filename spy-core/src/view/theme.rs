//! src/view/theme.rs
//! ============================================================================
//! # Color palettes
//!
//! One [`Palette`] per [`Theme`]. Mocha colors follow
//! https://github.com/catppuccin/catppuccin

use ratatui::style::{Color, Modifier, Style};
use tracing::{debug, instrument};

use crate::config::Theme;
use crate::model::ui_state::NotificationLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub current_line: Color,
    pub foreground: Color,
    pub comment: Color,
    pub cyan: Color,
    pub green: Color,
    pub orange: Color,
    pub pink: Color,
    pub purple: Color,
    pub red: Color,
    pub yellow: Color,
}

impl Palette {
    pub const MOCHA: Self = Self {
        background: Color::Rgb(30, 30, 46),    // Base
        current_line: Color::Rgb(69, 71, 90),  // Surface1
        foreground: Color::Rgb(205, 214, 244), // Text
        comment: Color::Rgb(127, 132, 156),    // Overlay1
        cyan: Color::Rgb(137, 220, 235),       // Sky
        green: Color::Rgb(166, 227, 161),      // Green
        orange: Color::Rgb(250, 179, 135),     // Peach
        pink: Color::Rgb(245, 194, 231),       // Pink
        purple: Color::Rgb(203, 166, 247),     // Mauve
        red: Color::Rgb(243, 139, 168),        // Red
        yellow: Color::Rgb(249, 226, 175),     // Yellow
    };

    /// Catppuccin Latte
    pub const LIGHT: Self = Self {
        background: Color::Rgb(239, 241, 245),
        current_line: Color::Rgb(204, 208, 218),
        foreground: Color::Rgb(76, 79, 105),
        comment: Color::Rgb(140, 143, 161),
        cyan: Color::Rgb(4, 165, 229),
        green: Color::Rgb(64, 160, 43),
        orange: Color::Rgb(254, 100, 11),
        pink: Color::Rgb(234, 118, 203),
        purple: Color::Rgb(136, 57, 239),
        red: Color::Rgb(210, 15, 57),
        yellow: Color::Rgb(223, 142, 29),
    };

    /// Terminal defaults only, for 16-color terminals
    pub const MONO: Self = Self {
        background: Color::Reset,
        current_line: Color::DarkGray,
        foreground: Color::Reset,
        comment: Color::Gray,
        cyan: Color::Cyan,
        green: Color::Green,
        orange: Color::Yellow,
        pink: Color::Magenta,
        purple: Color::Blue,
        red: Color::Red,
        yellow: Color::Yellow,
    };

    #[instrument(level = "debug")]
    #[must_use]
    pub fn for_theme(theme: Theme) -> Self {
        let palette: Self = match theme {
            Theme::Mocha => Self::MOCHA,
            Theme::Light => Self::LIGHT,
            Theme::Mono => Self::MONO,
        };
        debug!(background = ?palette.background, foreground = ?palette.foreground, "Palette selected");
        palette
    }

    #[must_use]
    pub fn base(&self) -> Style {
        Style::default().bg(self.background).fg(self.foreground)
    }

    #[must_use]
    pub fn border(&self) -> Style {
        Style::default().fg(self.purple)
    }

    #[must_use]
    pub fn muted(&self) -> Style {
        Style::default().fg(self.comment)
    }

    #[must_use]
    pub fn highlight(&self) -> Style {
        Style::default()
            .bg(self.current_line)
            .add_modifier(Modifier::BOLD)
    }

    /// Border color and title for a notification level.
    #[must_use]
    pub const fn notification(&self, level: NotificationLevel) -> (Color, &'static str) {
        match level {
            NotificationLevel::Info => (self.cyan, "ℹ Info"),
            NotificationLevel::Success => (self.green, "✓ Success"),
            NotificationLevel::Warning => (self.yellow, "⚠ Warning"),
            NotificationLevel::Error => (self.red, "✕ Error"),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::MOCHA
    }
}
