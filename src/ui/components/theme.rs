//! Color palettes for the search view and the detail overlay.
//!
//! Two presets, dark (default) and light, toggled with F2. Query matches and
//! backend emphasis get distinct styles so both stay readable when they
//! overlap.

use ratatui::style::{Color, Modifier, Style};

pub mod colors {
    use ratatui::style::Color;

    /// Deep background - primary canvas color
    pub const BG_DEEP: Color = Color::Rgb(26, 27, 38); // #1a1b26

    /// Elevated surface - overlay, search box
    pub const BG_SURFACE: Color = Color::Rgb(36, 40, 59); // #24283b

    /// Selected list row
    pub const BG_HIGHLIGHT: Color = Color::Rgb(41, 46, 66); // #292e42

    pub const BORDER: Color = Color::Rgb(59, 66, 97); // #3b4261
    pub const BORDER_FOCUS: Color = Color::Rgb(125, 145, 200); // #7d91c8

    pub const TEXT_PRIMARY: Color = Color::Rgb(192, 202, 245); // #c0caf5
    pub const TEXT_MUTED: Color = Color::Rgb(105, 114, 158); // #696e9e

    pub const ACCENT_PRIMARY: Color = Color::Rgb(122, 162, 247); // #7aa2f7
    pub const ACCENT_SECONDARY: Color = Color::Rgb(187, 154, 247); // #bb9af7

    pub const STATUS_ERROR: Color = Color::Rgb(247, 118, 142); // #f7768e
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemePreset {
    Dark,
    Light,
}

impl ThemePreset {
    pub fn all() -> [ThemePreset; 2] {
        [ThemePreset::Dark, ThemePreset::Light]
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemePreset::Dark => ThemePreset::Light,
            ThemePreset::Light => ThemePreset::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ThemePreset::Dark => "dark",
            ThemePreset::Light => "light",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "dark" => Some(ThemePreset::Dark),
            "light" => Some(ThemePreset::Light),
            _ => None,
        }
    }

    pub fn to_palette(self) -> ThemePalette {
        match self {
            ThemePreset::Dark => ThemePalette::dark(),
            ThemePreset::Light => ThemePalette::light(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ThemePalette {
    pub accent: Color,
    pub accent_alt: Color,
    pub bg: Color,
    pub fg: Color,
    pub surface: Color,
    pub selected: Color,
    pub hint: Color,
    pub border: Color,
    pub error: Color,
}

impl ThemePalette {
    pub fn light() -> Self {
        Self {
            accent: Color::Rgb(47, 107, 231),     // Rich blue
            accent_alt: Color::Rgb(124, 93, 198), // Purple
            bg: Color::Rgb(250, 250, 252),        // Off-white
            fg: Color::Rgb(36, 41, 46),           // Near-black
            surface: Color::Rgb(240, 241, 245),
            selected: Color::Rgb(225, 230, 242),
            hint: Color::Rgb(125, 134, 144),
            border: Color::Rgb(216, 222, 228),
            error: Color::Rgb(200, 40, 60),
        }
    }

    pub fn dark() -> Self {
        Self {
            accent: colors::ACCENT_PRIMARY,
            accent_alt: colors::ACCENT_SECONDARY,
            bg: colors::BG_DEEP,
            fg: colors::TEXT_PRIMARY,
            surface: colors::BG_SURFACE,
            selected: colors::BG_HIGHLIGHT,
            hint: colors::TEXT_MUTED,
            border: colors::BORDER,
            error: colors::STATUS_ERROR,
        }
    }

    pub fn title(self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text(self) -> Style {
        Style::default().fg(self.fg)
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

    pub fn surface_style(self) -> Style {
        Style::default().bg(self.surface).fg(self.fg)
    }

    /// Query matches: inverted accent so they read at a glance.
    pub fn highlight_style(self) -> Style {
        Style::default()
            .fg(self.bg)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Backend emphasis (`<em>` in result text).
    pub fn emphasis_style(self) -> Style {
        Style::default()
            .fg(self.accent_alt)
            .add_modifier(Modifier::ITALIC | Modifier::BOLD)
    }

    pub fn selected_style(self) -> Style {
        Style::default()
            .bg(self.selected)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error_style(self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }

    /// Submit affordance while a search is in flight.
    pub fn disabled_style(self) -> Style {
        Style::default()
            .fg(self.hint)
            .add_modifier(Modifier::DIM)
    }
}

/// Keyboard shortcut style (footer legend)
pub fn kbd_style(palette: ThemePalette) -> Style {
    Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD)
}
