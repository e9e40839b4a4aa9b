//! Color theme for gruff.
//!
//! Two built-in themes: `dark` (ANSI 16 colors, works everywhere) and
//! `catppuccin-mocha` (RGB, needs truecolor). Selected by the `theme`
//! key in config; unknown names fall back to `dark` so a typo never
//! prevents startup.

use ratatui::style::Color;

/// All color values used across gruff's UI surfaces.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Picker titles and selected-item highlight.
    pub accent: Color,
    /// Spinner and loading-message text.
    pub primary: Color,
    /// Regular text.
    pub text: Color,
    /// De-emphasized text (help lines, commit metadata).
    pub subtext: Color,
    /// Error text.
    pub error: Color,
    /// Informational message text.
    pub info: Color,

    /// Status bar background.
    pub status_bar_bg: Color,
    /// Status bar foreground.
    pub status_bar_fg: Color,

    /// Markdown heading color in the rendered review view.
    pub heading: Color,
    /// Diff `+` lines inside rendered code fences.
    pub diff_added: Color,
    /// Diff `-` lines inside rendered code fences.
    pub diff_removed: Color,
}

impl Theme {
    /// ANSI-16 theme usable on any terminal.
    pub fn dark() -> Self {
        Self {
            accent: Color::Cyan,
            primary: Color::Magenta,
            text: Color::Reset,
            subtext: Color::DarkGray,
            error: Color::Red,
            info: Color::Yellow,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,

            heading: Color::Cyan,
            diff_added: Color::Green,
            diff_removed: Color::Red,
        }
    }

    /// Catppuccin Mocha palette; degrades on non-truecolor terminals.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161); // #a6e3a1
        let red = Color::Rgb(243, 139, 168); // #f38ba8
        let yellow = Color::Rgb(249, 226, 175); // #f9e2af
        let teal = Color::Rgb(148, 226, 213); // #94e2d5
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let text = Color::Rgb(205, 214, 244); // #cdd6f4
        let mauve = Color::Rgb(203, 166, 247); // #cba6f7

        Self {
            accent: lavender,
            primary: mauve,
            text,
            subtext: overlay1,
            error: red,
            info: yellow,

            status_bar_bg: surface1,
            status_bar_fg: text,

            heading: teal,
            diff_added: green,
            diff_removed: red,
        }
    }

    /// Resolves a theme name from config.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                eprintln!("gruff: unknown theme '{other}', falling back to 'dark'");
                Self::dark()
            }
        }
    }
}
