//! Per-session style snapshot: fixed colors and the color profile they are emitted in.

use ratatui::style::Color;

use super::palette::Rgb;

/// How colors are written to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorProfile {
    /// 24-bit RGB escapes.
    #[default]
    #[value(name = "truecolor")]
    TrueColor,
    /// Nearest xterm 256-color index.
    #[value(name = "ansi256")]
    Ansi256,
}

impl ColorProfile {
    /// Guess from `COLORTERM`, the variable terminals set when they support 24-bit color.
    pub fn detect() -> Self {
        match std::env::var("COLORTERM").as_deref() {
            Ok("truecolor") | Ok("24bit") => Self::TrueColor,
            _ => Self::Ansi256,
        }
    }
}

/// Deepest, almost black tone for the orb rim.
pub const RIM: Rgb = Rgb::from_hex(0x250042);
const TEXT: Rgb = Rgb::from_hex(0xFFFFFF);
const INPUT_BACKGROUND: Rgb = Rgb::from_hex(0x222222);
const FOOTER: Rgb = Rgb::from_hex(0x626262);
const HINT: u8 = 240;
const SPINNER: u8 = 155;

/// Immutable style configuration carried by one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub profile: ColorProfile,
    pub rim: Rgb,
    pub text: Rgb,
    pub input_background: Rgb,
    pub footer: Rgb,
    pub hint: Color,
    pub spinner: Color,
}

impl Theme {
    pub fn new(profile: ColorProfile) -> Self {
        Self {
            profile,
            rim: RIM,
            text: TEXT,
            input_background: INPUT_BACKGROUND,
            footer: FOOTER,
            hint: Color::Indexed(HINT),
            spinner: Color::Indexed(SPINNER),
        }
    }

    /// Terminal color for an RGB value under this theme's profile.
    pub fn color(&self, rgb: Rgb) -> Color {
        match self.profile {
            ColorProfile::TrueColor => Color::Rgb(rgb.0, rgb.1, rgb.2),
            ColorProfile::Ansi256 => Color::Indexed(rgb.to_ansi256()),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(ColorProfile::default())
    }
}
