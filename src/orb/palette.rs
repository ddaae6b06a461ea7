//! Palette engine: HSL conversion and the two palettes derived each frame from one base hue.

use std::fmt;

/// Number of entries in the orb body palette.
pub const BODY_SIZE: usize = 5;

/// Number of entries in the header gradient palette.
pub const GRADIENT_SIZE: usize = 10;

/// Frames for one full hue rotation (360° at one degree per three frames).
pub const HUE_PERIOD_FRAMES: u64 = 1080;

/// 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#RRGGBB` (used for the fixed theme colors).
    pub const fn from_hex(hex: u32) -> Self {
        Self((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Nearest entry of the xterm 256-color palette (6x6x6 cube or grayscale ramp).
    pub fn to_ansi256(self) -> u8 {
        let Rgb(r, g, b) = self;
        if r == g && g == b {
            return match r {
                0..8 => 16,
                249..=255 => 231,
                _ => 232 + ((u16::from(r) - 8) * 24 / 241) as u8,
            };
        }
        let level = |v: u8| ((u16::from(v) * 5 + 127) / 255) as u8;
        16 + 36 * level(r) + 6 * level(g) + level(b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Convert HSL (hue in degrees, saturation and lightness in percent) to RGB.
/// Hue is wrapped into `[0, 360)`; channels are truncated, not rounded.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let mut h = h % 360.0;
    if h < 0.0 {
        h += 360.0;
    }
    let s = s / 100.0;
    let l = l / 100.0;

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let channel = |v: f64| ((v + m) * 255.0) as u8;
    Rgb(channel(r), channel(g), channel(b))
}

/// Base hue for a frame: `(frame / 3) mod 360`.
///
/// The frame is reduced modulo the hue period first so that frames one period apart
/// produce bit-identical hues.
pub fn base_hue(frame: u64) -> f64 {
    (frame % HUE_PERIOD_FRAMES) as f64 / 3.0
}

/// Body and gradient palettes for one frame. Never mutated; rebuild per frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteSet {
    pub body: [Rgb; BODY_SIZE],
    pub gradient: [Rgb; GRADIENT_SIZE],
}

impl PaletteSet {
    pub fn for_frame(frame: u64) -> Self {
        let base = base_hue(frame);
        let body = std::array::from_fn(|i| {
            let i = i as f64;
            hsl_to_rgb(base + 15.0 * i, 65.0 + 3.0 * i, 65.0 - 2.0 * i)
        });
        let gradient = std::array::from_fn(|i| hsl_to_rgb(base + 10.0 * i as f64, 70.0, 65.0));
        Self { body, gradient }
    }

    /// Body color for a swirl value.
    pub fn body_color(&self, swirl: f64) -> Rgb {
        self.body[swirl_band(swirl)]
    }

    /// Gradient color for character `index` of a `len`-character line.
    pub fn gradient_color(&self, index: usize, len: usize, frame: u64) -> Rgb {
        self.gradient[gradient_index(index, len, frame)]
    }
}

/// Body palette index for a swirl value. Bands of `swirl % 1.0` map in reverse:
/// `[0, .2)` → 4 down to `[.8, 1)` → 0. Negative remainders land in the first band.
pub fn swirl_band(swirl: f64) -> usize {
    let cycle = swirl % 1.0;
    if cycle < 0.2 {
        4
    } else if cycle < 0.4 {
        3
    } else if cycle < 0.6 {
        2
    } else if cycle < 0.8 {
        1
    } else {
        0
    }
}

/// Gradient palette index: proportional position in the line, scrolled by `frame / 3`.
pub fn gradient_index(index: usize, len: usize, frame: u64) -> usize {
    if len == 0 {
        return 0;
    }
    let position = (index as f64 / len as f64 * GRADIENT_SIZE as f64) as usize;
    let scroll = ((frame / 3) % GRADIENT_SIZE as u64) as usize;
    (position + scroll) % GRADIENT_SIZE
}
