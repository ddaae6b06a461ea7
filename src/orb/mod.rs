//! The animated orb: procedural field, palettes, theme, and the frame compositor.

pub mod compose;
pub mod field;
pub mod palette;
pub mod theme;

pub use compose::{Panel, Scene};
pub use palette::HUE_PERIOD_FRAMES;
pub use theme::{ColorProfile, Theme};
