//! Procedural field generator: occupancy and swirl value for each orb pixel.

/// Pixels farther than this fraction of the radius are drawn in the rim color.
pub const RIM_THRESHOLD: f64 = 0.9;

/// Orb bounding box and radius, in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrbGeometry {
    pub width: usize,
    pub height: usize,
    pub radius: usize,
}

impl OrbGeometry {
    /// Geometry for an orb spanning `width` cells: radius is a quarter of the width and
    /// the sphere is twice the radius tall.
    pub fn for_width(width: usize) -> Self {
        let radius = width / 4;
        Self {
            width,
            height: radius * 2,
            radius,
        }
    }
}

/// What the field holds at one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pixel {
    /// Outside the disc.
    Blank,
    /// Inside the disc; colored from the body palette by swirl value.
    Body { swirl: f64 },
    /// Inside the disc near its edge; always the rim color.
    Rim,
}

/// Elliptical distance from the orb center. Horizontal offsets are halved because
/// terminal cells are roughly twice as tall as they are wide.
pub fn distance(nx: f64, ny: f64) -> f64 {
    (nx * nx / 4.0 + ny * ny).sqrt()
}

/// Swirl value at a center-relative position: radial falloff plus two phase-shifted
/// sinusoids drifting at different speeds.
pub fn swirl(nx: f64, ny: f64, dist: f64, frame: u64) -> f64 {
    let t = frame as f64;
    dist * 0.2 + (nx / 6.0 + ny / 8.0 + t / 10.0).sin() + (ny / 10.0 + nx / 12.0 + t / 15.0).cos()
}

/// Sample the field at cell `(x, y)` of the orb bounding box.
pub fn sample(x: i64, y: i64, geometry: OrbGeometry, frame: u64) -> Pixel {
    let nx = x as f64 - geometry.width as f64 / 2.0;
    let ny = y as f64 - geometry.height as f64 / 2.0;
    let dist = distance(nx, ny);
    let radius = geometry.radius as f64;

    if dist >= radius {
        Pixel::Blank
    } else if dist > radius * RIM_THRESHOLD {
        Pixel::Rim
    } else {
        Pixel::Body {
            swirl: swirl(nx, ny, dist, frame),
        }
    }
}
