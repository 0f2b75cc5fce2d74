use serde::{Deserialize, Serialize};
use std::ops::{Add, Neg, Sub};

/// Integer pixel coordinate. May lie outside the canvas while it is only a candidate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Largest per-axis distance between two points.
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl Add for PixelPoint {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for PixelPoint {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Neg for PixelPoint {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

/// Brush footprint in pixels, never smaller than 1x1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawSize")]
pub struct PixelSize {
    width: i32,
    height: i32,
}

#[derive(Deserialize)]
struct RawSize {
    width: i32,
    height: i32,
}

impl From<RawSize> for PixelSize {
    fn from(raw: RawSize) -> Self {
        Self::new(raw.width, raw.height)
    }
}

impl PixelSize {
    pub const ONE: PixelSize = PixelSize {
        width: 1,
        height: 1,
    };

    /// Construct a size, clamping both sides to at least one pixel.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn square(side: i32) -> Self {
        Self::new(side, side)
    }

    pub fn width(self) -> i32 {
        self.width
    }

    pub fn height(self) -> i32 {
        self.height
    }

    /// Pixel count, saturating on platforms where it does not fit.
    pub fn area(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }
}

impl Default for PixelSize {
    fn default() -> Self {
        Self::ONE
    }
}
