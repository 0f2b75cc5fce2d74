use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// RGB color space a color value was authored in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorSpace {
    #[default]
    Standard,
    WideGamut,
}

/// 8-bit straight-alpha RGBA color.
///
/// Equality treats every fully transparent color as the same color, whatever its RGB
/// channels hold. Fill matching and undo comparisons rely on this.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ColorComponents {
    #[serde(default)]
    pub color_space: ColorSpace,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub opacity: u8,
}

impl ColorComponents {
    pub const CLEAR: ColorComponents = ColorComponents::rgba(0, 0, 0, 0);
    pub const BLACK: ColorComponents = ColorComponents::rgba(0, 0, 0, 255);
    pub const WHITE: ColorComponents = ColorComponents::rgba(255, 255, 255, 255);

    /// Construct a standard color space value from 0-255 channels.
    pub const fn rgba(red: u8, green: u8, blue: u8, opacity: u8) -> Self {
        Self {
            color_space: ColorSpace::Standard,
            red,
            green,
            blue,
            opacity,
        }
    }

    pub const fn with_space(self, color_space: ColorSpace) -> Self {
        Self {
            color_space,
            ..self
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity == 0
    }

    /// `[red, green, blue, opacity]` as stored, even for transparent colors.
    pub const fn channels(&self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.opacity]
    }

    /// Parse `RGB`, `RGBA`, `RRGGBB` or `RRGGBBAA`, with an optional leading `#`.
    ///
    /// Short forms are taken literally: `"F00"` is red 15, not 255. The 3 and 6 digit
    /// forms are fully opaque.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(digits, 16).ok()?;
        let byte = |shift: u32, mask: u32| ((value >> shift) & mask) as u8;

        match digits.len() {
            8 => Some(Self::rgba(
                byte(24, 0xff),
                byte(16, 0xff),
                byte(8, 0xff),
                byte(0, 0xff),
            )),
            6 => Some(Self::rgba(byte(16, 0xff), byte(8, 0xff), byte(0, 0xff), 255)),
            4 => Some(Self::rgba(
                byte(12, 0xf),
                byte(8, 0xf),
                byte(4, 0xf),
                byte(0, 0xf),
            )),
            3 => Some(Self::rgba(byte(8, 0xf), byte(4, 0xf), byte(0, 0xf), 255)),
            _ => None,
        }
    }

    /// Eight digit uppercase hex, the inverse of the `RRGGBBAA` form of [`Self::from_hex`].
    pub fn to_hex(&self) -> String {
        format!(
            "{:02X}{:02X}{:02X}{:02X}",
            self.red, self.green, self.blue, self.opacity
        )
    }

    /// Convert RGB into hue/saturation/brightness, each in 0..1.
    pub fn to_hsb(&self) -> Hsb {
        let r = self.red as f64 / 255.0;
        let g = self.green as f64 / 255.0;
        let b = self.blue as f64 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let mut h = if delta == 0.0 {
            0.0
        } else if max == r {
            ((g - b) / delta) % 6.0
        } else if max == g {
            ((b - r) / delta) + 2.0
        } else {
            ((r - g) / delta) + 4.0
        };

        h /= 6.0;
        if h < 0.0 {
            h += 1.0;
        }

        let s = if max == 0.0 { 0.0 } else { delta / max };
        Hsb {
            hue: h,
            saturation: s,
            brightness: max,
        }
    }
}

impl Default for ColorComponents {
    fn default() -> Self {
        Self::CLEAR
    }
}

impl PartialEq for ColorComponents {
    fn eq(&self, other: &Self) -> bool {
        if self.is_transparent() && other.is_transparent() {
            return true;
        }
        self.channels() == other.channels()
    }
}

impl Eq for ColorComponents {}

impl Hash for ColorComponents {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if self.is_transparent() {
            0u8.hash(state);
        } else {
            self.channels().hash(state);
        }
    }
}

impl fmt::Display for ColorComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

/// Hue/saturation/brightness triple, every component in 0..1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsb {
    pub hue: f64,
    pub saturation: f64,
    pub brightness: f64,
}

impl Hsb {
    pub fn new(hue: f64, saturation: f64, brightness: f64) -> Self {
        Self {
            hue,
            saturation,
            brightness,
        }
    }

    /// Convert back to 8-bit channels. Channels truncate toward zero.
    pub fn to_components(self, opacity: u8) -> ColorComponents {
        // hue is wrapped into [0,1) so callers can pass any float
        let h = ((self.hue % 1.0) + 1.0) % 1.0;
        let s = self.saturation.clamp(0.0, 1.0);
        let v = self.brightness.clamp(0.0, 1.0);

        let c = v * s;
        let x = c * (1.0 - (((h * 6.0) % 2.0) - 1.0).abs());
        let m = v - c;

        let (r1, g1, b1) = match (h * 6.0).floor() as i32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let channel = |value: f64| ((value + m) * 255.0).clamp(0.0, 255.0) as u8;
        ColorComponents::rgba(channel(r1), channel(g1), channel(b1), opacity)
    }
}
