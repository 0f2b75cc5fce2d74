use std::path::Path;

use crate::canvas::buffer::PixelBuffer;
use crate::error::{PencilError, Result};
use crate::utils::color::{ColorComponents, Hsb};
use crate::utils::vector::PixelPoint;

/// One band of the hue-based highlight/shadow ramp.
const BAND: f64 = 1.0 / 3.0;
const HUE_STEPS: u32 = 16;

/// Structured palettes whose colors follow a generation scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialCase {
    /// 4 levels of red, green and blue.
    Uniform4x4x4,
    /// 16 hues across three saturation and three brightness bands, plus greys.
    HueBands,
    /// 8 levels of red and green, 4 of blue.
    Uniform8x8x4,
}

impl SpecialCase {
    /// Per-channel step used by the quantized schemes, `None` for hue-based ramps.
    fn quanta(self) -> Option<[u8; 3]> {
        match self {
            SpecialCase::Uniform4x4x4 => Some([255 / 3, 255 / 3, 255 / 3]),
            SpecialCase::Uniform8x8x4 => Some([255 / 7, 255 / 7, 255 / 3]),
            SpecialCase::HueBands => None,
        }
    }
}

/// Ordered color list plus the shading rules used by the highlight and shadow tools.
#[derive(Clone, Debug)]
pub struct Palette {
    name: String,
    special_case: Option<SpecialCase>,
    colors: Vec<ColorComponents>,
    default_group_length: usize,
    group_lengths: Vec<usize>,
}

impl PartialEq for Palette {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Palette {
    pub fn new(
        name: impl Into<String>,
        special_case: Option<SpecialCase>,
        colors: Vec<ColorComponents>,
        default_group_length: usize,
    ) -> Self {
        Self {
            name: name.into(),
            special_case,
            colors,
            default_group_length,
            group_lengths: Vec::new(),
        }
    }

    pub fn with_group_lengths(mut self, group_lengths: Vec<usize>) -> Self {
        self.group_lengths = group_lengths;
        self
    }

    /// Curated 16 color palette.
    pub fn sp16() -> Self {
        const RGB: [(u8, u8, u8); 16] = [
            (255, 255, 255),
            (170, 170, 170),
            (85, 85, 85),
            (0, 0, 0),
            (178, 36, 25),
            (255, 51, 41),
            (255, 148, 0),
            (255, 204, 0),
            (56, 161, 61),
            (76, 217, 99),
            (75, 190, 255),
            (20, 122, 245),
            (89, 87, 214),
            (255, 128, 198),
            (230, 185, 140),
            (140, 90, 40),
        ];
        let colors = RGB
            .iter()
            .map(|&(r, g, b)| ColorComponents::rgba(r, g, b, 255))
            .collect();
        Self::new("SP 16", None, colors, 1)
    }

    pub fn rrggbb() -> Self {
        Self::new(
            "RRGGBB",
            Some(SpecialCase::Uniform4x4x4),
            uniform_levels(4, 4, 4),
            8,
        )
    }

    pub fn rrrgggbb() -> Self {
        Self::new(
            "RRRGGGBB",
            Some(SpecialCase::Uniform8x8x4),
            uniform_levels(8, 8, 4),
            8,
        )
    }

    pub fn hhhhssbb() -> Self {
        let bands = [1.0, 2.0 * BAND, BAND];
        let mut colors = Vec::with_capacity(bands.len() * bands.len() * HUE_STEPS as usize + 4);
        for saturation in bands {
            for brightness in bands {
                for hue in 0..HUE_STEPS {
                    let hsb = Hsb::new(hue as f64 / HUE_STEPS as f64, saturation, brightness);
                    colors.push(hsb.to_components(255));
                }
            }
        }
        for brightness in [1.0, 2.0 * BAND, BAND, 0.0] {
            colors.push(Hsb::new(0.0, 0.0, brightness).to_components(255));
        }
        Self::new("HHHHSSBB", Some(SpecialCase::HueBands), colors, 8)
    }

    /// Look up a built-in palette by its configuration key.
    pub fn builtin(key: &str) -> Result<Self> {
        match key.to_ascii_lowercase().as_str() {
            "sp16" => Ok(Self::sp16()),
            "rrggbb" => Ok(Self::rrggbb()),
            "hhhhssbb" => Ok(Self::hhhhssbb()),
            "rrrgggbb" => Ok(Self::rrrgggbb()),
            _ => Err(PencilError::UnknownPalette(key.to_string())),
        }
    }

    /// Build a palette from a 1 pixel high strip, one color per column, left to right.
    pub fn from_strip(name: impl Into<String>, strip: &PixelBuffer) -> Result<Self> {
        if strip.height() != 1 {
            return Err(PencilError::InvalidPaletteStrip {
                height: strip.height(),
            });
        }
        let colors = (0..strip.width() as i32)
            .map(|x| strip.get(PixelPoint::new(x, 0)))
            .collect::<Vec<_>>();
        let name = name.into();
        log::info!("imported palette `{}` with {} colors", name, colors.len());
        Ok(Self::new(name, None, colors, 1))
    }

    /// Decode an image file and import it with [`Self::from_strip`].
    pub fn load_strip(path: &Path) -> Result<Self> {
        let image = image::open(path)?.to_rgba8();
        let strip = PixelBuffer::from_image(&image)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Imported".to_string());
        Self::from_strip(name, &strip)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn special_case(&self) -> Option<SpecialCase> {
        self.special_case
    }

    pub fn colors(&self) -> &[ColorComponents] {
        &self.colors
    }

    pub fn default_group_length(&self) -> usize {
        self.default_group_length
    }

    pub fn group_lengths(&self) -> &[usize] {
        &self.group_lengths
    }

    /// Lighter variant of `color`. Opacity is carried over untouched.
    pub fn highlight(&self, color: ColorComponents) -> ColorComponents {
        match self.special_case.and_then(SpecialCase::quanta) {
            Some(quanta) => {
                // Black has nothing to raise, so zero channels step up when every channel is saturated.
                let raise_zeros = [color.red, color.green, color.blue]
                    .iter()
                    .all(|&c| c == 0 || c == 255);
                let up = |c: u8, q: u8| {
                    if c == 0 {
                        if raise_zeros { q } else { 0 }
                    } else {
                        c.saturating_add(q)
                    }
                };
                ColorComponents {
                    red: up(color.red, quanta[0]),
                    green: up(color.green, quanta[1]),
                    blue: up(color.blue, quanta[2]),
                    ..color
                }
            }
            None => {
                let mut hsb = color.to_hsb();
                if hsb.brightness < 1.0 {
                    hsb.brightness = (hsb.brightness + BAND).min(1.0);
                } else {
                    hsb.saturation = (hsb.saturation - BAND).max(0.0);
                }
                hsb.to_components(color.opacity).with_space(color.color_space)
            }
        }
    }

    /// Darker variant of `color`. Opacity is carried over untouched.
    pub fn shadow(&self, color: ColorComponents) -> ColorComponents {
        match self.special_case.and_then(SpecialCase::quanta) {
            Some(quanta) => ColorComponents {
                red: color.red.saturating_sub(quanta[0]),
                green: color.green.saturating_sub(quanta[1]),
                blue: color.blue.saturating_sub(quanta[2]),
                ..color
            },
            None => {
                let mut hsb = color.to_hsb();
                hsb.brightness = (hsb.brightness - BAND).max(0.0);
                hsb.to_components(color.opacity).with_space(color.color_space)
            }
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::sp16()
    }
}

/// Evenly spaced channel levels, enumerated red, then green, then blue.
fn uniform_levels(red: u8, green: u8, blue: u8) -> Vec<ColorComponents> {
    let step = |levels: u8| 255 / (levels - 1);
    let mut colors = Vec::with_capacity(red as usize * green as usize * blue as usize);
    for r in 0..red {
        for g in 0..green {
            for b in 0..blue {
                colors.push(ColorComponents::rgba(
                    r * step(red),
                    g * step(green),
                    b * step(blue),
                    255,
                ));
            }
        }
    }
    colors
}
