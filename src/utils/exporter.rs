use std::path::Path;

use image::{ImageFormat, RgbaImage};
use rayon::prelude::*;

use crate::canvas::buffer::PixelBuffer;
use crate::error::Result;
use crate::utils::color::ColorComponents;
use crate::utils::profiler::ScopeTimer;
use crate::utils::vector::PixelPoint;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Tiff,
}

impl ExportFormat {
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Tiff => "TIFF",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Tiff => "tiff",
        }
    }

    /// Pick a format from the file extension, defaulting to PNG.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff") => {
                ExportFormat::Tiff
            }
            _ => ExportFormat::Png,
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            ExportFormat::Png => ImageFormat::Png,
            ExportFormat::Tiff => ImageFormat::Tiff,
        }
    }
}

/// Scaled, straight-alpha RGBA copy of `buffer`.
///
/// Scaling samples the nearest source pixel. With a background every pixel is composited
/// over it. Scale 1 without a background is a plain copy.
pub fn export(buffer: &PixelBuffer, scale: f64, background: Option<ColorComponents>) -> RgbaImage {
    let _timer = ScopeTimer::new("export");
    let scale = if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        log::warn!("invalid export scale {}, using 1", scale);
        1.0
    };
    if scale == 1.0 && background.is_none() {
        return buffer.to_image();
    }

    let out_w = ((buffer.width() as f64 * scale).round() as usize).max(1);
    let out_h = ((buffer.height() as f64 * scale).round() as usize).max(1);
    let max_x = buffer.width() as i32 - 1;
    let max_y = buffer.height() as i32 - 1;

    let mut image = RgbaImage::new(out_w as u32, out_h as u32);
    image
        .par_chunks_mut(out_w * 4)
        .enumerate()
        .for_each(|(dy, row)| {
            let sy = (((dy as f64 + 0.5) / scale) as i32).min(max_y);
            for (dx, px) in row.chunks_exact_mut(4).enumerate() {
                let sx = (((dx as f64 + 0.5) / scale) as i32).min(max_x);
                let mut color = buffer.get(PixelPoint::new(sx, sy));
                if let Some(bg) = background {
                    color = flatten(color, bg);
                }
                px.copy_from_slice(&[color.red, color.green, color.blue, color.opacity]);
            }
        });
    image
}

/// Straight-alpha "over" compositing of `top` onto `bottom`.
fn flatten(top: ColorComponents, bottom: ColorComponents) -> ColorComponents {
    let ta = top.opacity as f32 / 255.0;
    let ba = bottom.opacity as f32 / 255.0;
    let out_a = ta + ba * (1.0 - ta);
    if out_a <= 0.0 {
        return ColorComponents::CLEAR;
    }
    let mix = |t: u8, b: u8| {
        let v = (t as f32 * ta + b as f32 * ba * (1.0 - ta)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    ColorComponents {
        red: mix(top.red, bottom.red),
        green: mix(top.green, bottom.green),
        blue: mix(top.blue, bottom.blue),
        opacity: (out_a * 255.0).round() as u8,
        ..bottom
    }
}

/// Write an exported image to disk.
pub fn save_image(image: &RgbaImage, path: &Path, format: ExportFormat) -> Result<()> {
    image.save_with_format(path, format.image_format())?;
    log::info!(
        "saved {}x{} {} to {}",
        image.width(),
        image.height(),
        format.label(),
        path.display()
    );
    Ok(())
}

pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    save_image(image, path, ExportFormat::Png)
}
