use std::fmt;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::{PencilError, Result};
use crate::utils::color::ColorComponents;
use crate::utils::vector::PixelPoint;

const BYTES_PER_PIXEL: usize = 4;
const ROW_ALIGNMENT: usize = 8;

/// Raw BGRA framebuffer backing a document.
///
/// Rows are padded so that every row holds a multiple of eight pixels. Padding bytes are
/// never written and stay zero, so two buffers with the same visible pixels compare equal.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBuffer", into = "RawBuffer")]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    row_stride: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a fully transparent buffer.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PencilError::InvalidDimensions { width, height });
        }
        Ok(Self::blank(width, height))
    }

    /// Allocate with dimensions already known to be non-zero.
    pub(crate) fn blank(width: usize, height: usize) -> Self {
        debug_assert!(width > 0 && height > 0);
        let row_stride = width.div_ceil(ROW_ALIGNMENT) * ROW_ALIGNMENT * BYTES_PER_PIXEL;
        Self {
            width,
            height,
            row_stride,
            data: vec![0; row_stride * height],
        }
    }

    /// Build a buffer from tightly packed straight-alpha RGBA bytes.
    pub fn from_rgba(width: usize, height: usize, rgba: &[u8]) -> Result<Self> {
        let mut buffer = Self::new(width, height)?;
        if rgba.len() != width * height * BYTES_PER_PIXEL {
            return Err(PencilError::InvalidDimensions { width, height });
        }
        for (idx, px) in rgba.chunks_exact(BYTES_PER_PIXEL).enumerate() {
            let point = PixelPoint::new((idx % width) as i32, (idx / width) as i32);
            buffer.set(point, ColorComponents::rgba(px[0], px[1], px[2], px[3]));
        }
        Ok(buffer)
    }

    pub fn from_image(image: &RgbaImage) -> Result<Self> {
        Self::from_rgba(image.width() as usize, image.height() as usize, image.as_raw())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes per row including alignment padding.
    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    /// Raw BGRA bytes including row padding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn contains(&self, point: PixelPoint) -> bool {
        point.x >= 0
            && point.y >= 0
            && (point.x as usize) < self.width
            && (point.y as usize) < self.height
    }

    #[inline]
    fn offset(&self, point: PixelPoint) -> usize {
        debug_assert!(
            self.contains(point),
            "pixel {:?} outside {}x{} buffer",
            point,
            self.width,
            self.height
        );
        self.row_stride * point.y as usize + BYTES_PER_PIXEL * point.x as usize
    }

    /// Read one pixel. Callers must have checked [`Self::contains`].
    #[inline]
    pub fn get(&self, point: PixelPoint) -> ColorComponents {
        let o = self.offset(point);
        let px = &self.data[o..o + BYTES_PER_PIXEL];
        ColorComponents::rgba(px[2], px[1], px[0], px[3])
    }

    /// Write one pixel. Callers must have checked [`Self::contains`].
    #[inline]
    pub fn set(&mut self, point: PixelPoint, color: ColorComponents) {
        let o = self.offset(point);
        self.data[o..o + BYTES_PER_PIXEL].copy_from_slice(&[
            color.blue,
            color.green,
            color.red,
            color.opacity,
        ]);
    }

    /// Swap in a whole new buffer, returning the old one.
    pub fn replace(&mut self, new_buffer: PixelBuffer) -> PixelBuffer {
        std::mem::replace(self, new_buffer)
    }

    /// Reset every pixel to fully transparent black.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Every coordinate of the buffer in row-major order.
    pub fn points(&self) -> impl Iterator<Item = PixelPoint> + use<> {
        let (width, height) = (self.width as i32, self.height as i32);
        (0..height).flat_map(move |y| (0..width).map(move |x| PixelPoint::new(x, y)))
    }

    /// Tightly packed straight-alpha RGBA bytes, row-major.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.width * self.height * BYTES_PER_PIXEL);
        for row in self.data.chunks_exact(self.row_stride) {
            for px in row[..self.width * BYTES_PER_PIXEL].chunks_exact(BYTES_PER_PIXEL) {
                bytes.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
            }
        }
        bytes
    }

    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let c = self.get(PixelPoint::new(x as i32, y as i32));
            image::Rgba([c.red, c.green, c.blue, c.opacity])
        })
    }
}

/// Serialized form: dimensions plus packed RGBA bytes.
#[derive(Serialize, Deserialize)]
struct RawBuffer {
    width: usize,
    height: usize,
    rgba: Vec<u8>,
}

impl TryFrom<RawBuffer> for PixelBuffer {
    type Error = PencilError;

    fn try_from(raw: RawBuffer) -> Result<Self> {
        Self::from_rgba(raw.width, raw.height, &raw.rgba)
    }
}

impl From<PixelBuffer> for RawBuffer {
    fn from(buffer: PixelBuffer) -> Self {
        RawBuffer {
            width: buffer.width,
            height: buffer.height,
            rgba: buffer.to_rgba(),
        }
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("row_stride", &self.row_stride)
            .finish_non_exhaustive()
    }
}
