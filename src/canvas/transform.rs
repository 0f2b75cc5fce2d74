//! Whole-canvas geometric and tonal transforms.
//!
//! These work directly on a [`PixelBuffer`] and do not record undo state; the
//! document wraps them in history entries.

use serde::{Deserialize, Serialize};

use crate::canvas::buffer::PixelBuffer;
use crate::utils::color::ColorComponents;
use crate::utils::vector::PixelPoint;

/// Output levels per channel produced by [`posterize_color`].
pub const POSTERIZE_LEVELS: u32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotateDirection {
    Left,
    Right,
}

impl RotateDirection {
    pub fn opposite(self) -> Self {
        match self {
            RotateDirection::Left => RotateDirection::Right,
            RotateDirection::Right => RotateDirection::Left,
        }
    }
}

/// Inclusive pixel rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    pub fn width(&self) -> usize {
        (self.right - self.left + 1) as usize
    }

    pub fn height(&self) -> usize {
        (self.bottom - self.top + 1) as usize
    }
}

/// Mirror the buffer in place. `vertical` mirrors rows top to bottom, otherwise columns.
pub fn flip(buffer: &mut PixelBuffer, vertical: bool) {
    let (w, h) = (buffer.width() as i32, buffer.height() as i32);
    if vertical {
        for y in 0..h / 2 {
            for x in 0..w {
                swap_pixels(buffer, PixelPoint::new(x, y), PixelPoint::new(x, h - 1 - y));
            }
        }
    } else {
        for y in 0..h {
            for x in 0..w / 2 {
                swap_pixels(buffer, PixelPoint::new(x, y), PixelPoint::new(w - 1 - x, y));
            }
        }
    }
}

fn swap_pixels(buffer: &mut PixelBuffer, a: PixelPoint, b: PixelPoint) {
    let ca = buffer.get(a);
    let cb = buffer.get(b);
    buffer.set(a, cb);
    buffer.set(b, ca);
}

/// Quarter turn. The result has width and height swapped.
pub fn rotate(buffer: &PixelBuffer, direction: RotateDirection) -> PixelBuffer {
    let (w, h) = (buffer.width() as i32, buffer.height() as i32);
    let mut rotated = PixelBuffer::blank(h as usize, w as usize);
    for y in 0..w {
        for x in 0..h {
            let source = match direction {
                RotateDirection::Right => PixelPoint::new(y, h - 1 - x),
                RotateDirection::Left => PixelPoint::new(w - 1 - y, x),
            };
            rotated.set(PixelPoint::new(x, y), buffer.get(source));
        }
    }
    rotated
}

/// Offset from `from` to `to` reduced onto a `width` x `height` torus, each axis in `0..len`.
pub fn wrap_offset(from: PixelPoint, to: PixelPoint, width: usize, height: usize) -> PixelPoint {
    let axis = |a: i32, b: i32, len: usize| {
        (i64::from(b) - i64::from(a)).rem_euclid(len.max(1) as i64) as i32
    };
    PixelPoint::new(axis(from.x, to.x, width), axis(from.y, to.y, height))
}

/// The shift equivalent to `delta` on a `width` x `height` torus, each axis in `0..len`.
pub fn wrap_delta(delta: PixelPoint, width: usize, height: usize) -> PixelPoint {
    wrap_offset(PixelPoint::default(), delta, width, height)
}

/// Clear `target` and draw `source` shifted by `delta`, wrapping around every edge.
pub fn shift_wrapped(source: &PixelBuffer, target: &mut PixelBuffer, delta: PixelPoint) {
    debug_assert_eq!(
        (source.width(), source.height()),
        (target.width(), target.height())
    );
    let (w, h) = (source.width() as i32, source.height() as i32);
    let shift = wrap_delta(delta, source.width(), source.height());
    target.clear();
    for point in source.points() {
        let moved = PixelPoint::new((point.x + shift.x) % w, (point.y + shift.y) % h);
        target.set(moved, source.get(point));
    }
}

/// Bounding box of every pixel whose opacity is not zero.
pub fn content_bounds(buffer: &PixelBuffer) -> Option<Bounds> {
    let (w, h) = (buffer.width() as i32, buffer.height() as i32);
    let row_has_content = |y: i32| (0..w).any(|x| buffer.get(PixelPoint::new(x, y)).opacity != 0);

    let top = (0..h).find(|&y| row_has_content(y))?;
    let bottom = (top..h).rev().find(|&y| row_has_content(y))?;

    let column_has_content =
        |x: i32| (top..=bottom).any(|y| buffer.get(PixelPoint::new(x, y)).opacity != 0);
    let left = (0..w).find(|&x| column_has_content(x))?;
    let right = (left..w).rev().find(|&x| column_has_content(x))?;

    Some(Bounds {
        left,
        top,
        right,
        bottom,
    })
}

/// Copy the inclusive `bounds` region into a newly allocated buffer.
pub fn crop(buffer: &PixelBuffer, bounds: Bounds) -> PixelBuffer {
    let mut cropped = PixelBuffer::blank(bounds.width(), bounds.height());
    for point in cropped.points() {
        let source = PixelPoint::new(point.x + bounds.left, point.y + bounds.top);
        cropped.set(point, buffer.get(source));
    }
    cropped
}

/// Snap each color channel to one of [`POSTERIZE_LEVELS`] evenly spaced values.
pub fn posterize_color(color: ColorComponents) -> ColorComponents {
    let steps = POSTERIZE_LEVELS - 1;
    let level = |c: u8| {
        let index = (c as u32 * steps + 127) / 255;
        (index * 255 / steps) as u8
    };
    ColorComponents {
        red: level(color.red),
        green: level(color.green),
        blue: level(color.blue),
        ..color
    }
}

/// Transparent pixels touching an opaque neighbour, paired with that neighbour's color.
///
/// Neighbours are tried in the order (x, y+1), (x+1, y), (x, y-1), (x-1, y).
pub fn outline_targets(buffer: &PixelBuffer) -> Vec<(PixelPoint, ColorComponents)> {
    const NEIGHBOURS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
    let mut targets = Vec::new();
    for point in buffer.points() {
        if buffer.get(point).opacity != 0 {
            continue;
        }
        let neighbour = NEIGHBOURS
            .iter()
            .map(|&(dx, dy)| point + PixelPoint::new(dx, dy))
            .filter(|&n| buffer.contains(n))
            .map(|n| buffer.get(n))
            .find(|c| c.opacity != 0);
        if let Some(color) = neighbour {
            targets.push((point, color));
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(width: usize, height: usize) -> PixelBuffer {
        let mut buffer = PixelBuffer::new(width, height).unwrap();
        for point in buffer.points() {
            let n = (point.y * width as i32 + point.x) as u8;
            buffer.set(point, ColorComponents::rgba(n, 0, 0, 255));
        }
        buffer
    }

    fn red_at(buffer: &PixelBuffer, x: i32, y: i32) -> u8 {
        buffer.get(PixelPoint::new(x, y)).red
    }

    #[test]
    fn vertical_flip_mirrors_rows() {
        let original = numbered(3, 4);
        let mut flipped = original.clone();
        flip(&mut flipped, true);
        for p in original.points() {
            assert_eq!(flipped.get(p), original.get(PixelPoint::new(p.x, 3 - p.y)));
        }
    }

    #[test]
    fn horizontal_flip_mirrors_columns() {
        let original = numbered(5, 2);
        let mut flipped = original.clone();
        flip(&mut flipped, false);
        for p in original.points() {
            assert_eq!(flipped.get(p), original.get(PixelPoint::new(4 - p.x, p.y)));
        }
        flip(&mut flipped, false);
        assert_eq!(flipped, original);
    }

    #[test]
    fn right_rotation_on_square_canvas() {
        let original = numbered(4, 4);
        let rotated = rotate(&original, RotateDirection::Right);
        for p in rotated.points() {
            assert_eq!(rotated.get(p), original.get(PixelPoint::new(p.y, 3 - p.x)));
        }
        // top-left moves to top-right
        assert_eq!(red_at(&rotated, 3, 0), red_at(&original, 0, 0));
    }

    #[test]
    fn non_square_rotation_swaps_dimensions_and_inverts() {
        let original = numbered(3, 2);
        let rotated = rotate(&original, RotateDirection::Right);
        assert_eq!((rotated.width(), rotated.height()), (2, 3));
        assert_eq!(red_at(&rotated, 1, 0), red_at(&original, 0, 0));
        assert_eq!(red_at(&rotated, 0, 0), red_at(&original, 0, 1));

        let back = rotate(&rotated, RotateDirection::Left);
        assert_eq!(back, original);
    }

    #[test]
    fn four_right_turns_are_identity() {
        let original = numbered(5, 3);
        let mut buffer = original.clone();
        for _ in 0..4 {
            buffer = rotate(&buffer, RotateDirection::Right);
        }
        assert_eq!(buffer, original);
    }

    #[test]
    fn shift_wraps_toroidally() {
        let original = numbered(4, 3);
        let mut moved = original.clone();
        shift_wrapped(&original, &mut moved, PixelPoint::new(1, -1));
        assert_eq!(red_at(&moved, 1, 2), red_at(&original, 0, 0));
        assert_eq!(red_at(&moved, 0, 0), red_at(&original, 3, 1));

        let mut back = moved.clone();
        shift_wrapped(&moved, &mut back, PixelPoint::new(-1, 1));
        assert_eq!(back, original);
    }

    #[test]
    fn extreme_deltas_reduce_without_overflow() {
        // i32::MAX = 4 * 536870911 + 3, i32::MIN = -(3 * 715827883) + 1
        assert_eq!(
            wrap_delta(PixelPoint::new(i32::MAX, i32::MIN), 4, 3),
            PixelPoint::new(3, 1)
        );
        assert_eq!(
            wrap_offset(PixelPoint::new(i32::MAX, 0), PixelPoint::new(i32::MIN, 0), 4, 3),
            PixelPoint::new(1, 0)
        );

        let original = numbered(4, 3);
        let mut moved = original.clone();
        shift_wrapped(&original, &mut moved, PixelPoint::new(i32::MAX, i32::MIN));
        let mut expected = original.clone();
        shift_wrapped(&original, &mut expected, PixelPoint::new(3, 1));
        assert_eq!(moved, expected);
    }

    #[test]
    fn bounds_cover_every_opaque_pixel() {
        let mut buffer = PixelBuffer::new(8, 8).unwrap();
        assert_eq!(content_bounds(&buffer), None);

        buffer.set(PixelPoint::new(2, 5), ColorComponents::BLACK);
        buffer.set(PixelPoint::new(6, 1), ColorComponents::rgba(0, 0, 0, 1));
        let bounds = content_bounds(&buffer).unwrap();
        assert_eq!(
            bounds,
            Bounds {
                left: 2,
                top: 1,
                right: 6,
                bottom: 5
            }
        );

        let cropped = crop(&buffer, bounds);
        assert_eq!((cropped.width(), cropped.height()), (5, 5));
        assert_eq!(cropped.get(PixelPoint::new(0, 4)), ColorComponents::BLACK);
        assert_eq!(cropped.get(PixelPoint::new(4, 0)).opacity, 1);
    }

    #[test]
    fn posterize_uses_four_monotonic_levels() {
        let mut previous = 0;
        let mut levels = std::collections::BTreeSet::new();
        for v in 0..=255u8 {
            let out = posterize_color(ColorComponents::rgba(v, v, v, 9));
            assert_eq!(out.opacity, 9);
            assert!(out.red >= previous);
            previous = out.red;
            levels.insert(out.red);
        }
        assert_eq!(levels.into_iter().collect::<Vec<_>>(), vec![0, 85, 170, 255]);
    }

    #[test]
    fn outline_prefers_the_pixel_below() {
        let mut buffer = PixelBuffer::new(3, 3).unwrap();
        let below = ColorComponents::rgba(1, 1, 1, 255);
        let right = ColorComponents::rgba(2, 2, 2, 255);
        buffer.set(PixelPoint::new(1, 2), below);
        buffer.set(PixelPoint::new(2, 1), right);

        let targets = outline_targets(&buffer);
        let center = targets
            .iter()
            .find(|(p, _)| *p == PixelPoint::new(1, 1))
            .map(|(_, c)| *c);
        assert_eq!(center, Some(below));
        assert!(targets.iter().all(|(p, _)| buffer.get(*p).opacity == 0));
        assert!(!targets.iter().any(|(p, _)| *p == PixelPoint::new(0, 0)));
    }
}
