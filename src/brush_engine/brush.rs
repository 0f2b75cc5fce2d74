use crate::app::observer::DocumentObserver;
use crate::app::state::DrawingModes;
use crate::brush_engine::stroke::OperationDelta;
use crate::canvas::buffer::PixelBuffer;
use crate::palette::Palette;
use crate::utils::color::ColorComponents;
use crate::utils::vector::{PixelPoint, PixelSize};

/// Stamps with a higher opacity are reported as a recently used color.
pub const RECENT_COLOR_MIN_OPACITY: u8 = 32;

/// Direction of a palette shading stamp.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Shading {
    Highlight,
    Shadow,
}

/// Part of a stamp that lies inside the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct StampRegion {
    x0: i32,
    y0: i32,
    width: i32,
    height: i32,
}

impl StampRegion {
    /// Clip a stamp anchored at its top-left corner. `None` when nothing overlaps.
    fn clip(buffer: &PixelBuffer, anchor: PixelPoint, size: PixelSize) -> Option<Self> {
        if size == PixelSize::ONE {
            return buffer.contains(anchor).then_some(Self {
                x0: anchor.x,
                y0: anchor.y,
                width: 1,
                height: 1,
            });
        }
        // i64 so huge brushes far off the canvas cannot overflow
        let (w, h) = (buffer.width() as i64, buffer.height() as i64);
        let (left, top) = (i64::from(anchor.x), i64::from(anchor.y));
        let right = left + i64::from(size.width()) - 1;
        let bottom = top + i64::from(size.height()) - 1;
        if left >= w || top >= h || right < 0 || bottom < 0 {
            return None;
        }
        let (x0, y0) = (left.max(0), top.max(0));
        Some(Self {
            x0: x0 as i32,
            y0: y0 as i32,
            width: (right.min(w - 1) - x0 + 1) as i32,
            height: (bottom.min(h - 1) - y0 + 1) as i32,
        })
    }

    fn points(self) -> impl Iterator<Item = PixelPoint> {
        (0..self.width).flat_map(move |dx| {
            (0..self.height).map(move |dy| PixelPoint::new(self.x0 + dx, self.y0 + dy))
        })
    }
}

/// Square pixel brush bound to one document for the duration of a call.
///
/// Writes go through the operation delta so the caller can later commit or cancel them.
pub struct Brush<'a> {
    buffer: &'a mut PixelBuffer,
    delta: &'a mut OperationDelta,
    modes: DrawingModes,
    observer: &'a mut dyn DocumentObserver,
}

impl<'a> Brush<'a> {
    pub fn new(
        buffer: &'a mut PixelBuffer,
        delta: &'a mut OperationDelta,
        modes: DrawingModes,
        observer: &'a mut dyn DocumentObserver,
    ) -> Self {
        Self {
            buffer,
            delta,
            modes,
            observer,
        }
    }

    /// Stamp `color` over a `size` rectangle whose top-left is `anchor`.
    ///
    /// Pixels already touched by the current operation are left alone. Symmetry and
    /// checkered modes apply to every pixel, including the mirrored ones.
    pub fn paint(&mut self, color: ColorComponents, anchor: PixelPoint, size: PixelSize) {
        let Some(region) = StampRegion::clip(self.buffer, anchor, size) else {
            return;
        };
        for point in region.points() {
            if self.delta.contains(point) {
                continue;
            }
            self.paint_mirrored(color, point);
        }

        if color.opacity > RECENT_COLOR_MIN_OPACITY {
            self.observer.color_used(color);
        }
        self.observer.painted(color, anchor);
    }

    /// Shade every untouched pixel of the stamp with the palette's highlight or shadow of
    /// its current color.
    pub fn shade(&mut self, palette: &Palette, anchor: PixelPoint, size: PixelSize, shading: Shading) {
        let Some(region) = StampRegion::clip(self.buffer, anchor, size) else {
            return;
        };
        for point in region.points() {
            if self.delta.contains(point) {
                continue;
            }
            let current = self.buffer.get(point);
            let shaded = match shading {
                Shading::Highlight => palette.highlight(current),
                Shading::Shadow => palette.shadow(current),
            };
            self.paint(shaded, point, PixelSize::ONE);
        }
    }

    fn paint_mirrored(&mut self, color: ColorComponents, point: PixelPoint) {
        let (w, h) = (self.buffer.width() as i32, self.buffer.height() as i32);
        self.dithered_paint(color, point);
        if self.modes.horizontal_symmetry {
            let mirrored = PixelPoint::new(point.x, h - 1 - point.y);
            self.dithered_paint(color, mirrored);
            if self.modes.vertical_symmetry {
                self.dithered_paint(color, PixelPoint::new(w - 1 - point.x, mirrored.y));
            }
        }
        if self.modes.vertical_symmetry {
            self.dithered_paint(color, PixelPoint::new(w - 1 - point.x, point.y));
        }
    }

    fn dithered_paint(&mut self, color: ColorComponents, point: PixelPoint) {
        if !self.modes.checkered_drawing || point.x % 2 != point.y % 2 {
            self.delta.paint(self.buffer, point, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::observer::NoopObserver;

    fn painted_points(buffer: &PixelBuffer) -> Vec<PixelPoint> {
        buffer
            .points()
            .filter(|&p| buffer.get(p).opacity != 0)
            .collect()
    }

    fn stamp(buffer: &mut PixelBuffer, modes: DrawingModes, anchor: PixelPoint, size: PixelSize) -> OperationDelta {
        let mut delta = OperationDelta::new();
        let mut observer = NoopObserver;
        Brush::new(buffer, &mut delta, modes, &mut observer).paint(
            ColorComponents::BLACK,
            anchor,
            size,
        );
        delta
    }

    #[test]
    fn partially_outside_stamp_is_clipped() {
        let mut buffer = PixelBuffer::new(10, 10).unwrap();
        let delta = stamp(
            &mut buffer,
            DrawingModes::default(),
            PixelPoint::new(-1, -1),
            PixelSize::square(3),
        );
        let mut points = painted_points(&buffer);
        points.sort_by_key(|p| (p.y, p.x));
        assert_eq!(
            points,
            vec![
                PixelPoint::new(0, 0),
                PixelPoint::new(1, 0),
                PixelPoint::new(0, 1),
                PixelPoint::new(1, 1)
            ]
        );
        assert_eq!(delta.len(), 4);
    }

    #[test]
    fn stamp_clipped_at_far_edges() {
        let mut buffer = PixelBuffer::new(4, 4).unwrap();
        stamp(
            &mut buffer,
            DrawingModes::default(),
            PixelPoint::new(3, 2),
            PixelSize::new(3, 5),
        );
        assert_eq!(painted_points(&buffer).len(), 2);
    }

    #[test]
    fn stamp_entirely_outside_is_ignored() {
        let mut buffer = PixelBuffer::new(4, 4).unwrap();
        for (anchor, size) in [
            (PixelPoint::new(-3, 0), PixelSize::square(3)),
            (PixelPoint::new(4, 0), PixelSize::square(2)),
            (PixelPoint::new(-1, 0), PixelSize::ONE),
            (PixelPoint::new(0, 4), PixelSize::ONE),
        ] {
            let delta = stamp(&mut buffer, DrawingModes::default(), anchor, size);
            assert!(delta.is_empty());
        }
        assert!(painted_points(&buffer).is_empty());
    }

    #[test]
    fn huge_stamp_covers_the_canvas() {
        let mut buffer = PixelBuffer::new(4, 3).unwrap();
        let huge = PixelSize::square(i32::MAX);
        let delta = stamp(&mut buffer, DrawingModes::default(), PixelPoint::new(1, 1), huge);
        assert_eq!(delta.len(), 6);

        let mut buffer = PixelBuffer::new(4, 3).unwrap();
        let delta = stamp(&mut buffer, DrawingModes::default(), PixelPoint::new(i32::MIN, i32::MIN), huge);
        assert!(delta.is_empty());
        let delta = stamp(&mut buffer, DrawingModes::default(), PixelPoint::new(i32::MAX, 0), huge);
        assert!(delta.is_empty());
    }

    #[test]
    fn both_symmetries_paint_four_points() {
        let mut buffer = PixelBuffer::new(8, 8).unwrap();
        let modes = DrawingModes {
            vertical_symmetry: true,
            horizontal_symmetry: true,
            ..DrawingModes::default()
        };
        stamp(&mut buffer, modes, PixelPoint::new(2, 3), PixelSize::ONE);
        let mut points = painted_points(&buffer);
        points.sort_by_key(|p| (p.x, p.y));
        assert_eq!(
            points,
            vec![
                PixelPoint::new(2, 3),
                PixelPoint::new(2, 4),
                PixelPoint::new(5, 3),
                PixelPoint::new(5, 4)
            ]
        );
    }

    #[test]
    fn vertical_symmetry_alone_mirrors_columns() {
        let mut buffer = PixelBuffer::new(5, 3).unwrap();
        let modes = DrawingModes {
            vertical_symmetry: true,
            ..DrawingModes::default()
        };
        stamp(&mut buffer, modes, PixelPoint::new(0, 1), PixelSize::ONE);
        assert_eq!(
            painted_points(&buffer),
            vec![PixelPoint::new(0, 1), PixelPoint::new(4, 1)]
        );
    }

    #[test]
    fn checkered_mode_paints_only_odd_parity() {
        let mut buffer = PixelBuffer::new(4, 4).unwrap();
        let modes = DrawingModes {
            checkered_drawing: true,
            ..DrawingModes::default()
        };
        stamp(&mut buffer, modes, PixelPoint::new(0, 0), PixelSize::square(4));
        let points = painted_points(&buffer);
        assert_eq!(points.len(), 8);
        assert!(points.iter().all(|p| p.x % 2 != p.y % 2));
    }

    #[test]
    fn shading_uses_each_pixels_own_color() {
        let mut buffer = PixelBuffer::new(2, 1).unwrap();
        buffer.set(PixelPoint::new(0, 0), ColorComponents::rgba(85, 85, 85, 255));
        buffer.set(PixelPoint::new(1, 0), ColorComponents::rgba(170, 0, 0, 255));
        let palette = Palette::rrggbb();

        let mut delta = OperationDelta::new();
        let mut observer = NoopObserver;
        Brush::new(&mut buffer, &mut delta, DrawingModes::default(), &mut observer).shade(
            &palette,
            PixelPoint::new(0, 0),
            PixelSize::new(2, 1),
            Shading::Shadow,
        );
        assert_eq!(buffer.get(PixelPoint::new(0, 0)), ColorComponents::rgba(0, 0, 0, 255));
        assert_eq!(buffer.get(PixelPoint::new(1, 0)), ColorComponents::rgba(85, 0, 0, 255));
        assert_eq!(delta.len(), 2);
    }

    #[derive(Default)]
    struct Recorder {
        used: Vec<ColorComponents>,
        painted: usize,
    }

    impl DocumentObserver for Recorder {
        fn color_used(&mut self, color: ColorComponents) {
            self.used.push(color);
        }

        fn painted(&mut self, _color: ColorComponents, _point: PixelPoint) {
            self.painted += 1;
        }
    }

    #[test]
    fn faint_colors_are_not_reported_as_recent() {
        let mut buffer = PixelBuffer::new(4, 4).unwrap();
        let mut delta = OperationDelta::new();
        let mut recorder = Recorder::default();
        let mut brush = Brush::new(&mut buffer, &mut delta, DrawingModes::default(), &mut recorder);
        brush.paint(ColorComponents::rgba(1, 2, 3, 32), PixelPoint::new(0, 0), PixelSize::ONE);
        brush.paint(ColorComponents::rgba(1, 2, 3, 33), PixelPoint::new(1, 0), PixelSize::ONE);

        assert_eq!(recorder.used, vec![ColorComponents::rgba(1, 2, 3, 33)]);
        assert_eq!(recorder.painted, 2);
    }
}
