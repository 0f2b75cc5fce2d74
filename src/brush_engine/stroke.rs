use std::collections::{HashMap, HashSet};

use crate::app::tools::Tool;
use crate::canvas::buffer::PixelBuffer;
use crate::canvas::history::{PixelRecord, UndoAction};
use crate::utils::color::ColorComponents;
use crate::utils::profiler::ScopeTimer;
use crate::utils::vector::{PixelPoint, PixelSize};

/// An operation stays cancelable while it touched at most this many times the tool area.
pub const CANCELABLE_AREA_FACTOR: usize = 8;

/// Largest operation that can still be cancelled for a tool of `size`.
pub fn cancel_limit(size: PixelSize) -> usize {
    CANCELABLE_AREA_FACTOR.saturating_mul(size.area())
}

/// Minimum number of distinct stroke points before a closed stroke gets filled.
pub const FILL_PATH_MIN_POINTS: usize = 7;

/// Colors each pixel had before the current operation first touched it.
///
/// First write wins: painting the same pixel twice keeps the original color.
#[derive(Debug, Default, Clone)]
pub struct OperationDelta {
    before: HashMap<PixelPoint, ColorComponents>,
    order: Vec<PixelPoint>,
}

impl OperationDelta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `color` as the pre-operation color of `point` unless it is already known.
    pub fn record(&mut self, point: PixelPoint, color: ColorComponents) {
        if !self.before.contains_key(&point) {
            self.before.insert(point, color);
            self.order.push(point);
        }
    }

    /// Record the current color of `point`, then overwrite it.
    pub fn paint(&mut self, buffer: &mut PixelBuffer, point: PixelPoint, color: ColorComponents) {
        self.record(point, buffer.get(point));
        buffer.set(point, color);
    }

    pub fn contains(&self, point: PixelPoint) -> bool {
        self.before.contains_key(&point)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Touched points in first-touch order.
    pub fn points(&self) -> &[PixelPoint] {
        &self.order
    }

    /// Convert into the undo entry that repaints every touched pixel, or `None` if nothing was touched.
    pub fn into_action(self) -> Option<UndoAction> {
        if self.order.is_empty() {
            return None;
        }
        let Self { before, order } = self;
        let pixels = order
            .into_iter()
            .filter_map(|point| before.get(&point).map(|&color| PixelRecord { point, color }))
            .collect();
        Some(UndoAction::Repaint { pixels })
    }

    /// Put every touched pixel back to its pre-operation color.
    pub fn restore(self, buffer: &mut PixelBuffer) {
        let _timer = ScopeTimer::new("restore_delta");
        for point in &self.order {
            if let Some(&color) = self.before.get(point) {
                buffer.set(*point, color);
            }
        }
    }
}

/// Gesture bookkeeping for one begin/continue/end sequence.
#[derive(Debug)]
pub struct StrokeState {
    pub tool: Tool,
    pub first_point: PixelPoint,
    pub last_point: PixelPoint,
    path: Vec<PixelPoint>,
    seen: HashSet<PixelPoint>,
    /// Canvas as it was when a move gesture began.
    pub move_snapshot: Option<PixelBuffer>,
    pub move_offset: PixelPoint,
    _timer: ScopeTimer,
}

impl StrokeState {
    pub fn new(tool: Tool, start: PixelPoint) -> Self {
        let mut stroke = Self {
            tool,
            first_point: start,
            last_point: start,
            path: Vec::new(),
            seen: HashSet::new(),
            move_snapshot: None,
            move_offset: PixelPoint::default(),
            _timer: ScopeTimer::new("stroke"),
        };
        stroke.add_point(start);
        stroke
    }

    /// Append a sample. Repeated points keep their first position in the path.
    pub fn add_point(&mut self, point: PixelPoint) {
        self.last_point = point;
        if self.seen.insert(point) {
            self.path.push(point);
        }
    }

    /// Distinct stroke points in input order.
    pub fn path(&self) -> &[PixelPoint] {
        &self.path
    }

    /// Whether the stroke is long enough and nearly closed, so its interior can be filled.
    pub fn forms_closed_loop(&self) -> bool {
        self.path.len() >= FILL_PATH_MIN_POINTS
            && self.first_point.chebyshev_distance(self.last_point) <= 1
    }

    /// Whether discarding `delta` would throw away only a small edit.
    pub fn cancelable(&self, delta: &OperationDelta) -> bool {
        delta.len() <= cancel_limit(self.tool.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_write_wins() {
        let mut buffer = PixelBuffer::new(2, 2).unwrap();
        let point = PixelPoint::new(1, 0);
        let mut delta = OperationDelta::new();
        delta.paint(&mut buffer, point, ColorComponents::BLACK);
        delta.paint(&mut buffer, point, ColorComponents::WHITE);

        assert_eq!(delta.len(), 1);
        assert_eq!(buffer.get(point), ColorComponents::WHITE);
        let action = delta.into_action().unwrap();
        assert_eq!(
            action,
            UndoAction::Repaint {
                pixels: vec![PixelRecord {
                    point,
                    color: ColorComponents::CLEAR
                }]
            }
        );
    }

    #[test]
    fn restore_repaints_prior_colors() {
        let mut buffer = PixelBuffer::new(3, 3).unwrap();
        buffer.set(PixelPoint::new(0, 0), ColorComponents::WHITE);
        let original = buffer.clone();

        let mut delta = OperationDelta::new();
        for point in original.points() {
            delta.paint(&mut buffer, point, ColorComponents::BLACK);
        }
        delta.restore(&mut buffer);
        assert_eq!(buffer, original);
    }

    #[test]
    fn empty_delta_produces_no_action() {
        assert!(OperationDelta::new().into_action().is_none());
    }

    #[test]
    fn path_keeps_input_order_without_duplicates() {
        let mut stroke = StrokeState::new(Tool::Pencil(PixelSize::ONE), PixelPoint::new(0, 0));
        for (x, y) in [(1, 0), (2, 0), (1, 0), (2, 1)] {
            stroke.add_point(PixelPoint::new(x, y));
        }
        assert_eq!(
            stroke.path(),
            &[
                PixelPoint::new(0, 0),
                PixelPoint::new(1, 0),
                PixelPoint::new(2, 0),
                PixelPoint::new(2, 1)
            ]
        );
        assert_eq!(stroke.last_point, PixelPoint::new(2, 1));
    }

    #[test]
    fn loop_detection_needs_enough_points_and_a_near_close() {
        let ring = [(1, 0), (2, 0), (2, 1), (2, 2), (1, 2), (0, 2), (0, 1)];
        let mut stroke = StrokeState::new(Tool::Pencil(PixelSize::ONE), PixelPoint::new(0, 0));
        for (x, y) in ring[..5].iter().copied() {
            stroke.add_point(PixelPoint::new(x, y));
        }
        assert!(!stroke.forms_closed_loop());
        for (x, y) in ring[5..].iter().copied() {
            stroke.add_point(PixelPoint::new(x, y));
        }
        assert!(stroke.forms_closed_loop());

        let mut open = StrokeState::new(Tool::Pencil(PixelSize::ONE), PixelPoint::new(0, 0));
        for x in 1..10 {
            open.add_point(PixelPoint::new(x, 0));
        }
        assert!(!open.forms_closed_loop());
    }

    #[test]
    fn cancel_threshold_scales_with_tool_area() {
        let mut buffer = PixelBuffer::new(8, 8).unwrap();
        let stroke = StrokeState::new(Tool::Pencil(PixelSize::square(2)), PixelPoint::new(0, 0));
        let mut delta = OperationDelta::new();
        for point in buffer.points().take(32) {
            delta.paint(&mut buffer, point, ColorComponents::BLACK);
        }
        assert!(stroke.cancelable(&delta));
        delta.paint(&mut buffer, PixelPoint::new(7, 7), ColorComponents::BLACK);
        assert!(!stroke.cancelable(&delta));
    }

    #[test]
    fn cancel_limit_saturates_for_huge_tools() {
        let huge = PixelSize::square(i32::MAX);
        assert!(cancel_limit(huge) >= huge.area());
        assert_eq!(cancel_limit(PixelSize::square(3)), 72);
    }

    #[test]
    fn far_apart_points_do_not_close_a_loop() {
        let mut stroke = StrokeState::new(Tool::Pencil(PixelSize::ONE), PixelPoint::new(i32::MIN, 0));
        for x in 0..7 {
            stroke.add_point(PixelPoint::new(x, x));
        }
        stroke.add_point(PixelPoint::new(i32::MAX, 0));
        assert!(!stroke.forms_closed_loop());
    }
}
