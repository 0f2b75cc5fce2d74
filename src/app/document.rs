//! Document controller: owns the raster, the active tool and palette, and turns input
//! events into buffer mutations recorded in the undo log.

use image::RgbaImage;

use crate::app::observer::{DocumentObserver, NoopObserver};
use crate::app::state::{DocumentSettings, DrawingModes};
use crate::app::tools::Tool;
use crate::brush_engine::brush::{Brush, Shading};
use crate::brush_engine::fill;
use crate::brush_engine::stroke::{OperationDelta, StrokeState, cancel_limit};
use crate::canvas::buffer::PixelBuffer;
use crate::canvas::history::{History, UndoAction};
use crate::canvas::transform::{self, RotateDirection};
use crate::error::Result;
use crate::palette::Palette;
use crate::utils::color::ColorComponents;
use crate::utils::exporter;
use crate::utils::profiler::ScopeTimer;
use crate::utils::vector::{PixelPoint, PixelSize};

pub struct Document {
    buffer: PixelBuffer,
    palette: Palette,
    tool: Tool,
    previous_tool: Tool,
    tool_color: ColorComponents,
    modes: DrawingModes,
    history: History,
    operation: OperationDelta,
    stroke: Option<StrokeState>,
    hover_point: Option<PixelPoint>,
    observer: Box<dyn DocumentObserver>,
}

impl Document {
    /// Blank, fully transparent document.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Ok(Self::from_buffer(PixelBuffer::new(width, height)?))
    }

    /// Wrap an existing raster, for example a decoded image.
    pub fn from_buffer(buffer: PixelBuffer) -> Self {
        Self {
            buffer,
            palette: Palette::default(),
            tool: Tool::default(),
            previous_tool: Tool::Eraser(PixelSize::ONE),
            tool_color: ColorComponents::BLACK,
            modes: DrawingModes::default(),
            history: History::new(),
            operation: OperationDelta::new(),
            stroke: None,
            hover_point: None,
            observer: Box::new(NoopObserver),
        }
    }

    pub fn from_settings(settings: &DocumentSettings) -> Result<Self> {
        let mut document = Self::new(settings.width, settings.height)?;
        document.palette = Palette::builtin(&settings.palette)?;
        document.tool_color = settings.tool_color();
        document.modes = settings.modes;
        log::debug!(
            "new {}x{} document with palette `{}`",
            settings.width,
            settings.height,
            document.palette.name()
        );
        Ok(document)
    }

    pub fn with_observer(mut self, observer: impl DocumentObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn set_observer(&mut self, observer: Box<dyn DocumentObserver>) {
        self.observer = observer;
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn width(&self) -> usize {
        self.buffer.width()
    }

    pub fn height(&self) -> usize {
        self.buffer.height()
    }

    /// Current color at `point`, `None` outside the canvas.
    pub fn color_at(&self, point: PixelPoint) -> Option<ColorComponents> {
        self.buffer.contains(point).then(|| self.buffer.get(point))
    }

    /// Independent copy of the raster for rendering or export off the editing thread.
    pub fn snapshot(&self) -> PixelBuffer {
        self.buffer.clone()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn set_palette(&mut self, palette: Palette) {
        log::debug!("palette changed to `{}`", palette.name());
        self.palette = palette;
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn previous_tool(&self) -> Tool {
        self.previous_tool
    }

    /// Select a tool. Switching to a different kind of tool remembers the old one.
    pub fn set_tool(&mut self, tool: Tool) {
        if !tool.same_kind(&self.tool) {
            self.previous_tool = self.tool;
        }
        self.tool = tool;
        log::debug!("selected {} tool", tool.label());
        self.observer.tool_changed(tool);
    }

    /// Toggle back to the previously selected kind of tool.
    pub fn swap_to_previous_tool(&mut self) {
        self.set_tool(self.previous_tool);
    }

    pub fn tool_color(&self) -> ColorComponents {
        self.tool_color
    }

    pub fn set_tool_color(&mut self, color: ColorComponents) {
        self.tool_color = color;
    }

    /// Parse and apply a hex tool color. Invalid input keeps the previous color.
    pub fn set_tool_color_hex(&mut self, hex: &str) -> bool {
        match ColorComponents::from_hex(hex) {
            Some(color) => {
                self.tool_color = color;
                true
            }
            None => {
                log::debug!("ignoring invalid hex color `{}`", hex);
                false
            }
        }
    }

    pub fn modes(&self) -> DrawingModes {
        self.modes
    }

    pub fn modes_mut(&mut self) -> &mut DrawingModes {
        &mut self.modes
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn hover_point(&self) -> Option<PixelPoint> {
        self.hover_point
    }

    /// Track the hovered pixel. Points outside the canvas clear it.
    pub fn set_hover(&mut self, point: PixelPoint) {
        self.hover_point = self.buffer.contains(point).then_some(point);
    }

    pub fn clear_hover(&mut self) {
        self.hover_point = None;
    }

    pub fn is_stroking(&self) -> bool {
        self.stroke.is_some()
    }

    /// Pixels touched by the operation in progress.
    pub fn pending_pixels(&self) -> usize {
        self.operation.len()
    }

    // --- Stroke lifecycle ---

    /// Start a gesture with the current tool. Any gesture still open is committed first.
    pub fn begin_stroke(&mut self, point: PixelPoint) {
        self.settle();
        let mut stroke = StrokeState::new(self.tool, point);
        match stroke.tool {
            Tool::Move => stroke.move_snapshot = Some(self.buffer.clone()),
            Tool::Fill | Tool::Eyedropper => {}
            Tool::Pencil(_) | Tool::Eraser(_) | Tool::Highlight(_) | Tool::Shadow(_) => {
                self.apply_sample(&mut stroke, point);
                self.observer.buffer_changed();
            }
        }
        self.stroke = Some(stroke);
    }

    /// Feed a batch of samples to the open gesture.
    pub fn continue_points(&mut self, points: &[PixelPoint]) {
        let Some(mut stroke) = self.stroke.take() else {
            log::trace!("ignoring {} points outside a stroke", points.len());
            return;
        };
        for &point in points {
            stroke.add_point(point);
            self.apply_sample(&mut stroke, point);
        }
        if let Some(&last) = points.last() {
            if !matches!(stroke.tool, Tool::Move) {
                self.set_hover(last);
            }
        }
        self.stroke = Some(stroke);
        if !points.is_empty() {
            self.observer.buffer_changed();
        }
    }

    /// Finish the gesture at `point` and record it as one undo step.
    pub fn end_stroke(&mut self, point: PixelPoint) {
        let Some(mut stroke) = self.stroke.take() else {
            log::trace!("end_stroke without an open stroke");
            return;
        };
        stroke.add_point(point);
        match stroke.tool {
            Tool::Eyedropper => {
                self.request_eyedrop(point);
            }
            Tool::Fill => {
                self.fill(point);
            }
            Tool::Pencil(_) => {
                self.apply_sample(&mut stroke, point);
                if self.modes.fill_drawn_paths {
                    self.fill_stroke_path(&stroke);
                }
            }
            Tool::Eraser(_) | Tool::Highlight(_) | Tool::Shadow(_) | Tool::Move => {
                self.apply_sample(&mut stroke, point);
            }
        }
        self.commit_stroke(stroke);
        self.hover_point = None;
    }

    /// Abort the open gesture.
    ///
    /// Small edits are rolled back and `true` is returned. Edits larger than the cancel
    /// threshold are committed as a normal undo step instead.
    pub fn cancel_stroke(&mut self) -> bool {
        self.hover_point = None;
        match self.stroke.take() {
            Some(StrokeState {
                move_snapshot: Some(snapshot),
                ..
            }) => {
                self.buffer = snapshot;
                self.observer.buffer_changed();
                true
            }
            Some(stroke) => {
                let cancelable = stroke.cancelable(&self.operation);
                self.cancel_or_commit(cancelable)
            }
            None => {
                let cancelable = self.operation.len() <= cancel_limit(self.tool.size());
                self.cancel_or_commit(cancelable)
            }
        }
    }

    fn cancel_or_commit(&mut self, cancelable: bool) -> bool {
        if self.operation.is_empty() {
            return false;
        }
        if cancelable {
            let delta = std::mem::take(&mut self.operation);
            log::debug!("cancelled operation touching {} pixels", delta.len());
            delta.restore(&mut self.buffer);
            self.observer.buffer_changed();
            true
        } else {
            log::info!(
                "operation touching {} pixels is too large to cancel, keeping it",
                self.operation.len()
            );
            self.commit_operation();
            false
        }
    }

    fn apply_sample(&mut self, stroke: &mut StrokeState, point: PixelPoint) {
        match stroke.tool {
            Tool::Pencil(size) => self.brush_paint(self.tool_color, point, size),
            Tool::Eraser(size) => self.brush_paint(ColorComponents::CLEAR, point, size),
            Tool::Highlight(size) => self.highlight(point, size),
            Tool::Shadow(size) => self.shadow(point, size),
            Tool::Move => {
                stroke.move_offset = transform::wrap_offset(
                    stroke.first_point,
                    point,
                    self.buffer.width(),
                    self.buffer.height(),
                );
                if let Some(snapshot) = &stroke.move_snapshot {
                    transform::shift_wrapped(snapshot, &mut self.buffer, stroke.move_offset);
                }
            }
            Tool::Fill | Tool::Eyedropper => {}
        }
    }

    fn commit_stroke(&mut self, stroke: StrokeState) {
        if let Tool::Move = stroke.tool {
            if stroke.move_offset != PixelPoint::default() {
                self.push_entry(UndoAction::Move {
                    delta: -stroke.move_offset,
                });
                self.observer.buffer_changed();
            }
        }
        self.commit_operation();
    }

    /// Commit whatever gesture or loose operation is still open.
    fn settle(&mut self) {
        if let Some(stroke) = self.stroke.take() {
            self.commit_stroke(stroke);
        }
        self.commit_operation();
    }

    // --- Operation primitives ---

    /// Write one pixel into the current operation. Points outside the canvas are ignored.
    pub fn simple_paint(&mut self, color: ColorComponents, point: PixelPoint) {
        if !self.buffer.contains(point) {
            log::trace!("rejected paint outside canvas at {:?}", point);
            return;
        }
        self.operation.paint(&mut self.buffer, point, color);
    }

    /// Stamp `color` with its top-left at `point`, honoring symmetry and checkered modes.
    pub fn brush_paint(&mut self, color: ColorComponents, point: PixelPoint, size: PixelSize) {
        Brush::new(
            &mut self.buffer,
            &mut self.operation,
            self.modes,
            self.observer.as_mut(),
        )
        .paint(color, point, size);
    }

    pub fn highlight(&mut self, point: PixelPoint, size: PixelSize) {
        self.shade(point, size, Shading::Highlight);
    }

    pub fn shadow(&mut self, point: PixelPoint, size: PixelSize) {
        self.shade(point, size, Shading::Shadow);
    }

    fn shade(&mut self, point: PixelPoint, size: PixelSize, shading: Shading) {
        Brush::new(
            &mut self.buffer,
            &mut self.operation,
            self.modes,
            self.observer.as_mut(),
        )
        .shade(&self.palette, point, size, shading);
    }

    /// Flood fill from `point` with the tool color into the current operation.
    pub fn fill(&mut self, point: PixelPoint) -> usize {
        fill::flood_fill(&mut self.buffer, &mut self.operation, point, self.tool_color)
    }

    /// Fill the interior of the open stroke if it nearly closes a loop.
    pub fn fill_drawn_path(&mut self) -> usize {
        let Some(stroke) = self.stroke.take() else {
            return 0;
        };
        let painted = self.fill_stroke_path(&stroke);
        self.stroke = Some(stroke);
        painted
    }

    fn fill_stroke_path(&mut self, stroke: &StrokeState) -> usize {
        if !stroke.forms_closed_loop() {
            return 0;
        }
        let painted = fill::fill_polygon(
            &mut self.buffer,
            &mut self.operation,
            stroke.path(),
            self.tool_color,
        );
        log::debug!("filled drawn path with {} pixels", painted);
        painted
    }

    /// Redraw the move snapshot shifted by `delta` during a move gesture.
    pub fn move_to(&mut self, delta: PixelPoint) {
        let Some(stroke) = self.stroke.as_mut() else {
            return;
        };
        let Some(snapshot) = &stroke.move_snapshot else {
            return;
        };
        stroke.move_offset = transform::wrap_delta(delta, snapshot.width(), snapshot.height());
        transform::shift_wrapped(snapshot, &mut self.buffer, stroke.move_offset);
        self.observer.buffer_changed();
    }

    /// Turn the current operation into one undo step. Returns false when nothing was touched.
    pub fn commit_operation(&mut self) -> bool {
        let delta = std::mem::take(&mut self.operation);
        let pixels = delta.len();
        match delta.into_action() {
            Some(action) => {
                log::debug!("committed operation touching {} pixels", pixels);
                self.push_entry(action);
                self.observer.buffer_changed();
                true
            }
            None => false,
        }
    }

    // --- Discrete requests ---

    /// Fill from `point` as a complete undo step. Returns the number of pixels painted.
    pub fn request_fill(&mut self, point: PixelPoint) -> usize {
        self.settle();
        let painted = self.fill(point);
        self.commit_operation();
        painted
    }

    /// Pick the color at `point` as the tool color. Only fully opaque pixels are picked.
    pub fn request_eyedrop(&mut self, point: PixelPoint) -> Option<ColorComponents> {
        let color = self.color_at(point).filter(|c| c.opacity == 255)?;
        self.tool_color = color;
        self.observer.eyedropped(color, point);
        Some(color)
    }

    /// Shift the whole canvas by `delta`, wrapping around the edges.
    ///
    /// Any delta is accepted; it is reduced modulo the canvas size first.
    pub fn request_move(&mut self, delta: PixelPoint) {
        let delta = transform::wrap_delta(delta, self.width(), self.height());
        self.perform(UndoAction::Move { delta });
    }

    pub fn request_flip(&mut self, vertical: bool) {
        self.perform(UndoAction::Flip { vertical });
    }

    /// Quarter turn. Non-square canvases swap width and height.
    pub fn request_rotate(&mut self, direction: RotateDirection) {
        self.perform(UndoAction::Rotate { direction });
    }

    /// Outline opaque shapes by painting transparent pixels next to them.
    ///
    /// Uses `color` when given, otherwise the palette shadow of the neighbouring color.
    pub fn request_outline(&mut self, color: Option<ColorComponents>) -> usize {
        self.settle();
        let _timer = ScopeTimer::new("outline");
        let targets = transform::outline_targets(&self.buffer);
        for &(point, neighbour) in &targets {
            let paint = color.unwrap_or_else(|| self.palette.shadow(neighbour));
            self.operation.paint(&mut self.buffer, point, paint);
        }
        self.commit_operation();
        targets.len()
    }

    /// Quantize every channel to four levels, transparent pixels included.
    pub fn request_posterize(&mut self) -> usize {
        self.settle();
        let _timer = ScopeTimer::new("posterize");
        for point in self.buffer.points() {
            let current = self.buffer.get(point);
            let posterized = transform::posterize_color(current);
            // raw channels, since every fully transparent color compares equal
            if posterized.channels() != current.channels() {
                self.operation.paint(&mut self.buffer, point, posterized);
            }
        }
        let changed = self.operation.len();
        self.commit_operation();
        changed
    }

    /// Crop to the bounding box of all non-transparent pixels.
    ///
    /// Returns false when there is nothing to trim.
    pub fn request_trim(&mut self) -> bool {
        self.settle();
        let _timer = ScopeTimer::new("trim");
        let Some(bounds) = transform::content_bounds(&self.buffer) else {
            log::debug!("trim skipped on a transparent canvas");
            return false;
        };
        if bounds.width() == self.buffer.width() && bounds.height() == self.buffer.height() {
            return false;
        }
        let cropped = transform::crop(&self.buffer, bounds);
        log::debug!(
            "trimmed {}x{} canvas to {}x{}",
            self.buffer.width(),
            self.buffer.height(),
            cropped.width(),
            cropped.height()
        );
        let previous = self.buffer.replace(cropped);
        self.hover_point = None;
        self.history.push_action(UndoAction::Replace { buffer: previous });
        self.observer.undo_stack_changed();
        self.observer.buffer_changed();
        true
    }

    /// Apply `action` and record its inverse.
    fn perform(&mut self, mut action: UndoAction) {
        self.settle();
        action.swap(&mut self.buffer);
        self.push_entry(action);
        self.observer.buffer_changed();
    }

    /// Record `action`. Observers hear about it only once it reaches the undo stack.
    fn push_entry(&mut self, action: UndoAction) {
        self.history.push_action(action);
        if self.history.grouping_level() == 0 {
            self.observer.undo_stack_changed();
        }
    }

    // --- Undo ---

    pub fn undo(&mut self) -> bool {
        self.settle();
        let done = self.history.undo(&mut self.buffer);
        if done {
            self.hover_point = None;
            self.observer.undo_stack_changed();
            self.observer.buffer_changed();
        }
        done
    }

    pub fn redo(&mut self) -> bool {
        self.settle();
        let done = self.history.redo(&mut self.buffer);
        if done {
            self.hover_point = None;
            self.observer.undo_stack_changed();
            self.observer.buffer_changed();
        }
        done
    }

    /// Collect the following operations into one undo step, until [`Self::end_undo_group`].
    pub fn begin_undo_group(&mut self) {
        self.settle();
        self.history.begin_group();
    }

    pub fn end_undo_group(&mut self) -> bool {
        self.settle();
        let recorded = self.history.end_group();
        if recorded && self.history.grouping_level() == 0 {
            self.observer.undo_stack_changed();
        }
        recorded
    }

    // --- Export ---

    /// Nearest-neighbor scaled copy, optionally flattened onto `background`.
    pub fn export(&self, scale: f64, background: Option<ColorComponents>) -> RgbaImage {
        exporter::export(&self.buffer, scale, background)
    }
}
