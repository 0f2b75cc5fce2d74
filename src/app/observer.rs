use crate::app::tools::Tool;
use crate::utils::color::ColorComponents;
use crate::utils::vector::PixelPoint;

/// Collaborators that react to document changes: rendering, recent colors, undo UI.
///
/// Every callback defaults to doing nothing so implementors pick what they need.
pub trait DocumentObserver {
    /// A committed mutation produced a new raster.
    fn buffer_changed(&mut self) {}

    /// A brush stamp used a color with opacity above the recent-color threshold.
    fn color_used(&mut self, _color: ColorComponents) {}

    /// A brush stamp was applied at `point`.
    fn painted(&mut self, _color: ColorComponents, _point: PixelPoint) {}

    /// An entry was pushed to or popped from the undo log.
    fn undo_stack_changed(&mut self) {}

    fn eyedropped(&mut self, _color: ColorComponents, _point: PixelPoint) {}

    fn tool_changed(&mut self, _tool: Tool) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl DocumentObserver for NoopObserver {}
