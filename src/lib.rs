pub mod app;
pub mod brush_engine;
pub mod canvas;
pub mod error;
pub mod palette;
pub mod utils;

pub use app::{Document, DocumentObserver, DocumentSettings, DrawingModes, Tool};
pub use canvas::transform::RotateDirection;
pub use canvas::{History, PixelBuffer, UndoAction};
pub use error::{PencilError, Result};
pub use palette::{Palette, SpecialCase};
pub use utils::color::{ColorComponents, ColorSpace};
pub use utils::vector::{PixelPoint, PixelSize};
