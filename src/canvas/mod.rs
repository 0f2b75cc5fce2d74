pub mod buffer;
pub mod history;
pub mod transform;

pub use buffer::PixelBuffer;
pub use history::{History, PixelRecord, UndoAction};
