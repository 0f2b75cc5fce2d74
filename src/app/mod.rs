pub mod document;
pub mod observer;
pub mod state;
pub mod tools;

pub use document::Document;
pub use observer::{DocumentObserver, NoopObserver};
pub use state::{DocumentSettings, DrawingModes};
pub use tools::Tool;
