/// Failures at the edges of the editor: files, codecs and configuration.
///
/// Editing operations themselves never fail; they clip, truncate or do nothing.
#[derive(Debug, thiserror::Error)]
pub enum PencilError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid canvas dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("palette strip must be 1 pixel high, got {height}")]
    InvalidPaletteStrip { height: usize },

    #[error("unknown palette `{0}`")]
    UnknownPalette(String),

    #[error("invalid hex color `{0}`")]
    InvalidHex(String),
}

pub type Result<T> = std::result::Result<T, PencilError>;
