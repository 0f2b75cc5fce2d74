use serde::{Deserialize, Serialize};

use crate::utils::vector::PixelSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tool {
    Pencil(PixelSize),
    Eraser(PixelSize),
    Fill,
    Move,
    Highlight(PixelSize),
    Shadow(PixelSize),
    Eyedropper,
}

impl Tool {
    /// Stamp footprint; tools without a brush act on a single pixel.
    pub fn size(&self) -> PixelSize {
        match self {
            Tool::Pencil(size) | Tool::Eraser(size) | Tool::Highlight(size) | Tool::Shadow(size) => {
                *size
            }
            Tool::Fill | Tool::Move | Tool::Eyedropper => PixelSize::ONE,
        }
    }

    /// Same variant, ignoring the brush size.
    pub fn same_kind(&self, other: &Tool) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tool::Pencil(_) => "pencil",
            Tool::Eraser(_) => "eraser",
            Tool::Fill => "fill",
            Tool::Move => "move",
            Tool::Highlight(_) => "highlight",
            Tool::Shadow(_) => "shadow",
            Tool::Eyedropper => "eyedropper",
        }
    }
}

impl Default for Tool {
    fn default() -> Self {
        Tool::Pencil(PixelSize::ONE)
    }
}
