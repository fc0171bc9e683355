//! Utility functions for crop geometry and pixel conversions.

pub mod safe_cast;

#[cfg(feature = "desktop")]
pub mod image_conversion;

use safe_cast::f32_to_i32_clamp;

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl CropBox {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Expand a face box by `margin` (fraction of its size) on each side, make it
/// square and keep it inside the frame.
///
/// The face mesh model expects a square crop with some context around the
/// detected face.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Precision loss acceptable for box dimensions
pub fn square_crop(face: CropBox, frame_width: i32, frame_height: i32, margin: f32) -> CropBox {
    let center_x = face.x as f32 + face.width as f32 / 2.0;
    let center_y = face.y as f32 + face.height as f32 / 2.0;
    let side = face.width.max(face.height) as f32 * (1.0 + 2.0 * margin);

    let max_side = frame_width.min(frame_height).max(0);
    let side = f32_to_i32_clamp(side, 0, max_side);

    let x = f32_to_i32_clamp(center_x - side as f32 / 2.0, 0, (frame_width - side).max(0));
    let y = f32_to_i32_clamp(center_y - side as f32 / 2.0, 0, (frame_height - side).max(0));

    CropBox::new(x, y, side, side)
}
