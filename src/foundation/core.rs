use crate::foundation::error::{MergeError, MergeResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// One straight-alpha RGBA8 pixel.
pub type Rgba = [u8; 4];

/// Largest width or height a GIF logical screen can describe.
pub const MAX_GIF_DIMENSION: u32 = u16::MAX as u32;

/// Largest pixel count a baked transform may allocate.
pub const MAX_FRAME_PIXELS: u64 = 1 << 26;

/// Default output quantum in time units (4 × 10 ms, roughly 24 fps).
pub const DEFAULT_TICK: u32 = 4;

/// Stable handle of one merge item. Assigned monotonically and never reused.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ItemId(pub u64);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Output frame size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// Build a canvas that a GIF logical screen can represent.
    pub fn new(width: u32, height: u32) -> MergeResult<Self> {
        let canvas = Self { width, height };
        canvas.validate()?;
        Ok(canvas)
    }

    pub fn validate(self) -> MergeResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MergeError::validation("canvas width/height must be non-zero"));
        }
        if self.width > MAX_GIF_DIMENSION || self.height > MAX_GIF_DIMENSION {
            return Err(MergeError::validation(format!(
                "canvas {}x{} exceeds the GIF limit of {MAX_GIF_DIMENSION}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    pub fn pixel_count(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

/// What an item does once its assigned duration has elapsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndOfLife {
    /// Keep cycling source frames.
    Loop,
    /// Freeze on the last resolved frame.
    #[default]
    Forwards,
    /// Stop drawing the item.
    Hidden,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
