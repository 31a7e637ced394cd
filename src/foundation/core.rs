use crate::foundation::error::{PackError, PackResult};

/// Absolute 0-based frame index within a pack.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex, // exclusive
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> PackResult<Self> {
        if start.0 > end.0 {
            return Err(PackError::validation(format!(
                "frame range start ({}) must be <= end ({})",
                start.0, end.0
            )));
        }
        Ok(Self { start, end })
    }

    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }
}

/// Pack canvas dimensions in pixels. Every frame of a pack shares one canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas with non-zero dimensions.
    pub fn new(width: u32, height: u32) -> PackResult<Self> {
        let canvas = Self { width, height };
        canvas.validate()?;
        Ok(canvas)
    }

    /// Reject zero-sized canvases.
    pub fn validate(self) -> PackResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PackError::validation(format!(
                "canvas width/height must be non-zero (got {}x{})",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Number of packed bytes per row: `ceil(width / 8)`.
    pub fn row_bytes(self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    /// Total pixel count.
    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl Default for Canvas {
    /// The 128x64 monochrome display the anchor table is laid out for.
    fn default() -> Self {
        Self {
            width: 128,
            height: 64,
        }
    }
}

impl std::fmt::Display for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
