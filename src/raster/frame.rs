use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::Canvas;
use crate::foundation::error::{PackError, PackResult};

/// A monochrome frame: row-major pixels where `true` is foreground.
///
/// Frames are immutable once built. Every constructor validates the pixel count against the
/// dimensions, and the image-based constructors additionally require a strict two-color input;
/// thresholding is the external pipeline's job, never this type's.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterFrame {
    width: u32,
    height: u32,
    pixels: Vec<bool>,
}

impl RasterFrame {
    /// Build a frame from already-binary pixels.
    pub fn from_bits(width: u32, height: u32, pixels: Vec<bool>) -> PackResult<Self> {
        let canvas = Canvas::new(width, height)?;
        if pixels.len() != canvas.pixel_count() {
            return Err(PackError::invalid_frame(format!(
                "expected {} pixels for {canvas}, got {}",
                canvas.pixel_count(),
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// All-background frame.
    pub fn blank(width: u32, height: u32) -> PackResult<Self> {
        let canvas = Canvas::new(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![false; canvas.pixel_count()],
        })
    }

    /// Build a frame from straight RGBA8 bytes.
    ///
    /// The buffer may hold at most two distinct colors. Pure opaque black maps to foreground,
    /// anything else to background.
    pub fn from_rgba8(width: u32, height: u32, rgba: &[u8]) -> PackResult<Self> {
        let canvas = Canvas::new(width, height)?;
        if rgba.len() != canvas.pixel_count() * 4 {
            return Err(PackError::invalid_frame(format!(
                "rgba8 buffer size mismatch: got {} bytes, expected {} for {canvas}",
                rgba.len(),
                canvas.pixel_count() * 4
            )));
        }

        let mut palette: [Option<[u8; 4]>; 2] = [None, None];
        let mut pixels = Vec::with_capacity(canvas.pixel_count());
        for px in rgba.chunks_exact(4) {
            let color = [px[0], px[1], px[2], px[3]];
            match palette {
                [Some(a), _] if a == color => {}
                [_, Some(b)] if b == color => {}
                [None, _] => palette[0] = Some(color),
                [Some(_), None] => palette[1] = Some(color),
                [Some(a), Some(b)] => {
                    return Err(PackError::invalid_frame(format!(
                        "frame is not reduced to two colors: found {color:?} besides {a:?} and {b:?}"
                    )));
                }
            }
            pixels.push(is_foreground(color));
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a frame from a decoded image.
    pub fn from_image(img: &image::DynamicImage) -> PackResult<Self> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(width, height, rgba.as_raw())
    }

    /// Decode an image file written by the external pipeline.
    pub fn open(path: &Path) -> PackResult<Self> {
        let img = image::open(path)
            .with_context(|| format!("decode raster frame '{}'", path.display()))?;
        Self::from_image(&img).map_err(|e| match e {
            PackError::InvalidFrameFormat(msg) => {
                PackError::invalid_frame(format!("'{}': {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Frame dimensions as a [`Canvas`].
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Pixel at `(x, y)`; `None` outside the frame.
    pub fn get(&self, x: u32, y: u32) -> Option<bool> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Borrow all pixels, row-major.
    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    /// Iterate rows top-to-bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.pixels.chunks_exact(self.width as usize)
    }
}

fn is_foreground(color: [u8; 4]) -> bool {
    color == [0, 0, 0, 255]
}

#[cfg(test)]
#[path = "../../tests/unit/raster/frame.rs"]
mod tests;
