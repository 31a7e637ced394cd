use crate::foundation::core::Canvas;
use crate::foundation::error::{PackError, PackResult};
use crate::raster::frame::RasterFrame;

/// Leading marker byte describing how the frame body is stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum FrameEncoding {
    /// Uncompressed rows.
    #[default]
    Raw = 0,
}

impl FrameEncoding {
    /// Parse a marker byte.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Raw),
            _ => None,
        }
    }
}

/// Bit-packed representation of one [`RasterFrame`].
///
/// Layout: one [`FrameEncoding`] marker byte, then `ceil(width / 8)` bytes per row for every
/// row top-to-bottom. Within a byte the leftmost pixel is bit 0; unused high bits of the last
/// byte in a row are zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackedFrame {
    bytes: Vec<u8>,
}

impl PackedFrame {
    /// Wrap bytes read back from disk. Length and marker are checked by [`decode`].
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Borrow the full byte layout, marker included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume into the raw byte vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Total length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` only for a frame without even a marker byte.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Marker byte, if it names a known encoding.
    pub fn encoding(&self) -> Option<FrameEncoding> {
        self.bytes.first().copied().and_then(FrameEncoding::from_u8)
    }
}

/// Byte length of a packed frame: `1 + height * ceil(width / 8)`.
pub fn packed_len(canvas: Canvas) -> usize {
    1 + canvas.height as usize * canvas.row_bytes()
}

/// Pack a frame. Pure, so frames may be encoded concurrently.
pub fn encode(frame: &RasterFrame) -> PackedFrame {
    let canvas = frame.canvas();
    let row_bytes = canvas.row_bytes();

    let mut bytes = vec![0u8; packed_len(canvas)];
    bytes[0] = FrameEncoding::Raw as u8;

    for (row, out) in frame.rows().zip(bytes[1..].chunks_exact_mut(row_bytes)) {
        for (x, &fg) in row.iter().enumerate() {
            if fg {
                out[x / 8] |= 1u8 << (x % 8);
            }
        }
    }

    PackedFrame { bytes }
}

/// Decode and pack an image in one step, failing on non two-color input.
pub fn encode_image(img: &image::DynamicImage) -> PackResult<PackedFrame> {
    Ok(encode(&RasterFrame::from_image(img)?))
}

/// Unpack a frame of known dimensions.
pub fn decode(packed: &PackedFrame, canvas: Canvas) -> PackResult<RasterFrame> {
    canvas.validate()?;
    let expected = packed_len(canvas);
    if packed.len() != expected {
        return Err(PackError::invalid_frame(format!(
            "packed frame is {} bytes, expected {expected} for {canvas}",
            packed.len()
        )));
    }
    match packed.encoding() {
        Some(FrameEncoding::Raw) => {}
        None => {
            return Err(PackError::invalid_frame(format!(
                "unknown frame encoding marker 0x{:02x}",
                packed.bytes[0]
            )));
        }
    }

    let width = canvas.width as usize;
    let mut pixels = Vec::with_capacity(canvas.pixel_count());
    for row in packed.bytes[1..].chunks_exact(canvas.row_bytes()) {
        pixels.extend((0..width).map(|x| row[x / 8] & (1u8 << (x % 8)) != 0));
    }
    RasterFrame::from_bits(canvas.width, canvas.height, pixels)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/packed.rs"]
mod tests;
