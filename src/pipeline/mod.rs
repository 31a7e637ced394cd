//! Adapter for the external image-processing engine.
//!
//! The engine decodes, coalesces, resizes and filters the source animation down to 1-bit
//! raster files. framepack only builds its argument vector and consumes its output.

/// ImageMagick invocation and output discovery.
pub mod magick;
