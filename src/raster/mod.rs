//! Two-color raster frames as produced by the external image pipeline.

/// Validated 1-bit raster frames and their loaders.
pub mod frame;
