//! Frame encoding and frame sinks.
//!
//! Sinks consume packed frames in index order and are used by `PackSession::run`.

/// 1-bit frame packing (`RasterFrame` <-> `PackedFrame`).
pub mod packed;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
