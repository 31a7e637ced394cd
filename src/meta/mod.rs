//! Pack descriptor (`meta.txt`) generation.

/// Overlay bubble anchors and text geometry.
pub mod bubble;
/// Pack configuration and the fixed-layout descriptor.
pub mod descriptor;
