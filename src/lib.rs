//! framepack converts monochrome raster frame sequences into packed 1-bit animation packs.
//!
//! A pack is one `frame_<i>.bm` file per frame plus a `meta.txt` descriptor with playback
//! timing and an optional overlay bubble. The flow is:
//!
//! - Run the external image engine once ([`MagickPipeline`]) to get indexed 1-bit rasters
//! - Load them as validated [`RasterFrame`]s
//! - [`encode`] each frame into a [`PackedFrame`] and push it to a [`FrameSink`]
//! - [`build`] the [`Descriptor`] from the final frame count and a [`PackConfig`]
//!
//! [`PackSession`] drives the last three steps, optionally in parallel and cancellable.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Frame packing and frame sinks.
pub mod encode;
/// Descriptor and bubble geometry.
pub mod meta;
/// External image-processing engine adapter.
pub mod pipeline;
/// Two-color raster frames.
pub mod raster;
/// Pack session driver.
pub mod session;

pub use crate::foundation::core::{Canvas, FrameIndex, FrameRange};
pub use crate::foundation::error::{PackError, PackResult};

pub use crate::encode::packed::{
    FrameEncoding, PackedFrame, decode, encode, encode_image, packed_len,
};
pub use crate::encode::sink::{
    DirSink, DirSinkOpts, FrameSink, InMemorySink, SinkConfig, frame_file_name,
};
pub use crate::meta::bubble::{
    AlignH, AlignV, Anchor, BubbleSlot, BubbleSpan, BubbleSpec, Locale,
};
pub use crate::meta::descriptor::{DESCRIPTOR_FILE_NAME, Descriptor, PackConfig, build};
pub use crate::pipeline::magick::{
    FilterOptions, MagickPipeline, clear_indexed_frames, collect_indexed_frames,
};
pub use crate::raster::frame::RasterFrame;
pub use crate::session::pack_session::{
    CancelToken, EncodeThreading, FrameSource, PackSession, PackSessionOpts, PackStats,
    RasterFiles,
};
