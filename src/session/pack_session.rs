use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::encode::packed::{PackedFrame, encode};
use crate::encode::sink::{DirSink, DirSinkOpts, FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, FrameIndex, FrameRange};
use crate::foundation::error::{PackError, PackResult};
use crate::meta::descriptor::{Descriptor, PackConfig, build};
use crate::raster::frame::RasterFrame;

/// Indexed input frames for a pack.
///
/// Loading must be independent per index; sessions call `load` from worker threads.
pub trait FrameSource: Sync {
    /// Number of frames.
    fn len(&self) -> u64;

    /// Return `true` when the source holds no frames.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load the frame at `idx`.
    fn load(&self, idx: FrameIndex) -> PackResult<RasterFrame>;
}

impl FrameSource for Vec<RasterFrame> {
    fn len(&self) -> u64 {
        self.as_slice().len() as u64
    }

    fn load(&self, idx: FrameIndex) -> PackResult<RasterFrame> {
        self.get(idx.0 as usize)
            .cloned()
            .ok_or_else(|| PackError::validation(format!("frame {} out of range", idx.0)))
    }
}

/// Raster image files in frame order, decoded lazily.
#[derive(Clone, Debug)]
pub struct RasterFiles {
    paths: Vec<PathBuf>,
}

impl RasterFiles {
    /// Wrap paths already sorted by frame index.
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Borrow the paths.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl FrameSource for RasterFiles {
    fn len(&self) -> u64 {
        self.paths.len() as u64
    }

    fn load(&self, idx: FrameIndex) -> PackResult<RasterFrame> {
        let path = self
            .paths
            .get(idx.0 as usize)
            .ok_or_else(|| PackError::validation(format!("frame {} out of range", idx.0)))?;
        RasterFrame::open(path)
    }
}

/// Cooperative cancellation flag shared between a session and its caller.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// New, not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Frames already handed to the sink stay written.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Encoding threading/chunking configuration.
#[derive(Clone, Debug)]
pub struct EncodeThreading {
    /// Encode frames of a chunk on a rayon pool.
    pub parallel: bool,
    /// Frames per chunk; `0` is treated as `1`.
    pub chunk_size: usize,
    /// Worker thread count; rayon's default when `None`.
    pub threads: Option<usize>,
}

impl Default for EncodeThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
        }
    }
}

/// Options for [`PackSession`].
#[derive(Clone, Debug, Default)]
pub struct PackSessionOpts {
    /// Playback configuration embedded in the descriptor.
    pub config: PackConfig,
    /// Threading configuration.
    pub threading: EncodeThreading,
    /// Optional cancellation flag.
    pub cancel: Option<CancelToken>,
}

/// Counters reported by [`PackSession::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PackStats {
    /// Frames offered by the source.
    pub frames_total: u64,
    /// Frames pushed to the sink.
    pub frames_written: u64,
}

/// Encodes a frame source into a sink and finishes it with the descriptor.
pub struct PackSession {
    opts: PackSessionOpts,
    pool: Option<rayon::ThreadPool>,
}

impl PackSession {
    /// Validate options and build the worker pool when running in parallel.
    pub fn new(opts: PackSessionOpts) -> PackResult<Self> {
        opts.config.validate()?;
        let pool = if opts.threading.parallel {
            Some(build_thread_pool(opts.threading.threads)?)
        } else {
            None
        };
        Ok(Self { opts, pool })
    }

    /// Options this session was built with.
    pub fn opts(&self) -> &PackSessionOpts {
        &self.opts
    }

    /// Encode every frame of `source`, push them to `sink` in index order, then build the
    /// descriptor from the final frame count and hand it to the sink.
    ///
    /// On cancellation or error the sink holds frames `0..written` and no descriptor.
    #[tracing::instrument(skip_all, fields(frames = source.len(), parallel = self.pool.is_some()))]
    pub fn run(
        &self,
        source: &dyn FrameSource,
        sink: &mut dyn FrameSink,
    ) -> PackResult<(Descriptor, PackStats)> {
        let total = source.len();
        if total == 0 {
            return Err(PackError::validation("pack needs at least one frame"));
        }
        let canvas = self.opts.config.canvas;
        let chunk_size = normalized_chunk_size(self.opts.threading.chunk_size);

        sink.begin(SinkConfig {
            canvas,
            frame_count: total,
        })?;

        let mut stats = PackStats {
            frames_total: total,
            frames_written: 0,
        };

        let mut chunk_start = 0u64;
        while chunk_start < total {
            self.check_cancel(stats.frames_written)?;

            let chunk_end = (chunk_start + chunk_size).min(total);
            let chunk = FrameRange::new(FrameIndex(chunk_start), FrameIndex(chunk_end))?;
            let packed = match self.pool.as_ref() {
                Some(pool) => encode_chunk_parallel(source, chunk, canvas, pool),
                None => encode_chunk_sequential(source, chunk, canvas),
            };
            tracing::debug!(
                start = chunk.start.0,
                frames = chunk.len_frames(),
                "encoded chunk"
            );

            for (offset, frame) in packed.into_iter().enumerate() {
                self.check_cancel(stats.frames_written)?;
                let frame = frame?;
                sink.push_frame(FrameIndex(chunk_start + offset as u64), &frame)?;
                stats.frames_written += 1;
            }
            chunk_start = chunk_end;
        }

        let descriptor = build(stats.frames_written, &self.opts.config)?;
        sink.end(&descriptor)?;

        tracing::info!(frames = stats.frames_written, "pack complete");
        Ok((descriptor, stats))
    }

    /// Convenience wrapper writing into a pack directory through a [`DirSink`].
    pub fn write_dir(
        &self,
        source: &dyn FrameSource,
        out_dir: &Path,
    ) -> PackResult<(Descriptor, PackStats)> {
        let mut sink = DirSink::new(DirSinkOpts::new(out_dir));
        self.run(source, &mut sink)
    }

    fn check_cancel(&self, written: u64) -> PackResult<()> {
        if let Some(cancel) = self.opts.cancel.as_ref()
            && cancel.is_cancelled()
        {
            tracing::warn!(written, "pack cancelled");
            return Err(PackError::Cancelled { written });
        }
        Ok(())
    }
}

fn encode_one(source: &dyn FrameSource, idx: FrameIndex, canvas: Canvas) -> PackResult<PackedFrame> {
    let frame = source.load(idx).map_err(|e| match e {
        PackError::InvalidFrameFormat(msg) => {
            PackError::invalid_frame(format!("frame {}: {msg}", idx.0))
        }
        other => other,
    })?;
    if frame.canvas() != canvas {
        return Err(PackError::validation(format!(
            "frame {}: size {} does not match pack canvas {canvas}",
            idx.0,
            frame.canvas()
        )));
    }
    Ok(encode(&frame))
}

fn encode_chunk_sequential(
    source: &dyn FrameSource,
    chunk: FrameRange,
    canvas: Canvas,
) -> Vec<PackResult<PackedFrame>> {
    (chunk.start.0..chunk.end.0)
        .map(|f| encode_one(source, FrameIndex(f), canvas))
        .collect()
}

fn encode_chunk_parallel(
    source: &dyn FrameSource,
    chunk: FrameRange,
    canvas: Canvas,
    pool: &rayon::ThreadPool,
) -> Vec<PackResult<PackedFrame>> {
    pool.install(|| {
        (chunk.start.0..chunk.end.0)
            .into_par_iter()
            .map(|f| encode_one(source, FrameIndex(f), canvas))
            .collect()
    })
}

fn build_thread_pool(threads: Option<usize>) -> PackResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(PackError::validation(
            "encode threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| PackError::validation(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/pack_session.rs"]
mod tests;
