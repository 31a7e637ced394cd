use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::packed::{PackedFrame, packed_len};
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{PackError, PackResult};
use crate::meta::descriptor::{DESCRIPTOR_FILE_NAME, Descriptor};

/// File name of the packed frame at `idx` inside a pack directory.
pub fn frame_file_name(idx: FrameIndex) -> String {
    format!("frame_{}.bm", idx.0)
}

/// Configuration provided to a [`FrameSink`] at the start of a pack.
#[derive(Debug, Clone, Copy)]
pub struct SinkConfig {
    /// Dimensions shared by every frame.
    pub canvas: Canvas,
    /// Number of frames the session intends to push.
    pub frame_count: u64,
}

/// Sink contract for consuming packed frames.
///
/// Ordering contract: `push_frame` is called with indices `0, 1, 2, ...` without gaps, so a
/// sink interrupted at any point holds a contiguous prefix of the pack. `end` receives the
/// descriptor only after the last frame was pushed.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> PackResult<()>;
    /// Push the next frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &PackedFrame) -> PackResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self, descriptor: &Descriptor) -> PackResult<()>;
}

/// Check the next index continues the sequence and advance the running count.
fn advance(count: &mut u64, idx: FrameIndex) -> PackResult<()> {
    if idx.0 != *count {
        return Err(PackError::validation(format!(
            "frame sink expected frame {count}, got {}",
            idx.0
        )));
    }
    *count += 1;
    Ok(())
}

/// Options for [`DirSink`].
#[derive(Clone, Debug)]
pub struct DirSinkOpts {
    /// Pack output directory; created if missing.
    pub out_dir: PathBuf,
    /// Replace frame/descriptor files that already exist.
    pub overwrite: bool,
}

impl DirSinkOpts {
    /// Create options for writing a pack into `out_dir`.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            overwrite: true,
        }
    }
}

/// Writes `frame_<i>.bm` files and `meta.txt` into a directory.
///
/// Files already written are left in place when a later write fails.
#[derive(Debug)]
pub struct DirSink {
    opts: DirSinkOpts,
    cfg: Option<SinkConfig>,
    written: u64,
}

impl DirSink {
    /// Create a new directory sink.
    pub fn new(opts: DirSinkOpts) -> Self {
        Self {
            opts,
            cfg: None,
            written: 0,
        }
    }

    /// Output directory.
    pub fn out_dir(&self) -> &Path {
        &self.opts.out_dir
    }

    /// Frames written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    fn write_file(&self, path: &Path, bytes: &[u8]) -> PackResult<()> {
        if !self.opts.overwrite && path.exists() {
            return Err(PackError::validation(format!(
                "output file '{}' already exists",
                path.display()
            )));
        }
        std::fs::write(path, bytes).map_err(|e| PackError::io(path, e))
    }
}

impl FrameSink for DirSink {
    fn begin(&mut self, cfg: SinkConfig) -> PackResult<()> {
        cfg.canvas.validate()?;
        std::fs::create_dir_all(&self.opts.out_dir).with_context(|| {
            format!(
                "failed to create pack directory '{}'",
                self.opts.out_dir.display()
            )
        })?;
        self.cfg = Some(cfg);
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &PackedFrame) -> PackResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| PackError::validation("dir sink not started"))?;
        let expected = packed_len(cfg.canvas);
        if frame.len() != expected {
            return Err(PackError::invalid_frame(format!(
                "frame {}: packed size {} does not match {} for {}",
                idx.0,
                frame.len(),
                expected,
                cfg.canvas
            )));
        }

        let path = self.opts.out_dir.join(frame_file_name(idx));
        let mut next = self.written;
        advance(&mut next, idx)?;
        self.write_file(&path, frame.as_bytes())?;
        self.written = next;
        Ok(())
    }

    fn end(&mut self, descriptor: &Descriptor) -> PackResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| PackError::validation("dir sink not started"))?;
        if self.written != cfg.frame_count {
            return Err(PackError::validation(format!(
                "pack announced {} frames but {} were written",
                cfg.frame_count, self.written
            )));
        }
        if descriptor.passive_frames() != self.written {
            return Err(PackError::validation(format!(
                "descriptor lists {} passive frames but {} were written",
                descriptor.passive_frames(),
                self.written
            )));
        }
        let path = self.opts.out_dir.join(DESCRIPTOR_FILE_NAME);
        self.write_file(&path, descriptor.as_bytes())?;
        self.cfg = None;
        Ok(())
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    /// Frames in index order.
    pub(crate) frames: Vec<PackedFrame>,
    descriptor: Option<Descriptor>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Borrow the captured frames; position equals frame index.
    pub fn frames(&self) -> &[PackedFrame] {
        &self.frames
    }

    /// Descriptor captured in `end`, if the pack completed.
    pub fn descriptor(&self) -> Option<&Descriptor> {
        self.descriptor.as_ref()
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> PackResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.descriptor = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &PackedFrame) -> PackResult<()> {
        let mut count = self.frames.len() as u64;
        advance(&mut count, idx)?;
        self.frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self, descriptor: &Descriptor) -> PackResult<()> {
        self.descriptor = Some(descriptor.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
