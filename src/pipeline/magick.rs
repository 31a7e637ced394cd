use std::ffi::OsString;
use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::foundation::core::Canvas;
use crate::foundation::error::{PackError, PackResult};

/// File name prefix of the raster files the engine writes.
pub const RASTER_PREFIX: &str = "raster_";

/// Extension of the raster files the engine writes.
pub const RASTER_EXT: &str = "png";

/// User-facing filter toggles forwarded to the engine.
///
/// None of these are interpreted by framepack itself.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    /// Target canvas; frames are force-resized to it.
    pub canvas: Canvas,
    /// Contrast stretch black/white point in percent.
    pub contrast_stretch: Option<f32>,
    /// Sharpen sigma.
    pub sharpen: Option<f32>,
    /// Floyd-Steinberg dithering when reducing to 1 bit.
    pub dither: bool,
    /// Convert to grayscale first.
    pub grayscale: bool,
    /// Reduce to a 1-bit palette.
    pub monochrome: bool,
    /// Edge detection followed by normalize.
    pub edge_detect: bool,
    /// Negate colors.
    pub invert: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            contrast_stretch: None,
            sharpen: None,
            dither: true,
            grayscale: true,
            monochrome: true,
            edge_detect: false,
            invert: false,
        }
    }
}

impl FilterOptions {
    /// Argument vector for one engine run, input and output pattern included.
    ///
    /// Order is stable: coalesce and resize come first, 1-bit reduction last.
    pub fn to_args(&self, input: &Path, out_pattern: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            input.into(),
            "-coalesce".into(),
            "-resize".into(),
            format!("{}!", self.canvas).into(),
        ];
        if let Some(pct) = self.contrast_stretch {
            args.push("-contrast-stretch".into());
            args.push(format!("{pct}%").into());
        }
        if let Some(sigma) = self.sharpen {
            args.push("-sharpen".into());
            args.push(format!("0x{sigma}").into());
        }
        if self.grayscale {
            args.push("-colorspace".into());
            args.push("Gray".into());
        }
        if self.edge_detect {
            args.push("-edge".into());
            args.push("1".into());
            args.push("-normalize".into());
        }
        if self.invert {
            args.push("-negate".into());
        }
        let dither = if self.dither { "FloydSteinberg" } else { "None" };
        args.push("-dither".into());
        args.push(dither.into());
        if self.monochrome {
            args.push("-monochrome".into());
        }
        args.push(out_pattern.into());
        args
    }
}

/// One-shot ImageMagick run producing indexed raster frames.
#[derive(Clone, Debug)]
pub struct MagickPipeline {
    /// Engine executable, `magick` by default.
    pub program: PathBuf,
    /// Filter options.
    pub options: FilterOptions,
}

impl MagickPipeline {
    /// Pipeline using `magick` from `PATH`.
    pub fn new(options: FilterOptions) -> Self {
        Self {
            program: PathBuf::from("magick"),
            options,
        }
    }

    /// Return `true` when the engine can be invoked.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Run the engine on `input`, writing rasters into `out_dir`, and return them in index
    /// order. Encoding must not start unless this returns `Ok`.
    #[tracing::instrument(skip(self), fields(program = %self.program.display()))]
    pub fn run(&self, input: &Path, out_dir: &Path) -> PackResult<Vec<PathBuf>> {
        if !input.exists() {
            return Err(PackError::validation(format!(
                "input '{}' does not exist",
                input.display()
            )));
        }
        std::fs::create_dir_all(out_dir).map_err(|e| PackError::io(out_dir, e))?;
        let stale = clear_indexed_frames(out_dir, RASTER_PREFIX, RASTER_EXT)?;
        if stale > 0 {
            tracing::debug!(stale, "removed rasters from a previous run");
        }

        let pattern = out_dir.join(format!("{RASTER_PREFIX}%d.{RASTER_EXT}"));
        let args = self.options.to_args(input, &pattern);
        tracing::debug!(?args, "spawning image pipeline");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                PackError::pipeline(format!(
                    "failed to spawn '{}' (is ImageMagick installed and on PATH?): {e}",
                    self.program.display()
                ))
            })?;

        let mut stderr_bytes = Vec::new();
        if let Some(mut stderr) = child.stderr.take() {
            stderr
                .read_to_end(&mut stderr_bytes)
                .map_err(|e| PackError::pipeline(format!("image pipeline stderr read failed: {e}")))?;
        }
        let status = child.wait().map_err(|e| {
            PackError::pipeline(format!("failed to wait for image pipeline to finish: {e}"))
        })?;
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(PackError::pipeline(format!(
                "'{}' exited with status {}: {}",
                self.program.display(),
                status,
                stderr.trim()
            )));
        }

        let frames = collect_indexed_frames(out_dir, RASTER_PREFIX, RASTER_EXT)?;
        if frames.is_empty() {
            return Err(PackError::pipeline(format!(
                "image pipeline produced no frames in '{}'",
                out_dir.display()
            )));
        }
        tracing::debug!(frames = frames.len(), "image pipeline finished");
        Ok(frames)
    }
}

/// List `<prefix><i>.<ext>` files in `dir`, ordered by numeric index.
///
/// Indices must be exactly `0..N`; other files in the directory are ignored.
pub fn collect_indexed_frames(dir: &Path, prefix: &str, ext: &str) -> PackResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| PackError::io(dir, e))?;

    let mut indexed = Vec::<(u64, PathBuf)>::new();
    for entry in entries {
        let entry = entry.map_err(|e| PackError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(idx) = parse_frame_index(&path, prefix, ext) {
            indexed.push((idx, path));
        }
    }
    indexed.sort_by_key(|(idx, _)| *idx);

    for (expected, (idx, path)) in indexed.iter().enumerate() {
        if *idx != expected as u64 {
            return Err(PackError::validation(format!(
                "raster frames are not contiguous: expected index {expected}, found '{}'",
                path.display()
            )));
        }
    }
    Ok(indexed.into_iter().map(|(_, p)| p).collect())
}

/// Delete every `<prefix><i>.<ext>` file in `dir` and return how many were removed.
///
/// The engine's output is the whole input of a pack, so leftovers must go before it runs.
pub fn clear_indexed_frames(dir: &Path, prefix: &str, ext: &str) -> PackResult<usize> {
    let entries = std::fs::read_dir(dir).map_err(|e| PackError::io(dir, e))?;

    let mut removed = 0;
    for entry in entries {
        let path = entry.map_err(|e| PackError::io(dir, e))?.path();
        if path.is_file() && parse_frame_index(&path, prefix, ext).is_some() {
            std::fs::remove_file(&path).map_err(|e| PackError::io(&path, e))?;
            removed += 1;
        }
    }
    Ok(removed)
}

fn parse_frame_index(path: &Path, prefix: &str, ext: &str) -> Option<u64> {
    if !path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
    {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let digits = stem.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/magick.rs"]
mod tests;
