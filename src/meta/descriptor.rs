use std::fmt::Write as _;
use std::path::Path;

use crate::foundation::core::Canvas;
use crate::foundation::error::{PackError, PackResult};
use crate::meta::bubble::{BubbleSlot, BubbleSpec};

/// File-type tag on the first descriptor line.
pub const DESCRIPTOR_FILETYPE: &str = "Flipper Animation";

/// Descriptor format version. This version supports at most one bubble slot.
pub const DESCRIPTOR_VERSION: u32 = 1;

/// Conventional descriptor file name inside a pack directory.
pub const DESCRIPTOR_FILE_NAME: &str = "meta.txt";

/// Pack-level playback parameters.
///
/// The passive frame count is not part of the configuration; it is always the number of
/// frames actually encoded.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PackConfig {
    /// Frame dimensions shared by every frame in the pack.
    pub canvas: Canvas,
    /// Frames played on trigger.
    pub active_frames: u32,
    /// How many times the active phase repeats.
    pub active_cycles: u32,
    /// Playback rate in frames per second.
    pub frame_rate: u32,
    /// Total display duration in seconds.
    pub duration: u32,
    /// Seconds before the active phase may trigger again.
    pub active_cooldown: u32,
    /// Optional overlay bubble.
    pub bubble: Option<BubbleSpec>,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            active_frames: 0,
            active_cycles: 0,
            frame_rate: 4,
            duration: 3600,
            active_cooldown: 0,
            bubble: None,
        }
    }
}

impl PackConfig {
    /// Load a JSON configuration file. Missing fields take their defaults.
    pub fn from_path(path: &Path) -> PackResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| PackError::io(path, e))?;
        Self::from_json_slice(&bytes)
    }

    /// Parse JSON configuration.
    pub fn from_json_slice(bytes: &[u8]) -> PackResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| PackError::validation(format!("parse pack config JSON: {e}")))
    }

    /// Check values the descriptor consumer cannot handle.
    pub fn validate(&self) -> PackResult<()> {
        self.canvas.validate()?;
        if self.frame_rate == 0 {
            return Err(PackError::validation("frame_rate must be non-zero"));
        }
        Ok(())
    }
}

/// Rendered `meta.txt` document. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Descriptor {
    text: String,
    passive_frames: u64,
    bubble: Option<BubbleSlot>,
}

impl Descriptor {
    /// UTF-8 text, no byte-order mark.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Raw bytes as written to disk.
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Passive frame count recorded in the descriptor.
    pub fn passive_frames(&self) -> u64 {
        self.passive_frames
    }

    /// Resolved bubble slot, if any.
    pub fn bubble(&self) -> Option<&BubbleSlot> {
        self.bubble.as_ref()
    }

    /// Write the descriptor to `path`.
    pub fn write_to(&self, path: &Path) -> PackResult<()> {
        std::fs::write(path, self.as_bytes()).map_err(|e| PackError::io(path, e))
    }
}

/// Build the descriptor for a pack of `frame_count` frames.
///
/// Field order is fixed; the device parses by line position, not by key.
#[tracing::instrument(level = "debug", skip(config))]
pub fn build(frame_count: u64, config: &PackConfig) -> PackResult<Descriptor> {
    config.validate()?;

    let bubble = match config.bubble.as_ref() {
        Some(spec) => spec.layout(frame_count),
        None => None,
    };

    let frames_order = (0..frame_count)
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    let mut text = String::new();
    write_header(&mut text, frame_count, &frames_order, config, bubble.as_ref())
        .map_err(anyhow::Error::from)?;

    Ok(Descriptor {
        text,
        passive_frames: frame_count,
        bubble,
    })
}

fn write_header(
    out: &mut String,
    frame_count: u64,
    frames_order: &str,
    config: &PackConfig,
    bubble: Option<&BubbleSlot>,
) -> std::fmt::Result {
    writeln!(out, "Filetype: {DESCRIPTOR_FILETYPE}")?;
    writeln!(out, "Version: {DESCRIPTOR_VERSION}")?;
    writeln!(out)?;
    writeln!(out, "Width: {}", config.canvas.width)?;
    writeln!(out, "Height: {}", config.canvas.height)?;
    writeln!(out, "Passive frames: {frame_count}")?;
    writeln!(out, "Active frames: {}", config.active_frames)?;
    writeln!(out, "Frames order: {frames_order}")?;
    writeln!(out, "Active cycles: {}", config.active_cycles)?;
    writeln!(out, "Frame rate: {}", config.frame_rate)?;
    writeln!(out, "Duration: {}", config.duration)?;
    writeln!(out, "Active cooldown: {}", config.active_cooldown)?;
    writeln!(out)?;
    writeln!(out, "Bubble slots: {}", u32::from(bubble.is_some()))?;

    if let Some(slot) = bubble {
        writeln!(out)?;
        writeln!(out, "Slot: {}", slot.index)?;
        writeln!(out, "X: {}", slot.anchor.x)?;
        writeln!(out, "Y: {}", slot.anchor.y)?;
        writeln!(out, "Text: {}", slot.text)?;
        writeln!(out, "AlignH: {}", slot.anchor.align_h.as_str())?;
        writeln!(out, "AlignV: {}", slot.anchor.align_v.as_str())?;
        writeln!(out, "StartFrame: {}", slot.span.start.0)?;
        writeln!(out, "EndFrame: {}", slot.span.end.0)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/meta/descriptor.rs"]
mod tests;
