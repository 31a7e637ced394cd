use std::str::FromStr;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::PackError;

/// Two-character line-break token understood by the device (a backslash followed by `n`).
pub const LINE_BREAK_MARKER: &str = "\\n";

/// Vertical shift applied per extra text line.
pub const LINE_HEIGHT_PX: u32 = 12;

/// Horizontal shift applied per extra character.
pub const CHAR_WIDTH_PX: u32 = 6;

/// Horizontal text alignment relative to the anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AlignH {
    /// Text extends to the right of the anchor.
    Left,
    /// Text is centered on the anchor.
    Center,
    /// Text extends to the left of the anchor.
    Right,
}

/// Vertical text alignment relative to the anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AlignV {
    /// Text hangs below the anchor.
    Top,
    /// Text is centered on the anchor.
    Center,
    /// Text sits above the anchor.
    Bottom,
}

impl AlignH {
    /// Descriptor spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Center => "Center",
            Self::Right => "Right",
        }
    }
}

impl AlignV {
    /// Descriptor spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "Top",
            Self::Center => "Center",
            Self::Bottom => "Bottom",
        }
    }
}

/// Named overlay position on the 128x64 canvas.
///
/// `Default` is what an unset or unrecognized locale resolves to and shares the `Center`
/// anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Locale {
    /// No locale given.
    #[default]
    Default,
    /// Middle of the canvas.
    Center,
    /// Bottom edge, horizontally centered.
    BottomCenter,
    /// Top edge, horizontally centered.
    TopCenter,
    /// Left edge, vertically centered.
    LeftCenter,
    /// Right edge, vertically centered.
    RightCenter,
    /// Bottom-right corner.
    BottomRight,
    /// Top-right corner.
    TopRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Top-left corner.
    TopLeft,
}

impl Locale {
    /// Every named locale, `Default` excluded.
    pub const NAMED: [Locale; 9] = [
        Locale::Center,
        Locale::BottomCenter,
        Locale::TopCenter,
        Locale::LeftCenter,
        Locale::RightCenter,
        Locale::BottomRight,
        Locale::TopRight,
        Locale::BottomLeft,
        Locale::TopLeft,
    ];

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Center => "center",
            Self::BottomCenter => "bottomcenter",
            Self::TopCenter => "topcenter",
            Self::LeftCenter => "leftcenter",
            Self::RightCenter => "rightcenter",
            Self::BottomRight => "bottomright",
            Self::TopRight => "topright",
            Self::BottomLeft => "bottomleft",
            Self::TopLeft => "topleft",
        }
    }

    /// Parse a locale name, falling back to [`Locale::Default`] on unknown input.
    ///
    /// An unknown name is logged and never fails the pack.
    pub fn parse_lenient(s: &str) -> Self {
        match s.parse() {
            Ok(locale) => locale,
            Err(err) => {
                tracing::warn!(%err, "falling back to the default bubble anchor");
                Self::Default
            }
        }
    }

    /// Base anchor before text geometry is applied.
    pub fn anchor(self) -> Anchor {
        let (x, y, align_h, align_v) = match self {
            Self::Default | Self::Center => (64, 32, AlignH::Center, AlignV::Bottom),
            Self::BottomCenter => (64, 49, AlignH::Center, AlignV::Top),
            Self::TopCenter => (64, 0, AlignH::Center, AlignV::Bottom),
            Self::LeftCenter => (0, 32, AlignH::Right, AlignV::Center),
            Self::RightCenter => (115, 32, AlignH::Left, AlignV::Center),
            Self::BottomRight => (115, 49, AlignH::Left, AlignV::Top),
            Self::TopRight => (115, 0, AlignH::Left, AlignV::Bottom),
            Self::BottomLeft => (0, 49, AlignH::Right, AlignV::Top),
            Self::TopLeft => (0, 0, AlignH::Right, AlignV::Bottom),
        };
        Anchor {
            x,
            y,
            align_h,
            align_v,
        }
    }
}

impl FromStr for Locale {
    type Err = PackError;

    /// Case-insensitive; `-`, `_` and spaces are ignored, so `bottom-right` and `BottomRight`
    /// both parse. Empty input is `Default`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        if key.is_empty() || key == "default" {
            return Ok(Self::Default);
        }
        Self::NAMED
            .into_iter()
            .find(|l| l.name() == key)
            .ok_or_else(|| PackError::UnsupportedLocale(s.to_string()))
    }
}

impl From<String> for Locale {
    fn from(s: String) -> Self {
        Self::parse_lenient(&s)
    }
}

impl From<Locale> for String {
    fn from(l: Locale) -> Self {
        l.name().to_string()
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Bubble anchor point and alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Anchor {
    /// X coordinate in pixels.
    pub x: u32,
    /// Y coordinate in pixels.
    pub y: u32,
    /// Horizontal alignment.
    pub align_h: AlignH,
    /// Vertical alignment.
    pub align_v: AlignV,
}

impl Anchor {
    /// Shift the anchor up for extra lines and left for extra characters, clamping at 0.
    ///
    /// The character count spans the whole text with markers removed, not the longest line.
    pub fn fit_text(self, text: &str) -> Self {
        let lines = line_count(text);
        let chars = char_count(text);

        let mut out = self;
        if lines > 1 {
            out.y = out.y.saturating_sub(LINE_HEIGHT_PX.saturating_mul(lines - 1));
        }
        if chars > 1 {
            out.x = out.x.saturating_sub(CHAR_WIDTH_PX.saturating_mul(chars - 1));
        }
        out
    }
}

/// Logical line count: pieces between literal `\n` markers.
pub fn line_count(text: &str) -> u32 {
    text.split(LINE_BREAK_MARKER).count() as u32
}

/// Character count with line-break markers stripped.
pub fn char_count(text: &str) -> u32 {
    text.replace(LINE_BREAK_MARKER, "").chars().count() as u32
}

/// Caller-supplied overlay bubble.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BubbleSpec {
    /// Anchor position.
    pub locale: Locale,
    /// Raw text; literal `\n` markers are kept verbatim.
    pub text: String,
    /// First frame the bubble is shown on. `0/0` means the whole pack.
    pub start_frame: u64,
    /// Last frame the bubble is shown on.
    pub end_frame: u64,
}

impl BubbleSpec {
    /// Effective display span; `0/0` widens to `0..frame_count`, anything else is kept as given.
    pub fn span(&self, frame_count: u64) -> BubbleSpan {
        if self.start_frame == 0 && self.end_frame == 0 {
            return BubbleSpan {
                start: FrameIndex(0),
                end: FrameIndex(frame_count),
            };
        }
        BubbleSpan {
            start: FrameIndex(self.start_frame),
            end: FrameIndex(self.end_frame),
        }
    }

    /// Resolve into a descriptor slot. Returns `None` when there is no text to show.
    pub fn layout(&self, frame_count: u64) -> Option<BubbleSlot> {
        if self.text.is_empty() {
            return None;
        }
        let anchor = self.locale.anchor().fit_text(&self.text);
        Some(BubbleSlot {
            index: 0,
            anchor,
            text: self.text.clone(),
            span: self.span(frame_count),
        })
    }
}

/// Start/end frames written to a bubble slot.
///
/// Not a [`crate::FrameRange`]: the device reads both values as given, so an end below the
/// start (for example only a start frame configured) is passed through untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BubbleSpan {
    /// `StartFrame` value.
    pub start: FrameIndex,
    /// `EndFrame` value.
    pub end: FrameIndex,
}

/// A bubble resolved to concrete coordinates, as written to the descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BubbleSlot {
    /// Slot index; a single slot is supported, so always 0.
    pub index: u32,
    /// Geometry-adjusted anchor.
    pub anchor: Anchor,
    /// Raw text.
    pub text: String,
    /// Effective start/end frames.
    pub span: BubbleSpan,
}

#[cfg(test)]
#[path = "../../tests/unit/meta/bubble.rs"]
mod tests;
