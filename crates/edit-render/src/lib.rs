//! Render-intent construction for the editor core.
//!
//! The editor never draws pixels. Each frame it assembles an ordered list of
//! [`DrawCommand`]s in *document space* (origin at the top-left of the full
//! text, y growing downward); the embedding GUI translates by its own origin
//! minus the scroll offset and executes the commands. Per visible line the
//! order is: selection band, breakpoint band, error band, line number,
//! current-line fill and edge, cursor rectangle, then the colorized text
//! runs. That matches the paint order the original immediate-mode editor
//! relied on for correct layering.
//!
//! Text measurement goes through [`TextMetrics`] so a proportional-font GUI
//! can plug in real measurements; [`MonospaceMetrics`] serves tests and
//! terminal-like hosts.

pub mod builder;
pub mod layout;
pub mod palette;

pub use builder::{build_frame, EditorView, FrameContext};
pub use palette::{Palette, PaletteKind};

/// 2D point/extent in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One drawing primitive, consumed in order by the GUI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    RectFilled {
        min: Vec2,
        max: Vec2,
        color: u32,
    },
    RectOutline {
        min: Vec2,
        max: Vec2,
        color: u32,
    },
    Text {
        pos: Vec2,
        color: u32,
        text: String,
    },
    /// Whitespace arrows are drawn from individual segments.
    LineSegment {
        from: Vec2,
        to: Vec2,
        color: u32,
    },
    /// Space dots under `show_whitespaces`.
    Dot {
        center: Vec2,
        radius: f32,
        color: u32,
    },
}

/// Requested scroll offsets, emitted when the cursor must be kept visible
/// or the document was replaced.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollRequest {
    pub x: Option<f32>,
    pub y: Option<f32>,
}

impl ScrollRequest {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none()
    }
}

/// Hover payload for the GUI's error tooltip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorTooltip {
    pub line_number: u32,
    pub message: String,
}

/// Everything one frame produces.
#[derive(Debug, Clone, Default)]
pub struct RenderOutput {
    pub commands: Vec<DrawCommand>,
    pub scroll: ScrollRequest,
    pub tooltip: Option<ErrorTooltip>,
    /// Size of the full document in pixels, for scrollbar sizing.
    pub content_size: Vec2,
    /// X offset where text begins (right edge of the line-number gutter).
    pub text_start: f32,
}

/// Text measurement boundary provided by the GUI.
pub trait TextMetrics {
    /// Pixel width of a string at the current font.
    fn text_width(&self, text: &str) -> f32;
    /// Current font size in pixels (used for whitespace glyph geometry).
    fn font_size(&self) -> f32;
    /// Height of one text line including spacing.
    fn line_height(&self) -> f32;
}

/// Fixed-advance metrics: every code point is one cell wide.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMetrics {
    pub char_width: f32,
    pub font_size: f32,
    pub line_height: f32,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            font_size: 16.0,
            line_height: 18.0,
        }
    }
}

impl TextMetrics for MonospaceMetrics {
    fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.char_width
    }

    fn font_size(&self) -> f32 {
        self.font_size
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }
}
