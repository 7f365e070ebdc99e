//! Shared numeric constants for the canvas crate.

// ── Element defaults ────────────────────────────────────────────

/// Radius used when a circle record carries no usable radius.
pub const DEFAULT_RADIUS: f64 = 50.0;

/// Width used when a rectangle or image record carries no usable width.
pub const DEFAULT_WIDTH: f64 = 100.0;

/// Height used when a rectangle or image record carries no usable height.
pub const DEFAULT_HEIGHT: f64 = 100.0;

/// Font size in pixels used when a text record carries no usable size.
pub const DEFAULT_TEXT_SIZE: f64 = 16.0;

/// Effective width of a text element whose string is empty or missing.
pub const EMPTY_TEXT_WIDTH: f64 = 100.0;

/// Approximate glyph advance as a fraction of the font size.
pub const TEXT_WIDTH_FACTOR: f64 = 0.6;

/// Fill color for shapes and text with no usable color.
pub const DEFAULT_COLOR: &str = "#000000";

/// Stroke color for bordered shapes with no border color.
pub const DEFAULT_BORDER_COLOR: &str = "#000000";

/// Font family used when a text record names none.
pub const DEFAULT_FONT: &str = "Arial";

/// Canvas background when the stored color is missing or unparseable.
pub const DEFAULT_BACKGROUND: &str = "#FFFFFF";

/// Canvas width used when the singleton is created lazily.
pub const DEFAULT_CANVAS_WIDTH: u32 = 800;

/// Canvas height used when the singleton is created lazily.
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;

// ── Interaction ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels around the resize handle.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Smallest width, height, or diameter a resize gesture may produce.
pub const MIN_ELEMENT_SIZE: f64 = 5.0;

/// Padding in screen pixels between an element and its selection outline.
pub const SELECTION_PAD_PX: f64 = 2.0;

/// Selection dash segment length in screen pixels.
pub const SELECTION_DASH_PX: f64 = 4.0;
