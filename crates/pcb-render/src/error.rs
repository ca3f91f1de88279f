use thiserror::Error;

/// Failures that can occur while rendering a board.
///
/// Per-item failures (`MissingGlyph`, `UnknownShape`) are logged and
/// contained to the offending item; a redraw always runs to completion.
/// `Canvas` can only surface during renderer construction.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("no glyph for character {ch:?} in font data")]
    MissingGlyph { ch: char },

    #[error("unrecognized pad shape: {shape}")]
    UnknownShape { shape: String },

    #[error("canvas setup failed: {0}")]
    Canvas(String),
}
