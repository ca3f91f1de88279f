//! Canvas renderer for parsed PCB board descriptions.
//!
//! Draws footprints, pads, silkscreen, and the board outline onto two
//! 2d canvases (front and back of the board), with live highlighting of
//! selected components driven by reference designators. The board
//! description arrives already parsed; this crate performs no file I/O.
//!
//! Pure geometry (pad path construction, stroke-font shaping, surface
//! transforms) is independent of the canvas bindings and unit-tested on
//! the host; only [`draw`] and [`renderer`] touch the DOM.

pub mod draw;
pub mod error;
pub mod font;
pub mod palette;
pub mod path;
pub mod pcbdata;
pub mod renderer;
pub mod transform;

pub use error::RenderError;
pub use palette::Palette;
pub use pcbdata::{BoardDocument, Side};
pub use renderer::{Renderer, RendererOptions};
