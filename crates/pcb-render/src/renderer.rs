use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use gloo::timers::callback::Interval;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, HtmlElement};

use crate::draw::Draw;
use crate::error::RenderError;
use crate::palette::Palette;
use crate::path::{PathCache, PolySource};
use crate::pcbdata::{BoardDocument, Side};
use crate::transform::surface_transform;

#[derive(Debug, Clone, PartialEq)]
pub struct RendererOptions {
    /// Rotate the board 90° on both surfaces (sideways mounting).
    pub rotate: bool,
    /// Surface pixels per board unit, before the device pixel ratio.
    pub scale: f64,
    /// Steady redraw cadence. Highlight changes redraw immediately and
    /// never wait for the next tick.
    pub redraw_interval_ms: u32,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            rotate: false,
            scale: 10.0,
            redraw_interval_ms: 200,
        }
    }
}

/// The only state that mutates over the renderer's lifetime: the
/// highlighted refs and the pin-one-highlighted refs, each replaced
/// wholesale. Refs that match no footprint are inert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlightState {
    highlighted: HashSet<String>,
    pin_one: HashSet<String>,
}

impl HighlightState {
    pub fn set_highlighted(&mut self, refs: &[String]) {
        self.highlighted = refs.iter().cloned().collect();
    }

    pub fn set_pin_one(&mut self, refs: &[String]) {
        self.pin_one = refs.iter().cloned().collect();
    }

    pub fn highlighted(&self) -> &HashSet<String> {
        &self.highlighted
    }

    pub fn pin_one(&self) -> &HashSet<String> {
        &self.pin_one
    }
}

struct Inner {
    document: Rc<BoardDocument>,
    palette: Palette,
    front: Draw,
    back: Draw,
    cache: PathCache,
    highlights: HighlightState,
    rotate: bool,
    scale: f64,
}

impl Inner {
    fn draw(&mut self) {
        let pixel_ratio = device_pixel_ratio();
        let transform = surface_transform(
            &self.document.edges_bbox,
            self.rotate,
            pixel_ratio,
            self.scale,
        );

        let Inner {
            ref document,
            ref palette,
            ref front,
            ref back,
            ref mut cache,
            ref highlights,
            ..
        } = *self;

        for (surface, side) in [(front, Side::Front), (back, Side::Back)] {
            surface.set_transform(&transform);
            surface.clear(&palette.board);
            surface.items(
                document.drawings.silkscreen.get(side),
                PolySource::Silk(side),
                &palette.silk,
                &document.font_data,
                cache,
            );
            surface.footprints(
                &document.footprints,
                side,
                highlights.highlighted(),
                highlights.pin_one(),
                palette,
                &document.font_data,
                cache,
            );
            surface.edges(&document.edges, &palette.edge_cuts, cache);
        }
    }
}

/// Renders a board document onto front and back surfaces inside a
/// container element, and keeps them current with the highlight state
/// on a fixed cadence.
pub struct Renderer {
    inner: Rc<RefCell<Inner>>,
    interval: Option<Interval>,
    interval_ms: u32,
}

impl Renderer {
    /// Build both surfaces, draw once, and start the redraw loop.
    pub fn new(
        container: &HtmlElement,
        document: Rc<BoardDocument>,
        palette: Palette,
        options: RendererOptions,
    ) -> Result<Self, RenderError> {
        let bbox = &document.edges_bbox;
        let (mut width, mut height) = (bbox.width(), bbox.height());
        if options.rotate {
            std::mem::swap(&mut width, &mut height);
        }

        let pixel_ratio = device_pixel_ratio();
        let front = Draw::new(make_canvas(
            container,
            width,
            height,
            "front",
            pixel_ratio,
            options.scale,
        )?)?;
        let back = Draw::new(make_canvas(
            container,
            width,
            height,
            "back",
            pixel_ratio,
            options.scale,
        )?)?;

        let inner = Rc::new(RefCell::new(Inner {
            document,
            palette,
            front,
            back,
            cache: PathCache::new(),
            highlights: HighlightState::default(),
            rotate: options.rotate,
            scale: options.scale,
        }));
        inner.borrow_mut().draw();

        let mut renderer = Self {
            inner,
            interval: None,
            interval_ms: options.redraw_interval_ms,
        };
        renderer.start();
        Ok(renderer)
    }

    /// Resume the redraw loop. No-op while already running.
    pub fn start(&mut self) {
        if self.interval.is_some() {
            return;
        }
        let weak = Rc::downgrade(&self.inner);
        self.interval = Some(Interval::new(self.interval_ms, move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().draw();
            }
        }));
    }

    /// Halt the redraw loop. Pending ticks are cancelled; the surfaces
    /// keep their last frame. Dropping the renderer stops it too.
    pub fn stop(&mut self) {
        self.interval = None;
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Replace the highlighted-ref set and redraw immediately.
    pub fn highlight(&self, refs: &[String]) {
        let mut inner = self.inner.borrow_mut();
        inner.highlights.set_highlighted(refs);
        inner.draw();
    }

    /// Replace the pin-one-highlighted-ref set and redraw immediately.
    pub fn highlight_pin_one(&self, refs: &[String]) {
        let mut inner = self.inner.borrow_mut();
        inner.highlights.set_pin_one(refs);
        inner.draw();
    }

    pub fn front_canvas(&self) -> HtmlCanvasElement {
        self.inner.borrow().front.canvas().clone()
    }

    pub fn back_canvas(&self) -> HtmlCanvasElement {
        self.inner.borrow().back.canvas().clone()
    }
}

fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0)
}

fn make_canvas(
    container: &HtmlElement,
    width: f64,
    height: f64,
    class: &str,
    pixel_ratio: f64,
    scale: f64,
) -> Result<HtmlCanvasElement, RenderError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| RenderError::Canvas("no window document".into()))?;
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|_| RenderError::Canvas("failed to create canvas element".into()))?
        .dyn_into()
        .map_err(|_| RenderError::Canvas("created element is not a canvas".into()))?;
    canvas.set_class_name(class);
    canvas.set_width((width * pixel_ratio * scale) as u32);
    canvas.set_height((height * pixel_ratio * scale) as u32);
    container
        .append_child(&canvas)
        .map_err(|_| RenderError::Canvas("failed to attach canvas".into()))?;
    Ok(canvas)
}
