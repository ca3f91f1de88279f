use std::collections::HashSet;
use std::f64::consts::PI;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Path2d};

use crate::error::RenderError;
use crate::font;
use crate::palette::Palette;
use crate::path::{self, PathCache, PolyKey, PolySource};
use crate::pcbdata::{DrawItem, Drawing, Footprint, FootprintBBox, FontData, Pad, Side, TextItem};
use crate::transform::{deg2rad, Affine};

/// Stroke width for pad and highlight outlines, in board units.
const OUTLINE_WIDTH: f64 = 1.0 / 4.0;

/// One drawing surface: a canvas plus its 2d context.
pub struct Draw {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Draw {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, RenderError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| RenderError::Canvas("2d context request failed".into()))?
            .ok_or_else(|| RenderError::Canvas("canvas has no 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RenderError::Canvas("2d context has unexpected type".into()))?;
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn set_transform(&self, t: &Affine) {
        self.ctx
            .set_transform(t.a, t.b, t.c, t.d, t.e, t.f)
            .unwrap();
    }

    /// Fill the whole surface with the board color, ignoring the current
    /// transform.
    pub fn clear(&self, board_color: &str) {
        let ctx = &self.ctx;
        ctx.save();
        ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).unwrap();
        ctx.set_fill_style_str(board_color);
        ctx.fill_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
        ctx.restore();
    }

    // ─── Items ──────────────────────────────────────────────────────

    pub fn items(
        &self,
        items: &[DrawItem],
        source: PolySource,
        color: &str,
        font_data: &FontData,
        cache: &mut PathCache,
    ) {
        for (index, item) in items.iter().enumerate() {
            self.item(item, PolyKey { source, index }, color, font_data, cache);
        }
    }

    fn item(
        &self,
        item: &DrawItem,
        key: PolyKey,
        color: &str,
        font_data: &FontData,
        cache: &mut PathCache,
    ) {
        match item {
            DrawItem::Text(text) => self.text(text, color, font_data),
            DrawItem::Shape(drawing) => self.shape_item(drawing, key, color, cache),
        }
    }

    /// Board-outline pass: outline primitives only, polygons cached.
    pub fn edges(&self, edges: &[Drawing], color: &str, cache: &mut PathCache) {
        for (index, drawing) in edges.iter().enumerate() {
            self.shape_item(
                drawing,
                PolyKey {
                    source: PolySource::Edges,
                    index,
                },
                color,
                cache,
            );
        }
    }

    fn shape_item(&self, drawing: &Drawing, key: PolyKey, color: &str, cache: &mut PathCache) {
        match drawing {
            Drawing::Polygon {
                pos,
                angle,
                polygons,
                filled,
                width,
            } => {
                let cached = cache.polygon(key, polygons);
                self.polygon(*pos, *angle, *filled, *width, cached.path2d(), color);
            }
            other => self.edge(other, color),
        }
    }

    fn edge(&self, drawing: &Drawing, color: &str) {
        let ctx = &self.ctx;
        ctx.set_stroke_style_str(color);
        ctx.set_fill_style_str(color);
        ctx.set_line_cap("round");
        ctx.set_line_join("round");

        match drawing {
            Drawing::Segment { start, end, width } => {
                ctx.set_line_width(*width);
                ctx.begin_path();
                ctx.move_to(start[0], start[1]);
                ctx.line_to(end[0], end[1]);
                ctx.stroke();
            }
            Drawing::Rect { start, end, width } => {
                ctx.set_line_width(*width);
                ctx.begin_path();
                ctx.move_to(start[0], start[1]);
                ctx.line_to(start[0], end[1]);
                ctx.line_to(end[0], end[1]);
                ctx.line_to(end[0], start[1]);
                ctx.line_to(start[0], start[1]);
                ctx.stroke();
            }
            Drawing::Arc {
                start,
                radius,
                startangle,
                endangle,
                width,
            } => {
                ctx.set_line_width(*width);
                ctx.begin_path();
                ctx.arc(
                    start[0],
                    start[1],
                    *radius,
                    deg2rad(*startangle),
                    deg2rad(*endangle),
                )
                .unwrap();
                ctx.stroke();
            }
            Drawing::Circle {
                start,
                radius,
                width,
                filled,
            } => {
                ctx.set_line_width(*width);
                ctx.begin_path();
                ctx.arc(start[0], start[1], *radius, 0.0, 2.0 * PI).unwrap();
                ctx.close_path();
                if filled.is_some_and(|f| f != 0) {
                    ctx.fill();
                } else {
                    ctx.stroke();
                }
            }
            Drawing::Curve {
                start,
                end,
                cpa,
                cpb,
                width,
            } => {
                ctx.set_line_width(*width);
                ctx.begin_path();
                ctx.move_to(start[0], start[1]);
                ctx.bezier_curve_to(cpa[0], cpa[1], cpb[0], cpb[1], end[0], end[1]);
                ctx.stroke();
            }
            // Polygons normally take the cached route in shape_item.
            Drawing::Polygon {
                pos,
                angle,
                polygons,
                filled,
                width,
            } => {
                let path = path::polygons_path(polygons).to_path2d();
                self.polygon(*pos, *angle, *filled, *width, &path, color);
            }
        }
    }

    /// Filled unless the item explicitly opts out.
    fn polygon(
        &self,
        pos: [f64; 2],
        angle: f64,
        filled: Option<u8>,
        width: f64,
        path: &Path2d,
        color: &str,
    ) {
        let ctx = &self.ctx;
        ctx.save();
        ctx.translate(pos[0], pos[1]).unwrap();
        ctx.rotate(deg2rad(-angle)).unwrap();
        if filled.is_none_or(|f| f != 0) {
            ctx.set_fill_style_str(color);
            ctx.fill_with_path_2d(path);
        } else {
            ctx.set_stroke_style_str(color);
            ctx.set_line_width(width);
            ctx.set_line_cap("round");
            ctx.set_line_join("round");
            ctx.stroke_with_path(path);
        }
        ctx.restore();
    }

    fn text(&self, text: &TextItem, color: &str, font_data: &FontData) {
        let shaped = font::shape(text, font_data);
        let ctx = &self.ctx;
        ctx.save();
        ctx.set_fill_style_str(color);
        ctx.set_stroke_style_str(color);
        ctx.set_line_cap("round");
        ctx.set_line_join("round");
        ctx.set_line_width(shaped.transform.thickness);

        let t = &shaped.transform;
        ctx.translate(t.pos[0], t.pos[1]).unwrap();
        ctx.translate(t.thickness * 0.5, 0.0).unwrap();
        if t.mirror {
            ctx.scale(-1.0, 1.0).unwrap();
        }
        ctx.rotate(deg2rad(t.angle)).unwrap();

        for stroke in &shaped.strokes {
            match stroke {
                font::StrokeCommand::Polyline(points) => {
                    ctx.begin_path();
                    ctx.move_to(points[0][0], points[0][1]);
                    for p in &points[1..] {
                        ctx.line_to(p[0], p[1]);
                    }
                    ctx.stroke();
                }
                font::StrokeCommand::Overbar { start, end } => {
                    ctx.begin_path();
                    ctx.move_to(start[0], start[1]);
                    ctx.line_to(end[0], end[1]);
                    ctx.stroke();
                }
            }
        }
        ctx.restore();
    }

    // ─── Pads and footprints ────────────────────────────────────────

    pub fn pad(&self, pad: &Pad, path: &Path2d, color: &str, outline: bool) {
        let ctx = &self.ctx;
        ctx.save();
        ctx.translate(pad.pos[0], pad.pos[1]).unwrap();
        ctx.rotate(deg2rad(pad.angle.unwrap_or(0.0))).unwrap();
        if let Some(offset) = pad.offset {
            ctx.translate(offset[0], offset[1]).unwrap();
        }
        ctx.set_fill_style_str(color);
        ctx.set_stroke_style_str(color);
        if outline {
            ctx.stroke_with_path(path);
        } else {
            ctx.fill_with_path_2d(path);
        }
        ctx.restore();
    }

    /// Drill holes go through the board, so they are drawn for every
    /// side.
    pub fn pad_hole(&self, pad: &Pad, color: &str) {
        if !pad.is_through_hole() {
            return;
        }
        let Some(drill) = path::drill_path(pad) else {
            return;
        };
        let ctx = &self.ctx;
        ctx.save();
        ctx.translate(pad.pos[0], pad.pos[1]).unwrap();
        ctx.rotate(deg2rad(pad.angle.unwrap_or(0.0))).unwrap();
        ctx.set_fill_style_str(color);
        ctx.fill_with_path_2d(&drill.to_path2d());
        ctx.restore();
    }

    #[allow(clippy::too_many_arguments)]
    pub fn footprint(
        &self,
        side: Side,
        footprint: &Footprint,
        fp_index: usize,
        highlighted: bool,
        pin_one_highlighted: bool,
        palette: &Palette,
        font_data: &FontData,
        cache: &mut PathCache,
    ) {
        for (index, drawing) in footprint.drawings.iter().enumerate() {
            if drawing.layer == side {
                let key = PolyKey {
                    source: PolySource::Footprint(fp_index),
                    index,
                };
                self.item(&drawing.drawing, key, &palette.pad, font_data, cache);
            }
        }

        // The drawings pass sets per-item stroke widths; reset for the
        // pin-1 and highlight outlines.
        self.ctx.set_line_width(OUTLINE_WIDTH);
        for (pad_index, pad) in footprint.pads.iter().enumerate() {
            if pad.on_side(side) {
                let path = cache.pad((fp_index, pad_index), pad);
                self.pad(pad, path.path2d(), &palette.pad, false);
                if pad.is_pin1() && pin_one_highlighted {
                    self.pad(pad, path.path2d(), &palette.pin1, true);
                }
            }
        }

        for pad in &footprint.pads {
            self.pad_hole(pad, &palette.hole);
        }

        if highlighted && footprint.layer == side {
            self.highlight_bbox(&footprint.bbox, palette);
        }
    }

    fn highlight_bbox(&self, bbox: &FootprintBBox, palette: &Palette) {
        let ctx = &self.ctx;
        ctx.save();
        ctx.translate(bbox.pos[0], bbox.pos[1]).unwrap();
        ctx.rotate(deg2rad(-bbox.angle)).unwrap();
        ctx.translate(bbox.relpos[0], bbox.relpos[1]).unwrap();
        ctx.set_fill_style_str(&palette.highlight_fill);
        ctx.fill_rect(0.0, 0.0, bbox.size[0], bbox.size[1]);
        ctx.set_stroke_style_str(&palette.highlight_stroke);
        ctx.stroke_rect(0.0, 0.0, bbox.size[0], bbox.size[1]);
        ctx.restore();
    }

    #[allow(clippy::too_many_arguments)]
    pub fn footprints(
        &self,
        footprints: &[Footprint],
        side: Side,
        highlighted: &HashSet<String>,
        pin_one_highlighted: &HashSet<String>,
        palette: &Palette,
        font_data: &FontData,
        cache: &mut PathCache,
    ) {
        for (fp_index, footprint) in footprints.iter().enumerate() {
            self.footprint(
                side,
                footprint,
                fp_index,
                highlighted.contains(&footprint.ref_),
                pin_one_highlighted.contains(&footprint.ref_),
                palette,
                font_data,
                cache,
            );
        }
    }
}
