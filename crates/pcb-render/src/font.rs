use crate::error::RenderError;
use crate::pcbdata::{FontData, Glyph, TextItem};

/// A stroke produced by shaping, in text-local coordinates (y grows
/// downward, baseline at y = 0 for the first line).
#[derive(Debug, Clone, PartialEq)]
pub enum StrokeCommand {
    Polyline(Vec<[f64; 2]>),
    Overbar { start: [f64; 2], end: [f64; 2] },
}

/// Placement applied to a shaped block before stroking, in this order:
/// translate to `pos`, shift right by `thickness / 2`, mirror
/// horizontally if `mirror`, rotate by `angle` degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextTransform {
    pub pos: [f64; 2],
    pub angle: f64,
    pub mirror: bool,
    pub thickness: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapedText {
    pub strokes: Vec<StrokeCommand>,
    pub transform: TextTransform,
}

const ITALIC_TILT: f64 = 0.125;
const OVERBAR_RISE: f64 = 1.4;

/// Lay out a text item against a stroke font.
///
/// Reproduces the source CAD tool's layout rules: lines separated by
/// `height * 1.5 + thickness`, each line justified independently on the
/// horizontal axis and the block as a whole on the vertical axis, tab
/// stops every four space-advances, `~` toggling an overbar run (`~~`
/// escapes a literal tilde), italic shear applied per point.
///
/// Pure: identical input yields identical strokes. Characters missing
/// from the font are skipped and logged, the rest of the item renders.
pub fn shape(text: &TextItem, font: &FontData) -> ShapedText {
    let mirror = text.is_mirrored();
    let mut angle = -text.angle;
    if mirror {
        angle = -angle;
    }
    let tilt = if text.is_italic() { ITALIC_TILT } else { 0.0 };
    let justify_h = text.justify[0] as f64;
    let justify_v = text.justify[1] as f64;
    let interline = text.height * 1.5 + text.thickness;

    let mut lines: Vec<&str> = text.text.split('\n').collect();
    // A trailing newline produces no extra line.
    if lines.last() == Some(&"") {
        lines.pop();
    }

    // Single-line offset, then shift multi-line blocks so they justify
    // as a unit.
    let mut offsety = (1.0 - justify_v) / 2.0 * text.height;
    offsety -= lines.len().saturating_sub(1) as f64 * (justify_v + 1.0) / 2.0 * interline;

    let mut strokes = Vec::new();
    // Joins consecutive overbarred characters into one segment; local to
    // this shaping pass.
    let mut last_had_overbar = false;

    for line in &lines {
        let chars: Vec<char> = line.chars().collect();
        let line_width = measure_line(&chars, text, font, tilt, interline);
        let mut offsetx = -line_width * (justify_h + 1.0) / 2.0;
        let mut in_overbar = false;

        let mut j = 0;
        while j < chars.len() {
            let mut ch = chars[j];
            if ch == '\t' {
                offsetx = next_tab_stop(offsetx, text, font);
                j += 1;
                continue;
            }
            if ch == '~' {
                j += 1;
                if j >= chars.len() {
                    break;
                }
                ch = chars[j];
                if ch != '~' {
                    in_overbar = !in_overbar;
                }
            }

            let Some(glyph) = lookup(font, ch) else {
                log::warn!("{}", RenderError::MissingGlyph { ch });
                j += 1;
                continue;
            };

            if in_overbar {
                emit_overbar(
                    &mut strokes,
                    glyph,
                    text,
                    offsetx,
                    offsety,
                    tilt,
                    &mut last_had_overbar,
                );
            } else {
                last_had_overbar = false;
            }

            for line_points in &glyph.l {
                let points: Vec<[f64; 2]> = line_points
                    .iter()
                    .map(|p| font_point(*p, text, offsetx, offsety, tilt, justify_h))
                    .collect();
                if points.len() >= 2 {
                    strokes.push(StrokeCommand::Polyline(points));
                }
            }

            offsetx += glyph.w * text.width;
            j += 1;
        }

        offsety += interline;
    }

    ShapedText {
        strokes,
        transform: TextTransform {
            pos: text.pos,
            angle,
            mirror,
            thickness: text.thickness,
        },
    }
}

fn lookup<'f>(font: &'f FontData, ch: char) -> Option<&'f Glyph> {
    font.get(ch.to_string().as_str())
}

/// Total rendered width of one line; needed before emitting so the line
/// can be justified.
fn measure_line(chars: &[char], text: &TextItem, font: &FontData, tilt: f64, interline: f64) -> f64 {
    let mut width = text.thickness + interline / 2.0 * tilt;
    let mut j = 0;
    while j < chars.len() {
        let mut ch = chars[j];
        if ch == '\t' {
            width = next_tab_stop(width, text, font);
            j += 1;
            continue;
        }
        if ch == '~' {
            j += 1;
            if j >= chars.len() {
                break;
            }
            ch = chars[j];
        }
        if let Some(glyph) = lookup(font, ch) {
            width += glyph.w * text.width;
        }
        j += 1;
    }
    width
}

/// Advance to the next multiple of four space-advances. Always moves
/// forward, even from exactly on a stop.
fn next_tab_stop(cursor: f64, text: &TextItem, font: &FontData) -> f64 {
    let Some(space) = font.get(" ") else {
        return cursor;
    };
    let four_spaces = 4.0 * space.w * text.width;
    if four_spaces <= 0.0 {
        return cursor;
    }
    cursor + four_spaces - cursor.rem_euclid(four_spaces)
}

/// Map a glyph-space point into line space, applying the italic shear.
/// The shear grows with the point's vertical position about the
/// horizontal anchor, approximating how the source CAD tool tilts text.
fn font_point(
    point: [f64; 2],
    text: &TextItem,
    offsetx: f64,
    offsety: f64,
    tilt: f64,
    justify_h: f64,
) -> [f64; 2] {
    let mut x = point[0] * text.width + offsetx;
    let y = point[1] * text.height + offsety;
    x -= (point[1] + 0.5 * (1.0 + justify_h)) * text.height * tilt;
    [x, y]
}

/// Overbar over one glyph advance. Consecutive overbarred characters
/// extend the previous segment into one contiguous bar; a fresh run is
/// nudged right so italic shear does not collide with it.
fn emit_overbar(
    strokes: &mut Vec<StrokeCommand>,
    glyph: &Glyph,
    text: &TextItem,
    offsetx: f64,
    offsety: f64,
    tilt: f64,
    last_had_overbar: &mut bool,
) {
    let y = -text.height * OVERBAR_RISE + offsety;
    let mut start = [offsetx, y];
    let end = [offsetx + text.width * glyph.w, y];

    if *last_had_overbar {
        if let Some(StrokeCommand::Overbar { end: prev_end, .. }) = strokes.last_mut() {
            if (prev_end[0] - start[0]).abs() < 1e-9 && (prev_end[1] - y).abs() < 1e-9 {
                *prev_end = end;
                return;
            }
        }
    } else {
        start[0] += text.height * OVERBAR_RISE * tilt;
        *last_had_overbar = true;
    }

    strokes.push(StrokeCommand::Overbar { start, end });
}
