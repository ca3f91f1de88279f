use std::cell::OnceCell;
use std::collections::HashMap;
use std::f64::consts::PI;
use std::rc::Rc;

use web_sys::Path2d;

use crate::error::RenderError;
use crate::pcbdata::{Pad, Side};

/// A single canvas-style path command. Paths are plain data so the
/// geometry can be built and inspected without a drawing surface.
#[derive(Debug, Clone, PartialEq)]
pub enum PathCmd {
    MoveTo([f64; 2]),
    LineTo([f64; 2]),
    /// Tangent-tangent arc through two control points, as canvas `arcTo`.
    ArcTo {
        ctrl1: [f64; 2],
        ctrl2: [f64; 2],
        radius: f64,
    },
    /// Circular arc around `center`; angles in radians.
    Arc {
        center: [f64; 2],
        radius: f64,
        start: f64,
        end: f64,
    },
    Rect {
        origin: [f64; 2],
        size: [f64; 2],
    },
    Close,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    cmds: Vec<PathCmd>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.cmds.push(PathCmd::MoveTo([x, y]));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.cmds.push(PathCmd::LineTo([x, y]));
    }

    fn arc_to(&mut self, ctrl1: [f64; 2], ctrl2: [f64; 2], radius: f64) {
        self.cmds.push(PathCmd::ArcTo {
            ctrl1,
            ctrl2,
            radius,
        });
    }

    fn arc(&mut self, center: [f64; 2], radius: f64, start: f64, end: f64) {
        self.cmds.push(PathCmd::Arc {
            center,
            radius,
            start,
            end,
        });
    }

    fn rect(&mut self, origin: [f64; 2], size: [f64; 2]) {
        self.cmds.push(PathCmd::Rect { origin, size });
    }

    fn close(&mut self) {
        self.cmds.push(PathCmd::Close);
    }

    pub fn commands(&self) -> &[PathCmd] {
        &self.cmds
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Bounding box of the path as `[min, max]` corners. Exact for line
    /// and rect geometry; arc commands contribute conservative extents
    /// (control points for `ArcTo`, the full circle for `Arc`).
    pub fn bounds(&self) -> Option<[[f64; 2]; 2]> {
        let mut min = [f64::INFINITY, f64::INFINITY];
        let mut max = [f64::NEG_INFINITY, f64::NEG_INFINITY];
        let mut include = |p: [f64; 2]| {
            min[0] = min[0].min(p[0]);
            min[1] = min[1].min(p[1]);
            max[0] = max[0].max(p[0]);
            max[1] = max[1].max(p[1]);
        };
        let mut any = false;
        for cmd in &self.cmds {
            match cmd {
                PathCmd::MoveTo(p) | PathCmd::LineTo(p) => {
                    include(*p);
                    any = true;
                }
                PathCmd::ArcTo { ctrl1, ctrl2, .. } => {
                    include(*ctrl1);
                    include(*ctrl2);
                    any = true;
                }
                PathCmd::Arc { center, radius, .. } => {
                    include([center[0] - radius, center[1] - radius]);
                    include([center[0] + radius, center[1] + radius]);
                    any = true;
                }
                PathCmd::Rect { origin, size } => {
                    include(*origin);
                    include([origin[0] + size[0], origin[1] + size[1]]);
                    any = true;
                }
                PathCmd::Close => {}
            }
        }
        any.then_some([min, max])
    }

    /// Realize into a `Path2d`. Only callable where a canvas exists.
    pub fn to_path2d(&self) -> Path2d {
        let path = Path2d::new().unwrap();
        for cmd in &self.cmds {
            match cmd {
                PathCmd::MoveTo(p) => path.move_to(p[0], p[1]),
                PathCmd::LineTo(p) => path.line_to(p[0], p[1]),
                PathCmd::ArcTo {
                    ctrl1,
                    ctrl2,
                    radius,
                } => path
                    .arc_to(ctrl1[0], ctrl1[1], ctrl2[0], ctrl2[1], *radius)
                    .unwrap(),
                PathCmd::Arc {
                    center,
                    radius,
                    start,
                    end,
                } => path.arc(center[0], center[1], *radius, *start, *end).unwrap(),
                PathCmd::Rect { origin, size } => path.rect(origin[0], origin[1], size[0], size[1]),
                PathCmd::Close => path.close_path(),
            }
        }
        path
    }
}

// ─── Path builders ──────────────────────────────────────────────────

/// Rectangle with each corner either rounded (`radius`) or cut by a
/// straight chamfer of `min(w, h) * chamfratio`, centered at the origin.
///
/// `chamfpos` is a bitmask: left = 1, right = 2, bottom left = 4,
/// bottom right = 8.
pub fn chamfered_rect_path(size: [f64; 2], radius: f64, chamfpos: u8, chamfratio: f64) -> Path {
    let mut path = Path::new();
    let width = size[0];
    let height = size[1];
    let x = width * -0.5;
    let y = height * -0.5;
    let chamf_offset = width.min(height) * chamfratio;

    path.move_to(x, 0.0);

    if chamfpos & 4 != 0 {
        path.line_to(x, y + height - chamf_offset);
        path.line_to(x + chamf_offset, y + height);
        path.line_to(0.0, y + height);
    } else {
        path.arc_to([x, y + height], [x + width, y + height], radius);
    }

    if chamfpos & 8 != 0 {
        path.line_to(x + width - chamf_offset, y + height);
        path.line_to(x + width, y + height - chamf_offset);
        path.line_to(x + width, 0.0);
    } else {
        path.arc_to([x + width, y + height], [x + width, y], radius);
    }

    if chamfpos & 2 != 0 {
        path.line_to(x + width, y + chamf_offset);
        path.line_to(x + width - chamf_offset, y);
        path.line_to(0.0, y);
    } else {
        path.arc_to([x + width, y], [x, y], radius);
    }

    if chamfpos & 1 != 0 {
        path.line_to(x + chamf_offset, y);
        path.line_to(x, y + chamf_offset);
        path.line_to(x, 0.0);
    } else {
        path.arc_to([x, y], [x, y + height], radius);
    }

    path.close();
    path
}

/// Stadium shape: a rectangle whose short sides are full semicircles.
pub fn oblong_path(size: [f64; 2]) -> Path {
    chamfered_rect_path(size, size[0].min(size[1]) / 2.0, 0, 0.0)
}

pub fn circle_path(radius: f64) -> Path {
    let mut path = Path::new();
    path.arc([0.0, 0.0], radius, 0.0, 2.0 * PI);
    path.close();
    path
}

/// One closed subpath per ring; rings may be disjoint (pads with holes).
pub fn polygons_path(polygons: &[Vec<[f64; 2]>]) -> Path {
    let mut path = Path::new();
    for polygon in polygons {
        if let Some(first) = polygon.first() {
            path.move_to(first[0], first[1]);
            for pt in &polygon[1..] {
                path.line_to(pt[0], pt[1]);
            }
            path.close();
        }
    }
    path
}

/// Build the outline path for a pad, dispatching on its shape tag.
pub fn pad_path(pad: &Pad) -> Result<Path, RenderError> {
    match pad.shape.as_str() {
        "rect" => {
            let mut path = Path::new();
            path.rect([-pad.size[0] * 0.5, -pad.size[1] * 0.5], pad.size);
            Ok(path)
        }
        "oval" => Ok(oblong_path(pad.size)),
        "circle" => Ok(circle_path(pad.size[0] / 2.0)),
        "roundrect" => Ok(chamfered_rect_path(
            pad.size,
            pad.radius.unwrap_or(0.0),
            0,
            0.0,
        )),
        "chamfrect" => Ok(chamfered_rect_path(
            pad.size,
            pad.radius.unwrap_or(0.0),
            pad.chamfpos.unwrap_or(0),
            pad.chamfratio.unwrap_or(0.0),
        )),
        "custom" => match &pad.polygons {
            Some(polygons) => Ok(polygons_path(polygons)),
            None => {
                log::warn!("custom pad at {:?} has no outline polygons", pad.pos);
                Ok(Path::new())
            }
        },
        other => Err(RenderError::UnknownShape {
            shape: other.to_string(),
        }),
    }
}

/// Drill hole path for a through-hole pad, if it has one.
pub fn drill_path(pad: &Pad) -> Option<Path> {
    let drillsize = pad.drillsize?;
    let path = match pad.drillshape.as_deref() {
        Some("oblong") => oblong_path(drillsize),
        Some("rect") => chamfered_rect_path(drillsize, 0.0, 0, 0.0),
        _ => circle_path(drillsize[0] / 2.0),
    };
    Some(path)
}

// ─── Path cache ─────────────────────────────────────────────────────

/// Where a cacheable polygon item lives in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolySource {
    Edges,
    Silk(Side),
    Footprint(usize),
}

/// Stable identity of a polygon item: its container plus item index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PolyKey {
    pub source: PolySource,
    pub index: usize,
}

/// An immutable path plus its lazily realized `Path2d`. The `Path2d` is
/// only built on a real canvas target; host-side tests inspect the
/// geometry alone.
pub struct CachedPath {
    path: Path,
    realized: OnceCell<Path2d>,
}

impl CachedPath {
    fn new(path: Path) -> Self {
        Self {
            path,
            realized: OnceCell::new(),
        }
    }

    pub fn geometry(&self) -> &Path {
        &self.path
    }

    pub fn path2d(&self) -> &Path2d {
        self.realized.get_or_init(|| self.path.to_path2d())
    }
}

/// Memoizes pad and polygon paths for the lifetime of a document.
/// Geometry is immutable after load, so entries are never invalidated;
/// repeat lookups return the same `Rc`.
#[derive(Default)]
pub struct PathCache {
    pads: HashMap<(usize, usize), Rc<CachedPath>>,
    polygons: HashMap<PolyKey, Rc<CachedPath>>,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path for the pad at `(footprint index, pad index)`. An
    /// unrecognized shape tag is logged once and cached as an empty path.
    pub fn pad(&mut self, key: (usize, usize), pad: &Pad) -> Rc<CachedPath> {
        if let Some(cached) = self.pads.get(&key) {
            return Rc::clone(cached);
        }
        let path = match pad_path(pad) {
            Ok(path) => path,
            Err(err) => {
                log::error!("{err}");
                Path::new()
            }
        };
        let cached = Rc::new(CachedPath::new(path));
        self.pads.insert(key, Rc::clone(&cached));
        cached
    }

    pub fn polygon(&mut self, key: PolyKey, polygons: &[Vec<[f64; 2]>]) -> Rc<CachedPath> {
        if let Some(cached) = self.polygons.get(&key) {
            return Rc::clone(cached);
        }
        let cached = Rc::new(CachedPath::new(polygons_path(polygons)));
        self.polygons.insert(key, Rc::clone(&cached));
        cached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn smd_pad(shape: &str, size: [f64; 2]) -> Pad {
        Pad {
            layers: vec![Side::Front],
            pos: [0.0, 0.0],
            size,
            shape: shape.to_string(),
            pad_type: "smd".to_string(),
            angle: None,
            pin1: None,
            offset: None,
            radius: None,
            chamfpos: None,
            chamfratio: None,
            drillshape: None,
            drillsize: None,
            polygons: None,
        }
    }

    #[test]
    fn test_rect_pad_bounds() {
        let path = pad_path(&smd_pad("rect", [2.0, 1.0])).unwrap();
        let [min, max] = path.bounds().unwrap();
        assert_relative_eq!(min[0], -1.0);
        assert_relative_eq!(min[1], -0.5);
        assert_relative_eq!(max[0], 1.0);
        assert_relative_eq!(max[1], 0.5);
    }

    #[test]
    fn test_circle_pad_symmetric() {
        let path = pad_path(&smd_pad("circle", [3.0, 3.0])).unwrap();
        let [min, max] = path.bounds().unwrap();
        assert_relative_eq!(min[0], -max[0]);
        assert_relative_eq!(min[1], -max[1]);
        assert_relative_eq!(max[0], 1.5);
    }

    #[test]
    fn test_oval_pad_symmetric() {
        let path = pad_path(&smd_pad("oval", [2.0, 1.0])).unwrap();
        let [min, max] = path.bounds().unwrap();
        assert_relative_eq!(min[0], -1.0);
        assert_relative_eq!(min[1], -0.5);
        assert_relative_eq!(max[0], 1.0);
        assert_relative_eq!(max[1], 0.5);
    }

    #[test]
    fn test_chamfer_mask_zero_is_roundrect() {
        let chamfered = chamfered_rect_path([2.0, 1.0], 0.25, 0, 0.0);
        let round = {
            let mut pad = smd_pad("roundrect", [2.0, 1.0]);
            pad.radius = Some(0.25);
            pad_path(&pad).unwrap()
        };
        assert_eq!(chamfered, round);
        // No chamfer cuts: every corner is an arc.
        assert_eq!(
            chamfered
                .commands()
                .iter()
                .filter(|c| matches!(c, PathCmd::ArcTo { .. }))
                .count(),
            4
        );
    }

    #[test]
    fn test_chamfered_corner_replaces_arc() {
        let path = chamfered_rect_path([2.0, 2.0], 0.0, 0b1111, 0.25);
        assert!(!path.commands().iter().any(|c| matches!(c, PathCmd::ArcTo { .. })));
        // Chamfer cut of min(2,2) * 0.25 = 0.5: first cut point sits
        // half a unit above the bottom-left corner.
        assert!(path
            .commands()
            .iter()
            .any(|c| matches!(c, PathCmd::LineTo(p) if p[0] == -1.0 && p[1] == 0.5)));
    }

    #[test]
    fn test_polygons_path_multiple_rings() {
        let rings = vec![
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
            vec![[2.0, 2.0], [3.0, 2.0], [3.0, 3.0]],
        ];
        let path = polygons_path(&rings);
        let closes = path
            .commands()
            .iter()
            .filter(|c| matches!(c, PathCmd::Close))
            .count();
        let moves = path
            .commands()
            .iter()
            .filter(|c| matches!(c, PathCmd::MoveTo(_)))
            .count();
        assert_eq!(closes, 2);
        assert_eq!(moves, 2);
    }

    #[test]
    fn test_unknown_shape_is_error() {
        let err = pad_path(&smd_pad("trapezoid", [1.0, 1.0])).unwrap_err();
        assert!(err.to_string().contains("trapezoid"));
    }

    #[test]
    fn test_custom_pad_without_polygons_is_empty() {
        let path = pad_path(&smd_pad("custom", [1.0, 1.0])).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn test_cache_returns_same_path() {
        let mut cache = PathCache::new();
        let pad = smd_pad("oval", [2.0, 1.0]);
        let first = cache.pad((0, 0), &pad);
        let second = cache.pad((0, 0), &pad);
        assert!(Rc::ptr_eq(&first, &second));

        // A different pad index is a different entry.
        let third = cache.pad((0, 1), &pad);
        assert!(!Rc::ptr_eq(&first, &third));
    }

    #[test]
    fn test_cache_unknown_shape_empty_path() {
        let mut cache = PathCache::new();
        let pad = smd_pad("trapezoid", [1.0, 1.0]);
        let cached = cache.pad((0, 0), &pad);
        assert!(cached.geometry().is_empty());
        // The empty result is cached too.
        assert!(Rc::ptr_eq(&cached, &cache.pad((0, 0), &pad)));
    }

    #[test]
    fn test_polygon_cache_keyed_by_source() {
        let mut cache = PathCache::new();
        let rings = vec![vec![[0.0, 0.0], [1.0, 0.0], [0.5, 1.0]]];
        let silk = PolyKey {
            source: PolySource::Silk(Side::Front),
            index: 0,
        };
        let edges = PolyKey {
            source: PolySource::Edges,
            index: 0,
        };
        let a = cache.polygon(silk, &rings);
        let b = cache.polygon(silk, &rings);
        let c = cache.polygon(edges, &rings);
        assert!(Rc::ptr_eq(&a, &b));
        assert!(!Rc::ptr_eq(&a, &c));
    }

    #[test]
    fn test_drill_paths() {
        let mut pad = smd_pad("circle", [1.7, 1.7]);
        pad.pad_type = "th".to_string();
        assert!(drill_path(&pad).is_none());

        pad.drillsize = Some([1.0, 1.0]);
        let round = drill_path(&pad).unwrap();
        let [min, max] = round.bounds().unwrap();
        assert_relative_eq!(min[0], -0.5);
        assert_relative_eq!(max[1], 0.5);

        pad.drillshape = Some("oblong".to_string());
        pad.drillsize = Some([1.0, 2.0]);
        let oblong = drill_path(&pad).unwrap();
        assert_eq!(oblong, oblong_path([1.0, 2.0]));
    }
}
