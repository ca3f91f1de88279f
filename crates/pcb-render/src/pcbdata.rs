use serde::Deserialize;
use std::collections::HashMap;

/// Board side. Serialized as `"F"`/`"B"` in the interchange format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Side {
    #[serde(rename = "F")]
    Front,
    #[serde(rename = "B")]
    Back,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Front => "F",
            Side::Back => "B",
        }
    }
}

/// A parsed board description, handed to the renderer by an external
/// loader. Immutable for the renderer's lifetime; unknown fields in the
/// interchange format (BOM tables, metadata, …) are ignored on
/// deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardDocument {
    pub edges_bbox: BBox,
    pub edges: Vec<Drawing>,
    pub drawings: BoardDrawings,
    pub footprints: Vec<Footprint>,
    pub font_data: FontData,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BBox {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl BBox {
    pub fn width(&self) -> f64 {
        self.maxx - self.minx
    }

    pub fn height(&self) -> f64 {
        self.maxy - self.miny
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoardDrawings {
    pub silkscreen: LayerPair<Vec<DrawItem>>,
}

/// One value per board side.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerPair<T> {
    #[serde(rename = "F")]
    pub front: T,
    #[serde(rename = "B")]
    pub back: T,
}

impl<T> LayerPair<T> {
    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Front => &self.front,
            Side::Back => &self.back,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Drawing {
    Segment {
        start: [f64; 2],
        end: [f64; 2],
        width: f64,
    },
    Rect {
        start: [f64; 2],
        end: [f64; 2],
        width: f64,
    },
    Circle {
        start: [f64; 2],
        radius: f64,
        width: f64,
        #[serde(default)]
        filled: Option<u8>,
    },
    Arc {
        start: [f64; 2],
        radius: f64,
        startangle: f64,
        endangle: f64,
        width: f64,
    },
    Curve {
        start: [f64; 2],
        end: [f64; 2],
        cpa: [f64; 2],
        cpb: [f64; 2],
        width: f64,
    },
    Polygon {
        pos: [f64; 2],
        angle: f64,
        polygons: Vec<Vec<[f64; 2]>>,
        #[serde(default)]
        filled: Option<u8>,
        width: f64,
    },
}

/// Stroke-font text. `justify` is -1/0/1 per axis; `width`/`height` scale
/// the glyph coordinates, `thickness` is the stroke width.
#[derive(Debug, Clone, Deserialize)]
pub struct TextItem {
    pub pos: [f64; 2],
    pub text: String,
    pub height: f64,
    pub width: f64,
    pub thickness: f64,
    pub justify: [i8; 2],
    pub angle: f64,
    #[serde(default)]
    pub attr: Vec<String>,
}

impl TextItem {
    pub fn is_mirrored(&self) -> bool {
        self.attr.iter().any(|a| a == "mirrored")
    }

    pub fn is_italic(&self) -> bool {
        self.attr.iter().any(|a| a == "italic")
    }
}

/// A drawable item: either stroke-font text or a shape primitive.
/// Shapes carry a `type` tag, text items do not.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DrawItem {
    Shape(Drawing),
    Text(TextItem),
}

#[derive(Debug, Clone, Deserialize)]
pub struct FootprintDrawing {
    pub layer: Side,
    pub drawing: DrawItem,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Footprint {
    #[serde(rename = "ref")]
    pub ref_: String,
    pub bbox: FootprintBBox,
    pub pads: Vec<Pad>,
    pub drawings: Vec<FootprintDrawing>,
    pub layer: Side,
}

/// Placement of a footprint's highlight box: rotate by `-angle` about
/// `pos`, then offset by `relpos`; `size` is the box extent.
#[derive(Debug, Clone, Deserialize)]
pub struct FootprintBBox {
    pub pos: [f64; 2],
    pub relpos: [f64; 2],
    pub size: [f64; 2],
    pub angle: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pad {
    pub layers: Vec<Side>,
    pub pos: [f64; 2],
    pub size: [f64; 2],
    pub shape: String,
    #[serde(rename = "type")]
    pub pad_type: String,
    #[serde(default)]
    pub angle: Option<f64>,
    #[serde(default)]
    pub pin1: Option<u8>,
    #[serde(default)]
    pub offset: Option<[f64; 2]>,
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default)]
    pub chamfpos: Option<u8>,
    #[serde(default)]
    pub chamfratio: Option<f64>,
    #[serde(default)]
    pub drillshape: Option<String>,
    #[serde(default)]
    pub drillsize: Option<[f64; 2]>,
    #[serde(default)]
    pub polygons: Option<Vec<Vec<[f64; 2]>>>,
}

impl Pad {
    pub fn is_through_hole(&self) -> bool {
        self.pad_type == "th"
    }

    pub fn is_pin1(&self) -> bool {
        self.pin1.is_some_and(|p| p != 0)
    }

    pub fn on_side(&self, side: Side) -> bool {
        self.layers.contains(&side)
    }
}

pub type FontData = HashMap<String, Glyph>;

/// A stroke glyph: open polylines in glyph space plus the advance width,
/// both relative to one unit of text width/height.
#[derive(Debug, Clone, Deserialize)]
pub struct Glyph {
    pub w: f64,
    pub l: Vec<Vec<[f64; 2]>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_document() {
        let json = r#"{
            "edges_bbox": {"minx": 0.0, "miny": 0.0, "maxx": 60.0, "maxy": 40.0},
            "edges": [
                {"type": "rect", "start": [0, 0], "end": [60, 40], "width": 0.2},
                {"type": "arc", "start": [10, 10], "radius": 2.0,
                 "startangle": 0.0, "endangle": 90.0, "width": 0.2}
            ],
            "drawings": {
                "silkscreen": {
                    "F": [
                        {"type": "segment", "start": [1, 1], "end": [2, 2], "width": 0.15},
                        {"pos": [5, 5], "text": "HONK", "height": 1.2, "width": 1.2,
                         "thickness": 0.2, "justify": [0, 0], "angle": 0.0, "attr": ["italic"]}
                    ],
                    "B": []
                }
            },
            "footprints": [
                {
                    "ref": "U1",
                    "layer": "F",
                    "bbox": {"pos": [30, 20], "relpos": [-2, -2], "size": [4, 4], "angle": 0.0},
                    "pads": [
                        {"layers": ["F"], "pos": [29, 20], "size": [2, 1],
                         "shape": "rect", "type": "smd", "pin1": 1},
                        {"layers": ["F", "B"], "pos": [31, 20], "size": [1.7, 1.7],
                         "shape": "circle", "type": "th",
                         "drillshape": "circle", "drillsize": [1.0, 1.0]}
                    ],
                    "drawings": [
                        {"layer": "F", "drawing":
                            {"type": "segment", "start": [28, 18], "end": [32, 18], "width": 0.12}}
                    ]
                }
            ],
            "font_data": {
                "A": {"w": 1.1, "l": [[[0.0, 0.0], [0.5, -1.0]]]}
            },
            "metadata": {"title": "ignored by the renderer"}
        }"#;
        let doc: BoardDocument = serde_json::from_str(json).unwrap();

        assert_eq!(doc.edges.len(), 2);
        assert_eq!(doc.edges_bbox.width(), 60.0);
        assert_eq!(doc.edges_bbox.height(), 40.0);

        let silk_front = doc.drawings.silkscreen.get(Side::Front);
        assert_eq!(silk_front.len(), 2);
        assert!(matches!(silk_front[0], DrawItem::Shape(Drawing::Segment { .. })));
        match &silk_front[1] {
            DrawItem::Text(t) => {
                assert_eq!(t.text, "HONK");
                assert!(t.is_italic());
                assert!(!t.is_mirrored());
            }
            other => panic!("expected text item, got {:?}", other),
        }

        let fp = &doc.footprints[0];
        assert_eq!(fp.ref_, "U1");
        assert_eq!(fp.layer, Side::Front);
        assert!(fp.pads[0].is_pin1());
        assert!(!fp.pads[0].is_through_hole());
        assert!(fp.pads[1].is_through_hole());
        assert!(fp.pads[1].on_side(Side::Back));
        assert!(!fp.pads[0].on_side(Side::Back));
        assert_eq!(fp.drawings[0].layer, Side::Front);

        assert_eq!(doc.font_data["A"].w, 1.1);
    }
}
