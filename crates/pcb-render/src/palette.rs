use web_sys::Element;

/// A missing or empty theme token resolves to this deliberately loud
/// color instead of failing.
const FALLBACK: &str = "red";

/// Resolved colors for every token the renderer draws with. Passed to
/// the renderer at construction; nothing in the render path reads the
/// environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub edge_cuts: String,
    pub board: String,
    pub pad: String,
    pub hole: String,
    pub pin1: String,
    pub silk: String,
    pub highlight_stroke: String,
    pub highlight_fill: String,
}

impl Default for Palette {
    fn default() -> Self {
        let red = || FALLBACK.to_string();
        Self {
            edge_cuts: red(),
            board: red(),
            pad: red(),
            hole: red(),
            pin1: red(),
            silk: red(),
            highlight_stroke: red(),
            highlight_fill: red(),
        }
    }
}

impl Palette {
    /// Resolve the theme tokens (`--edge-cuts`, `--board`, …) from an
    /// element's computed style.
    pub fn from_element(elem: &Element) -> Self {
        let style = web_sys::window().and_then(|w| w.get_computed_style(elem).ok().flatten());
        let token = |name: &str| -> String {
            let value = style
                .as_ref()
                .and_then(|s| s.get_property_value(name).ok())
                .unwrap_or_default();
            let value = value.trim();
            if value.is_empty() {
                FALLBACK.to_string()
            } else {
                value.to_string()
            }
        };
        Self {
            edge_cuts: token("--edge-cuts"),
            board: token("--board"),
            pad: token("--pad"),
            hole: token("--hole"),
            pin1: token("--pin1"),
            silk: token("--silk"),
            highlight_stroke: token("--highlight-stroke"),
            highlight_fill: token("--highlight-fill"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fallback() {
        let palette = Palette::default();
        assert_eq!(palette.pad, "red");
        assert_eq!(palette.highlight_fill, "red");
    }
}
