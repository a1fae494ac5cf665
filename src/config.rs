use std::collections::{BTreeMap, HashMap};

use eframe::egui::Color32;
use thiserror::Error;
use tracing::warn;

const DEFAULT_NODE_COLORS: [(&str, Color32); 4] = [
    ("gene", Color32::from_rgb(0xFF, 0x6B, 0x6B)),
    ("disease", Color32::from_rgb(0x4E, 0xCD, 0xC4)),
    ("drug", Color32::from_rgb(0x45, 0xB7, 0xD1)),
    ("pathway", Color32::from_rgb(0x96, 0xCE, 0xB4)),
];

const FALLBACK_NODE_COLOR: Color32 = Color32::from_rgb(0x99, 0x99, 0x99);

#[derive(Debug, Error, PartialEq)]
pub enum PaletteError {
    #[error("color override is not a JSON object of strings: {0}")]
    Json(String),
    #[error("color for node type `{node_type}` is not a hex color: `{value}`")]
    Color { node_type: String, value: String },
}

#[derive(Clone, Debug)]
pub struct NodePalette {
    colors: HashMap<String, Color32>,
    fallback: Color32,
}

impl Default for NodePalette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_NODE_COLORS
                .iter()
                .map(|(node_type, color)| ((*node_type).to_owned(), *color))
                .collect(),
            fallback: FALLBACK_NODE_COLOR,
        }
    }
}

impl NodePalette {
    /// Builds the palette from an optional override string. A malformed override is logged
    /// and the built-in palette is used unchanged.
    pub fn from_override(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Self::default();
        };

        match Self::try_from_override(raw) {
            Ok(palette) => palette,
            Err(error) => {
                warn!(%error, "ignoring node color override");
                Self::default()
            }
        }
    }

    pub fn try_from_override(raw: &str) -> Result<Self, PaletteError> {
        let unquoted = strip_wrapping_quote(raw.trim());
        let overrides: BTreeMap<String, String> =
            serde_json::from_str(unquoted).map_err(|error| PaletteError::Json(error.to_string()))?;

        let mut palette = Self::default();
        for (node_type, value) in overrides {
            let color = parse_hex_color(&value).ok_or_else(|| PaletteError::Color {
                node_type: node_type.clone(),
                value: value.clone(),
            })?;
            palette.colors.insert(node_type, color);
        }
        Ok(palette)
    }

    pub fn color_for(&self, node_type: &str) -> Color32 {
        self.colors.get(node_type).copied().unwrap_or(self.fallback)
    }
}

fn strip_wrapping_quote(raw: &str) -> &str {
    let raw = raw.strip_prefix(['\'', '"']).unwrap_or(raw);
    raw.strip_suffix(['\'', '"']).unwrap_or(raw)
}

/// `#RGB` or `#RRGGBB`, leading `#` optional.
pub fn parse_hex_color(value: &str) -> Option<Color32> {
    let hex = value.trim().trim_start_matches('#');
    if !hex.chars().all(|digit| digit.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |digits: &str| u8::from_str_radix(digits, 16).ok();
    match hex.len() {
        3 => {
            let mut parts = hex.chars().map(|digit| channel(&format!("{digit}{digit}")));
            Some(Color32::from_rgb(parts.next()??, parts.next()??, parts.next()??))
        }
        6 => Some(Color32::from_rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => None,
    }
}
