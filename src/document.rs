//! Raw map document model: the Tiled-style JSON wire format.

use crate::error::EditorError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

fn default_tile_size() -> u32 {
    32
}

/// One layer entry of a map document.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerDocument {
    /// Layer name. `"platforms"` is the reserved collidable layer name.
    #[serde(default)]
    pub name: String,
    /// Layer type; anything other than `"tilelayer"` is ignored during
    /// ingestion. A missing field counts as a tile layer.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Layer width in tiles.
    #[serde(default)]
    pub width: u32,
    /// Layer height in tiles.
    #[serde(default)]
    pub height: u32,
    /// Row-major cell values; `0` is empty, `N > 0` paints renderer index
    /// `N - 1`. Absent for layers created without content.
    #[serde(default)]
    pub data: Option<Vec<i32>>,
    /// Layer alpha; passed to the renderer unclamped.
    #[serde(default)]
    pub opacity: Option<f32>,
}

impl LayerDocument {
    /// Whether this entry materializes as a tile layer.
    pub fn is_tile_layer(&self) -> bool {
        self.kind.as_deref().unwrap_or("tilelayer") == "tilelayer"
    }

    /// Number of cells the declared dimensions call for.
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// A parsed map document.
///
/// Field names follow the on-wire spelling (`tilewidth`, not `tileWidth`).
/// Parsing is permissive: only malformed JSON fails here, and structural
/// problems surface later as ingestion or renderer errors.
#[derive(Debug, Clone, Deserialize)]
pub struct MapDocument {
    /// Map width in tiles.
    #[serde(default)]
    pub width: u32,
    /// Map height in tiles.
    #[serde(default)]
    pub height: u32,
    /// Cell width in pixels, 32 when absent.
    #[serde(default = "default_tile_size")]
    pub tilewidth: u32,
    /// Cell height in pixels, 32 when absent.
    #[serde(default = "default_tile_size")]
    pub tileheight: u32,
    /// Layer entries in draw order.
    #[serde(default)]
    pub layers: Vec<LayerDocument>,
}

impl MapDocument {
    /// Parses a document from JSON text, e.g. an uploaded map file.
    pub fn from_json_str(text: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads a document from a file path, only supporting JSON.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, EditorError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => {
                let text = fs::read_to_string(path).map_err(|source| EditorError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_json_str(&text)
            }
            _ => Err(EditorError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Default blank document: one empty tile layer covering the whole map.
    ///
    /// Used when a tileset swap completes before any map was loaded.
    pub fn blank(width: u32, height: u32) -> Self {
        let cells = width as usize * height as usize;
        MapDocument {
            width,
            height,
            tilewidth: default_tile_size(),
            tileheight: default_tile_size(),
            layers: vec![LayerDocument {
                name: "Tile Layer 1".to_owned(),
                kind: Some("tilelayer".to_owned()),
                width,
                height,
                data: Some(vec![0; cells]),
                opacity: None,
            }],
        }
    }

    /// Names of every layer in document order, the diagnostic inventory
    /// ingestion logs.
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name.as_str()).collect()
    }
}
