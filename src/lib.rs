#![warn(missing_docs)]

//! Interactive tile map editor & viewer core for Macroquad.
//!
//! Map documents arrive as Tiled-style JSON ([`MapDocument`]), are ingested
//! into renderer layer objects through the [`TilemapBackend`] seam, and are
//! edited through an explicit [`EditorState`]: pick a tile from the tileset
//! preview panel, paint it into the interactive layer, hot-swap the tileset
//! without losing the map. The in-memory [`GridBackend`] backs both the
//! macroquad draw path and the test suite.

mod backend;
mod document;
mod error;
mod ingest;
mod picker;
mod render;
mod state;
mod swap;

pub use backend::{
    GridBackend, GridLayer, GridMap, LayerHandle, MapHandle, TilemapBackend, TilesetSpec,
    EMPTY_TILE,
};
pub use document::{LayerDocument, MapDocument};
pub use error::{BackendError, EditorError, LayerFault};
pub use ingest::{ingest, ActiveMap, LayerOutcome, RenderedLayer, COLLISION_LAYER_NAME};
pub use picker::PreviewPanel;
pub use render::{draw_hover_marker, draw_map, draw_tileset_panel};
pub use state::{EditorState, PointerAction};
pub use swap::{SwapOutcome, SwapTicket, TilesetSwap};
