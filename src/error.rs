use crate::backend::{LayerHandle, MapHandle};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for map loading and ingestion.
///
/// Everything here is fatal to the operation that raised it; faults that are
/// isolated to a single layer are reported as [`LayerFault`] records instead.
#[derive(Debug, Error)]
pub enum EditorError {
    /// JSON parse error in uploaded or loaded map text.
    #[error("failed to parse map JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// File I/O error.
    #[error("reading {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Unsupported map file format (non-JSON).
    #[error("unsupported map file format: {0}")]
    UnsupportedFormat(String),
    /// The map document carries no layers at all.
    #[error("map document has no layers")]
    NoLayers,
    /// The renderer refused to create the map container.
    #[error("creating {width}x{height} map container: {source}")]
    Container {
        /// Requested container width in tiles.
        width: u32,
        /// Requested container height in tiles.
        height: u32,
        /// Underlying renderer error.
        source: BackendError,
    },
    /// The renderer could not bind the tileset to the container.
    #[error("binding tileset '{key}': {source}")]
    TilesetBind {
        /// Tileset key that failed to bind.
        key: String,
        /// Underlying renderer error.
        source: BackendError,
    },
}

/// A failure while building one layer.
///
/// Recorded in the ingestion outcome list and logged; never aborts sibling
/// layers.
#[derive(Debug, Error)]
pub enum LayerFault {
    /// `data` length does not match the layer's declared dimensions.
    #[error("data length {actual} does not match {expected} cells")]
    DataLength {
        /// `width * height` of the layer entry.
        expected: usize,
        /// Actual `data` length.
        actual: usize,
    },
    /// The renderer rejected a per-layer operation.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Error raised by a [`TilemapBackend`](crate::backend::TilemapBackend)
/// operation.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Map container dimensions are unusable (zero tiles or zero cell size).
    #[error("unusable map container size: {width}x{height} tiles of {tile_width}x{tile_height}px")]
    InvalidDimensions {
        /// Width in tiles.
        width: u32,
        /// Height in tiles.
        height: u32,
        /// Cell width in pixels.
        tile_width: u32,
        /// Cell height in pixels.
        tile_height: u32,
    },
    /// No tileset resource is registered under the key.
    #[error("no tileset registered under key '{0}'")]
    UnknownTileset(String),
    /// The map handle does not refer to a live container.
    #[error("{0} is not live")]
    StaleMap(MapHandle),
    /// The layer handle does not refer to a live layer.
    #[error("{0} is not live")]
    StaleLayer(LayerHandle),
    /// Cell coordinates fall outside the layer.
    #[error("cell ({x},{y}) outside layer bounds {width}x{height}")]
    CellOutOfBounds {
        /// Cell x.
        x: u32,
        /// Cell y.
        y: u32,
        /// Layer width in tiles.
        width: u32,
        /// Layer height in tiles.
        height: u32,
    },
    /// Tile index exceeds the bound tileset's capacity.
    #[error("tile index {index} exceeds tileset capacity {tile_count}")]
    TileOutOfRange {
        /// Rejected renderer tile index.
        index: u32,
        /// Number of tiles the bound tileset holds.
        tile_count: u32,
    },
}
