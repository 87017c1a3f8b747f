//! Renderer seam: the operations ingestion and painting drive, plus the
//! in-memory grid implementation the editor and the tests run against.

use crate::error::BackendError;
use macroquad::prelude::{vec2, Vec2};
use std::collections::HashMap;
use std::fmt;

/// Cell value a renderer stores for an empty cell, and the index excluded
/// from collision when a layer is marked collidable.
pub const EMPTY_TILE: i32 = -1;

/// Handle to a live map container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapHandle(pub u32);

/// Handle to a live layer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerHandle(pub u32);

impl fmt::Display for MapHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "map#{}", self.0)
    }
}

impl fmt::Display for LayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

/// The tilemap renderer as ingestion sees it.
///
/// Implementations own map containers and layer objects behind opaque
/// handles; destroying a map destroys every layer that belongs to it.
pub trait TilemapBackend {
    /// Creates a map container of `width x height` tiles with the given cell
    /// size in pixels.
    fn create_map(
        &mut self,
        width: u32,
        height: u32,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<MapHandle, BackendError>;

    /// Binds the tileset resource known under `key` to the container.
    fn bind_tileset(&mut self, map: MapHandle, key: &str) -> Result<(), BackendError>;

    /// Creates an empty layer of `width x height` cells at the map origin.
    fn create_layer(
        &mut self,
        map: MapHandle,
        width: u32,
        height: u32,
    ) -> Result<LayerHandle, BackendError>;

    /// Paints renderer tile `index` at cell `(x, y)`.
    fn put_tile(
        &mut self,
        layer: LayerHandle,
        index: u32,
        x: u32,
        y: u32,
    ) -> Result<(), BackendError>;

    /// Sets the layer's alpha. Values are taken as-is, unclamped.
    fn set_layer_alpha(&mut self, layer: LayerHandle, alpha: f32) -> Result<(), BackendError>;

    /// Marks every cell of the layer collidable except those holding
    /// `excluded` (pass [`EMPTY_TILE`] to collide all non-empty cells).
    fn set_collision_excluding(
        &mut self,
        layer: LayerHandle,
        excluded: i32,
    ) -> Result<(), BackendError>;

    /// Destroys one layer. Destroying a stale handle is a no-op.
    fn destroy_layer(&mut self, layer: LayerHandle);

    /// Destroys the container and every layer belonging to it.
    fn destroy_map(&mut self, map: MapHandle);

    /// Converts a world position to tile coordinates, `None` outside the map.
    fn world_to_tile(&self, map: MapHandle, world: Vec2) -> Option<(u32, u32)>;

    /// World position of a tile's top-left corner, `None` outside the map.
    fn tile_to_world(&self, map: MapHandle, x: u32, y: u32) -> Option<Vec2>;
}

/// Grid slicing of a tileset image: column count and tile capacity.
#[derive(Debug, Clone)]
pub struct TilesetSpec {
    /// Tiles per atlas row.
    pub columns: u32,
    /// Total tile count, `None` when unknown (no capacity checking then).
    pub tile_count: Option<u32>,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
}

impl TilesetSpec {
    /// Spec with an explicit column count and capacity.
    pub fn new(columns: u32, tile_count: Option<u32>, tile_width: u32, tile_height: u32) -> Self {
        TilesetSpec {
            columns,
            tile_count,
            tile_width,
            tile_height,
        }
    }

    /// Derives columns and capacity from a tileset image's pixel size.
    pub fn from_image_size(size: Vec2, tile_width: u32, tile_height: u32) -> Self {
        let columns = (size.x / tile_width as f32) as u32;
        let rows = (size.y / tile_height as f32) as u32;
        TilesetSpec {
            columns,
            tile_count: Some(columns * rows),
            tile_width,
            tile_height,
        }
    }
}

/// A live map container in the grid backend.
#[derive(Debug)]
pub struct GridMap {
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Cell width in pixels.
    pub tile_width: u32,
    /// Cell height in pixels.
    pub tile_height: u32,
    /// Key of the bound tileset, if any.
    pub tileset: Option<String>,
}

/// A live layer in the grid backend.
#[derive(Debug)]
pub struct GridLayer {
    /// Owning map container.
    pub map: MapHandle,
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Row-major cells, [`EMPTY_TILE`] for empty.
    pub cells: Vec<i32>,
    /// Layer alpha, 1.0 unless set.
    pub alpha: f32,
    /// Collision exclusion index when the layer is collidable.
    pub collision_exclusion: Option<i32>,
}

impl GridLayer {
    /// Cell value at `(x, y)`, `None` outside the layer.
    pub fn cell(&self, x: u32, y: u32) -> Option<i32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y as usize * self.width as usize + x as usize])
    }

    /// Whether the layer participates in collision at all.
    pub fn is_collidable(&self) -> bool {
        self.collision_exclusion.is_some()
    }

    /// Whether the cell at `(x, y)` collides.
    pub fn collides_at(&self, x: u32, y: u32) -> bool {
        match (self.collision_exclusion, self.cell(x, y)) {
            (Some(excluded), Some(cell)) => cell != excluded,
            _ => false,
        }
    }
}

/// In-memory [`TilemapBackend`]: retained cell grids, no GPU resources.
///
/// The macroquad draw path reads these grids every frame and the test suite
/// asserts against them, so ingestion behaves identically in both worlds.
/// Handles index into slabs and are never reused within a backend's lifetime.
#[derive(Default)]
pub struct GridBackend {
    maps: Vec<Option<GridMap>>,
    layers: Vec<Option<GridLayer>>,
    tilesets: HashMap<String, TilesetSpec>,
}

impl GridBackend {
    /// Empty backend with no registered tilesets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a tileset resource under `key`.
    pub fn register_tileset(&mut self, key: impl Into<String>, spec: TilesetSpec) {
        self.tilesets.insert(key.into(), spec);
    }

    /// Releases the tileset registered under `key`; reports whether it
    /// existed. Maps keep their binding, but their paints are no longer
    /// capacity-checked once the grid info is gone.
    pub fn unregister_tileset(&mut self, key: &str) -> bool {
        self.tilesets.remove(key).is_some()
    }

    /// Spec registered under `key`, if any.
    pub fn tileset(&self, key: &str) -> Option<&TilesetSpec> {
        self.tilesets.get(key)
    }

    /// Live map for `handle`, `None` when destroyed or unknown.
    pub fn map(&self, handle: MapHandle) -> Option<&GridMap> {
        self.maps.get(handle.0 as usize).and_then(|m| m.as_ref())
    }

    /// Live layer for `handle`, `None` when destroyed or unknown.
    pub fn layer(&self, handle: LayerHandle) -> Option<&GridLayer> {
        self.layers.get(handle.0 as usize).and_then(|l| l.as_ref())
    }

    /// Live layers of a map in creation order.
    pub fn layers_of(&self, map: MapHandle) -> impl Iterator<Item = (LayerHandle, &GridLayer)> {
        self.layers.iter().enumerate().filter_map(move |(i, slot)| {
            slot.as_ref()
                .filter(|l| l.map == map)
                .map(|l| (LayerHandle(i as u32), l))
        })
    }

    /// Number of live map containers.
    pub fn live_map_count(&self) -> usize {
        self.maps.iter().filter(|m| m.is_some()).count()
    }

    /// Number of live layers across all maps.
    pub fn live_layer_count(&self) -> usize {
        self.layers.iter().filter(|l| l.is_some()).count()
    }

    fn map_ref(&self, handle: MapHandle) -> Result<&GridMap, BackendError> {
        self.map(handle).ok_or(BackendError::StaleMap(handle))
    }

    fn layer_mut(&mut self, handle: LayerHandle) -> Result<&mut GridLayer, BackendError> {
        self.layers
            .get_mut(handle.0 as usize)
            .and_then(|l| l.as_mut())
            .ok_or(BackendError::StaleLayer(handle))
    }

    fn tile_capacity(&self, map: MapHandle) -> Option<u32> {
        let key = self.map(map)?.tileset.as_deref()?;
        self.tilesets.get(key)?.tile_count
    }
}

impl TilemapBackend for GridBackend {
    fn create_map(
        &mut self,
        width: u32,
        height: u32,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<MapHandle, BackendError> {
        if width == 0 || height == 0 || tile_width == 0 || tile_height == 0 {
            return Err(BackendError::InvalidDimensions {
                width,
                height,
                tile_width,
                tile_height,
            });
        }
        let handle = MapHandle(self.maps.len() as u32);
        self.maps.push(Some(GridMap {
            width,
            height,
            tile_width,
            tile_height,
            tileset: None,
        }));
        Ok(handle)
    }

    fn bind_tileset(&mut self, map: MapHandle, key: &str) -> Result<(), BackendError> {
        self.map_ref(map)?;
        if !self.tilesets.contains_key(key) {
            return Err(BackendError::UnknownTileset(key.to_owned()));
        }
        if let Some(m) = self.maps.get_mut(map.0 as usize).and_then(|m| m.as_mut()) {
            m.tileset = Some(key.to_owned());
        }
        Ok(())
    }

    fn create_layer(
        &mut self,
        map: MapHandle,
        width: u32,
        height: u32,
    ) -> Result<LayerHandle, BackendError> {
        self.map_ref(map)?;
        let handle = LayerHandle(self.layers.len() as u32);
        self.layers.push(Some(GridLayer {
            map,
            width,
            height,
            cells: vec![EMPTY_TILE; width as usize * height as usize],
            alpha: 1.0,
            collision_exclusion: None,
        }));
        Ok(handle)
    }

    fn put_tile(
        &mut self,
        layer: LayerHandle,
        index: u32,
        x: u32,
        y: u32,
    ) -> Result<(), BackendError> {
        let (map, width, height) = {
            let l = self
                .layer(layer)
                .ok_or(BackendError::StaleLayer(layer))?;
            (l.map, l.width, l.height)
        };
        if x >= width || y >= height {
            return Err(BackendError::CellOutOfBounds {
                x,
                y,
                width,
                height,
            });
        }
        if let Some(tile_count) = self.tile_capacity(map) {
            if index >= tile_count {
                return Err(BackendError::TileOutOfRange { index, tile_count });
            }
        }
        let l = self.layer_mut(layer)?;
        l.cells[y as usize * width as usize + x as usize] = index as i32;
        Ok(())
    }

    fn set_layer_alpha(&mut self, layer: LayerHandle, alpha: f32) -> Result<(), BackendError> {
        self.layer_mut(layer)?.alpha = alpha;
        Ok(())
    }

    fn set_collision_excluding(
        &mut self,
        layer: LayerHandle,
        excluded: i32,
    ) -> Result<(), BackendError> {
        self.layer_mut(layer)?.collision_exclusion = Some(excluded);
        Ok(())
    }

    fn destroy_layer(&mut self, layer: LayerHandle) {
        if let Some(slot) = self.layers.get_mut(layer.0 as usize) {
            *slot = None;
        }
    }

    fn destroy_map(&mut self, map: MapHandle) {
        if let Some(slot) = self.maps.get_mut(map.0 as usize) {
            *slot = None;
        }
        for slot in &mut self.layers {
            if slot.as_ref().is_some_and(|l| l.map == map) {
                *slot = None;
            }
        }
    }

    fn world_to_tile(&self, map: MapHandle, world: Vec2) -> Option<(u32, u32)> {
        let m = self.map(map)?;
        if world.x < 0.0 || world.y < 0.0 {
            return None;
        }
        let tx = (world.x / m.tile_width as f32) as u32;
        let ty = (world.y / m.tile_height as f32) as u32;
        if tx >= m.width || ty >= m.height {
            return None;
        }
        Some((tx, ty))
    }

    fn tile_to_world(&self, map: MapHandle, x: u32, y: u32) -> Option<Vec2> {
        let m = self.map(map)?;
        if x >= m.width || y >= m.height {
            return None;
        }
        Some(vec2(
            (x * m.tile_width) as f32,
            (y * m.tile_height) as f32,
        ))
    }
}
