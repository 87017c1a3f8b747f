//! Map ingestion & layer builder: turns a parsed document into live renderer
//! layers, one per tile-layer entry, in document order.

use crate::backend::{LayerHandle, MapHandle, TilemapBackend, EMPTY_TILE};
use crate::document::{LayerDocument, MapDocument};
use crate::error::{EditorError, LayerFault};
use log::{info, warn};

/// Reserved layer name whose non-empty cells collide.
pub const COLLISION_LAYER_NAME: &str = "platforms";

/// One materialized tile layer.
#[derive(Debug)]
pub struct RenderedLayer {
    /// Source layer name.
    pub name: String,
    /// Backend layer object.
    pub handle: LayerHandle,
    /// Alpha the layer renders at.
    pub alpha: f32,
    /// Whether non-empty cells collide.
    pub collidable: bool,
}

/// Per-layer build record: the handle on success, the fault otherwise.
#[derive(Debug)]
pub struct LayerOutcome {
    /// Source layer name.
    pub name: String,
    /// Build result for this entry.
    pub result: Result<LayerHandle, LayerFault>,
}

/// The single live map: container, bound tileset, materialized layers.
#[derive(Debug)]
pub struct ActiveMap {
    /// Backend map container.
    pub map: MapHandle,
    /// Key of the tileset bound to the container.
    pub tileset_key: String,
    /// Successfully materialized layers in document order.
    pub layers: Vec<RenderedLayer>,
    /// The paintable layer: first tile layer that built successfully.
    pub interactive: Option<LayerHandle>,
    /// Build record for every attempted tile layer, in document order.
    pub outcomes: Vec<LayerOutcome>,
}

/// Ingests `doc` into `backend`, replacing `prior` if present.
///
/// The prior map is torn down first, so no two generations of layers ever
/// coexist and a fatal failure (document without layers, container creation,
/// tileset binding) leaves no map active at all. Faults inside a single
/// layer are isolated: logged, recorded in the outcome list, and the
/// remaining layers still build.
pub fn ingest<B: TilemapBackend>(
    backend: &mut B,
    prior: Option<ActiveMap>,
    doc: &MapDocument,
    tileset_key: &str,
) -> Result<ActiveMap, EditorError> {
    if let Some(prev) = prior {
        backend.destroy_map(prev.map);
    }
    if doc.layers.is_empty() {
        return Err(EditorError::NoLayers);
    }
    info!("ingesting map with layers {:?}", doc.layer_names());

    let map = backend
        .create_map(doc.width, doc.height, doc.tilewidth, doc.tileheight)
        .map_err(|source| EditorError::Container {
            width: doc.width,
            height: doc.height,
            source,
        })?;
    if let Err(source) = backend.bind_tileset(map, tileset_key) {
        backend.destroy_map(map);
        return Err(EditorError::TilesetBind {
            key: tileset_key.to_owned(),
            source,
        });
    }

    let mut layers = Vec::new();
    let mut outcomes = Vec::new();
    let mut interactive = None;
    for entry in doc.layers.iter().filter(|l| l.is_tile_layer()) {
        match build_layer(backend, map, entry) {
            Ok(layer) => {
                if interactive.is_none() {
                    interactive = Some(layer.handle);
                }
                outcomes.push(LayerOutcome {
                    name: entry.name.clone(),
                    result: Ok(layer.handle),
                });
                layers.push(layer);
            }
            Err(fault) => {
                warn!("skipping layer '{}': {fault}", entry.name);
                outcomes.push(LayerOutcome {
                    name: entry.name.clone(),
                    result: Err(fault),
                });
            }
        }
    }

    Ok(ActiveMap {
        map,
        tileset_key: tileset_key.to_owned(),
        layers,
        interactive,
        outcomes,
    })
}

/// Builds one layer; on a fault the partially built object is destroyed so
/// the map only ever holds layers that completed.
fn build_layer<B: TilemapBackend>(
    backend: &mut B,
    map: MapHandle,
    entry: &LayerDocument,
) -> Result<RenderedLayer, LayerFault> {
    let handle = backend.create_layer(map, entry.width, entry.height)?;
    match populate_layer(backend, handle, entry) {
        Ok((alpha, collidable)) => Ok(RenderedLayer {
            name: entry.name.clone(),
            handle,
            alpha,
            collidable,
        }),
        Err(fault) => {
            backend.destroy_layer(handle);
            Err(fault)
        }
    }
}

fn populate_layer<B: TilemapBackend>(
    backend: &mut B,
    handle: LayerHandle,
    entry: &LayerDocument,
) -> Result<(f32, bool), LayerFault> {
    if let Some(data) = &entry.data {
        let expected = entry.cell_count();
        if data.len() != expected {
            return Err(LayerFault::DataLength {
                expected,
                actual: data.len(),
            });
        }
        for (i, &value) in data.iter().enumerate() {
            if value <= 0 {
                // 0 is empty; source data is 1-based
                continue;
            }
            let x = (i % entry.width as usize) as u32;
            let y = (i / entry.width as usize) as u32;
            backend.put_tile(handle, value as u32 - 1, x, y)?;
        }
    }
    let alpha = match entry.opacity {
        Some(alpha) => {
            backend.set_layer_alpha(handle, alpha)?;
            alpha
        }
        None => 1.0,
    };
    let collidable = entry.name == COLLISION_LAYER_NAME;
    if collidable {
        backend.set_collision_excluding(handle, EMPTY_TILE)?;
    }
    Ok((alpha, collidable))
}
