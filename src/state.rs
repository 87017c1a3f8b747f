//! Editor state: the one place the live document, active map, selected tile
//! and tileset swap come together, explicit instead of ambient scene fields.

use crate::backend::TilemapBackend;
use crate::document::MapDocument;
use crate::error::{BackendError, EditorError};
use crate::ingest::{ingest, ActiveMap};
use crate::picker::PreviewPanel;
use crate::swap::{SwapOutcome, SwapTicket, TilesetSwap};
use log::debug;
use macroquad::prelude::Vec2;

// Fallback document size when a tileset arrives before any map.
const BLANK_MAP_SIZE: u32 = 3;

/// What a pointer-down ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    /// A tile was picked from the preview panel.
    Picked(u32),
    /// The selected tile was painted at the map cell.
    Painted {
        /// Cell x.
        x: u32,
        /// Cell y.
        y: u32,
    },
    /// The click hit neither the panel nor the map.
    Ignored,
}

/// The editor's mutable state.
///
/// All map mutation goes through a [`TilemapBackend`] passed into the
/// methods, which keeps the state deterministic to drive from tests.
pub struct EditorState {
    document: Option<MapDocument>,
    active: Option<ActiveMap>,
    selected_tile: u32,
    swap: TilesetSwap,
    panel: PreviewPanel,
}

impl EditorState {
    /// State bound to an initial tileset key, nothing loaded yet.
    pub fn new(initial_tileset_key: impl Into<String>) -> Self {
        EditorState {
            document: None,
            active: None,
            selected_tile: 0,
            swap: TilesetSwap::new(initial_tileset_key),
            panel: PreviewPanel::default(),
        }
    }

    /// Replaces the preview panel layout.
    pub fn with_panel(mut self, panel: PreviewPanel) -> Self {
        self.panel = panel;
        self
    }

    /// Replaces the preview panel layout in place, e.g. after a tileset
    /// swap changes the preview's size.
    pub fn set_panel(&mut self, panel: PreviewPanel) {
        self.panel = panel;
    }

    /// Releases replaced tileset resources when a swap is adopted.
    pub fn with_tileset_disposal(mut self, dispose: bool) -> Self {
        self.swap = self.swap.dispose_replaced(dispose);
        self
    }

    /// Preview panel in use.
    pub fn panel(&self) -> &PreviewPanel {
        &self.panel
    }

    /// Currently active map, if the last ingestion succeeded.
    pub fn active(&self) -> Option<&ActiveMap> {
        self.active.as_ref()
    }

    /// Most recently loaded document.
    pub fn document(&self) -> Option<&MapDocument> {
        self.document.as_ref()
    }

    /// Tile index painting writes.
    pub fn selected_tile(&self) -> u32 {
        self.selected_tile
    }

    /// Key of the tileset in use.
    pub fn tileset_key(&self) -> &str {
        self.swap.current_key()
    }

    /// Parses and ingests uploaded map JSON.
    pub fn load_json<B: TilemapBackend>(
        &mut self,
        backend: &mut B,
        text: &str,
    ) -> Result<(), EditorError> {
        let doc = MapDocument::from_json_str(text)?;
        self.load_document(backend, doc)
    }

    /// Ingests `doc`, replacing the active map. The document is remembered
    /// even when ingestion fails, so a later tileset swap retries it.
    pub fn load_document<B: TilemapBackend>(
        &mut self,
        backend: &mut B,
        doc: MapDocument,
    ) -> Result<(), EditorError> {
        let result = self.ingest_document(backend, &doc);
        self.document = Some(doc);
        result
    }

    /// Re-runs ingestion with the remembered document, or a blank 3x3 one
    /// when no map was ever loaded.
    pub fn reingest<B: TilemapBackend>(&mut self, backend: &mut B) -> Result<(), EditorError> {
        let doc = self
            .document
            .clone()
            .unwrap_or_else(|| MapDocument::blank(BLANK_MAP_SIZE, BLANK_MAP_SIZE));
        self.ingest_document(backend, &doc)
    }

    fn ingest_document<B: TilemapBackend>(
        &mut self,
        backend: &mut B,
        doc: &MapDocument,
    ) -> Result<(), EditorError> {
        let prior = self.active.take();
        let key = self.swap.current_key().to_owned();
        self.active = Some(ingest(backend, prior, doc, &key)?);
        Ok(())
    }

    /// Routes a pointer-down: picking inside the preview panel, painting on
    /// the map everywhere else.
    pub fn pointer_down<B: TilemapBackend>(
        &mut self,
        backend: &mut B,
        position: Vec2,
    ) -> Result<PointerAction, BackendError> {
        if let Some(index) = self.panel.pick(position) {
            self.selected_tile = index;
            debug!("picked tile {index}");
            return Ok(PointerAction::Picked(index));
        }
        let Some(active) = self.active.as_ref() else {
            return Ok(PointerAction::Ignored);
        };
        let Some(layer) = active.interactive else {
            return Ok(PointerAction::Ignored);
        };
        match backend.world_to_tile(active.map, position) {
            Some((x, y)) => {
                backend.put_tile(layer, self.selected_tile, x, y)?;
                Ok(PointerAction::Painted { x, y })
            }
            None => Ok(PointerAction::Ignored),
        }
    }

    /// World-space origin of the hovered cell, `None` off the map; drives
    /// the hover marker.
    pub fn hover_cell<B: TilemapBackend>(&self, backend: &B, position: Vec2) -> Option<Vec2> {
        let active = self.active.as_ref()?;
        let (x, y) = backend.world_to_tile(active.map, position)?;
        backend.tile_to_world(active.map, x, y)
    }

    /// Starts a tileset hot-swap. The host loads the new image under the
    /// ticket's key, then calls
    /// [`finish_tileset_swap`](Self::finish_tileset_swap).
    pub fn begin_tileset_swap(&mut self) -> SwapTicket {
        self.swap.begin()
    }

    /// Completes a tileset load. On adoption the map is re-ingested against
    /// the new key; a stale completion changes nothing.
    pub fn finish_tileset_swap<B: TilemapBackend>(
        &mut self,
        backend: &mut B,
        ticket: SwapTicket,
    ) -> Result<SwapOutcome, EditorError> {
        let outcome = self.swap.complete(ticket);
        if matches!(outcome, SwapOutcome::Adopted { .. }) {
            self.reingest(backend)?;
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{GridBackend, TilesetSpec, EMPTY_TILE};
    use macroquad::prelude::vec2;

    const TILESET_KEY: &str = "tileset";

    fn editor() -> (GridBackend, EditorState) {
        let mut backend = GridBackend::new();
        backend.register_tileset(TILESET_KEY, TilesetSpec::new(8, Some(64), 32, 32));
        let mut state = EditorState::new(TILESET_KEY);
        state
            .load_document(&mut backend, MapDocument::blank(20, 20))
            .expect("blank map ingests");
        (backend, state)
    }

    #[test]
    fn pick_then_paint_round_trip() {
        let (mut backend, mut state) = editor();

        let action = state
            .pointer_down(&mut backend, vec2(30.0, 310.0))
            .expect("pick");
        assert_eq!(action, PointerAction::Picked(1));
        assert_eq!(state.selected_tile(), 1);

        let action = state
            .pointer_down(&mut backend, vec2(300.0, 40.0))
            .expect("paint");
        assert_eq!(action, PointerAction::Painted { x: 9, y: 1 });

        let layer = state.active().expect("active").interactive.expect("layer");
        assert_eq!(backend.layer(layer).expect("live").cell(9, 1), Some(1));
    }

    #[test]
    fn clicks_inside_the_panel_never_paint() {
        let (mut backend, mut state) = editor();

        // (20,310) lies over map cell (0,9) but inside the preview panel.
        let action = state
            .pointer_down(&mut backend, vec2(20.0, 310.0))
            .expect("pick");
        assert!(matches!(action, PointerAction::Picked(_)));

        let layer = state.active().expect("active").interactive.expect("layer");
        assert_eq!(backend.layer(layer).expect("live").cell(0, 9), Some(EMPTY_TILE));
    }

    #[test]
    fn clicks_off_the_map_are_ignored() {
        let (mut backend, mut state) = editor();
        let action = state
            .pointer_down(&mut backend, vec2(700.0, 100.0))
            .expect("no-op");
        assert_eq!(action, PointerAction::Ignored);
    }

    #[test]
    fn painting_an_unpicked_default_writes_index_zero() {
        let (mut backend, mut state) = editor();
        state
            .pointer_down(&mut backend, vec2(300.0, 8.0))
            .expect("paint");
        let layer = state.active().expect("active").interactive.expect("layer");
        assert_eq!(backend.layer(layer).expect("live").cell(9, 0), Some(0));
    }

    #[test]
    fn oversized_pick_is_rejected_at_paint_time() {
        let (mut backend, mut state) = editor();
        state
            .pointer_down(&mut backend, vec2(210.0, 500.0))
            .expect("pick");
        assert_eq!(state.selected_tile(), 108);

        let err = state
            .pointer_down(&mut backend, vec2(300.0, 40.0))
            .unwrap_err();
        assert!(matches!(err, BackendError::TileOutOfRange { index: 108, .. }));
    }

    #[test]
    fn hover_reports_cell_origin_inside_the_map_only() {
        let (backend, state) = editor();
        assert_eq!(state.hover_cell(&backend, vec2(40.0, 40.0)), Some(vec2(32.0, 32.0)));
        assert_eq!(state.hover_cell(&backend, vec2(-3.0, 10.0)), None);
        assert_eq!(state.hover_cell(&backend, vec2(10_000.0, 10.0)), None);
    }

    #[test]
    fn load_failure_still_remembers_the_document() {
        let (mut backend, mut state) = editor();
        let err = state
            .load_json(&mut backend, r#"{"width":1,"height":1,"layers":[]}"#)
            .unwrap_err();
        assert!(matches!(err, EditorError::NoLayers));
        assert!(state.active().is_none());
        assert!(state.document().is_some());
        assert_eq!(backend.live_map_count(), 0);
    }

    #[test]
    fn malformed_upload_is_a_typed_parse_error() {
        let (mut backend, mut state) = editor();
        let err = state.load_json(&mut backend, "{ not json").unwrap_err();
        assert!(matches!(err, EditorError::Json(_)));
    }

    #[test]
    fn adopted_swap_reingests_under_the_new_key() {
        let (mut backend, mut state) = editor();
        let before = state.active().expect("active").map;

        let ticket = state.begin_tileset_swap();
        backend.register_tileset(&ticket.key, TilesetSpec::new(4, Some(16), 32, 32));
        let outcome = state
            .finish_tileset_swap(&mut backend, ticket)
            .expect("swap");
        assert!(matches!(outcome, SwapOutcome::Adopted { replaced: None }));

        let active = state.active().expect("active");
        assert_ne!(active.map, before);
        assert!(active.tileset_key.starts_with("tileset-1-"));
        assert_eq!(backend.live_map_count(), 1);
    }

    #[test]
    fn stale_swap_changes_nothing() {
        let (mut backend, mut state) = editor();
        let before = state.active().expect("active").map;

        let stale = state.begin_tileset_swap();
        let fresh = state.begin_tileset_swap();
        backend.register_tileset(&stale.key, TilesetSpec::new(8, Some(64), 32, 32));
        backend.register_tileset(&fresh.key, TilesetSpec::new(8, Some(64), 32, 32));

        let outcome = state
            .finish_tileset_swap(&mut backend, stale)
            .expect("stale completion");
        assert!(matches!(outcome, SwapOutcome::Stale { .. }));
        assert_eq!(state.tileset_key(), TILESET_KEY);
        assert_eq!(state.active().expect("active").map, before);
    }

    #[test]
    fn swap_before_any_map_builds_the_blank_fallback() {
        let mut backend = GridBackend::new();
        backend.register_tileset(TILESET_KEY, TilesetSpec::new(8, Some(64), 32, 32));
        let mut state = EditorState::new(TILESET_KEY);

        let ticket = state.begin_tileset_swap();
        backend.register_tileset(&ticket.key, TilesetSpec::new(8, Some(64), 32, 32));
        state
            .finish_tileset_swap(&mut backend, ticket)
            .expect("swap");

        let active = state.active().expect("fallback map");
        let map = backend.map(active.map).expect("live");
        assert_eq!((map.width, map.height), (3, 3));
        assert!(state.document().is_none());
    }

    #[test]
    fn disposal_policy_hands_back_the_old_key_through_the_state() {
        let mut backend = GridBackend::new();
        backend.register_tileset(TILESET_KEY, TilesetSpec::new(8, Some(64), 32, 32));
        let mut state = EditorState::new(TILESET_KEY).with_tileset_disposal(true);
        state
            .load_document(&mut backend, MapDocument::blank(4, 4))
            .expect("ingest");

        let ticket = state.begin_tileset_swap();
        backend.register_tileset(&ticket.key, TilesetSpec::new(8, Some(64), 32, 32));
        match state.finish_tileset_swap(&mut backend, ticket).expect("swap") {
            SwapOutcome::Adopted { replaced } => {
                assert_eq!(replaced.as_deref(), Some(TILESET_KEY))
            }
            other => panic!("expected adoption, got {other:?}"),
        }
    }
}
