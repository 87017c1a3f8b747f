//! Interactive tile editor: loads a map and tileset from disk, then lets
//! you pick tiles from the preview panel, paint them onto the map, reload
//! the map with `R` and hot-swap the tileset image with `T`.

use anyhow::{Context, Result};
use log::{error, info, warn};
use macroquad::prelude::*;
use macroquad_tile_editor::{
    draw_hover_marker, draw_map, draw_tileset_panel, EditorState, GridBackend, MapDocument,
    PointerAction, PreviewPanel, SwapOutcome, TilesetSpec,
};
use std::collections::HashMap;

const DEFAULT_MAP: &str = "assets/map.json";
const DEFAULT_TILESET: &str = "assets/tileset.png";
const INITIAL_TILESET_KEY: &str = "tileset";
const TILE_SIZE: f32 = 32.0;
const PANEL_ORIGIN: Vec2 = vec2(10.0, 300.0);
const PANEL_SCALE: f32 = 0.5;

fn window_conf() -> Conf {
    Conf {
        window_title: "Tile Editor".to_owned(),
        window_width: 800,
        window_height: 600,
        ..Default::default()
    }
}

/// Loads the tileset image at `path` and registers its grid under `key`.
async fn load_tileset(
    backend: &mut GridBackend,
    textures: &mut HashMap<String, Texture2D>,
    key: &str,
    path: &str,
) -> Result<Texture2D> {
    let texture = load_texture(path)
        .await
        .with_context(|| format!("loading tileset image {path}"))?;
    texture.set_filter(FilterMode::Nearest);
    backend.register_tileset(
        key,
        TilesetSpec::from_image_size(
            vec2(texture.width(), texture.height()),
            TILE_SIZE as u32,
            TILE_SIZE as u32,
        ),
    );
    textures.insert(key.to_owned(), texture.clone());
    Ok(texture)
}

fn panel_for(texture: &Texture2D) -> PreviewPanel {
    PreviewPanel::for_texture(
        PANEL_ORIGIN,
        PANEL_SCALE,
        TILE_SIZE,
        vec2(texture.width(), texture.height()),
    )
}

fn load_map(backend: &mut GridBackend, state: &mut EditorState, path: &str) -> Result<()> {
    let doc = MapDocument::from_file(path)?;
    state.load_document(backend, doc)?;
    info!("loaded map {path}");
    Ok(())
}

/// Reloads the tileset image and hands it to the editor under a fresh swap
/// ticket. Stale or replaced tilesets are dropped from the caches.
async fn swap_tileset(
    backend: &mut GridBackend,
    textures: &mut HashMap<String, Texture2D>,
    state: &mut EditorState,
    path: &str,
) -> Result<()> {
    let ticket = state.begin_tileset_swap();
    let texture = load_texture(path)
        .await
        .with_context(|| format!("reloading tileset image {path}"))?;
    texture.set_filter(FilterMode::Nearest);
    backend.register_tileset(
        &ticket.key,
        TilesetSpec::from_image_size(
            vec2(texture.width(), texture.height()),
            TILE_SIZE as u32,
            TILE_SIZE as u32,
        ),
    );
    textures.insert(ticket.key.clone(), texture.clone());

    match state.finish_tileset_swap(backend, ticket)? {
        SwapOutcome::Adopted { replaced } => {
            state.set_panel(panel_for(&texture));
            if let Some(old) = replaced {
                backend.unregister_tileset(&old);
                textures.remove(&old);
            }
            info!("tileset swapped in from {path}");
        }
        SwapOutcome::Stale { key } => {
            backend.unregister_tileset(&key);
            textures.remove(&key);
        }
    }
    Ok(())
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let map_path = args.next().unwrap_or_else(|| DEFAULT_MAP.to_owned());
    let tileset_path = args.next().unwrap_or_else(|| DEFAULT_TILESET.to_owned());

    let mut backend = GridBackend::new();
    let mut textures: HashMap<String, Texture2D> = HashMap::new();
    let mut state = EditorState::new(INITIAL_TILESET_KEY).with_tileset_disposal(true);
    let mut status = String::new();

    match load_tileset(&mut backend, &mut textures, INITIAL_TILESET_KEY, &tileset_path).await {
        Ok(texture) => state.set_panel(panel_for(&texture)),
        Err(err) => {
            error!("{err:#}");
            status = format!("{err:#}");
        }
    }
    if let Err(err) = load_map(&mut backend, &mut state, &map_path) {
        error!("{err:#}");
        status = format!("{err:#}");
    }

    loop {
        if is_key_pressed(KeyCode::R) {
            status.clear();
            if let Err(err) = load_map(&mut backend, &mut state, &map_path) {
                error!("{err:#}");
                status = format!("{err:#}");
            }
        }
        if is_key_pressed(KeyCode::T) {
            status.clear();
            if let Err(err) = swap_tileset(&mut backend, &mut textures, &mut state, &tileset_path).await
            {
                error!("{err:#}");
                status = format!("{err:#}");
            }
        }
        if is_mouse_button_pressed(MouseButton::Left) {
            let (mx, my) = mouse_position();
            match state.pointer_down(&mut backend, vec2(mx, my)) {
                Ok(PointerAction::Picked(index)) => status = format!("selected tile {index}"),
                Ok(PointerAction::Painted { x, y }) => status = format!("painted ({x}, {y})"),
                Ok(PointerAction::Ignored) => {}
                Err(err) => {
                    warn!("paint rejected: {err}");
                    status = format!("paint rejected: {err}");
                }
            }
        }

        clear_background(Color::from_rgba(24, 26, 36, 255));

        if let (Some(active), Some(texture)) = (state.active(), textures.get(state.tileset_key()))
        {
            draw_map(&backend, active.map, texture, Vec2::ZERO);
        }
        let (mx, my) = mouse_position();
        if let Some(origin) = state.hover_cell(&backend, vec2(mx, my)) {
            draw_hover_marker(origin, vec2(TILE_SIZE, TILE_SIZE));
        }
        if let Some(texture) = textures.get(state.tileset_key()) {
            draw_tileset_panel(state.panel(), texture, state.selected_tile());
        }

        draw_text(
            "L-click: pick / paint    R: reload map    T: reload tileset",
            10.0,
            592.0,
            18.0,
            GRAY,
        );
        if !status.is_empty() {
            draw_text(&status, 10.0, 20.0, 18.0, GOLD);
        }

        next_frame().await
    }
}
