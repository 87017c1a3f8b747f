//! Macroquad draw glue: the retained grids, the tileset preview panel and
//! the hover marker, redrawn every frame.

use crate::backend::{GridBackend, MapHandle};
use crate::picker::PreviewPanel;
use macroquad::prelude::*;

/// Atlas source rect for renderer tile `index` in a `columns`-wide sheet.
fn atlas_source(index: u32, columns: u32, tile_width: f32, tile_height: f32) -> Rect {
    Rect::new(
        (index % columns) as f32 * tile_width,
        (index / columns) as f32 * tile_height,
        tile_width,
        tile_height,
    )
}

/// Draws every live layer of `map`, in creation order, sampling `texture`.
///
/// Empty cells are skipped; each layer is tinted by its alpha.
pub fn draw_map(backend: &GridBackend, map: MapHandle, texture: &Texture2D, origin: Vec2) {
    let Some(container) = backend.map(map) else {
        return;
    };
    let tile_w = container.tile_width as f32;
    let tile_h = container.tile_height as f32;
    let columns = ((texture.width() / tile_w) as u32).max(1);

    for (_, layer) in backend.layers_of(map) {
        let tint = Color::new(1.0, 1.0, 1.0, layer.alpha);
        for y in 0..layer.height {
            for x in 0..layer.width {
                let cell = match layer.cell(x, y) {
                    Some(cell) if cell >= 0 => cell as u32,
                    _ => continue,
                };
                draw_texture_ex(
                    texture,
                    origin.x + x as f32 * tile_w,
                    origin.y + y as f32 * tile_h,
                    tint,
                    DrawTextureParams {
                        source: Some(atlas_source(cell, columns, tile_w, tile_h)),
                        ..Default::default()
                    },
                );
            }
        }
    }
}

/// Draws the scaled tileset preview with a backing frame and an outline
/// around the selected tile.
pub fn draw_tileset_panel(panel: &PreviewPanel, texture: &Texture2D, selected: u32) {
    let rect = panel.rect();
    draw_rectangle(
        rect.x - 2.0,
        rect.y - 2.0,
        rect.w + 4.0,
        rect.h + 4.0,
        DARKGRAY,
    );
    draw_texture_ex(
        texture,
        rect.x,
        rect.y,
        WHITE,
        DrawTextureParams {
            dest_size: Some(vec2(texture.width(), texture.height()) * panel.scale),
            ..Default::default()
        },
    );

    let cell = panel.cell_size * panel.scale;
    let col = selected % panel.columns;
    let row = selected / panel.columns;
    draw_rectangle_lines(
        rect.x + col as f32 * cell,
        rect.y + row as f32 * cell,
        cell,
        cell,
        2.0,
        YELLOW,
    );
}

/// Outlines the hovered map cell at its world-space origin.
pub fn draw_hover_marker(cell_origin: Vec2, tile_size: Vec2) {
    draw_rectangle_lines(cell_origin.x, cell_origin.y, tile_size.x, tile_size.y, 2.0, WHITE);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atlas_source_walks_rows_of_the_sheet() {
        let src = atlas_source(0, 8, 32.0, 32.0);
        assert_eq!((src.x, src.y), (0.0, 0.0));

        let src = atlas_source(7, 8, 32.0, 32.0);
        assert_eq!((src.x, src.y), (224.0, 0.0));

        let src = atlas_source(8, 8, 32.0, 32.0);
        assert_eq!((src.x, src.y), (0.0, 32.0));

        let src = atlas_source(13, 8, 32.0, 32.0);
        assert_eq!((src.x, src.y, src.w, src.h), (160.0, 32.0, 32.0, 32.0));
    }

    #[test]
    fn atlas_source_handles_non_square_tiles() {
        let src = atlas_source(5, 4, 16.0, 24.0);
        assert_eq!((src.x, src.y, src.w, src.h), (16.0, 24.0, 16.0, 24.0));
    }
}
