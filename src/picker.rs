//! Tileset preview panel: the screen rectangle tiles are picked from, and
//! the guard that keeps paint clicks out of it.

use macroquad::prelude::{vec2, Rect, Vec2};

/// Tileset preview panel geometry and pick arithmetic.
///
/// Defaults are a fixed layout: panel at `(10,300)`, 256x256 on screen,
/// tiles displayed at half their native 32px size, eight columns assumed.
/// [`for_texture`](PreviewPanel::for_texture) derives the column count and
/// extent from a real tileset image instead.
#[derive(Debug, Clone)]
pub struct PreviewPanel {
    /// Top-left corner on screen.
    pub origin: Vec2,
    /// Display scale applied to native cells.
    pub scale: f32,
    /// Columns assumed when mapping a click to a tile index.
    pub columns: u32,
    /// Native cell size in pixels.
    pub cell_size: f32,
    /// On-screen extent of the panel.
    pub size: Vec2,
}

impl Default for PreviewPanel {
    fn default() -> Self {
        PreviewPanel {
            origin: vec2(10.0, 300.0),
            scale: 0.5,
            columns: 8,
            cell_size: 32.0,
            size: vec2(256.0, 256.0),
        }
    }
}

impl PreviewPanel {
    /// Panel whose columns and extent come from a tileset image's pixel
    /// size, so picks line up with what the preview actually shows.
    pub fn for_texture(origin: Vec2, scale: f32, cell_size: f32, texture_size: Vec2) -> Self {
        let columns = ((texture_size.x / cell_size) as u32).max(1);
        PreviewPanel {
            origin,
            scale,
            columns,
            cell_size,
            size: texture_size * scale,
        }
    }

    /// Screen rectangle the panel occupies.
    pub fn rect(&self) -> Rect {
        Rect::new(self.origin.x, self.origin.y, self.size.x, self.size.y)
    }

    /// Whether a screen position falls inside the panel. Paint clicks in
    /// here belong to the picker instead.
    pub fn contains(&self, position: Vec2) -> bool {
        self.rect().contains(position)
    }

    /// Tile index under a screen position, `None` outside the panel.
    ///
    /// The index is not checked against the real tileset extent; an
    /// oversized pick is only rejected by the renderer when painting.
    pub fn pick(&self, position: Vec2) -> Option<u32> {
        if !self.contains(position) {
            return None;
        }
        let local = position - self.origin;
        let displayed_cell = self.cell_size * self.scale;
        let col = (local.x / displayed_cell) as u32;
        let row = (local.y / displayed_cell) as u32;
        Some(row * self.columns + col)
    }
}
