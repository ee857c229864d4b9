//! Scaled overview of the whole world with the viewport outlined.

use super::frame::{BACKGROUND, SELECTION};
use super::painter::Painter;
use crate::state::{Camera, WorldBounds, WorldStore};

/// Fit-to-box mapping from world pixels (at base tile size) to minimap
/// pixels, centred inside the box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapProjection {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub base_tile_size: f64,
}

impl MinimapProjection {
    pub fn fit(world: WorldBounds, base_tile_size: f64, box_w: f64, box_h: f64) -> Option<Self> {
        if world.max_x <= 0 || world.max_y <= 0 || base_tile_size <= 0.0 {
            return None;
        }
        let world_w = world.max_x as f64 * base_tile_size;
        let world_h = world.max_y as f64 * base_tile_size;
        let scale = (box_w / world_w).min(box_h / world_h);
        Some(Self {
            scale,
            offset_x: (box_w - world_w * scale) / 2.0,
            offset_y: (box_h - world_h * scale) / 2.0,
            base_tile_size,
        })
    }

    /// Minimap pixel size of one tile, never below one pixel.
    pub fn tile_px(&self) -> f64 {
        (self.base_tile_size * self.scale).max(1.0)
    }

    pub fn tile_origin(&self, x: i32, y: i32) -> (f64, f64) {
        (
            self.offset_x + x as f64 * self.base_tile_size * self.scale,
            self.offset_y + y as f64 * self.base_tile_size * self.scale,
        )
    }

    /// The main viewport as a minimap rectangle `(x, y, w, h)`.
    pub fn viewport_rect(&self, cam: &Camera) -> (f64, f64, f64, f64) {
        (
            self.offset_x + (cam.x / cam.zoom) * self.scale,
            self.offset_y + (cam.y / cam.zoom) * self.scale,
            (cam.viewport_w / cam.zoom) * self.scale,
            (cam.viewport_h / cam.zoom) * self.scale,
        )
    }

    /// Minimap pixel -> world position in tile units.
    pub fn to_world(&self, mx: f64, my: f64) -> (f64, f64) {
        let wx = (mx - self.offset_x) / self.scale;
        let wy = (my - self.offset_y) / self.scale;
        (wx / self.base_tile_size, wy / self.base_tile_size)
    }
}

pub fn draw_minimap(
    p: &mut dyn Painter,
    world: &WorldStore,
    cam: &Camera,
    box_w: f64,
    box_h: f64,
) -> Option<MinimapProjection> {
    p.clear(box_w, box_h, BACKGROUND);
    let proj = MinimapProjection::fit(world.bounds(), cam.base_tile_size, box_w, box_h)?;
    let px = proj.tile_px();
    for tile in world.tiles() {
        let (x, y) = proj.tile_origin(tile.coord.x, tile.coord.y);
        p.fill_rect(x, y, px, px, tile.terrain.color());
    }
    for creep in world.creeps() {
        let (x, y) = proj.tile_origin(0, 0);
        let cx = x + creep.x * cam.base_tile_size * proj.scale;
        let cy = y + creep.y * cam.base_tile_size * proj.scale;
        p.fill_rect(cx - 1.0, cy - 1.0, 2.0, 2.0, world.color_of(creep.player_number));
    }
    if let Some(sel) = world.selected() {
        let (x, y) = proj.tile_origin(sel.coord.x, sel.coord.y);
        p.fill_rect(x, y, px.max(3.0), px.max(3.0), SELECTION);
    }
    let (vx, vy, vw, vh) = proj.viewport_rect(cam);
    p.stroke_rect(vx, vy, vw, vh, "#ffffff", 1.0);
    Some(proj)
}
