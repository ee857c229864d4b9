//! One full redraw of the main canvas from the store and camera.

use super::assets::SpriteKey;
use super::autotile::{EAST, NORTH, SOUTH, WEST, road_mask};
use super::contour::{contour_edges, edge_segment};
use super::painter::Painter;
use crate::model::{Creep, Structure, Tile, TileCoord, placeable, PlaceableKind};
use crate::state::placement::check_placement;
use crate::state::{Camera, InteractionMode, WorldStore};

pub const BACKGROUND: &str = "#1a1a2e";
pub const SELECTION: &str = "#00d9ff";
const TILE_BORDER: &str = "rgba(0, 0, 0, 0.3)";
const GRID: &str = "rgba(255, 255, 255, 0.1)";
const RANGE: &str = "rgba(0, 217, 255, 0.5)";
const ROAD: &str = "#C2A878";
const PLACE_OK: &str = "rgba(76, 175, 80, 0.45)";
const PLACE_BAD: &str = "rgba(244, 67, 54, 0.45)";
const HP_BACK: &str = "rgba(0, 0, 0, 0.6)";
const HP_HIGH: &str = "#7CFC00";
const HP_MID: &str = "#FFC107";
const HP_LOW: &str = "#F44336";

pub struct FrameView<'a> {
    pub camera: &'a Camera,
    pub world: &'a WorldStore,
    pub mode: InteractionMode,
    pub hover: Option<TileCoord>,
}

pub fn health_color(fraction: f64) -> &'static str {
    if fraction > 0.5 {
        HP_HIGH
    } else if fraction > 0.25 {
        HP_MID
    } else {
        HP_LOW
    }
}

pub fn draw_frame(p: &mut dyn Painter, view: &FrameView) {
    let cam = view.camera;
    let ts = cam.tile_px();
    p.clear(cam.viewport_w, cam.viewport_h, BACKGROUND);

    let range = cam.visible_tile_range();
    for coord in range.iter() {
        if let Some(tile) = view.world.tile(coord) {
            draw_tile(p, view.world, tile, cam);
        }
    }
    draw_grid(p, cam);
    for coord in range.iter() {
        if let Some(tile) = view.world.tile(coord) {
            draw_contours(p, view.world, tile, cam);
        }
    }
    if let Some(sel) = view.world.selected() {
        draw_selection(p, cam, sel.coord, ts);
        if let Some(r) = view
            .world
            .towers()
            .find(|t| t.coord == sel.coord)
            .and_then(|t| t.range)
        {
            let (cx, cy) = cam.world_to_screen(sel.coord.x as f64 + 0.5, sel.coord.y as f64 + 0.5);
            p.stroke_circle(cx, cy, r * ts, RANGE, 1.5);
        }
    }
    for creep in view.world.creeps() {
        draw_creep(p, view.world, creep, cam);
    }
    if let (Some(def), Some(hover)) = (view.mode.placing(), view.hover) {
        let (sx, sy) = cam.world_to_screen(hover.x as f64, hover.y as f64);
        let legal = check_placement(
            view.world.tile(hover),
            def,
            view.world.local_player().map(|l| l.player_number),
            &view.world.resources(),
        )
        .is_ok();
        p.fill_rect(sx, sy, ts, ts, if legal { PLACE_OK } else { PLACE_BAD });
        p.text(def.icon, sx + ts / 2.0, sy + ts / 2.0, ts * 0.6, "#ffffff");
    }
}

fn draw_tile(p: &mut dyn Painter, world: &WorldStore, tile: &Tile, cam: &Camera) {
    let ts = cam.tile_px();
    let (sx, sy) = cam.world_to_screen(tile.coord.x as f64, tile.coord.y as f64);
    if !p.sprite(&SpriteKey::Terrain(tile.terrain), sx, sy, ts, ts) {
        p.fill_rect(sx, sy, ts, ts, tile.terrain.color());
    }
    p.stroke_rect(sx, sy, ts, ts, TILE_BORDER, 1.0);

    match &tile.structure {
        Structure::None => {}
        Structure::Road => {
            let mask = road_mask(world, tile.coord);
            if !p.sprite(&SpriteKey::Road(mask), sx, sy, ts, ts) {
                draw_road_fallback(p, mask, sx, sy, ts);
            }
        }
        Structure::Building { building_type, owner } => {
            let key = SpriteKey::Building(*building_type);
            let icon = placeable(PlaceableKind::Building(*building_type)).map(|d| d.icon);
            draw_structure(p, world, &key, icon, *owner, sx, sy, ts);
        }
        Structure::Tower { tower_type, owner } => {
            let key = SpriteKey::Tower(*tower_type);
            let icon = placeable(PlaceableKind::Tower(*tower_type)).map(|d| d.icon);
            draw_structure(p, world, &key, icon, *owner, sx, sy, ts);
        }
    }
}

/// Centre square plus an arm toward each connected neighbour.
fn draw_road_fallback(p: &mut dyn Painter, mask: u8, sx: f64, sy: f64, ts: f64) {
    let w = ts * 0.4;
    let c0 = (ts - w) / 2.0;
    p.fill_rect(sx + c0, sy + c0, w, w, ROAD);
    if mask & NORTH != 0 {
        p.fill_rect(sx + c0, sy, w, c0, ROAD);
    }
    if mask & EAST != 0 {
        p.fill_rect(sx + c0 + w, sy + c0, c0, w, ROAD);
    }
    if mask & SOUTH != 0 {
        p.fill_rect(sx + c0, sy + c0 + w, w, c0, ROAD);
    }
    if mask & WEST != 0 {
        p.fill_rect(sx, sy + c0, c0, w, ROAD);
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_structure(
    p: &mut dyn Painter,
    world: &WorldStore,
    key: &SpriteKey,
    icon: Option<&str>,
    owner: Option<u32>,
    sx: f64,
    sy: f64,
    ts: f64,
) {
    let pad = ts * 0.1;
    if p.sprite(key, sx + pad, sy + pad, ts - 2.0 * pad, ts - 2.0 * pad) {
        return;
    }
    let fill = owner.map(|o| world.color_of(o)).unwrap_or("#555555");
    p.fill_rect(sx + pad, sy + pad, ts - 2.0 * pad, ts - 2.0 * pad, fill);
    if let Some(icon) = icon {
        p.text(icon, sx + ts / 2.0, sy + ts / 2.0, ts * 0.55, "#ffffff");
    }
}

fn draw_grid(p: &mut dyn Painter, cam: &Camera) {
    let ts = cam.tile_px();
    if ts < 8.0 {
        return;
    }
    let mut x = -cam.x.rem_euclid(ts);
    while x < cam.viewport_w {
        p.line(x, 0.0, x, cam.viewport_h, GRID, 1.0);
        x += ts;
    }
    let mut y = -cam.y.rem_euclid(ts);
    while y < cam.viewport_h {
        p.line(0.0, y, cam.viewport_w, y, GRID, 1.0);
        y += ts;
    }
}

fn draw_contours(p: &mut dyn Painter, world: &WorldStore, tile: &Tile, cam: &Camera) {
    let ts = cam.tile_px();
    let (sx, sy) = cam.world_to_screen(tile.coord.x as f64, tile.coord.y as f64);
    let width = (ts * 0.08).max(1.5);
    for edge in contour_edges(world, tile) {
        let (x0, y0, x1, y1) = edge_segment(edge.side, sx, sy, ts, width / 2.0);
        p.line(x0, y0, x1, y1, world.color_of(edge.owner), width);
    }
}

fn draw_selection(p: &mut dyn Painter, cam: &Camera, coord: TileCoord, ts: f64) {
    let (sx, sy) = cam.world_to_screen(coord.x as f64, coord.y as f64);
    p.stroke_rect(sx, sy, ts, ts, SELECTION, 2.0);
    let arm = ts * 0.25;
    for (cx, cy, dx, dy) in [
        (sx, sy, 1.0, 1.0),
        (sx + ts, sy, -1.0, 1.0),
        (sx, sy + ts, 1.0, -1.0),
        (sx + ts, sy + ts, -1.0, -1.0),
    ] {
        p.line(cx, cy, cx + arm * dx, cy, SELECTION, 3.0);
        p.line(cx, cy, cx, cy + arm * dy, SELECTION, 3.0);
    }
}

fn draw_creep(p: &mut dyn Painter, world: &WorldStore, creep: &Creep, cam: &Camera) {
    let ts = cam.tile_px();
    let (cx, cy) = cam.world_to_screen(creep.x, creep.y);
    let size = ts * 0.7;
    if cx + size < 0.0 || cy + size < 0.0 || cx - size > cam.viewport_w || cy - size > cam.viewport_h {
        return;
    }
    let key = SpriteKey::Creep(creep.creep_type.clone());
    if !p.sprite(&key, cx - size / 2.0, cy - size / 2.0, size, size) {
        p.fill_circle(cx, cy, size / 2.0, world.color_of(creep.player_number));
    }
    if let Some(sender) = creep.sent_by {
        p.stroke_circle(cx, cy, size / 2.0 + 2.0, world.color_of(sender), 2.0);
    }

    let bar_w = ts * 0.6;
    let bar_h = (ts * 0.08).max(2.0);
    let bar_x = cx - bar_w / 2.0;
    let bar_y = cy - size / 2.0 - bar_h - 3.0;
    let frac = creep.health_fraction();
    p.fill_rect(bar_x, bar_y, bar_w, bar_h, HP_BACK);
    p.fill_rect(bar_x, bar_y, bar_w * frac, bar_h, health_color(frac));
}
