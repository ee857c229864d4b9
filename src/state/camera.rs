// Viewport camera: offset, zoom and the screen <-> world transforms

use crate::config::ClientConfig;
use crate::model::TileCoord;
use crate::state::world::WorldBounds;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: 0.25,
            max: 2.0,
            step: 0.1,
        }
    }
}

/// Half-open tile range `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl TileRange {
    pub fn iter(self) -> impl Iterator<Item = TileCoord> {
        (self.y0..self.y1).flat_map(move |y| (self.x0..self.x1).map(move |x| TileCoord::new(x, y)))
    }

    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }
}

/// `x`/`y` are the top-left of the viewport in zoomed pixel space, so a
/// tile lands on screen at `tile * tile_px - camera`.
#[derive(Debug, Clone)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
    pub viewport_w: f64,
    pub viewport_h: f64,
    pub world: WorldBounds,
    pub base_tile_size: f64,
    pub limits: ZoomLimits,
    /// Set once the camera has been centred on the first map.
    pub initialized: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
            viewport_w: 800.0,
            viewport_h: 600.0,
            world: WorldBounds::default(),
            base_tile_size: 32.0,
            limits: ZoomLimits::default(),
            initialized: false,
        }
    }
}

impl Camera {
    pub fn from_config(cfg: &ClientConfig) -> Self {
        Self {
            base_tile_size: cfg.base_tile_size,
            limits: ZoomLimits {
                min: cfg.min_zoom,
                max: cfg.max_zoom,
                step: cfg.zoom_step,
            },
            ..Default::default()
        }
    }

    pub fn tile_px(&self) -> f64 {
        self.base_tile_size * self.zoom
    }

    pub fn set_viewport(&mut self, w: f64, h: f64) {
        self.viewport_w = w.max(0.0);
        self.viewport_h = h.max(0.0);
        self.clamp();
    }

    pub fn set_world(&mut self, world: WorldBounds) {
        self.world = world;
        self.clamp();
    }

    /// Drag by a screen delta: the world follows the pointer.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.x -= dx;
        self.y -= dy;
        self.clamp();
    }

    fn axis_range(world_tiles: i32, tile_px: f64, viewport: f64) -> (f64, f64) {
        let min = -viewport / 2.0;
        let max = (world_tiles as f64 * tile_px - viewport / 2.0).max(0.0);
        (min, max)
    }

    /// Keeps the camera within half a viewport of the world on each axis.
    pub fn clamp(&mut self) {
        let ts = self.tile_px();
        let (min_x, max_x) = Self::axis_range(self.world.max_x, ts, self.viewport_w);
        let (min_y, max_y) = Self::axis_range(self.world.max_y, ts, self.viewport_h);
        self.x = self.x.clamp(min_x, max_x);
        self.y = self.y.clamp(min_y, max_y);
    }

    /// Steps the zoom (`direction` > 0 zooms in) keeping the world point
    /// under the anchor fixed, then clamps.
    pub fn zoom_at(&mut self, direction: f64, anchor_x: f64, anchor_y: f64) {
        let old = self.zoom;
        let next = if direction > 0.0 {
            old + self.limits.step
        } else if direction < 0.0 {
            old - self.limits.step
        } else {
            old
        };
        self.set_zoom_at(next, anchor_x, anchor_y);
    }

    pub fn set_zoom_at(&mut self, zoom: f64, anchor_x: f64, anchor_y: f64) {
        let old = self.zoom;
        self.zoom = zoom.clamp(self.limits.min, self.limits.max);
        let world_x = (self.x + anchor_x) / old;
        let world_y = (self.y + anchor_y) / old;
        self.x = world_x * self.zoom - anchor_x;
        self.y = world_y * self.zoom - anchor_y;
        self.clamp();
    }

    pub fn zoom_in(&mut self) {
        self.zoom_at(1.0, self.viewport_w / 2.0, self.viewport_h / 2.0);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_at(-1.0, self.viewport_w / 2.0, self.viewport_h / 2.0);
    }

    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.x = 0.0;
        self.y = 0.0;
        self.clamp();
    }

    /// Screen pixel -> world position in tile units.
    pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
        let ts = self.tile_px();
        ((sx + self.x) / ts, (sy + self.y) / ts)
    }

    pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
        let ts = self.tile_px();
        (wx * ts - self.x, wy * ts - self.y)
    }

    pub fn screen_to_tile(&self, sx: f64, sy: f64) -> TileCoord {
        let (wx, wy) = self.screen_to_world(sx, sy);
        TileCoord::new(wx.floor() as i32, wy.floor() as i32)
    }

    /// Centres the viewport on a world point (tile units).
    pub fn center_on(&mut self, wx: f64, wy: f64) {
        let ts = self.tile_px();
        self.x = wx * ts - self.viewport_w / 2.0;
        self.y = wy * ts - self.viewport_h / 2.0;
        self.clamp();
    }

    /// Tiles intersecting the viewport, limited to the known world.
    pub fn visible_tile_range(&self) -> TileRange {
        let ts = self.tile_px();
        if ts <= 0.0 {
            return TileRange { x0: 0, y0: 0, x1: 0, y1: 0 };
        }
        let x0 = (self.x / ts).floor().max(0.0) as i32;
        let y0 = (self.y / ts).floor().max(0.0) as i32;
        let x1 = (((self.x + self.viewport_w) / ts).ceil() as i32).min(self.world.max_x);
        let y1 = (((self.y + self.viewport_h) / ts).ceil() as i32).min(self.world.max_y);
        TileRange {
            x0,
            y0,
            x1: x1.max(x0),
            y1: y1.max(y0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn big_world() -> Camera {
        let mut cam = Camera::default();
        cam.set_world(WorldBounds { max_x: 500, max_y: 500 });
        cam.set_viewport(800.0, 600.0);
        cam
    }

    #[test]
    fn pan_moves_opposite_to_drag_and_clamps() {
        let mut cam = big_world();
        cam.pan(-100.0, -50.0);
        assert_eq!((cam.x, cam.y), (100.0, 50.0));
        cam.pan(10_000.0, 10_000.0);
        assert_eq!((cam.x, cam.y), (-400.0, -300.0));
    }

    #[test]
    fn small_world_max_is_never_negative() {
        let mut cam = Camera::default();
        cam.set_world(WorldBounds { max_x: 2, max_y: 2 });
        cam.set_viewport(800.0, 600.0);
        cam.pan(-5_000.0, -5_000.0);
        assert_eq!((cam.x, cam.y), (0.0, 0.0));
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut cam = big_world();
        cam.pan(-1000.0, -800.0);
        let before = cam.screen_to_world(200.0, 150.0);
        cam.zoom_at(1.0, 200.0, 150.0);
        assert!((cam.zoom - 1.1).abs() < 1e-9);
        let after = cam.screen_to_world(200.0, 150.0);
        assert!((before.0 - after.0).abs() < 1e-9);
        assert!((before.1 - after.1).abs() < 1e-9);
    }

    #[test]
    fn zoom_is_bounded() {
        let mut cam = big_world();
        for _ in 0..50 {
            cam.zoom_out();
        }
        assert_eq!(cam.zoom, 0.25);
        for _ in 0..50 {
            cam.zoom_in();
        }
        assert_eq!(cam.zoom, 2.0);
        cam.reset();
        assert_eq!(cam.zoom, 1.0);
    }

    #[test]
    fn visible_range_covers_viewport_within_world() {
        let mut cam = big_world();
        cam.pan(-64.0, 0.0);
        let r = cam.visible_tile_range();
        assert_eq!((r.x0, r.y0, r.x1, r.y1), (2, 0, 27, 19));
        cam.set_world(WorldBounds { max_x: 10, max_y: 10 });
        let r = cam.visible_tile_range();
        assert_eq!((r.x1, r.y1), (10, 10));
    }

    #[test]
    fn screen_to_tile_floors_negative_positions() {
        let mut cam = big_world();
        cam.pan(100.0, 100.0);
        assert_eq!(cam.screen_to_tile(10.0, 10.0), TileCoord::new(-3, -3));
    }

    proptest! {
        #[test]
        fn screen_world_round_trip(
            cx in -400.0f64..5000.0,
            cy in -300.0f64..5000.0,
            zoom in 0.25f64..2.0,
            sx in 0.0f64..800.0,
            sy in 0.0f64..600.0,
        ) {
            let mut cam = big_world();
            cam.zoom = zoom;
            cam.x = cx;
            cam.y = cy;
            let (wx, wy) = cam.screen_to_world(sx, sy);
            let (rx, ry) = cam.world_to_screen(wx, wy);
            prop_assert!((rx - sx).abs() < 1e-6);
            prop_assert!((ry - sy).abs() < 1e-6);
        }
    }
}
