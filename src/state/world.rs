//! Client copy of the authoritative world, updated only by server deltas.

use std::collections::{BTreeMap, HashMap};

use crate::model::{
    Creep, LocalPlayer, PlacedTower, PlayerResources, Structure, TerrainType, Tile, TileCoord,
    player_color,
};
use crate::protocol::{CreepSpawn, CreepUpdate};

/// Exclusive tile extents: every known tile has `x < max_x` and `y < max_y`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldBounds {
    pub max_x: i32,
    pub max_y: i32,
}

impl WorldBounds {
    fn include(&mut self, coord: TileCoord) {
        self.max_x = self.max_x.max(coord.x + 1);
        self.max_y = self.max_y.max(coord.y + 1);
    }
}

#[derive(Debug, Default)]
pub struct WorldStore {
    tiles: HashMap<TileCoord, Tile>,
    bounds: WorldBounds,
    creeps: BTreeMap<String, Creep>,
    towers: HashMap<String, PlacedTower>,
    resources: PlayerResources,
    local_player: Option<LocalPlayer>,
    /// player number -> colour index
    player_colors: HashMap<u32, u32>,
    selected: Option<Tile>,
    /// Bumped on every tile/resource/selection change so views can cheaply
    /// tell whether to re-render.
    version: u64,
}

impl WorldStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    #[cfg(test)]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_road(&self, coord: TileCoord) -> bool {
        self.tiles
            .get(&coord)
            .is_some_and(|t| t.structure.is_road())
    }

    pub fn creeps(&self) -> impl Iterator<Item = &Creep> {
        self.creeps.values()
    }

    #[cfg(test)]
    pub fn creep(&self, id: &str) -> Option<&Creep> {
        self.creeps.get(id)
    }

    pub fn towers(&self) -> impl Iterator<Item = &PlacedTower> {
        self.towers.values()
    }

    pub fn resources(&self) -> PlayerResources {
        self.resources
    }

    pub fn local_player(&self) -> Option<LocalPlayer> {
        self.local_player
    }

    pub fn set_local_player(&mut self, player: LocalPlayer) {
        self.player_colors
            .insert(player.player_number, player.color_index);
        self.local_player = Some(player);
        self.version += 1;
    }

    /// Colour for a player: the assigned colour index if known, else the
    /// player number.
    pub fn color_of(&self, player_number: u32) -> &'static str {
        let index = self
            .player_colors
            .get(&player_number)
            .copied()
            .unwrap_or(player_number);
        player_color(index)
    }

    pub fn selected(&self) -> Option<&Tile> {
        self.selected.as_ref()
    }

    pub fn select(&mut self, coord: Option<TileCoord>) {
        self.selected = coord.and_then(|c| self.tiles.get(&c).cloned());
        self.version += 1;
    }

    /// Replaces the whole map. Bounds become exactly `width` x `height`.
    pub fn replace_map(
        &mut self,
        width: i32,
        height: i32,
        tiles: Vec<Tile>,
        player_colors: HashMap<u32, u32>,
    ) {
        self.tiles = tiles.into_iter().map(|t| (t.coord, t)).collect();
        self.bounds = WorldBounds {
            max_x: width.max(0),
            max_y: height.max(0),
        };
        self.player_colors.extend(player_colors);
        if let Some(local) = self.local_player {
            self.player_colors
                .insert(local.player_number, local.color_index);
        }
        self.towers.clear();
        self.refresh_selection();
        self.version += 1;
    }

    /// Inserts or overwrites a tile. Bounds only grow.
    pub fn upsert_tile(&mut self, tile: Tile) {
        let coord = tile.coord;
        self.bounds.include(coord);
        self.tiles.insert(coord, tile);
        self.refresh_selection_at(coord);
        self.version += 1;
    }

    /// Legacy terrain-only change. Creates a bare tile when unknown.
    pub fn set_terrain(&mut self, coord: TileCoord, terrain: TerrainType) {
        match self.tiles.get_mut(&coord) {
            Some(tile) => tile.terrain = terrain,
            None => {
                self.bounds.include(coord);
                self.tiles.insert(coord, Tile::new(coord, terrain));
            }
        }
        self.refresh_selection_at(coord);
        self.version += 1;
    }

    /// Replaces the snapshot only when something changed. Returns whether it
    /// did.
    pub fn set_resources(&mut self, resources: PlayerResources) -> bool {
        if self.resources == resources {
            return false;
        }
        self.resources = resources;
        self.version += 1;
        true
    }

    /// Server confirmation of a building. Unknown tiles are ignored.
    pub fn building_changed(&mut self, coord: TileCoord, building_type: u32, owner: u32) -> bool {
        let Some(tile) = self.tiles.get_mut(&coord) else {
            log::warn!("building confirmed on unknown tile ({}, {})", coord.x, coord.y);
            return false;
        };
        tile.structure = Structure::Building {
            building_type,
            owner: Some(owner),
        };
        self.refresh_selection_at(coord);
        self.version += 1;
        true
    }

    pub fn tower_placed(&mut self, tower: PlacedTower) -> bool {
        let coord = tower.coord;
        let Some(tile) = self.tiles.get_mut(&coord) else {
            log::warn!("tower confirmed on unknown tile ({}, {})", coord.x, coord.y);
            return false;
        };
        tile.structure = Structure::Tower {
            tower_type: tower.tower_type,
            owner: Some(tower.owner),
        };
        self.towers.insert(tower.id.clone(), tower);
        self.refresh_selection_at(coord);
        self.version += 1;
        true
    }

    /// New creep standing still at its spawn point. A repeated id replaces
    /// the old entry.
    pub fn spawn_creep(&mut self, spawn: CreepSpawn) {
        let max_hitpoints = if spawn.max_hitpoints > 0 {
            spawn.max_hitpoints
        } else {
            spawn.hitpoints
        };
        let creep = Creep {
            id: spawn.creep_id.clone(),
            creep_type: spawn.creep_type,
            x: spawn.x,
            y: spawn.y,
            target_x: spawn.x,
            target_y: spawn.y,
            speed: spawn.speed,
            hitpoints: spawn.hitpoints,
            max_hitpoints,
            player_number: spawn.player_number,
            sent_by: spawn.spawned_by_player,
        };
        self.creeps.insert(spawn.creep_id, creep);
    }

    /// Moves the target and hitpoints only; the rendered position catches
    /// up in [`WorldStore::advance_creeps`].
    pub fn update_creep(&mut self, update: CreepUpdate) -> bool {
        let Some(creep) = self.creeps.get_mut(&update.id) else {
            log::debug!("update for unknown creep {}", update.id);
            return false;
        };
        creep.target_x = update.x;
        creep.target_y = update.y;
        if let Some(hp) = update.hitpoints {
            creep.hitpoints = hp;
        }
        true
    }

    pub fn despawn_creep(&mut self, id: &str) -> bool {
        self.creeps.remove(id).is_some()
    }

    pub fn advance_creeps(&mut self, dt_secs: f64) {
        for creep in self.creeps.values_mut() {
            creep.advance(dt_secs);
        }
    }

    fn refresh_selection_at(&mut self, coord: TileCoord) {
        if self.selected.as_ref().is_some_and(|s| s.coord == coord) {
            self.selected = self.tiles.get(&coord).cloned();
        }
    }

    fn refresh_selection(&mut self) {
        if let Some(coord) = self.selected.as_ref().map(|s| s.coord) {
            self.selected = self.tiles.get(&coord).cloned();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tile(x: i32, y: i32, terrain: TerrainType, owners: &[u32]) -> Tile {
        let mut t = Tile::new(TileCoord::new(x, y), terrain);
        t.owners = owners.iter().copied().collect();
        t
    }

    fn spawn(id: &str, x: f64, y: f64) -> CreepSpawn {
        CreepSpawn {
            creep_id: id.into(),
            creep_type: "RUNNER".into(),
            x,
            y,
            player_number: 1,
            spawned_by_player: Some(2),
            hitpoints: 30,
            max_hitpoints: 0,
            speed: 2.0,
        }
    }

    #[test]
    fn full_map_sets_declared_bounds_then_upserts_grow_them() {
        let mut w = WorldStore::new();
        w.upsert_tile(tile(40, 40, TerrainType::Grass, &[]));
        w.replace_map(10, 8, vec![tile(1, 1, TerrainType::Dirt, &[])], HashMap::new());
        assert_eq!(w.bounds(), WorldBounds { max_x: 10, max_y: 8 });
        assert!(w.tile(TileCoord::new(40, 40)).is_none());
        w.upsert_tile(tile(12, 2, TerrainType::Grass, &[]));
        assert_eq!(w.bounds(), WorldBounds { max_x: 13, max_y: 8 });
    }

    #[test]
    fn resources_only_replace_on_change() {
        let mut w = WorldStore::new();
        let v0 = w.version();
        assert!(!w.set_resources(PlayerResources::default()));
        assert_eq!(w.version(), v0);
        assert!(w.set_resources(PlayerResources::new(5, 0, 0)));
        assert!(!w.set_resources(PlayerResources::new(5, 0, 0)));
    }

    #[test]
    fn selection_follows_tile_updates() {
        let mut w = WorldStore::new();
        w.upsert_tile(tile(2, 2, TerrainType::Forest, &[1]));
        w.select(Some(TileCoord::new(2, 2)));
        w.building_changed(TileCoord::new(2, 2), 1, 1);
        assert_eq!(
            w.selected().map(|t| t.structure.clone()),
            Some(Structure::Building { building_type: 1, owner: Some(1) })
        );
        w.set_terrain(TileCoord::new(2, 2), TerrainType::Grass);
        assert_eq!(w.selected().map(|t| t.terrain), Some(TerrainType::Grass));
        w.upsert_tile(tile(3, 3, TerrainType::Rocky, &[]));
        assert_eq!(w.selected().map(|t| t.coord), Some(TileCoord::new(2, 2)));
    }

    #[test]
    fn building_on_unknown_tile_is_ignored() {
        let mut w = WorldStore::new();
        assert!(!w.building_changed(TileCoord::new(9, 9), 2, 1));
        assert_eq!(w.tile_count(), 0);
    }

    #[test]
    fn tower_confirmation_occupies_tile() {
        let mut w = WorldStore::new();
        w.upsert_tile(tile(0, 0, TerrainType::Grass, &[1]));
        assert!(w.tower_placed(PlacedTower {
            id: "t1".into(),
            tower_type: 2,
            coord: TileCoord::new(0, 0),
            owner: 1,
            range: Some(5.0),
        }));
        assert!(!w.tile(TileCoord::new(0, 0)).unwrap().structure.is_none());
        assert_eq!(w.towers().count(), 1);
    }

    #[test]
    fn creep_lifecycle_moves_target_not_position() {
        let mut w = WorldStore::new();
        w.spawn_creep(spawn("c1", 0.5, 0.5));
        let c = w.creep("c1").unwrap();
        assert_eq!((c.target_x, c.target_y), (0.5, 0.5));
        assert_eq!(c.max_hitpoints, 30);

        assert!(w.update_creep(CreepUpdate { id: "c1".into(), x: 2.5, y: 0.5, hitpoints: Some(12) }));
        let c = w.creep("c1").unwrap();
        assert_eq!((c.x, c.target_x, c.hitpoints), (0.5, 2.5, 12));

        w.advance_creeps(0.5);
        assert!((w.creep("c1").unwrap().x - 1.5).abs() < 1e-9);

        assert!(w.despawn_creep("c1"));
        assert!(!w.despawn_creep("c1"));
        assert!(!w.update_creep(CreepUpdate { id: "c1".into(), x: 0.0, y: 0.0, hitpoints: None }));
    }

    #[test]
    fn player_colors_fall_back_to_player_number() {
        let mut w = WorldStore::new();
        let mut colors = HashMap::new();
        colors.insert(1, 5);
        w.replace_map(1, 1, vec![], colors);
        assert_eq!(w.color_of(1), player_color(5));
        assert_eq!(w.color_of(3), player_color(3));
    }

    proptest! {
        #[test]
        fn bounds_are_pointwise_max_of_seen_coords(coords in prop::collection::vec((0i32..200, 0i32..200), 1..40)) {
            let mut w = WorldStore::new();
            let mut mx = 0;
            let mut my = 0;
            for (x, y) in coords {
                w.upsert_tile(tile(x, y, TerrainType::Grass, &[]));
                mx = mx.max(x + 1);
                my = my.max(y + 1);
                prop_assert_eq!(w.bounds(), WorldBounds { max_x: mx, max_y: my });
            }
        }
    }
}
