// Road autotiling: 4-bit neighbour mask, recomputed on every draw

use crate::model::{Direction, TileCoord};
use crate::state::WorldStore;

pub const NORTH: u8 = 1;
pub const EAST: u8 = 2;
pub const SOUTH: u8 = 4;
pub const WEST: u8 = 8;

pub fn direction_bit(dir: Direction) -> u8 {
    match dir {
        Direction::North => NORTH,
        Direction::East => EAST,
        Direction::South => SOUTH,
        Direction::West => WEST,
    }
}

/// Which cardinal neighbours of `coord` are roads, as `N|E|S|W` bits.
pub fn road_mask(world: &WorldStore, coord: TileCoord) -> u8 {
    Direction::ALL
        .iter()
        .filter(|d| world.is_road(coord.neighbor(**d)))
        .fold(0, |mask, d| mask | direction_bit(*d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Structure, TerrainType, Tile};

    fn road(world: &mut WorldStore, x: i32, y: i32) {
        let mut t = Tile::new(TileCoord::new(x, y), TerrainType::Dirt);
        t.structure = Structure::Road;
        world.upsert_tile(t);
    }

    #[test]
    fn mask_tracks_neighbour_roads_live() {
        let mut w = WorldStore::new();
        road(&mut w, 5, 5);
        assert_eq!(road_mask(&w, TileCoord::new(5, 5)), 0);
        road(&mut w, 5, 4);
        road(&mut w, 6, 5);
        assert_eq!(road_mask(&w, TileCoord::new(5, 5)), NORTH | EAST);
        road(&mut w, 5, 6);
        road(&mut w, 4, 5);
        assert_eq!(road_mask(&w, TileCoord::new(5, 5)), 15);
        w.upsert_tile(Tile::new(TileCoord::new(6, 5), TerrainType::Grass));
        assert_eq!(road_mask(&w, TileCoord::new(5, 5)), NORTH | SOUTH | WEST);
    }
}
