//! Core data models for the Turrest client.
//! Tiles, structures, creeps and the static placement/creep definitions
//! shared by the store, the validator and the renderer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Integer grid coordinate of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn neighbor(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TerrainType {
    Grass,
    Dirt,
    Forest,
    WaterShallow,
    WaterDeep,
    Rocky,
    Castle,
    Spawner,
}

impl TerrainType {
    #[cfg(test)]
    pub const ALL: [TerrainType; 8] = [
        TerrainType::Grass,
        TerrainType::Dirt,
        TerrainType::Forest,
        TerrainType::WaterShallow,
        TerrainType::WaterDeep,
        TerrainType::Rocky,
        TerrainType::Castle,
        TerrainType::Spawner,
    ];

    /// Maps the server's terrain id. Unknown ids yield `None`.
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            1 => Some(TerrainType::Grass),
            2 => Some(TerrainType::Dirt),
            3 => Some(TerrainType::Forest),
            4 => Some(TerrainType::WaterShallow),
            5 => Some(TerrainType::WaterDeep),
            6 => Some(TerrainType::Rocky),
            7 => Some(TerrainType::Castle),
            8 => Some(TerrainType::Spawner),
            _ => None,
        }
    }

    pub fn id(self) -> u32 {
        match self {
            TerrainType::Grass => 1,
            TerrainType::Dirt => 2,
            TerrainType::Forest => 3,
            TerrainType::WaterShallow => 4,
            TerrainType::WaterDeep => 5,
            TerrainType::Rocky => 6,
            TerrainType::Castle => 7,
            TerrainType::Spawner => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TerrainType::Grass => "Grass",
            TerrainType::Dirt => "Dirt",
            TerrainType::Forest => "Forest",
            TerrainType::WaterShallow => "Shallow Water",
            TerrainType::WaterDeep => "Deep Water",
            TerrainType::Rocky => "Rocky",
            TerrainType::Castle => "Castle",
            TerrainType::Spawner => "Spawner",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            TerrainType::Grass => "#4CAF50",
            TerrainType::Dirt => "#8B4513",
            TerrainType::Forest => "#228B22",
            TerrainType::WaterShallow => "#87CEEB",
            TerrainType::WaterDeep => "#1E90FF",
            TerrainType::Rocky => "#808080",
            TerrainType::Castle => "#FFD700",
            TerrainType::Spawner => "#FF4500",
        }
    }

    /// Lowercase asset stem, e.g. `water_shallow`.
    pub fn asset_name(self) -> &'static str {
        match self {
            TerrainType::Grass => "grass",
            TerrainType::Dirt => "dirt",
            TerrainType::Forest => "forest",
            TerrainType::WaterShallow => "water_shallow",
            TerrainType::WaterDeep => "water_deep",
            TerrainType::Rocky => "rocky",
            TerrainType::Castle => "castle",
            TerrainType::Spawner => "spawner",
        }
    }
}

/// What stands on a tile. `building_type` only exists on `Building`, so a
/// road can never carry a stale building id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Structure {
    #[default]
    None,
    Road,
    Building { building_type: u32, owner: Option<u32> },
    Tower { tower_type: u32, owner: Option<u32> },
}

impl Structure {
    pub fn is_none(&self) -> bool {
        matches!(self, Structure::None)
    }

    pub fn is_road(&self) -> bool {
        matches!(self, Structure::Road)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub coord: TileCoord,
    pub terrain: TerrainType,
    pub structure: Structure,
    /// Players entitled to build here.
    pub owners: BTreeSet<u32>,
}

impl Tile {
    pub fn new(coord: TileCoord, terrain: TerrainType) -> Self {
        Self {
            coord,
            terrain,
            structure: Structure::None,
            owners: BTreeSet::new(),
        }
    }

    pub fn is_owned_by(&self, player: u32) -> bool {
        self.owners.contains(&player)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerResources {
    pub wood: u32,
    pub stone: u32,
    pub gold: u32,
}

impl PlayerResources {
    pub const fn new(wood: u32, stone: u32, gold: u32) -> Self {
        Self { wood, stone, gold }
    }

    pub fn covers(&self, cost: &ResourceCost) -> bool {
        self.wood >= cost.wood && self.stone >= cost.stone && self.gold >= cost.gold
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCost {
    pub wood: u32,
    pub stone: u32,
    pub gold: u32,
}

impl ResourceCost {
    pub const fn new(wood: u32, stone: u32, gold: u32) -> Self {
        Self { wood, stone, gold }
    }
}

/// A mobile entity. `x`/`y` are the client-rendered position in tile units;
/// only [`Creep::advance`] moves them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Creep {
    pub id: String,
    pub creep_type: String,
    pub x: f64,
    pub y: f64,
    pub target_x: f64,
    pub target_y: f64,
    /// Tiles per second.
    pub speed: f64,
    pub hitpoints: i32,
    pub max_hitpoints: i32,
    /// Player whose castle the creep is heading for.
    pub player_number: u32,
    /// `None` for wave spawns.
    pub sent_by: Option<u32>,
}

/// Distance under which a creep is snapped onto its target.
pub const SNAP_EPSILON: f64 = 0.01;

impl Creep {
    pub fn distance_to_target(&self) -> f64 {
        let dx = self.target_x - self.x;
        let dy = self.target_y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Moves the rendered position toward the target by `speed * dt`,
    /// never past it.
    pub fn advance(&mut self, dt: f64) {
        if !(dt > 0.0) {
            return;
        }
        let dx = self.target_x - self.x;
        let dy = self.target_y - self.y;
        let dist = self.distance_to_target();
        let step = self.speed.max(0.0) * dt;
        if dist <= SNAP_EPSILON || step >= dist {
            self.x = self.target_x;
            self.y = self.target_y;
            return;
        }
        let ratio = step / dist;
        self.x += dx * ratio;
        self.y += dy * ratio;
    }

    pub fn health_fraction(&self) -> f64 {
        if self.max_hitpoints <= 0 {
            return 0.0;
        }
        (self.hitpoints as f64 / self.max_hitpoints as f64).clamp(0.0, 1.0)
    }
}

/// A tower confirmed by the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedTower {
    pub id: String,
    pub tower_type: u32,
    pub coord: TileCoord,
    pub owner: u32,
    pub range: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlaceableKind {
    Building(u32),
    Tower(u32),
}

/// Something the player can put on a tile.
#[derive(Clone, Debug, PartialEq)]
pub struct Placeable {
    pub kind: PlaceableKind,
    pub name: &'static str,
    pub icon: &'static str,
    pub cost: ResourceCost,
    pub allowed_terrains: &'static [TerrainType],
}

impl Placeable {
    pub fn allows(&self, terrain: TerrainType) -> bool {
        self.allowed_terrains.contains(&terrain)
    }
}

pub const BUILDINGS: [Placeable; 3] = [
    Placeable {
        kind: PlaceableKind::Building(1),
        name: "Lumbercamp",
        icon: "🪓",
        cost: ResourceCost::new(50, 10, 10),
        allowed_terrains: &[TerrainType::Forest],
    },
    Placeable {
        kind: PlaceableKind::Building(2),
        name: "Stone Quarry",
        icon: "⛏",
        cost: ResourceCost::new(10, 50, 10),
        allowed_terrains: &[TerrainType::Rocky],
    },
    Placeable {
        kind: PlaceableKind::Building(3),
        name: "Gold Mine",
        icon: "⚒",
        cost: ResourceCost::new(10, 10, 50),
        allowed_terrains: &[TerrainType::Dirt],
    },
];

pub const TOWERS: [Placeable; 5] = [
    Placeable {
        kind: PlaceableKind::Tower(1),
        name: "Basic Tower",
        icon: "🗼",
        cost: ResourceCost::new(80, 80, 100),
        allowed_terrains: &[TerrainType::Grass, TerrainType::Dirt],
    },
    Placeable {
        kind: PlaceableKind::Tower(2),
        name: "Sniper Tower",
        icon: "🎯",
        cost: ResourceCost::new(60, 150, 200),
        allowed_terrains: &[TerrainType::Grass, TerrainType::Rocky],
    },
    Placeable {
        kind: PlaceableKind::Tower(3),
        name: "Splash Tower",
        icon: "💥",
        cost: ResourceCost::new(120, 120, 150),
        allowed_terrains: &[TerrainType::Grass, TerrainType::Dirt],
    },
    Placeable {
        kind: PlaceableKind::Tower(4),
        name: "Slow Tower",
        icon: "❄",
        cost: ResourceCost::new(60, 100, 130),
        allowed_terrains: &[TerrainType::Grass, TerrainType::Forest],
    },
    Placeable {
        kind: PlaceableKind::Tower(5),
        name: "Rapid Tower",
        icon: "⚡",
        cost: ResourceCost::new(100, 80, 100),
        allowed_terrains: &[TerrainType::Grass, TerrainType::Dirt],
    },
];

pub fn placeable(kind: PlaceableKind) -> Option<&'static Placeable> {
    BUILDINGS
        .iter()
        .chain(TOWERS.iter())
        .find(|p| p.kind == kind)
}

pub fn building_name(building_type: u32) -> &'static str {
    placeable(PlaceableKind::Building(building_type))
        .map(|p| p.name)
        .unwrap_or("Building")
}

pub fn tower_name(tower_type: u32) -> &'static str {
    placeable(PlaceableKind::Tower(tower_type))
        .map(|p| p.name)
        .unwrap_or("Tower")
}

/// A creep type the player can send to opponents.
#[derive(Clone, Debug, PartialEq)]
pub struct CreepDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub send_cost: ResourceCost,
}

pub const CREEP_DEFINITIONS: [CreepDefinition; 6] = [
    CreepDefinition { id: "GHOST", name: "Ghost", icon: "👻", send_cost: ResourceCost::new(0, 0, 10) },
    CreepDefinition { id: "TROLL", name: "Troll", icon: "👹", send_cost: ResourceCost::new(0, 0, 30) },
    CreepDefinition { id: "RUNNER", name: "Runner", icon: "🏃", send_cost: ResourceCost::new(0, 0, 5) },
    CreepDefinition { id: "TANK", name: "Tank", icon: "🛡", send_cost: ResourceCost::new(0, 0, 60) },
    CreepDefinition { id: "HEALER", name: "Healer", icon: "✚", send_cost: ResourceCost::new(0, 0, 25) },
    CreepDefinition { id: "SWARM", name: "Swarm", icon: "🐝", send_cost: ResourceCost::new(0, 0, 8) },
];

pub fn creep_definition(id: &str) -> Option<&'static CreepDefinition> {
    CREEP_DEFINITIONS
        .iter()
        .find(|c| c.id.eq_ignore_ascii_case(id))
}

/// 16 distinguishable player colours, indexed by colour index.
pub const PLAYER_COLORS: [&str; 16] = [
    "#E53935", "#1E88E5", "#43A047", "#FB8C00", "#8E24AA", "#00ACC1", "#FFB300", "#D81B60",
    "#5E35B1", "#00897B", "#7CB342", "#F4511E", "#3949AB", "#C0CA33", "#6D4C41", "#546E7A",
];

pub fn player_color(color_index: u32) -> &'static str {
    PLAYER_COLORS[(color_index as usize) % PLAYER_COLORS.len()]
}

/// Local player's identity as assigned by the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalPlayer {
    pub player_number: u32,
    pub color_index: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub player_number: u32,
    pub is_winner: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn creep_at(x: f64, y: f64, tx: f64, ty: f64, speed: f64) -> Creep {
        Creep {
            id: "c1".into(),
            creep_type: "GHOST".into(),
            x,
            y,
            target_x: tx,
            target_y: ty,
            speed,
            hitpoints: 50,
            max_hitpoints: 50,
            player_number: 1,
            sent_by: None,
        }
    }

    #[test]
    fn terrain_ids_round_trip_through_the_server_numbering() {
        for t in TerrainType::ALL {
            assert_eq!(TerrainType::from_id(t.id()), Some(t));
        }
        assert_eq!(TerrainType::from_id(0), None);
        assert_eq!(TerrainType::from_id(9), None);
    }

    #[test]
    fn creep_advances_partially_then_lands_exactly_on_target() {
        let mut c = creep_at(0.5, 0.5, 3.5, 0.5, 1.0);
        c.advance(1.0);
        assert!((c.x - 1.5).abs() < 1e-9);
        c.advance(5.0);
        assert_eq!((c.x, c.y), (3.5, 0.5));
    }

    #[test]
    fn creep_snaps_when_within_epsilon() {
        let mut c = creep_at(1.0, 1.0, 1.005, 1.0, 0.0);
        c.advance(0.016);
        assert_eq!(c.x, 1.005);
    }

    #[test]
    fn non_positive_elapsed_time_leaves_creep_in_place() {
        let mut c = creep_at(0.0, 0.0, 2.0, 0.0, 1.0);
        c.advance(0.0);
        c.advance(-1.0);
        assert_eq!(c.x, 0.0);
    }

    proptest! {
        #[test]
        fn interpolation_never_overshoots(
            tx in -50.0f64..50.0,
            ty in -50.0f64..50.0,
            speed in 0.0f64..20.0,
            steps in prop::collection::vec(0.0f64..0.5, 1..50),
        ) {
            let mut c = creep_at(0.0, 0.0, tx, ty, speed);
            let total = (tx * tx + ty * ty).sqrt();
            let mut elapsed = 0.0;
            for dt in steps {
                c.advance(dt);
                elapsed += dt;
                let travelled = (c.x * c.x + c.y * c.y).sqrt();
                prop_assert!(travelled <= total + 1e-9);
                if speed * elapsed >= total + 1e-6 {
                    prop_assert_eq!((c.x, c.y), (tx, ty));
                }
            }
        }
    }

    #[test]
    fn health_fraction_is_clamped() {
        let mut c = creep_at(0.0, 0.0, 0.0, 0.0, 1.0);
        c.hitpoints = 80;
        assert_eq!(c.health_fraction(), 1.0);
        c.max_hitpoints = 0;
        assert_eq!(c.health_fraction(), 0.0);
    }

    #[test]
    fn definitions_are_looked_up_by_kind_and_id() {
        assert_eq!(placeable(PlaceableKind::Building(2)).map(|p| p.name), Some("Stone Quarry"));
        assert_eq!(placeable(PlaceableKind::Tower(4)).map(|p| p.name), Some("Slow Tower"));
        assert!(placeable(PlaceableKind::Tower(9)).is_none());
        assert_eq!(creep_definition("troll").map(|c| c.name), Some("Troll"));
        assert_eq!(player_color(17), PLAYER_COLORS[1]);
    }
}
