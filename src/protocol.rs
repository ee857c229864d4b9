//! Wire envelope and typed game deltas.
//!
//! Every frame on the socket is `{subject, topic, data}`. Inbound `GAME`
//! frames are decoded into [`GameDelta`]s here; anything that does not fit
//! its topic's shape becomes a [`ClientError::Protocol`] and is dropped by
//! the caller.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

use crate::error::{ClientError, ClientResult};
use crate::model::{
    GameOutcome, LocalPlayer, PlaceableKind, PlacedTower, PlayerResources, Structure,
    TerrainType, Tile, TileCoord,
};

pub mod subject {
    pub const GAME: &str = "GAME";
    pub const CORE: &str = "CORE";
    pub const SOCKET_CONNECT: &str = "SOCKET_CONNECT";
}

pub mod topic {
    pub const LOGIN: &str = "LOGIN";
    pub const TOKEN_INVALID: &str = "TOKEN_INVALID";

    pub const FULL_MAP: &str = "FULL_MAP";
    pub const TILE_UPDATE: &str = "TILE_UPDATE";
    pub const TILE_CHANGED: &str = "TILE_CHANGED";
    pub const RESOURCE_UPDATE: &str = "RESOURCE_UPDATE";
    pub const BUILDING_CHANGED: &str = "BUILDING_CHANGED";
    pub const TOWER_PLACED: &str = "TOWER_PLACED";
    pub const SPAWN_CREEP: &str = "SPAWN_CREEP";
    pub const BATCHED_SPAWN_CREEP: &str = "BATCHED_SPAWN_CREEP";
    pub const UPDATE_CREEP: &str = "UPDATE_CREEP";
    pub const BATCHED_CREEP_UPDATE: &str = "BATCHED_CREEP_UPDATE";
    pub const DESPAWN_CREEP: &str = "DESPAWN_CREEP";
    pub const PLAYER_TAKES_DAMAGE: &str = "PLAYER_TAKES_DAMAGE";
    pub const PLAYER_HP_UPDATE: &str = "PLAYER_HP_UPDATE";
    pub const COUNTDOWN: &str = "COUNTDOWN";
    pub const PLAYER_INFO: &str = "PLAYER_INFO";
    pub const GAME_OVER: &str = "GAME_OVER";
    pub const ERROR_MESSAGE: &str = "ERROR_MESSAGE";
    pub const STATS: &str = "STATS";

    pub const PLACE_BUILDING: &str = "PLACE_BUILDING";
    pub const PLACE_TOWER: &str = "PLACE_TOWER";
    pub const GET_STATS: &str = "GET_STATS";
    pub const SEND_CREEP: &str = "SEND_CREEP";
}

const STRUCTURE_ROAD: u32 = 0;
const STRUCTURE_BUILDING: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketCommand {
    pub subject: String,
    pub topic: String,
    #[serde(default)]
    pub data: Value,
}

impl SocketCommand {
    pub fn new(subject: &str, topic: &str, data: Value) -> Self {
        Self {
            subject: subject.to_string(),
            topic: topic.to_string(),
            data,
        }
    }

    pub fn parse(raw: &str) -> ClientResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> ClientResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn is(&self, subject: &str, topic: &str) -> bool {
        self.subject.eq_ignore_ascii_case(subject) && self.topic.eq_ignore_ascii_case(topic)
    }

    pub fn login(token: &str, user_id: &str, tab_id: &str) -> Self {
        Self::new(
            subject::SOCKET_CONNECT,
            topic::LOGIN,
            json!({ "token": token, "userid": user_id, "tabid": tab_id }),
        )
    }

    pub fn place(coord: TileCoord, kind: PlaceableKind) -> Self {
        match kind {
            PlaceableKind::Building(id) => Self::new(
                subject::GAME,
                topic::PLACE_BUILDING,
                json!({ "x": coord.x, "y": coord.y, "buildingType": id }),
            ),
            PlaceableKind::Tower(id) => Self::new(
                subject::GAME,
                topic::PLACE_TOWER,
                json!({ "x": coord.x, "y": coord.y, "towerType": id }),
            ),
        }
    }

    pub fn get_stats() -> Self {
        Self::new(subject::GAME, topic::GET_STATS, json!({}))
    }

    pub fn send_creep(creep_type_id: &str) -> Self {
        Self::new(
            subject::GAME,
            topic::SEND_CREEP,
            json!({ "creepTypeId": creep_type_id }),
        )
    }
}

/// Server ids arrive as strings or numbers depending on the entity.
fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Int(i64),
    }
    Ok(match Repr::deserialize(deserializer)? {
        Repr::Text(s) => s,
        Repr::Int(n) => n.to_string(),
    })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TilePayload {
    x: i32,
    y: i32,
    terrain_type: u32,
    structure_type: Option<u32>,
    building_type: Option<u32>,
    owner_player_number: Option<u32>,
    #[serde(default)]
    owners: Vec<u32>,
}

impl TilePayload {
    fn into_tile(self) -> Result<Tile, String> {
        let terrain = TerrainType::from_id(self.terrain_type)
            .ok_or_else(|| format!("unknown terrain {}", self.terrain_type))?;
        let structure = match self.structure_type {
            None => Structure::None,
            Some(STRUCTURE_ROAD) => Structure::Road,
            Some(STRUCTURE_BUILDING) => Structure::Building {
                building_type: self.building_type.unwrap_or(0),
                owner: self.owner_player_number,
            },
            Some(other) => {
                log::debug!("tile ({}, {}) has unknown structure {}", self.x, self.y, other);
                Structure::None
            }
        };
        let mut tile = Tile::new(TileCoord::new(self.x, self.y), terrain);
        tile.structure = structure;
        tile.owners = self.owners.into_iter().collect();
        Ok(tile)
    }
}

/// The server has sent both a flat list and rows of tiles.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TileGrid {
    Flat(Vec<TilePayload>),
    Rows(Vec<Vec<TilePayload>>),
}

impl TileGrid {
    fn into_flat(self) -> Vec<TilePayload> {
        match self {
            TileGrid::Flat(v) => v,
            TileGrid::Rows(rows) => rows.into_iter().flatten().collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FullMapPayload {
    width: i32,
    height: i32,
    tiles: TileGrid,
    #[serde(default)]
    player_color_map: HashMap<u32, u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TileChangedPayload {
    x: i32,
    y: i32,
    new_terrain_type: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildingChangedPayload {
    x: i32,
    y: i32,
    building_type: u32,
    player_number: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TowerPlacedPayload {
    #[serde(deserialize_with = "de_id")]
    tower_id: String,
    tower_type: u32,
    x: i32,
    y: i32,
    player_number: u32,
    range: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreepSpawn {
    #[serde(deserialize_with = "de_id")]
    pub creep_id: String,
    pub creep_type: String,
    pub x: f64,
    pub y: f64,
    pub player_number: u32,
    pub spawned_by_player: Option<u32>,
    pub hitpoints: i32,
    #[serde(default)]
    pub max_hitpoints: i32,
    #[serde(default)]
    pub speed: f64,
}

#[derive(Debug, Deserialize)]
struct BatchedSpawnPayload {
    spawns: Vec<CreepSpawn>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreepUpdate {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub hitpoints: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCreepPayload {
    #[serde(deserialize_with = "de_id")]
    creep_id: String,
    x: f64,
    y: f64,
    hitpoints: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct BatchedUpdateEntry {
    #[serde(deserialize_with = "de_id")]
    id: String,
    x: f64,
    y: f64,
    hp: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct BatchedUpdatePayload {
    updates: Vec<BatchedUpdateEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DespawnPayload {
    #[serde(deserialize_with = "de_id")]
    creep_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerDamagePayload {
    player_number: u32,
    damage: i32,
    remaining_hitpoints: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerHpPayload {
    player_number: u32,
    hitpoints: i32,
}

#[derive(Debug, Deserialize)]
struct CountdownPayload {
    seconds: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerInfoPayload {
    player_number: u32,
    color_index: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameOverPayload {
    player_number: u32,
    is_winner: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorMessagePayload {
    message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerStats {
    pub player_number: u32,
    pub gold_earned: u64,
    pub gold_spent: u64,
    pub creeps_killed: u64,
    pub creeps_sent: u64,
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub buildings_placed: u64,
    pub towers_placed: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameStats {
    pub game_duration_ms: u64,
    pub players: Vec<PlayerStats>,
}

/// One decoded server delta.
#[derive(Debug, Clone, PartialEq)]
pub enum GameDelta {
    FullMap {
        width: i32,
        height: i32,
        tiles: Vec<Tile>,
        player_colors: HashMap<u32, u32>,
    },
    TileUpdate(Tile),
    TerrainChanged {
        coord: TileCoord,
        terrain: TerrainType,
    },
    Resources(PlayerResources),
    BuildingChanged {
        coord: TileCoord,
        building_type: u32,
        player_number: u32,
    },
    TowerPlaced(PlacedTower),
    CreepsSpawned(Vec<CreepSpawn>),
    CreepsUpdated(Vec<CreepUpdate>),
    CreepDespawned(String),
    PlayerDamaged {
        player_number: u32,
        damage: i32,
        remaining_hitpoints: i32,
    },
    PlayerHp {
        player_number: u32,
        hitpoints: i32,
    },
    Countdown {
        seconds: u32,
    },
    PlayerInfo(LocalPlayer),
    GameOver(GameOutcome),
    ErrorMessage(String),
    Stats(GameStats),
}

fn payload<T: DeserializeOwned>(cmd: &SocketCommand) -> ClientResult<T> {
    serde_json::from_value(cmd.data.clone()).map_err(|e| ClientError::Protocol {
        topic: cmd.topic.clone(),
        reason: e.to_string(),
    })
}

fn protocol_error(cmd: &SocketCommand, reason: String) -> ClientError {
    ClientError::Protocol {
        topic: cmd.topic.clone(),
        reason,
    }
}

impl GameDelta {
    /// Decodes a `GAME` frame. Frames for other subjects, and unknown
    /// topics, yield `Ok(None)`.
    pub fn from_command(cmd: &SocketCommand) -> ClientResult<Option<GameDelta>> {
        if !cmd.subject.eq_ignore_ascii_case(subject::GAME) {
            return Ok(None);
        }
        let upper = cmd.topic.to_ascii_uppercase();
        let delta = match upper.as_str() {
            topic::FULL_MAP => {
                let p: FullMapPayload = payload(cmd)?;
                let mut tiles = Vec::new();
                for raw in p.tiles.into_flat() {
                    match raw.into_tile() {
                        Ok(tile) => tiles.push(tile),
                        Err(reason) => log::warn!("skipping map tile: {}", reason),
                    }
                }
                GameDelta::FullMap {
                    width: p.width,
                    height: p.height,
                    tiles,
                    player_colors: p.player_color_map,
                }
            }
            topic::TILE_UPDATE => {
                let p: TilePayload = payload(cmd)?;
                GameDelta::TileUpdate(p.into_tile().map_err(|r| protocol_error(cmd, r))?)
            }
            topic::TILE_CHANGED => {
                let p: TileChangedPayload = payload(cmd)?;
                let terrain = TerrainType::from_id(p.new_terrain_type).ok_or_else(|| {
                    protocol_error(cmd, format!("unknown terrain {}", p.new_terrain_type))
                })?;
                GameDelta::TerrainChanged {
                    coord: TileCoord::new(p.x, p.y),
                    terrain,
                }
            }
            topic::RESOURCE_UPDATE => GameDelta::Resources(payload(cmd)?),
            topic::BUILDING_CHANGED => {
                let p: BuildingChangedPayload = payload(cmd)?;
                GameDelta::BuildingChanged {
                    coord: TileCoord::new(p.x, p.y),
                    building_type: p.building_type,
                    player_number: p.player_number,
                }
            }
            topic::TOWER_PLACED => {
                let p: TowerPlacedPayload = payload(cmd)?;
                GameDelta::TowerPlaced(PlacedTower {
                    id: p.tower_id,
                    tower_type: p.tower_type,
                    coord: TileCoord::new(p.x, p.y),
                    owner: p.player_number,
                    range: p.range,
                })
            }
            topic::SPAWN_CREEP => GameDelta::CreepsSpawned(vec![payload(cmd)?]),
            topic::BATCHED_SPAWN_CREEP => {
                let p: BatchedSpawnPayload = payload(cmd)?;
                GameDelta::CreepsSpawned(p.spawns)
            }
            topic::UPDATE_CREEP => {
                let p: UpdateCreepPayload = payload(cmd)?;
                GameDelta::CreepsUpdated(vec![CreepUpdate {
                    id: p.creep_id,
                    x: p.x,
                    y: p.y,
                    hitpoints: p.hitpoints,
                }])
            }
            topic::BATCHED_CREEP_UPDATE => {
                let p: BatchedUpdatePayload = payload(cmd)?;
                GameDelta::CreepsUpdated(
                    p.updates
                        .into_iter()
                        .map(|u| CreepUpdate {
                            id: u.id,
                            x: u.x,
                            y: u.y,
                            hitpoints: u.hp,
                        })
                        .collect(),
                )
            }
            topic::DESPAWN_CREEP => {
                let p: DespawnPayload = payload(cmd)?;
                GameDelta::CreepDespawned(p.creep_id)
            }
            topic::PLAYER_TAKES_DAMAGE => {
                let p: PlayerDamagePayload = payload(cmd)?;
                GameDelta::PlayerDamaged {
                    player_number: p.player_number,
                    damage: p.damage,
                    remaining_hitpoints: p.remaining_hitpoints,
                }
            }
            topic::PLAYER_HP_UPDATE => {
                let p: PlayerHpPayload = payload(cmd)?;
                GameDelta::PlayerHp {
                    player_number: p.player_number,
                    hitpoints: p.hitpoints,
                }
            }
            topic::COUNTDOWN => {
                let p: CountdownPayload = payload(cmd)?;
                GameDelta::Countdown { seconds: p.seconds }
            }
            topic::PLAYER_INFO => {
                let p: PlayerInfoPayload = payload(cmd)?;
                GameDelta::PlayerInfo(LocalPlayer {
                    player_number: p.player_number,
                    color_index: p.color_index,
                })
            }
            topic::GAME_OVER => {
                let p: GameOverPayload = payload(cmd)?;
                GameDelta::GameOver(GameOutcome {
                    player_number: p.player_number,
                    is_winner: p.is_winner,
                })
            }
            topic::ERROR_MESSAGE => {
                let p: ErrorMessagePayload = payload(cmd)?;
                GameDelta::ErrorMessage(p.message)
            }
            topic::STATS => GameDelta::Stats(payload(cmd)?),
            _ => {
                log::debug!("unhandled GAME topic {}", cmd.topic);
                return Ok(None);
            }
        };
        Ok(Some(delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(topic: &str, data: Value) -> SocketCommand {
        SocketCommand::new(subject::GAME, topic, data)
    }

    #[test]
    fn envelope_parses_with_missing_data() {
        let cmd = SocketCommand::parse(r#"{"subject":"CORE","topic":"TOKEN_INVALID"}"#).unwrap();
        assert!(cmd.is("core", "token_invalid"));
        assert_eq!(cmd.data, Value::Null);
    }

    #[test]
    fn full_map_accepts_rows_and_skips_unknown_terrain() {
        let cmd = game(
            "FULL_MAP",
            json!({
                "width": 2, "height": 1,
                "tiles": [[
                    {"x": 0, "y": 0, "terrainType": 1, "owners": [1]},
                    {"x": 1, "y": 0, "terrainType": 42}
                ]],
                "playerColorMap": {"1": 3}
            }),
        );
        match GameDelta::from_command(&cmd).unwrap() {
            Some(GameDelta::FullMap { width, tiles, player_colors, .. }) => {
                assert_eq!(width, 2);
                assert_eq!(tiles.len(), 1);
                assert!(tiles[0].is_owned_by(1));
                assert_eq!(player_colors.get(&1), Some(&3));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn tile_update_maps_structure_variants() {
        let cmd = game(
            "tile_update",
            json!({"x": 3, "y": 4, "terrainType": 3, "structureType": 1,
                   "buildingType": 1, "ownerPlayerNumber": 2, "owners": [2]}),
        );
        let Some(GameDelta::TileUpdate(tile)) = GameDelta::from_command(&cmd).unwrap() else {
            panic!("expected tile update");
        };
        assert_eq!(tile.coord, TileCoord::new(3, 4));
        assert_eq!(
            tile.structure,
            Structure::Building { building_type: 1, owner: Some(2) }
        );

        let road = game("TILE_UPDATE", json!({"x": 0, "y": 0, "terrainType": 2, "structureType": 0, "buildingType": 3}));
        let Some(GameDelta::TileUpdate(tile)) = GameDelta::from_command(&road).unwrap() else {
            panic!("expected tile update");
        };
        assert_eq!(tile.structure, Structure::Road);
    }

    #[test]
    fn batched_updates_accept_numeric_ids() {
        let cmd = game(
            "BATCHED_CREEP_UPDATE",
            json!({"updates": [{"id": 7, "x": 1.5, "y": 2.5, "hp": 10}, {"id": "a", "x": 0.5, "y": 0.5}]}),
        );
        let Some(GameDelta::CreepsUpdated(ups)) = GameDelta::from_command(&cmd).unwrap() else {
            panic!("expected updates");
        };
        assert_eq!(ups[0].id, "7");
        assert_eq!(ups[0].hitpoints, Some(10));
        assert_eq!(ups[1].hitpoints, None);
    }

    #[test]
    fn malformed_payload_is_a_protocol_error() {
        let cmd = game("RESOURCE_UPDATE", json!({"wood": "lots"}));
        match GameDelta::from_command(&cmd) {
            Err(ClientError::Protocol { topic, .. }) => assert_eq!(topic, "RESOURCE_UPDATE"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn other_subjects_and_unknown_topics_are_ignored() {
        let chat = SocketCommand::new("DISPLAY_CHAT", "GLOBAL", json!({}));
        assert_eq!(GameDelta::from_command(&chat).unwrap(), None);
        assert_eq!(GameDelta::from_command(&game("NOPE", json!({}))).unwrap(), None);
    }

    #[test]
    fn outbound_builders_use_server_field_names() {
        let cmd = SocketCommand::place(TileCoord::new(2, 5), PlaceableKind::Tower(4));
        assert_eq!(cmd.topic, topic::PLACE_TOWER);
        assert_eq!(cmd.data, json!({"x": 2, "y": 5, "towerType": 4}));
        let login = SocketCommand::login("tok", "u1", "tab");
        assert_eq!(login.data["tabid"], "tab");
        assert_eq!(SocketCommand::send_creep("TROLL").data["creepTypeId"], "TROLL");
    }
}
