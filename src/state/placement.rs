// Placement legality and the select/place interaction mode

use crate::error::PlacementError;
use crate::model::{Placeable, PlaceableKind, PlayerResources, Tile, placeable};

/// Checks, in order: ownership, terrain, vacancy, cost. The first failing
/// check is reported.
pub fn can_place(
    tile: &Tile,
    def: &Placeable,
    local_player: u32,
    resources: &PlayerResources,
) -> Result<(), PlacementError> {
    if !tile.is_owned_by(local_player) {
        return Err(PlacementError::NotOwned);
    }
    if !def.allows(tile.terrain) {
        return Err(PlacementError::TerrainNotAllowed);
    }
    if !tile.structure.is_none() {
        return Err(PlacementError::Occupied);
    }
    if !resources.covers(&def.cost) {
        return Err(PlacementError::InsufficientResources);
    }
    Ok(())
}

/// Same check against optional store lookups.
pub fn check_placement(
    tile: Option<&Tile>,
    def: &Placeable,
    local_player: Option<u32>,
    resources: &PlayerResources,
) -> Result<(), PlacementError> {
    let player = local_player.ok_or(PlacementError::NoPlayerIdentity)?;
    let tile = tile.ok_or(PlacementError::UnknownTile)?;
    can_place(tile, def, player, resources)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InteractionMode {
    #[default]
    Select,
    Place(PlaceableKind),
}

impl InteractionMode {
    pub fn placing(&self) -> Option<&'static Placeable> {
        match self {
            InteractionMode::Select => None,
            InteractionMode::Place(kind) => placeable(*kind),
        }
    }

    #[cfg(test)]
    pub fn is_placing(&self) -> bool {
        matches!(self, InteractionMode::Place(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BUILDINGS, Structure, TOWERS, TerrainType, TileCoord};

    fn owned(terrain: TerrainType) -> Tile {
        let mut t = Tile::new(TileCoord::new(3, 4), terrain);
        t.owners.insert(1);
        t
    }

    fn rich() -> PlayerResources {
        PlayerResources::new(1000, 1000, 1000)
    }

    #[test]
    fn legal_when_every_check_passes() {
        assert_eq!(can_place(&owned(TerrainType::Forest), &BUILDINGS[0], 1, &rich()), Ok(()));
    }

    #[test]
    fn ownership_is_checked_first() {
        let mut t = owned(TerrainType::WaterDeep);
        t.structure = Structure::Road;
        assert_eq!(
            can_place(&t, &BUILDINGS[0], 2, &PlayerResources::default()),
            Err(PlacementError::NotOwned)
        );
    }

    #[test]
    fn terrain_before_vacancy() {
        let mut t = owned(TerrainType::Grass);
        t.structure = Structure::Road;
        assert_eq!(can_place(&t, &BUILDINGS[0], 1, &rich()), Err(PlacementError::TerrainNotAllowed));
    }

    #[test]
    fn occupied_tile_fails_even_when_affordable() {
        let mut t = owned(TerrainType::Grass);
        t.structure = Structure::Tower { tower_type: 1, owner: Some(1) };
        assert_eq!(can_place(&t, &TOWERS[0], 1, &rich()), Err(PlacementError::Occupied));
    }

    #[test]
    fn unaffordable_fails_when_everything_else_passes() {
        let wallet = PlayerResources::new(40, 40, 40);
        assert_eq!(
            can_place(&owned(TerrainType::Forest), &BUILDINGS[0], 1, &wallet),
            Err(PlacementError::InsufficientResources)
        );
        assert_eq!(
            PlacementError::InsufficientResources.to_string(),
            "Not enough resources"
        );
    }

    #[test]
    fn missing_identity_or_tile_is_reported() {
        let t = owned(TerrainType::Forest);
        assert_eq!(
            check_placement(Some(&t), &BUILDINGS[0], None, &rich()),
            Err(PlacementError::NoPlayerIdentity)
        );
        assert_eq!(
            check_placement(None, &BUILDINGS[0], Some(1), &rich()),
            Err(PlacementError::UnknownTile)
        );
    }

    #[test]
    fn mode_resolves_definition() {
        assert!(InteractionMode::Select.placing().is_none());
        let mode = InteractionMode::Place(PlaceableKind::Building(3));
        assert_eq!(mode.placing().map(|p| p.name), Some("Gold Mine"));
    }
}
