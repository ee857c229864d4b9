// Ownership contours: an edge is drawn for an owner only where the
// neighbour across it does not list that owner

use crate::model::{Direction, Tile};
use crate::state::WorldStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContourEdge {
    pub owner: u32,
    pub side: Direction,
}

pub fn contour_edges(world: &WorldStore, tile: &Tile) -> Vec<ContourEdge> {
    let mut edges = Vec::new();
    for &owner in &tile.owners {
        for side in Direction::ALL {
            let shared = world
                .tile(tile.coord.neighbor(side))
                .is_some_and(|n| n.is_owned_by(owner));
            if !shared {
                edges.push(ContourEdge { owner, side });
            }
        }
    }
    edges
}

/// Screen segment for one side of a tile at `(sx, sy)` with size `ts`,
/// pulled inward by `inset` so adjacent owners' lines don't overlap.
pub fn edge_segment(side: Direction, sx: f64, sy: f64, ts: f64, inset: f64) -> (f64, f64, f64, f64) {
    match side {
        Direction::North => (sx, sy + inset, sx + ts, sy + inset),
        Direction::East => (sx + ts - inset, sy, sx + ts - inset, sy + ts),
        Direction::South => (sx, sy + ts - inset, sx + ts, sy + ts - inset),
        Direction::West => (sx + inset, sy, sx + inset, sy + ts),
    }
}
