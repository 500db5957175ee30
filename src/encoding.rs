//! Local-neighborhood state encoding
//!
//! A state is the 8 cells surrounding the agent read as base-3 digits, so the
//! encoding only sees walls, goals and open floor. Different positions with the
//! same surroundings share a state id: an agent in the middle of an open room
//! cannot tell one open cell from another. Learning relies on that aliasing to
//! generalize between maps, so it is preserved as is.

use crate::maze::{Cell, GridMap, Pos};

/// Row index into the reward and Q tables
pub type StateId = usize;

/// Number of neighbor cells that make up a state
pub const NUM_NEIGHBORS: usize = 8;

/// `3^8`, the size of the state space
pub const NUM_STATES: usize = 6561;

/// Neighbor offsets `(dx, dy)` in scan order, most significant digit first
pub const NEIGHBOR_OFFSETS: [(isize, isize); NUM_NEIGHBORS] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Encode the neighborhood of `pos`
///
/// **Panics** if `pos` is on the outer ring of the map, or if a neighbor holds
/// the agent. Both mean the caller broke the episode invariants.
pub fn encode(map: &GridMap, pos: Pos) -> StateId {
    assert!(
        map.is_interior(pos),
        "Cannot encode state at {pos:?}: position is on or outside the outer ring"
    );

    encode_neighbors(neighbors(map, pos))
}

/// Read the 8 neighbors of an interior position in scan order
pub fn neighbors(map: &GridMap, (x, y): Pos) -> [Cell; NUM_NEIGHBORS] {
    NEIGHBOR_OFFSETS.map(|(dx, dy)| map[(x.wrapping_add_signed(dx), y.wrapping_add_signed(dy))])
}

/// Fold 8 neighbor cells into a state id
///
/// The first neighbor carries place value `3^7`, the last `3^0`.
pub fn encode_neighbors(cells: [Cell; NUM_NEIGHBORS]) -> StateId {
    cells.iter().fold(0, |id, &cell| {
        assert!(
            cell != Cell::Agent,
            "Agent cell found in a neighborhood; only one agent may exist"
        );
        id * 3 + cell.code()
    })
}
