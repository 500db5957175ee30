use strum::{EnumIter, FromRepr, VariantArray};

use crate::maze::Pos;

/// Number of discrete moves available to the agent
pub const NUM_ACTIONS: usize = 4;

/// A single move on the grid
///
/// The discriminants double as column indices into the reward and Q tables.
#[derive(EnumIter, VariantArray, FromRepr, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(usize)]
pub enum Action {
    Up = 0,
    Left = 1,
    Right = 2,
    Down = 3,
}

impl Action {
    /// Table column for this action
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The position one cell away in this direction
    ///
    /// **Panics** when stepping off the low edge of the grid, which only happens
    /// if the agent was placed on the outer ring.
    pub fn apply(self, (x, y): Pos) -> Pos {
        match self {
            Action::Up => (x, y - 1),
            Action::Left => (x - 1, y),
            Action::Right => (x + 1, y),
            Action::Down => (x, y + 1),
        }
    }

    /// Arrow glyph used when rendering per-action values
    pub const fn arrow(self) -> char {
        match self {
            Action::Up => '↑',
            Action::Left => '←',
            Action::Right => '→',
            Action::Down => '↓',
        }
    }
}
