use strum::IntoEnumIterator;

use crate::{
    ds::Table,
    encoding::{StateId, NUM_STATES},
    env::{Action, NUM_ACTIONS},
    maze::{Cell, GridMap, Pos},
};

/// Default reward for stepping onto a goal
pub const REWARD_VALUE: f64 = 10_000_000.0;

/// A sparse reward table discovered from the agent's surroundings
///
/// An entry is set to the reward value the first time the agent sees a goal next
/// to it in that direction, and is only ever cleared by [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct RewardModel {
    table: Table<f64>,
    reward_value: f64,
}

impl RewardModel {
    pub fn new(reward_value: f64) -> Self {
        Self {
            table: Table::new(NUM_STATES, 0.0),
            reward_value,
        }
    }

    /// Record a reward for every direction from `pos` that leads onto a goal
    pub fn refresh(&mut self, state: StateId, map: &GridMap, pos: Pos) {
        for action in Action::iter() {
            if map[action.apply(pos)] == Cell::Goal {
                self.table[(state, action)] = self.reward_value;
            }
        }
    }

    pub fn reward(&self, state: StateId, action: Action) -> f64 {
        self.table[(state, action)]
    }

    pub fn rewards(&self, state: StateId) -> [f64; NUM_ACTIONS] {
        self.table.row(state)
    }

    pub fn table(&self) -> &Table<f64> {
        &self.table
    }

    /// Zero every entry
    pub fn reset(&mut self) {
        self.table.fill(0.0);
    }
}

impl Default for RewardModel {
    fn default() -> Self {
        Self::new(REWARD_VALUE)
    }
}
