use std::ops::{Index, IndexMut};

use crate::{
    encoding::StateId,
    env::{Action, NUM_ACTIONS},
};

/// A dense `states x actions` table, sized once at construction
///
/// The shape never changes; only values do.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<T> {
    data: Vec<T>,
    states: usize,
}

impl<T: Copy> Table<T> {
    /// Allocate a table with every entry set to `value`
    pub fn new(states: usize, value: T) -> Self {
        Self {
            data: vec![value; states * NUM_ACTIONS],
            states,
        }
    }

    /// Overwrite every entry with `value`
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// All action values of one state, in action order
    pub fn row(&self, state: StateId) -> [T; NUM_ACTIONS] {
        let start = state * NUM_ACTIONS;
        std::array::from_fn(|i| self.data[start + i])
    }

    /// Number of rows
    pub fn states(&self) -> usize {
        self.states
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}

impl<T> Index<(StateId, Action)> for Table<T> {
    type Output = T;

    fn index(&self, (state, action): (StateId, Action)) -> &Self::Output {
        &self.data[state * NUM_ACTIONS + action.index()]
    }
}

impl<T> IndexMut<(StateId, Action)> for Table<T> {
    fn index_mut(&mut self, (state, action): (StateId, Action)) -> &mut Self::Output {
        &mut self.data[state * NUM_ACTIONS + action.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_functional() {
        let mut table = Table::new(3, 0.0);
        assert_eq!(table.states(), 3);
        assert_eq!(table.iter().count(), 3 * NUM_ACTIONS, "Shape is states x actions");

        table[(1, Action::Right)] = 5.0;
        table[(2, Action::Up)] = 1.0;
        assert_eq!(table.row(1), [0.0, 0.0, 5.0, 0.0], "Row in action order");
        assert_eq!(table[(2, Action::Up)], 1.0);
        assert_eq!(table[(1, Action::Left)], 0.0, "Neighbors untouched");

        table.fill(-1.0);
        assert!(table.iter().all(|&v| v == -1.0), "Fill overwrites everything");
        assert_eq!(table.states(), 3, "Fill keeps the shape");
    }
}
