use rand::Rng;

use crate::{
    assert_interval,
    ds::Table,
    encoding::{StateId, NUM_STATES},
    env::{Action, NUM_ACTIONS},
    exploration::{argmax, greedy_override, random_valid},
    maze::{GridMap, Pos},
    reward::RewardModel,
};

/// Configuration for the [`QLearner`]
#[derive(Debug, Clone)]
pub struct QLearnerConfig {
    /// Learning rate
    ///
    /// **Default**: `0.8`
    pub alpha: f64,
    /// Discount factor
    ///
    /// **Default**: `0.8`
    pub gamma: f64,
    /// Initial value of every Q-table entry
    ///
    /// **Default**: `0.0`
    pub q_zero: f64,
    /// Truncate each updated value toward zero
    ///
    /// Keeps the table integral. Disabling it accumulates fractions and converges
    /// along a different curve.
    ///
    /// **Default**: `true`
    pub truncate: bool,
}

impl Default for QLearnerConfig {
    fn default() -> Self {
        Self {
            alpha: 0.8,
            gamma: 0.8,
            q_zero: 0.0,
            truncate: true,
        }
    }
}

/// A Q-learning agent over the neighborhood-encoded state space
///
/// Movement uses a random valid action that is overridden by any valid action
/// whose reward plus Q-value is strictly higher. Updates bootstrap from the
/// greedy action of the next state.
#[derive(Debug, Clone)]
pub struct QLearner {
    q_table: Table<f64>,
    alpha: f64,  // learning rate
    gamma: f64,  // discount factor
    q_zero: f64, // baseline for fresh tables
    truncate: bool,
}

impl QLearner {
    /// Initialize a new `QLearner` with a fresh table
    ///
    /// **Panics** if `alpha` or `gamma` is not in the interval `[0,1]`
    pub fn new(config: QLearnerConfig) -> Self {
        assert_interval!(config.alpha, 0.0, 1.0);
        assert_interval!(config.gamma, 0.0, 1.0);
        Self {
            q_table: Table::new(NUM_STATES, config.q_zero),
            alpha: config.alpha,
            gamma: config.gamma,
            q_zero: config.q_zero,
            truncate: config.truncate,
        }
    }

    pub fn q_table(&self) -> &Table<f64> {
        &self.q_table
    }

    pub fn q_value(&self, state: StateId, action: Action) -> f64 {
        self.q_table[(state, action)]
    }

    pub fn q_values(&self, state: StateId) -> [f64; NUM_ACTIONS] {
        self.q_table.row(state)
    }

    /// Restore every entry to the configured baseline
    pub fn reset(&mut self) {
        self.q_table.fill(self.q_zero);
    }

    /// Choose the next move for an agent standing at `pos`
    ///
    /// **Returns** `None` if every neighbor in the four directions is a wall
    pub fn choose_action<R>(
        &self,
        state: StateId,
        rewards: &RewardModel,
        map: &GridMap,
        pos: Pos,
        rng: &mut R,
    ) -> Option<Action>
    where
        R: Rng + ?Sized,
    {
        let is_valid = |action| map.permits(pos, action);
        let default = random_valid(rng, is_valid)?;
        Some(greedy_override(&self.scores(state, rewards), default, is_valid))
    }

    /// The action with the highest reward plus Q-value, first index on ties
    pub fn greedy_action(&self, state: StateId, rewards: &RewardModel) -> Action {
        argmax(&self.scores(state, rewards))
    }

    /// Move `Q(state, action)` toward `R(state, action) + gamma * Q(next_state, next_action)`
    ///
    /// **Returns** the stored value
    pub fn update(
        &mut self,
        state: StateId,
        action: Action,
        next_state: StateId,
        next_action: Action,
        rewards: &RewardModel,
    ) -> f64 {
        let q_value = self.q_table[(state, action)];
        let target = rewards.reward(state, action) + self.gamma * self.q_table[(next_state, next_action)];
        let mut new_q_value = (1.0 - self.alpha) * q_value + self.alpha * target;
        if self.truncate {
            new_q_value = new_q_value.trunc();
        }

        self.q_table[(state, action)] = new_q_value;
        new_q_value
    }

    /// Update from a transition, bootstrapping from the greedy action of `next_state`
    pub fn learn(
        &mut self,
        state: StateId,
        action: Action,
        next_state: StateId,
        rewards: &RewardModel,
    ) -> f64 {
        let next_action = self.greedy_action(next_state, rewards);
        self.update(state, action, next_state, next_action, rewards)
    }

    fn scores(&self, state: StateId, rewards: &RewardModel) -> [f64; NUM_ACTIONS] {
        let q = self.q_table.row(state);
        let r = rewards.rewards(state);
        std::array::from_fn(|i| q[i] + r[i])
    }
}

impl Default for QLearner {
    fn default() -> Self {
        Self::new(QLearnerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use crate::{encoding::encode, maze::Cell, reward::REWARD_VALUE};

    use super::*;

    fn corridor() -> GridMap {
        GridMap::from_ascii(
            "
            #######
            #.....#
            ###.###
            #..G..#
            #######
            ",
        )
        .unwrap()
    }

    #[test]
    fn never_chooses_a_wall() {
        let map = corridor();
        let rewards = RewardModel::default();
        let learner = QLearner::default();
        let mut rng = StdRng::seed_from_u64(11);

        for pos in map.positions().filter(|&p| map.is_interior(p) && map[p] != Cell::Wall) {
            let state = encode(&map, pos);
            for _ in 0..50 {
                let action = learner
                    .choose_action(state, &rewards, &map, pos, &mut rng)
                    .expect("Every open cell has an exit");
                assert!(map.permits(pos, action), "{action:?} from {pos:?} hits a wall");
            }
        }
    }

    #[test]
    fn enclosed_agent_has_no_action() {
        let map = GridMap::from_ascii("#####\n#.#G#\n#####").unwrap();
        let learner = QLearner::default();
        let state = encode(&map, (1, 1));
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            learner.choose_action(state, &RewardModel::default(), &map, (1, 1), &mut rng),
            None
        );
    }

    #[test]
    fn reward_steers_choice() {
        let map = corridor();
        let mut rewards = RewardModel::default();
        let learner = QLearner::default();
        let mut rng = StdRng::seed_from_u64(5);

        // (3, 2) sits between the top corridor and the goal below it
        let state = encode(&map, (3, 2));
        rewards.refresh(state, &map, (3, 2));
        for _ in 0..20 {
            let action = learner.choose_action(state, &rewards, &map, (3, 2), &mut rng);
            assert_eq!(action, Some(Action::Down), "Rewarded direction always wins");
        }
    }

    #[test]
    fn update_rule_truncates() {
        let map = corridor();
        let mut rewards = RewardModel::default();
        let mut learner = QLearner::default();

        let state = encode(&map, (3, 2));
        rewards.refresh(state, &map, (3, 2));

        // 0.2 * 0 + 0.8 * (1e7 + 0.8 * 0)
        let value = learner.update(state, Action::Down, 0, Action::Up, &rewards);
        assert_eq!(value, 0.8 * REWARD_VALUE);

        // Bootstrapping from a state with a fractional target
        let other = encode(&map, (1, 1));
        learner.q_table[(other, Action::Up)] = 7.0;
        let value = learner.update(other, Action::Up, other, Action::Up, &rewards);
        // 0.2 * 7 + 0.8 * (0 + 0.8 * 7) = 5.88
        assert_eq!(value, 5.0, "Truncated toward zero, not rounded");
        assert_eq!(learner.q_value(other, Action::Up), 5.0);
    }

    #[test]
    fn update_without_truncation() {
        let mut learner = QLearner::new(QLearnerConfig {
            truncate: false,
            ..Default::default()
        });
        learner.q_table[(9, Action::Left)] = 7.0;
        let value = learner.update(9, Action::Left, 9, Action::Left, &RewardModel::default());
        assert!((value - 5.88).abs() < 1e-9, "Fraction kept: {value}");
    }

    #[test]
    fn learn_bootstraps_from_greedy_action() {
        let mut learner = QLearner::default();
        let rewards = RewardModel::default();
        learner.q_table[(3, Action::Right)] = 100.0;
        learner.q_table[(3, Action::Down)] = 50.0;
        assert_eq!(learner.greedy_action(3, &rewards), Action::Right);

        // 0.8 * (0 + 0.8 * 100)
        let value = learner.learn(1, Action::Up, 3, &rewards);
        assert_eq!(value, 64.0);
    }

    #[test]
    fn greedy_defaults_to_first_action() {
        let learner = QLearner::default();
        assert_eq!(learner.greedy_action(0, &RewardModel::default()), Action::Up);
    }

    #[test]
    fn reset_restores_baseline() {
        let mut learner = QLearner::new(QLearnerConfig {
            q_zero: 2.0,
            ..Default::default()
        });
        learner.q_table[(4, Action::Down)] = 99.0;
        learner.reset();
        assert!(learner.q_table().iter().all(|&q| q == 2.0));
    }

    #[test]
    #[should_panic(expected = "Invalid value for `config.alpha`")]
    fn rejects_bad_alpha() {
        QLearner::new(QLearnerConfig {
            alpha: 1.5,
            ..Default::default()
        });
    }
}
