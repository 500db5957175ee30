use log::{debug, info, warn};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    algo::{QLearner, QLearnerConfig},
    encoding::{self, StateId},
    env::{Action, NUM_ACTIONS},
    error::{MazeError, Result},
    maze::{Cell, GridMap, MapCatalog, MapId, MapSource, Pos, START},
    reward::{RewardModel, REWARD_VALUE},
};

/// Configuration for the [`EpisodeController`]
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub learner: QLearnerConfig,
    /// Reward recorded for a move onto a goal
    ///
    /// **Default**: `10_000_000.0`
    pub reward_value: f64,
    /// Cell the agent starts every episode from
    ///
    /// **Default**: `(1, 1)`
    pub start: Pos,
    /// Number of episodes run by [`EpisodeController::train_agent`]
    ///
    /// **Default**: `7`
    pub episodes_per_batch: u32,
    /// Moves after which an unfinished episode counts as stalled, or `None` for no limit
    ///
    /// **Default**: `Some(1_000_000)`
    pub move_ceiling: Option<u32>,
    /// Reinitialize both tables whenever a map is selected
    ///
    /// **Default**: `false`
    pub reset_tables_on_map_change: bool,
    /// Seed for action sampling, or `None` to seed from entropy
    ///
    /// **Default**: `None`
    pub seed: Option<u64>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            learner: QLearnerConfig::default(),
            reward_value: REWARD_VALUE,
            start: START,
            episodes_per_batch: 7,
            move_ceiling: Some(1_000_000),
            reset_tables_on_map_change: false,
            seed: None,
        }
    }
}

/// Drives the agent through the maze one move or one episode at a time
///
/// Owns the agent position and move counters; the learner and reward model own
/// their tables. Every call runs to completion before the next one starts.
pub struct EpisodeController<S: MapSource = MapCatalog> {
    source: S,
    map_id: MapId,
    map: GridMap,
    learner: QLearner,
    rewards: RewardModel,
    agent: Pos,
    previous: Pos,
    moves: u32,       // moves in the current episode
    saved_moves: u32, // move count as of the latest step, kept across the goal reset
    episodes: u32,    // completed episodes
    start: Pos,
    episodes_per_batch: u32,
    move_ceiling: Option<u32>,
    reset_tables_on_map_change: bool,
    rng: StdRng,
}

impl<S: MapSource> EpisodeController<S> {
    /// Create a controller on [`MapId::Zero`] with fresh tables
    pub fn new(source: S, config: ControllerConfig) -> Result<Self> {
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        let mut controller = Self {
            source,
            map_id: MapId::default(),
            map: GridMap::new(0, 0),
            learner: QLearner::new(config.learner),
            rewards: RewardModel::new(config.reward_value),
            agent: config.start,
            previous: config.start,
            moves: 0,
            saved_moves: 0,
            episodes: 0,
            start: config.start,
            episodes_per_batch: config.episodes_per_batch,
            move_ceiling: config.move_ceiling,
            reset_tables_on_map_change: config.reset_tables_on_map_change,
            rng,
        };
        controller.set_map(MapId::default())?;

        Ok(controller)
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    pub fn map_id(&self) -> MapId {
        self.map_id
    }

    pub fn agent(&self) -> Pos {
        self.agent
    }

    /// Moves taken in the current episode
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Move count as of the latest step, including the step that reached a goal
    pub fn saved_moves(&self) -> u32 {
        self.saved_moves
    }

    /// Episodes completed since construction
    pub fn episodes(&self) -> u32 {
        self.episodes
    }

    pub fn episodes_per_batch(&self) -> u32 {
        self.episodes_per_batch
    }

    pub fn learner(&self) -> &QLearner {
        &self.learner
    }

    pub fn rewards(&self) -> &RewardModel {
        &self.rewards
    }

    /// State id of the agent's current neighborhood
    pub fn state(&self) -> StateId {
        encoding::encode(&self.map, self.agent)
    }

    /// Q-values of the agent's current state, in action order
    pub fn q_values_at_agent(&self) -> [f64; NUM_ACTIONS] {
        self.learner.q_values(self.state())
    }

    /// Load a map and put the agent back on the start cell
    ///
    /// Tables are kept unless the controller was configured to reset them, so
    /// learning carries over between maps.
    pub fn set_map(&mut self, id: MapId) -> Result<()> {
        let mut map = self.source.load(id)?;
        map.clear_agents();
        map.validate(self.start)?;
        map[self.start] = Cell::Agent;

        self.map = map;
        self.map_id = id;
        self.agent = self.start;
        self.previous = self.start;
        self.moves = 0;
        if self.reset_tables_on_map_change {
            self.reset_tables();
        }

        info!(
            "Selected map {id} ({}x{})",
            self.map.columns(),
            self.map.rows()
        );
        Ok(())
    }

    /// Zero both tables and reload the current map
    pub fn reset(&mut self) -> Result<()> {
        self.reset_tables();
        info!("Reset agent tables");
        self.set_map(self.map_id)
    }

    /// Take one move
    ///
    /// With `learn` set, the Q-table is updated from the transition. Reaching a
    /// goal sends the agent back to the start and zeroes the move counter.
    ///
    /// **Returns** whether the move reached a goal, or [`MazeError::Enclosed`]
    /// if no move is possible.
    pub fn step(&mut self, learn: bool) -> Result<bool> {
        let state = self.state();
        self.rewards.refresh(state, &self.map, self.agent);
        let action = self
            .learner
            .choose_action(state, &self.rewards, &self.map, self.agent, &mut self.rng)
            .ok_or_else(|| {
                let (x, y) = self.agent;
                warn!("Agent enclosed at ({x}, {y}) after {} moves", self.moves);
                MazeError::Enclosed { x, y }
            })?;

        self.previous = self.agent;
        self.moves += 1;
        self.saved_moves = self.moves;

        self.map[self.agent] = Cell::Empty;
        self.agent = action.apply(self.agent);
        if learn {
            self.update(state, action);
        }

        if self.map[self.agent] == Cell::Goal {
            self.finish_episode();
            return Ok(true);
        }

        self.map[self.agent] = Cell::Agent;
        Ok(false)
    }

    /// Learn until the agent reaches a goal
    ///
    /// **Returns** the number of moves the episode took, or
    /// [`MazeError::MoveCeiling`] once the configured ceiling is exceeded.
    pub fn run_episode(&mut self) -> Result<u32> {
        loop {
            if self.step(true)? {
                return Ok(self.saved_moves);
            }
            if let Some(limit) = self.move_ceiling.filter(|&limit| self.moves >= limit) {
                warn!("Episode on map {} stalled after {limit} moves", self.map_id);
                return Err(MazeError::MoveCeiling { limit });
            }
        }
    }

    /// Learn for at most `max_steps` moves
    ///
    /// Lets a caller spread a long episode over several calls.
    ///
    /// **Returns** `Some(moves)` if an episode finished within the budget
    pub fn advance(&mut self, max_steps: u32) -> Result<Option<u32>> {
        for _ in 0..max_steps {
            if self.step(true)? {
                return Ok(Some(self.saved_moves));
            }
        }
        Ok(None)
    }

    /// Select `id` and run a batch of full episodes on it
    ///
    /// **Returns** the move count of each episode
    pub fn train_agent(&mut self, id: MapId) -> Result<Vec<u32>> {
        self.set_map(id)?;
        let moves = (0..self.episodes_per_batch)
            .map(|_| self.run_episode())
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Trained {} episodes on map {id}, last took {} moves",
            moves.len(),
            moves.last().copied().unwrap_or_default()
        );
        Ok(moves)
    }

    fn update(&mut self, state: StateId, action: Action) {
        let next_state = self.state();
        self.learner.learn(state, action, next_state, &self.rewards);
    }

    fn finish_episode(&mut self) {
        self.map[self.previous] = Cell::Empty;
        self.agent = self.start;
        self.map[self.agent] = Cell::Agent;
        self.episodes += 1;
        debug!(
            "Episode {} reached the goal in {} moves",
            self.episodes, self.moves
        );
        self.moves = 0;
    }

    fn reset_tables(&mut self) {
        self.learner.reset();
        self.rewards.reset();
    }
}

#[cfg(test)]
mod tests {
    use statrs::statistics::{Data, Median};

    use crate::maze::SingleMap;

    use super::*;

    fn seeded(seed: u64) -> ControllerConfig {
        ControllerConfig {
            seed: Some(seed),
            ..Default::default()
        }
    }

    fn single(art: &str, config: ControllerConfig) -> EpisodeController<SingleMap> {
        let map = GridMap::from_ascii(art).unwrap();
        EpisodeController::new(SingleMap(map), config).unwrap()
    }

    #[test]
    fn goal_next_to_start() {
        let mut controller = single(
            "
            #####
            #.G.#
            #####
            ",
            seeded(0),
        );

        assert_eq!(controller.step(true), Ok(true), "Only move is onto the goal");
        assert_eq!(controller.agent(), (1, 1), "Agent back on the start");
        assert_eq!(controller.moves(), 0, "Move counter zeroed");
        assert_eq!(controller.saved_moves(), 1, "Finished episode took one move");
        assert_eq!(controller.episodes(), 1);
        assert_eq!(controller.map().cell_at(1, 1), Cell::Agent);
        assert_eq!(controller.map().cell_at(2, 1), Cell::Goal, "Goal stays put");

        let state = controller.state();
        assert_eq!(
            controller.rewards().reward(state, Action::Right),
            REWARD_VALUE,
            "Reward recorded for the goal direction"
        );
        assert_eq!(
            controller.learner().q_value(state, Action::Right),
            0.8 * REWARD_VALUE,
            "Q-table updated from the rewarded move"
        );
    }

    #[test]
    fn step_moves_the_agent_marker() {
        let mut controller = single(
            "
            ######
            #....#
            ####G#
            ######
            ",
            seeded(1),
        );

        assert_eq!(controller.step(false), Ok(false));
        assert_eq!(controller.agent(), (2, 1), "Only open direction is right");
        assert_eq!(controller.moves(), 1);
        assert_eq!(controller.map().cell_at(1, 1), Cell::Empty, "Old cell cleared");
        assert_eq!(controller.map().cell_at(2, 1), Cell::Agent, "New cell marked");
        assert_eq!(
            controller.map().positions().filter(|&p| controller.map()[p] == Cell::Agent).count(),
            1,
            "Exactly one agent"
        );
        assert!(
            controller.learner().q_table().iter().all(|&q| q == 0.0),
            "Execution without learning leaves the Q-table alone"
        );
    }

    #[test]
    fn enclosed_start_is_reported() {
        let mut controller = single(
            "
            #####
            #.#G#
            #####
            ",
            seeded(2),
        );
        assert_eq!(controller.step(true), Err(MazeError::Enclosed { x: 1, y: 1 }));
        assert_eq!(controller.moves(), 0, "No move was made");
    }

    #[test]
    fn unreachable_goal_hits_ceiling() {
        let mut controller = single(
            "
            ######
            #..#G#
            ######
            ",
            ControllerConfig {
                move_ceiling: Some(500),
                ..seeded(3)
            },
        );
        assert_eq!(
            controller.run_episode(),
            Err(MazeError::MoveCeiling { limit: 500 })
        );
    }

    #[test]
    fn advance_is_step_bounded() {
        let mut controller = single(
            "
            ##########
            #........#
            ########G#
            ##########
            ",
            seeded(4),
        );

        // The goal is at least eight moves away
        assert_eq!(controller.advance(3), Ok(None), "Budget too small");
        assert_eq!(controller.moves(), 3);

        let mut finished = None;
        while finished.is_none() {
            finished = controller.advance(50).unwrap();
        }
        assert!(finished.unwrap() >= 8, "Episode needs at least eight moves");
        assert_eq!(controller.agent(), (1, 1));
    }

    #[test]
    fn train_agent_runs_a_batch() {
        let mut controller = EpisodeController::new(MapCatalog::default(), seeded(5)).unwrap();
        let moves = controller.train_agent(MapId::Zero).unwrap();
        assert_eq!(moves.len(), 7, "Default batch is seven episodes");
        assert!(moves.iter().all(|&m| m >= 24), "Never shorter than the shortest path");
        assert_eq!(controller.episodes(), 7);
        assert_eq!(controller.agent(), START);
    }

    #[test]
    fn reset_zeroes_tables() {
        let mut controller = EpisodeController::new(MapCatalog::default(), seeded(6)).unwrap();
        controller.train_agent(MapId::Zero).unwrap();
        assert!(controller.learner().q_table().iter().any(|&q| q != 0.0));
        assert!(controller.rewards().table().iter().any(|&r| r != 0.0));

        for _ in 0..5 {
            controller.step(true).unwrap();
        }
        controller.reset().unwrap();
        assert!(controller.learner().q_table().iter().all(|&q| q == 0.0), "Q zeroed");
        assert!(controller.rewards().table().iter().all(|&r| r == 0.0), "R zeroed");
        assert_eq!(controller.agent(), (1, 1));
        assert_eq!(controller.moves(), 0);
        assert_eq!(controller.map_id(), MapId::Zero, "Map kept");
    }

    #[test]
    fn reselecting_a_map_is_idempotent() {
        let mut controller = EpisodeController::new(MapCatalog::default(), seeded(7)).unwrap();
        controller.set_map(MapId::Custom4).unwrap();
        let first = controller.map().clone();
        assert_eq!(controller.agent(), (1, 1));

        for _ in 0..10 {
            controller.step(true).unwrap();
        }
        controller.set_map(MapId::Custom4).unwrap();
        assert_eq!(controller.map(), &first, "Same layout and agent placement");
        assert_eq!(controller.agent(), (1, 1));
        assert_eq!(controller.moves(), 0);
    }

    #[test]
    fn map_change_keeps_tables_unless_configured() {
        let mut controller = EpisodeController::new(MapCatalog::default(), seeded(8)).unwrap();
        controller.run_episode().unwrap();
        controller.set_map(MapId::Custom2).unwrap();
        assert!(controller.rewards().table().iter().any(|&r| r != 0.0), "Tables carried over");

        let mut controller = EpisodeController::new(
            MapCatalog::default(),
            ControllerConfig {
                reset_tables_on_map_change: true,
                ..seeded(8)
            },
        )
        .unwrap();
        controller.run_episode().unwrap();
        controller.set_map(MapId::Custom2).unwrap();
        assert!(controller.rewards().table().iter().all(|&r| r == 0.0), "Tables cleared");
    }

    #[test]
    fn invalid_start_is_rejected() {
        let map = GridMap::from_ascii("#####\n#G..#\n#####").unwrap();
        let result = EpisodeController::new(SingleMap(map), ControllerConfig::default());
        assert!(matches!(result, Err(MazeError::InvalidMap(_))));
    }

    #[test]
    fn episodes_get_shorter() {
        for seed in 0..3 {
            let mut controller = EpisodeController::new(MapCatalog::default(), seeded(seed)).unwrap();
            let moves = (0..60)
                .map(|_| controller.run_episode().map(f64::from))
                .collect::<Result<Vec<_>>>()
                .unwrap();

            let first = Data::new(moves[..10].to_vec()).median();
            let last = Data::new(moves[50..].to_vec()).median();
            assert!(
                last <= first,
                "Seed {seed}: median of last episodes ({last}) exceeds the first ({first})"
            );
        }
    }
}
