use log::{debug, info};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use strum::{Display, EnumIter, FromRepr, VariantArray};

use crate::{
    assert_interval,
    error::{MazeError, Result},
};

use super::grid::{Cell, GridMap, Pos};

/// Side length of every catalog map
pub const MAP_SIZE: usize = 15;

/// Start cell used by every catalog map
pub const START: Pos = (1, 1);

/// Identifier of a map in the [`MapCatalog`]
#[derive(EnumIter, VariantArray, FromRepr, Display, Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[repr(usize)]
pub enum MapId {
    #[default]
    Zero = 0,
    Random1 = 1,
    Random2 = 2,
    Random3 = 3,
    Custom1 = 4,
    Custom2 = 5,
    Custom3 = 6,
    Custom4 = 7,
    /// A freshly generated random maze every time it is loaded
    Generated = 8,
}

impl MapId {
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for MapId {
    type Error = MazeError;

    fn try_from(value: usize) -> Result<Self> {
        MapId::from_repr(value).ok_or(MazeError::UnknownMap(value))
    }
}

/// Supplies grids to the episode controller
pub trait MapSource {
    /// Produce the grid for `id`
    ///
    /// Sources backed by fixed layouts must return the same layout every time.
    fn load(&mut self, id: MapId) -> Result<GridMap>;
}

/// Configuration for generated maps
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Probability that an interior cell becomes a wall
    ///
    /// **Default**: `0.3`
    pub wall_density: f64,
    /// Seed for reproducible generation, or `None` to seed from entropy
    ///
    /// **Default**: `None`
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            wall_density: 0.3,
            seed: None,
        }
    }
}

/// The built-in map library: eight hand-drawn mazes and a random generator
pub struct MapCatalog {
    wall_density: f64,
    rng: StdRng,
}

impl MapCatalog {
    /// **Panics** if `wall_density` is not in the interval `[0,1]`
    pub fn new(config: GeneratorConfig) -> Self {
        assert_interval!(config.wall_density, 0.0, 1.0);
        Self {
            wall_density: config.wall_density,
            rng: config
                .seed
                .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64),
        }
    }

    /// Generate a walled `columns` x `rows` maze with a reachable goal
    ///
    /// The start cell and its right and lower neighbors are always open, so the
    /// agent can never be enclosed at the start. The goal lands on a random
    /// reachable cell at least half as far from the start as the farthest one.
    pub fn generate(&mut self, columns: usize, rows: usize) -> GridMap {
        assert!(
            columns >= 4 && rows >= 4,
            "Generated maps must be at least 4x4"
        );

        let mut map = GridMap::new(columns, rows);
        for pos in map.positions().collect::<Vec<_>>() {
            let wall = !map.is_interior(pos) || self.rng.gen_bool(self.wall_density);
            if wall {
                map[pos] = Cell::Wall;
            }
        }
        for pos in [START, (START.0 + 1, START.1), (START.0, START.1 + 1)] {
            map[pos] = Cell::Empty;
        }

        let dist = map.reachable_from(START);
        let farthest = dist.iter().flatten().copied().max().unwrap_or(0);
        let candidates = map
            .positions()
            .zip(dist)
            .filter_map(|(pos, d)| d.filter(|&d| d > 0 && 2 * d >= farthest).map(|_| pos))
            .collect::<Vec<_>>();

        // START always has at least two open neighbors, so `candidates` is never empty
        if let Some(&goal) = candidates.choose(&mut self.rng) {
            map[goal] = Cell::Goal;
            debug!("Generated {columns}x{rows} map with goal at {goal:?}, {farthest} moves deep");
        }

        map
    }
}

impl Default for MapCatalog {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl MapSource for MapCatalog {
    fn load(&mut self, id: MapId) -> Result<GridMap> {
        info!("Loading map {id}");
        match id {
            MapId::Generated => Ok(self.generate(MAP_SIZE, MAP_SIZE)),
            _ => GridMap::from_ascii(layout(id)),
        }
    }
}

/// A source that hands out the same grid for every id
#[derive(Debug, Clone)]
pub struct SingleMap(pub GridMap);

impl MapSource for SingleMap {
    fn load(&mut self, _id: MapId) -> Result<GridMap> {
        Ok(self.0.clone())
    }
}

fn layout(id: MapId) -> &'static str {
    match id {
        MapId::Zero => ZERO,
        MapId::Random1 => RANDOM_1,
        MapId::Random2 => RANDOM_2,
        MapId::Random3 => RANDOM_3,
        MapId::Custom1 => CUSTOM_1,
        MapId::Custom2 => CUSTOM_2,
        MapId::Custom3 => CUSTOM_3,
        MapId::Custom4 => CUSTOM_4,
        MapId::Generated => unreachable!("generated maps have no fixed layout"),
    }
}

const ZERO: &str = "
    ###############
    #.............#
    #.............#
    #.............#
    #.............#
    #.............#
    #.............#
    #.............#
    #.............#
    #.............#
    #.............#
    #.............#
    #.............#
    #............G#
    ###############
";

const RANDOM_1: &str = "
    ###############
    #....#........#
    #.##.#.####.#.#
    #.#..#....#.#.#
    #.#.###.#.#.#.#
    #.#.....#...#.#
    #.#####.#####.#
    #.....#.....#.#
    ###.#.#####.#.#
    #...#.....#...#
    #.#######.###.#
    #.......#...#.#
    #.#####.###.#.#
    #.....#.....#G#
    ###############
";

const RANDOM_2: &str = "
    ###############
    #..#....#.....#
    #..#.##.#.###.#
    #....#..#...#.#
    ####.#.####.#.#
    #....#......#.#
    #.####.######.#
    #......#......#
    #.####.#.######
    #.#....#......#
    #.#.########..#
    #.#........#..#
    #.########.#..#
    #..........#.G#
    ###############
";

const RANDOM_3: &str = "
    ###############
    #.....#.......#
    #.###.#.#####.#
    #...#...#...#.#
    ###.#####.#.#.#
    #...#.....#...#
    #.###.#######.#
    #.#...#.....#.#
    #.#.###.###.#.#
    #.#.#...#.#...#
    #.#.#.###.###.#
    #...#.#.....#.#
    #####.#.###.#.#
    #.......#G....#
    ###############
";

const CUSTOM_1: &str = "
    ###############
    #.............#
    #############.#
    #.............#
    #.#############
    #.............#
    #############.#
    #.............#
    #.#############
    #.............#
    #############.#
    #.............#
    #.#############
    #............G#
    ###############
";

const CUSTOM_2: &str = "
    ###############
    #......#......#
    #......#......#
    #......#......#
    #......#......#
    #......#......#
    #.............#
    #......#......#
    #......#......#
    #......#......#
    #......#......#
    #......#......#
    #......#......#
    #......#.....G#
    ###############
";

const CUSTOM_3: &str = "
    ###############
    #.............#
    #.###########.#
    #.#.........#.#
    #.#.#######.#.#
    #.#.#.....#.#.#
    #.#.#.###.#.#.#
    #.#.#.#G#.#.#.#
    #.#.#.#.#.#.#.#
    #.#.#...#.#.#.#
    #.#.#####.#.#.#
    #.#.......#.#.#
    #.#########.#.#
    #...........#.#
    ###############
";

const CUSTOM_4: &str = "
    ###############
    #.....#.......#
    #.###.#.#####.#
    #.#.....#...#.#
    #.#.#####.#.#.#
    #.#.......#...#
    #.#########.###
    #...........#G#
    ###.#######.#.#
    #...#.....#.#.#
    #.###.###.#.#.#
    #.#...#...#...#
    #.#.###.#####.#
    #...#.........#
    ###############
";
