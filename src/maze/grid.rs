use std::{
    collections::VecDeque,
    fmt,
    ops::{Index, IndexMut},
};

use strum::{EnumIter, FromRepr, IntoEnumIterator};

use crate::{
    env::Action,
    error::{MazeError, Result},
};

/// Position coordinates `(x, y)`, with `x` indexing columns and `y` indexing rows
pub type Pos = (usize, usize);

/// The contents of a single grid cell
///
/// The discriminant is the cell code fed into the state encoding.
#[derive(EnumIter, FromRepr, Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[repr(u8)]
pub enum Cell {
    #[default]
    Empty = 0,
    Wall = 1,
    Goal = 2,
    Agent = 3,
}

impl Cell {
    pub const fn code(self) -> usize {
        self as usize
    }

    pub const fn glyph(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Wall => '#',
            Cell::Goal => 'G',
            Cell::Agent => 'A',
        }
    }

    pub fn from_glyph(glyph: char) -> Option<Self> {
        Cell::iter().find(|cell| cell.glyph() == glyph)
    }
}

/// A fixed-size grid of cells
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GridMap {
    columns: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl GridMap {
    /// Create an empty grid
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            cells: vec![Cell::Empty; columns * rows],
        }
    }

    /// Parse a grid drawn with one glyph per cell and one line per row
    ///
    /// Glyphs are `.` (empty), `#` (wall), `G` (goal) and `A` (agent). Leading and
    /// trailing blank lines and surrounding whitespace on each line are ignored.
    pub fn from_ascii(art: &str) -> Result<Self> {
        let lines = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();

        let rows = lines.len();
        let columns = lines.first().map_or(0, |line| line.chars().count());
        if rows == 0 || columns == 0 {
            return Err(MazeError::InvalidMap(String::from("map is empty")));
        }

        let mut cells = Vec::with_capacity(columns * rows);
        for (y, line) in lines.iter().enumerate() {
            if line.chars().count() != columns {
                return Err(MazeError::InvalidMap(format!(
                    "row {y} has {} cells, expected {columns}",
                    line.chars().count()
                )));
            }
            for (x, glyph) in line.chars().enumerate() {
                let cell = Cell::from_glyph(glyph).ok_or_else(|| {
                    MazeError::InvalidMap(format!("unknown glyph {glyph:?} at ({x}, {y})"))
                })?;
                cells.push(cell);
            }
        }

        Ok(Self {
            columns,
            rows,
            cells,
        })
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_at(&self, x: usize, y: usize) -> Cell {
        self[(x, y)]
    }

    pub fn set_cell(&mut self, x: usize, y: usize, cell: Cell) {
        self[(x, y)] = cell;
    }

    /// Whether `pos` lies strictly inside the outer ring
    pub fn is_interior(&self, (x, y): Pos) -> bool {
        x >= 1 && y >= 1 && x + 1 < self.columns && y + 1 < self.rows
    }

    /// Whether moving from `pos` in the direction of `action` avoids a wall
    pub fn permits(&self, pos: Pos, action: Action) -> bool {
        self[action.apply(pos)] != Cell::Wall
    }

    /// Positions of every goal cell in row-major order
    pub fn goals(&self) -> Vec<Pos> {
        self.positions()
            .filter(|&pos| self[pos] == Cell::Goal)
            .collect()
    }

    /// Reset every agent cell to empty
    pub fn clear_agents(&mut self) {
        for cell in self.cells.iter_mut().filter(|c| **c == Cell::Agent) {
            *cell = Cell::Empty;
        }
    }

    /// Iterate over all positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Pos> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |y| (0..columns).map(move |x| (x, y)))
    }

    /// Iterate over rows of cells, top to bottom
    pub fn row_slices(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.columns)
    }

    /// Breadth-first move distances from `start` to every reachable non-wall cell
    ///
    /// The returned vector is indexed by `y * columns + x`; unreachable cells are `None`.
    pub fn reachable_from(&self, start: Pos) -> Vec<Option<usize>> {
        let mut dist = vec![None; self.cells.len()];
        if self[start] == Cell::Wall {
            return dist;
        }

        dist[self.offset(start)] = Some(0);
        let mut queue = VecDeque::from([start]);
        while let Some(pos) = queue.pop_front() {
            let d = dist[self.offset(pos)].unwrap_or_default();
            for action in Action::iter() {
                if !self.is_interior(pos) && !self.has_neighbor(pos, action) {
                    continue;
                }
                let next = action.apply(pos);
                let ix = self.offset(next);
                if self[next] != Cell::Wall && dist[ix].is_none() {
                    dist[ix] = Some(d + 1);
                    queue.push_back(next);
                }
            }
        }

        dist
    }

    /// Check that an episode can safely start at `start`
    ///
    /// The outer ring must be walled so the agent never reaches a position whose
    /// neighborhood leaves the grid.
    pub fn validate(&self, start: Pos) -> Result<()> {
        if self.columns < 3 || self.rows < 3 {
            return Err(MazeError::InvalidMap(format!(
                "grid is {}x{}, need at least 3x3",
                self.columns, self.rows
            )));
        }

        if let Some((x, y)) = self
            .positions()
            .filter(|&pos| !self.is_interior(pos))
            .find(|&pos| self[pos] != Cell::Wall)
        {
            return Err(MazeError::InvalidMap(format!(
                "outer ring is open at ({x}, {y})"
            )));
        }

        if !self.is_interior(start) {
            return Err(MazeError::InvalidMap(format!(
                "start {start:?} is not inside the outer ring"
            )));
        }

        match self[start] {
            Cell::Wall | Cell::Goal => Err(MazeError::InvalidMap(format!(
                "start {start:?} holds {:?}",
                self[start]
            ))),
            _ if self.goals().is_empty() => {
                Err(MazeError::InvalidMap(String::from("map has no goal")))
            }
            _ => Ok(()),
        }
    }

    fn offset(&self, (x, y): Pos) -> usize {
        assert!(
            x < self.columns && y < self.rows,
            "Position ({x}, {y}) is outside the {}x{} grid",
            self.columns,
            self.rows
        );
        y * self.columns + x
    }

    fn has_neighbor(&self, (x, y): Pos, action: Action) -> bool {
        match action {
            Action::Up => y > 0,
            Action::Left => x > 0,
            Action::Right => x + 1 < self.columns,
            Action::Down => y + 1 < self.rows,
        }
    }
}

impl Index<Pos> for GridMap {
    type Output = Cell;

    fn index(&self, pos: Pos) -> &Self::Output {
        &self.cells[self.offset(pos)]
    }
}

impl IndexMut<Pos> for GridMap {
    fn index_mut(&mut self, pos: Pos) -> &mut Self::Output {
        let ix = self.offset(pos);
        &mut self.cells[ix]
    }
}

impl fmt::Display for GridMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.row_slices() {
            let line = row.iter().map(|cell| cell.glyph()).collect::<String>();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "
        #####
        #A..#
        #.#G#
        #####
    ";

    #[test]
    fn parse_and_lookup() {
        let map = GridMap::from_ascii(SMALL).unwrap();
        assert_eq!((map.columns(), map.rows()), (5, 4), "Dimensions parsed");
        assert_eq!(map.cell_at(1, 1), Cell::Agent);
        assert_eq!(map.cell_at(2, 2), Cell::Wall);
        assert_eq!(map.cell_at(3, 2), Cell::Goal);
        assert_eq!(map.goals(), vec![(3, 2)], "Goal located");
    }

    #[test]
    fn display_round_trips_ascii() {
        let map = GridMap::from_ascii(SMALL).unwrap();
        let again = GridMap::from_ascii(&map.to_string()).unwrap();
        assert_eq!(map, again);
    }

    #[test]
    fn rejects_bad_ascii() {
        assert!(matches!(
            GridMap::from_ascii("###\n#.\n###"),
            Err(MazeError::InvalidMap(_))
        ));
        assert!(matches!(
            GridMap::from_ascii("###\n#x#\n###"),
            Err(MazeError::InvalidMap(_))
        ));
        assert!(GridMap::from_ascii("").is_err());
    }

    #[test]
    fn set_cell_and_clear_agents() {
        let mut map = GridMap::from_ascii(SMALL).unwrap();
        map.set_cell(2, 1, Cell::Agent);
        map.clear_agents();
        assert_eq!(map.cell_at(1, 1), Cell::Empty, "Agent cleared");
        assert_eq!(map.cell_at(2, 1), Cell::Empty, "Stray agent cleared");
        assert_eq!(map.cell_at(3, 2), Cell::Goal, "Goal untouched");
    }

    #[test]
    fn permits_and_interior() {
        let map = GridMap::from_ascii(SMALL).unwrap();
        assert!(!map.permits((1, 1), Action::Up), "Wall above blocks");
        assert!(map.permits((1, 1), Action::Right), "Open cell allows");
        assert!(map.permits((2, 1), Action::Right));
        assert!(map.is_interior((1, 1)));
        assert!(!map.is_interior((0, 1)));
        assert!(!map.is_interior((4, 1)));
    }

    #[test]
    fn reachability() {
        let map = GridMap::from_ascii(SMALL).unwrap();
        let dist = map.reachable_from((1, 1));
        assert_eq!(dist[2 * 5 + 3], Some(3), "Goal is three moves away");
        assert_eq!(dist[2 * 5 + 2], None, "Walls are unreachable");
    }

    #[test]
    fn validation() {
        let map = GridMap::from_ascii(SMALL).unwrap();
        assert!(map.validate((1, 1)).is_ok());
        assert!(map.validate((2, 2)).is_err(), "Start on a wall");
        assert!(map.validate((3, 2)).is_err(), "Start on the goal");
        assert!(map.validate((0, 0)).is_err(), "Start on the ring");

        let open = GridMap::from_ascii("#####\n#A.G.\n#####").unwrap();
        assert!(open.validate((1, 1)).is_err(), "Open outer ring");

        let no_goal = GridMap::from_ascii("####\n#A.#\n####").unwrap();
        assert!(no_goal.validate((1, 1)).is_err(), "Missing goal");
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn out_of_range_lookup_panics() {
        let map = GridMap::new(3, 3);
        map.cell_at(3, 0);
    }
}
