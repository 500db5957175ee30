mod catalog;
mod grid;

pub use catalog::{GeneratorConfig, MapCatalog, MapId, MapSource, SingleMap, MAP_SIZE, START};
pub use grid::{Cell, GridMap, Pos};
