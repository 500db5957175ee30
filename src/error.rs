use thiserror::Error;

/// Errors surfaced by map loading and the episode loop
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MazeError {
    /// A map id outside the catalog
    #[error("Unknown map id: {0}")]
    UnknownMap(usize),

    /// A grid that cannot host an episode
    #[error("Invalid map: {0}")]
    InvalidMap(String),

    /// Every neighbor of the agent is a wall, so no action can be chosen
    #[error("Agent is enclosed by walls at ({x}, {y})")]
    Enclosed { x: usize, y: usize },

    /// An episode ran past the configured move ceiling without reaching a goal
    #[error("Episode exceeded the move ceiling of {limit} moves")]
    MoveCeiling { limit: u32 },
}

pub type Result<T> = std::result::Result<T, MazeError>;
