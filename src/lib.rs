/// Q-learning over the neighborhood state space
pub mod algo;

/// Episode orchestration
pub mod controller;

/// Data structures
pub mod ds;

/// Neighborhood state encoding
pub mod encoding;

/// Actions
pub mod env;

/// Error types
pub mod error;

/// Action selection policy
pub mod exploration;

/// Grid maps and map sources
pub mod maze;

/// Reward table
pub mod reward;

/// Interactive terminal driver
#[cfg(feature = "viz")]
pub mod viz;

mod util;

pub use controller::{ControllerConfig, EpisodeController};
pub use error::{MazeError, Result};
