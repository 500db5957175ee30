use std::error::Error;

use qmaze::{maze::MapCatalog, viz, ControllerConfig, EpisodeController};

fn main() -> Result<(), Box<dyn Error>> {
    let controller = EpisodeController::new(MapCatalog::default(), ControllerConfig::default())?;
    viz::run(controller)?;
    Ok(())
}
