use std::{error::Error, fs, path::Path};

use qmaze::{
    maze::{MapCatalog, MapId},
    ControllerConfig, EpisodeController,
};
use strum::IntoEnumIterator;

const NUM_BATCHES: u32 = 20;

fn main() -> Result<(), Box<dyn Error>> {
    let path = Path::new("demos/out");
    fs::create_dir_all(path)?;

    let mut controller = EpisodeController::new(
        MapCatalog::default(),
        ControllerConfig {
            seed: Some(0),
            ..Default::default()
        },
    )?;

    let mut wtr = csv::Writer::from_path(path.join("moves.csv"))?;
    wtr.write_record(["map", "batch", "episode", "moves"])?;

    for id in MapId::iter().filter(|&id| id != MapId::Generated) {
        for batch in 0..NUM_BATCHES {
            let moves = controller.train_agent(id)?;
            for (episode, m) in moves.iter().enumerate() {
                wtr.write_record([
                    id.to_string(),
                    batch.to_string(),
                    episode.to_string(),
                    m.to_string(),
                ])?;
            }
        }

        let last = controller.saved_moves();
        println!("{id:>8}: last episode took {last} moves");
    }

    wtr.flush()?;
    Ok(())
}
