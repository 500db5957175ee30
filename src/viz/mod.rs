//! Terminal front end that paces the agent and draws the maze
//!
//! Everything runs on the calling thread: each frame advances training by one
//! batch or execution by one move, then redraws.

use std::{
    io::{self, stdout, Stdout},
    panic,
};

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::{controller::EpisodeController, maze::MapSource};

mod app;
mod components;

pub use app::App;

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Install the log capture and run the viewer until the user quits
///
/// Restores the terminal on exit, including on panic.
pub fn run<S: MapSource>(controller: EpisodeController<S>) -> io::Result<()> {
    tui_logger::init_logger(log::LevelFilter::Debug).map_err(io::Error::other)?;
    tui_logger::set_default_level(log::LevelFilter::Debug);

    let mut terminal = enter()?;
    let result = App::new(controller).run(&mut terminal);
    leave()?;
    result
}

fn enter() -> io::Result<Tui> {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = leave();
        original_hook(panic_info);
    }));

    execute!(stdout(), EnterAlternateScreen, Hide)?;
    enable_raw_mode()?;
    Terminal::new(CrosstermBackend::new(stdout()))
}

fn leave() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen, Show)
}
