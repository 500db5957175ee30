use std::{io, time::Duration};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use log::{info, warn};
use ratatui::{prelude::*, widgets::*};

use super::{
    components::{render_help, Logs, MazeView},
    Tui,
};
use crate::{
    controller::EpisodeController,
    error::MazeError,
    maze::{MapId, MapSource},
};

const TABS: [&str; 2] = ["Maze", "Logs"];

/// Time to wait for input each frame, about 60 frames per second
const FRAME: Duration = Duration::from_millis(16);

/// Selectable numbers of training batches per training run
const TRAINING_ROUNDS: [u32; 3] = [10, 100, 1000];

#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
enum Mode {
    #[default]
    Idle,
    Training {
        done: u32,
        total: u32,
    },
    Running,
    Quit,
}

/// The root TUI component which owns the controller and runs the frame loop
pub struct App<S: MapSource> {
    controller: EpisodeController<S>,
    mode: Mode,
    status: String,
    rounds_ix: usize,
    selected_tab: usize,
    show_help: bool,
    logs: Logs,
}

impl<S: MapSource> App<S> {
    pub fn new(controller: EpisodeController<S>) -> Self {
        Self {
            controller,
            mode: Mode::default(),
            status: String::from("Agent not trained"),
            rounds_ix: 0,
            selected_tab: 0,
            show_help: false,
            logs: Logs::new(),
        }
    }

    /// Advance, draw and handle input until the user quits
    pub(super) fn run(&mut self, terminal: &mut Tui) -> io::Result<()> {
        while self.mode != Mode::Quit {
            self.tick();
            terminal.draw(|frame| frame.render_widget(&*self, frame.size()))?;

            if event::poll(FRAME)? {
                let event = event::read()?;
                self.handle_event(&event);
            }
        }

        Ok(())
    }

    fn tick(&mut self) {
        match self.mode {
            Mode::Training { done, total } if done < total => {
                match self.controller.train_agent(self.controller.map_id()) {
                    Ok(_) => {
                        self.mode = Mode::Training {
                            done: done + 1,
                            total,
                        };
                        self.status = format!("Training: {} of {total}", done + 1);
                    }
                    Err(err) => self.halt(err),
                }
            }
            Mode::Training { total, .. } => {
                info!("Finished {total} training rounds");
                self.mode = Mode::Idle;
                self.status = String::from("Agent trained");
            }
            Mode::Running => match self.controller.step(false) {
                Ok(true) => {
                    self.mode = Mode::Idle;
                    self.status = format!(
                        "Reached the goal in {} steps",
                        self.controller.saved_moves()
                    );
                }
                Ok(false) => {}
                Err(err) => self.halt(err),
            },
            Mode::Idle | Mode::Quit => {}
        }
    }

    fn handle_event(&mut self, event: &Event) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }
        if self.selected_tab == 1 && self.logs.handle_key(key.code) {
            return;
        }

        let idle = self.mode == Mode::Idle;
        match key.code {
            KeyCode::Char('q') => self.mode = Mode::Quit,
            KeyCode::Char('h') => self.show_help = !self.show_help,
            KeyCode::Tab => self.selected_tab = (self.selected_tab + 1) % TABS.len(),
            KeyCode::Char('t') => self.toggle_training(),
            KeyCode::Char('r') => self.toggle_running(),
            KeyCode::Char('x') if idle => {
                if let Err(err) = self.controller.reset() {
                    self.halt(err);
                } else {
                    self.status = String::from("Agent not trained");
                }
            }
            KeyCode::Char('b') if idle => {
                self.rounds_ix = (self.rounds_ix + 1) % TRAINING_ROUNDS.len();
            }
            KeyCode::Char('n') if idle && self.controller.map_id() == MapId::Generated => {
                self.select_map(MapId::Generated);
            }
            KeyCode::Char(c) if idle => {
                if let Some(id) = c.to_digit(10).and_then(|d| MapId::try_from(d as usize).ok()) {
                    self.select_map(id);
                }
            }
            _ => {}
        }
    }

    fn toggle_training(&mut self) {
        match self.mode {
            Mode::Idle => {
                let total = TRAINING_ROUNDS[self.rounds_ix];
                info!("Training {total} rounds on map {}", self.controller.map_id());
                self.mode = Mode::Training { done: 0, total };
            }
            Mode::Training { .. } => {
                self.mode = Mode::Idle;
                self.status = String::from("Training stopped");
            }
            Mode::Running | Mode::Quit => {}
        }
    }

    fn toggle_running(&mut self) {
        match self.mode {
            Mode::Idle => {
                self.mode = Mode::Running;
                self.status = String::from("Running");
            }
            Mode::Running => {
                self.mode = Mode::Idle;
                self.status = String::from("Stopped");
            }
            Mode::Training { .. } | Mode::Quit => {}
        }
    }

    fn select_map(&mut self, id: MapId) {
        if let Err(err) = self.controller.set_map(id) {
            self.halt(err);
        }
    }

    fn halt(&mut self, err: MazeError) {
        warn!("{err}");
        self.status = err.to_string();
        self.mode = Mode::Idle;
    }
}

impl<S: MapSource> Widget for &App<S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [menu_area, main_area, status_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(3),
        ])
        .areas(area);

        Tabs::new(TABS)
            .block(Block::default().padding(Padding::uniform(1)))
            .white()
            .bold()
            .highlight_style(Style::default().light_green())
            .select(self.selected_tab)
            .render(menu_area, buf);

        match self.selected_tab {
            0 => MazeView {
                controller: &self.controller,
                rounds: TRAINING_ROUNDS[self.rounds_ix],
            }
            .render(main_area, buf),
            1 => self.logs.render_ref(main_area, buf),
            _ => {}
        }

        let status_block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title("Status");
        match self.mode {
            Mode::Training { done, total } => Gauge::default()
                .block(status_block)
                .gauge_style(Color::Cyan)
                .label(self.status.as_str())
                .ratio(f64::from(done) / f64::from(total.max(1)))
                .render(status_area, buf),
            _ => Paragraph::new(self.status.as_str())
                .block(status_block)
                .render(status_area, buf),
        }

        if self.show_help {
            render_help(area, buf, self.selected_tab);
        }
    }
}
