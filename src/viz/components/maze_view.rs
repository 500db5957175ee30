use ratatui::{prelude::*, widgets::*};
use strum::IntoEnumIterator;

use crate::{
    controller::EpisodeController,
    env::Action,
    maze::{Cell, MapSource, Pos},
    util::format_value,
};

/// Terminal columns used to draw one grid cell
const CELL_WIDTH: u16 = 2;

/// The grid, the agent's field of view, and the Q-values of its current state
pub struct MazeView<'a, S: MapSource> {
    pub controller: &'a EpisodeController<S>,
    pub rounds: u32,
}

impl<S: MapSource> MazeView<'_, S> {
    fn render_grid(&self, area: Rect, buf: &mut Buffer) {
        let map = self.controller.map();
        let agent = self.controller.agent();

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(format!("Map {}", self.controller.map_id()));
        let inner = block.inner(area);
        block.render(area, buf);

        for (y, row) in map.row_slices().enumerate() {
            for (x, &cell) in row.iter().enumerate() {
                let sx = inner.x + x as u16 * CELL_WIDTH;
                let sy = inner.y + y as u16;
                if sx + CELL_WIDTH > inner.right() || sy >= inner.bottom() {
                    continue;
                }

                let style = Style::default().bg(cell_color(cell));
                let symbol = if in_view(agent, (x, y)) { "··" } else { "  " };
                buf.set_string(sx, sy, symbol, style.fg(Color::Red));
            }
        }
    }

    fn render_panel(&self, area: Rect, buf: &mut Buffer) {
        let q_values = self.controller.q_values_at_agent();
        let mut lines = vec![Line::from("Q-values").bold(), Line::default()];
        lines.extend(Action::iter().map(|action| {
            Line::from(vec![
                Span::from(format!(" {} ", action.arrow())).light_cyan(),
                Span::raw(format_value(q_values[action.index()])),
            ])
        }));
        lines.extend([
            Line::default(),
            Line::from(format!("Steps: {}", self.controller.saved_moves())),
            Line::from(format!("Episodes: {}", self.controller.episodes())),
            Line::from(format!("State: {}", self.controller.state())),
            Line::from(format!("Training rounds: {}", self.rounds)),
        ]);

        Paragraph::new(lines)
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .padding(Padding::horizontal(1))
                    .title("Agent"),
            )
            .render(area, buf);
    }
}

impl<S: MapSource> Widget for MazeView<'_, S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let grid_width = self.controller.map().columns() as u16 * CELL_WIDTH + 2;
        let [grid_area, panel_area] =
            Layout::horizontal([Constraint::Length(grid_width), Constraint::Fill(1)]).areas(area);

        self.render_grid(grid_area, buf);
        self.render_panel(panel_area, buf);
    }
}

fn cell_color(cell: Cell) -> Color {
    match cell {
        Cell::Empty => Color::White,
        Cell::Wall => Color::DarkGray,
        Cell::Goal => Color::Green,
        Cell::Agent => Color::Blue,
    }
}

/// Whether `pos` is one of the 8 cells the agent encodes into its state
fn in_view(agent: Pos, pos: Pos) -> bool {
    pos != agent && agent.0.abs_diff(pos.0) <= 1 && agent.1.abs_diff(pos.1) <= 1
}
