use ratatui::{prelude::*, widgets::*};

fn key_line(key: &'static str, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::from(format!("{key:^7}")).light_cyan().bold(),
        Span::raw(" : "),
        Span::raw(action),
    ])
}

/// Draw the key reference as a popup centered in `area`
pub fn render_help(area: Rect, buf: &mut Buffer, selected_tab: usize) {
    let mut lines = vec![
        key_line("q", "Quit"),
        key_line("h", "Toggle help popup"),
        key_line("Tab", "Switch tabs"),
    ];

    match selected_tab {
        0 => lines.extend([
            key_line("t", "Start / stop training on the selected map"),
            key_line("r", "Start / stop running the agent without learning"),
            key_line("b", "Cycle training rounds (10 / 100 / 1000)"),
            key_line("0-8", "Select map (8 generates random maps)"),
            key_line("n", "Generate a new random map"),
            key_line("x", "Reset all learning"),
        ]),
        1 => lines.extend([
            key_line("s", "Toggle target selector"),
            key_line("f", "Focus on the selected target"),
            key_line("⬆ / ⬇", "Switch log target"),
            key_line("⬅ / ➡", "Shown log level down / up"),
            key_line("- / +", "Captured log level down / up"),
            key_line("PgUp", "Page mode, scroll up"),
            key_line("PgDn", "Page mode, scroll down"),
            key_line("Esc", "Leave page mode"),
        ]),
        _ => {}
    }

    let [_, center_vert, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length((lines.len() + 4) as u16),
        Constraint::Fill(1),
    ])
    .areas(area);

    let [_, center, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(70),
        Constraint::Fill(1),
    ])
    .areas(center_vert);

    Clear.render(center, buf);

    Paragraph::new(lines)
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .padding(Padding::horizontal(1))
                .title("Help"),
        )
        .render(center, buf);
}
