mod help;
mod logs;
mod maze_view;

pub use help::render_help;
pub use logs::Logs;
pub use maze_view::MazeView;
