pub mod app;
pub mod tab_bar;
pub mod terminal;
pub mod theme;

pub use app::{App, InputMode};
pub use terminal::{init as init_terminal, restore as restore_terminal, Tui};
