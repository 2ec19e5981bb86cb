//! Terminal front-end: a [`View`](crate::View) backed by `dialoguer` prompts,
//! the interactive menu, and the REPL bridge.

mod bridge;
mod keyboard;
mod menu;
mod view;
mod wait;

pub use menu::run as run_menu;
pub use view::TerminalView;
pub use wait::{wait_for_board, Awaited};

use crate::editor::Coordinator;

/// Opens the REPL, bridges it to the terminal until `Esc`, then closes it.
pub fn repl(coordinator: &mut Coordinator, view: &mut TerminalView) {
    menu::repl(coordinator, view)
}
