//! The interactive main menu.

use dialoguer::Select;
use log::{error, warn};

use super::bridge;
use super::view::TerminalView;
use crate::editor::{Coordinator, Outcome};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Action {
    New,
    Load,
    Save,
    Edit,
    Flash,
    Repl,
    NextTab,
    Quit,
}
impl Action {
    const ALL: [Action; 8] = [
        Action::New,
        Action::Load,
        Action::Save,
        Action::Edit,
        Action::Flash,
        Action::Repl,
        Action::NextTab,
        Action::Quit,
    ];

    fn label(self) -> &'static str {
        match self {
            Action::New => "New script",
            Action::Load => "Load script or image",
            Action::Save => "Save",
            Action::Edit => "Edit in $EDITOR",
            Action::Flash => "Flash onto the micro:bit",
            Action::Repl => "REPL",
            Action::NextTab => "Next tab",
            Action::Quit => "Quit",
        }
    }
}

/// Runs the menu until the user quits. Returns the process exit code.
pub fn run(coordinator: &mut Coordinator, view: &mut TerminalView) -> i32 {
    let labels: Vec<&str> = Action::ALL.iter().map(|a| a.label()).collect();
    loop {
        view.print_tabs();
        let selection = Select::with_theme(view.theme())
            .items(&labels)
            .default(0)
            .interact_on_opt(view.term());
        let action = match selection {
            Ok(Some(index)) => Action::ALL[index],
            // Esc just shows the menu again
            Ok(None) => continue,
            Err(e) => {
                error!("menu: {}", e);
                return 1;
            }
        };

        match action {
            Action::New => {
                coordinator.new_document(view);
            }
            Action::Load => {
                coordinator.load(view);
            }
            Action::Save => {
                coordinator.save(view);
            }
            Action::Edit => {
                if let Err(e) = view.edit_current() {
                    warn!("could not run the editor: {}", e);
                }
            }
            Action::Flash => {
                coordinator.flash(view);
            }
            Action::Repl => repl(coordinator, view),
            Action::NextTab => view.next_tab(),
            Action::Quit => {
                if let Outcome::Quit = coordinator.quit(view) {
                    return 0;
                }
            }
        }
    }
}

/// Opens the REPL, hands the terminal over to it and closes it once the user
/// leaves.
pub(crate) fn repl(coordinator: &mut Coordinator, view: &mut TerminalView) {
    if !coordinator.toggle_repl(view).is_completed() {
        return;
    }
    if let Some(connection) = coordinator.connection() {
        if let Err(e) = bridge::run(connection) {
            warn!("REPL connection lost: {}", e);
        }
    }
    coordinator.toggle_repl(view);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_has_a_distinct_label() {
        let mut labels: Vec<&str> = Action::ALL.iter().map(|a| a.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), Action::ALL.len());
    }
}
