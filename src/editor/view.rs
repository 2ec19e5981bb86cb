//! What the coordinator needs from the user interface.

use std::path::{Path, PathBuf};

use super::document::Document;
use crate::locator::DeviceHandle;

/// The user's answer to a confirmation request.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Confirmation {
    Confirmed,
    Cancelled,
}

/// The user interface driven by the [`Coordinator`](crate::Coordinator).
///
/// A view holds the open documents (one per tab), asks the user for paths and
/// confirmations and shows messages. How any of it is rendered is up to the
/// implementation.
pub trait View {
    /// Opens a new tab holding `text` and makes it the current one.
    fn add_tab(&mut self, path: Option<PathBuf>, text: String);

    /// The document in the current tab, if any.
    fn current_tab(&mut self) -> Option<&mut Document>;

    /// Every open document, in tab order.
    fn all_open_documents(&self) -> Vec<&Document>;

    /// Asks for a script or image to load, starting in `hint_dir`. `None` when
    /// the user cancels.
    fn get_load_path(&mut self, hint_dir: &Path) -> Option<PathBuf>;

    /// Asks where to save the current script, starting in `hint_dir`. `None`
    /// when the user cancels.
    fn get_save_path(&mut self, hint_dir: &Path) -> Option<PathBuf>;

    /// Shows `text`, with optional longer `detail`.
    fn show_message(&mut self, text: &str, detail: Option<&str>);

    /// Asks the user to confirm `text`.
    fn show_confirmation(&mut self, text: &str) -> Confirmation;

    /// Called once a live session is open on `handle`.
    fn session_opened(&mut self, _handle: &DeviceHandle) {}

    /// Called once the live session is closed.
    fn session_closed(&mut self) {}
}
