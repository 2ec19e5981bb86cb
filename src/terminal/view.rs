//! A [`View`] for the terminal.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Confirm, Editor, Input};
use log::debug;

use crate::editor::{Confirmation, Document, View, SCRIPT_EXTENSION};
use crate::locator::DeviceHandle;

/// Keeps the open documents in memory and talks to the user through
/// `dialoguer` prompts.
///
/// Paths can be queued in advance with [`TerminalView::queue_load_path`] and
/// [`TerminalView::queue_save_path`]; a queued path is used instead of asking.
pub struct TerminalView {
    term: Term,
    theme: ColorfulTheme,
    documents: Vec<Document>,
    current: Option<usize>,
    load_paths: VecDeque<PathBuf>,
    save_paths: VecDeque<PathBuf>,
}
impl TerminalView {
    pub fn new() -> Self {
        TerminalView {
            term: Term::stderr(),
            theme: ColorfulTheme::default(),
            documents: vec![],
            current: None,
            load_paths: VecDeque::new(),
            save_paths: VecDeque::new(),
        }
    }

    pub fn queue_load_path(&mut self, path: impl Into<PathBuf>) {
        self.load_paths.push_back(path.into());
    }

    pub fn queue_save_path(&mut self, path: impl Into<PathBuf>) {
        self.save_paths.push_back(path.into());
    }

    pub fn term(&self) -> &Term {
        &self.term
    }

    pub fn theme(&self) -> &ColorfulTheme {
        &self.theme
    }

    /// Makes the next document (wrapping around) the current one.
    pub fn next_tab(&mut self) {
        if !self.documents.is_empty() {
            let next = self.current.map_or(0, |i| (i + 1) % self.documents.len());
            self.current = Some(next);
        }
    }

    /// Opens the current document in the user's editor. The document is
    /// marked modified if the text changed.
    pub fn edit_current(&mut self) -> std::io::Result<()> {
        let document = match self.current.and_then(|i| self.documents.get_mut(i)) {
            Some(document) => document,
            None => return Ok(()),
        };
        let edited = Editor::new()
            .extension(&format!(".{}", SCRIPT_EXTENSION))
            .edit(&document.text)?;
        match edited {
            Some(text) if text != document.text => {
                document.text = text;
                document.modified = true;
            }
            _ => debug!("no changes to {}", document.label()),
        }
        Ok(())
    }

    /// One line per document, the current one highlighted.
    pub fn print_tabs(&self) {
        for (i, document) in self.documents.iter().enumerate() {
            let line = if Some(i) == self.current {
                format!("{} {}", style("▶").cyan(), style(document.label()).bold())
            } else {
                format!("  {}", document.label())
            };
            let _ = self.term.write_line(&line);
        }
    }

    fn ask_path(&self, prompt: &str, hint_dir: &Path) -> Option<PathBuf> {
        let initial = format!("{}{}", hint_dir.display(), std::path::MAIN_SEPARATOR);
        let answer = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .with_initial_text(initial.clone())
            .allow_empty(true)
            .interact_text_on(&self.term);
        match answer {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() || text == initial {
                    None
                } else {
                    Some(PathBuf::from(text))
                }
            }
            Err(e) => {
                debug!("prompt failed: {}", e);
                None
            }
        }
    }
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl View for TerminalView {
    fn add_tab(&mut self, path: Option<PathBuf>, text: String) {
        self.documents.push(Document::new(path, text));
        self.current = Some(self.documents.len() - 1);
    }

    fn current_tab(&mut self) -> Option<&mut Document> {
        match self.current {
            Some(i) => self.documents.get_mut(i),
            None => None,
        }
    }

    fn all_open_documents(&self) -> Vec<&Document> {
        self.documents.iter().collect()
    }

    fn get_load_path(&mut self, hint_dir: &Path) -> Option<PathBuf> {
        match self.load_paths.pop_front() {
            Some(path) => Some(path),
            None => self.ask_path("Load script or image", hint_dir),
        }
    }

    fn get_save_path(&mut self, hint_dir: &Path) -> Option<PathBuf> {
        match self.save_paths.pop_front() {
            Some(path) => Some(path),
            None => self.ask_path("Save as", hint_dir),
        }
    }

    fn show_message(&mut self, text: &str, detail: Option<&str>) {
        let _ = self
            .term
            .write_line(&format!("[MU] {}", style(text).bold()));
        if let Some(detail) = detail {
            for line in detail.lines() {
                let _ = self.term.write_line(&format!("     {}", style(line).dim()));
            }
        }
    }

    fn show_confirmation(&mut self, text: &str) -> Confirmation {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(format!("{} Continue anyway?", text))
            .default(false)
            .interact_on(&self.term);
        match answer {
            Ok(true) => Confirmation::Confirmed,
            _ => Confirmation::Cancelled,
        }
    }

    fn session_opened(&mut self, handle: &DeviceHandle) {
        let _ = self.term.write_line(&format!(
            "[MU] 👍 REPL open on {} ({} to leave)",
            style(handle).green(),
            style("Esc").cyan()
        ));
    }

    fn session_closed(&mut self) {
        let _ = self.term.write_line("[MU] REPL closed");
    }
}
