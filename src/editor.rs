//! The coordinator: what happens when the user asks the editor to do
//! something.
//!
//! Every operation runs to completion synchronously and returns an
//! [`Outcome`]. Failures never escape as errors: they are shown to the user
//! through the [`View`] (with guidance on how to fix the problem when there is
//! some) and handed back as [`Outcome::Reported`] for the caller's benefit.

mod document;
mod view;

use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::fs::{FileSystem, OsFileSystem};
use crate::hex;
use crate::locator::{platform_locator, DeviceLocator};
use crate::repl::{Connection, Connector, DeviceSession, SerialConnector, Status, Toggled};
use crate::settings::Settings;
use crate::store::{Restored, SessionStore, PLACEHOLDER_SCRIPT};

pub use document::{Document, SCRIPT_EXTENSION};
pub use view::{Confirmation, View};

use document::with_script_extension;

/// Name of the image written at the root of the board's drive.
pub const FIRMWARE_FILE_NAME: &str = "micropython.hex";

const FLASH_DETAIL: &str = "When the yellow LED stops flashing the device will restart and \
                            your script will run. If there is an error, you'll see a helpful \
                            message scroll across the device's display.";

// =============================================================================
// Public Interface
// =============================================================================

/// How a coordinator operation ended.
#[derive(Debug)]
pub enum Outcome {
    /// The operation did what was asked.
    Completed,
    /// Nothing to do: no current document, the user cancelled, or the file to
    /// load no longer exists.
    Abandoned,
    /// The operation failed and the user was told why.
    Reported(Error),
    /// The session was saved; the caller should now terminate the process.
    Quit,
}
impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }
}

/// Sequences the locator, the image encoder, the live session and the session
/// store on behalf of the view.
pub struct Coordinator {
    settings: Settings,
    fs: Rc<dyn FileSystem>,
    locator: Box<dyn DeviceLocator>,
    connector: Box<dyn Connector>,
    store: SessionStore,
    repl: DeviceSession,
}
impl Coordinator {
    /// Creates the coordinator, making sure the projects and data directories
    /// exist.
    pub fn new(
        settings: Settings,
        locator: Box<dyn DeviceLocator>,
        connector: Box<dyn Connector>,
        fs: Rc<dyn FileSystem>,
    ) -> Result<Self> {
        fs.create_dir_all(&settings.projects_dir)?;
        fs.create_dir_all(&settings.data_dir)?;
        let store = SessionStore::new(settings.session_file(), fs.clone());
        Ok(Coordinator {
            settings,
            fs,
            locator,
            connector,
            store,
            repl: DeviceSession::new(),
        })
    }

    /// A coordinator for the host: the platform's locator, real serial ports
    /// and the real filesystem. Fails with [`Error::UnsupportedPlatform`] on
    /// hosts where the board cannot be located.
    pub fn for_host(settings: Settings) -> Result<Self> {
        let locator = platform_locator()?;
        let connector = Box::new(SerialConnector::new(settings.clone()));
        Self::new(settings, locator, connector, Rc::new(OsFileSystem))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn locator(&self) -> &dyn DeviceLocator {
        self.locator.as_ref()
    }

    pub fn repl_status(&self) -> Status {
        self.repl.status()
    }

    /// The live connection, while the REPL is open.
    pub fn connection(&mut self) -> Option<&mut Connection> {
        self.repl.connection()
    }

    /// Reopens the scripts of the last session, or a single untitled document
    /// with a starter script when there is nothing to reopen.
    pub fn restore_session(&mut self, view: &mut dyn View) -> Outcome {
        let restored = match self.store.restore() {
            Ok(restored) => restored,
            Err(e) => {
                let outcome = self.report(view, e);
                view.add_tab(None, PLACEHOLDER_SCRIPT.to_string());
                return outcome;
            }
        };
        match restored {
            Restored::Documents(documents) => {
                for (path, text) in documents {
                    view.add_tab(Some(path), text);
                }
            }
            Restored::Default => view.add_tab(None, PLACEHOLDER_SCRIPT.to_string()),
        }
        Outcome::Completed
    }

    /// Adds an empty untitled document.
    pub fn new_document(&mut self, view: &mut dyn View) -> Outcome {
        view.add_tab(None, String::new());
        Outcome::Completed
    }

    /// Embeds the current script into the runtime and copies the image onto
    /// the board's drive.
    pub fn flash(&mut self, view: &mut dyn View) -> Outcome {
        let (label, script) = match view.current_tab() {
            Some(document) => (document.label(), document.text.clone().into_bytes()),
            None => {
                debug!("flash: no active document");
                return Outcome::Abandoned;
            }
        };

        let image = match self.build_image(&script) {
            Ok(image) => image,
            Err(e) => return self.report(view, e),
        };
        let root = match self.locator.find_mass_storage() {
            Some(root) => root,
            None => return self.report(view, Error::DeviceNotFound),
        };

        let target = root.join(FIRMWARE_FILE_NAME);
        if let Err(e) = self.fs.write(&target, &image) {
            return self.report(view, e.into());
        }
        info!("wrote {} bytes to {}", image.len(), target.display());
        view.show_message(
            &format!("Flashing \"{}\" onto the micro:bit.", label),
            Some(FLASH_DETAIL),
        );
        Outcome::Completed
    }

    /// Saves the current document, asking for a path if it has none yet.
    pub fn save(&mut self, view: &mut dyn View) -> Outcome {
        let existing = match view.current_tab() {
            Some(document) => document.path.clone(),
            None => return Outcome::Abandoned,
        };
        let path = match existing {
            Some(path) => path,
            None => match view.get_save_path(&self.settings.projects_dir) {
                Some(path) if !path.as_os_str().is_empty() => self.resolve(path),
                _ => {
                    debug!("save: no path given");
                    return Outcome::Abandoned;
                }
            },
        };
        let path = with_script_extension(path);

        let text = match view.current_tab() {
            Some(document) => document.text.clone(),
            None => return Outcome::Abandoned,
        };
        if let Err(e) = self.fs.write(&path, text.as_bytes()) {
            return self.report(view, e.into());
        }
        info!("saved {}", path.display());
        if let Some(document) = view.current_tab() {
            document.path = Some(path);
            document.modified = false;
        }
        Outcome::Completed
    }

    /// Opens a script, or recovers the script embedded in a firmware image as
    /// a new untitled document.
    pub fn load(&mut self, view: &mut dyn View) -> Outcome {
        let path = match view.get_load_path(&self.settings.projects_dir) {
            Some(path) if !path.as_os_str().is_empty() => self.resolve(path),
            _ => return Outcome::Abandoned,
        };

        let bytes = match self.fs.read(&path) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!("load: {} does not exist", path.display());
                return Outcome::Abandoned;
            }
            Err(e) => return self.report(view, e.into()),
        };

        let is_script = path
            .extension()
            .map_or(false, |extension| extension == SCRIPT_EXTENSION);
        if is_script {
            let text = decode(bytes, &path);
            view.add_tab(Some(path), text);
        } else {
            match hex::extract(&bytes) {
                // Recovered scripts are untitled so that saving asks for a new
                // name instead of overwriting the image.
                Ok(script) => view.add_tab(None, decode(script, &path)),
                Err(e) => return self.report(view, e),
            }
        }
        Outcome::Completed
    }

    /// Opens the REPL on the attached board.
    pub fn open_repl(&mut self, view: &mut dyn View) -> Outcome {
        match self.repl.open(self.locator.as_ref(), self.connector.as_ref()) {
            Ok(handle) => {
                view.session_opened(&handle);
                Outcome::Completed
            }
            Err(e) => self.report(view, e),
        }
    }

    /// Closes the REPL.
    pub fn close_repl(&mut self, view: &mut dyn View) -> Outcome {
        match self.repl.close() {
            Ok(()) => {
                view.session_closed();
                Outcome::Completed
            }
            Err(e) => self.report(view, e),
        }
    }

    /// Opens the REPL if it is closed, closes it otherwise.
    pub fn toggle_repl(&mut self, view: &mut dyn View) -> Outcome {
        match self.repl.toggle(self.locator.as_ref(), self.connector.as_ref()) {
            Ok(Toggled::Opened(handle)) => view.session_opened(&handle),
            Ok(Toggled::Closed) => view.session_closed(),
            Err(e) => return self.report(view, e),
        }
        Outcome::Completed
    }

    /// Saves the session and tells the caller to exit, after confirmation
    /// when some document has unsaved changes.
    pub fn quit(&mut self, view: &mut dyn View) -> Outcome {
        let modified = view.all_open_documents().iter().any(|d| d.modified);
        if modified && view.show_confirmation("You have un-saved work!") == Confirmation::Cancelled
        {
            debug!("quit cancelled");
            return Outcome::Abandoned;
        }

        if self.repl.is_open() {
            if let Err(ref e) = self.repl.close() {
                warn!("error while closing the REPL: {}", e);
            }
            view.session_closed();
        }

        let paths: Vec<PathBuf> = view
            .all_open_documents()
            .iter()
            .filter_map(|d| d.path.clone())
            .collect();
        if let Err(e) = self.store.persist(&paths) {
            // Still quit: the user asked for it and the scripts themselves
            // are saved.
            self.report(view, e);
        }
        Outcome::Quit
    }

    // -------------------------------------------------------------------------

    fn build_image(&self, script: &[u8]) -> Result<Vec<u8>> {
        let path = self
            .settings
            .runtime_image
            .as_ref()
            .ok_or(Error::RuntimeMissing)?;
        let runtime = self.fs.read(path)?.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("runtime image {} does not exist", path.display()),
            )
        })?;
        hex::embed(&runtime, script)
    }

    /// Paths the user typed are relative to the projects directory they were
    /// offered, so that the session only ever records absolute paths.
    fn resolve(&self, path: PathBuf) -> PathBuf {
        if path.is_relative() {
            self.settings.projects_dir.join(path)
        } else {
            path
        }
    }

    fn report(&self, view: &mut dyn View, error: Error) -> Outcome {
        warn!("{}", error);
        view.show_message(&headline(&error), error.guidance());
        Outcome::Reported(error)
    }
}

// =============================================================================
// Private stuff
// =============================================================================

/// The error as a sentence.
fn headline(error: &Error) -> String {
    let text = error.to_string();
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>() + ".",
        None => text,
    }
}

fn decode(bytes: Vec<u8>, origin: &Path) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!("{} is not valid UTF-8, some characters were replaced", origin.display());
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::fs::memory::MemoryFileSystem;
    use crate::hex::Record;
    use crate::locator::DeviceHandle;
    use crate::repl::fakes::{FakeConnector, FakeLocator};
    use crate::settings::SettingsBuilder;

    const RUNTIME: &str = "/opt/mu/micropython.hex";
    const DRIVE: &str = "/media/ada/MICROBIT";
    const SESSION: &str = "/data/mu/tabs.json";

    #[derive(Default)]
    struct FakeView {
        tabs: Vec<Document>,
        load_paths: VecDeque<Option<PathBuf>>,
        save_paths: VecDeque<Option<PathBuf>>,
        hints: Vec<PathBuf>,
        messages: Vec<(String, Option<String>)>,
        confirmations: Vec<String>,
        cancel: bool,
        opened: Vec<DeviceHandle>,
        closed: usize,
    }
    impl View for FakeView {
        fn add_tab(&mut self, path: Option<PathBuf>, text: String) {
            self.tabs.push(Document::new(path, text));
        }

        fn current_tab(&mut self) -> Option<&mut Document> {
            self.tabs.last_mut()
        }

        fn all_open_documents(&self) -> Vec<&Document> {
            self.tabs.iter().collect()
        }

        fn get_load_path(&mut self, hint_dir: &Path) -> Option<PathBuf> {
            self.hints.push(hint_dir.to_path_buf());
            self.load_paths.pop_front().flatten()
        }

        fn get_save_path(&mut self, hint_dir: &Path) -> Option<PathBuf> {
            self.hints.push(hint_dir.to_path_buf());
            self.save_paths.pop_front().flatten()
        }

        fn show_message(&mut self, text: &str, detail: Option<&str>) {
            self.messages
                .push((text.to_string(), detail.map(String::from)));
        }

        fn show_confirmation(&mut self, text: &str) -> Confirmation {
            self.confirmations.push(text.to_string());
            if self.cancel {
                Confirmation::Cancelled
            } else {
                Confirmation::Confirmed
            }
        }

        fn session_opened(&mut self, handle: &DeviceHandle) {
            self.opened.push(handle.clone());
        }

        fn session_closed(&mut self) {
            self.closed += 1;
        }
    }

    fn runtime() -> String {
        [
            Record::extended_linear_address(0),
            Record::data(0, &[0xC0, 0x07, 0x00, 0x00]),
            Record::end_of_file(),
        ]
        .iter()
        .map(|r| format!("{}\n", r))
        .collect()
    }

    fn settings() -> Settings {
        SettingsBuilder::new()
            .projects_dir("/home/ada/micropython")
            .data_dir("/data/mu")
            .runtime_image(RUNTIME)
            .finalize()
    }

    fn board() -> FakeLocator {
        FakeLocator {
            drive: Some(PathBuf::from(DRIVE)),
            port: Some("/dev/ttyACM0".to_string()),
        }
    }

    fn coordinator(fs: MemoryFileSystem, locator: FakeLocator) -> (Coordinator, Rc<MemoryFileSystem>) {
        coordinator_with(settings(), fs, locator)
    }

    fn coordinator_with(
        settings: Settings,
        fs: MemoryFileSystem,
        locator: FakeLocator,
    ) -> (Coordinator, Rc<MemoryFileSystem>) {
        let fs = Rc::new(fs.with_file(RUNTIME, runtime()));
        let coordinator = Coordinator::new(
            settings,
            Box::new(locator),
            Box::new(FakeConnector::default()),
            fs.clone(),
        )
        .unwrap();
        (coordinator, fs)
    }

    fn view_with(path: Option<&str>, text: &str) -> FakeView {
        let mut view = FakeView::default();
        view.add_tab(path.map(PathBuf::from), text.to_string());
        view
    }

    // Session ----------------------------------------------------------------

    #[test]
    fn fresh_start_gets_one_placeholder_document() {
        let (mut coordinator, _) = coordinator(MemoryFileSystem::default(), board());
        let mut view = FakeView::default();

        assert!(coordinator.restore_session(&mut view).is_completed());
        assert_eq!(view.tabs, vec![Document::new(None, PLACEHOLDER_SCRIPT)]);
    }

    #[test]
    fn restore_skips_vanished_scripts() {
        let fs = MemoryFileSystem::default()
            .with_file(SESSION, r#"["/p/a.py", "/p/gone.py", "/p/b.py"]"#)
            .with_file("/p/a.py", "a")
            .with_file("/p/b.py", "b");
        let (mut coordinator, _) = coordinator(fs, board());
        let mut view = FakeView::default();

        coordinator.restore_session(&mut view);
        assert_eq!(
            view.tabs,
            vec![
                Document::new(Some(PathBuf::from("/p/a.py")), "a"),
                Document::new(Some(PathBuf::from("/p/b.py")), "b"),
            ]
        );
        assert!(view.messages.is_empty());
    }

    #[test]
    fn corrupt_session_is_reported_and_placeholder_created() {
        let fs = MemoryFileSystem::default().with_file(SESSION, "not json");
        let (mut coordinator, _) = coordinator(fs, board());
        let mut view = FakeView::default();

        assert!(matches!(
            coordinator.restore_session(&mut view),
            Outcome::Reported(Error::Session(_))
        ));
        assert_eq!(view.tabs.len(), 1);
        assert_eq!(view.tabs[0].text, PLACEHOLDER_SCRIPT);
    }

    // Flash ------------------------------------------------------------------

    #[test]
    fn flash_without_document_does_nothing() {
        let (mut coordinator, fs) = coordinator(MemoryFileSystem::default(), board());
        let mut view = FakeView::default();

        assert!(matches!(coordinator.flash(&mut view), Outcome::Abandoned));
        assert!(fs.writes().is_empty());
        assert!(view.messages.is_empty());
    }

    #[test]
    fn flash_without_board_reports_and_writes_nothing() {
        let (mut coordinator, fs) = coordinator(MemoryFileSystem::default(), FakeLocator::default());
        let mut view = view_with(Some("/p/blink.py"), "display.scroll('hi')");

        assert!(matches!(
            coordinator.flash(&mut view),
            Outcome::Reported(Error::DeviceNotFound)
        ));
        assert!(fs.writes().is_empty());
        assert_eq!(view.messages.len(), 1);
        assert_eq!(view.messages[0].0, "Could not find an attached BBC micro:bit.");
        assert!(view.messages[0].1.is_some());
    }

    #[test]
    fn flash_writes_the_image_to_the_drive() {
        let (mut coordinator, fs) = coordinator(MemoryFileSystem::default(), board());
        let mut view = view_with(Some("/p/blink.py"), "display.scroll('hi')");

        assert!(coordinator.flash(&mut view).is_completed());

        let target = Path::new(DRIVE).join(FIRMWARE_FILE_NAME);
        assert_eq!(fs.writes(), vec![target.clone()]);
        let image = fs.contents(&target).unwrap();
        assert_eq!(hex::extract(&image).unwrap(), b"display.scroll('hi')");
        assert_eq!(
            view.messages[0].0,
            "Flashing \"blink.py\" onto the micro:bit."
        );
    }

    #[test]
    fn flash_oversized_script_reports_the_limit() {
        let (mut coordinator, fs) = coordinator(MemoryFileSystem::default(), board());
        let mut view = view_with(None, &"#".repeat(hex::MAX_SCRIPT_SIZE + 10));

        match coordinator.flash(&mut view) {
            Outcome::Reported(Error::ScriptTooLarge { size, limit }) => {
                assert_eq!(size, 8198);
                assert_eq!(limit, 8188);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(fs.writes().is_empty());
        assert!(view.messages[0].0.contains("8188"));
    }

    #[test]
    fn flash_without_runtime_is_reported() {
        let settings = SettingsBuilder::new()
            .projects_dir("/home/ada/micropython")
            .data_dir("/data/mu")
            .finalize();
        let (mut coordinator, fs) =
            coordinator_with(settings, MemoryFileSystem::default(), board());
        let mut view = view_with(None, "pass");

        assert!(matches!(
            coordinator.flash(&mut view),
            Outcome::Reported(Error::RuntimeMissing)
        ));
        assert!(fs.writes().is_empty());
    }

    // Save -------------------------------------------------------------------

    #[test]
    fn save_untitled_asks_for_a_path_and_adds_the_extension() {
        let (mut coordinator, fs) = coordinator(MemoryFileSystem::default(), board());
        let mut view = view_with(None, "music.play(music.NYAN)");
        view.tabs[0].modified = true;
        view.save_paths.push_back(Some(PathBuf::from("/home/ada/micropython/nyan")));

        assert!(coordinator.save(&mut view).is_completed());

        assert_eq!(view.hints, vec![PathBuf::from("/home/ada/micropython")]);
        assert_eq!(
            fs.text("/home/ada/micropython/nyan.py").unwrap(),
            "music.play(music.NYAN)"
        );
        assert_eq!(
            view.tabs[0].path,
            Some(PathBuf::from("/home/ada/micropython/nyan.py"))
        );
        assert!(!view.tabs[0].modified);
    }

    #[test]
    fn relative_save_path_lands_in_the_projects_dir() {
        let (mut coordinator, fs) = coordinator(MemoryFileSystem::default(), board());
        let mut view = view_with(None, "radio.on()");
        view.save_paths.push_back(Some(PathBuf::from("notes")));

        assert!(coordinator.save(&mut view).is_completed());
        assert_eq!(fs.text("/home/ada/micropython/notes.py").unwrap(), "radio.on()");

        assert!(matches!(coordinator.quit(&mut view), Outcome::Quit));
        let saved: Vec<String> = serde_json::from_str(&fs.text(SESSION).unwrap()).unwrap();
        assert_eq!(saved, vec!["/home/ada/micropython/notes.py".to_string()]);
    }

    #[test]
    fn save_cancelled_keeps_the_document_untitled() {
        let (mut coordinator, fs) = coordinator(MemoryFileSystem::default(), board());
        let mut view = view_with(None, "pass");
        view.tabs[0].modified = true;
        view.save_paths.push_back(None);

        assert!(matches!(coordinator.save(&mut view), Outcome::Abandoned));
        assert!(fs.writes().is_empty());
        assert_eq!(view.tabs[0].path, None);
        assert!(view.tabs[0].modified);
        assert!(view.messages.is_empty());
    }

    #[test]
    fn save_existing_document_overwrites_without_asking() {
        let fs = MemoryFileSystem::default().with_file("/p/a.py", "old");
        let (mut coordinator, fs) = coordinator(fs, board());
        let mut view = view_with(Some("/p/a.py"), "new");
        view.tabs[0].modified = true;

        assert!(coordinator.save(&mut view).is_completed());
        assert!(view.hints.is_empty());
        assert_eq!(fs.text("/p/a.py").unwrap(), "new");
        assert!(!view.tabs[0].modified);
    }

    // Load -------------------------------------------------------------------

    #[test]
    fn load_script_keeps_its_path() {
        let fs = MemoryFileSystem::default().with_file("/p/a.py", "import radio");
        let (mut coordinator, _) = coordinator(fs, board());
        let mut view = FakeView::default();
        view.load_paths.push_back(Some(PathBuf::from("/p/a.py")));

        assert!(coordinator.load(&mut view).is_completed());
        assert_eq!(
            view.tabs,
            vec![Document::new(Some(PathBuf::from("/p/a.py")), "import radio")]
        );
    }

    #[test]
    fn relative_load_path_is_read_from_the_projects_dir() {
        let fs = MemoryFileSystem::default()
            .with_file("/home/ada/micropython/clock.py", "import utime");
        let (mut coordinator, _) = coordinator(fs, board());
        let mut view = FakeView::default();
        view.load_paths.push_back(Some(PathBuf::from("clock.py")));

        assert!(coordinator.load(&mut view).is_completed());
        assert_eq!(
            view.tabs[0].path,
            Some(PathBuf::from("/home/ada/micropython/clock.py"))
        );
    }

    #[test]
    fn load_image_recovers_an_untitled_script() {
        let image = hex::embed(runtime().as_bytes(), b"import speech").unwrap();
        let fs = MemoryFileSystem::default().with_file("/p/old.hex", image);
        let (mut coordinator, _) = coordinator(fs, board());
        let mut view = FakeView::default();
        view.load_paths.push_back(Some(PathBuf::from("/p/old.hex")));

        assert!(coordinator.load(&mut view).is_completed());
        assert_eq!(view.tabs, vec![Document::new(None, "import speech")]);
    }

    #[test]
    fn load_image_without_script_reports_and_adds_nothing() {
        let fs = MemoryFileSystem::default().with_file("/p/bare.hex", runtime());
        let (mut coordinator, _) = coordinator(fs, board());
        let mut view = FakeView::default();
        view.load_paths.push_back(Some(PathBuf::from("/p/bare.hex")));

        assert!(matches!(
            coordinator.load(&mut view),
            Outcome::Reported(Error::NoScriptFound)
        ));
        assert!(view.tabs.is_empty());
        assert_eq!(view.messages.len(), 1);
    }

    #[test]
    fn load_missing_file_is_silent() {
        let (mut coordinator, _) = coordinator(MemoryFileSystem::default(), board());
        let mut view = FakeView::default();
        view.load_paths.push_back(Some(PathBuf::from("/p/moved.py")));

        assert!(matches!(coordinator.load(&mut view), Outcome::Abandoned));
        assert!(view.tabs.is_empty());
        assert!(view.messages.is_empty());
    }

    #[test]
    fn load_cancelled() {
        let (mut coordinator, _) = coordinator(MemoryFileSystem::default(), board());
        let mut view = FakeView::default();
        view.load_paths.push_back(None);

        assert!(matches!(coordinator.load(&mut view), Outcome::Abandoned));
    }

    // REPL -------------------------------------------------------------------

    #[test]
    fn toggle_repl_opens_and_closes() {
        let (mut coordinator, _) = coordinator(MemoryFileSystem::default(), board());
        let mut view = FakeView::default();

        assert!(coordinator.toggle_repl(&mut view).is_completed());
        assert_eq!(coordinator.repl_status(), Status::Connected);
        assert_eq!(
            view.opened,
            vec![DeviceHandle::SerialPort("/dev/ttyACM0".to_string())]
        );
        assert!(coordinator.connection().is_some());

        assert!(coordinator.toggle_repl(&mut view).is_completed());
        assert_eq!(coordinator.repl_status(), Status::Idle);
        assert_eq!(view.closed, 1);
    }

    #[test]
    fn repl_sequencing_errors_are_reported() {
        let (mut coordinator, _) = coordinator(MemoryFileSystem::default(), board());
        let mut view = FakeView::default();

        assert!(matches!(
            coordinator.close_repl(&mut view),
            Outcome::Reported(Error::NotOpen)
        ));
        coordinator.open_repl(&mut view);
        assert!(matches!(
            coordinator.open_repl(&mut view),
            Outcome::Reported(Error::AlreadyOpen)
        ));
        assert_eq!(view.messages.len(), 2);
    }

    #[test]
    fn repl_without_board_gives_guidance() {
        let (mut coordinator, _) = coordinator(MemoryFileSystem::default(), FakeLocator::default());
        let mut view = FakeView::default();

        assert!(matches!(
            coordinator.open_repl(&mut view),
            Outcome::Reported(Error::DeviceNotFound)
        ));
        let detail = view.messages[0].1.as_ref().unwrap();
        assert!(detail.contains("MicroPython flashed onto it"));
    }

    // Quit -------------------------------------------------------------------

    #[test]
    fn quit_with_unsaved_work_cancelled_changes_nothing() {
        let fs = MemoryFileSystem::default().with_file(SESSION, r#"["/p/a.py"]"#);
        let (mut coordinator, fs) = coordinator(fs, board());
        let mut view = view_with(Some("/p/b.py"), "b");
        view.tabs[0].modified = true;
        view.cancel = true;

        assert!(matches!(coordinator.quit(&mut view), Outcome::Abandoned));
        assert_eq!(view.confirmations, vec!["You have un-saved work!".to_string()]);
        assert!(fs.writes().is_empty());
        assert_eq!(fs.text(SESSION).unwrap(), r#"["/p/a.py"]"#);
    }

    #[test]
    fn quit_persists_only_saved_documents() {
        let (mut coordinator, fs) = coordinator(MemoryFileSystem::default(), board());
        let mut view = FakeView::default();
        view.add_tab(Some(PathBuf::from("/p/a.py")), "a".into());
        view.add_tab(None, "scratch".into());
        view.add_tab(Some(PathBuf::from("/p/b.py")), "b".into());

        assert!(matches!(coordinator.quit(&mut view), Outcome::Quit));
        assert!(view.confirmations.is_empty());
        let saved: Vec<String> = serde_json::from_str(&fs.text(SESSION).unwrap()).unwrap();
        assert_eq!(saved, vec!["/p/a.py".to_string(), "/p/b.py".to_string()]);
    }

    #[test]
    fn quit_confirmed_closes_the_repl() {
        let (mut coordinator, _) = coordinator(MemoryFileSystem::default(), board());
        let mut view = view_with(None, "pass");
        view.tabs[0].modified = true;
        coordinator.open_repl(&mut view);

        assert!(matches!(coordinator.quit(&mut view), Outcome::Quit));
        assert_eq!(coordinator.repl_status(), Status::Idle);
        assert_eq!(view.closed, 1);
    }
}
