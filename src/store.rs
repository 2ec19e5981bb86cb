//! Persisting the list of open scripts across restarts.
//!
//! The session file is a pretty-printed JSON array of paths:
//!
//! ```text
//! [
//!   "/home/ada/micropython/blink.py",
//!   "/home/ada/micropython/music.py"
//! ]
//! ```
//!
//! A missing file is an empty session. Scripts moved or deleted since the
//! session was saved are dropped silently when restoring.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fs::FileSystem;

/// Content of the document created when there is nothing to restore.
pub const PLACEHOLDER_SCRIPT: &str = "from microbit import *\n\n# Write code here :-)";

// =============================================================================
// Public Interface
// =============================================================================

/// What the editor should show after restoring the session.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Restored {
    /// Scripts that still exist, in their original order, with their content.
    Documents(Vec<(PathBuf, String)>),
    /// Nothing could be restored: create a single untitled document holding
    /// [`PLACEHOLDER_SCRIPT`].
    Default,
}

/// Reads and writes the session file.
pub struct SessionStore {
    path: PathBuf,
    fs: Rc<dyn FileSystem>,
}
impl SessionStore {
    pub fn new(path: impl Into<PathBuf>, fs: Rc<dyn FileSystem>) -> Self {
        SessionStore {
            path: path.into(),
            fs,
        }
    }

    /// Location of the session file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads back the scripts listed in the session file.
    ///
    /// Scripts that no longer exist are skipped; so are scripts that cannot be
    /// read as text, with a warning. Only a session file that exists but is
    /// not a list of paths is an error.
    pub fn restore(&self) -> Result<Restored> {
        let record = match self.fs.read(&self.path)? {
            Some(bytes) => serde_json::from_slice::<SessionRecord>(&bytes)?,
            None => {
                debug!("no session file at {}", self.path.display());
                SessionRecord::default()
            }
        };

        let mut documents = Vec::with_capacity(record.paths.len());
        for path in record.paths {
            match self.fs.read_to_string(&path) {
                Ok(Some(text)) => documents.push((path, text)),
                Ok(None) => debug!("{} is gone, dropping it from the session", path.display()),
                Err(e) => warn!("could not restore {}: {}", path.display(), e),
            }
        }
        info!("restored {} document(s)", documents.len());

        if documents.is_empty() {
            Ok(Restored::Default)
        } else {
            Ok(Restored::Documents(documents))
        }
    }

    /// Overwrites the session file with `paths`, in order.
    pub fn persist<I, P>(&self, paths: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let record = SessionRecord {
            paths: paths
                .into_iter()
                .map(|p| p.as_ref().to_path_buf())
                .collect(),
        };
        if let Some(parent) = self.path.parent() {
            self.fs.create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(&record)?;
        self.fs.write(&self.path, &json)?;
        info!(
            "saved {} path(s) to {}",
            record.paths.len(),
            self.path.display()
        );
        Ok(())
    }
}

// =============================================================================
// Private stuff
// =============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct SessionRecord {
    paths: Vec<PathBuf>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::fs::memory::MemoryFileSystem;
    use crate::fs::OsFileSystem;

    const SESSION: &str = "/data/mu/tabs.json";

    fn store(fs: MemoryFileSystem) -> (SessionStore, Rc<MemoryFileSystem>) {
        let fs = Rc::new(fs);
        (SessionStore::new(SESSION, fs.clone()), fs)
    }

    #[test]
    fn missing_session_file_restores_default() {
        let (store, _) = store(MemoryFileSystem::default());
        assert_eq!(store.restore().unwrap(), Restored::Default);
    }

    #[test]
    fn empty_list_restores_default() {
        let (store, _) = store(MemoryFileSystem::default().with_file(SESSION, "[]"));
        assert_eq!(store.restore().unwrap(), Restored::Default);
    }

    #[test]
    fn all_paths_missing_restores_default() {
        let (store, _) = store(
            MemoryFileSystem::default().with_file(SESSION, r#"["/gone/a.py", "/gone/b.py"]"#),
        );
        assert_eq!(store.restore().unwrap(), Restored::Default);
    }

    #[test]
    fn one_missing_path_among_three_is_skipped() {
        let (store, fs) = store(
            MemoryFileSystem::default()
                .with_file("/p/a.py", "a = 1")
                .with_file("/p/b.py", "b = 2")
                .with_file("/p/c.py", "c = 3"),
        );
        store
            .persist(&["/p/a.py", "/p/b.py", "/p/missing.py", "/p/c.py"])
            .unwrap();
        fs.remove("/p/b.py");

        assert_eq!(
            store.restore().unwrap(),
            Restored::Documents(vec![
                (PathBuf::from("/p/a.py"), "a = 1".to_string()),
                (PathBuf::from("/p/c.py"), "c = 3".to_string()),
            ])
        );
    }

    #[test]
    fn persist_then_restore_keeps_order_and_content() {
        let (store, _) = store(
            MemoryFileSystem::default()
                .with_file("/p/zeta.py", "z")
                .with_file("/p/alpha.py", "a"),
        );
        store.persist(vec!["/p/zeta.py", "/p/alpha.py"]).unwrap();
        assert_eq!(
            store.restore().unwrap(),
            Restored::Documents(vec![
                (PathBuf::from("/p/zeta.py"), "z".to_string()),
                (PathBuf::from("/p/alpha.py"), "a".to_string()),
            ])
        );
    }

    #[test]
    fn persist_overwrites_previous_session() {
        let (store, fs) = store(MemoryFileSystem::default());
        store.persist(&["/p/one.py", "/p/two.py"]).unwrap();
        store.persist(&["/p/three.py"]).unwrap();

        let saved: Vec<String> = serde_json::from_str(&fs.text(SESSION).unwrap()).unwrap();
        assert_eq!(saved, vec!["/p/three.py".to_string()]);
    }

    #[test]
    fn session_file_is_a_pretty_json_array() {
        let (store, fs) = store(MemoryFileSystem::default());
        store.persist(Vec::<PathBuf>::new()).unwrap();
        assert_eq!(fs.text(SESSION).unwrap(), "[]");

        store.persist(&["/p/one.py"]).unwrap();
        assert_eq!(fs.text(SESSION).unwrap(), "[\n  \"/p/one.py\"\n]");
    }

    #[test]
    fn malformed_session_file_is_an_error() {
        let (store, _) = store(MemoryFileSystem::default().with_file(SESSION, "{\"tabs\": 3}"));
        assert!(matches!(store.restore(), Err(Error::Session(_))));
    }

    #[test]
    fn round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("heart.py");
        std::fs::write(&script, "display.show(Image.HEART)").unwrap();

        let store = SessionStore::new(
            dir.path().join("data").join("tabs.json"),
            Rc::new(OsFileSystem),
        );
        assert_eq!(store.restore().unwrap(), Restored::Default);

        store.persist(&[&script]).unwrap();
        assert_eq!(
            store.restore().unwrap(),
            Restored::Documents(vec![(script, "display.show(Image.HEART)".to_string())])
        );
    }
}
