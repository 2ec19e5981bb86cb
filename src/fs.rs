//! Filesystem access used by the session store and the coordinator.
//!
//! Reads return `Ok(None)` when the file does not exist so that callers decide
//! explicitly whether a missing file is worth reporting. Any other failure
//! (permissions, a directory in the way, ...) is still an error.

use std::fs;
use std::io;
use std::path::Path;

/// The few filesystem operations `mucom` needs.
pub trait FileSystem {
    /// Reads the whole file, or `None` if it does not exist.
    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>>;

    /// Creates or truncates the file and writes `contents` to it.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Creates `path` and all of its missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Reads the whole file as UTF-8 text, or `None` if it does not exist.
    fn read_to_string(&self, path: &Path) -> io::Result<Option<String>> {
        match self.read(path)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            None => Ok(None),
        }
    }
}

/// The host filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }
}


// =============================================================================
// Unit Tests
// =============================================================================
