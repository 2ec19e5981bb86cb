//! An open script.

use std::path::PathBuf;

/// Extension given to saved scripts.
pub const SCRIPT_EXTENSION: &str = "py";

/// The text of one editor tab.
///
/// The view owns its documents and tracks edits; the coordinator only reads
/// `path` and `modified`, and updates them when saving.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Document {
    /// Where the script is saved. `None` for an untitled buffer.
    pub path: Option<PathBuf>,
    pub text: String,
    /// Whether the text changed since it was last loaded or saved.
    pub modified: bool,
}
impl Document {
    pub fn new(path: Option<PathBuf>, text: impl Into<String>) -> Self {
        Document {
            path,
            text: text.into(),
            modified: false,
        }
    }

    /// The name shown on the tab: the file name or `untitled`, with a trailing
    /// ` *` while there are unsaved changes.
    pub fn label(&self) -> String {
        let name = self
            .path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled".to_string());
        if self.modified {
            name + " *"
        } else {
            name
        }
    }
}

/// `path` with the script extension appended when its file name does not
/// already end with it.
pub(crate) fn with_script_extension(path: PathBuf) -> PathBuf {
    let has_extension = path
        .file_name()
        .map_or(false, |name| {
            name.to_string_lossy()
                .ends_with(&format!(".{}", SCRIPT_EXTENSION))
        });
    if has_extension {
        path
    } else {
        let mut name = path.into_os_string();
        name.push(".");
        name.push(SCRIPT_EXTENSION);
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        let mut doc = Document::new(Some(PathBuf::from("/p/blink.py")), "");
        assert_eq!(doc.label(), "blink.py");
        doc.modified = true;
        assert_eq!(doc.label(), "blink.py *");
        assert_eq!(Document::new(None, "").label(), "untitled");
    }

    #[test]
    fn script_extension_is_appended_once() {
        assert_eq!(
            with_script_extension(PathBuf::from("/p/blink")),
            PathBuf::from("/p/blink.py")
        );
        assert_eq!(
            with_script_extension(PathBuf::from("/p/blink.py")),
            PathBuf::from("/p/blink.py")
        );
        assert_eq!(
            with_script_extension(PathBuf::from("/p/notes.txt")),
            PathBuf::from("/p/notes.txt.py")
        );
    }
}
