//! Error types shared by every `mucom` component.
//!
//! Device and filesystem failures travel up as [`Error`] values until they
//! reach the [`Coordinator`](crate::Coordinator), which turns them into
//! messages for the user. Only [`Error::UnsupportedPlatform`] is fatal.

use std::io;

use thiserror::Error;

// =============================================================================
// Public Interface
// =============================================================================

/// Everything that can go wrong while locating, flashing or talking to a
/// board, or while saving and restoring the editor session.
#[derive(Debug, Error)]
pub enum Error {
    /// The host operating system has no device discovery implementation.
    #[error("unsupported host platform `{0}`")]
    UnsupportedPlatform(&'static str),

    /// No attached board was found (neither drive nor serial port, depending
    /// on the operation).
    #[error("could not find an attached BBC micro:bit")]
    DeviceNotFound,

    /// The board's serial port was found but could not be opened.
    #[error("could not connect to the micro:bit on `{port}`: {source}")]
    ConnectFailed {
        port: String,
        #[source]
        source: io::Error,
    },

    /// A live session is already open.
    #[error("the REPL is already running")]
    AlreadyOpen,

    /// There is no live session to close.
    #[error("the REPL is not running")]
    NotOpen,

    /// The firmware image carries no embedded script.
    #[error("no embedded script was found in the firmware image")]
    NoScriptFound,

    /// The script does not fit in the image's script region.
    #[error("the script is {size} bytes long but at most {limit} bytes fit on the device")]
    ScriptTooLarge { size: usize, limit: usize },

    /// A line of a firmware image is not a valid record.
    #[error("invalid record on line {line}: {reason}")]
    InvalidRecord { line: usize, reason: &'static str },

    /// Flashing was requested but no base runtime image is configured.
    #[error("no MicroPython runtime image is configured")]
    RuntimeMissing,

    /// The session file exists but does not hold a list of paths.
    #[error("malformed session file: {0}")]
    Session(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Actionable text to show the user next to the error message, if any.
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Error::DeviceNotFound => Some(
                "Please make sure the device is plugged into this computer.\n\n\
                 The device must have MicroPython flashed onto it before the \
                 REPL will work.\n\n\
                 Finally, press the device's reset button and wait a few \
                 seconds before trying again.",
            ),
            Error::ConnectFailed { .. } => Some(
                "Click the device's reset button, wait a few seconds and then \
                 try again.",
            ),
            Error::ScriptTooLarge { .. } => {
                Some("Make the script shorter (remove comments or unused code) and try again.")
            }
            Error::RuntimeMissing => {
                Some("Point `mucom` at a MicroPython runtime `.hex` file with `--runtime`.")
            }
            _ => None,
        }
    }

    /// Whether the error leaves no recovery path at all.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::UnsupportedPlatform(_))
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Unit Tests
// =============================================================================

#[test]
fn only_unsupported_platform_is_fatal() {
    assert!(Error::UnsupportedPlatform("plan9").is_fatal());
    assert!(!Error::DeviceNotFound.is_fatal());
    assert!(!Error::NoScriptFound.is_fatal());
    assert!(!Error::AlreadyOpen.is_fatal());
}

#[test]
fn too_large_reports_size_and_limit() {
    let message = Error::ScriptTooLarge {
        size: 9000,
        limit: 8188,
    }
    .to_string();
    assert!(message.contains("9000"));
    assert!(message.contains("8188"));
}

#[test]
fn connect_failure_carries_guidance() {
    let error = Error::ConnectFailed {
        port: "/dev/ttyACM0".into(),
        source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
    };
    assert!(error.guidance().unwrap().contains("reset button"));
    assert!(error.to_string().contains("/dev/ttyACM0"));
}
