//! Settings related to the micro:bit serial link and the editor's
//! directories.
//!
//! Use the [builder](https://doc.rust-lang.org/1.0.0/style/ownership/builders.html)
//! pattern to set the configurable values.

use std::path::{Path, PathBuf};

pub use serialport::{DataBits, FlowControl, Parity, StopBits};

/// Name of the session file kept in the data directory.
pub const SESSION_FILE_NAME: &str = "tabs.json";

// =============================================================================
// Public Interface
// =============================================================================

/// Groups all settings used by `mucom` and acts as a
/// [builder](https://doc.rust-lang.org/1.0.0/style/ownership/builders.html)
/// for the settings.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Settings {
    /// The baud rate in symbols-per-second.
    pub baud_rate: u32,
    /// Number of bits used to represent a character sent on the line.
    pub data_bits: DataBits,
    /// The type of signalling to use for controlling data transfer.
    pub flow_control: FlowControl,
    /// The type of parity to use for error checking.
    pub parity: Parity,
    /// Number of bits to use to signal the end of a character.
    pub stop_bits: StopBits,

    /// Default location offered when loading and saving scripts. Created at
    /// startup if it does not exist.
    pub projects_dir: PathBuf,
    /// Per-user data directory holding the session file. Created at startup if
    /// it does not exist.
    pub data_dir: PathBuf,

    /// Path to the MicroPython runtime `.hex` onto which scripts are embedded
    /// before flashing. Flashing is refused while it is not set.
    pub runtime_image: Option<PathBuf>,

    /// Restrict creation of `Settings` instances unless through the
    /// `SettingsBuilder`.
    #[doc(hidden)]
    _private_use_builder: (),
}
impl Settings {
    /// Full path of the persisted editor session.
    pub fn session_file(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE_NAME)
    }
}

/// The builder for the `Settings` values.
///
/// All values are optional and have default values that will be used if not
/// explicitly set.
///
/// **Example**
///
/// ```
/// let settings = mucom::SettingsBuilder::new()
///     .runtime_image("firmware.hex")
///     .finalize();
/// assert_eq!(settings.baud_rate, 115_200);
/// ```
pub struct SettingsBuilder {
    settings: Settings,
}
impl SettingsBuilder {
    /// Start building the settings using default values: the micro:bit line
    /// settings, `~/micropython` for projects and the platform's user data
    /// directory for the session.
    pub fn new() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let data = dirs::data_dir().unwrap_or_else(|| home.clone());
        SettingsBuilder {
            settings: Settings {
                baud_rate: 115_200,
                data_bits: DataBits::Eight,
                flow_control: FlowControl::None,
                parity: Parity::None,
                stop_bits: StopBits::One,
                projects_dir: home.join("micropython"),
                data_dir: data.join("mu"),
                runtime_image: None,
                _private_use_builder: (),
            },
        }
    }

    /// Set the baud rate in symbols-per-second
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.settings.baud_rate = baud_rate;
        self
    }

    /// Set the number of bits used to represent a character sent on the line
    pub fn data_bits(mut self, data_bits: DataBits) -> Self {
        self.settings.data_bits = data_bits;
        self
    }

    /// Set the type of signalling to use for controlling data transfer
    pub fn flow_control(mut self, flow_control: FlowControl) -> Self {
        self.settings.flow_control = flow_control;
        self
    }

    /// Set the type of parity to use for error checking
    pub fn parity(mut self, parity: Parity) -> Self {
        self.settings.parity = parity;
        self
    }

    /// Set the number of bits to use to signal the end of a character
    pub fn stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.settings.stop_bits = stop_bits;
        self
    }

    /// Set the directory offered by default in load/save prompts
    pub fn projects_dir(mut self, projects_dir: impl AsRef<Path>) -> Self {
        self.settings.projects_dir = projects_dir.as_ref().to_path_buf();
        self
    }

    /// Set the directory where the session file is kept
    pub fn data_dir(mut self, data_dir: impl AsRef<Path>) -> Self {
        self.settings.data_dir = data_dir.as_ref().to_path_buf();
        self
    }

    /// Set the path to the MicroPython runtime image
    pub fn runtime_image(mut self, runtime_image: impl AsRef<Path>) -> Self {
        self.settings.runtime_image = Some(runtime_image.as_ref().to_path_buf());
        self
    }

    pub fn finalize(self) -> Settings {
        self.settings
    }
}
impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[test]
fn all_default() {
    let settings = SettingsBuilder::new().finalize();
    assert_eq!(settings.baud_rate, 115_200);
    assert_eq!(settings.data_bits, DataBits::Eight);
    assert_eq!(settings.flow_control, FlowControl::None);
    assert_eq!(settings.parity, Parity::None);
    assert_eq!(settings.stop_bits, StopBits::One);
    assert_eq!(settings.runtime_image, None);
    assert!(settings.projects_dir.ends_with("micropython"));
    assert!(settings.data_dir.ends_with("mu"));
}

#[test]
fn baud_rate() {
    let baud_rate = 9_600;
    let settings = SettingsBuilder::new().baud_rate(baud_rate).finalize();
    assert_eq!(settings.baud_rate, baud_rate);
}

#[test]
fn data_bits() {
    let data_bits = DataBits::Seven;
    let settings = SettingsBuilder::new().data_bits(data_bits).finalize();
    assert_eq!(settings.data_bits, data_bits);
}

#[test]
fn flow_control() {
    let flow_control = FlowControl::Hardware;
    let settings = SettingsBuilder::new().flow_control(flow_control).finalize();
    assert_eq!(settings.flow_control, flow_control);
}

#[test]
fn stop_bits() {
    let stop_bits = StopBits::Two;
    let settings = SettingsBuilder::new().stop_bits(stop_bits).finalize();
    assert_eq!(settings.stop_bits, stop_bits);
}

#[test]
fn parity() {
    let parity = Parity::Even;
    let settings = SettingsBuilder::new().parity(parity).finalize();
    assert_eq!(settings.parity, parity);
}

#[test]
fn runtime_image() {
    let settings = SettingsBuilder::new()
        .runtime_image("firmware.hex")
        .finalize();
    assert_eq!(settings.runtime_image.unwrap(), PathBuf::from("firmware.hex"));
}

#[test]
fn session_file_lives_in_data_dir() {
    let settings = SettingsBuilder::new().data_dir("/tmp/mu-data").finalize();
    assert_eq!(
        settings.session_file(),
        PathBuf::from("/tmp/mu-data").join(SESSION_FILE_NAME)
    );
}
