//! Finding the attached micro:bit.
//!
//! The board shows up twice on the host: as a small USB drive (named
//! `MICROBIT`) onto which firmware images are copied, and as a USB serial port
//! connected to the running MicroPython REPL. Each host platform finds the
//! drive its own way, so there is one [`DeviceLocator`] implementation per
//! platform, picked once at startup with [`platform_locator`].
//!
//! When more than one board is attached, the match with the lexicographically
//! smallest path or port name wins.

mod mounts;
mod ports;

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{Error, Result};

pub use mounts::parse_mount_points;
pub use ports::{select_board_port, MICROBIT_PID, MICROBIT_VID};

/// Volume label of the board's drive.
pub const VOLUME_LABEL: &str = "MICROBIT";
/// File present at the root of the board's drive.
pub const ROOT_SIGNATURE: &str = "MICROBIT.HTM";

// =============================================================================
// Public Interface
// =============================================================================

/// One way of reaching the board, as found by a [`DeviceLocator`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DeviceHandle {
    /// Root directory of the mounted drive.
    MassStorage(PathBuf),
    /// Name of the serial port (`/dev/ttyACM0`, `COM3`, ...).
    SerialPort(String),
}
impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceHandle::MassStorage(path) => write!(f, "drive {}", path.display()),
            DeviceHandle::SerialPort(name) => write!(f, "serial port {}", name),
        }
    }
}

/// Finds the board. Both lookups are side-effect free and report `None` when
/// no board is attached; device presence changes at any time so callers ask
/// again for every operation instead of caching the answer.
pub trait DeviceLocator {
    /// Root of the board's mounted drive.
    fn find_mass_storage(&self) -> Option<PathBuf>;

    /// Name of the board's serial port.
    fn find_serial_port(&self) -> Option<String> {
        ports::find_board_port()
    }
}

/// Returns the locator for the host platform, or
/// [`Error::UnsupportedPlatform`] when `mucom` does not know how to find a
/// drive on it.
pub fn platform_locator() -> Result<Box<dyn DeviceLocator>> {
    locator_for(std::env::consts::OS)
}

fn locator_for(os: &'static str) -> Result<Box<dyn DeviceLocator>> {
    let locator: Box<dyn DeviceLocator> = match os {
        "linux" => Box::new(LinuxLocator::default()),
        "macos" => Box::new(MacOsLocator::default()),
        "windows" => Box::new(WindowsLocator),
        other => return Err(Error::UnsupportedPlatform(other)),
    };
    info!("using the {} device locator", os);
    Ok(locator)
}

/// Looks for the drive in the kernel's mount table.
#[derive(Debug, Clone)]
pub struct LinuxLocator {
    mount_table: PathBuf,
}
impl Default for LinuxLocator {
    fn default() -> Self {
        LinuxLocator {
            mount_table: PathBuf::from("/proc/self/mounts"),
        }
    }
}
impl DeviceLocator for LinuxLocator {
    fn find_mass_storage(&self) -> Option<PathBuf> {
        let table = match std::fs::read_to_string(&self.mount_table) {
            Ok(table) => table,
            Err(ref e) => {
                info!("error: {}", e.to_string());
                return None;
            }
        };
        let candidates = parse_mount_points(&table)
            .into_iter()
            .filter(|mount| mount.file_name().map_or(false, |name| name == VOLUME_LABEL));
        first_match(candidates)
    }
}

/// Looks for the drive among the volumes mounted under `/Volumes`.
#[derive(Debug, Clone)]
pub struct MacOsLocator {
    volumes: PathBuf,
}
impl Default for MacOsLocator {
    fn default() -> Self {
        MacOsLocator {
            volumes: PathBuf::from("/Volumes"),
        }
    }
}
impl DeviceLocator for MacOsLocator {
    fn find_mass_storage(&self) -> Option<PathBuf> {
        let entries = match std::fs::read_dir(&self.volumes) {
            Ok(entries) => entries,
            Err(ref e) => {
                info!("error: {}", e.to_string());
                return None;
            }
        };
        let candidates = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name().map_or(false, |name| name == VOLUME_LABEL)
                    || has_root_signature(path)
            });
        first_match(candidates)
    }
}

/// Probes every drive letter for the root-file signature.
#[derive(Debug, Clone, Copy)]
pub struct WindowsLocator;
impl DeviceLocator for WindowsLocator {
    fn find_mass_storage(&self) -> Option<PathBuf> {
        let candidates = (b'A'..=b'Z')
            .map(|letter| PathBuf::from(format!("{}:\\", letter as char)))
            .filter(|root| has_root_signature(root));
        first_match(candidates)
    }
}

// =============================================================================
// Private stuff
// =============================================================================

fn has_root_signature(root: &Path) -> bool {
    root.join(ROOT_SIGNATURE).is_file()
}

fn first_match(candidates: impl Iterator<Item = PathBuf>) -> Option<PathBuf> {
    let mut found: Vec<PathBuf> = candidates.collect();
    found.sort();
    if found.len() > 1 {
        info!(
            "{} micro:bit drives found, using {}",
            found.len(),
            found[0].display()
        );
    }
    let first = found.into_iter().next();
    debug!("micro:bit drive: {:?}", first);
    first
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linux_finds_the_microbit_mount() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("mounts");
        std::fs::write(
            &table,
            "sysfs /sys sysfs rw,nosuid 0 0\n\
             /dev/sda1 / ext4 rw,relatime 0 0\n\
             /dev/sdb /media/ada/MICROBIT vfat rw,nosuid 0 0\n",
        )
        .unwrap();
        let locator = LinuxLocator { mount_table: table };
        assert_eq!(
            locator.find_mass_storage(),
            Some(PathBuf::from("/media/ada/MICROBIT"))
        );
    }

    #[test]
    fn linux_picks_the_smallest_path_among_several_boards() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("mounts");
        std::fs::write(
            &table,
            "/dev/sdc /run/media/zoe/MICROBIT vfat rw 0 0\n\
             /dev/sdb /media/ada/MICROBIT vfat rw 0 0\n",
        )
        .unwrap();
        let locator = LinuxLocator { mount_table: table };
        assert_eq!(
            locator.find_mass_storage(),
            Some(PathBuf::from("/media/ada/MICROBIT"))
        );
    }

    #[test]
    fn linux_without_board_finds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("mounts");
        std::fs::write(&table, "/dev/sda1 / ext4 rw 0 0\n/dev/sdb /media/USBSTICK vfat rw 0 0\n")
            .unwrap();
        let locator = LinuxLocator { mount_table: table };
        assert_eq!(locator.find_mass_storage(), None);
    }

    #[test]
    fn linux_unreadable_mount_table_finds_nothing() {
        let locator = LinuxLocator {
            mount_table: PathBuf::from("/definitely/not/here/mounts"),
        };
        assert_eq!(locator.find_mass_storage(), None);
    }

    #[test]
    fn macos_matches_label_or_signature() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Macintosh HD")).unwrap();
        std::fs::create_dir(dir.path().join("MICROBIT 1")).unwrap();
        std::fs::write(dir.path().join("MICROBIT 1").join(ROOT_SIGNATURE), "").unwrap();
        let locator = MacOsLocator {
            volumes: dir.path().to_path_buf(),
        };
        assert_eq!(
            locator.find_mass_storage(),
            Some(dir.path().join("MICROBIT 1"))
        );

        std::fs::create_dir(dir.path().join("MICROBIT")).unwrap();
        assert_eq!(locator.find_mass_storage(), Some(dir.path().join("MICROBIT")));
    }

    #[test]
    fn handles_display_what_they_point_at() {
        assert_eq!(
            DeviceHandle::SerialPort("COM3".into()).to_string(),
            "serial port COM3"
        );
        assert_eq!(
            DeviceHandle::MassStorage(PathBuf::from("/media/MICROBIT")).to_string(),
            "drive /media/MICROBIT"
        );
    }

    #[test]
    fn unknown_host_is_unsupported() {
        assert!(matches!(
            locator_for("plan9"),
            Err(Error::UnsupportedPlatform("plan9"))
        ));
        assert!(locator_for("linux").is_ok());
        assert!(locator_for("macos").is_ok());
        assert!(locator_for("windows").is_ok());
    }
}
