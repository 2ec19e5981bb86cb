//! Mucom is the core of a small editor for MicroPython on the BBC micro:bit.
//!
//! It finds the board when it is plugged in, turns a script into a firmware
//! image the board can boot (and recovers the script from such an image),
//! remembers which scripts were open between runs and keeps a live session
//! with the MicroPython REPL running on the board.
//!
//! The user interface is not part of the library. Anything implementing
//! [`View`] can drive the [`Coordinator`], which is where every user action
//! lands:
//!
//! * **flash**: embed the current script into the MicroPython runtime image
//!   and copy the result onto the board's USB drive,
//! * **load** and **save**: scripts live as `.py` files in the projects
//!   directory; loading a `.hex` image recovers the script embedded in it,
//! * **REPL**: open or close the serial connection to the board,
//! * **quit**: remember the open scripts for next time.
//!
//! The live session is a state machine in the same style as the rest of the
//! crate's stateful parts: typed **states**, typed **events** carrying the data
//! from one state to the next, and transitions implemented as `From` conversions
//! from an event into the next state. Only the transitions for which a `From`
//! implementation exists are possible, and using a state after it was left is
//! a compile-time error since transitioning consumes it.
//!
//! **Example** - Flashing the current document:
//! ```no_run
//! use std::path::{Path, PathBuf};
//! use mucom::{Confirmation, Coordinator, Document, SettingsBuilder, View};
//!
//! struct OneShot(Vec<Document>);
//! impl View for OneShot {
//!     fn add_tab(&mut self, path: Option<PathBuf>, text: String) {
//!         self.0.push(Document::new(path, text));
//!     }
//!     fn current_tab(&mut self) -> Option<&mut Document> {
//!         self.0.last_mut()
//!     }
//!     fn all_open_documents(&self) -> Vec<&Document> {
//!         self.0.iter().collect()
//!     }
//!     fn get_load_path(&mut self, _: &Path) -> Option<PathBuf> {
//!         None
//!     }
//!     fn get_save_path(&mut self, _: &Path) -> Option<PathBuf> {
//!         None
//!     }
//!     fn show_message(&mut self, text: &str, _: Option<&str>) {
//!         println!("{}", text);
//!     }
//!     fn show_confirmation(&mut self, _: &str) -> Confirmation {
//!         Confirmation::Confirmed
//!     }
//! }
//!
//! # fn main() -> mucom::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .runtime_image("firmware/micropython.hex")
//!     .finalize();
//! let mut coordinator = Coordinator::for_host(settings)?;
//! let mut view = OneShot(vec![]);
//! view.add_tab(None, "from microbit import *\ndisplay.scroll('hi')".into());
//! coordinator.flash(&mut view);
//! # Ok(())
//! # }
//! ```

pub mod editor;
pub mod error;
pub mod fs;
pub mod hex;
pub mod locator;
pub mod repl;
pub mod settings;
pub mod store;
pub mod terminal;

pub use editor::{Confirmation, Coordinator, Document, Outcome, View};
pub use error::{Error, Result};
pub use locator::{platform_locator, DeviceHandle, DeviceLocator};
pub use settings::{Settings, SettingsBuilder};
