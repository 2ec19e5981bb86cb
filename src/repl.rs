//! Live session with the MicroPython REPL running on the board.
//!
//! **Example** - Opening, using and closing the session:
//! ```no_run
//! use mucom::repl::{DeviceSession, SerialConnector};
//!
//! # fn main() -> mucom::Result<()> {
//! let locator = mucom::platform_locator()?;
//! let connector = SerialConnector::new(mucom::SettingsBuilder::new().finalize());
//! let mut session = DeviceSession::new();
//! session.open(locator.as_ref(), &connector)?;
//! if let Some(connection) = session.connection() {
//!     connection.write_all(b"print('hello')\r")?;
//! }
//! session.close()?;
//! # Ok(())
//! # }
//! ```

mod events;
mod link;
mod state_machine;
mod states;

pub use link::{Connector, Link, SerialConnector, SerialLink};
pub use state_machine::{Connection, DeviceSession, Status, Toggled};

#[cfg(test)]
pub(crate) use state_machine::fakes;
