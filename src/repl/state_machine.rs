//! Lifecycle of the live session with the board's MicroPython REPL.
//!
//! At most one session exists for the whole application. The following state
//! diagram summarizes the states and transitions it goes through:
//!
//! ```text
//!                 START
//!                   |
//!                   v
//!              .--------.   not found / connect failed
//!      .------>|  Idle  |<-------------------.
//!      |       '--------'                    |
//!      |           | open: port found        |
//!      |           v                         |
//!      |    .------------.                   |
//!      |    | Connecting |-------------------'
//!      |    '------------'
//!      |           | port open
//!      |           v
//!      |    .-----------.
//!      '----| Connected |
//!   close   '-----------'
//! ```
//!
//! Opening while not `Idle` fails with [`Error::AlreadyOpen`]; closing while
//! not `Connected` fails with [`Error::NotOpen`]. Neither touches the state.

use std::fmt;
use std::io::{self, Read, Write};

use log::trace;

use super::events::*;
use super::link::{Connector, Link};
use super::states::*;
use crate::error::{Error, Result};
use crate::locator::{DeviceHandle, DeviceLocator};

// =============================================================================
// Public Interface
// =============================================================================

/// Where the session currently is in its lifecycle.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Status {
    Idle,
    Connecting,
    Connected,
}

/// What [`DeviceSession::toggle`] ended up doing.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Toggled {
    Opened(DeviceHandle),
    Closed,
}

/// An open connection to the board.
pub struct Connection {
    handle: DeviceHandle,
    link: Box<dyn Link>,
}
impl Connection {
    pub(crate) fn new(handle: DeviceHandle, link: Box<dyn Link>) -> Self {
        Connection { handle, link }
    }

    /// The endpoint this connection was opened on.
    pub fn handle(&self) -> &DeviceHandle {
        &self.handle
    }

    /// Reads whatever the board already sent, up to `buf.len()` bytes, without
    /// blocking. Returns `0` when nothing is pending.
    pub fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // Only ask for what is already buffered so that the read returns
        // immediately.
        let available = self.link.bytes_to_read()? as usize;
        trace!("Bytes available to read: {}", available);
        if available == 0 || buf.is_empty() {
            return Ok(0);
        }
        let wanted = std::cmp::min(available, buf.len());
        self.link.read(&mut buf[..wanted])
    }

    /// Sends `bytes` to the board.
    pub fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.link.write_all(bytes)?;
        self.link.flush()
    }

    pub(crate) fn release(mut self) -> io::Result<()> {
        self.link.flush()
    }
}
impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("handle", &self.handle)
            .finish()
    }
}

/// The single live session of the application.
///
/// Owned by the [`Coordinator`](crate::Coordinator); the connection lives in
/// the `Connected` state and goes away with it.
#[derive(Debug)]
pub struct DeviceSession {
    sm: SessionStates,
}
impl DeviceSession {
    /// A session in the `Idle` state.
    pub fn new() -> Self {
        DeviceSession {
            sm: SessionStates::Idle(IdleState::default()),
        }
    }

    pub fn status(&self) -> Status {
        match self.sm {
            SessionStates::Idle(_) => Status::Idle,
            SessionStates::Connecting(_) => Status::Connecting,
            SessionStates::Connected(_) => Status::Connected,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status() == Status::Connected
    }

    /// Finds the board's serial port and opens it.
    ///
    /// Fails with [`Error::AlreadyOpen`] if a session exists, with
    /// [`Error::DeviceNotFound`] if no board is attached and with
    /// [`Error::ConnectFailed`] if the port could not be opened. The session
    /// is `Idle` after any failure.
    pub fn open(
        &mut self,
        locator: &dyn DeviceLocator,
        connector: &dyn Connector,
    ) -> Result<DeviceHandle> {
        if self.status() != Status::Idle {
            return Err(Error::AlreadyOpen);
        }
        let context = Context { locator, connector };

        // Idle -> Connecting | Idle, then Connecting -> Connected | Idle
        self.sm = self.take().step(&context);
        if let SessionStates::Connecting(_) = self.sm {
            self.sm = self.take().step(&context);
        }

        match &mut self.sm {
            SessionStates::Connected(state) => match &state.connection {
                Some(connection) => Ok(connection.handle().clone()),
                None => unreachable!(),
            },
            SessionStates::Idle(state) => Err(state.failure.take().unwrap_or(Error::DeviceNotFound)),
            SessionStates::Connecting(_) => unreachable!("open left the session connecting"),
        }
    }

    /// Releases the connection. Fails with [`Error::NotOpen`] when there is no
    /// session; otherwise always ends `Idle`.
    pub fn close(&mut self) -> Result<()> {
        match self.take() {
            SessionStates::Connected(mut state) => {
                self.sm = match state.release() {
                    Event::Disconnect(ev) => SessionStates::Idle(ev.into()),
                    event => unreachable!("illegal event {:#?} at current state {:#?}", event, state),
                };
                Ok(())
            }
            other => {
                self.sm = other;
                Err(Error::NotOpen)
            }
        }
    }

    /// Opens the session when `Idle`, closes it otherwise.
    pub fn toggle(
        &mut self,
        locator: &dyn DeviceLocator,
        connector: &dyn Connector,
    ) -> Result<Toggled> {
        if self.status() == Status::Idle {
            self.open(locator, connector).map(Toggled::Opened)
        } else {
            self.close().map(|_| Toggled::Closed)
        }
    }

    /// The open connection, if any.
    pub fn connection(&mut self) -> Option<&mut Connection> {
        match &mut self.sm {
            SessionStates::Connected(state) => state.connection.as_mut(),
            _ => None,
        }
    }

    fn take(&mut self) -> SessionStates {
        std::mem::replace(&mut self.sm, SessionStates::Idle(IdleState::default()))
    }
}
impl Default for DeviceSession {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Private stuff
// =============================================================================

/// Wraps the states of the live session into a simple enum, which can also be
/// used for pattern matching during state transitions.
#[derive(Debug)]
enum SessionStates {
    Idle(IdleState),
    Connecting(ConnectingState),
    Connected(ConnectedState),
}
impl SessionStates {
    /// Runs the current state and transitions on the event it fires. State
    /// transitions from events are implemented using the `From`/`Into`
    /// pattern.
    fn step(self, context: &Context<'_>) -> Self {
        match self {
            SessionStates::Idle(mut state) => {
                let event = state.run(context);
                match event {
                    Event::Connect(ev) => SessionStates::Connecting(ev.into()),
                    Event::NotFound(ev) => SessionStates::Idle(ev.into()),
                    _ => unreachable!("illegal event {:#?} at current state {:#?}", event, state),
                }
            }
            SessionStates::Connecting(mut state) => {
                let event = state.run(context);
                match event {
                    Event::Connected(ev) => SessionStates::Connected(ev.into()),
                    Event::ConnectFailed(ev) => SessionStates::Idle(ev.into()),
                    _ => unreachable!("illegal event {:#?} at current state {:#?}", event, state),
                }
            }
            // A connected session only moves on `close`.
            connected @ SessionStates::Connected(_) => connected,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
