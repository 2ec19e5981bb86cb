//! States for the live session state machine.
//!
//! This modules is private and restricted to the [`repl`](crate::repl) scope.
//! The public interface of the state machine is provided by
//! [`repl`](crate::repl).
//!
//! Refer to the [`state_machine`](super::state_machine) module for an overview
//! of states, events and transitions.

use log::{info, warn};

use super::events::*;
use super::link::Connector;
use super::state_machine::Connection;
use crate::error::Error;
use crate::locator::{DeviceHandle, DeviceLocator};

// =============================================================================
// Crate-Public Interface
// =============================================================================

/// What a state needs to do its work: where to look for the board and how to
/// open it.
pub(crate) struct Context<'a> {
    pub locator: &'a dyn DeviceLocator,
    pub connector: &'a dyn Connector,
}

/// Trait adding the ability for a state to be `run` after a transition into it.
pub(crate) trait Runnable {
    /// A state implements this method so it can be `run` after the state
    /// machine transitions into it.
    ///
    /// During this call, the state can do any work that needs to be done and
    /// when finished, requests a transition to a `new state` by returning the
    /// appropriate `event`. The `state` and the `event` are consumed to create
    /// the `new state` using the corresponding [`From`] trait implementation.
    fn run(&mut self, context: &Context<'_>) -> Event;
}

// Idle State ==================================================================

/// No live session. Running it looks for the board:
///
///  * **[`ConnectEvent`] => [`ConnectingState`]** when a serial port was
///    found,
///  * **[`NotFoundEvent`] => [`IdleState`]** otherwise.
///
/// `failure` keeps the reason the last attempt to connect ended here, until
/// the caller takes it.
#[derive(Debug, Default)]
pub(crate) struct IdleState {
    pub failure: Option<Error>,
}
impl Runnable for IdleState {
    fn run(&mut self, context: &Context<'_>) -> Event {
        info!("=> Idle");
        match context.locator.find_serial_port() {
            Some(port) => Event::Connect(ConnectEvent { port }),
            None => Event::NotFound(NotFoundEvent {}),
        }
    }
}

// Connecting State ============================================================

/// Opening the board's serial port.
///
///  * **[`ConnectedEvent`] => [`ConnectedState`]** when the port is open,
///  * **[`ConnectFailedEvent`] => [`IdleState`]** when it could not be opened.
#[derive(Debug)]
pub(crate) struct ConnectingState {
    pub port: String,
}
impl Runnable for ConnectingState {
    fn run(&mut self, context: &Context<'_>) -> Event {
        info!("=> Connecting to {}", self.port);
        match context.connector.connect(&self.port) {
            Ok(link) => Event::Connected(ConnectedEvent {
                connection: Connection::new(DeviceHandle::SerialPort(self.port.clone()), link),
            }),
            Err(error) => Event::ConnectFailed(ConnectFailedEvent {
                port: self.port.clone(),
                error,
            }),
        }
    }
}

// Connected State =============================================================

/// A live session is open. Nothing runs on its own here; the state is left
/// through [`ConnectedState::release`]:
///
///  * **[`DisconnectEvent`] => [`IdleState`]**.
#[derive(Debug)]
pub(crate) struct ConnectedState {
    /// The open connection. Consumed upon release.
    pub connection: Option<Connection>,
}
impl ConnectedState {
    /// Releases the connection. Releasing cannot fail from the user's point of
    /// view: errors flushing the port are logged and otherwise ignored.
    pub fn release(&mut self) -> Event {
        info!("=> Disconnecting");
        match self.connection.take() {
            Some(connection) => {
                let port = connection.handle().to_string();
                if let Err(ref e) = connection.release() {
                    warn!("error while releasing {}: {}", port, e);
                }
                Event::Disconnect(DisconnectEvent { port })
            }
            // We should never reach here!
            None => unreachable!(),
        }
    }
}

// -----------------------------------------------------------------------------
// State from Event transitions
// -----------------------------------------------------------------------------

impl From<ConnectEvent> for ConnectingState {
    fn from(event: ConnectEvent) -> ConnectingState {
        ConnectingState { port: event.port }
    }
}

impl From<NotFoundEvent> for IdleState {
    fn from(_: NotFoundEvent) -> IdleState {
        IdleState {
            failure: Some(Error::DeviceNotFound),
        }
    }
}

impl From<ConnectedEvent> for ConnectedState {
    fn from(event: ConnectedEvent) -> ConnectedState {
        ConnectedState {
            connection: Some(event.connection),
        }
    }
}

impl From<ConnectFailedEvent> for IdleState {
    fn from(event: ConnectFailedEvent) -> IdleState {
        IdleState {
            failure: Some(Error::ConnectFailed {
                port: event.port,
                source: event.error,
            }),
        }
    }
}

impl From<DisconnectEvent> for IdleState {
    fn from(event: DisconnectEvent) -> IdleState {
        info!("{} released", event.port);
        IdleState { failure: None }
    }
}
