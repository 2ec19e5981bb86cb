//! Events for the live session state machine.
//!
//! This modules is private and restricted to the [`repl`](crate::repl) scope.
//! The public interface of the state machine is provided by
//! [`repl`](crate::repl).
//!
//! Refer to the [`state_machine`](super::state_machine) module for an overview
//! of states, events and transitions.

use std::io;

use super::state_machine::Connection;

// =============================================================================
// Crate-Public Interface
// =============================================================================

// ConnectEvent ================================================================

/// Event fired from the `Idle` state when the locator found the board's serial
/// port. Triggers the transition to the `Connecting` state.
#[derive(Debug)]
pub(crate) struct ConnectEvent {
    pub port: String,
}

// NotFoundEvent ===============================================================

/// Event fired from the `Idle` state when no board is attached. The machine
/// stays `Idle`, remembering why.
#[derive(Debug)]
pub(crate) struct NotFoundEvent {}

// ConnectedEvent ==============================================================

/// Event fired from the `Connecting` state once the port is open. The open
/// connection is moved into the `Connected` state.
#[derive(Debug)]
pub(crate) struct ConnectedEvent {
    pub connection: Connection,
}

// ConnectFailedEvent ==========================================================

/// Event fired from the `Connecting` state when the port could not be opened
/// (permissions, board resetting, ...). Triggers the transition back to
/// `Idle`.
#[derive(Debug)]
pub(crate) struct ConnectFailedEvent {
    pub port: String,
    pub error: io::Error,
}

// DisconnectEvent =============================================================

/// Event fired from the `Connected` state once the connection was released.
/// Triggers the transition back to `Idle`.
#[derive(Debug)]
pub(crate) struct DisconnectEvent {
    pub port: String,
}

// Events enum ==================================================================

/// Events that can be triggered within the live session state machine.
///
/// Each possible value holds an `event`, which in turn may hold additional data
/// for the state transition. Such data is passed by the origin state for
/// potential use by the target state.
#[derive(Debug)]
pub(crate) enum Event {
    Connect(ConnectEvent),
    NotFound(NotFoundEvent),
    Connected(ConnectedEvent),
    ConnectFailed(ConnectFailedEvent),
    Disconnect(DisconnectEvent),
}
