//! Waiting for the board to show up.

use std::{
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::Duration,
};

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};

use super::keyboard::poll_escape;
use crate::locator::DeviceLocator;

/// What to wait for.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Awaited {
    /// The board's USB drive, for flashing.
    Drive,
    /// The board's serial port, for the REPL.
    SerialPort,
}
impl Awaited {
    fn is_present(self, locator: &dyn DeviceLocator) -> bool {
        match self {
            Awaited::Drive => locator.find_mass_storage().is_some(),
            Awaited::SerialPort => locator.find_serial_port().is_some(),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Awaited::Drive => "the micro:bit drive",
            Awaited::SerialPort => "the micro:bit serial port",
        }
    }
}

/// Checks for the board, and if it is not immediately there, keeps checking
/// every second with a spinner until it shows up or the user presses `Esc`.
///
/// Returns `true` when the wait was cancelled.
pub fn wait_for_board(locator: &dyn DeviceLocator, awaited: Awaited) -> bool {
    if awaited.is_present(locator) {
        return false;
    }

    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(120);
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠚", "⠞", "⠖", "⠦", "⠴", "⠲", "⠳", "⠓"])
            .template("[MU] {spinner:.blue} {msg}"),
    );

    // The escape key is polled on its own thread. `cancel` goes from that
    // thread to this one, `done` the other way round once the board is there.
    let (cancel_tx, cancel_rx) = mpsc::channel();
    let (done_tx, done_rx) = mpsc::channel::<()>();

    let escape_thread = thread::spawn(move || loop {
        if done_rx.try_recv().is_ok() {
            break;
        }
        match poll_escape() {
            Ok(true) => {
                let _ = cancel_tx.send(());
                break;
            }
            Ok(false) => {}
            Err(e) => {
                debug!("stopped polling the keyboard: {}", e);
                let _ = cancel_tx.send(());
                break;
            }
        }
    });

    let waiting_period = 1;
    let mut waited = 0;
    let cancelled = loop {
        if awaited.is_present(locator) {
            let _ = done_tx.send(());
            pb.finish_with_message(format!("👍 {} is ready", style(awaited.describe()).green()));
            break false;
        }

        pb.set_message(format!(
            "[{:03}s] ⏳ Waiting for {} (ESC to cancel)...",
            style(waited).dim(),
            style(awaited.describe()).cyan()
        ));

        match cancel_rx.recv_timeout(Duration::from_secs(waiting_period)) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                pb.finish_with_message(format!(
                    "❌ Waiting for {} cancelled after {} seconds",
                    style(awaited.describe()).cyan(),
                    style(waited).dim()
                ));
                break true;
            }
            Err(RecvTimeoutError::Timeout) => {}
        }
        waited += waiting_period;
    };

    if escape_thread.join().is_err() {
        info!("the keyboard thread panicked");
    }
    cancelled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repl::fakes::FakeLocator;
    use std::path::PathBuf;

    #[test]
    fn present_board_needs_no_wait() {
        let locator = FakeLocator {
            drive: Some(PathBuf::from("/media/MICROBIT")),
            port: None,
        };
        assert!(Awaited::Drive.is_present(&locator));
        assert!(!Awaited::SerialPort.is_present(&locator));
        assert!(!wait_for_board(&locator, Awaited::Drive));
    }
}
