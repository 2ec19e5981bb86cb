//! Non-blocking keyboard input.

use std::io::stdout;
use std::time::Duration;

use crossterm::{
    cursor::{Hide, MoveToColumn, Show},
    event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
    Result,
};

/// Waits up to `timeout` for a key press. The terminal must already be in raw
/// mode.
pub(crate) fn poll_key(timeout: Duration) -> Result<Option<KeyEvent>> {
    if poll(timeout)? {
        // It's guaranteed that read() wont block if `poll` returns `Ok(true)`
        if let Event::Key(key) = read()? {
            return Ok(Some(key));
        }
    }
    Ok(None)
}

/// Returns `true` when `Esc` was pressed within the next half second.
///
/// `Ctrl+C` is captured as a key event in raw mode and reported as `Err` with
/// [`std::io::ErrorKind::Interrupted`] so the caller can stop.
pub(crate) fn poll_escape() -> Result<bool> {
    enable_raw_mode()?;
    execute!(stdout(), Hide)?;
    let key = poll_key(Duration::from_millis(500));
    execute!(stdout(), MoveToColumn(0), Show)?;
    disable_raw_mode()?;

    match key? {
        Some(key) if is_interrupt(&key) => Err(std::io::Error::new(
            std::io::ErrorKind::Interrupted,
            "interrupted by Ctrl+C",
        )
        .into()),
        Some(key) => Ok(key.code == KeyCode::Esc),
        None => Ok(false),
    }
}

pub(crate) fn is_interrupt(key: &KeyEvent) -> bool {
    *key == KeyEvent {
        modifiers: KeyModifiers::CONTROL,
        code: KeyCode::Char('c'),
    }
}
