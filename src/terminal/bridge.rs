//! Bridges the terminal to the live session: what the board prints goes to
//! stdout, keys go to the board.

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use hexplay::HexViewBuilder;
use log::{debug, info, log_enabled, trace, Level::Debug};

use super::keyboard::{is_interrupt, poll_key};
use crate::repl::Connection;

/// Ctrl+C, interrupts whatever the board is running.
const INTERRUPT: u8 = 0x03;

/// Runs the bridge until `Esc` is pressed or the connection fails.
pub fn run(connection: &mut Connection) -> io::Result<()> {
    info!("=> Bridging {}", connection.handle());
    enable_raw_mode().map_err(to_io)?;
    let result = pump(connection);
    disable_raw_mode().map_err(to_io)?;
    println!();
    result
}

fn pump(connection: &mut Connection) -> io::Result<()> {
    // We'll read 4K maximum each time
    let mut buf = vec![0; 4096];
    let mut stdout = io::stdout();
    loop {
        let count = connection.read_available(&mut buf)?;
        if count > 0 {
            trace!("{} bytes from the board", count);
            stdout.write_all(&buf[..count])?;
            stdout.flush()?;

            // Dump the received data in a hex table for debugging
            if log_enabled!(Debug) {
                let view = HexViewBuilder::new(&buf[..count])
                    .address_offset(0)
                    .row_width(16)
                    .finish();
                debug!("\r\n{}", view);
            }
        }

        match poll_key(Duration::from_millis(20)).map_err(to_io)? {
            Some(key) if key.code == KeyCode::Esc => return Ok(()),
            Some(key) => {
                if let Some(bytes) = key_bytes(&key) {
                    connection.write_all(&bytes)?;
                }
            }
            None => thread::sleep(Duration::from_millis(10)),
        }
    }
}

/// What the board expects to receive for `key`, if anything.
fn key_bytes(key: &KeyEvent) -> Option<Vec<u8>> {
    if is_interrupt(key) {
        return Some(vec![INTERRUPT]);
    }
    let bytes = match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            // Ctrl+A..Ctrl+Z map to 0x01..0x1A (Ctrl+D soft reboots, Ctrl+E
            // enters paste mode)
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() {
                vec![c as u8 - b'a' + 1]
            } else {
                return None;
            }
        }
        KeyCode::Char(c) => {
            let mut utf8 = [0; 4];
            c.encode_utf8(&mut utf8).as_bytes().to_vec()
        }
        KeyCode::Enter => b"\r".to_vec(),
        KeyCode::Backspace => b"\x08".to_vec(),
        KeyCode::Tab => b"\t".to_vec(),
        KeyCode::Delete => b"\x1b[3~".to_vec(),
        KeyCode::Up => b"\x1b[A".to_vec(),
        KeyCode::Down => b"\x1b[B".to_vec(),
        KeyCode::Right => b"\x1b[C".to_vec(),
        KeyCode::Left => b"\x1b[D".to_vec(),
        KeyCode::Home => b"\x1b[H".to_vec(),
        KeyCode::End => b"\x1b[F".to_vec(),
        _ => return None,
    };
    Some(bytes)
}

fn to_io(error: crossterm::ErrorKind) -> io::Error {
    match error {
        crossterm::ErrorKind::IoError(e) => e,
        other => io::Error::new(io::ErrorKind::Other, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_c_interrupts_the_board() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_bytes(&key), Some(vec![0x03]));
    }

    #[test]
    fn ctrl_d_soft_reboots() {
        let key = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL);
        assert_eq!(key_bytes(&key), Some(vec![0x04]));
    }

    #[test]
    fn printable_keys_are_utf8() {
        assert_eq!(key_bytes(&KeyCode::Char('x').into()), Some(b"x".to_vec()));
        assert_eq!(
            key_bytes(&KeyCode::Char('é').into()),
            Some("é".as_bytes().to_vec())
        );
    }

    #[test]
    fn editing_keys() {
        assert_eq!(key_bytes(&KeyCode::Enter.into()), Some(b"\r".to_vec()));
        assert_eq!(key_bytes(&KeyCode::Up.into()), Some(b"\x1b[A".to_vec()));
        assert_eq!(key_bytes(&KeyCode::Backspace.into()), Some(vec![0x08]));
        assert_eq!(key_bytes(&KeyCode::F(5).into()), None);
    }
}
