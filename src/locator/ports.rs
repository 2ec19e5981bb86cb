//! Serial port enumeration.

use log::{debug, info, trace};
use serialport::{available_ports, SerialPortInfo, SerialPortType};

/// USB vendor id of the micro:bit's interface chip (ARM mbed).
pub const MICROBIT_VID: u16 = 0x0D28;
/// USB product id of the micro:bit's interface chip (DAPLink CMSIS-DAP).
pub const MICROBIT_PID: u16 = 0x0204;

/// Picks the board's port among `ports`: USB ports reporting the micro:bit's
/// vendor and product ids, smallest port name first.
pub fn select_board_port(ports: &[SerialPortInfo]) -> Option<String> {
    let mut matches: Vec<&str> = ports
        .iter()
        .filter(|p| match &p.port_type {
            // USB ports give us the vendor/product of the serial controller
            SerialPortType::UsbPort(info) => {
                trace!("{}: {:04x}:{:04x}", p.port_name, info.vid, info.pid);
                info.vid == MICROBIT_VID && info.pid == MICROBIT_PID
            }
            _ => false,
        })
        .map(|p| p.port_name.as_str())
        .collect();
    matches.sort_unstable();
    if matches.len() > 1 {
        info!("{} micro:bit ports found, using {}", matches.len(), matches[0]);
    }
    matches.first().map(|name| name.to_string())
}

/// Enumerates the serial ports of the system and selects the board's.
pub(super) fn find_board_port() -> Option<String> {
    match available_ports() {
        Ok(ports) => {
            debug!("{} serial port(s) available", ports.len());
            select_board_port(&ports)
        }
        Err(ref e) => {
            info!("error: {}", e.to_string());
            None
        }
    }
}
