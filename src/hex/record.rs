//! Single Intel HEX records.
//!
//! A record is one line of the image:
//!
//! ```text
//! :LLAAAATTDD...DDCC
//!  |  |   | |      '- checksum: two's complement of the sum of all bytes
//!  |  |   | '-------- payload
//!  |  |   '---------- record type
//!  |  '-------------- 16-bit address offset
//!  '----------------- payload length
//! ```

use std::fmt::{self, Write};

use crate::error::{Error, Result};

/// Largest payload a single record can describe.
pub const MAX_RECORD_PAYLOAD: usize = 0xFF;

// =============================================================================
// Crate-Public Interface
// =============================================================================

/// The record types defined by the format.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RecordType {
    Data,
    EndOfFile,
    ExtendedSegmentAddress,
    StartSegmentAddress,
    ExtendedLinearAddress,
    StartLinearAddress,
}
impl RecordType {
    fn code(self) -> u8 {
        match self {
            RecordType::Data => 0x00,
            RecordType::EndOfFile => 0x01,
            RecordType::ExtendedSegmentAddress => 0x02,
            RecordType::StartSegmentAddress => 0x03,
            RecordType::ExtendedLinearAddress => 0x04,
            RecordType::StartLinearAddress => 0x05,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0x00 => RecordType::Data,
            0x01 => RecordType::EndOfFile,
            0x02 => RecordType::ExtendedSegmentAddress,
            0x03 => RecordType::StartSegmentAddress,
            0x04 => RecordType::ExtendedLinearAddress,
            0x05 => RecordType::StartLinearAddress,
            _ => return None,
        })
    }
}

/// One decoded record.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Record {
    pub kind: RecordType,
    /// The 16-bit address field. Only meaningful for data records, where it is
    /// combined with the current extended address.
    pub offset: u16,
    pub payload: Vec<u8>,
}
impl Record {
    /// A data record. The payload must not exceed [`MAX_RECORD_PAYLOAD`].
    pub fn data(offset: u16, payload: &[u8]) -> Self {
        debug_assert!(payload.len() <= MAX_RECORD_PAYLOAD);
        Record {
            kind: RecordType::Data,
            offset,
            payload: payload.to_vec(),
        }
    }

    /// The record setting bits 16..32 of subsequent data record addresses.
    pub fn extended_linear_address(upper: u16) -> Self {
        Record {
            kind: RecordType::ExtendedLinearAddress,
            offset: 0,
            payload: upper.to_be_bytes().to_vec(),
        }
    }

    pub fn end_of_file() -> Self {
        Record {
            kind: RecordType::EndOfFile,
            offset: 0,
            payload: Vec::new(),
        }
    }

    /// Parse one line. `line` is the 1-based line number used in errors.
    pub fn parse(text: &str, line: usize) -> Result<Self> {
        let invalid = |reason| Error::InvalidRecord { line, reason };

        let digits = text
            .strip_prefix(':')
            .ok_or_else(|| invalid("missing ':' start code"))?;
        if digits.len() % 2 != 0 {
            return Err(invalid("odd number of hex digits"));
        }
        let bytes = (0..digits.len())
            .step_by(2)
            .map(|i| {
                digits
                    .get(i..i + 2)
                    .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            })
            .collect::<Option<Vec<u8>>>()
            .ok_or_else(|| invalid("not a hexadecimal digit"))?;

        // length + address (2) + type + checksum
        if bytes.len() < 5 {
            return Err(invalid("record is too short"));
        }
        let length = bytes[0] as usize;
        if bytes.len() != length + 5 {
            return Err(invalid("length does not match the payload"));
        }
        if checksum(&bytes[..bytes.len() - 1]) != bytes[bytes.len() - 1] {
            return Err(invalid("checksum mismatch"));
        }
        let kind = RecordType::from_code(bytes[3]).ok_or_else(|| invalid("unknown record type"))?;

        Ok(Record {
            kind,
            offset: u16::from_be_bytes([bytes[1], bytes[2]]),
            payload: bytes[4..4 + length].to_vec(),
        })
    }

    /// The payload interpreted as a 16-bit big-endian value, as carried by the
    /// address records.
    pub fn payload_u16(&self) -> Option<u16> {
        match self.payload.as_slice() {
            [high, low] => Some(u16::from_be_bytes([*high, *low])),
            _ => None,
        }
    }

    fn raw(&self) -> Vec<u8> {
        let mut raw = Vec::with_capacity(self.payload.len() + 4);
        raw.push(self.payload.len() as u8);
        raw.extend_from_slice(&self.offset.to_be_bytes());
        raw.push(self.kind.code());
        raw.extend_from_slice(&self.payload);
        raw
    }
}
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self.raw();
        f.write_char(':')?;
        for byte in &raw {
            write!(f, "{:02X}", byte)?;
        }
        write!(f, "{:02X}", checksum(&raw))
    }
}

/// Two's complement of the byte sum.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes
        .iter()
        .fold(0u8, |sum, byte| sum.wrapping_add(*byte))
        .wrapping_neg()
}

// =============================================================================
// Unit Tests
// =============================================================================
