//! Embedding MicroPython scripts into firmware images and getting them back.
//!
//! The micro:bit bootloader takes firmware as an Intel HEX image. The
//! MicroPython runtime looks for a script at a fixed flash address
//! ([`SCRIPT_ADDRESS`]), stored as:
//!
//! ```text
//! .----.--------------.------------------.----------------.
//! | MP | length (u16) |   script bytes   | zero padding   |
//! '----'--------------'------------------'----------------'
//!   2         2 (LE)      `length` bytes    to 16 bytes
//! ```
//!
//! [`embed`] appends that region, 16 bytes per data record, right before the
//! runtime's end-of-file record. [`extract`] finds the region in an image and
//! returns the script. The script is an opaque byte sequence in both
//! directions.
//!
//! **Example**
//! ```
//! # fn main() -> mucom::Result<()> {
//! let runtime = b":0400000012345678E8\n:00000001FF\n";
//! let image = mucom::hex::embed(runtime, b"display.scroll('hi')")?;
//! assert_eq!(mucom::hex::extract(&image)?, b"display.scroll('hi')");
//! # Ok(())
//! # }
//! ```

mod record;

use log::{debug, trace};

use crate::error::{Error, Result};

pub use record::{checksum, Record, RecordType};

/// Absolute flash address of the script region.
pub const SCRIPT_ADDRESS: u32 = 0x3E000;
/// Size of the script region, header included.
pub const SCRIPT_REGION_SIZE: usize = 8192;
/// Largest script that fits in the region.
pub const MAX_SCRIPT_SIZE: usize = SCRIPT_REGION_SIZE - HEADER_SIZE;

const MAGIC: &[u8; 2] = b"MP";
const HEADER_SIZE: usize = 4;
const BYTES_PER_RECORD: usize = 16;

// =============================================================================
// Public Interface
// =============================================================================

/// Builds the image flashed onto the board: `base_image` with `script`
/// embedded in the script region.
///
/// Fails with [`Error::ScriptTooLarge`] when the script exceeds
/// [`MAX_SCRIPT_SIZE`], and with [`Error::InvalidRecord`] when the base image
/// is not a well formed image terminated by an end-of-file record.
pub fn embed(base_image: &[u8], script: &[u8]) -> Result<Vec<u8>> {
    if script.len() > MAX_SCRIPT_SIZE {
        return Err(Error::ScriptTooLarge {
            size: script.len(),
            limit: MAX_SCRIPT_SIZE,
        });
    }

    let lines = records(base_image)?;
    let eof = lines
        .iter()
        .position(|line| line.record.kind == RecordType::EndOfFile)
        .ok_or(Error::InvalidRecord {
            line: lines.last().map_or(1, |line| line.number + 1),
            reason: "missing end-of-file record",
        })?;

    let script_lines = script_records(script);
    debug!(
        "embedding {} script bytes as {} records before line {}",
        script.len(),
        script_lines.len(),
        lines[eof].number
    );

    let mut image = String::with_capacity(base_image.len() + script_lines.len() * 45);
    for line in &lines[..eof] {
        image.push_str(line.text);
        image.push('\n');
    }
    for record in &script_lines {
        image.push_str(&record.to_string());
        image.push('\n');
    }
    for line in &lines[eof..] {
        image.push_str(line.text);
        image.push('\n');
    }
    Ok(image.into_bytes())
}

/// Recovers the script embedded in `image`.
///
/// Fails with [`Error::NoScriptFound`] when the image has no complete script
/// region (a bare runtime for example), and with [`Error::InvalidRecord`] when
/// a line of the image is not a valid record.
pub fn extract(image: &[u8]) -> Result<Vec<u8>> {
    let mut region = vec![None; SCRIPT_REGION_SIZE];
    let mut upper: u32 = 0;

    for Line { number, record, .. } in records(image)? {
        match record.kind {
            RecordType::ExtendedLinearAddress | RecordType::ExtendedSegmentAddress => {
                let value = record.payload_u16().ok_or(Error::InvalidRecord {
                    line: number,
                    reason: "address record must carry two bytes",
                })? as u32;
                upper = if record.kind == RecordType::ExtendedLinearAddress {
                    value << 16
                } else {
                    value << 4
                };
                trace!("line {}: base address {:#x}", number, upper);
            }
            RecordType::Data => {
                let start = upper + record.offset as u32;
                for (i, byte) in record.payload.iter().enumerate() {
                    let address = start.saturating_add(i as u32);
                    if let Some(slot) = address
                        .checked_sub(SCRIPT_ADDRESS)
                        .and_then(|index| region.get_mut(index as usize))
                    {
                        *slot = Some(*byte);
                    }
                }
            }
            RecordType::EndOfFile => break,
            RecordType::StartSegmentAddress | RecordType::StartLinearAddress => {}
        }
    }

    let header = region[..HEADER_SIZE]
        .iter()
        .copied()
        .collect::<Option<Vec<u8>>>()
        .ok_or(Error::NoScriptFound)?;
    if &header[..2] != MAGIC {
        return Err(Error::NoScriptFound);
    }
    let length = u16::from_le_bytes([header[2], header[3]]) as usize;
    if length > MAX_SCRIPT_SIZE {
        return Err(Error::NoScriptFound);
    }
    debug!("found a {} byte script header at {:#x}", length, SCRIPT_ADDRESS);

    region[HEADER_SIZE..HEADER_SIZE + length]
        .iter()
        .copied()
        .collect::<Option<Vec<u8>>>()
        .ok_or(Error::NoScriptFound)
}

// =============================================================================
// Private stuff
// =============================================================================

/// A non-empty line of an image and its decoded record.
struct Line<'a> {
    /// 1-based, blank lines included.
    number: usize,
    text: &'a str,
    record: Record,
}

/// Decodes the lines of an image up to and including its end-of-file record.
/// Whatever follows that record is ignored.
fn records(image: &[u8]) -> Result<Vec<Line<'_>>> {
    let mut lines = Vec::new();
    for (index, raw) in image.split(|b| *b == b'\n').enumerate() {
        let number = index + 1;
        let text = std::str::from_utf8(raw)
            .map_err(|_| Error::InvalidRecord {
                line: number,
                reason: "image is not ASCII text",
            })?
            .trim();
        if text.is_empty() {
            continue;
        }
        let record = Record::parse(text, number)?;
        let end = record.kind == RecordType::EndOfFile;
        lines.push(Line {
            number,
            text,
            record,
        });
        if end {
            break;
        }
    }
    Ok(lines)
}

/// The extended address record for the script region followed by the data
/// records holding the header, the script and the padding.
fn script_records(script: &[u8]) -> Vec<Record> {
    let mut data = Vec::with_capacity(HEADER_SIZE + script.len() + BYTES_PER_RECORD);
    data.extend_from_slice(MAGIC);
    data.extend_from_slice(&(script.len() as u16).to_le_bytes());
    data.extend_from_slice(script);
    let padded = (data.len() + BYTES_PER_RECORD - 1) / BYTES_PER_RECORD * BYTES_PER_RECORD;
    data.resize(padded, 0);

    let mut records = vec![Record::extended_linear_address(
        (SCRIPT_ADDRESS >> 16) as u16,
    )];
    records.extend(
        data.chunks(BYTES_PER_RECORD)
            .enumerate()
            .map(|(i, chunk)| {
                let address = SCRIPT_ADDRESS + (i * BYTES_PER_RECORD) as u32;
                Record::data((address & 0xFFFF) as u16, chunk)
            }),
    );
    records
}

// =============================================================================
// Unit Tests
// =============================================================================
