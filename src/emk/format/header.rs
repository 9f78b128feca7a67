//! The fixed EMK header: file magic, reserved prefix and table offsets.
//!
//! # Header Structure
//! ```text
//! [5 bytes]       File magic ".SFDS"
//! [0x1D bytes]    Reserved prefix (opaque, preserved on rewrite)
//! [4 or 8 bytes]  table_start offset (little-endian, width per variant)
//! [4 or 8 bytes]  table_end offset (0 = table runs to end of file)
//! ```
//!
//! Offsets are absolute positions within the decrypted buffer. The field
//! width (and with it where the payload region begins) depends on the
//! [`FormatVariant`].

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, trace};

use crate::emk::types::error::{EmkError, Result};
use crate::emk::types::models::{ContainerConfig, FormatVariant};

/// Byte position of the first table-offset field, common to all variants.
pub const OFFSET_FIELDS_AT: usize = 0x22;

/// Resolved table bounds, after applying the variant's conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableBounds {
    pub start: usize,
    pub end: usize,
}

/// Checks the file magic at the start of a decrypted buffer.
pub fn check_magic(decrypted: &[u8], config: &ContainerConfig) -> Result<()> {
    let magic = &config.magic;
    if decrypted.len() < magic.len() || &decrypted[..magic.len()] != magic.as_slice() {
        return Err(EmkError::InvalidMagic {
            expected: magic.clone(),
            found: decrypted[..magic.len().min(decrypted.len())].to_vec(),
        });
    }
    Ok(())
}

/// Reads and validates the table bounds from a decrypted buffer.
///
/// A stored `table_end` of zero means the table extends to the end of the
/// buffer. Both bounds are range-checked against the buffer.
pub fn read_table_bounds(decrypted: &[u8], variant: FormatVariant) -> Result<TableBounds> {
    let width = variant.offset_width();
    let needed = OFFSET_FIELDS_AT + 2 * width;
    if decrypted.len() < needed {
        return Err(EmkError::TruncatedHeader {
            needed,
            available: decrypted.len(),
        });
    }

    let raw_start = read_offset(&decrypted[OFFSET_FIELDS_AT..], width);
    let raw_end = read_offset(&decrypted[OFFSET_FIELDS_AT + width..], width);
    trace!(
        "Header offsets ({:?}): table_start={:#x}, table_end={:#x}",
        variant,
        raw_start,
        raw_end
    );

    let start = (raw_start * variant.offset_scale()) as usize;
    let end = if raw_end == 0 {
        decrypted.len()
    } else {
        (raw_end * variant.offset_scale()) as usize
    };

    if start > decrypted.len() || end > decrypted.len() || start > end {
        return Err(EmkError::TruncatedHeader {
            needed: end.max(start),
            available: decrypted.len(),
        });
    }

    debug!("Section table at {:#x}..{:#x}", start, end);
    Ok(TableBounds { start, end })
}

/// Serializes the fixed header for a buffer whose table occupies
/// `bounds.start..bounds.end`.
pub fn write_header(config: &ContainerConfig, bounds: TableBounds) -> Vec<u8> {
    let variant = config.variant;
    let width = variant.offset_width();
    let mut out = vec![0u8; variant.data_start()];
    out[..config.magic.len()].copy_from_slice(&config.magic);
    // Reserved prefix between the magic and 0x22 stays zero.
    write_offset(
        &mut out[OFFSET_FIELDS_AT..],
        width,
        bounds.start as u64 / variant.offset_scale(),
    );
    write_offset(
        &mut out[OFFSET_FIELDS_AT + width..],
        width,
        bounds.end as u64 / variant.offset_scale(),
    );
    out
}

fn read_offset(buf: &[u8], width: usize) -> u64 {
    match width {
        8 => LittleEndian::read_u64(buf),
        _ => LittleEndian::read_u32(buf) as u64,
    }
}

fn write_offset(buf: &mut [u8], width: usize, value: u64) {
    match width {
        8 => LittleEndian::write_u64(buf, value),
        _ => LittleEndian::write_u32(buf, value as u32),
    }
}
