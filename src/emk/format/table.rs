//! The section table: typed tag/value encoding and section records.
//!
//! Every value in a record is stored as a (type, value) pair: a one-byte
//! type tag followed by a fixed- or length-prefixed value. The reader is
//! type-driven: it dispatches on the type byte it finds, never assuming a
//! width from field position.
//!
//! # Record Structure
//! ```text
//! [4 bytes]   Record magic "SFDS"
//! [typed]     tag (string)           payload role, e.g. "MIDI_DATA"
//! [typed]     uncompressed_size
//! [typed]     compression id
//! [typed]     data_begin             absolute offset of compressed bytes
//! [typed]     data_end
//! [typed] x2  reserved
//! [16 bytes]  opaque padding
//! [typed] x2  reserved
//! ```

use byteorder::{ByteOrder, LittleEndian};
use log::{trace, warn};

use crate::emk::types::error::{EmkError, Result};
use crate::emk::types::models::{ReservedFields, SectionRecord, TagValue};

/// Type tag for a single unsigned byte.
pub const TYPE_BYTE: u8 = 0x02;
/// Type tag for a little-endian u16.
pub const TYPE_U16: u8 = 0x03;
/// Type tag for a little-endian u32.
pub const TYPE_U32: u8 = 0x04;
/// Type tag for a length-prefixed 8-bit string.
pub const TYPE_STRING: u8 = 0x06;

/// Length of the opaque padding block inside each record.
pub const RECORD_PADDING_LEN: usize = 0x10;

/// Reads one typed value at `offset`, returning it with the new offset.
///
/// # Errors
/// - [`EmkError::UnknownTagType`] for a type byte outside the documented set
/// - [`EmkError::TruncatedRecord`] if the buffer ends mid-value
pub fn read_value(buf: &[u8], offset: usize) -> Result<(TagValue, usize)> {
    let type_tag = *buf
        .get(offset)
        .ok_or(EmkError::TruncatedRecord { offset })?;
    let at = offset + 1;

    match type_tag {
        TYPE_BYTE => {
            let v = *buf.get(at).ok_or(EmkError::TruncatedRecord { offset })?;
            Ok((TagValue::Byte(v), at + 1))
        }
        TYPE_U16 => {
            let end = at + 2;
            let bytes = buf
                .get(at..end)
                .ok_or(EmkError::TruncatedRecord { offset })?;
            Ok((TagValue::U16(LittleEndian::read_u16(bytes)), end))
        }
        TYPE_U32 => {
            let end = at + 4;
            let bytes = buf
                .get(at..end)
                .ok_or(EmkError::TruncatedRecord { offset })?;
            Ok((TagValue::U32(LittleEndian::read_u32(bytes)), end))
        }
        TYPE_STRING => {
            let len = *buf.get(at).ok_or(EmkError::TruncatedRecord { offset })? as usize;
            let end = at + 1 + len;
            let bytes = buf
                .get(at + 1..end)
                .ok_or(EmkError::TruncatedRecord { offset })?;
            // Tags are ASCII; anything else decodes lossily rather than failing.
            Ok((TagValue::Str(String::from_utf8_lossy(bytes).into_owned()), end))
        }
        other => Err(EmkError::UnknownTagType { tag: other, offset }),
    }
}

/// Appends one typed value, type byte first. Mirror of [`read_value`].
pub fn write_value(out: &mut Vec<u8>, value: &TagValue) {
    match value {
        TagValue::Byte(v) => {
            out.push(TYPE_BYTE);
            out.push(*v);
        }
        TagValue::U16(v) => {
            out.push(TYPE_U16);
            out.extend_from_slice(&v.to_le_bytes());
        }
        TagValue::U32(v) => {
            out.push(TYPE_U32);
            out.extend_from_slice(&v.to_le_bytes());
        }
        TagValue::Str(s) => {
            out.push(TYPE_STRING);
            out.push(s.len() as u8);
            out.extend_from_slice(s.as_bytes());
        }
    }
}

/// Parses one section record starting at `offset` in the table slice.
///
/// The record magic must be present at `offset`; callers re-synchronize with
/// [`find_record_magic`] before retrying after corruption.
pub fn parse_record(
    table: &[u8],
    offset: usize,
    record_magic: &[u8],
) -> Result<(SectionRecord, usize)> {
    let magic_end = offset + record_magic.len();
    let found = table
        .get(offset..magic_end)
        .ok_or(EmkError::TruncatedRecord { offset })?;
    if found != record_magic {
        return Err(EmkError::InvalidMagic {
            expected: record_magic.to_vec(),
            found: found.to_vec(),
        });
    }

    let mut off = magic_end;

    let (tag_value, next) = read_value(table, off)?;
    off = next;
    let tag = tag_value
        .as_str()
        .ok_or(EmkError::UnexpectedFieldType {
            expected: "string",
            offset: magic_end,
        })?
        .to_string();

    let (uncompressed_size, next) = read_numeric(table, off)?;
    off = next;
    let (compression_id, next) = read_numeric(table, off)?;
    off = next;
    let (data_begin, next) = read_numeric(table, off)?;
    off = next;
    let (data_end, next) = read_numeric(table, off)?;
    off = next;

    let (reserved_a, next) = read_value(table, off)?;
    off = next;
    let (reserved_b, next) = read_value(table, off)?;
    off = next;

    let pad_end = off + RECORD_PADDING_LEN;
    let mut padding = [0u8; RECORD_PADDING_LEN];
    padding.copy_from_slice(
        table
            .get(off..pad_end)
            .ok_or(EmkError::TruncatedRecord { offset: off })?,
    );
    off = pad_end;

    let (reserved_c, next) = read_value(table, off)?;
    off = next;
    let (reserved_d, next) = read_value(table, off)?;
    off = next;

    trace!(
        "Parsed record '{}': {} bytes at {:#x}..{:#x}, compression id {:#x}",
        tag,
        uncompressed_size,
        data_begin,
        data_end,
        compression_id
    );

    let record = SectionRecord {
        tag,
        uncompressed_size,
        compression_id: compression_id as u32,
        data_begin,
        data_end,
        reserved: ReservedFields {
            before_padding: [reserved_a, reserved_b],
            padding,
            after_padding: [reserved_c, reserved_d],
        },
    };
    Ok((record, off))
}

/// Serializes one section record, mirror of [`parse_record`].
pub fn write_record(out: &mut Vec<u8>, record: &SectionRecord, record_magic: &[u8]) {
    out.extend_from_slice(record_magic);
    write_value(out, &TagValue::Str(record.tag.clone()));
    write_value(out, &TagValue::U32(record.uncompressed_size as u32));
    write_value(out, &TagValue::U32(record.compression_id));
    write_value(out, &TagValue::U32(record.data_begin as u32));
    write_value(out, &TagValue::U32(record.data_end as u32));
    write_value(out, &record.reserved.before_padding[0]);
    write_value(out, &record.reserved.before_padding[1]);
    out.extend_from_slice(&record.reserved.padding);
    write_value(out, &record.reserved.after_padding[0]);
    write_value(out, &record.reserved.after_padding[1]);
}

/// Scans forward from `from` for the next occurrence of the record magic.
///
/// Used to re-synchronize after a corrupt record: the span between the
/// failure point and the next magic is skipped and reported, the rest of the
/// table still parses.
pub fn find_record_magic(table: &[u8], from: usize, record_magic: &[u8]) -> Option<usize> {
    if record_magic.is_empty() || from >= table.len() {
        return None;
    }
    table[from..]
        .windows(record_magic.len())
        .position(|w| w == record_magic)
        .map(|pos| {
            let at = from + pos;
            warn!("Re-synchronized on record magic at table offset {:#x}", at);
            at
        })
}

/// Reads a typed value and coerces it to a number.
fn read_numeric(table: &[u8], offset: usize) -> Result<(u64, usize)> {
    let (value, next) = read_value(table, offset)?;
    let n = value.as_u64().ok_or(EmkError::UnexpectedFieldType {
        expected: "number",
        offset,
    })?;
    Ok((n, next))
}
