//! The cursor timing stream and its lyric line segmentation.
//!
//! A `.cur` payload is a flat sequence of playback tick values packed two
//! bytes at a time, little-endian. A pair whose second byte is `0xFF`
//! terminates the stream early without emitting a value; a lone byte left at
//! the tail is emitted as its own value (0–255). On write, the external
//! player's convention is a single terminating `0xFF` byte after the pairs.
//!
//! The tick count is tied to the lyric text: each line consumes one leading
//! start tick plus one tick per character unit, so
//! `len(ticks) == sum(len(line)) + line_count` for a well-formed pair of
//! payloads.

use log::{debug, trace};

use crate::emk::types::error::{EmkError, Result};

/// Second byte value that terminates the stream.
pub const SENTINEL: u8 = 0xFF;

/// One lyric line aligned to its cursor ticks.
///
/// This is the exact alignment contract a playback/UI layer needs: the text
/// units, when the line begins and ends, and one tick per unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSegment {
    /// The line's text units (characters or display clusters).
    pub words: Vec<String>,
    /// Tick at which the line becomes active.
    pub start: u16,
    /// Tick of the last word unit.
    pub end: u16,
    pub word_count: usize,
    /// One tick per word unit, in order.
    pub word_ticks: Vec<u16>,
}

/// Decodes a cursor byte stream into tick values.
///
/// Scans two bytes at a time; `[b0, 0xFF]` stops decoding without emitting
/// (even if more bytes follow). A single trailing byte with no successor is
/// emitted as its own value (the tail rule, not a normal path).
pub fn decode_ticks(data: &[u8]) -> Vec<u16> {
    let mut ticks = Vec::with_capacity(data.len() / 2);
    let mut offset = 0;
    while offset < data.len() {
        if offset + 1 < data.len() {
            let (b0, b1) = (data[offset], data[offset + 1]);
            if b1 == SENTINEL {
                trace!("Cursor sentinel at offset {:#x}", offset);
                break;
            }
            ticks.push(u16::from(b0) | (u16::from(b1) << 8));
            offset += 2;
        } else {
            // Tail rule: lone final byte is a value in its own right.
            ticks.push(u16::from(data[offset]));
            offset += 1;
        }
    }
    debug!("Decoded {} cursor ticks from {} bytes", ticks.len(), data.len());
    ticks
}

/// Encodes tick values to the on-disk cursor convention: u16 little-endian
/// pairs followed by a single terminating `0xFF` byte.
///
/// Values must stay below `0xFF00`, otherwise their high byte would read
/// back as the sentinel.
pub fn encode_ticks(ticks: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(ticks.len() * 2 + 1);
    for &tick in ticks {
        out.extend_from_slice(&tick.to_le_bytes());
    }
    out.push(SENTINEL);
    out
}

/// Maps a flat tick sequence back onto word-aligned lyric lines.
///
/// For each line the stream contributes one start tick followed by one tick
/// per word unit; the line ends on its last word tick.
///
/// # Errors
/// [`EmkError::InsufficientTicks`] if a line would read past the end of the
/// tick sequence. Already-segmented lines are not returned in that case; the
/// mismatch means the two payloads do not belong together.
pub fn segment_by_words<S: AsRef<str>>(
    lines: &[Vec<S>],
    ticks: &[u16],
) -> Result<Vec<LineSegment>> {
    let mut segments = Vec::with_capacity(lines.len());
    let mut index = 0usize;

    for (line_no, line) in lines.iter().enumerate() {
        let needed = line.len() + 1;
        if index + needed > ticks.len() {
            return Err(EmkError::InsufficientTicks {
                line: line_no,
                needed,
                available: ticks.len().saturating_sub(index),
            });
        }

        let start = ticks[index];
        let word_ticks = ticks[index + 1..index + needed].to_vec();
        let end = *word_ticks.last().unwrap_or(&start);
        segments.push(LineSegment {
            words: line.iter().map(|w| w.as_ref().to_string()).collect(),
            start,
            end,
            word_count: line.len(),
            word_ticks,
        });
        index += needed;
    }

    debug!(
        "Segmented {} lines consuming {} of {} ticks",
        segments.len(),
        index,
        ticks.len()
    );
    Ok(segments)
}

/// Converts a cursor value to a MIDI tick for a file with the given pulses
/// per quarter note. Cursor units are fixed at 24 per beat.
pub fn cursor_to_tick(cursor: u16, ppq: u32) -> f64 {
    if ppq == 0 {
        return 0.0;
    }
    f64::from(cursor) * f64::from(ppq) / 24.0
}

/// Inverse of [`cursor_to_tick`], rounding to the nearest cursor unit.
pub fn tick_to_cursor(tick: f64, ppq: u32) -> u16 {
    if ppq == 0 {
        return 0;
    }
    (tick / (f64::from(ppq) / 24.0)).round() as u16
}
