//! Legacy Thai text transcoding for lyric payloads.
//!
//! Lyric text travels as cp874 (windows-874) bytes with CRLF line endings,
//! the convention of the karaoke players this format targets. At the API
//! boundary text is plain `String` with LF endings.
//!
//! Characters with no cp874 representation are replaced with `?` on encode.
//! This is deliberately lossy: the legacy tooling behaves the same way, and
//! aborting would make otherwise-valid archives unwritable over one stray
//! glyph.

use encoding_rs::WINDOWS_874;
use log::warn;

/// Decodes cp874 bytes to a string, normalizing CRLF (and stray CR) to LF.
///
/// Invalid byte sequences decode to U+FFFD; cp874 is a single-byte code page
/// so in practice every byte maps somewhere.
pub fn decode_text(bytes: &[u8]) -> String {
    let (text, _, _) = WINDOWS_874.decode(bytes);
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Encodes a string to cp874 bytes with CRLF line endings.
///
/// Unmappable characters become `?`; the substitution count is logged.
pub fn encode_text(text: &str) -> Vec<u8> {
    let wire = to_crlf(text);
    let mut out = Vec::with_capacity(wire.len());
    let mut replaced = 0usize;

    // Per-character encode so unmappable characters can be substituted with
    // a plain placeholder instead of encoding_rs's numeric references.
    let mut buf = [0u8; 4];
    for ch in wire.chars() {
        let (bytes, _, had_errors) = WINDOWS_874.encode(ch.encode_utf8(&mut buf));
        if had_errors {
            out.push(b'?');
            replaced += 1;
        } else {
            out.extend_from_slice(&bytes);
        }
    }

    if replaced > 0 {
        warn!("{} character(s) had no cp874 representation, replaced with '?'", replaced);
    }
    out
}

/// Normalizes any line-break convention to CRLF for the wire.
fn to_crlf(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', "\r\n")
}
