//! Per-section compression for EMK payloads.
//!
//! Every payload in the container is compressed independently. The common
//! case is a plain zlib stream; a sentinel compression id marks payloads
//! stored uncompressed. Length verification against the size recorded in the
//! section table is left to the caller so a mismatch can be surfaced as a
//! warning while the actual bytes are kept.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use log::{trace, warn};

use crate::emk::types::error::{EmkError, Result};
use crate::emk::types::models::Compression;

/// Compresses a payload with the given algorithm.
///
/// Zlib uses the maximum compression level to match the byte output of the
/// legacy tooling.
pub fn compress(data: &[u8], compression: Compression) -> Result<Vec<u8>> {
    match compression {
        Compression::Stored => {
            trace!("Storing {} bytes uncompressed", data.len());
            Ok(data.to_vec())
        }
        Compression::Zlib => {
            trace!("Deflating {} bytes with zlib", data.len());
            let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::best());
            encoder.write_all(data).map_err(EmkError::Io)?;
            Ok(encoder.finish().map_err(EmkError::Io)?)
        }
    }
}

/// Decompresses a section payload.
///
/// `expected_size` is a capacity hint and, for stored payloads, the check
/// that distinguishes genuinely stored bytes from the classic writer's
/// quirk of stamping the stored sentinel on deflated payloads. The returned
/// bytes are NOT length-verified against the section record; callers compare
/// against `uncompressed_size` themselves.
///
/// # Errors
/// [`EmkError::DecompressionFailed`] if the zlib stream is corrupt.
pub fn decompress(
    payload: &[u8],
    compression: Compression,
    expected_size: u64,
    tag: &str,
) -> Result<Vec<u8>> {
    match compression {
        Compression::Stored => {
            trace!(
                "Section '{}': stored payload, {} bytes expected",
                tag,
                expected_size
            );
            if payload.len() as u64 != expected_size {
                // The classic writer stamped the "stored" sentinel while
                // still deflating its payloads. Try zlib before taking the
                // bytes at face value so both conventions stay readable.
                if let Ok(inflated) = inflate(payload, expected_size, tag) {
                    warn!(
                        "Section '{}': stored sentinel but payload is a zlib stream; inflated",
                        tag
                    );
                    return Ok(inflated);
                }
            }
            Ok(payload.to_vec())
        }
        Compression::Zlib => {
            trace!(
                "Section '{}': inflating {} bytes, {} expected",
                tag,
                payload.len(),
                expected_size
            );
            inflate(payload, expected_size, tag)
        }
    }
}

fn inflate(payload: &[u8], size_hint: u64, tag: &str) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(payload);
    let mut out = Vec::with_capacity(size_hint as usize);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| EmkError::DecompressionFailed {
            tag: tag.to_string(),
            reason: e.to_string(),
        })?;
    Ok(out)
}
