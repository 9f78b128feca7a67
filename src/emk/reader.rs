//! The decode direction: raw `.emk` bytes to decoded sections.
//!
//! Decoding is a best-effort, single-pass walk over an in-memory buffer:
//!
//! 1. XOR-transform the whole file with the fixed key
//! 2. Check the file magic (a wrong key surfaces here)
//! 3. Read the section table bounds from the fixed header
//! 4. Parse section records, re-synchronizing on the record magic after
//!    corruption
//! 5. Slice, decompress and verify each payload
//!
//! Per-section failures never abort the archive: the result carries every
//! section that decoded plus a diagnostic for every one that did not.

use std::fs;
use std::path::Path;

use log::{debug, info, warn};

use crate::emk::codec::{compression, crypto};
use crate::emk::format::{cursor, header, table};
use crate::emk::lyrics::LyrFile;
use crate::emk::types::error::{EmkError, Result};
use crate::emk::types::models::{
    ContainerConfig, Diagnostic, Section, SectionRecord, CURSOR_TAG, LYRIC_TAG, MIDI_TAG,
};

/// A decoded EMK archive: its sections and any non-fatal decode problems.
#[derive(Debug)]
pub struct EmkArchive {
    pub sections: Vec<Section>,
    pub diagnostics: Vec<Diagnostic>,
}

impl EmkArchive {
    /// Reads and decodes an `.emk` file from disk.
    pub fn open(path: impl AsRef<Path>, config: &ContainerConfig) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening EMK file: {}", path.display());
        let raw = fs::read(path)?;
        Self::decode(&raw, config)
    }

    /// Decodes an archive from raw (still obfuscated) bytes.
    ///
    /// # Errors
    /// Fatal errors only: [`EmkError::InvalidMagic`] when the buffer is not
    /// an EMK archive (or the key is wrong) and [`EmkError::TruncatedHeader`]
    /// when the fixed header or table bounds do not fit the buffer. Anything
    /// recoverable lands in [`EmkArchive::diagnostics`] instead.
    pub fn decode(raw: &[u8], config: &ContainerConfig) -> Result<Self> {
        let decrypted = crypto::xor_transformed(raw, &config.key);
        header::check_magic(&decrypted, config)?;
        let bounds = header::read_table_bounds(&decrypted, config.variant)?;

        let table_bytes = &decrypted[bounds.start..bounds.end];
        let mut sections = Vec::new();
        let mut diagnostics = Vec::new();
        let mut record_count = 0usize;

        let mut off = 0;
        while off < table_bytes.len() {
            let (record, next) = match table::parse_record(table_bytes, off, &config.record_magic)
            {
                Ok(parsed) => parsed,
                Err(err @ EmkError::TruncatedRecord { .. }) => {
                    // Fatal for the rest of the table; keep what we have.
                    warn!("Section table truncated: {}", err);
                    diagnostics.push(Diagnostic::new(format!("table@{:#x}", off), err));
                    break;
                }
                Err(err) => {
                    warn!("Corrupt section record at table offset {:#x}: {}", off, err);
                    diagnostics.push(Diagnostic::new(format!("table@{:#x}", off), err));
                    // Skip to the next record boundary, if any.
                    match table::find_record_magic(table_bytes, off + 1, &config.record_magic) {
                        Some(resynced) => {
                            off = resynced;
                            continue;
                        }
                        None => break,
                    }
                }
            };
            off = next;
            record_count += 1;

            match decode_section_payload(&decrypted, &record, &mut diagnostics) {
                Some(data) => sections.push(Section { record, data }),
                None => continue,
            }
        }

        info!(
            "Decoded {} of {} sections ({} diagnostics)",
            sections.len(),
            record_count,
            diagnostics.len()
        );
        Ok(Self {
            sections,
            diagnostics,
        })
    }

    /// Looks up a section by tag.
    pub fn section(&self, tag: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.record.tag == tag)
    }

    /// Decompressed payload bytes for a tag.
    pub fn section_data(&self, tag: &str) -> Result<&[u8]> {
        self.section(tag)
            .map(|s| s.data.as_slice())
            .ok_or_else(|| EmkError::MissingSection {
                tag: tag.to_string(),
            })
    }

    /// The raw MIDI track payload.
    pub fn midi_data(&self) -> Result<&[u8]> {
        self.section_data(MIDI_TAG)
    }

    /// The lyric payload decoded from cp874 with native line endings.
    pub fn lyric_text(&self) -> Result<String> {
        self.section(LYRIC_TAG)
            .and_then(Section::text)
            .ok_or_else(|| EmkError::MissingSection {
                tag: LYRIC_TAG.to_string(),
            })
    }

    /// The lyric payload parsed into its title/artist/key/lines structure.
    pub fn lyrics(&self) -> Result<LyrFile> {
        Ok(LyrFile::parse(&self.lyric_text()?))
    }

    /// The cursor payload decoded into tick values.
    pub fn cursor_ticks(&self) -> Result<Vec<u16>> {
        Ok(cursor::decode_ticks(self.section_data(CURSOR_TAG)?))
    }
}

/// Slices and decompresses one section's payload.
///
/// Returns `None` (with a diagnostic pushed) when the section cannot be
/// decoded at all. A size mismatch keeps the actually-decompressed bytes and
/// records the mismatch; data is never fabricated to fit the table.
fn decode_section_payload(
    decrypted: &[u8],
    record: &SectionRecord,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Vec<u8>> {
    let tag = record.tag.as_str();

    let compression = match record.compression() {
        Ok(c) => c,
        Err(err) => {
            warn!("{}", err);
            diagnostics.push(Diagnostic::new(tag, err));
            return None;
        }
    };

    let (begin, end) = (record.data_begin as usize, record.data_end as usize);
    if begin > end || end > decrypted.len() {
        let err = EmkError::DataOutOfBounds {
            tag: tag.to_string(),
            begin: record.data_begin,
            end: record.data_end,
            len: decrypted.len(),
        };
        warn!("{}", err);
        diagnostics.push(Diagnostic::new(tag, err));
        return None;
    }

    let data = match compression::decompress(
        &decrypted[begin..end],
        compression,
        record.uncompressed_size,
        tag,
    ) {
        Ok(data) => data,
        Err(err) => {
            warn!("{}", err);
            diagnostics.push(Diagnostic::new(tag, err));
            return None;
        }
    };

    if data.len() as u64 != record.uncompressed_size {
        let err = EmkError::SizeMismatch {
            tag: tag.to_string(),
            expected: record.uncompressed_size,
            found: data.len() as u64,
        };
        warn!("{} (keeping decoded bytes)", err);
        diagnostics.push(Diagnostic::new(tag, err));
    }

    debug!(
        "Section '{}': {} compressed bytes -> {} decompressed",
        tag,
        end - begin,
        data.len()
    );
    Some(data)
}
