//! The encode direction: assembled sections to raw `.emk` bytes.
//!
//! Construction is strictly two-phase, because payload offsets are only
//! knowable once every section's compressed size is final:
//!
//! 1. `add_*` collects sections and compresses each one immediately
//! 2. `build` lays payloads out after the fixed header, serializes the
//!    section table behind them, writes the header offsets and obfuscates
//!    the whole buffer
//!
//! There is no partial or streaming mutation of an existing archive; to
//! rewrite one, decode it and rebuild.

use log::{debug, info};

use crate::emk::codec::{compression, crypto, text};
use crate::emk::format::header::{self, TableBounds};
use crate::emk::format::{cursor, table};
use crate::emk::lyrics::LyrFile;
use crate::emk::types::error::{EmkError, Result};
use crate::emk::types::models::{
    Compression, ContainerConfig, ReservedFields, SectionRecord, CURSOR_TAG, LYRIC_TAG, MIDI_TAG,
};

struct PendingSection {
    tag: String,
    compressed: Vec<u8>,
    uncompressed_size: u64,
    compression: Compression,
}

/// Accumulates sections and finalizes them into an EMK archive in one pass.
pub struct EmkBuilder {
    config: ContainerConfig,
    sections: Vec<PendingSection>,
}

impl EmkBuilder {
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            config,
            sections: Vec::new(),
        }
    }

    /// Adds a zlib-compressed section. Tags must be unique.
    pub fn add_section(&mut self, tag: &str, data: &[u8]) -> Result<&mut Self> {
        self.add_section_with(tag, data, Compression::Zlib)
    }

    /// Adds a section with an explicit compression choice.
    pub fn add_section_with(
        &mut self,
        tag: &str,
        data: &[u8],
        compression: Compression,
    ) -> Result<&mut Self> {
        if self.sections.iter().any(|s| s.tag == tag) {
            return Err(EmkError::DuplicateTag {
                tag: tag.to_string(),
            });
        }
        let compressed = compression::compress(data, compression)?;
        debug!(
            "Queued section '{}': {} bytes -> {} compressed ({:?})",
            tag,
            data.len(),
            compressed.len(),
            compression
        );
        self.sections.push(PendingSection {
            tag: tag.to_string(),
            compressed,
            uncompressed_size: data.len() as u64,
            compression,
        });
        Ok(self)
    }

    /// Adds the MIDI track payload under its conventional tag.
    pub fn add_midi(&mut self, data: &[u8]) -> Result<&mut Self> {
        self.add_section(MIDI_TAG, data)
    }

    /// Adds lyric text, transcoded to cp874 with CRLF line endings.
    pub fn add_lyric_text(&mut self, lyric: &str) -> Result<&mut Self> {
        self.add_section(LYRIC_TAG, &text::encode_text(lyric))
    }

    /// Adds a structured lyric file (title/artist/key/lines).
    pub fn add_lyrics(&mut self, lyrics: &LyrFile) -> Result<&mut Self> {
        self.add_lyric_text(&lyrics.to_text())
    }

    /// Adds a cursor tick stream under its conventional tag.
    pub fn add_cursor_ticks(&mut self, ticks: &[u16]) -> Result<&mut Self> {
        self.add_section(CURSOR_TAG, &cursor::encode_ticks(ticks))
    }

    /// Finalizes the archive: computes all offsets, serializes the table and
    /// obfuscates the result.
    pub fn build(&self) -> Vec<u8> {
        let variant = self.config.variant;
        let data_start = variant.data_start();

        // Phase 2a: lay out compressed payloads and fix their offsets,
        // absolute within the final decrypted buffer.
        let mut position = data_start;
        let mut records = Vec::with_capacity(self.sections.len());
        for section in &self.sections {
            let begin = position;
            position += section.compressed.len();
            records.push(SectionRecord {
                tag: section.tag.clone(),
                uncompressed_size: section.uncompressed_size,
                compression_id: section.compression.id(),
                data_begin: begin as u64,
                data_end: position as u64,
                reserved: ReservedFields::default(),
            });
        }

        // Phase 2b: table right after the last payload, header in front.
        let mut table_bytes = Vec::new();
        for record in &records {
            table::write_record(&mut table_bytes, record, &self.config.record_magic);
        }
        let bounds = TableBounds {
            start: position,
            end: position + table_bytes.len(),
        };

        let mut buffer = header::write_header(&self.config, bounds);
        for section in &self.sections {
            buffer.extend_from_slice(&section.compressed);
        }
        buffer.extend_from_slice(&table_bytes);

        crypto::xor_transform(&mut buffer, &self.config.key);
        info!(
            "Built EMK archive: {} sections, {} bytes",
            self.sections.len(),
            buffer.len()
        );
        buffer
    }
}

impl Default for EmkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
