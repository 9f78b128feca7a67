//! Data structures representing EMK container components.

use super::error::{EmkError, Result};

/// Tag naming the MIDI track payload.
pub const MIDI_TAG: &str = "MIDI_DATA";
/// Tag naming the cp874 lyric text payload.
pub const LYRIC_TAG: &str = "LYRIC_DATA";
/// Tag naming the cursor timing stream payload.
pub const CURSOR_TAG: &str = "CURSOR_DATA";

/// Returns true for tags whose payload is legacy 8-bit Thai text.
pub fn is_text_tag(tag: &str) -> bool {
    tag == LYRIC_TAG
}

/// Header layout variant.
///
/// Observed EMK files disagree on the width of the two table-offset fields
/// that follow the fixed prefix. Both variants place the first field at
/// byte 0x22 and store offsets unscaled; only the field width (and with it
/// the start of the payload region) differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatVariant {
    /// 8-byte little-endian offset fields at 0x22 and 0x2A; payloads start
    /// at 0x32. This is what files in the wild carry.
    #[default]
    Standard,
    /// 4-byte little-endian offset fields at 0x22 and 0x26; payloads start
    /// at 0x2A. Produced by older write tooling.
    Legacy,
}

impl FormatVariant {
    /// Width in bytes of each table-offset field.
    pub fn offset_width(&self) -> usize {
        match self {
            FormatVariant::Standard => 8,
            FormatVariant::Legacy => 4,
        }
    }

    /// Byte position of the first payload, immediately after the fixed
    /// header.
    pub fn data_start(&self) -> usize {
        // magic(5) + reserved prefix up to 0x22, then two offset fields
        0x22 + 2 * self.offset_width()
    }

    /// Multiplier applied to stored offsets. Both known variants store raw
    /// byte offsets; a scaled variant would plug in here.
    pub fn offset_scale(&self) -> u64 {
        1
    }
}

/// Fixed configuration of the container format: magics, obfuscation key and
/// header variant. Swappable so alternate keys/magics observed across sample
/// corpora can be handled without touching the codec.
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// 5-byte file magic, checked right after decryption.
    pub magic: Vec<u8>,
    /// 4-byte magic preceding every section record.
    pub record_magic: Vec<u8>,
    /// XOR keystream applied to the whole file. Fixed by the format, not a
    /// secret.
    pub key: Vec<u8>,
    pub variant: FormatVariant,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            magic: vec![0x2E, 0x53, 0x46, 0x44, 0x53], // ".SFDS"
            record_magic: b"SFDS".to_vec(),
            key: vec![0xAF, 0xF2, 0x4C, 0x9C, 0xE9, 0xEA, 0x99, 0x43],
            variant: FormatVariant::Standard,
        }
    }
}

impl ContainerConfig {
    /// Default configuration with the legacy narrow-header layout.
    pub fn legacy() -> Self {
        Self {
            variant: FormatVariant::Legacy,
            ..Self::default()
        }
    }
}

/// Per-section compression algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Standard zlib/deflate stream (wire id 0).
    #[default]
    Zlib,
    /// Payload stored as-is (wire id: all bits set).
    Stored,
}

impl Compression {
    pub const ZLIB_ID: u32 = 0;
    pub const STORED_ID: u32 = 0xFFFF_FFFF;

    /// The wire id written into a section record.
    pub fn id(&self) -> u32 {
        match self {
            Compression::Zlib => Self::ZLIB_ID,
            Compression::Stored => Self::STORED_ID,
        }
    }

    /// Maps a wire id back to an algorithm, tagging failures with the
    /// owning section so they can be surfaced per-section.
    pub fn from_id(id: u32, tag: &str) -> Result<Self> {
        match id {
            Self::ZLIB_ID => Ok(Compression::Zlib),
            Self::STORED_ID => Ok(Compression::Stored),
            _ => Err(EmkError::UnknownCompression {
                tag: tag.to_string(),
                id,
            }),
        }
    }
}

/// One decoded value from the section table's typed tag/value encoding.
///
/// The table is type-driven: every value is prefixed by a one-byte type tag
/// and the reader dispatches on it, never assuming widths from field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    /// Type 0x02: single unsigned byte.
    Byte(u8),
    /// Type 0x03: little-endian u16.
    U16(u16),
    /// Type 0x04: little-endian u32.
    U32(u32),
    /// Type 0x06: length-prefixed 8-bit string.
    Str(String),
}

impl TagValue {
    /// Numeric view of the value, regardless of stored width.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            TagValue::Byte(v) => Some(*v as u64),
            TagValue::U16(v) => Some(*v as u64),
            TagValue::U32(v) => Some(*v as u64),
            TagValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Reserved portions of a section record whose semantics are undetermined.
///
/// Several reverse-engineering passes over the format guessed different
/// meanings for these fields; none stuck. They are carried verbatim so a
/// rewrite can reproduce the original table bytes instead of inventing
/// semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedFields {
    /// Two typed values between `data_end` and the padding block.
    pub before_padding: [TagValue; 2],
    /// Fixed-size opaque padding block.
    pub padding: [u8; 16],
    /// Two typed values after the padding block.
    pub after_padding: [TagValue; 2],
}

impl Default for ReservedFields {
    fn default() -> Self {
        // What the classic writer emits.
        Self {
            before_padding: [TagValue::U32(0), TagValue::U32(0)],
            padding: [0u8; 16],
            after_padding: [TagValue::U32(0), TagValue::U32(0)],
        }
    }
}

/// One parsed entry of the section table, describing a single payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRecord {
    /// Short ASCII name of the payload's role (e.g. `MIDI_DATA`). Unique
    /// within one container.
    pub tag: String,
    /// Payload length after decompression; doubles as an integrity check.
    pub uncompressed_size: u64,
    /// Raw compression id as stored on the wire.
    pub compression_id: u32,
    /// Half-open byte range of the compressed payload, absolute within the
    /// whole decrypted buffer (not relative to the payload region).
    pub data_begin: u64,
    pub data_end: u64,
    pub reserved: ReservedFields,
}

impl SectionRecord {
    /// Interpreted compression algorithm for this record.
    pub fn compression(&self) -> Result<Compression> {
        Compression::from_id(self.compression_id, &self.tag)
    }
}

/// A fully decoded section: its table record plus decompressed payload.
#[derive(Debug, Clone)]
pub struct Section {
    pub record: SectionRecord,
    pub data: Vec<u8>,
}

impl Section {
    /// Decoded text for text-tagged sections, `None` for binary payloads.
    pub fn text(&self) -> Option<String> {
        is_text_tag(&self.record.tag).then(|| crate::emk::codec::text::decode_text(&self.data))
    }
}

/// A non-fatal problem encountered during a best-effort decode.
///
/// The decoder prints-and-continues where the format allows it; every such
/// event is surfaced here alongside the successfully decoded sections rather
/// than aborting the whole archive.
#[derive(Debug)]
pub struct Diagnostic {
    /// Where the problem occurred (section tag or table offset).
    pub context: String,
    pub error: EmkError,
}

impl Diagnostic {
    pub fn new(context: impl Into<String>, error: EmkError) -> Self {
        Self {
            context: context.into(),
            error,
        }
    }
}
