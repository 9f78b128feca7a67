//! # emk-codec
//!
//! A reader and writer for EMK karaoke archives (`.emk`) and the NCN-style
//! cursor/lyric payloads they bundle.
//!
//! An EMK file is a whole-file XOR-obfuscated container holding a handful of
//! independently zlib-compressed, tagged payloads (MIDI track, cp874 lyric
//! text, cursor timing stream) described by a trailing section table. This
//! crate covers the container codec, the cursor tick stream, and the legacy
//! Thai text transcoding; it does not parse MIDI or render anything.
pub mod emk;

// Re-export the main types for convenience
pub use emk::{
    builder::EmkBuilder,
    format::cursor::{self, LineSegment},
    lyrics::LyrFile,
    reader::EmkArchive,
    types::{
        error::{EmkError, Result},
        models::{
            Compression, ContainerConfig, Diagnostic, FormatVariant, Section, SectionRecord,
            TagValue, CURSOR_TAG, LYRIC_TAG, MIDI_TAG,
        },
    },
};
