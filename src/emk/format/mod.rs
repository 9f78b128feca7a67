//! Container layout layer for EMK archives.
//!
//! This sits between the raw decrypted buffer and the high-level
//! [`EmkArchive`](crate::emk::reader::EmkArchive) / [`EmkBuilder`](crate::emk::builder::EmkBuilder).
//!
//! # Module Organization
//!
//! - [`header`]: the fixed prefix (magic, reserved padding, table offsets)
//! - [`table`]: the typed tag/value encoding and section records
//! - [`cursor`]: the cursor tick stream and lyric line segmentation
//!
//! # Architecture
//!
//! ```text
//! Decrypted buffer:
//! ┌──────────────────┐
//! │  Fixed header    │ ← header::read_table_bounds()
//! ├──────────────────┤
//! │  Payload region  │ ← sliced per record, codec::compression
//! │  (concatenated,  │
//! │   compressed)    │
//! ├──────────────────┤
//! │  Section table   │ ← table::parse_record()
//! └──────────────────┘
//! ```

pub mod cursor;
pub mod header;
pub mod table;
