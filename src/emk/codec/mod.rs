//! Codec layer for obfuscation, compression and text transcoding.
//!
//! Pure data transformations with no knowledge of the container layout.
//!
//! # Submodules
//!
//! - [`crypto`]: the whole-file XOR keystream transform
//! - [`compression`]: per-section zlib/stored (de)compression
//! - [`text`]: legacy cp874 (windows-874) Thai text transcoding

pub mod compression;
pub mod crypto;
pub mod text;
