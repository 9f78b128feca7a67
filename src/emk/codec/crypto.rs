//! Whole-file obfuscation for EMK archives.
//!
//! EMK files are XOR-obfuscated with a fixed 8-byte key that repeats over
//! the entire file. This is not cryptography: the key is a constant of the
//! format, there is no padding or block alignment, and the transform is its
//! own inverse. A wrong key never fails here; it surfaces downstream as a
//! file-magic mismatch.

use log::trace;

/// XOR-transforms `data` in place against the repeating `key`.
///
/// Self-inverse: applying the transform twice with the same key restores the
/// original bytes. An empty key leaves the data untouched.
pub fn xor_transform(data: &mut [u8], key: &[u8]) {
    if key.is_empty() {
        return;
    }
    trace!("XOR-transforming {} bytes with a {}-byte key", data.len(), key.len());
    for (i, byte) in data.iter_mut().enumerate() {
        *byte ^= key[i % key.len()];
    }
}

/// Convenience wrapper that transforms a copy instead of mutating in place.
pub fn xor_transformed(data: &[u8], key: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    xor_transform(&mut out, key);
    out
}
