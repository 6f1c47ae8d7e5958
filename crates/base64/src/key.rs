//! Fixed-width record keys.
//!
//! A key is the 12-character sortable-base64 encoding of 9 raw bytes. Because
//! the alphabet is ASCII-ordered, byte-wise comparison of keys matches the
//! ordering of the raw values, and stepping a key by one unit is plain
//! base-64 arithmetic with carry over the encoded characters.

use thiserror::Error;

use crate::constants::{ALPHABET_SORTABLE_BYTES, REVERSE};
use crate::{from_base64_sortable, write_base64_sortable};

/// Encoded key width in bytes.
pub const KEY_LEN: usize = 12;

/// Raw (decoded) key width in bytes.
pub const RAW_KEY_LEN: usize = 9;

pub type Key = [u8; KEY_LEN];

const FIRST: u8 = ALPHABET_SORTABLE_BYTES[0];
const LAST: u8 = ALPHABET_SORTABLE_BYTES[63];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("key must be 12 bytes, got {0}")]
    InvalidLength(usize),
    #[error("invalid key character {ch:?} at {pos}")]
    InvalidChar { ch: char, pos: usize },
}

/// Parses and validates an encoded key.
pub fn parse_key(s: &str) -> Result<Key, KeyError> {
    let bytes = s.as_bytes();
    if bytes.len() != KEY_LEN {
        return Err(KeyError::InvalidLength(bytes.len()));
    }
    let mut key = [0u8; KEY_LEN];
    for (pos, &b) in bytes.iter().enumerate() {
        if REVERSE[b as usize] < 0 {
            let ch = s[pos..].chars().next().unwrap_or(char::REPLACEMENT_CHARACTER);
            return Err(KeyError::InvalidChar { ch, pos });
        }
        key[pos] = b;
    }
    Ok(key)
}

/// Encodes 9 raw bytes into a key.
pub fn key_from_raw(raw: &[u8; RAW_KEY_LEN]) -> Key {
    let mut s = String::with_capacity(KEY_LEN);
    write_base64_sortable(raw, &mut s);
    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(s.as_bytes());
    key
}

/// Decodes a key back into its 9 raw bytes.
pub fn key_to_raw(key: &Key) -> Result<[u8; RAW_KEY_LEN], KeyError> {
    let s = key_as_str(key)?;
    let bytes = from_base64_sortable(s).map_err(|_| first_invalid(key))?;
    let mut raw = [0u8; RAW_KEY_LEN];
    raw.copy_from_slice(&bytes);
    Ok(raw)
}

/// Borrows a key as text, failing when it holds bytes outside the alphabet.
pub fn key_as_str(key: &Key) -> Result<&str, KeyError> {
    if key.iter().any(|&b| REVERSE[b as usize] < 0) {
        return Err(first_invalid(key));
    }
    // alphabet is pure ASCII
    std::str::from_utf8(key).map_err(|_| first_invalid(key))
}

/// The smallest key strictly greater than `key`.
///
/// The maximum key (`zzzzzzzzzzzz`) has no successor and is returned
/// unchanged. Bytes outside the alphabet count as its first character.
pub fn inc_key(key: &Key) -> Key {
    let mut out = *key;
    for pos in (0..KEY_LEN).rev() {
        let idx = REVERSE[out[pos] as usize].max(0) as usize;
        if idx == 63 {
            out[pos] = FIRST;
        } else {
            out[pos] = ALPHABET_SORTABLE_BYTES[idx + 1];
            return out;
        }
    }
    [LAST; KEY_LEN]
}

/// The greatest key strictly less than `key`.
///
/// The minimum key (`------------`) has no predecessor and is returned
/// unchanged. Bytes outside the alphabet count as its first character.
pub fn dec_key(key: &Key) -> Key {
    let mut out = *key;
    for pos in (0..KEY_LEN).rev() {
        let idx = REVERSE[out[pos] as usize].max(0) as usize;
        if idx == 0 {
            out[pos] = LAST;
        } else {
            out[pos] = ALPHABET_SORTABLE_BYTES[idx - 1];
            return out;
        }
    }
    [FIRST; KEY_LEN]
}

fn first_invalid(key: &Key) -> KeyError {
    match key.iter().position(|&b| REVERSE[b as usize] < 0) {
        Some(pos) => KeyError::InvalidChar {
            ch: key[pos] as char,
            pos,
        },
        None => KeyError::InvalidLength(key.len()),
    }
}
