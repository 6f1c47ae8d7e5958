//! Order-preserving base64 and fixed-width key utilities.
//!
//! This crate provides:
//! - base64 encoding/decoding over an ASCII-sorted alphabet, so encoded
//!   strings compare the same way as the bytes they encode,
//! - the 12-character record [`key::Key`] with parsing and one-unit
//!   increment/decrement used to build exclusive range cursors.
//!
//! # Example
//!
//! ```
//! use coreds_base64::{from_base64_sortable, to_base64_sortable};
//!
//! let data = b"hello world";
//! let encoded = to_base64_sortable(data);
//! let decoded = from_base64_sortable(&encoded).unwrap();
//! assert_eq!(decoded.as_slice(), data);
//! ```

mod constants;
mod from_base64_sortable;
mod to_base64_sortable;

pub mod key;

pub use constants::{ALPHABET_SORTABLE, ALPHABET_SORTABLE_BYTES};
pub use from_base64_sortable::from_base64_sortable;
pub use key::{dec_key, inc_key, Key, KeyError, KEY_LEN, RAW_KEY_LEN};
pub use to_base64_sortable::{to_base64_sortable, write_base64_sortable};

/// Error type for base64 operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Base64Error {
    /// The input string contains characters outside the alphabet.
    #[error("INVALID_BASE64_STRING")]
    InvalidBase64String,
    /// The input length leaves a dangling character (`len % 4 == 1`).
    #[error("Base64 string length must not be 1 mod 4")]
    InvalidLength,
}
