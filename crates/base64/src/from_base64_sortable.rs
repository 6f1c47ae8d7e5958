//! Order-preserving base64 decoding.

use crate::constants::REVERSE;
use crate::Base64Error;

/// Decodes an unpadded sortable-base64 string.
///
/// # Errors
///
/// - [`Base64Error::InvalidLength`] when `len % 4 == 1` (no byte boundary).
/// - [`Base64Error::InvalidBase64String`] on a character outside the alphabet.
///
/// # Example
///
/// ```
/// use coreds_base64::{from_base64_sortable, to_base64_sortable};
///
/// let encoded = to_base64_sortable(b"hello");
/// assert_eq!(from_base64_sortable(&encoded).unwrap(), b"hello");
/// ```
pub fn from_base64_sortable(encoded: &str) -> Result<Vec<u8>, Base64Error> {
    let encoded_bytes = encoded.as_bytes();
    let length = encoded_bytes.len();
    if length % 4 == 1 {
        return Err(Base64Error::InvalidLength);
    }

    let mut buf = Vec::with_capacity(length / 4 * 3 + 2);
    let sextet = |i: usize| -> Result<u8, Base64Error> {
        let v = REVERSE[encoded_bytes[i] as usize];
        if v < 0 {
            Err(Base64Error::InvalidBase64String)
        } else {
            Ok(v as u8)
        }
    };

    let main_length = length - length % 4;
    let mut i = 0;
    while i < main_length {
        let sextet0 = sextet(i)?;
        let sextet1 = sextet(i + 1)?;
        let sextet2 = sextet(i + 2)?;
        let sextet3 = sextet(i + 3)?;

        buf.push((sextet0 << 2) | (sextet1 >> 4));
        buf.push((sextet1 << 4) | (sextet2 >> 2));
        buf.push((sextet2 << 6) | sextet3);
        i += 4;
    }

    match length - main_length {
        2 => {
            let sextet0 = sextet(main_length)?;
            let sextet1 = sextet(main_length + 1)?;
            buf.push((sextet0 << 2) | (sextet1 >> 4));
        }
        3 => {
            let sextet0 = sextet(main_length)?;
            let sextet1 = sextet(main_length + 1)?;
            let sextet2 = sextet(main_length + 2)?;
            buf.push((sextet0 << 2) | (sextet1 >> 4));
            buf.push((sextet1 << 4) | (sextet2 >> 2));
        }
        _ => {}
    }

    Ok(buf)
}
