//! Order-preserving base64 encoding.

use crate::constants::ALPHABET_SORTABLE_BYTES;

/// Encodes a byte slice with the sortable alphabet, without padding.
///
/// Inputs whose length is a multiple of three encode to exactly
/// `len / 3 * 4` characters, which is what fixed-width keys rely on.
///
/// # Example
///
/// ```
/// use coreds_base64::to_base64_sortable;
///
/// assert_eq!(to_base64_sortable(&[0, 0, 0]), "----");
/// assert_eq!(to_base64_sortable(&[0xff, 0xff, 0xff]), "zzzz");
/// ```
pub fn to_base64_sortable(uint8: &[u8]) -> String {
    let mut out = String::with_capacity((uint8.len() * 4 / 3) + 4);
    write_base64_sortable(uint8, &mut out);
    out
}

/// Appends the sortable encoding of `uint8` to `out`.
pub fn write_base64_sortable(uint8: &[u8], out: &mut String) {
    for chunk in uint8.chunks(3) {
        let mut group = 0u32;
        for (i, &b) in chunk.iter().enumerate() {
            group |= (b as u32) << (16 - 8 * i);
        }
        // n input bytes carry n + 1 sextets
        for i in 0..=chunk.len() {
            let sextet = (group >> (18 - 6 * i)) & 0x3f;
            out.push(ALPHABET_SORTABLE_BYTES[sextet as usize] as char);
        }
    }
}
