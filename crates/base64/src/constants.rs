/// Order-preserving base64 alphabet.
///
/// Characters are listed in ascending ASCII order, so comparing two encodings
/// of equal length byte-wise gives the same result as comparing the raw bytes.
pub const ALPHABET_SORTABLE: &str =
    "-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

/// [`ALPHABET_SORTABLE`] as a byte array (used for byte-level operations and const evaluation).
pub const ALPHABET_SORTABLE_BYTES: &[u8; 64] =
    b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

/// Reverse lookup: ASCII byte to alphabet index, `-1` for bytes outside the alphabet.
pub(crate) static REVERSE: [i8; 256] = {
    let mut table = [-1i8; 256];
    let mut i = 0;
    while i < 64 {
        table[ALPHABET_SORTABLE_BYTES[i] as usize] = i as i8;
        i += 1;
    }
    table
};
