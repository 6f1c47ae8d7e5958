use std::fmt::Write;

/// Append `src` to `text` as the body of a JSON string (no surrounding quotes).
///
/// Printable ASCII is copied through. Quote, backslash and the usual
/// whitespace controls get their short escapes. Anything else is decoded as
/// UTF-8 first:
/// - a code point in `0x80..=0xFFFF` becomes `\uXXXX`,
/// - everything else (other control bytes, DEL, supplementary-plane
///   characters, invalid UTF-8) is written byte by byte as `\xXX`.
///
/// Hex digits are upper case.
///
/// # Examples
///
/// ```
/// use coreds_util::strings::append_json_str_to;
///
/// let mut out = String::from("\"");
/// append_json_str_to(&mut out, "say \"hi\"\n".as_bytes());
/// out.push('"');
/// assert_eq!(out, "\"say \\\"hi\\\"\\n\"");
///
/// let mut out = String::new();
/// append_json_str_to(&mut out, "é".as_bytes());
/// assert_eq!(out, "\\u00E9");
/// ```
pub fn append_json_str_to(text: &mut String, src: &[u8]) {
    let len = src.len();
    let mut last = 0;
    let mut i = 0;

    while i < len {
        let c = src[i];
        let escaped = match c {
            b'\n' => Some("\\n"),
            b'\t' => Some("\\t"),
            b'\r' => Some("\\r"),
            0x08 => Some("\\b"),
            0x0C => Some("\\f"),
            b'"' => Some("\\\""),
            b'\\' => Some("\\\\"),
            b' '..=b'~' => {
                i += 1;
                continue;
            }
            _ => None,
        };

        // flush the printable run before this byte
        push_ascii(text, &src[last..i]);

        if let Some(esc) = escaped {
            text.push_str(esc);
            i += 1;
        } else {
            match decode_utf8_at(src, i) {
                Some((ucc, width)) if (0x80..=0xFFFF).contains(&ucc) => {
                    let _ = write!(text, "\\u{:04X}", ucc);
                    i += width;
                }
                _ => {
                    let _ = write!(text, "\\x{:02X}", c);
                    i += 1;
                }
            }
        }
        last = i;
    }

    push_ascii(text, &src[last..]);
}

/// Escape `src` into a fresh string. See [`append_json_str_to`].
///
/// ```
/// use coreds_util::strings::escape_json;
///
/// assert_eq!(escape_json(b"tab\there"), "tab\\there");
/// ```
pub fn escape_json(src: &[u8]) -> String {
    let mut out = String::with_capacity(src.len());
    append_json_str_to(&mut out, src);
    out
}

fn push_ascii(text: &mut String, run: &[u8]) {
    // runs only ever contain printable ASCII
    text.extend(run.iter().map(|&b| b as char));
}

/// Decodes one UTF-8 scalar starting at `i`, returning it with its byte width.
fn decode_utf8_at(src: &[u8], i: usize) -> Option<(u32, usize)> {
    let width = match src[i] {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return None,
    };
    let end = i.checked_add(width)?;
    let bytes = src.get(i..end)?;
    let ch = std::str::from_utf8(bytes).ok()?.chars().next()?;
    Some((ch as u32, width))
}
