//! Multi-field compare-and-swap payload builder.
//!
//! A [`MultiCas`] collects `(field, new, old)` assertions for a single record
//! and serializes them into one JSON object keyed by scalar kind:
//!
//! ```text
//! {"1":[{"1":5,"2":false,"3":true}],"11":[{"1":3,"2":50,"3":100}]}
//! ```
//!
//! Inside each entry `"1"` is the field number, `"2"` the expected old value
//! and `"3"` the new value. Entries of one kind come out newest first.

use std::fmt::Write;

use coreds_util::append_json_str_to;
use tracing::trace;

/// Scalar kinds understood by the CAS endpoint, with their wire tags.
///
/// Only bool, bytes, string, double, uint32, fixed32 and fixed64 carry
/// assertions today; the other tags are reserved by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum CasKind {
    Bool = 1,
    Bytes = 2,
    String = 3,
    Float = 4,
    Double = 5,
    Uint32 = 6,
    Uint64 = 7,
    Int32 = 8,
    Int64 = 9,
    Fixed32 = 10,
    Fixed64 = 11,
    Sint32 = 12,
    Sint64 = 13,
    Sfixed32 = 14,
    Sfixed64 = 15,
}

impl CasKind {
    pub fn tag(self) -> u8 {
        self as u8
    }

    fn bit(self) -> u16 {
        1 << self.tag()
    }
}

/// Builder for one CAS mutation body.
///
/// String and bytes assertions borrow the caller's data for `'a`; nothing is
/// copied until [`MultiCas::stringify_to`].
#[derive(Debug, Default)]
pub struct MultiCas<'a> {
    list_bool: Vec<(u32, bool)>,
    list_bytes: Vec<(u32, &'a str, &'a str)>,
    list_string: Vec<(u32, &'a [u8], &'a [u8])>,
    list_double: Vec<(u32, f64, f64)>,
    list_uint32: Vec<(u32, u32, u32)>,
    list_fixed32: Vec<(u32, i32, i32)>,
    list_fixed64: Vec<(u32, i64, i64)>,
    flags: u16,
}

impl<'a> MultiCas<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no assertion has been added since creation or the last
    /// [`stringify_to`](Self::stringify_to).
    pub fn empty(&self) -> bool {
        self.flags == 0
    }

    /// True when at least one assertion of `kind` is pending.
    pub fn has(&self, kind: CasKind) -> bool {
        self.flags & kind.bit() != 0
    }

    /// Boolean assertion. Only the new value is taken: the wire pair is
    /// always `(!new_val, new_val)`.
    pub fn add_bool(&mut self, f: u32, new_val: bool) -> &mut Self {
        self.flags |= CasKind::Bool.bit();
        self.list_bool.push((f, new_val));
        self
    }

    /// Opaque bytes already encoded as base64 text; written verbatim.
    pub fn add_bytes(&mut self, f: u32, new_val: &'a str, old_val: &'a str) -> &mut Self {
        self.flags |= CasKind::Bytes.bit();
        self.list_bytes.push((f, new_val, old_val));
        self
    }

    /// String assertion over raw bytes; JSON-escaped on output.
    pub fn add_string(&mut self, f: u32, new_val: &'a [u8], old_val: &'a [u8]) -> &mut Self {
        self.flags |= CasKind::String.bit();
        self.list_string.push((f, new_val, old_val));
        self
    }

    pub fn add_str(&mut self, f: u32, new_val: &'a str, old_val: &'a str) -> &mut Self {
        self.add_string(f, new_val.as_bytes(), old_val.as_bytes())
    }

    /// Both values must be finite; `NaN` and infinities have no JSON form.
    pub fn add_double(&mut self, f: u32, new_val: f64, old_val: f64) -> &mut Self {
        debug_assert!(new_val.is_finite() && old_val.is_finite());
        self.flags |= CasKind::Double.bit();
        self.list_double.push((f, new_val, old_val));
        self
    }

    /// Varint-encoded unsigned 32-bit field.
    pub fn add_uint32(&mut self, f: u32, new_val: u32, old_val: u32) -> &mut Self {
        self.flags |= CasKind::Uint32.bit();
        self.list_uint32.push((f, new_val, old_val));
        self
    }

    pub fn add_fixed32(&mut self, f: u32, new_val: i32, old_val: i32) -> &mut Self {
        self.flags |= CasKind::Fixed32.bit();
        self.list_fixed32.push((f, new_val, old_val));
        self
    }

    /// Plain `i32` fields (including enums) travel as fixed32.
    pub fn add_int(&mut self, f: u32, new_val: i32, old_val: i32) -> &mut Self {
        self.add_fixed32(f, new_val, old_val)
    }

    pub fn add_fixed64(&mut self, f: u32, new_val: i64, old_val: i64) -> &mut Self {
        self.flags |= CasKind::Fixed64.bit();
        self.list_fixed64.push((f, new_val, old_val));
        self
    }

    pub fn add_int64(&mut self, f: u32, new_val: i64, old_val: i64) -> &mut Self {
        self.add_fixed64(f, new_val, old_val)
    }

    /// Unsigned 64-bit values are reinterpreted as two's-complement `i64`.
    pub fn add_uint64(&mut self, f: u32, new_val: u64, old_val: u64) -> &mut Self {
        self.add_fixed64(f, new_val as i64, old_val as i64)
    }

    /// Appends the JSON object to `buf` and drains every pending assertion.
    pub fn stringify_to(&mut self, buf: &mut String) {
        if self.flags == 0 {
            buf.push_str("{}");
            return;
        }
        trace!(kinds = self.flags.count_ones(), "cas: stringify");

        buf.push('{');
        let sz = buf.len();

        write_kind(buf, sz, CasKind::Bool, &mut self.list_bool, |buf, &(f, v)| {
            let _ = write!(buf, "{{\"1\":{f}");
            if v {
                buf.push_str(",\"2\":false,\"3\":true}");
            } else {
                buf.push_str(",\"2\":true,\"3\":false}");
            }
        });
        write_kind(buf, sz, CasKind::Bytes, &mut self.list_bytes, |buf, &(f, new, old)| {
            let _ = write!(buf, "{{\"1\":{f},\"2\":\"{old}\",\"3\":\"{new}\"}}");
        });
        write_kind(buf, sz, CasKind::String, &mut self.list_string, |buf, &(f, new, old)| {
            let _ = write!(buf, "{{\"1\":{f},\"2\":\"");
            append_json_str_to(buf, old);
            buf.push_str("\",\"3\":\"");
            append_json_str_to(buf, new);
            buf.push_str("\"}");
        });
        write_kind(buf, sz, CasKind::Double, &mut self.list_double, write_num_entry);
        write_kind(buf, sz, CasKind::Uint32, &mut self.list_uint32, write_num_entry);
        write_kind(buf, sz, CasKind::Fixed32, &mut self.list_fixed32, write_num_entry);
        write_kind(buf, sz, CasKind::Fixed64, &mut self.list_fixed64, write_num_entry);

        buf.push('}');
        self.flags = 0;
    }

    /// Convenience over [`stringify_to`](Self::stringify_to) into a fresh string.
    pub fn to_json_string(&mut self) -> String {
        let mut buf = String::new();
        self.stringify_to(&mut buf);
        buf
    }
}

/// Writes `"<tag>":[...]` for a non-empty list, newest entry first.
fn write_kind<T>(
    buf: &mut String,
    obj_start: usize,
    kind: CasKind,
    list: &mut Vec<T>,
    write_entry: impl Fn(&mut String, &T),
) {
    if list.is_empty() {
        return;
    }
    if buf.len() != obj_start {
        buf.push(',');
    }
    let _ = write!(buf, "\"{}\":[", kind.tag());
    for (i, entry) in list.drain(..).rev().enumerate() {
        if i != 0 {
            buf.push(',');
        }
        write_entry(buf, &entry);
    }
    buf.push(']');
}

fn write_num_entry<N: std::fmt::Display>(buf: &mut String, entry: &(u32, N, N)) {
    let (f, new, old) = entry;
    let _ = write!(buf, "{{\"1\":{f},\"2\":{old},\"3\":{new}}}");
}
