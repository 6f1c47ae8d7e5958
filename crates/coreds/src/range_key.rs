use std::fmt::Write;

use coreds_base64::Key;
use coreds_util::append_json_str_to;

/// Parameters of one cursor-based range request.
///
/// Serialized as `{"1":desc,"2":limit,"3":"start","4":"parent"}` with the two
/// key entries present only when set. The start key is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeKey {
    pub desc: bool,
    pub limit: usize,
    pub start_key: Option<Key>,
    pub parent_key: Option<Key>,
}

impl Default for RangeKey {
    fn default() -> Self {
        Self {
            desc: true,
            limit: 10,
            start_key: None,
            parent_key: None,
        }
    }
}

impl RangeKey {
    pub fn new(desc: bool, limit: usize, start_key: Option<Key>) -> Self {
        Self {
            desc,
            limit,
            start_key,
            parent_key: None,
        }
    }

    /// Scopes the range to the children of `parent`.
    pub fn with_parent(mut self, parent: Key) -> Self {
        self.parent_key = Some(parent);
        self
    }

    pub fn stringify_to(&self, buf: &mut String) {
        let _ = write!(buf, "{{\"1\":{},\"2\":{}", self.desc, self.limit);

        if let Some(key) = &self.start_key {
            buf.push_str(",\"3\":\"");
            append_json_str_to(buf, key);
            buf.push('"');
        }

        if let Some(key) = &self.parent_key {
            buf.push_str(",\"4\":\"");
            append_json_str_to(buf, key);
            buf.push('"');
        }

        buf.push('}');
    }

    pub fn to_json_string(&self) -> String {
        let mut buf = String::with_capacity(64);
        self.stringify_to(&mut buf);
        buf
    }
}
