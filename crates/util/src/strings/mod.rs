//! String utilities.
//!
//! Provides the byte-oriented JSON escaper used when writing string values
//! into hand-built JSON payloads.

mod escape;

pub use escape::{append_json_str_to, escape_json};
