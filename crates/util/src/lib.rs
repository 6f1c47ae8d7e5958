//! coreds-util - Utility functions for coreds
//!
//! Currently this is the JSON text escaper shared by the CAS codec and the
//! range key serializer.

pub mod strings;

// Re-exports for convenience
pub use strings::{append_json_str_to, escape_json};
