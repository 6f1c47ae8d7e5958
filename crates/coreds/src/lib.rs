//! Client-side cache for paginated, live-updating record lists.
//!
//! - [`store::WindowStore`] keeps the ordered record buffer, drives cursor
//!   fetches through a caller-supplied capability and reconciles refreshed
//!   pages into the buffer.
//! - [`range_key::RangeKey`] is the request shape those fetches carry.
//! - [`cas::MultiCas`] builds compare-and-swap mutation bodies.

pub mod cas;
pub mod range_key;
pub mod store;

pub use cas::{CasKind, MultiCas};
pub use coreds_base64::{Key, KEY_LEN};
pub use range_key::RangeKey;
pub use store::{EventType, FetchType, Record, RemoteRecord, StoreOpts, WindowStore};
