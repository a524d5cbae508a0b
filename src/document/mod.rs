//! Structured document module
//!
//! A `Document` is the parsed, dynamic form of a response body. It is used
//! both as a raw tree (path lookups) and as the single source for typed
//! decoding: bytes → tree → typed model.

mod keys;
mod types;

pub use keys::{camelize_keys, snake_to_camel};
pub use types::{Document, FromDocument};
