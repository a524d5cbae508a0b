//! HTTP transport module
//!
//! Issues single requests on behalf of a [`Session`](crate::session::Session).
//!
//! # Features
//!
//! - **Pacing**: jittered delay before each dispatch (not a backoff)
//! - **Layered headers**: defaults, session overrides, per-call headers
//! - **Form bodies**: parameter maps become `key=value&...`, any body forces POST
//! - **Cancellation**: a dropped session resolves in-flight work with `ReleasedSession`

mod transport;

pub use transport::{RawResponse, Transport};

#[cfg(test)]
mod tests;
