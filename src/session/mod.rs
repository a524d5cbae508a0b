//! Session module
//!
//! A `Session` owns the network configuration shared by every request:
//! headers, cookies, the pacing range, the transport client, and the three
//! lanes work runs on.
//!
//! # Lanes
//!
//! - **request** - pacing and dispatch
//! - **working** - post-network, pre-delivery processing
//! - **delivery** - user-visible callbacks, run serially in submission order
//!
//! Sessions are owned by the caller through an `Arc`. Everything else in
//! the crate holds a `Weak` reference and treats a failed upgrade as
//! cancellation.

mod lanes;
mod types;

pub use lanes::{DeliveryLane, Lanes, DELIVERY_THREAD_NAME};
pub use types::Session;
