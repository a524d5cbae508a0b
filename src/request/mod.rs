//! Request pipeline module
//!
//! Orchestrates transport, envelope decoding, validation and delivery for a
//! single request.
//!
//! # Overview
//!
//! - [`Requests::execute`] - the primitive: fetch, parse, decode, validate
//! - [`Requests::request`] - callback form with lane-aware delivery
//! - [`Requests::document`], [`Requests::decoded`], [`Requests::parsed`] -
//!   specializations funnelling into `execute`

mod options;
mod pipeline;

pub use options::RequestOptions;
pub use pipeline::{ignore_errors, RequestConfig, Requests};
