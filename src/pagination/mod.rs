//! Pagination module
//!
//! Cursor-driven, multi-page aggregation on top of the request pipeline.
//!
//! # Overview
//!
//! A run starts from a [`Bookmark`](crate::bookmark::Bookmark), loads one page
//! at a time, splices items out of each page into an ordered aggregate and
//! stops when:
//!
//! - a page fails (the outcome carries that page's bookmark)
//! - the page has no next cursor
//! - the bookmark runs out of pages
//!
//! Pages are strictly sequential and never retried.

mod engine;
mod types;

pub use engine::Pagination;
pub use types::{PageRequest, PageUpdate, Paginated, PaginationOutcome, NEXT_MAX_ID_KEY};
