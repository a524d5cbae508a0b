// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # pagekit
//!
//! A request pipeline and cursor pagination engine for versioned HTTP+JSON
//! APIs.
//!
//! ## Features
//!
//! - **Paced transport**: jittered delay before each request, layered headers, form bodies
//! - **One decode path**: bytes → [`Document`] → typed model, with status validation
//! - **Cursor pagination**: sequential pages, ordered aggregation, resumable [`Bookmark`]s
//! - **Lanes**: callbacks delivered serially, in order, on a dedicated thread
//! - **Cancellation**: dropping the [`Session`] resolves pending work with `ReleasedSession`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagekit::{ApiEndpoint, Bookmark, Document, PageRequest, Session, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> pagekit::Result<()> {
//!     let session = Session::new(SessionConfig::default())?;
//!
//!     let request = PageRequest::for_endpoint(
//!         Bookmark::up_to(3),
//!         ApiEndpoint::new("https://api.example.com/v1/feed/timeline/"),
//!         |page: &Document| page.array("items").unwrap_or_default(),
//!     );
//!     let outcome = session.pagination().paginate(request).await;
//!
//!     println!("resume at {}", outcome.bookmark);
//!     let items = outcome.result?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Pagination        Bookmark → endpoint → page → splice   │
//! ├──────────────────────────────────────────────────────────┤
//! │  Requests          fetch → Document → decode → validate  │
//! ├──────────────────────────────────────────────────────────┤
//! │  Transport         pacing → headers/cookies → dispatch   │
//! ├──────────────────────────────────────────────────────────┤
//! │  Session           config, lanes, Weak back-references   │
//! └──────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Session configuration
pub mod config;

/// Pagination cursor
pub mod bookmark;

/// Parsed response documents
pub mod document;

/// Endpoint capability
pub mod endpoint;

/// Sessions and execution lanes
pub mod session;

/// Paced HTTP transport
pub mod http;

/// Request pipeline and options
pub mod request;

/// Cursor pagination engine
pub mod pagination;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use bookmark::Bookmark;
pub use config::{load_session_config, load_session_config_from_str, Cookie, SessionConfig};
pub use document::{Document, FromDocument};
pub use endpoint::{ApiEndpoint, Endpoint};
pub use error::{Error, Result};
pub use pagination::{PageRequest, PageUpdate, Paginated, Pagination, PaginationOutcome};
pub use request::{ignore_errors, RequestConfig, RequestOptions, Requests};
pub use session::Session;
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
