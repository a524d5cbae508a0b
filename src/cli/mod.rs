//! CLI module
//!
//! Command-line interface for one-off and paginated requests.
//!
//! # Commands
//!
//! - `fetch` - Fetch URLs and print their documents
//! - `paginate` - Follow a cursor and print aggregated items with the resume bookmark

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
