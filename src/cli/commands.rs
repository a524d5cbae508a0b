//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Paced, cursor-aware client for JSON APIs
#[derive(Parser, Debug)]
#[command(name = "pagekit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Session configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Extra request header, `Name: value` (repeatable)
    #[arg(short = 'H', long = "header", global = true)]
    pub headers: Vec<String>,

    /// Lower bound of the pacing delay in seconds
    #[arg(long, global = true, requires = "delay_max")]
    pub delay_min: Option<f64>,

    /// Upper bound of the pacing delay in seconds
    #[arg(long, global = true, requires = "delay_min")]
    pub delay_max: Option<f64>,

    /// Accept non-200 responses
    #[arg(long, global = true)]
    pub no_validate: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch one or more URLs concurrently and print each document
    Fetch {
        /// URLs to fetch
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Follow a cursor across pages and print the aggregated items
    Paginate {
        /// URL of the first page
        url: String,

        /// Maximum number of pages (unbounded when omitted)
        #[arg(short, long)]
        pages: Option<usize>,

        /// Cursor to resume from
        #[arg(long)]
        cursor: Option<String>,

        /// Query parameter carrying the cursor
        #[arg(long, default_value = "max_id")]
        cursor_param: String,

        /// Path of the next cursor in each page
        #[arg(long, default_value = "next_max_id")]
        cursor_path: String,

        /// Path of the item array in each page
        #[arg(long, default_value = "items")]
        items_path: String,

        /// Print a progress line per page to stderr
        #[arg(long)]
        progress: bool,
    },
}
