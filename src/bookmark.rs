//! Bookmark cursor
//!
//! A `Bookmark` pairs an opaque cursor with the number of pages still to
//! load. `Bookmark::next` is the only place that decides whether pagination
//! continues.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a position in a paginated listing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bookmark {
    /// Opaque cursor returned by the API (`None` for the first page)
    pub cursor: Option<String>,
    /// Pages still allowed to load, including the one this bookmark points at
    pub pages_remaining: usize,
}

impl Bookmark {
    /// Create a bookmark from its parts
    pub fn new(cursor: Option<String>, pages_remaining: usize) -> Self {
        Self {
            cursor,
            pages_remaining,
        }
    }

    /// The first page alone
    pub fn first() -> Self {
        Self::new(None, 1)
    }

    /// The first `count` pages
    pub fn up_to(count: usize) -> Self {
        Self::new(None, count)
    }

    /// Every page the API is willing to return
    pub fn everything() -> Self {
        Self::new(None, usize::MAX)
    }

    /// `count` pages starting at `cursor`
    pub fn from_cursor(cursor: impl Into<String>, count: usize) -> Self {
        Self::new(Some(cursor.into()), count)
    }

    /// Advance to the page identified by `candidate`.
    ///
    /// Returns `None` when the candidate is missing or empty, or when this
    /// bookmark already points at the last page allowed.
    pub fn next(&self, candidate: Option<&str>) -> Option<Bookmark> {
        let cursor = candidate.filter(|c| !c.is_empty())?;
        if self.pages_remaining <= 1 {
            return None;
        }
        Some(Self::new(Some(cursor.to_string()), self.pages_remaining - 1))
    }

    /// Whether another page may be requested with this bookmark
    pub fn can_load(&self) -> bool {
        self.pages_remaining > 0
    }
}

impl fmt::Display for Bookmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cursor = self.cursor.as_deref().unwrap_or("-");
        if self.pages_remaining == usize::MAX {
            write!(f, "{cursor}/∞")
        } else {
            write!(f, "{cursor}/{}", self.pages_remaining)
        }
    }
}
