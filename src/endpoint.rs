//! Endpoint capability
//!
//! The core treats endpoints as opaque: it only asks for a URL, and asks for
//! variants with a different cursor or rank token embedded.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use url::Url;

/// Query parameter carrying the pagination cursor
pub const MAX_ID_PARAM: &str = "max_id";

/// Query parameter carrying the rank token
pub const RANK_TOKEN_PARAM: &str = "rank_token";

/// Something that resolves to a request URL
pub trait Endpoint: Send + Sync {
    /// Resolve the URL. Failure maps to [`Error::InvalidUrl`].
    fn url(&self) -> Result<Url>;

    /// The same endpoint with `token` set as rank token
    #[must_use]
    fn rank(&self, token: &str) -> Self
    where
        Self: Sized;

    /// The same endpoint pointed at the page after `cursor`
    #[must_use]
    fn next(&self, cursor: &str) -> Self
    where
        Self: Sized;
}

/// A plain URL plus ordered query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
    base: String,
    query: BTreeMap<String, String>,
}

impl ApiEndpoint {
    /// Create an endpoint from a base URL
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            query: BTreeMap::new(),
        }
    }

    /// Set a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Set a query parameter only when a value is present
    #[must_use]
    pub fn query_opt(self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// The base URL
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Current value of a query parameter
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

impl Endpoint for ApiEndpoint {
    fn url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base).map_err(|_| Error::InvalidUrl)?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        Ok(url)
    }

    fn rank(&self, token: &str) -> Self {
        self.clone().query(RANK_TOKEN_PARAM, token)
    }

    fn next(&self, cursor: &str) -> Self {
        self.clone().query(MAX_ID_PARAM, cursor)
    }
}

impl Endpoint for Url {
    fn url(&self) -> Result<Url> {
        Ok(self.clone())
    }

    fn rank(&self, token: &str) -> Self {
        with_pair(self, RANK_TOKEN_PARAM, token)
    }

    fn next(&self, cursor: &str) -> Self {
        with_pair(self, MAX_ID_PARAM, cursor)
    }
}

/// Replace (or add) a single query pair
fn with_pair(url: &Url, key: &str, value: &str) -> Url {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let mut url = url.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair(key, value);
    url
}
