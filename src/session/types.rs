//! Session type

use super::lanes::Lanes;
use crate::config::{Cookie, SessionConfig};
use crate::error::Result;
use crate::pagination::Pagination;
use crate::request::Requests;
use crate::types::{DelayRange, StringMap};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Caller-owned network configuration shared by requests and pagination runs
pub struct Session {
    config: SessionConfig,
    client: Client,
    lanes: Lanes,
    headers: RwLock<StringMap>,
    cookies: RwLock<Vec<Cookie>>,
}

impl Session {
    /// Create a session on the current tokio runtime
    pub fn new(config: SessionConfig) -> Result<Arc<Self>> {
        Self::with_lanes(config, Lanes::current()?)
    }

    /// Create a session running on explicit lanes
    pub fn with_lanes(config: SessionConfig, lanes: Lanes) -> Result<Arc<Self>> {
        config.validate()?;
        let client = Client::builder().timeout(config.timeout()).build()?;
        let headers = RwLock::new(config.headers.clone());
        let cookies = RwLock::new(config.cookies.clone());

        Ok(Arc::new(Self {
            config,
            client,
            lanes,
            headers,
            cookies,
        }))
    }

    /// The configuration the session was built from
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Lanes work is scheduled on
    pub fn lanes(&self) -> &Lanes {
        &self.lanes
    }

    /// Default pacing range
    pub fn delay(&self) -> Option<DelayRange> {
        self.config.delay
    }

    /// Snapshot of the header overrides
    pub async fn headers(&self) -> StringMap {
        self.headers.read().await.clone()
    }

    /// Set a header override
    pub async fn set_header(&self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.write().await.insert(key.into(), value.into());
    }

    /// Remove a header override
    pub async fn remove_header(&self, key: &str) -> Option<String> {
        self.headers.write().await.remove(key)
    }

    /// Snapshot of the current cookies
    pub async fn cookies(&self) -> Vec<Cookie> {
        self.cookies.read().await.clone()
    }

    /// Replace the cookies
    pub async fn set_cookies(&self, cookies: Vec<Cookie>) {
        *self.cookies.write().await = cookies;
    }

    /// Cookies rendered as a `Cookie` header value
    pub async fn cookie_header(&self) -> Option<String> {
        let cookies = self.cookies.read().await;
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(|c| format!("{}={}", c.name, c.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Request pipeline bound to this session
    pub fn requests(self: &Arc<Self>) -> Requests {
        Requests::new(self)
    }

    /// Pagination engine bound to this session
    pub fn pagination(self: &Arc<Self>) -> Pagination {
        Pagination::new(self)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("lanes", &self.lanes)
            .finish_non_exhaustive()
    }
}
