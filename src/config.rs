//! Session configuration
//!
//! Everything a [`Session`](crate::session::Session) needs to build its
//! transport client: default headers, cookies, pacing range and timeout.
//! Loadable from YAML or JSON.

use crate::error::{Error, Result};
use crate::types::{DelayRange, StringMap};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Header carrying the preferred locale
pub const ACCEPT_LANGUAGE_HEADER: &str = "Accept-Language";
/// Header advertising client capability flags
pub const CAPABILITIES_HEADER: &str = "X-Client-Capabilities";
/// Header advertising the network type
pub const CONNECTION_TYPE_HEADER: &str = "X-Connection-Type";
/// Content type for form-encoded bodies
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

// ============================================================================
// Session Config
// ============================================================================

/// A single cookie attached to every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
}

impl Cookie {
    /// Create a cookie
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Configuration for a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Locale sent as `Accept-Language`
    #[serde(default = "default_locale")]
    pub locale: String,

    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Capability flags header value
    #[serde(default = "default_capabilities")]
    pub capabilities: String,

    /// Connection type header value
    #[serde(default = "default_connection_type")]
    pub connection_type: String,

    /// Default pacing range, applied when a request does not give one
    #[serde(default)]
    pub delay: Option<DelayRange>,

    /// Header overrides, layered over the defaults
    #[serde(default)]
    pub headers: StringMap,

    /// Cookies attached to every request
    #[serde(default)]
    pub cookies: Vec<Cookie>,
}

fn default_timeout() -> u64 {
    15
}

fn default_locale() -> String {
    "en_US".to_string()
}

fn default_user_agent() -> String {
    format!("pagekit/{}", env!("CARGO_PKG_VERSION"))
}

fn default_capabilities() -> String {
    "3brTvw==".to_string()
}

fn default_connection_type() -> String {
    "WIFI".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            locale: default_locale(),
            user_agent: default_user_agent(),
            capabilities: default_capabilities(),
            connection_type: default_connection_type(),
            delay: None,
            headers: StringMap::new(),
            cookies: Vec::new(),
        }
    }
}

impl SessionConfig {
    /// Create a new config builder
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Headers every request starts from, before session overrides
    pub fn default_headers(&self) -> Vec<(&'static str, String)> {
        vec![
            (ACCEPT_LANGUAGE_HEADER, self.locale.clone()),
            (CAPABILITIES_HEADER, self.capabilities.clone()),
            (CONNECTION_TYPE_HEADER, self.connection_type.clone()),
            ("Content-Type", FORM_CONTENT_TYPE.to_string()),
            ("User-Agent", self.user_agent.clone()),
        ]
    }

    /// Check the config for values the transport cannot use
    pub fn validate(&self) -> Result<()> {
        if self.timeout_seconds == 0 {
            return Err(Error::config("timeout_seconds must be greater than zero"));
        }
        if let Some(delay) = &self.delay {
            delay.validate()?;
        }
        Ok(())
    }
}

/// Builder for session config
#[derive(Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_seconds = timeout.as_secs().max(1);
        self
    }

    /// Set the locale
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.config.locale = locale.into();
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Set the default pacing range
    pub fn delay(mut self, delay: DelayRange) -> Self {
        self.config.delay = Some(delay);
        self
    }

    /// Disable pacing
    pub fn no_delay(mut self) -> Self {
        self.config.delay = None;
        self
    }

    /// Add a header override
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(key.into(), value.into());
        self
    }

    /// Add a cookie
    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.cookies.push(Cookie::new(name, value));
        self
    }

    /// Build the config
    pub fn build(self) -> SessionConfig {
        self.config
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Parse a session config from a YAML string
pub fn load_session_config_from_str(content: &str) -> Result<SessionConfig> {
    let config: SessionConfig = serde_yaml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load a session config from a `.yaml`/`.yml` or `.json` file
pub fn load_session_config(path: impl AsRef<Path>) -> Result<SessionConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::Io(e)
        }
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        let config: SessionConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    } else {
        load_session_config_from_str(&content)
    }
}
