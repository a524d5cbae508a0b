//! Common types used throughout pagekit
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use crate::error::{Error, Result};
use bytes::Bytes;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

// ============================================================================
// Type Aliases
// ============================================================================

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

/// Ordered parameter map used for form bodies
pub type ParameterMap = BTreeMap<String, String>;

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => reqwest::Method::GET,
            Method::POST => reqwest::Method::POST,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::GET => f.write_str("GET"),
            Method::POST => f.write_str("POST"),
        }
    }
}

/// A request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Form parameters, encoded as `&`-joined `key=value` pairs
    Parameters(ParameterMap),
    /// Raw bytes, sent unchanged
    Data(Bytes),
}

impl Body {
    /// Create a parameter body from any iterator of pairs
    pub fn parameters<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Parameters(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Create a raw body
    pub fn data(bytes: impl Into<Bytes>) -> Self {
        Self::Data(bytes.into())
    }

    /// Encode the body for the wire. `None` means no body is sent.
    ///
    /// Values are written as-is; the remote API expects them unescaped.
    pub fn encode(&self) -> Option<Bytes> {
        match self {
            Body::Parameters(params) if params.is_empty() => None,
            Body::Parameters(params) => Some(Bytes::from(
                params
                    .iter()
                    .map(|(key, value)| format!("{key}={value}"))
                    .collect::<Vec<_>>()
                    .join("&"),
            )),
            Body::Data(data) => Some(data.clone()),
        }
    }
}

// ============================================================================
// Pacing
// ============================================================================

/// Closed range of seconds a request is held back before dispatch.
///
/// Sampled uniformly per request. This models human-like pacing; it is
/// never widened on failure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayRange {
    /// Lower bound in seconds
    pub min_secs: f64,
    /// Upper bound in seconds
    pub max_secs: f64,
}

impl DelayRange {
    /// Longest pause a range may ask for, in seconds
    pub const MAX_SECS: f64 = 3600.0;

    /// Create a range from its bounds, unchecked.
    ///
    /// Bounds are validated when the range is used; see
    /// [`DelayRange::validate`].
    pub fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    /// Create a range, rejecting bounds [`DelayRange::validate`] would reject
    pub fn try_new(min_secs: f64, max_secs: f64) -> Result<Self> {
        let range = Self::new(min_secs, max_secs);
        range.validate()?;
        Ok(range)
    }

    /// A range that always yields zero
    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Check that the bounds are finite, ordered and within
    /// [`DelayRange::MAX_SECS`]
    pub fn validate(&self) -> Result<()> {
        if !self.min_secs.is_finite() || !self.max_secs.is_finite() {
            return Err(Error::config("delay bounds must be finite"));
        }
        if self.min_secs < 0.0 || self.min_secs > self.max_secs {
            return Err(Error::config(format!(
                "invalid delay range {}..={}",
                self.min_secs, self.max_secs
            )));
        }
        if self.max_secs > Self::MAX_SECS {
            return Err(Error::config(format!(
                "delay of {}s exceeds the {}s limit",
                self.max_secs,
                Self::MAX_SECS
            )));
        }
        Ok(())
    }

    /// Sample a delay from the range
    pub fn sample(&self) -> Result<Duration> {
        self.validate()?;
        let secs = if self.max_secs > self.min_secs {
            rand::thread_rng().gen_range(self.min_secs..=self.max_secs)
        } else {
            self.min_secs
        };
        Duration::try_from_secs_f64(secs)
            .map_err(|e| Error::config(format!("invalid delay of {secs}s: {e}")))
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_empty_parameters_have_no_body() {
        let body = Body::Parameters(ParameterMap::new());
        assert!(body.encode().is_none());
    }

    #[test]
    fn test_parameters_are_joined() {
        let body = Body::parameters([("q", "rust"), ("count", "10")]);
        assert_eq!(body.encode().unwrap(), Bytes::from("count=10&q=rust"));
    }

    #[test]
    fn test_data_passes_through() {
        let body = Body::data(vec![0u8, 1, 2]);
        assert_eq!(body.encode().unwrap().as_ref(), &[0u8, 1, 2]);
    }

    #[test_case(0.0, 0.0 ; "zero")]
    #[test_case(0.5, 1.5 ; "ordered")]
    #[test_case(2.0, 2.0 ; "fixed")]
    fn test_delay_sample_within_range(a: f64, b: f64) {
        let range = DelayRange::try_new(a, b).unwrap();
        for _ in 0..32 {
            let secs = range.sample().unwrap().as_secs_f64();
            assert!(secs >= range.min_secs - f64::EPSILON);
            assert!(secs <= range.max_secs + f64::EPSILON);
        }
    }

    #[test_case(2.0, 1.0 ; "reversed")]
    #[test_case(-1.0, 1.0 ; "negative")]
    #[test_case(0.0, f64::INFINITY ; "infinite upper bound")]
    #[test_case(f64::NAN, 1.0 ; "nan")]
    #[test_case(1e20, 1e20 ; "too large for a duration")]
    #[test_case(0.0, 3601.0 ; "over the limit")]
    fn test_delay_rejects_unusable_bounds(a: f64, b: f64) {
        assert!(matches!(DelayRange::try_new(a, b), Err(Error::Config { .. })));
        assert!(matches!(
            DelayRange::new(a, b).sample(),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!(reqwest::Method::from(Method::GET), reqwest::Method::GET);
        assert_eq!(reqwest::Method::from(Method::POST), reqwest::Method::POST);
        assert_eq!(Method::POST.to_string(), "POST");
    }
}
