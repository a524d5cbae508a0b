//! Transport: one paced HTTP request
//!
//! Handles:
//! - Eager URL resolution
//! - Jittered pacing before dispatch
//! - Wire request assembly (method, headers, cookies, form body)
//! - Lane hand-offs between dispatch and the continuation
//! - Session liveness checks at every suspension point
//!
//! There is no retry here. A failed fetch is terminal.

use crate::error::{Error, Result};
use crate::request::RequestOptions;
use crate::session::Session;
use crate::types::{Body, DelayRange, Method, StringMap};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use reqwest::{Client, Request};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::task::JoinError;
use tracing::{debug, warn};
use url::Url;

/// What came back from the network
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Final URL of the response
    pub url: Url,
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Body bytes; `None` when the body was empty
    pub body: Option<Bytes>,
}

/// Issues requests on behalf of a session it does not own
#[derive(Debug, Clone)]
pub struct Transport {
    session: Weak<Session>,
}

impl Transport {
    /// Create a transport for `session`
    pub fn new(session: &Arc<Session>) -> Self {
        Self {
            session: Arc::downgrade(session),
        }
    }

    /// The owning session, if it is still alive
    pub fn session(&self) -> Option<Arc<Session>> {
        self.session.upgrade()
    }

    /// Fetch one resource.
    ///
    /// `url` is resolved before anything is scheduled. The request waits
    /// out a delay sampled from `delay` (or the session default), is sent
    /// from the request lane, and resolves with [`Error::ReleasedSession`]
    /// if the session disappears before dispatch or before the response is
    /// handed back.
    pub async fn fetch(
        &self,
        method: Method,
        url: Result<Url>,
        body: Option<Body>,
        headers: StringMap,
        delay: Option<DelayRange>,
    ) -> Result<RawResponse> {
        let url = url.map_err(|_| Error::InvalidUrl)?;
        let session = self.session().ok_or(Error::ReleasedSession)?;

        let pause = match delay.or_else(|| session.delay()) {
            Some(range) => range.sample()?,
            None => Duration::ZERO,
        };
        let request_lane = session.lanes().request.clone();
        drop(session);

        let weak = self.session.clone();
        let dispatch = request_lane.spawn(async move {
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }

            let Some(session) = weak.upgrade() else {
                warn!("Session released before dispatch of {}", url);
                return Err(Error::ReleasedSession);
            };
            let request = build_request(&session, method, url, body.as_ref(), &headers).await?;
            let client = session.client().clone();
            drop(session);

            send(&client, request).await
        });

        let response = dispatch.await.map_err(lane_error)??;

        if self.session.upgrade().is_none() {
            warn!("Session released while {} was in flight", response.url);
            return Err(Error::ReleasedSession);
        }
        Ok(response)
    }

    /// Fetch one resource and run `continuation` on the response.
    ///
    /// With `hand_off_to_working_lane` set the continuation runs on the
    /// session's working lane; otherwise it runs on the calling task.
    #[allow(clippy::too_many_arguments)]
    pub async fn fetch_with<T, F>(
        &self,
        method: Method,
        url: Result<Url>,
        body: Option<Body>,
        headers: StringMap,
        options: RequestOptions,
        delay: Option<DelayRange>,
        continuation: F,
    ) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(RawResponse) -> Result<T> + Send + 'static,
    {
        let response = self.fetch(method, url, body, headers, delay).await?;

        if !options.hand_off_to_working_lane {
            return continuation(response);
        }

        let working = self
            .session()
            .map(|session| session.lanes().working.clone())
            .ok_or(Error::ReleasedSession)?;
        working
            .spawn(async move { continuation(response) })
            .await
            .map_err(lane_error)?
    }
}

/// Send a built request and collect the response
async fn send(client: &Client, request: Request) -> Result<RawResponse> {
    let method = request.method().clone();
    let started = Instant::now();
    debug!("Dispatching {} {}", method, request.url());

    let response = client.execute(request).await?;
    let status = response.status().as_u16();
    let url = response.url().clone();
    let headers = response.headers().clone();
    let bytes = response.bytes().await?;

    debug!(
        "Received {} for {} {} in {:?} ({} bytes)",
        status,
        method,
        url,
        started.elapsed(),
        bytes.len()
    );

    Ok(RawResponse {
        url,
        status,
        headers,
        body: (!bytes.is_empty()).then_some(bytes),
    })
}

/// Assemble the wire request from session state
async fn build_request(
    session: &Session,
    method: Method,
    url: Url,
    body: Option<&Body>,
    headers: &StringMap,
) -> Result<Request> {
    let overrides = session.headers().await;
    let cookie = session.cookie_header().await;
    wire_request(
        session.client(),
        session.config().default_headers(),
        &overrides,
        cookie.as_deref(),
        method,
        url,
        body,
        headers,
    )
}

/// Build a request from its layers.
///
/// Header precedence, lowest first: cookies, defaults, session overrides,
/// per-call headers. Any body, even an empty parameter map, forces POST.
#[allow(clippy::too_many_arguments)]
pub(crate) fn wire_request(
    client: &Client,
    defaults: Vec<(&'static str, String)>,
    overrides: &StringMap,
    cookie: Option<&str>,
    method: Method,
    url: Url,
    body: Option<&Body>,
    headers: &StringMap,
) -> Result<Request> {
    let method = if body.is_some() { Method::POST } else { method };

    let mut map = HeaderMap::new();
    if let Some(cookie) = cookie {
        map.insert(COOKIE, header_value(cookie)?);
    }
    for (key, value) in defaults {
        map.insert(header_name(key)?, header_value(&value)?);
    }
    for (key, value) in overrides.iter().chain(headers.iter()) {
        map.insert(header_name(key)?, header_value(value)?);
    }

    let mut builder = client.request(method.into(), url).headers(map);
    if let Some(bytes) = body.and_then(Body::encode) {
        builder = builder.body(bytes);
    }
    Ok(builder.build()?)
}

fn header_name(key: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(key.as_bytes())
        .map_err(|e| Error::config(format!("invalid header name '{key}': {e}")))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::config(format!("invalid header value '{value}': {e}")))
}

fn lane_error(e: JoinError) -> Error {
    Error::lane(format!("request task failed: {e}"))
}
