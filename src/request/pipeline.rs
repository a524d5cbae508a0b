//! Request pipeline
//!
//! Turns one endpoint into one decoded value: transport, envelope parsing,
//! the caller's decode function, status validation, then delivery.

use super::options::RequestOptions;
use crate::document::{Document, FromDocument};
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::http::{RawResponse, Transport};
use crate::session::Session;
use crate::types::{Body, DelayRange, Method, StringMap};
use futures::FutureExt;
use serde::de::DeserializeOwned;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// HTTP method (forced to POST when a body is present)
    pub method: Method,
    /// Request body
    pub body: Option<Body>,
    /// Per-call headers, layered over session headers
    pub headers: StringMap,
    /// Capabilities
    pub options: RequestOptions,
    /// Pacing override for this request
    pub delay: Option<DelayRange>,
}

impl RequestConfig {
    /// Create a new request config (GET, default options)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the method
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the body
    #[must_use]
    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Replace all per-call headers
    #[must_use]
    pub fn headers(mut self, headers: StringMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set the options
    #[must_use]
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the pacing range for this request
    #[must_use]
    pub fn delay(mut self, delay: DelayRange) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Request pipeline bound to a session
#[derive(Debug, Clone)]
pub struct Requests {
    transport: Transport,
}

impl Requests {
    /// Create a pipeline for `session`
    pub fn new(session: &Arc<Session>) -> Self {
        Self {
            transport: Transport::new(session),
        }
    }

    /// The transport used by this pipeline
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Fetch `endpoint` and decode it with `decode`.
    ///
    /// This is the primitive every other request funnels into. The result
    /// is returned to the awaiting task; use [`Requests::request`] for
    /// lane-aware callback delivery.
    pub async fn execute<E, T, F>(&self, endpoint: &E, config: RequestConfig, decode: F) -> Result<T>
    where
        E: Endpoint + ?Sized,
        T: Send + 'static,
        F: FnOnce(Document) -> Option<T> + Send + 'static,
    {
        self.execute_url(endpoint.url(), config, decode).await
    }

    async fn execute_url<T, F>(&self, url: Result<Url>, config: RequestConfig, decode: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Document) -> Option<T> + Send + 'static,
    {
        let options = config.options;
        self.transport
            .fetch_with(
                config.method,
                url,
                config.body,
                config.headers,
                options,
                config.delay,
                move |response| process(response, options, decode),
            )
            .await
    }

    /// Callback form of [`Requests::execute`].
    ///
    /// `completion` is invoked exactly once: on the delivery lane when
    /// `deliver_on_callback_lane` is set, otherwise on the task that
    /// produced the result. A panicking `decode` yields a lane error.
    pub fn request<E, T, F, C>(&self, endpoint: &E, config: RequestConfig, decode: F, completion: C)
    where
        E: Endpoint + ?Sized,
        T: Send + 'static,
        F: FnOnce(Document) -> Option<T> + Send + 'static,
        C: FnOnce(Result<T>) + Send + 'static,
    {
        let url = endpoint.url();
        let Some(session) = self.transport.session() else {
            return completion(Err(Error::ReleasedSession));
        };
        let request_lane = session.lanes().request.clone();
        let delivery = session.lanes().delivery.clone();
        drop(session);

        let this = self.clone();
        let deliver = config.options.deliver_on_callback_lane;
        request_lane.spawn(async move {
            let result = AssertUnwindSafe(this.execute_url(url, config, decode))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(Error::lane("request task panicked")));
            if deliver {
                delivery.dispatch(move || completion(result));
            } else {
                completion(result);
            }
        });
    }

    /// Fetch the raw document
    pub async fn document<E>(&self, endpoint: &E, config: RequestConfig) -> Result<Document>
    where
        E: Endpoint + ?Sized,
    {
        self.execute(endpoint, config, Some).await
    }

    /// Fetch and decode a serde model.
    ///
    /// Keys are normalized from `snake_case` to `camelCase` first; see
    /// [`Document::decode`].
    pub async fn decoded<E, T>(&self, endpoint: &E, config: RequestConfig) -> Result<T>
    where
        E: Endpoint + ?Sized,
        T: DeserializeOwned + Send + 'static,
    {
        self.execute(endpoint, config, |document| document.decode().ok())
            .await
    }

    /// Fetch a model built directly from the document
    pub async fn parsed<E, T>(&self, endpoint: &E, config: RequestConfig) -> Result<T>
    where
        E: Endpoint + ?Sized,
        T: FromDocument + Send + 'static,
    {
        self.execute(endpoint, config, T::from_document).await
    }
}

/// Turn a raw response into a decoded value
pub(super) fn process<T, F>(response: RawResponse, options: RequestOptions, decode: F) -> Result<T>
where
    F: FnOnce(Document) -> Option<T>,
{
    let url = Some(response.url.as_str());
    let status = Some(response.status);

    let Some(bytes) = response.body.as_ref() else {
        return Err(Error::invalid_response(url, status, "invalid response"));
    };
    let document = Document::from_slice(bytes)
        .map_err(|e| Error::invalid_response(url, status, format!("malformed payload: {e}")))?;

    let invalid_status = options.validate_status && response.status != 200;
    let dump = invalid_status.then(|| document.pretty());

    let Some(value) = decode(document) else {
        return Err(Error::invalid_response(
            url,
            status,
            "processing handler returned none",
        ));
    };

    if let Some(dump) = dump {
        debug!("Rejecting {} from {}", response.status, response.url);
        return Err(Error::invalid_response(url, status, dump));
    }
    Ok(value)
}

/// Turn a failed document fetch into an empty document.
///
/// A convenience for callers that only care about data when it is there;
/// the pipeline itself never discards errors.
pub fn ignore_errors(result: Result<Document>) -> Document {
    result.unwrap_or_else(|e| {
        debug!("Ignoring request failure: {}", e);
        Document::null()
    })
}
