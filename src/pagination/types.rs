//! Pagination types and traits
//!
//! Defines what a pagination run is asked to do (`PageRequest`), what it
//! reports along the way (`PageUpdate`) and how it ends (`PaginationOutcome`).

use crate::bookmark::Bookmark;
use crate::document::{Document, FromDocument};
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::request::{RequestConfig, RequestOptions};
use crate::types::{Body, DelayRange, Method, StringMap};
use std::fmt;
use std::sync::Arc;

/// Key holding the next cursor in paginated responses
pub const NEXT_MAX_ID_KEY: &str = "next_max_id";
const MORE_AVAILABLE_KEY: &str = "more_available";
const NUM_RESULTS_KEY: &str = "num_results";
const AUTO_LOAD_MORE_KEY: &str = "auto_load_more_enabled";

type EndpointFn = Box<dyn Fn(&Bookmark) -> Box<dyn Endpoint> + Send + Sync>;
type BodyFn = Box<dyn Fn(&Bookmark) -> Option<Body> + Send + Sync>;
type HeadersFn = Box<dyn Fn(&Bookmark) -> StringMap + Send + Sync>;
type CursorFn<P> = Box<dyn Fn(&P) -> Option<String> + Send + Sync>;
type DecodeFn<P> = Arc<dyn Fn(Document) -> Option<P> + Send + Sync>;
type SpliceFn<P, R> = Box<dyn Fn(&P) -> Vec<R> + Send + Sync>;
type PageFn<P, R> = Arc<dyn Fn(PageUpdate<P, R>) + Send + Sync>;

/// A page type that knows where the next page starts
///
/// The metadata methods report what the API said about the listing. They
/// are informational only and never affect when pagination stops.
pub trait Paginated {
    /// Cursor of the following page, if any
    fn next_cursor(&self) -> Option<String>;

    /// Whether the API claims more pages exist
    fn more_available(&self) -> Option<bool> {
        None
    }

    /// Number of results the API says this page holds
    fn num_results(&self) -> Option<i64> {
        None
    }

    /// Whether the API suggests loading more automatically
    fn auto_load_more_enabled(&self) -> Option<bool> {
        None
    }
}

impl Paginated for Document {
    fn next_cursor(&self) -> Option<String> {
        self.string(NEXT_MAX_ID_KEY)
    }

    fn more_available(&self) -> Option<bool> {
        self.bool(MORE_AVAILABLE_KEY)
    }

    fn num_results(&self) -> Option<i64> {
        self.int(NUM_RESULTS_KEY)
    }

    fn auto_load_more_enabled(&self) -> Option<bool> {
        self.bool(AUTO_LOAD_MORE_KEY)
    }
}

/// Progress report for one loaded page
#[derive(Debug, Clone)]
pub struct PageUpdate<P, R> {
    /// The decoded page
    pub page: P,
    /// Items spliced out of this page
    pub new_items: Vec<R>,
    /// Bookmark the page was loaded with
    pub bookmark: Bookmark,
    /// Every item gathered so far, this page included
    pub aggregate: Vec<R>,
}

/// Final result of a pagination run
#[derive(Debug)]
pub struct PaginationOutcome<R> {
    /// Aggregated items, or the error that stopped the run
    pub result: Result<Vec<R>>,
    /// Where to resume from
    pub bookmark: Bookmark,
}

impl<R> PaginationOutcome<R> {
    /// A run that finished normally
    pub fn success(items: Vec<R>, bookmark: Bookmark) -> Self {
        Self {
            result: Ok(items),
            bookmark,
        }
    }

    /// A run stopped by `error`
    pub fn failure(error: Error, bookmark: Bookmark) -> Self {
        Self {
            result: Err(error),
            bookmark,
        }
    }

    /// Whether the run finished without error
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Split into the result and the resumption bookmark
    pub fn into_parts(self) -> (Result<Vec<R>>, Bookmark) {
        (self.result, self.bookmark)
    }
}

/// Everything a pagination run needs to load its pages
pub struct PageRequest<P, R> {
    pub(super) bookmark: Bookmark,
    method: Method,
    endpoint: EndpointFn,
    body: Option<BodyFn>,
    headers: Option<HeadersFn>,
    options: RequestOptions,
    delay: Option<DelayRange>,
    pub(super) next_cursor: CursorFn<P>,
    pub(super) decode: DecodeFn<P>,
    pub(super) splice: SpliceFn<P, R>,
    pub(super) on_page: Option<PageFn<P, R>>,
}

impl<P, R> PageRequest<P, R> {
    /// Build a request from explicit decode and cursor functions
    pub fn custom<E, D, C, S>(
        bookmark: Bookmark,
        endpoint: E,
        decode: D,
        next_cursor: C,
        splice: S,
    ) -> Self
    where
        E: Fn(&Bookmark) -> Box<dyn Endpoint> + Send + Sync + 'static,
        D: Fn(Document) -> Option<P> + Send + Sync + 'static,
        C: Fn(&P) -> Option<String> + Send + Sync + 'static,
        S: Fn(&P) -> Vec<R> + Send + Sync + 'static,
    {
        Self {
            bookmark,
            method: Method::GET,
            endpoint: Box::new(endpoint),
            body: None,
            headers: None,
            options: RequestOptions::PAGINATION,
            delay: None,
            next_cursor: Box::new(next_cursor),
            decode: Arc::new(decode),
            splice: Box::new(splice),
            on_page: None,
        }
    }

    /// Set the method
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Build the body of each page from its bookmark
    #[must_use]
    pub fn body<F>(mut self, body: F) -> Self
    where
        F: Fn(&Bookmark) -> Option<Body> + Send + Sync + 'static,
    {
        self.body = Some(Box::new(body));
        self
    }

    /// Build the per-call headers of each page from its bookmark
    #[must_use]
    pub fn headers<F>(mut self, headers: F) -> Self
    where
        F: Fn(&Bookmark) -> StringMap + Send + Sync + 'static,
    {
        self.headers = Some(Box::new(headers));
        self
    }

    /// Set the options applied to every page
    #[must_use]
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the pacing range applied to every page
    #[must_use]
    pub fn delay(mut self, delay: DelayRange) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Observe each page as it lands, on the delivery lane
    #[must_use]
    pub fn on_page<F>(mut self, on_page: F) -> Self
    where
        F: Fn(PageUpdate<P, R>) + Send + Sync + 'static,
    {
        self.on_page = Some(Arc::new(on_page));
        self
    }

    /// The bookmark the run starts from
    pub fn bookmark(&self) -> &Bookmark {
        &self.bookmark
    }

    pub(super) fn endpoint_for(&self, bookmark: &Bookmark) -> Box<dyn Endpoint> {
        (self.endpoint)(bookmark)
    }

    pub(super) fn config_for(&self, bookmark: &Bookmark) -> RequestConfig {
        let headers = self
            .headers
            .as_ref()
            .map(|headers| headers(bookmark))
            .unwrap_or_default();
        let mut config = RequestConfig::new()
            .method(self.method)
            .options(self.options.inline())
            .headers(headers);
        if let Some(body) = self.body.as_ref().and_then(|body| body(bookmark)) {
            config = config.body(body);
        }
        if let Some(delay) = self.delay {
            config = config.delay(delay);
        }
        config
    }
}

impl<P, R> PageRequest<P, R>
where
    P: FromDocument + Paginated + 'static,
{
    /// Build a request for a page type that decodes itself
    pub fn new<E, S>(bookmark: Bookmark, endpoint: E, splice: S) -> Self
    where
        E: Fn(&Bookmark) -> Box<dyn Endpoint> + Send + Sync + 'static,
        S: Fn(&P) -> Vec<R> + Send + Sync + 'static,
    {
        Self::custom(bookmark, endpoint, P::from_document, P::next_cursor, splice)
    }

    /// Follow `endpoint`, moving it to each bookmark's cursor with
    /// [`Endpoint::next`]
    pub fn for_endpoint<E, S>(bookmark: Bookmark, endpoint: E, splice: S) -> Self
    where
        E: Endpoint + Clone + 'static,
        S: Fn(&P) -> Vec<R> + Send + Sync + 'static,
    {
        Self::new(
            bookmark,
            move |bookmark: &Bookmark| -> Box<dyn Endpoint> {
                match bookmark.cursor.as_deref() {
                    Some(cursor) => Box::new(endpoint.next(cursor)),
                    None => Box::new(endpoint.clone()),
                }
            },
            splice,
        )
    }
}

impl<P, R> fmt::Debug for PageRequest<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageRequest")
            .field("bookmark", &self.bookmark)
            .field("method", &self.method)
            .field("options", &self.options)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}
