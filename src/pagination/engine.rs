//! Pagination engine
//!
//! Loads pages one after another until the bookmark or the API says stop.
//! Each page is requested only after the previous page's `on_page` callback
//! has returned.

use super::types::{PageRequest, PageUpdate, PaginationOutcome};
use crate::bookmark::Bookmark;
use crate::error::Error;
use crate::request::Requests;
use crate::session::Session;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Pagination engine bound to a session
#[derive(Debug, Clone)]
pub struct Pagination {
    requests: Requests,
}

impl Pagination {
    /// Create an engine for `session`
    pub fn new(session: &Arc<Session>) -> Self {
        Self {
            requests: Requests::new(session),
        }
    }

    /// Run `request` to completion and return the outcome.
    ///
    /// The outcome always carries a bookmark to resume from: the one the
    /// failing page was requested with, or the last one loaded.
    pub async fn paginate<P, R>(&self, request: PageRequest<P, R>) -> PaginationOutcome<R>
    where
        P: Send + 'static,
        R: Clone + Send + 'static,
    {
        let mut bookmark = request.bookmark.clone();
        if !bookmark.can_load() {
            return PaginationOutcome::failure(Error::CannotLoadMore, bookmark);
        }
        let Some(session) = self.requests.transport().session() else {
            return PaginationOutcome::failure(Error::ReleasedSession, bookmark);
        };
        let delivery = session.lanes().delivery.clone();
        drop(session);

        let mut aggregate: Vec<R> = Vec::new();
        let mut loaded = 0usize;

        loop {
            let endpoint = request.endpoint_for(&bookmark);
            let config = request.config_for(&bookmark);
            let decode = Arc::clone(&request.decode);

            let page = match self
                .requests
                .execute(endpoint.as_ref(), config, move |document| decode(document))
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    warn!("Pagination stopped at {}: {}", bookmark, e);
                    return PaginationOutcome::failure(e, bookmark);
                }
            };
            loaded += 1;

            let new_items = (request.splice)(&page);
            aggregate.extend(new_items.iter().cloned());
            let next_cursor = (request.next_cursor)(&page);
            debug!(
                "Loaded page {} at {}: {} items, next cursor {:?}",
                loaded,
                bookmark,
                new_items.len(),
                next_cursor
            );

            if let Some(on_page) = &request.on_page {
                let on_page = Arc::clone(on_page);
                let update = PageUpdate {
                    page,
                    new_items,
                    bookmark: bookmark.clone(),
                    aggregate: aggregate.clone(),
                };
                delivery.dispatch_and_wait(move || on_page(update)).await;
            }

            if bookmark.pages_remaining == 0 {
                break;
            }
            match bookmark.next(next_cursor.as_deref()) {
                Some(next) => bookmark = next,
                None => break,
            }
        }

        info!(
            "Pagination finished after {} pages with {} items, resume at {}",
            loaded,
            aggregate.len(),
            bookmark
        );
        PaginationOutcome::success(aggregate, bookmark)
    }

    /// Callback form of [`Pagination::paginate`].
    ///
    /// `completion` runs exactly once, on the session's delivery lane. When
    /// the session is already gone it runs immediately on the caller. A panic
    /// in one of the request's functions completes the run with a lane error
    /// carrying the starting bookmark.
    pub fn request<P, R, C>(&self, request: PageRequest<P, R>, completion: C)
    where
        P: Send + 'static,
        R: Clone + Send + 'static,
        C: FnOnce(PaginationOutcome<R>) + Send + 'static,
    {
        let Some(session) = self.requests.transport().session() else {
            let bookmark: Bookmark = request.bookmark.clone();
            let error = if bookmark.can_load() {
                Error::ReleasedSession
            } else {
                Error::CannotLoadMore
            };
            return completion(PaginationOutcome::failure(error, bookmark));
        };
        let lanes = session.lanes().clone();
        drop(session);

        let this = self.clone();
        lanes.request.spawn(async move {
            let start = request.bookmark.clone();
            let outcome = AssertUnwindSafe(this.paginate(request))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    error!("Pagination from {} panicked", start);
                    PaginationOutcome::failure(Error::lane("pagination task panicked"), start)
                });
            lanes.delivery.dispatch(move || completion(outcome));
        });
    }
}
