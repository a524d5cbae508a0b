//! CLI runner - executes commands

use crate::bookmark::Bookmark;
use crate::cli::commands::{Cli, Commands};
use crate::config::{load_session_config, SessionConfig};
use crate::document::Document;
use crate::endpoint::{ApiEndpoint, Endpoint};
use crate::error::{Error, Result, ResultExt};
use crate::pagination::PageRequest;
use crate::request::{RequestConfig, RequestOptions};
use crate::session::Session;
use crate::types::DelayRange;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let session = Session::new(self.session_config()?)?;

        match &self.cli.command {
            Commands::Fetch { urls } => self.fetch(&session, urls).await,
            Commands::Paginate {
                url,
                pages,
                cursor,
                cursor_param,
                cursor_path,
                items_path,
                progress,
            } => {
                let bookmark = Bookmark::new(cursor.clone(), pages.unwrap_or(usize::MAX));
                let endpoint = PageEndpoint {
                    url: url.clone(),
                    cursor_param: cursor_param.clone(),
                };
                self.paginate(
                    &session,
                    bookmark,
                    endpoint,
                    cursor_path.clone(),
                    items_path.clone(),
                    *progress,
                )
                .await
            }
        }
    }

    /// Build the session configuration from the config file and flags
    fn session_config(&self) -> Result<SessionConfig> {
        let mut config = match &self.cli.config {
            Some(path) => load_session_config(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => SessionConfig::default(),
        };

        if let (Some(min), Some(max)) = (self.cli.delay_min, self.cli.delay_max) {
            config.delay = Some(DelayRange::try_new(min, max)?);
        }
        for header in &self.cli.headers {
            let (key, value) = parse_header(header)?;
            config.headers.insert(key, value);
        }
        Ok(config)
    }

    /// Options applied to every request
    fn options(&self) -> RequestOptions {
        if self.cli.no_validate {
            RequestOptions::HAND_OFF_TO_WORKING_LANE
        } else {
            RequestOptions::PAGINATION
        }
    }

    async fn fetch(&self, session: &Arc<Session>, urls: &[String]) -> Result<()> {
        let requests = session.requests();
        let options = self.options();

        let results = futures::future::join_all(urls.iter().map(|url| {
            let requests = requests.clone();
            let endpoint = ApiEndpoint::new(url.clone());
            async move {
                requests
                    .document(&endpoint, RequestConfig::new().options(options))
                    .await
            }
        }))
        .await;

        let mut failed = 0;
        for (url, result) in urls.iter().zip(results) {
            match result {
                Ok(document) => println!("{}", document.pretty()),
                Err(e) => {
                    failed += 1;
                    eprintln!("{url}: {e}");
                }
            }
        }

        if failed > 0 {
            return Err(Error::Other(format!(
                "{failed} of {} requests failed",
                urls.len()
            )));
        }
        Ok(())
    }

    async fn paginate(
        &self,
        session: &Arc<Session>,
        bookmark: Bookmark,
        endpoint: PageEndpoint,
        cursor_path: String,
        items_path: String,
        progress: bool,
    ) -> Result<()> {
        let started = Instant::now();

        let mut request = PageRequest::custom(
            bookmark,
            move |bookmark: &Bookmark| -> Box<dyn Endpoint> {
                Box::new(endpoint.at(bookmark.cursor.as_deref()))
            },
            Some,
            move |page: &Document| page.string(&cursor_path),
            move |page: &Document| {
                page.array(&items_path)
                    .unwrap_or_default()
                    .into_iter()
                    .map(Document::into_value)
                    .collect::<Vec<Value>>()
            },
        )
        .options(self.options());

        if progress {
            request = request.on_page(|update| {
                eprintln!(
                    "page {}: {} items ({} total)",
                    update.bookmark,
                    update.new_items.len(),
                    update.aggregate.len()
                );
            });
        }

        let (result, bookmark) = session.pagination().paginate(request).await.into_parts();
        match result {
            Ok(items) => {
                info!(
                    "Collected {} items in {:?}",
                    items.len(),
                    started.elapsed()
                );
                let output = json!({ "items": items, "bookmark": bookmark });
                println!("{}", serde_json::to_string_pretty(&output)?);
                Ok(())
            }
            Err(e) => {
                let output = json!({ "error": e.to_string(), "bookmark": bookmark });
                println!("{}", serde_json::to_string_pretty(&output)?);
                Err(e)
            }
        }
    }
}

/// Endpoint template for the `paginate` command
struct PageEndpoint {
    url: String,
    cursor_param: String,
}

impl PageEndpoint {
    fn at(&self, cursor: Option<&str>) -> ApiEndpoint {
        ApiEndpoint::new(self.url.clone()).query_opt(self.cursor_param.clone(), cursor)
    }
}

/// Parse a `Name: value` header argument
fn parse_header(header: &str) -> Result<(String, String)> {
    let (key, value) = header
        .split_once(':')
        .ok_or_else(|| Error::config(format!("Header must look like 'Name: value': {header}")))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::config(format!("Header name is empty: {header}")));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
