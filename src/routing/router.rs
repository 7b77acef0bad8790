//! Request dispatch to static files or index queries.
//!
//! # Responsibilities
//! - Serve `/static/<path>` from the static directory
//! - Answer every other target as a search query
//! - Always produce a well-formed response; failures become 404 pages
//!
//! # Design Decisions
//! - Immutable after construction; shared by all workers without locks
//! - Holds only a read handle to the frozen index

use std::time::Instant;

use crate::config::StaticFilesConfig;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::index::SharedIndex;
use crate::observability::metrics;
use crate::routing::files::{content_type_for, StaticFiles};
use crate::routing::matcher::PathPrefixMatcher;
use crate::routing::page::{render_not_found, render_search_page};

/// Which handler a request went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    StaticFile,
    Query,
}

impl RouteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKind::StaticFile => "static",
            RouteKind::Query => "query",
        }
    }
}

/// Maps requests to responses.
#[derive(Debug, Clone)]
pub struct RequestRouter {
    index: SharedIndex,
    files: StaticFiles,
    static_prefix: PathPrefixMatcher,
}

impl RequestRouter {
    pub fn new(index: SharedIndex, config: &StaticFilesConfig) -> Self {
        Self {
            index,
            files: StaticFiles::new(config.base_dir.clone()),
            static_prefix: PathPrefixMatcher::new(config.url_prefix.clone()),
        }
    }

    pub fn index(&self) -> &SharedIndex {
        &self.index
    }

    /// Decide which handler serves `target`.
    pub fn classify(&self, target: &str) -> RouteKind {
        if self.static_prefix.matches(target) {
            RouteKind::StaticFile
        } else {
            RouteKind::Query
        }
    }

    /// Produce the response for `request`.
    pub async fn route(&self, request: &Request) -> Response {
        let start = Instant::now();
        let kind = self.classify(request.target());

        let response = match kind {
            RouteKind::StaticFile => {
                let relative = self.static_prefix.strip(request.target()).unwrap_or_default();
                self.serve_file(relative).await
            }
            RouteKind::Query => self.serve_query(request.target()),
        };

        metrics::record_request(kind.as_str(), response.status, start);
        response.with_close(request.wants_close())
    }

    async fn serve_file(&self, relative: &str) -> Response {
        match self.files.read(relative).await {
            Ok(body) => Response::ok(content_type_for(relative), body),
            Err(e) => {
                tracing::debug!(file = %relative, error = %e, "Static file not served");
                Response::not_found(render_not_found(relative))
            }
        }
    }

    fn serve_query(&self, target: &str) -> Response {
        let raw = terms_param(target)
            .map(str::to_lowercase)
            .filter(|terms| !terms.is_empty());

        let page = match raw {
            Some(raw) => {
                let terms: Vec<&str> = raw.split('+').map(str::trim).collect();
                let results = self.index.lookup_query(&terms);
                metrics::record_query_results(results.len());
                tracing::debug!(terms = ?terms, results = results.len(), "Query answered");
                render_search_page(
                    Some((raw.as_str(), results.as_slice())),
                    self.static_prefix.prefix(),
                )
            }
            None => render_search_page(None, self.static_prefix.prefix()),
        };

        Response::ok("text/html", page)
    }
}

/// Raw value of the `terms` query parameter, if present.
fn terms_param(target: &str) -> Option<&str> {
    let (_, query) = target.split_once('?')?;
    let query = query.split('#').next().unwrap_or_default();
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "terms")
        .map(|(_, value)| value)
}
