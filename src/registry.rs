//! Handler registry.
//!
//! Stores one [`RequestHandler`] per (method, url pattern) and resolves
//! incoming requests to the first matching pattern in registration order.

use crate::handler::RequestHandler;
use crate::http::HttpMethod;
use crate::matcher::UrlParams;
use std::collections::HashMap;
use tracing::debug;

/// Result of a registry lookup.
#[derive(Debug)]
pub struct HandlerMatch<'a> {
    pub handler: Option<&'a RequestHandler>,
    pub url_params: UrlParams,
}

/// Registry of mock handlers, keyed by method then url pattern.
#[derive(Debug, Default)]
pub struct MockApiService {
    handlers: HashMap<HttpMethod, Vec<RequestHandler>>,
}

impl MockApiService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the handler for `method` whose pattern matches `url`.
    ///
    /// Patterns are tried in registration order and the first match wins.
    /// No match is not an error: the returned `handler` is `None`.
    pub fn find_handler(&self, method: HttpMethod, url: &str) -> HandlerMatch<'_> {
        let found = self.handlers.get(&method).and_then(|handlers| {
            handlers
                .iter()
                .find_map(|handler| handler.pattern().matches(url).map(|params| (handler, params)))
        });

        match found {
            Some((handler, url_params)) => {
                debug!(method = %method, url = %url, pattern = %handler.url(), "Found handler");
                HandlerMatch {
                    handler: Some(handler),
                    url_params,
                }
            }
            None => HandlerMatch {
                handler: None,
                url_params: UrlParams::new(),
            },
        }
    }

    /// Register a handler, replacing any handler with the same method and url.
    ///
    /// A replaced handler keeps its original position in the lookup order.
    pub fn register(
        &mut self,
        method: HttpMethod,
        url: &str,
        delay: Option<u64>,
    ) -> &mut RequestHandler {
        let handlers = self.handlers.entry(method).or_default();
        let handler = RequestHandler::new(url, delay);

        let index = match handlers.iter().position(|h| h.url() == url) {
            Some(index) => {
                debug!(method = %method, url = %url, "Replacing handler");
                handlers[index] = handler;
                index
            }
            None => {
                handlers.push(handler);
                handlers.len() - 1
            }
        };

        &mut handlers[index]
    }

    pub fn on_get(&mut self, url: &str, delay: Option<u64>) -> &mut RequestHandler {
        self.register(HttpMethod::Get, url, delay)
    }

    pub fn on_post(&mut self, url: &str, delay: Option<u64>) -> &mut RequestHandler {
        self.register(HttpMethod::Post, url, delay)
    }

    pub fn on_patch(&mut self, url: &str, delay: Option<u64>) -> &mut RequestHandler {
        self.register(HttpMethod::Patch, url, delay)
    }

    pub fn on_delete(&mut self, url: &str, delay: Option<u64>) -> &mut RequestHandler {
        self.register(HttpMethod::Delete, url, delay)
    }

    pub fn on_put(&mut self, url: &str, delay: Option<u64>) -> &mut RequestHandler {
        self.register(HttpMethod::Put, url, delay)
    }

    pub fn on_head(&mut self, url: &str, delay: Option<u64>) -> &mut RequestHandler {
        self.register(HttpMethod::Head, url, delay)
    }

    pub fn on_jsonp(&mut self, url: &str, delay: Option<u64>) -> &mut RequestHandler {
        self.register(HttpMethod::Jsonp, url, delay)
    }

    pub fn on_options(&mut self, url: &str, delay: Option<u64>) -> &mut RequestHandler {
        self.register(HttpMethod::Options, url, delay)
    }

    /// Total number of registered handlers across all methods.
    pub fn len(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
