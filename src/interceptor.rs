//! Interception pipeline.
//!
//! Sits in front of the real transport. Requests with a registered handler
//! are answered by the handler after the configured delay; everything else is
//! forwarded untouched to the next stage.

use crate::config::GlobalSettings;
use crate::error::MockApiError;
use crate::handler::{Reply, ReplyContext};
use crate::http::{HttpErrorResponse, HttpRequest, HttpResponse};
use crate::registry::MockApiService;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The stage an unmatched request is forwarded to.
#[async_trait]
pub trait HttpHandler: Send + Sync {
    async fn handle(&self, request: HttpRequest) -> Result<HttpResponse, MockApiError>;
}

/// Next stage for environments without a network: every request fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineBackend;

#[async_trait]
impl HttpHandler for OfflineBackend {
    async fn handle(&self, request: HttpRequest) -> Result<HttpResponse, MockApiError> {
        Err(MockApiError::Unreachable {
            method: request.method,
            url: request.url,
        })
    }
}

/// Mock API interceptor.
pub struct MockApiInterceptor {
    service: Arc<MockApiService>,
    settings: GlobalSettings,
    /// Total requests intercepted.
    requests_total: AtomicU64,
    /// Requests answered by a mock handler.
    requests_matched: AtomicU64,
    /// Requests forwarded to the next stage.
    requests_unmatched: AtomicU64,
}

impl MockApiInterceptor {
    /// Create an interceptor over a fully registered service.
    pub fn new(service: Arc<MockApiService>, settings: GlobalSettings) -> Self {
        info!(
            handlers = service.len(),
            default_delay_ms = ?settings.default_delay_ms,
            "Mock API interceptor initialized"
        );

        Self {
            service,
            settings,
            requests_total: AtomicU64::new(0),
            requests_matched: AtomicU64::new(0),
            requests_unmatched: AtomicU64::new(0),
        }
    }

    pub fn service(&self) -> &MockApiService {
        &self.service
    }

    /// Get total requests intercepted.
    pub fn total_requests(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    /// Get total requests matched to a handler.
    pub fn total_matched(&self) -> u64 {
        self.requests_matched.load(Ordering::Relaxed)
    }

    /// Get total requests forwarded to the next stage.
    pub fn total_unmatched(&self) -> u64 {
        self.requests_unmatched.load(Ordering::Relaxed)
    }

    /// Intercept a request.
    ///
    /// One registry lookup and at most one callback invocation happen per
    /// call. The callback runs immediately; the delay gates when its result
    /// reaches the caller. Handler faults are returned without delay.
    pub async fn intercept(
        &self,
        request: HttpRequest,
        next: &dyn HttpHandler,
    ) -> Result<HttpResponse, MockApiError> {
        self.requests_total.fetch_add(1, Ordering::Relaxed);

        let found = self.service.find_handler(request.method, &request.url);
        let Some(handler) = found.handler else {
            self.requests_unmatched.fetch_add(1, Ordering::Relaxed);
            if self.settings.log_unmatched {
                warn!(
                    method = %request.method,
                    url = %request.url,
                    "No matching handler, passing request through"
                );
            }
            return next.handle(request).await;
        };

        self.requests_matched.fetch_add(1, Ordering::Relaxed);
        if self.settings.log_matches {
            info!(
                method = %request.method,
                url = %request.url,
                handler = %handler.url(),
                "Request matched handler"
            );
        }

        let context = ReplyContext {
            request,
            url_params: found.url_params,
        };

        let reply = handler.response(Some(context)).await.map_err(|err| {
            warn!(handler = %handler.url(), error = %err, "Handler invocation failed");
            err
        })?;

        let delay_ms = handler
            .delay_ms()
            .or(self.settings.default_delay_ms)
            .unwrap_or(0);
        if delay_ms > 0 {
            debug!(handler = %handler.url(), delay_ms, "Applying delay");
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        into_response(reply)
    }
}

/// Map a reply to a success or error envelope.
fn into_response(reply: Option<Reply>) -> Result<HttpResponse, MockApiError> {
    let Some((status, body)) = reply else {
        return Err(HttpErrorResponse::not_found().into());
    };

    if (200..300).contains(&status) {
        return Ok(HttpResponse::ok(status, body));
    }

    let error = body.get("error").cloned().unwrap_or_default();
    Err(HttpErrorResponse::upstream(status, error).into())
}
