//! Request handlers and their reply callbacks.

use crate::error::MockApiError;
use crate::http::HttpRequest;
use crate::matcher::{UrlParams, UrlPattern};
use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;
use futures_util::{FutureExt, Stream, StreamExt};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::debug;

/// A `[status, body]` pair produced by a reply callback.
pub type Reply = (u16, Value);

/// Per-invocation input to a reply callback.
#[derive(Debug, Clone)]
pub struct ReplyContext {
    pub request: HttpRequest,
    pub url_params: UrlParams,
}

/// What a reply callback hands back.
///
/// `None` inside any variant means "no response value" and is turned into a
/// 404 by the interceptor. Only the first value of a stream is used.
pub enum ReplyOutcome {
    Ready(Option<Reply>),
    Deferred(BoxFuture<'static, Option<Reply>>),
    Stream(BoxStream<'static, Option<Reply>>),
}

impl ReplyOutcome {
    /// A `[status, body]` reply.
    pub fn status(status: u16, body: Value) -> Self {
        ReplyOutcome::Ready(Some((status, body)))
    }

    /// A `200` reply.
    pub fn ok(body: Value) -> Self {
        Self::status(200, body)
    }

    /// No response value.
    pub fn empty() -> Self {
        ReplyOutcome::Ready(None)
    }

    /// A reply that resolves later.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Option<Reply>> + Send + 'static,
    {
        ReplyOutcome::Deferred(future.boxed())
    }

    /// A multi-valued reply; everything after the first item is dropped.
    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Option<Reply>> + Send + 'static,
    {
        ReplyOutcome::Stream(stream.boxed())
    }

    /// Resolve to a single value.
    ///
    /// A stream that ends without emitting resolves to `None`.
    pub async fn first(self) -> Option<Reply> {
        match self {
            ReplyOutcome::Ready(reply) => reply,
            ReplyOutcome::Deferred(future) => future.await,
            ReplyOutcome::Stream(mut stream) => stream.next().await.flatten(),
        }
    }
}

impl fmt::Debug for ReplyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyOutcome::Ready(reply) => f.debug_tuple("Ready").field(reply).finish(),
            ReplyOutcome::Deferred(_) => f.write_str("Deferred(..)"),
            ReplyOutcome::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<Reply> for ReplyOutcome {
    fn from(reply: Reply) -> Self {
        ReplyOutcome::Ready(Some(reply))
    }
}

impl From<Option<Reply>> for ReplyOutcome {
    fn from(reply: Option<Reply>) -> Self {
        ReplyOutcome::Ready(reply)
    }
}

/// Type-erased reply callback.
pub type ReplyCallback = Arc<dyn Fn(ReplyContext) -> ReplyOutcome + Send + Sync>;

/// A registered mock endpoint.
///
/// Request data is never stored on the handler; each invocation receives its
/// own [`ReplyContext`], so overlapping calls cannot observe each other.
pub struct RequestHandler {
    url: String,
    pattern: UrlPattern,
    delay: Option<u64>,
    reply: Option<ReplyCallback>,
    /// Maximum number of replies (0 = unlimited)
    reply_limit: u32,
    replied: AtomicU32,
}

impl RequestHandler {
    /// Create a handler for `url` with an optional delay override in milliseconds.
    pub fn new(url: impl Into<String>, delay: Option<u64>) -> Self {
        let url = url.into();
        let pattern = UrlPattern::parse(&url);
        Self {
            url,
            pattern,
            delay,
            reply: None,
            reply_limit: 0,
            replied: AtomicU32::new(0),
        }
    }

    /// Set the reply callback.
    pub fn reply<F, R>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(ReplyContext) -> R + Send + Sync + 'static,
        R: Into<ReplyOutcome>,
    {
        let callback: ReplyCallback =
            Arc::new(move |ctx: ReplyContext| -> ReplyOutcome { callback(ctx).into() });
        self.reply = Some(callback);
        self
    }

    /// Limit how many times this handler replies (0 = unlimited).
    pub fn reply_count(&mut self, count: u32) -> &mut Self {
        self.reply_limit = count;
        self
    }

    /// Override the response delay in milliseconds.
    pub fn delay(&mut self, delay_ms: u64) -> &mut Self {
        self.delay = Some(delay_ms);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn pattern(&self) -> &UrlPattern {
        &self.pattern
    }

    pub fn delay_ms(&self) -> Option<u64> {
        self.delay
    }

    /// Number of successful invocations so far.
    pub fn replied(&self) -> u32 {
        self.replied.load(Ordering::Relaxed)
    }

    fn is_exhausted(&self, replied: u32) -> bool {
        self.reply_limit > 0 && replied >= self.reply_limit
    }

    /// Invoke the reply callback and resolve its first value.
    ///
    /// Checks run in order: reply limit, callback presence, request context.
    /// The reply counter only moves when the callback is actually invoked.
    pub async fn response(
        &self,
        context: Option<ReplyContext>,
    ) -> Result<Option<Reply>, MockApiError> {
        if self.is_exhausted(self.replied()) {
            return Err(self.limit_exceeded());
        }

        let callback = self
            .reply
            .as_ref()
            .ok_or_else(|| MockApiError::NoReplyConfigured {
                url: self.url.clone(),
            })?;

        let context = context.ok_or_else(|| MockApiError::NoRequestContext {
            url: self.url.clone(),
        })?;

        // Reserve a reply slot; a concurrent caller may have taken the last one
        self.replied
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (!self.is_exhausted(n)).then_some(n + 1)
            })
            .map_err(|_| self.limit_exceeded())?;

        debug!(handler = %self.url, replied = self.replied(), "Invoking reply callback");

        Ok(callback(context).first().await)
    }

    fn limit_exceeded(&self) -> MockApiError {
        MockApiError::ReplyLimitExceeded {
            url: self.url.clone(),
            limit: self.reply_limit,
        }
    }
}

impl fmt::Debug for RequestHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHandler")
            .field("url", &self.url)
            .field("delay", &self.delay)
            .field("has_reply", &self.reply.is_some())
            .field("reply_limit", &self.reply_limit)
            .field("replied", &self.replied())
            .finish()
    }
}
