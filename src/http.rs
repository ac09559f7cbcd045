//! Request and response envelopes exchanged with the interception pipeline.
//!
//! These mirror the minimal surface of an HTTP client: a request descriptor
//! (method, url, query params, JSON body) and the success/error envelopes a
//! transport hands back.

use crate::error::MockApiError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// HTTP methods a handler can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
    Put,
    Head,
    Jsonp,
    Options,
}

impl HttpMethod {
    /// Every supported method, in registry order.
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Put,
        HttpMethod::Head,
        HttpMethod::Jsonp,
        HttpMethod::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Put => "PUT",
            HttpMethod::Head => "HEAD",
            HttpMethod::Jsonp => "JSONP",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = MockApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == upper)
            .ok_or_else(|| MockApiError::InvalidMethod(s.to_string()))
    }
}

/// An outgoing request as seen by the interceptor.
///
/// `url` holds the path only; query parameters live in `params`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    #[serde(default)]
    pub params: HashMap<String, String>,
    #[serde(default)]
    pub body: Value,
}

impl HttpRequest {
    /// Create a request without params or body.
    ///
    /// A query string embedded in `url` is split off into `params`.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: HashMap::new(),
            body: Value::Null,
        }
        .split_query()
    }

    /// Move a query string embedded in `url` into `params`.
    ///
    /// Parameters already present take precedence over inline ones.
    pub fn split_query(mut self) -> Self {
        if let Some((path, query)) = self.url.split_once('?') {
            let mut params = parse_query_string(query);
            let path = path.to_string();
            params.extend(std::mem::take(&mut self.params));
            self.params = params;
            self.url = path;
        }
        self
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    /// Add a query parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Set the JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Look up a query parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Successful response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: Value,
}

impl HttpResponse {
    pub fn ok(status: u16, body: Value) -> Self {
        Self {
            status,
            status_text: "OK".to_string(),
            body,
        }
    }
}

/// Error response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpErrorResponse {
    pub status: u16,
    pub status_text: String,
    pub error: Value,
}

impl HttpErrorResponse {
    /// Synthesized when a matched handler produced no response value.
    pub fn not_found() -> Self {
        Self {
            status: 404,
            status_text: "NOT FOUND".to_string(),
            error: Value::String("NOT FOUND".to_string()),
        }
    }

    /// Synthesized from a callback-declared non-2xx status.
    pub fn upstream(status: u16, error: Value) -> Self {
        Self {
            status,
            status_text: "ERROR".to_string(),
            error,
        }
    }
}

impl fmt::Display for HttpErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.status_text)
    }
}

/// Parse a query string into key-value pairs.
pub fn parse_query_string(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    for part in query.split('&') {
        if part.is_empty() {
            continue;
        }
        if let Some((key, value)) = part.split_once('=') {
            params.insert(percent_decode(key), percent_decode(value));
        } else {
            params.insert(percent_decode(part), String::new());
        }
    }

    params
}

/// Decode `%XX` escapes and `+` as space.
///
/// Escapes are collected as raw bytes first so multi-byte UTF-8 sequences
/// survive; invalid sequences are replaced lossily.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(byte) => {
                        out.push(byte);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}
