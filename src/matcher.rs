//! URL pattern matching.
//!
//! Patterns are `/`-delimited segment sequences where a segment starting with
//! `:` captures the request segment at the same position, e.g.
//! `api/heroes/:id` matches `api/heroes/42` with `id = "42"`.

use std::collections::HashMap;

/// Parameters captured from `:name` segments, keyed without the `:` prefix.
pub type UrlParams = HashMap<String, String>;

/// A parsed URL pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPattern {
    segments: Vec<PatternSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternSegment {
    Literal(String),
    Param(String),
}

impl UrlPattern {
    /// Parse a pattern string into segments.
    pub fn parse(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => PatternSegment::Param(name.to_string()),
                None => PatternSegment::Literal(segment.to_string()),
            })
            .collect();

        Self { segments }
    }

    /// Names of the parameters this pattern captures, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            PatternSegment::Param(name) => Some(name.as_str()),
            PatternSegment::Literal(_) => None,
        })
    }

    /// Match a request path, returning the captured parameters on success.
    ///
    /// Segment counts must be equal, so a trailing slash on either side
    /// prevents a match. Literal segments compare case-sensitively.
    pub fn matches(&self, url: &str) -> Option<UrlParams> {
        let parts: Vec<&str> = url.split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = UrlParams::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                PatternSegment::Literal(literal) => {
                    if literal != part {
                        return None;
                    }
                }
                PatternSegment::Param(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }

        Some(params)
    }
}

/// Match `url` against `pattern` without keeping the parsed pattern around.
pub fn match_url(pattern: &str, url: &str) -> Option<UrlParams> {
    UrlPattern::parse(pattern).matches(url)
}
