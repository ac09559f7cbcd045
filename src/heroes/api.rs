//! Heroes mock endpoints.
//!
//! Registers GET/POST/PATCH/DELETE handlers on one url, all backed by a
//! shared [`HeroesStore`].

use super::model::{ListQuery, SortOrder};
use super::store::HeroesStore;
use crate::handler::{ReplyContext, ReplyOutcome};
use crate::http::HttpRequest;
use crate::registry::MockApiService;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Registers the heroes endpoints against a store.
pub struct HeroesMockApi {
    store: Arc<HeroesStore>,
    base_url: String,
    list_delay: Option<u64>,
}

impl HeroesMockApi {
    pub fn new(store: Arc<HeroesStore>, base_url: impl Into<String>, list_delay: Option<u64>) -> Self {
        Self {
            store,
            base_url: base_url.into(),
            list_delay,
        }
    }

    pub fn store(&self) -> &Arc<HeroesStore> {
        &self.store
    }

    /// Register all four handlers.
    pub fn register_handlers(&self, service: &mut MockApiService) {
        let store = self.store.clone();
        service
            .on_get(&self.base_url, self.list_delay)
            .reply(move |ctx: ReplyContext| {
                let store = store.clone();
                let query = list_query(&ctx.request);
                ReplyOutcome::deferred(async move {
                    let page = store.list(&query).await;
                    Some((200, serde_json::to_value(page).unwrap_or_default()))
                })
            });

        let store = self.store.clone();
        service.on_post(&self.base_url, None).reply(move |_| {
            let store = store.clone();
            ReplyOutcome::deferred(async move {
                let heroe = store.create().await;
                Some((200, serde_json::to_value(heroe).unwrap_or_default()))
            })
        });

        let store = self.store.clone();
        service
            .on_patch(&self.base_url, None)
            .reply(move |ctx: ReplyContext| {
                let store = store.clone();
                ReplyOutcome::deferred(async move { Some(update_reply(&store, &ctx.request.body).await) })
            });

        let store = self.store.clone();
        service
            .on_delete(&self.base_url, None)
            .reply(move |ctx: ReplyContext| {
                let store = store.clone();
                let id = ctx.request.param("id").map(str::to_string);
                ReplyOutcome::deferred(async move {
                    // Without an id nothing matches
                    let deleted = match id {
                        Some(id) => store.delete(&id).await,
                        None => true,
                    };
                    Some((200, Value::Bool(deleted)))
                })
            });

        debug!(url = %self.base_url, "Registered heroes handlers");
    }
}

/// Read list parameters from the query string.
///
/// Missing or empty values fall back to `page=1`, `size=10`, `sort=name`,
/// `order=asc`. Any order other than `asc` sorts descending.
pub fn list_query(request: &HttpRequest) -> ListQuery {
    let defaults = ListQuery::default();
    let non_empty = |name: &str| request.param(name).filter(|v| !v.is_empty());

    ListQuery {
        page: non_empty("page").and_then(parse_int).unwrap_or(defaults.page),
        size: non_empty("size")
            .and_then(parse_int)
            .filter(|size| *size > 0)
            .unwrap_or(defaults.size),
        sort: non_empty("sort").map(str::to_string).unwrap_or(defaults.sort),
        order: match non_empty("order") {
            None | Some("asc") => SortOrder::Asc,
            Some(_) => SortOrder::Desc,
        },
        search: non_empty("search").map(str::to_string),
    }
}

/// Leading decimal digits of `value`, ignoring surrounding whitespace.
fn parse_int(value: &str) -> Option<usize> {
    let value = value.trim_start();
    let value = value.strip_prefix('+').unwrap_or(value);
    let digits: String = value.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

async fn update_reply(store: &HeroesStore, body: &Value) -> (u16, Value) {
    let Some(id) = body.get("id").and_then(Value::as_str) else {
        return (200, Value::Null);
    };
    let patch = body.get("heroe").cloned().unwrap_or_else(|| json!({}));

    match store.update(id, &patch).await {
        Ok(Some(heroe)) => (200, serde_json::to_value(heroe).unwrap_or_default()),
        Ok(None) => (200, Value::Null),
        Err(err) => {
            warn!(id = %id, error = %err, "Rejected heroe update");
            (400, json!({ "error": err.to_string() }))
        }
    }
}
