//! In-memory heroes store.
//!
//! The store owns the record set and is shared with the mock handlers
//! through an `Arc`. Records are kept in insertion order, newest first.

use super::model::{Heroe, HeroesPage, ListQuery, Pagination, SortOrder};
use crate::guid::guid;
use icu_collator::{Collator, CollatorOptions};
use serde_json::Value;
use std::cmp::Ordering;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Name given to records created through the API.
pub const NEW_HEROE_NAME: &str = "A New hero";

/// Failure to apply a partial update.
#[derive(Debug, thiserror::Error)]
#[error("invalid heroe update: {0}")]
pub struct UpdateError(#[from] serde_json::Error);

pub struct HeroesStore {
    heroes: RwLock<Vec<Heroe>>,
}

impl HeroesStore {
    /// Create a store seeded with `heroes`.
    pub fn new(heroes: Vec<Heroe>) -> Self {
        Self {
            heroes: RwLock::new(heroes),
        }
    }

    /// Copy of every record in store order.
    pub async fn all(&self) -> Vec<Heroe> {
        self.heroes.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.heroes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.heroes.read().await.is_empty()
    }

    /// Sort, filter, then paginate a copy of the records.
    ///
    /// A page past `lastPage` yields no records and only `lastPage`.
    pub async fn list(&self, query: &ListQuery) -> HeroesPage {
        let mut heroes = self.all().await;

        sort_heroes(&mut heroes, &query.sort, query.order);

        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            heroes.retain(|heroe| heroe.name.to_lowercase().contains(&needle));
        }

        let length = heroes.len();
        let size = query.size.max(1);
        let page = query.page;
        let begin = page.saturating_mul(size);
        let end = size.saturating_mul(page.saturating_add(1)).min(length);
        let last_page = length.div_ceil(size).max(1);

        if page > last_page {
            debug!(page, last_page, "Requested page is out of range");
            return HeroesPage {
                heroes: None,
                pagination: Pagination::OutOfRange { last_page },
            };
        }

        let heroes = heroes
            .into_iter()
            .skip(begin)
            .take(end.saturating_sub(begin))
            .collect();

        HeroesPage {
            heroes: Some(heroes),
            pagination: Pagination::Page {
                length,
                size,
                page,
                last_page,
                start_index: begin,
                end_index: end as i64 - 1,
            },
        }
    }

    /// Create a record from the fixed template and put it first.
    pub async fn create(&self) -> Heroe {
        let heroe = Heroe {
            id: guid(),
            code: None,
            name: NEW_HEROE_NAME.to_string(),
            description: String::new(),
            company: String::new(),
        };

        self.heroes.write().await.insert(0, heroe.clone());
        debug!(id = %heroe.id, "Created heroe");
        heroe
    }

    /// Shallow-merge `patch` onto the record with `id`.
    ///
    /// Fields missing from `patch` are kept. Returns `Ok(None)` when no
    /// record has this id, in which case nothing changes.
    pub async fn update(&self, id: &str, patch: &Value) -> Result<Option<Heroe>, UpdateError> {
        let mut heroes = self.heroes.write().await;
        let Some(existing) = heroes.iter_mut().find(|heroe| heroe.id == id) else {
            return Ok(None);
        };

        let mut merged = serde_json::to_value(&*existing)?;
        if let (Value::Object(target), Value::Object(fields)) = (&mut merged, patch) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }

        let merged: Heroe = serde_json::from_value(merged)?;
        *existing = merged.clone();
        debug!(id = %id, "Updated heroe");
        Ok(Some(merged))
    }

    /// Remove every record with `id`. Always reports success.
    pub async fn delete(&self, id: &str) -> bool {
        let mut heroes = self.heroes.write().await;
        let before = heroes.len();
        heroes.retain(|heroe| heroe.id != id);
        debug!(id = %id, removed = before - heroes.len(), "Deleted heroe");
        true
    }
}

/// Stable sort by `key`.
///
/// `name` compares case-insensitively with the root locale collation; other
/// keys compare numerically, and values that are not numbers compare equal.
fn sort_heroes(heroes: &mut [Heroe], key: &str, order: SortOrder) {
    let collator = if key == "name" { name_collator() } else { None };

    heroes.sort_by(|a, b| {
        let (a, b) = match order {
            SortOrder::Asc => (a, b),
            SortOrder::Desc => (b, a),
        };

        if key == "name" {
            return compare_names(collator.as_ref(), &a.name, &b.name);
        }
        match (a.field(key), b.field(key)) {
            (Some(a), Some(b)) => compare_numeric(a, b),
            _ => Ordering::Equal,
        }
    });
}

/// Root-locale collator, or `None` when collation data cannot be loaded.
fn name_collator() -> Option<Collator> {
    match Collator::try_new(&Default::default(), CollatorOptions::new()) {
        Ok(collator) => Some(collator),
        Err(err) => {
            warn!(error = %err, "Collation data unavailable, sorting names by code point");
            None
        }
    }
}

fn compare_names(collator: Option<&Collator>, a: &str, b: &str) -> Ordering {
    let (a, b) = (a.to_uppercase(), b.to_uppercase());
    match collator {
        Some(collator) => collator.compare(&a, &b),
        None => a.cmp(&b),
    }
}

fn compare_numeric(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (numeric_value(a), numeric_value(b)) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

/// Numeric reading of a field: null and blank read as zero.
fn numeric_value(value: Option<&str>) -> Option<f64> {
    match value.map(str::trim) {
        None | Some("") => Some(0.0),
        Some(s) => s.parse::<f64>().ok().filter(|n| n.is_finite()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn heroe(id: &str, name: &str) -> Heroe {
        Heroe {
            id: id.to_string(),
            code: None,
            name: name.to_string(),
            description: String::new(),
            company: String::new(),
        }
    }

    fn query(page: usize, size: usize) -> ListQuery {
        ListQuery {
            page,
            size,
            ..ListQuery::default()
        }
    }

    fn names(page: &HeroesPage) -> Vec<&str> {
        page.heroes
            .as_ref()
            .map(|h| h.iter().map(|h| h.name.as_str()).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_sort_by_name_ascending() {
        let store = HeroesStore::new(vec![heroe("a", "Bravo"), heroe("b", "Alpha")]);

        let page = store.list(&query(0, 10)).await;

        assert_eq!(names(&page), vec!["Alpha", "Bravo"]);
        assert_eq!(
            page.pagination,
            Pagination::Page {
                length: 2,
                size: 10,
                page: 0,
                last_page: 1,
                start_index: 0,
                end_index: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_sort_by_name_is_case_insensitive_and_descending() {
        let store = HeroesStore::new(vec![
            heroe("1", "batman"),
            heroe("2", "Aquaman"),
            heroe("3", "Cyborg"),
        ]);

        let mut q = query(0, 10);
        assert_eq!(names(&store.list(&q).await), vec!["Aquaman", "batman", "Cyborg"]);

        q.order = SortOrder::Desc;
        assert_eq!(names(&store.list(&q).await), vec!["Cyborg", "batman", "Aquaman"]);
    }

    #[tokio::test]
    async fn test_sort_by_name_follows_locale_collation() {
        let store = HeroesStore::new(vec![
            heroe("1", "Zorro"),
            heroe("2", "Ángel"),
            heroe("3", "Batman"),
            heroe("4", "_Underscore"),
            heroe("5", "Élan"),
        ]);

        let mut q = query(0, 10);
        assert_eq!(
            names(&store.list(&q).await),
            vec!["_Underscore", "Ángel", "Batman", "Élan", "Zorro"]
        );

        q.order = SortOrder::Desc;
        assert_eq!(
            names(&store.list(&q).await),
            vec!["Zorro", "Élan", "Batman", "Ángel", "_Underscore"]
        );
    }

    #[tokio::test]
    async fn test_sort_numeric_field() {
        let mut a = heroe("1", "A");
        a.code = Some("30".to_string());
        let mut b = heroe("2", "B");
        b.code = Some("4".to_string());
        let c = heroe("3", "C");
        let store = HeroesStore::new(vec![a, b, c]);

        let q = ListQuery {
            sort: "code".to_string(),
            ..query(0, 10)
        };
        // null code reads as zero
        assert_eq!(names(&store.list(&q).await), vec!["C", "B", "A"]);

        let q = ListQuery {
            order: SortOrder::Desc,
            ..q
        };
        assert_eq!(names(&store.list(&q).await), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_non_numeric_sort_keeps_store_order() {
        let store = HeroesStore::new(vec![
            heroe("1", "Zed"),
            heroe("2", "Amy"),
            heroe("3", "Kim"),
        ]);
        for key in ["description", "unknown"] {
            let q = ListQuery {
                sort: key.to_string(),
                ..query(0, 10)
            };
            assert_eq!(names(&store.list(&q).await), vec!["Zed", "Amy", "Kim"]);
        }

        let mut named = heroe("4", "Lee");
        named.company = "Marvel".to_string();
        let store = HeroesStore::new(vec![heroe("1", "Zed"), named]);
        let q = ListQuery {
            sort: "company".to_string(),
            ..query(0, 10)
        };
        assert_eq!(names(&store.list(&q).await), vec!["Zed", "Lee"]);
    }

    #[tokio::test]
    async fn test_search_filters_after_sorting() {
        let store = HeroesStore::new(vec![
            heroe("1", "Spider-Man"),
            heroe("2", "Iron Man"),
            heroe("3", "Thor"),
        ]);

        let q = ListQuery {
            search: Some("MAN".to_string()),
            ..query(0, 10)
        };
        let page = store.list(&q).await;
        assert_eq!(names(&page), vec!["Iron Man", "Spider-Man"]);
        assert!(matches!(page.pagination, Pagination::Page { length: 2, .. }));

        // An empty search term does not filter
        let q = ListQuery {
            search: Some(String::new()),
            ..query(0, 10)
        };
        assert_eq!(store.list(&q).await.heroes.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_pagination_slices() {
        let store = HeroesStore::new((0..5).map(|i| heroe(&i.to_string(), &format!("H{i}"))).collect());

        let page = store.list(&query(1, 2)).await;
        assert_eq!(names(&page), vec!["H2", "H3"]);
        assert_eq!(
            page.pagination,
            Pagination::Page {
                length: 5,
                size: 2,
                page: 1,
                last_page: 3,
                start_index: 2,
                end_index: 3,
            }
        );

        let page = store.list(&query(2, 2)).await;
        assert_eq!(names(&page), vec!["H4"]);
    }

    #[tokio::test]
    async fn test_page_equal_to_last_page_is_empty_not_boundary() {
        let store = HeroesStore::new(vec![heroe("1", "A"), heroe("2", "B")]);

        let page = store.list(&query(1, 10)).await;
        assert_eq!(page.heroes, Some(vec![]));
        assert!(matches!(page.pagination, Pagination::Page { last_page: 1, end_index: 1, .. }));
    }

    #[tokio::test]
    async fn test_page_past_last_page() {
        let store = HeroesStore::new(vec![heroe("1", "A"), heroe("2", "B")]);

        let page = store.list(&query(2, 10)).await;
        assert_eq!(page.heroes, None);
        assert_eq!(page.pagination, Pagination::OutOfRange { last_page: 1 });
        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            json!({"heroes": null, "pagination": {"lastPage": 1}})
        );
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = HeroesStore::new(vec![]);
        let page = store.list(&query(0, 10)).await;

        assert_eq!(page.heroes, Some(vec![]));
        assert!(matches!(
            page.pagination,
            Pagination::Page { length: 0, last_page: 1, end_index: -1, .. }
        ));
    }

    #[tokio::test]
    async fn test_list_is_idempotent() {
        let store = HeroesStore::new(vec![heroe("1", "B"), heroe("2", "A")]);
        let q = query(0, 1);
        assert_eq!(store.list(&q).await, store.list(&q).await);
        assert_eq!(store.all().await, vec![heroe("1", "B"), heroe("2", "A")]);
    }

    #[tokio::test]
    async fn test_create_prepends_template() {
        let store = HeroesStore::new(vec![heroe("1", "A")]);

        let created = store.create().await;
        assert_eq!(created.name, NEW_HEROE_NAME);
        assert_eq!(created.code, None);
        assert!(created.description.is_empty());
        assert!(crate::guid::is_guid(&created.id));
        assert_ne!(created.id, "1");

        let all = store.all().await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], created);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let mut original = heroe("1", "Old");
        original.code = Some("9".to_string());
        original.description = "keep me".to_string();
        let store = HeroesStore::new(vec![original.clone()]);

        let updated = store.update("1", &json!({"name": "X"})).await.unwrap().unwrap();
        assert_eq!(
            updated,
            Heroe {
                name: "X".to_string(),
                ..original
            }
        );
        assert_eq!(store.all().await, vec![updated]);
    }

    #[tokio::test]
    async fn test_update_drops_unknown_fields() {
        let store = HeroesStore::new(vec![heroe("1", "A")]);

        let updated = store
            .update("1", &json!({"name": "X", "power": "flight"}))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            serde_json::to_value(&updated).unwrap(),
            json!({"id": "1", "code": null, "name": "X", "description": "", "company": ""})
        );
        assert_eq!(store.all().await, vec![updated]);
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let store = HeroesStore::new(vec![heroe("1", "A")]);
        let result = store.update("nope", &json!({"name": "X"})).await.unwrap();
        assert!(result.is_none());
        assert_eq!(store.all().await, vec![heroe("1", "A")]);
    }

    #[tokio::test]
    async fn test_update_with_invalid_field_type() {
        let store = HeroesStore::new(vec![heroe("1", "A")]);
        assert!(store.update("1", &json!({"name": 42})).await.is_err());
        assert_eq!(store.all().await, vec![heroe("1", "A")]);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = HeroesStore::new(vec![heroe("1", "A"), heroe("2", "B")]);

        assert!(store.delete("missing").await);
        assert_eq!(store.len().await, 2);

        assert!(store.delete("1").await);
        assert_eq!(store.all().await, vec![heroe("2", "B")]);
    }
}
