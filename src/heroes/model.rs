//! Heroes data model.

use serde::{Deserialize, Serialize};

/// A hero record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heroe {
    pub id: String,
    #[serde(default)]
    pub code: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub company: String,
}

impl Heroe {
    /// String value of a field by its JSON name.
    ///
    /// The outer `None` means the field does not exist.
    pub fn field(&self, key: &str) -> Option<Option<&str>> {
        match key {
            "id" => Some(Some(self.id.as_str())),
            "code" => Some(self.code.as_deref()),
            "name" => Some(Some(self.name.as_str())),
            "description" => Some(Some(self.description.as_str())),
            "company" => Some(Some(self.company.as_str())),
            _ => None,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Parameters of a list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: usize,
    pub size: usize,
    pub sort: String,
    pub order: SortOrder,
    pub search: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: 10,
            sort: "name".to_string(),
            order: SortOrder::Asc,
            search: None,
        }
    }
}

/// Paging metadata for a list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pagination {
    Page {
        length: usize,
        size: usize,
        page: usize,
        #[serde(rename = "lastPage")]
        last_page: usize,
        #[serde(rename = "startIndex")]
        start_index: usize,
        /// `-1` when the page is empty
        #[serde(rename = "endIndex")]
        end_index: i64,
    },
    /// The requested page lies past the last page.
    OutOfRange {
        #[serde(rename = "lastPage")]
        last_page: usize,
    },
}

impl Pagination {
    pub fn last_page(&self) -> usize {
        match self {
            Pagination::Page { last_page, .. } | Pagination::OutOfRange { last_page } => *last_page,
        }
    }
}

/// Body of a list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroesPage {
    pub heroes: Option<Vec<Heroe>>,
    pub pagination: Pagination,
}
