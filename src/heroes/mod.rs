//! Heroes domain: records, the in-memory store, and the mock endpoints.

pub mod api;
pub mod model;
pub mod seed;
pub mod store;

pub use api::HeroesMockApi;
pub use model::{Heroe, HeroesPage, ListQuery, Pagination, SortOrder};
pub use store::HeroesStore;
