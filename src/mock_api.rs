//! Assembles the registry, the heroes endpoints and the interceptor from
//! configuration.

use crate::config::MockApiConfig;
use crate::error::MockApiError;
use crate::heroes::{seed, HeroesMockApi, HeroesStore};
use crate::http::{HttpRequest, HttpResponse};
use crate::interceptor::{HttpHandler, MockApiInterceptor, OfflineBackend};
use crate::registry::MockApiService;
use crate::stubs::register_stubs;
use std::sync::Arc;
use tracing::info;

/// A fully registered mock backend.
pub struct MockApi {
    interceptor: MockApiInterceptor,
    heroes: Option<Arc<HeroesStore>>,
}

impl MockApi {
    /// Register every configured handler and build the interceptor.
    pub fn from_config(config: MockApiConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let mut service = MockApiService::new();

        let heroes = if config.heroes.enabled {
            let records = config.heroes.seed.clone().unwrap_or_else(seed::default_heroes);
            info!(records = records.len(), url = %config.heroes.base_url, "Seeding heroes store");

            let store = Arc::new(HeroesStore::new(records));
            HeroesMockApi::new(store.clone(), &config.heroes.base_url, config.heroes.list_delay_ms)
                .register_handlers(&mut service);
            Some(store)
        } else {
            None
        };

        register_stubs(&mut service, &config.stubs)?;

        let interceptor = MockApiInterceptor::new(Arc::new(service), config.settings);
        Ok(Self {
            interceptor,
            heroes,
        })
    }

    pub fn interceptor(&self) -> &MockApiInterceptor {
        &self.interceptor
    }

    /// The heroes store, when the heroes endpoints are enabled.
    pub fn heroes(&self) -> Option<&Arc<HeroesStore>> {
        self.heroes.as_ref()
    }

    /// Send a request with no transport behind the mocks.
    pub async fn call(&self, request: HttpRequest) -> Result<HttpResponse, MockApiError> {
        self.interceptor.intercept(request, &OfflineBackend).await
    }

    /// Send a request, forwarding unmatched ones to `next`.
    pub async fn call_with(
        &self,
        request: HttpRequest,
        next: &dyn HttpHandler,
    ) -> Result<HttpResponse, MockApiError> {
        self.interceptor.intercept(request, next).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quiet_config(yaml: &str) -> MockApiConfig {
        let mut config = MockApiConfig::from_yaml(yaml).unwrap();
        config.heroes.list_delay_ms = None;
        config
    }

    #[tokio::test]
    async fn test_default_config_serves_seeded_heroes() {
        let api = MockApi::from_config(quiet_config("{}")).unwrap();

        let response = api
            .call(HttpRequest::get("api/heroes?page=0&size=2"))
            .await
            .unwrap();

        let seeded = seed::default_heroes().len();
        assert_eq!(response.body["heroes"].as_array().unwrap().len(), 2);
        assert_eq!(response.body["pagination"]["length"], json!(seeded));
        assert_eq!(response.body["heroes"][0]["name"], "Batman");
    }

    #[tokio::test]
    async fn test_seed_override_and_stubs() {
        let yaml = r#"
heroes:
  seed:
    - { id: a, name: Bravo }
    - { id: b, name: Alpha }
stubs:
  - id: hero-by-id
    method: GET
    url: api/heroes/:id
    response:
      template: true
      body: { id: "{{params.id}}" }
"#;
        let api = MockApi::from_config(quiet_config(yaml)).unwrap();
        assert_eq!(api.heroes().unwrap().len().await, 2);

        let response = api.call(HttpRequest::get("api/heroes/b")).await.unwrap();
        assert_eq!(response.body, json!({"id": "b"}));
    }

    #[tokio::test]
    async fn test_heroes_disabled_passes_through() {
        let api = MockApi::from_config(quiet_config("heroes:\n  enabled: false")).unwrap();
        assert!(api.heroes().is_none());

        let err = api.call(HttpRequest::get("api/heroes")).await.unwrap_err();
        assert!(matches!(err, MockApiError::Unreachable { .. }));
        assert_eq!(api.interceptor().total_unmatched(), 1);
    }
}
