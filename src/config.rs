//! Configuration for the mock API.
//!
//! Defines pipeline settings, the heroes endpoints, and extra stub handlers.

use crate::heroes::model::Heroe;
use crate::http::HttpMethod;
use crate::matcher::UrlPattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

static PARAM_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("parameter name pattern is valid")
});

/// Main configuration for the mock API.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct MockApiConfig {
    /// Global settings
    #[serde(default)]
    pub settings: GlobalSettings,

    /// Heroes endpoints
    #[serde(default)]
    pub heroes: HeroesConfig,

    /// Additional handlers, registered after the heroes endpoints
    #[serde(default)]
    pub stubs: Vec<StubDefinition>,
}

impl MockApiConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.heroes.validate()?;

        let mut ids = HashSet::new();
        for (i, stub) in self.stubs.iter().enumerate() {
            stub.validate()
                .map_err(|e| anyhow::anyhow!("Stub {}: {}", i, e))?;
            if !ids.insert(stub.id.as_str()) {
                anyhow::bail!("Stub {}: duplicate id '{}'", i, stub.id);
            }
        }
        Ok(())
    }
}

/// Global settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalSettings {
    /// Delay applied to handlers without their own delay (ms)
    #[serde(default)]
    pub default_delay_ms: Option<u64>,

    /// Log all matched requests
    #[serde(default = "default_true")]
    pub log_matches: bool,

    /// Log requests passed through to the next stage
    #[serde(default = "default_true")]
    pub log_unmatched: bool,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            default_delay_ms: None,
            log_matches: true,
            log_unmatched: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Heroes endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeroesConfig {
    /// Whether to register the heroes handlers
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// URL all four handlers are registered on
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Delay override for the list endpoint (ms)
    #[serde(default = "default_list_delay")]
    pub list_delay_ms: Option<u64>,

    /// Records to start with instead of the built-in seed
    #[serde(default)]
    pub seed: Option<Vec<Heroe>>,
}

impl Default for HeroesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_base_url(),
            list_delay_ms: default_list_delay(),
            seed: None,
        }
    }
}

fn default_base_url() -> String {
    "api/heroes".to_string()
}

fn default_list_delay() -> Option<u64> {
    Some(300)
}

impl HeroesConfig {
    /// Validate the heroes configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_url_pattern(&self.base_url)
            .map_err(|e| anyhow::anyhow!("heroes.base_url: {}", e))?;

        if let Some(seed) = &self.seed {
            let mut ids = HashSet::new();
            for heroe in seed {
                if !ids.insert(heroe.id.as_str()) {
                    anyhow::bail!("heroes.seed: duplicate id '{}'", heroe.id);
                }
            }
        }
        Ok(())
    }
}

/// A single stub handler definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StubDefinition {
    /// Unique identifier for this stub
    pub id: String,

    /// HTTP method to register for
    pub method: String,

    /// URL pattern, `:name` segments capture parameters
    pub url: String,

    /// Delay override (ms)
    #[serde(default)]
    pub delay_ms: Option<u64>,

    /// Maximum number of replies (0 = unlimited)
    #[serde(default)]
    pub reply_limit: u32,

    /// Reply to send
    pub response: ResponseDefinition,
}

impl StubDefinition {
    /// Validate the stub definition.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.id.is_empty() {
            anyhow::bail!("Stub id cannot be empty");
        }
        self.http_method()?;
        validate_url_pattern(&self.url)?;
        self.response.validate()?;
        Ok(())
    }

    /// Parsed HTTP method.
    pub fn http_method(&self) -> anyhow::Result<HttpMethod> {
        Ok(self.method.parse::<HttpMethod>()?)
    }
}

/// Reply definition for a stub.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResponseDefinition {
    /// HTTP status code
    #[serde(default = "default_status")]
    pub status: u16,

    /// JSON body; a missing body means "no response value" (404)
    #[serde(default)]
    pub body: Option<serde_json::Value>,

    /// Whether string fields in the body are Handlebars templates
    #[serde(default)]
    pub template: bool,
}

fn default_status() -> u16 {
    200
}

impl ResponseDefinition {
    /// Validate the response definition.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.status < 100 || self.status > 599 {
            anyhow::bail!("Invalid status code: {}", self.status);
        }
        Ok(())
    }
}

/// Check that every `:param` segment carries a usable name.
fn validate_url_pattern(url: &str) -> anyhow::Result<()> {
    for name in UrlPattern::parse(url).param_names() {
        if !PARAM_NAME.is_match(name) {
            anyhow::bail!("Invalid parameter name ':{}' in url '{}'", name, url);
        }
    }
    Ok(())
}
