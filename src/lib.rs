//! Heroes Mock API
//!
//! An in-memory mock HTTP backend for the heroes admin API. Outgoing requests
//! are intercepted and, when a handler is registered for their method and url
//! pattern, answered locally after a simulated network delay.
//!
//! # Features
//!
//! - **Pattern Matching**: `:param` segments capture url parameters
//! - **Handler Registry**: one handler per method and pattern, first match wins
//! - **Reply Callbacks**: ready, deferred or streamed `[status, body]` replies
//! - **Latency Simulation**: per-handler delay with a pipeline-wide default
//! - **Reply Limits**: cap how many times a handler answers
//! - **Heroes Endpoints**: list with sort/search/pagination, create, update, delete
//! - **Config Stubs**: extra static or templated handlers from YAML
//!
//! # Example
//!
//! ```no_run
//! use heroes_mock_api::{HttpRequest, MockApi, MockApiConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let api = MockApi::from_config(MockApiConfig::default())?;
//! let response = api.call(HttpRequest::get("api/heroes?page=0&size=10")).await?;
//! println!("{}", response.body);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod guid;
pub mod handler;
pub mod heroes;
pub mod http;
pub mod interceptor;
pub mod matcher;
pub mod mock_api;
pub mod registry;
pub mod stubs;
pub mod template;

pub use config::MockApiConfig;
pub use error::MockApiError;
pub use handler::{Reply, ReplyContext, ReplyOutcome, RequestHandler};
pub use http::{HttpErrorResponse, HttpMethod, HttpRequest, HttpResponse};
pub use interceptor::{HttpHandler, MockApiInterceptor, OfflineBackend};
pub use mock_api::MockApi;
pub use registry::MockApiService;
