//! Registration of config-defined stub handlers.

use crate::config::StubDefinition;
use crate::handler::{ReplyContext, ReplyOutcome};
use crate::registry::MockApiService;
use crate::template::{TemplateContext, TemplateEngine};
use std::sync::Arc;
use tracing::{debug, warn};

/// Register every stub on `service`, in definition order.
pub fn register_stubs(
    service: &mut MockApiService,
    stubs: &[StubDefinition],
) -> anyhow::Result<()> {
    let engine = Arc::new(TemplateEngine::new());

    for stub in stubs {
        let method = stub.http_method()?;
        let status = stub.response.status;
        let body = stub.response.body.clone();
        let template = stub.response.template;
        let engine = engine.clone();
        let id = stub.id.clone();

        service
            .register(method, &stub.url, stub.delay_ms)
            .reply_count(stub.reply_limit)
            .reply(move |ctx: ReplyContext| {
                let Some(body) = &body else {
                    return ReplyOutcome::empty();
                };
                if !template {
                    return ReplyOutcome::status(status, body.clone());
                }

                match engine.render_json(body, &TemplateContext::from_reply(&ctx)) {
                    Ok(rendered) => ReplyOutcome::status(status, rendered),
                    Err(err) => {
                        warn!(stub_id = %id, error = %err, "Template rendering failed");
                        ReplyOutcome::status(
                            500,
                            serde_json::json!({ "error": format!("template error: {err}") }),
                        )
                    }
                }
            });

        debug!(stub_id = %stub.id, method = %method, url = %stub.url, "Registered stub");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockApiConfig;
    use crate::error::MockApiError;
    use crate::http::{HttpMethod, HttpRequest};
    use serde_json::json;

    fn service_from(yaml: &str) -> MockApiService {
        let config = MockApiConfig::from_yaml(yaml).unwrap();
        let mut service = MockApiService::new();
        register_stubs(&mut service, &config.stubs).unwrap();
        service
    }

    async fn call(service: &MockApiService, request: HttpRequest) -> Result<Option<(u16, serde_json::Value)>, MockApiError> {
        let found = service.find_handler(request.method, &request.url);
        let handler = found.handler.expect("handler registered");
        handler
            .response(Some(ReplyContext {
                request,
                url_params: found.url_params,
            }))
            .await
    }

    #[tokio::test]
    async fn test_static_stub() {
        let service = service_from(
            r#"
stubs:
  - id: ping
    method: GET
    url: api/ping
    delay_ms: 20
    response:
      status: 202
      body: { pong: true }
"#,
        );

        let found = service.find_handler(HttpMethod::Get, "api/ping");
        assert_eq!(found.handler.unwrap().delay_ms(), Some(20));

        let reply = call(&service, HttpRequest::get("api/ping")).await.unwrap();
        assert_eq!(reply, Some((202, json!({"pong": true}))));
    }

    #[tokio::test]
    async fn test_template_stub() {
        let service = service_from(
            r#"
stubs:
  - id: hero-by-id
    method: GET
    url: api/heroes/:id
    response:
      template: true
      body:
        id: "{{params.id}}"
        label: "hero {{upper query.tag}}"
"#,
        );

        let reply = call(&service, HttpRequest::get("api/heroes/9?tag=x")).await.unwrap();
        assert_eq!(reply, Some((200, json!({"id": "9", "label": "hero X"}))));
    }

    #[tokio::test]
    async fn test_stub_without_body_replies_empty() {
        let service = service_from(
            r#"
stubs:
  - id: nothing
    method: DELETE
    url: api/nothing
    response: {}
"#,
        );

        let reply = call(&service, HttpRequest::delete("api/nothing")).await.unwrap();
        assert_eq!(reply, None);
    }

    #[tokio::test]
    async fn test_stub_reply_limit() {
        let service = service_from(
            r#"
stubs:
  - id: once
    method: POST
    url: api/once
    reply_limit: 1
    response:
      body: ok
"#,
        );

        assert!(call(&service, HttpRequest::post("api/once")).await.is_ok());
        let err = call(&service, HttpRequest::post("api/once")).await.unwrap_err();
        assert!(matches!(err, MockApiError::ReplyLimitExceeded { limit: 1, .. }));
    }
}
