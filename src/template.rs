//! Template engine for stub bodies.
//!
//! Uses Handlebars to render string fields of a JSON body with the
//! intercepted request as context.

use crate::handler::ReplyContext;
use crate::matcher::UrlParams;
use handlebars::Handlebars;
use serde::Serialize;
use std::collections::HashMap;

/// Template engine for rendering dynamic stub bodies.
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

/// Context for template rendering.
#[derive(Debug, Serialize)]
pub struct TemplateContext<'a> {
    /// Parameters captured from the url pattern
    pub params: &'a UrlParams,
    /// Query parameters
    pub query: &'a HashMap<String, String>,
    /// Request method
    pub method: &'a str,
    /// Request url (path only)
    pub url: &'a str,
    /// Request body
    pub body: &'a serde_json::Value,
}

impl<'a> TemplateContext<'a> {
    pub fn from_reply(ctx: &'a ReplyContext) -> Self {
        Self {
            params: &ctx.url_params,
            query: &ctx.request.params,
            method: ctx.request.method.as_str(),
            url: &ctx.request.url,
            body: &ctx.request.body,
        }
    }
}

impl TemplateEngine {
    /// Create a new template engine.
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();

        handlebars.register_helper("uuid", Box::new(uuid_helper));
        handlebars.register_helper("now", Box::new(now_helper));
        handlebars.register_helper("random", Box::new(random_helper));
        handlebars.register_helper("default", Box::new(default_helper));
        handlebars.register_helper("upper", Box::new(upper_helper));
        handlebars.register_helper("lower", Box::new(lower_helper));

        // Output is JSON, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        Self { handlebars }
    }

    /// Render a template string.
    pub fn render(
        &self,
        template: &str,
        ctx: &TemplateContext<'_>,
    ) -> Result<String, handlebars::RenderError> {
        self.handlebars.render_template(template, ctx)
    }

    /// Render every string containing `{{` inside a JSON value.
    pub fn render_json(
        &self,
        value: &serde_json::Value,
        ctx: &TemplateContext<'_>,
    ) -> Result<serde_json::Value, handlebars::RenderError> {
        match value {
            serde_json::Value::String(s) if s.contains("{{") => {
                Ok(serde_json::Value::String(self.render(s, ctx)?))
            }
            serde_json::Value::Array(arr) => {
                let rendered: Result<Vec<_>, _> =
                    arr.iter().map(|v| self.render_json(v, ctx)).collect();
                Ok(serde_json::Value::Array(rendered?))
            }
            serde_json::Value::Object(obj) => {
                let mut rendered = serde_json::Map::new();
                for (k, v) in obj {
                    rendered.insert(k.clone(), self.render_json(v, ctx)?);
                }
                Ok(serde_json::Value::Object(rendered))
            }
            _ => Ok(value.clone()),
        }
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

// Custom Handlebars helpers

fn uuid_helper(
    _: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    out.write(&crate::guid::guid())?;
    Ok(())
}

fn now_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    use chrono::Utc;

    let format = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .unwrap_or("%Y-%m-%dT%H:%M:%S%.3fZ");

    out.write(&Utc::now().format(format).to_string())?;
    Ok(())
}

fn random_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    use rand::Rng;

    let min = h.param(0).and_then(|v| v.value().as_i64()).unwrap_or(0);
    let max = h.param(1).and_then(|v| v.value().as_i64()).unwrap_or(100);

    let value = if max > min {
        rand::thread_rng().gen_range(min..=max)
    } else {
        min
    };
    out.write(&value.to_string())?;
    Ok(())
}

fn default_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let value = h.param(0).map(|v| v.value());
    let default = h.param(1).and_then(|v| v.value().as_str()).unwrap_or("");

    match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => out.write(s)?,
        Some(v) if !v.is_null() && !v.is_string() => out.write(&v.to_string())?,
        _ => out.write(default)?,
    }
    Ok(())
}

fn upper_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let value = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    out.write(&value.to_uppercase())?;
    Ok(())
}

fn lower_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let value = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    out.write(&value.to_lowercase())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpRequest;
    use serde_json::json;

    fn reply_context(request: HttpRequest, params: &[(&str, &str)]) -> ReplyContext {
        ReplyContext {
            request,
            url_params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_url_params_and_query() {
        let engine = TemplateEngine::new();
        let ctx = reply_context(HttpRequest::get("api/heroes/7?page=2"), &[("id", "7")]);

        let result = engine
            .render(
                "{{method}} {{url}} id={{params.id}} page={{query.page}}",
                &TemplateContext::from_reply(&ctx),
            )
            .unwrap();

        assert_eq!(result, "GET api/heroes/7 id=7 page=2");
    }

    #[test]
    fn test_request_body() {
        let engine = TemplateEngine::new();
        let ctx = reply_context(
            HttpRequest::post("api/heroes").with_body(json!({"name": "Storm"})),
            &[],
        );

        let result = engine
            .render("Name: {{body.name}}", &TemplateContext::from_reply(&ctx))
            .unwrap();

        assert_eq!(result, "Name: Storm");
    }

    #[test]
    fn test_uuid_helper() {
        let engine = TemplateEngine::new();
        let ctx = reply_context(HttpRequest::get("/"), &[]);

        let result = engine
            .render("{{uuid}}", &TemplateContext::from_reply(&ctx))
            .unwrap();

        assert!(crate::guid::is_guid(&result));
    }

    #[test]
    fn test_default_and_case_helpers() {
        let engine = TemplateEngine::new();
        let ctx = reply_context(HttpRequest::get("/"), &[("name", "Logan")]);
        let tctx = TemplateContext::from_reply(&ctx);

        let result = engine
            .render("{{default query.missing \"fallback\"}}", &tctx)
            .unwrap();
        assert_eq!(result, "fallback");

        let result = engine
            .render("{{upper params.name}} {{lower params.name}}", &tctx)
            .unwrap();
        assert_eq!(result, "LOGAN logan");
    }

    #[test]
    fn test_random_helper_range() {
        let engine = TemplateEngine::new();
        let ctx = reply_context(HttpRequest::get("/"), &[]);

        let result = engine
            .render("{{random 5 9}}", &TemplateContext::from_reply(&ctx))
            .unwrap();
        let value: i64 = result.parse().unwrap();
        assert!((5..=9).contains(&value));
    }

    #[test]
    fn test_render_json() {
        let engine = TemplateEngine::new();
        let ctx = reply_context(HttpRequest::get("api/heroes/42"), &[("id", "42")]);

        let body = json!({
            "id": "{{params.id}}",
            "tags": ["hero-{{params.id}}", 3],
            "static": "no template"
        });

        let result = engine
            .render_json(&body, &TemplateContext::from_reply(&ctx))
            .unwrap();

        assert_eq!(
            result,
            json!({"id": "42", "tags": ["hero-42", 3], "static": "no template"})
        );
    }
}
