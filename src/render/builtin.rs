//! Built-in generic renderer backends.
//!
//! These are the backends every action's table starts with when the
//! application installs them in its generic table: an HTML backend that
//! delegates to a [`TemplateEngine`] collaborator, and a JSON backend that
//! renders a `serde_json::Value` left in the resource state (and skips when
//! there is none — the canonical use of [`Rendered::Skip`]).

use std::sync::Arc;

use serde::Serialize;

use crate::http::Response;
use crate::resource::ActionId;
use crate::util::resource_label;

use super::{BackendError, RenderContext, Rendered, RendererBackend};

/// The template-rendering collaborator the HTML backend calls out to.
///
/// Template semantics (syntax, context variables, inheritance) are entirely
/// the engine's business; this crate only derives the template name and
/// hands over the render context.
pub trait TemplateEngine: Send + Sync {
    /// Renders `template` against the request's render context.
    fn render(&self, template: &str, cx: &RenderContext<'_>) -> Result<String, BackendError>;
}

impl<F> TemplateEngine for F
where
    F: Fn(&str, &RenderContext<'_>) -> Result<String, BackendError> + Send + Sync,
{
    fn render(&self, template: &str, cx: &RenderContext<'_>) -> Result<String, BackendError> {
        self(template, cx)
    }
}

/// Derives the template name for an action.
///
/// The resource name is lowercased to its label (a trailing `Resource` is
/// stripped, CamelCase becomes snake_case) and joined with the action name
/// under the resource's template path prefix:
///
/// - `User#show`, no prefix → `user/show.html`
/// - `UserResource#edit`, prefix `auth/` → `auth/user/edit.html`
pub fn template_name(action: &ActionId, prefix: &str) -> String {
    format!("{prefix}{}/{}.html", resource_label(action.resource()), action.name())
}

/// Generic HTML backend: renders `{prefix}{resource label}/{action}.html`
/// through `engine`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use restroute::render::builtin::{html_backend, TemplateEngine};
/// use restroute::render::{RenderContext, BackendError, RendererTable};
///
/// let engine = Arc::new(|template: &str, _cx: &RenderContext<'_>| {
///     Ok::<_, BackendError>(format!("<!-- {template} -->"))
/// });
/// let mut generic = RendererTable::new();
/// generic.set("text/html", html_backend(engine));
/// ```
pub fn html_backend(engine: Arc<dyn TemplateEngine>) -> RendererBackend {
    RendererBackend::generic(move |action, cx| {
        let template = template_name(action, cx.template_prefix);
        let body = engine.render(&template, cx)?;
        Ok(Rendered::Produced(Response::html(body)))
    })
}

/// Generic JSON backend: serves a `serde_json::Value` from the resource
/// state, or skips when the action left none.
pub fn json_backend() -> RendererBackend {
    RendererBackend::generic(|_action, cx| match cx.state.get::<serde_json::Value>() {
        Some(value) => json_body(value),
        None => Ok(Rendered::Skip),
    })
}

/// Serializes `value` into a produced `200 OK` JSON response.
///
/// Convenience for specific backends:
///
/// ```
/// use restroute::render::builtin::json_body;
/// use restroute::render::RendererBackend;
///
/// #[derive(serde::Serialize, Clone)]
/// struct User { name: String }
///
/// let backend = RendererBackend::specific(|cx| {
///     match cx.state.get::<User>() {
///         Some(user) => json_body(user),
///         None => Ok(restroute::render::Rendered::Skip),
///     }
/// });
/// ```
pub fn json_body<T: Serialize>(value: &T) -> Result<Rendered, BackendError> {
    let body = serde_json::to_string(value)?;
    Ok(Rendered::Produced(Response::json_str(body)))
}
