//! Renderer backends, per-action renderer tables, and the negotiator that
//! picks exactly one backend per request.
//!
//! A backend is a producer function for one MIME type. Invoking it yields a
//! tagged [`Rendered`] result: either a finished [`Response`] or an explicit
//! [`Rendered::Skip`], the signal that this backend cannot satisfy this
//! particular request and the next-ranked candidate should be tried. Skip is
//! a normal value, not an error — genuine backend failures travel as `Err`
//! and are never silently converted into "try the next one".

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::conneg;
use crate::http::{Request, Response};
use crate::mime::MimeRegistry;
use crate::resource::{ActionId, ResourceState};

pub mod builtin;

/// Error type carried out of renderer backends and action bodies.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// The outcome of invoking a single renderer backend.
#[derive(Debug)]
pub enum Rendered {
    /// The backend produced a finished response; negotiation ends here.
    Produced(Response),
    /// The backend cannot satisfy this request; try the next candidate.
    ///
    /// A generic backend often cannot know whether it applies until it
    /// inspects the per-action resource state at runtime — an RDF backend
    /// only makes sense when a graph value is actually present. Skip keeps
    /// "wrong backend for this request" separate from "backend errored",
    /// which is what lets several generic backends coexist.
    Skip,
}

/// Everything a backend may consult while producing a representation.
pub struct RenderContext<'a> {
    /// The request being answered.
    pub request: &'a Request,
    /// Resource-scoped state populated by the action body.
    pub state: &'a ResourceState,
    /// Template path prefix declared on the resource (may be empty).
    pub template_prefix: &'a str,
}

type BackendFn =
    Arc<dyn Fn(&ActionId, &RenderContext<'_>) -> Result<Rendered, BackendError> + Send + Sync>;

/// A producer function keyed by MIME type in a [`RendererTable`].
///
/// Two kinds exist, normalized to one invocation contract:
///
/// - [`specific`](Self::specific) backends are written for exactly one
///   action and consume only the [`RenderContext`];
/// - [`generic`](Self::generic) backends are shared across actions by
///   default and additionally receive the [`ActionId`], which they typically
///   use to derive template paths.
///
/// Cloning is cheap (the function is behind an `Arc`), which is what makes
/// per-action table copies affordable.
#[derive(Clone)]
pub struct RendererBackend {
    func: BackendFn,
    kind: BackendKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackendKind {
    Specific,
    Generic,
}

impl RendererBackend {
    /// Wraps a producer defined for exactly one action.
    pub fn specific<F>(f: F) -> Self
    where
        F: Fn(&RenderContext<'_>) -> Result<Rendered, BackendError> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(move |_action, cx| f(cx)),
            kind: BackendKind::Specific,
        }
    }

    /// Wraps a producer shared across actions, which also receives the
    /// identity of the action being rendered.
    pub fn generic<F>(f: F) -> Self
    where
        F: Fn(&ActionId, &RenderContext<'_>) -> Result<Rendered, BackendError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            func: Arc::new(f),
            kind: BackendKind::Generic,
        }
    }

    /// Invokes the backend.
    pub fn invoke(
        &self,
        action: &ActionId,
        cx: &RenderContext<'_>,
    ) -> Result<Rendered, BackendError> {
        (self.func)(action, cx)
    }

    /// Returns `true` for backends created with [`generic`](Self::generic).
    pub fn is_generic(&self) -> bool {
        self.kind == BackendKind::Generic
    }
}

impl fmt::Debug for RendererBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererBackend")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Ordered MIME type → backend mapping for one action.
///
/// Every action's table starts as an independent copy of a shared generic
/// table, taken at declaration time with [`clone_from`]. The copy is
/// complete at construction: mutating the source afterwards never leaks
/// into the copy, and edits to one action's table never affect a sibling's.
///
/// Registration order is preserved and is the order used to break ranking
/// ties during negotiation. No two backends may share a MIME type within
/// one table; [`set`] replaces in place.
///
/// [`clone_from`]: RendererTable::clone_from
/// [`set`]: RendererTable::set
///
/// # Examples
///
/// ```
/// use restroute::render::{RendererBackend, RendererTable, Rendered};
/// use restroute::http::Response;
///
/// let mut generic = RendererTable::new();
/// generic.set(
///     "text/html",
///     RendererBackend::specific(|_cx| Ok(Rendered::Produced(Response::html("<p>hi</p>")))),
/// );
///
/// let mut mine = RendererTable::clone_from(&generic);
/// assert!(mine.delete("text/html"));
/// // The source table is untouched.
/// assert!(generic.get("text/html").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RendererTable {
    entries: Vec<(String, RendererBackend)>,
}

impl RendererTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an independent copy of `source`.
    ///
    /// This is the explicit copy-on-construct step taken for every action at
    /// declaration time.
    pub fn clone_from(source: &RendererTable) -> Self {
        Self {
            entries: source.entries.clone(),
        }
    }

    /// Registers `backend` for `mime`, replacing any existing backend for
    /// that MIME type in place (position preserved).
    pub fn set(&mut self, mime: impl Into<String>, backend: RendererBackend) {
        let mime = mime.into();
        match self.entries.iter_mut().find(|(m, _)| *m == mime) {
            Some(entry) => entry.1 = backend,
            None => self.entries.push((mime, backend)),
        }
    }

    /// Removes the backend for `mime`. Returns `true` if one was present.
    pub fn delete(&mut self, mime: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(m, _)| m != mime);
        self.entries.len() < before
    }

    /// Returns the backend for `mime`, if registered.
    pub fn get(&self, mime: &str) -> Option<&RendererBackend> {
        self.entries
            .iter()
            .find(|(m, _)| m == mime)
            .map(|(_, backend)| backend)
    }

    /// Returns the registered MIME types in registration order.
    pub fn available(&self) -> Vec<&str> {
        self.entries.iter().map(|(m, _)| m.as_str()).collect()
    }

    /// Returns the number of registered backends.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no backends are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Errors from running negotiation to completion.
#[derive(Debug, thiserror::Error)]
pub enum NegotiateError {
    /// Every ranked candidate skipped, or nothing in the table matched the
    /// request's preferences. The boundary maps this to HTTP 406.
    #[error("no renderer backend could satisfy the request")]
    NotAcceptable,

    /// A backend failed with a genuine error (not [`Rendered::Skip`]).
    /// Propagated, never retried.
    #[error("renderer backend for {mime} failed")]
    Backend {
        mime: String,
        #[source]
        source: BackendError,
    },
}

/// Selects and invokes exactly one backend for a request.
///
/// Construction takes the [`MimeRegistry`] used to resolve `format`
/// shortcode overrides; [`Negotiator::default`] uses the standard
/// pre-populated registry.
#[derive(Debug, Clone)]
pub struct Negotiator {
    registry: Arc<MimeRegistry>,
}

impl Default for Negotiator {
    fn default() -> Self {
        Self::new(Arc::new(MimeRegistry::with_defaults()))
    }
}

impl Negotiator {
    /// Creates a negotiator resolving format shortcodes through `registry`.
    pub fn new(registry: Arc<MimeRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the registry this negotiator resolves shortcodes against.
    pub fn registry(&self) -> &MimeRegistry {
        &self.registry
    }

    /// Runs content negotiation for one action invocation.
    ///
    /// Ranks `table`'s available MIME types against the request's `Accept`
    /// header, with `format` (a registry shortcode, typically from a query
    /// parameter or a Rails-style dotted path suffix) taking precedence as a
    /// single exact-match candidate ahead of all header-derived ones. The
    /// ranked candidates are invoked in order until one produces a response.
    ///
    /// # Errors
    ///
    /// - [`NegotiateError::NotAcceptable`] — the candidate list was
    ///   exhausted (every candidate skipped, or none matched at all).
    /// - [`NegotiateError::Backend`] — a backend failed; the error is
    ///   propagated immediately without trying further candidates.
    pub fn negotiate(
        &self,
        action: &ActionId,
        cx: &RenderContext<'_>,
        table: &RendererTable,
        format: Option<&str>,
    ) -> Result<Response, NegotiateError> {
        let available = table.available();

        let mut ranked = conneg::rank(cx.request.accept(), &available);
        if let Some(mime) = format.and_then(|sc| self.registry.resolve(sc)) {
            // The format override is an exact-match candidate at quality 1.0,
            // ahead of everything the header produced.
            if let Some(&exact) = available.iter().find(|&&m| m == mime) {
                ranked.retain(|&m| m != exact);
                ranked.insert(0, exact);
            }
        }

        trace!(action = %action, candidates = ?ranked, "negotiating representation");

        for mime in ranked {
            let backend = table
                .get(mime)
                .ok_or(NegotiateError::NotAcceptable)?; // candidates come from the table
            match backend.invoke(action, cx) {
                Ok(Rendered::Produced(mut response)) => {
                    if response.content_type().is_none() {
                        response.add_header("Content-Type", mime);
                    }
                    debug!(action = %action, mime, "selected renderer backend");
                    return Ok(response);
                }
                Ok(Rendered::Skip) => {
                    trace!(action = %action, mime, "backend skipped");
                }
                Err(source) => {
                    return Err(NegotiateError::Backend {
                        mime: mime.to_owned(),
                        source,
                    });
                }
            }
        }

        debug!(action = %action, "no backend produced a response");
        Err(NegotiateError::NotAcceptable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Method, StatusCode};

    fn produced(body: &'static str) -> RendererBackend {
        RendererBackend::specific(move |_cx| Ok(Rendered::Produced(Response::html(body))))
    }

    fn always_skip() -> RendererBackend {
        RendererBackend::specific(|_cx| Ok(Rendered::Skip))
    }

    fn failing() -> RendererBackend {
        RendererBackend::specific(|_cx| Err("template exploded".into()))
    }

    fn action() -> ActionId {
        ActionId::new("User", "index")
    }

    fn negotiate_with(
        table: &RendererTable,
        accept: Option<&str>,
        format: Option<&str>,
    ) -> Result<Response, NegotiateError> {
        let mut request = Request::new(Method::Get, "/users/");
        if let Some(accept) = accept {
            request = request.header("Accept", accept);
        }
        let state = ResourceState::new();
        let cx = RenderContext {
            request: &request,
            state: &state,
            template_prefix: "",
        };
        Negotiator::default().negotiate(&action(), &cx, table, format)
    }

    // ── table semantics ──────────────────────────────────────────────────────

    #[test]
    fn set_replaces_in_place() {
        let mut table = RendererTable::new();
        table.set("text/html", produced("first"));
        table.set("application/json", produced("j"));
        table.set("text/html", produced("second"));
        assert_eq!(table.len(), 2);
        assert_eq!(table.available(), vec!["text/html", "application/json"]);
    }

    #[test]
    fn delete_reports_presence() {
        let mut table = RendererTable::new();
        table.set("text/html", produced("x"));
        assert!(table.delete("text/html"));
        assert!(!table.delete("text/html"));
        assert!(table.is_empty());
    }

    #[test]
    fn clone_is_isolated_both_ways() {
        let mut generic = RendererTable::new();
        generic.set("text/html", produced("x"));

        let mut copy = RendererTable::clone_from(&generic);
        copy.delete("text/html");
        copy.set("application/json", produced("j"));
        assert!(generic.get("text/html").is_some());
        assert!(generic.get("application/json").is_none());

        // Mutating the source after the copy does not leak either.
        generic.set("application/xml", produced("x"));
        assert!(copy.get("application/xml").is_none());
    }

    // ── negotiation ──────────────────────────────────────────────────────────

    #[test]
    fn picks_highest_quality_backend() {
        let mut table = RendererTable::new();
        table.set("application/json", produced("json"));
        table.set("text/html", produced("html"));

        let response = negotiate_with(
            &table,
            Some("application/json;q=0.5, text/html;q=0.9"),
            None,
        )
        .unwrap();
        assert_eq!(&response.body()[..], b"html");
    }

    #[test]
    fn format_param_overrides_header() {
        let mut table = RendererTable::new();
        table.set("text/html", produced("html"));
        table.set("application/json", produced("json"));

        let response = negotiate_with(&table, Some("text/html"), Some("json")).unwrap();
        assert_eq!(&response.body()[..], b"json");
    }

    #[test]
    fn unknown_format_shortcode_falls_back_to_header() {
        let mut table = RendererTable::new();
        table.set("text/html", produced("html"));

        let response = negotiate_with(&table, Some("text/html"), Some("flac")).unwrap();
        assert_eq!(&response.body()[..], b"html");
    }

    #[test]
    fn skip_falls_through_to_next_candidate() {
        let mut table = RendererTable::new();
        table.set("application/rdf+xml", always_skip());
        table.set("text/html", produced("html"));

        let response =
            negotiate_with(&table, Some("application/rdf+xml, text/html;q=0.5"), None).unwrap();
        assert_eq!(&response.body()[..], b"html");
        assert_eq!(response.content_type(), Some("text/html"));
    }

    #[test]
    fn exhaustion_is_not_acceptable() {
        let mut table = RendererTable::new();
        table.set("application/rdf+xml", always_skip());

        let err = negotiate_with(&table, Some("application/rdf+xml"), None).unwrap_err();
        assert!(matches!(err, NegotiateError::NotAcceptable));
    }

    #[test]
    fn empty_table_is_not_acceptable() {
        let table = RendererTable::new();
        let err = negotiate_with(&table, None, None).unwrap_err();
        assert!(matches!(err, NegotiateError::NotAcceptable));
    }

    #[test]
    fn unmatched_accept_is_not_acceptable() {
        let mut table = RendererTable::new();
        table.set("text/html", produced("html"));
        let err = negotiate_with(&table, Some("image/png"), None).unwrap_err();
        assert!(matches!(err, NegotiateError::NotAcceptable));
    }

    #[test]
    fn backend_error_propagates_not_skips() {
        let mut table = RendererTable::new();
        table.set("application/json", failing());
        table.set("text/html", produced("html"));

        // json ranks first; its failure must not fall through to html.
        let err = negotiate_with(&table, Some("application/json, text/html;q=0.1"), None)
            .unwrap_err();
        match err {
            NegotiateError::Backend { mime, .. } => assert_eq!(mime, "application/json"),
            other => panic!("expected Backend error, got {other:?}"),
        }
    }

    #[test]
    fn absent_header_uses_registration_order() {
        let mut table = RendererTable::new();
        table.set("text/html", produced("html"));
        table.set("application/json", produced("json"));

        let response = negotiate_with(&table, None, None).unwrap();
        assert_eq!(&response.body()[..], b"html");
    }

    #[test]
    fn content_type_defaulted_to_selected_mime() {
        let mut table = RendererTable::new();
        table.set(
            "application/json",
            RendererBackend::specific(|_cx| {
                Ok(Rendered::Produced(
                    Response::new(StatusCode::Ok).with_body("{}"),
                ))
            }),
        );
        let response = negotiate_with(&table, Some("application/json"), None).unwrap();
        assert_eq!(response.content_type(), Some("application/json"));
    }
}
