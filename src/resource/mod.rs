//! Resources, actions, and the per-request context their bodies run in.
//!
//! A [`Resource`] is a named entity declared once at startup: a set of
//! [`Action`]s, each owning its own [`RendererTable`]. Per request, the
//! dispatcher builds a fresh [`Context`] — the transient instance whose
//! [`ResourceState`] the action body populates — runs the body, and either
//! returns the body's finished response or hands the context to the
//! negotiator.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::http::{Request, Response};
use crate::render::{
    BackendError, NegotiateError, Negotiator, RenderContext, RendererTable,
};

/// Type-erased, request-scoped state populated by an action body and read
/// by renderer backends.
///
/// Keyed by type: one value per type. This replaces ad-hoc attribute
/// assignment with explicit typed storage — a backend asks for the exact
/// type it needs and skips when it is absent.
///
/// # Examples
///
/// ```
/// use restroute::resource::ResourceState;
///
/// #[derive(Debug, PartialEq)]
/// struct CurrentUser(String);
///
/// let mut state = ResourceState::new();
/// state.insert(CurrentUser("zoe".into()));
/// assert_eq!(state.get::<CurrentUser>(), Some(&CurrentUser("zoe".into())));
/// assert!(state.get::<i32>().is_none());
/// ```
#[derive(Default)]
pub struct ResourceState {
    map: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl ResourceState {
    /// Creates an empty state bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, replacing any existing value of the same type.
    pub fn insert<T>(&mut self, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.map.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Returns a reference to the stored value of type `T`, if any.
    pub fn get<T>(&self) -> Option<&T>
    where
        T: Send + Sync + 'static,
    {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Returns a mutable reference to the stored value of type `T`, if any.
    pub fn get_mut<T>(&mut self) -> Option<&mut T>
    where
        T: Send + Sync + 'static,
    {
        self.map
            .get_mut(&TypeId::of::<T>())
            .and_then(|value| value.downcast_mut::<T>())
    }

    /// Removes and returns the stored value of type `T`, if any.
    pub fn remove<T>(&mut self) -> Option<T>
    where
        T: Send + Sync + 'static,
    {
        self.map
            .remove(&TypeId::of::<T>())
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }
}

impl fmt::Debug for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceState")
            .field("len", &self.map.len())
            .finish()
    }
}

/// Identity of one action: `(resource name, action name)`.
///
/// Displayed in the symbolic `Resource#action` form used by reverse lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionId {
    resource: String,
    name: String,
}

impl ActionId {
    /// Creates an action identity.
    pub fn new(resource: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            name: name.into(),
        }
    }

    /// The resource name, e.g. `User`.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The action name, e.g. `show`.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.resource, self.name)
    }
}

/// What an action body hands back to the dispatcher.
#[derive(Debug)]
pub enum ActionOutcome {
    /// The body built a complete response itself (e.g. a redirect after a
    /// successful create); negotiation is bypassed.
    Finished(Response),
    /// The body populated the context's [`ResourceState`]; the dispatcher
    /// should negotiate a representation from the action's renderer table.
    Render,
}

/// Per-request context: the request, the identifier captures extracted by
/// the router, and the mutable [`ResourceState`].
pub struct Context {
    request: Request,
    args: Vec<String>,
    params: HashMap<String, String>,
    state: ResourceState,
}

impl Context {
    /// Creates a context with no captures (collection-level actions).
    pub fn new(request: Request) -> Self {
        Self::with_captures(request, Vec::new(), HashMap::new())
    }

    /// Creates a context carrying the router's identifier captures.
    pub fn with_captures(
        request: Request,
        args: Vec<String>,
        params: HashMap<String, String>,
    ) -> Self {
        Self {
            request,
            args,
            params,
            state: ResourceState::new(),
        }
    }

    /// The request being dispatched.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Positional identifier captures, in path order.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the positional capture at `index`, if any.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Returns a named capture by parameter name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// The resource-scoped state bag.
    pub fn state(&self) -> &ResourceState {
        &self.state
    }

    /// Mutable access to the state bag; action bodies populate it here.
    pub fn state_mut(&mut self) -> &mut ResourceState {
        &mut self.state
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("path", &self.request.path())
            .field("args", &self.args)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// The business-logic body of an action.
pub type ActionBody =
    Arc<dyn Fn(&mut Context) -> Result<ActionOutcome, BackendError> + Send + Sync>;

/// One operation on a resource: identity, body, and renderer table.
///
/// The identity is fixed at declaration; the renderer table stays mutable
/// so declaration code can add, replace, or delete backends per action.
pub struct Action {
    id: ActionId,
    body: ActionBody,
    renderers: RendererTable,
}

impl Action {
    /// Creates an action whose renderer table is an independent copy of
    /// `generic` taken now (later edits to `generic` do not propagate).
    pub fn new(id: ActionId, body: ActionBody, generic: &RendererTable) -> Self {
        Self {
            id,
            body,
            renderers: RendererTable::clone_from(generic),
        }
    }

    /// The action's identity.
    pub fn id(&self) -> &ActionId {
        &self.id
    }

    /// The action's renderer table.
    pub fn renderers(&self) -> &RendererTable {
        &self.renderers
    }

    /// Mutable access to the renderer table, for per-action overrides.
    pub fn renderers_mut(&mut self) -> &mut RendererTable {
        &mut self.renderers
    }

    /// Runs the action body against `cx`.
    pub fn invoke(&self, cx: &mut Context) -> Result<ActionOutcome, BackendError> {
        (self.body)(cx)
    }

    /// Negotiates a representation of `cx` through *this* action's table.
    ///
    /// Public so one action can render through another's table: a failed
    /// `update` re-renders the `edit` representation of the same context
    /// (same state, same form errors) and then downgrades the status.
    pub fn render(
        &self,
        cx: &Context,
        template_prefix: &str,
        negotiator: &Negotiator,
        format: Option<&str>,
    ) -> Result<Response, NegotiateError> {
        let render_cx = RenderContext {
            request: cx.request(),
            state: cx.state(),
            template_prefix,
        };
        negotiator.negotiate(&self.id, &render_cx, &self.renderers, format)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("id", &self.id)
            .field("renderers", &self.renderers.available())
            .finish_non_exhaustive()
    }
}

/// A named entity exposing a set of actions.
///
/// Declared once at startup, then shared immutably with the dispatcher.
/// Each [`action`](Self::action) call snapshots the generic renderer table
/// the resource was created with.
///
/// # Examples
///
/// ```
/// use restroute::http::Response;
/// use restroute::render::{Rendered, RendererBackend, RendererTable};
/// use restroute::resource::{ActionOutcome, Resource};
///
/// let mut generic = RendererTable::new();
/// generic.set(
///     "text/html",
///     RendererBackend::generic(|action, _cx| {
///         Ok(Rendered::Produced(Response::html(format!("<h1>{action}</h1>"))))
///     }),
/// );
///
/// let mut users = Resource::new("User", &generic);
/// users.action("index", |_cx| Ok(ActionOutcome::Render));
/// users.action("show", |cx| {
///     let id = cx.arg(0).unwrap_or("?").to_owned();
///     cx.state_mut().insert(id);
///     Ok(ActionOutcome::Render)
/// });
///
/// assert!(users.get("show").is_some());
/// assert!(users.get("destroy").is_none());
/// ```
pub struct Resource {
    name: String,
    template_prefix: String,
    generic: RendererTable,
    actions: Vec<Action>,
}

impl Resource {
    /// Declares a resource. `generic` is copied and becomes the template
    /// from which every action's renderer table is cloned.
    pub fn new(name: impl Into<String>, generic: &RendererTable) -> Self {
        Self {
            name: name.into(),
            template_prefix: String::new(),
            generic: RendererTable::clone_from(generic),
            actions: Vec::new(),
        }
    }

    /// Sets the template path prefix used by the generic HTML backend.
    #[must_use]
    pub fn template_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.template_prefix = prefix.into();
        self
    }

    /// Declares an action with the given body. Re-declaring a name replaces
    /// the earlier action (and resets its renderer table to a fresh copy of
    /// the generic one).
    pub fn action<F>(&mut self, name: &str, body: F) -> &mut Self
    where
        F: Fn(&mut Context) -> Result<ActionOutcome, BackendError> + Send + Sync + 'static,
    {
        let action = Action::new(
            ActionId::new(self.name.clone(), name),
            Arc::new(body),
            &self.generic,
        );
        match self.actions.iter_mut().find(|a| a.id().name() == name) {
            Some(existing) => *existing = action,
            None => self.actions.push(action),
        }
        self
    }

    /// The resource name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The template path prefix (may be empty).
    pub fn prefix(&self) -> &str {
        &self.template_prefix
    }

    /// Returns the action with the given name, if declared.
    pub fn get(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.id().name() == name)
    }

    /// Returns `true` if the action was declared.
    pub fn has_action(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Mutable access to one action's renderer table.
    pub fn renderers_mut(&mut self, name: &str) -> Option<&mut RendererTable> {
        self.actions
            .iter_mut()
            .find(|a| a.id().name() == name)
            .map(Action::renderers_mut)
    }

    /// Iterates over the declared actions.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field(
                "actions",
                &self.actions.iter().map(|a| a.id().name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Method, StatusCode};
    use crate::render::{Rendered, RendererBackend};

    fn html_stub(body: &'static str) -> RendererBackend {
        RendererBackend::specific(move |_cx| Ok(Rendered::Produced(Response::html(body))))
    }

    fn generic_table() -> RendererTable {
        let mut table = RendererTable::new();
        table.set("text/html", html_stub("generic html"));
        table.set("application/json", html_stub("generic json"));
        table
    }

    // ── ResourceState ────────────────────────────────────────────────────────

    #[test]
    fn state_typed_roundtrip() {
        let mut state = ResourceState::new();
        state.insert(42_u32);
        state.insert(String::from("hi"));
        assert_eq!(state.get::<u32>(), Some(&42));
        assert_eq!(state.get::<String>().map(String::as_str), Some("hi"));
        assert_eq!(state.remove::<u32>(), Some(42));
        assert!(state.get::<u32>().is_none());
    }

    #[test]
    fn state_replaces_same_type() {
        let mut state = ResourceState::new();
        state.insert(1_i64);
        state.insert(2_i64);
        assert_eq!(state.get::<i64>(), Some(&2));
    }

    // ── actions and tables ───────────────────────────────────────────────────

    #[test]
    fn action_table_copied_at_declaration() {
        let mut generic = generic_table();
        let mut users = Resource::new("User", &generic);
        users.action("index", |_cx| Ok(ActionOutcome::Render));

        // Mutating the source table after declaration changes nothing.
        generic.delete("text/html");
        assert!(users.get("index").unwrap().renderers().get("text/html").is_some());
    }

    #[test]
    fn sibling_action_tables_are_isolated() {
        let generic = generic_table();
        let mut users = Resource::new("User", &generic);
        users.action("index", |_cx| Ok(ActionOutcome::Render));
        users.action("show", |_cx| Ok(ActionOutcome::Render));

        users.renderers_mut("show").unwrap().delete("text/html");

        assert!(users.get("show").unwrap().renderers().get("text/html").is_none());
        assert!(users.get("index").unwrap().renderers().get("text/html").is_some());
    }

    #[test]
    fn per_action_override_replaces_generic_backend() {
        let generic = generic_table();
        let mut users = Resource::new("User", &generic);
        users.action("show", |_cx| Ok(ActionOutcome::Render));
        users
            .renderers_mut("show")
            .unwrap()
            .set("application/json", html_stub("specific json"));

        let mut cx = Context::new(
            Request::new(Method::Get, "/users/1/").header("Accept", "application/json"),
        );
        let action = users.get("show").unwrap();
        action.invoke(&mut cx).unwrap();
        let response = action
            .render(&cx, users.prefix(), &Negotiator::default(), None)
            .unwrap();
        assert_eq!(&response.body()[..], b"specific json");
    }

    #[test]
    fn redeclaring_action_resets_table() {
        let generic = generic_table();
        let mut users = Resource::new("User", &generic);
        users.action("index", |_cx| Ok(ActionOutcome::Render));
        users.renderers_mut("index").unwrap().delete("text/html");

        users.action("index", |_cx| Ok(ActionOutcome::Render));
        assert!(users.get("index").unwrap().renderers().get("text/html").is_some());
    }

    #[test]
    fn body_finished_response_carries_through() {
        let generic = generic_table();
        let mut users = Resource::new("User", &generic);
        users.action("create", |_cx| {
            Ok(ActionOutcome::Finished(Response::see_other("/users/9/")))
        });

        let mut cx = Context::new(Request::new(Method::Post, "/users/"));
        match users.get("create").unwrap().invoke(&mut cx).unwrap() {
            ActionOutcome::Finished(response) => {
                assert_eq!(response.status(), StatusCode::SeeOther)
            }
            other => panic!("expected Finished, got {other:?}"),
        }
    }

    #[test]
    fn cross_action_render() {
        // A failed update renders the edit representation with its own table.
        let generic = generic_table();
        let mut users = Resource::new("User", &generic);
        users.action("edit", |_cx| Ok(ActionOutcome::Render));
        users
            .renderers_mut("edit")
            .unwrap()
            .set("text/html", html_stub("edit form"));

        let cx = Context::new(Request::new(Method::Put, "/users/1/").header("Accept", "text/html"));
        let response = users
            .get("edit")
            .unwrap()
            .render(&cx, "", &Negotiator::default(), None)
            .unwrap()
            .with_status(StatusCode::UnprocessableEntity);
        assert_eq!(&response.body()[..], b"edit form");
        assert_eq!(response.status(), StatusCode::UnprocessableEntity);
    }

    #[test]
    fn action_id_display() {
        assert_eq!(ActionId::new("User", "show").to_string(), "User#show");
    }
}
