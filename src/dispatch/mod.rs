//! Request dispatch — ties the router, the resource registry, and the
//! content negotiator together into a single entry point.
//!
//! [`Dispatcher::dispatch`] reports failures as typed [`DispatchError`]s
//! for callers that want to handle them; [`Dispatcher::respond`] is the
//! boundary that maps every outcome, success or failure, to an HTTP
//! response.

use std::collections::HashMap;

use tracing::{debug, error, trace, warn};

use crate::http::{Method, Request, Response, StatusCode};
use crate::render::{NegotiateError, Negotiator};
use crate::resource::{ActionOutcome, Context, Resource};
use crate::urls::{RouteError, RouteMatch, UrlRouter};

/// Why a request could not be turned into a successful action response.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No route matched, or the matched route's action is not declared
    /// anywhere reachable. Boundary: 404.
    #[error("no resource handles this path")]
    NotFound,

    /// The path exists but not under this method. Boundary: 405 with an
    /// `Allow` header.
    #[error("method not allowed")]
    MethodNotAllowed {
        /// Methods that would have been accepted for this path.
        allow: Vec<Method>,
    },

    /// Negotiation exhausted every backend. Boundary: 406.
    #[error("no acceptable representation")]
    NotAcceptable,

    /// The route named a resource that was never registered. A wiring
    /// mistake, not a request condition. Boundary: 500.
    #[error("route targets unregistered resource `{0}`")]
    UnregisteredResource(String),

    /// The action body or a renderer backend failed. Boundary: 500.
    #[error("action failed: {0}")]
    Action(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// The assembled application: routes in, responses out.
///
/// # Examples
///
/// ```
/// use restroute::dispatch::Dispatcher;
/// use restroute::http::{Method, Request, Response};
/// use restroute::render::{Rendered, RendererTable};
/// use restroute::resource::{ActionOutcome, Resource};
/// use restroute::urls::{DefaultStyle, ResourceDecl, UrlRouter};
///
/// let mut generic = RendererTable::new();
/// generic.set(
///     "text/html",
///     restroute::render::RendererBackend::generic(|_action, _cx| {
///         Ok(Rendered::Produced(Response::html("<ul></ul>")))
///     }),
/// );
///
/// let mut users = Resource::new("User", &generic);
/// users.action("index", |_cx| Ok(ActionOutcome::Render));
///
/// let mut router = UrlRouter::new(DefaultStyle);
/// router.mount("/users", ResourceDecl::collection("User"));
///
/// let app = Dispatcher::new(router).register(users);
/// let response = app.respond(&Request::new(Method::Get, "/users/"));
/// assert_eq!(response.status().as_u16(), 200);
/// ```
#[derive(Debug)]
pub struct Dispatcher {
    router: UrlRouter,
    resources: HashMap<String, Resource>,
    negotiator: Negotiator,
}

impl Dispatcher {
    /// Creates a dispatcher over `router` with the default media-type
    /// registry.
    pub fn new(router: UrlRouter) -> Self {
        Self {
            router,
            resources: HashMap::new(),
            negotiator: Negotiator::default(),
        }
    }

    /// Replaces the negotiator (to use a custom media-type registry).
    #[must_use]
    pub fn negotiator(mut self, negotiator: Negotiator) -> Self {
        self.negotiator = negotiator;
        self
    }

    /// Registers a resource under its declared name.
    #[must_use]
    pub fn register(mut self, resource: Resource) -> Self {
        self.resources.insert(resource.name().to_owned(), resource);
        self
    }

    /// The router, for reverse lookups from action bodies.
    pub fn router(&self) -> &UrlRouter {
        &self.router
    }

    /// Runs one request through routing, the action body, and negotiation.
    pub fn dispatch(&self, request: &Request) -> Result<Response, DispatchError> {
        let method = request.effective_method();
        let found = match self.router.recognize(&method, request.path()) {
            Ok(found) => found,
            Err(RouteError::NotFound) => return Err(DispatchError::NotFound),
            Err(RouteError::MethodNotAllowed { allow }) => {
                return Err(DispatchError::MethodNotAllowed { allow });
            }
        };
        trace!(
            resource = %found.resource,
            action = %found.action,
            method = %method,
            path = %request.path(),
            "route matched"
        );

        let resource = self
            .resources
            .get(&found.resource)
            .ok_or_else(|| DispatchError::UnregisteredResource(found.resource.clone()))?;

        let Some(action) = resource.get(&found.action) else {
            // The route exists but the resource never declared this action.
            // Advertise only the methods whose actions it does declare.
            let allow = self.declared_methods(resource, &found);
            if allow.is_empty() {
                return Err(DispatchError::NotFound);
            }
            return Err(DispatchError::MethodNotAllowed { allow });
        };

        let mut cx = Context::with_captures(request.clone(), found.args, found.params);
        match action.invoke(&mut cx).map_err(DispatchError::Action)? {
            ActionOutcome::Finished(response) => {
                debug!(action = %action.id(), status = %response.status(), "action finished");
                Ok(response)
            }
            ActionOutcome::Render => {
                // Path-derived format outranks the query/form parameter.
                let format = found
                    .format
                    .clone()
                    .or_else(|| cx.request().format_param().map(str::to_owned));
                action
                    .render(&cx, resource.prefix(), &self.negotiator, format.as_deref())
                    .map_err(|err| match err {
                        NegotiateError::NotAcceptable => DispatchError::NotAcceptable,
                        NegotiateError::Backend { source, .. } => DispatchError::Action(source),
                    })
            }
        }
    }

    /// The full request → response boundary.
    ///
    /// Never panics and never fails: every dispatch error becomes the
    /// corresponding HTTP response.
    pub fn respond(&self, request: &Request) -> Response {
        match self.dispatch(request) {
            Ok(response) => response,
            Err(DispatchError::NotFound) => {
                debug!(path = %request.path(), "not found");
                error_response(StatusCode::NotFound)
            }
            Err(DispatchError::MethodNotAllowed { allow }) => {
                debug!(path = %request.path(), ?allow, "method not allowed");
                let allow_value = allow
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                error_response(StatusCode::MethodNotAllowed).header("Allow", allow_value)
            }
            Err(DispatchError::NotAcceptable) => {
                debug!(path = %request.path(), "no acceptable representation");
                error_response(StatusCode::NotAcceptable)
            }
            Err(DispatchError::UnregisteredResource(name)) => {
                warn!(resource = %name, "route targets unregistered resource");
                error_response(StatusCode::InternalServerError)
            }
            Err(DispatchError::Action(source)) => {
                error!(path = %request.path(), error = %source, "action failed");
                error_response(StatusCode::InternalServerError)
            }
        }
    }

    // Methods on the matched route whose mapped action the resource
    // actually declares.
    fn declared_methods(&self, resource: &Resource, found: &RouteMatch) -> Vec<Method> {
        let mut allow = Vec::new();
        for (method, action) in &found.route_methods {
            if resource.has_action(action) && !allow.contains(method) {
                allow.push(method.clone());
            }
        }
        allow
    }
}

fn error_response(status: StatusCode) -> Response {
    Response::new(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .with_body(status.canonical_reason())
}
