//! # restroute
//!
//! Resource-oriented request routing and content negotiation, decoupled
//! from any particular HTTP server.
//!
//! A resource is a named bundle of actions (`index`, `show`, `create`,
//! ...). Declarative URL mounting compiles each resource into a route
//! table that maps method + path to an action going forward, and maps
//! symbolic `"Resource#action"` references back to canonical paths in
//! reverse. When an action asks to be rendered, a per-action renderer
//! table is negotiated against the request's `Accept` header (or an
//! explicit `format` override) to pick the representation.
//!
//! ## Quick Start
//!
//! ```rust
//! use restroute::dispatch::Dispatcher;
//! use restroute::http::{Method, Request, Response};
//! use restroute::render::{Rendered, RendererBackend, RendererTable};
//! use restroute::resource::{ActionOutcome, Resource};
//! use restroute::urls::{DefaultStyle, ResourceDecl, UrlRouter};
//!
//! // A generic renderer table, copied into every action at declaration.
//! let mut generic = RendererTable::new();
//! generic.set(
//!     "text/html",
//!     RendererBackend::generic(|action, _cx| {
//!         Ok(Rendered::Produced(Response::html(format!("<h1>{action}</h1>"))))
//!     }),
//! );
//!
//! let mut users = Resource::new("User", &generic);
//! users.action("index", |_cx| Ok(ActionOutcome::Render));
//! users.action("show", |cx| {
//!     let id = cx.arg(0).expect("member routes capture an id");
//!     assert!(!id.is_empty());
//!     Ok(ActionOutcome::Render)
//! });
//!
//! let mut router = UrlRouter::new(DefaultStyle);
//! router.mount("/users", ResourceDecl::collection("User"));
//!
//! let app = Dispatcher::new(router).register(users);
//! let response = app.respond(&Request::new(Method::Get, "/users/42/"));
//! assert_eq!(response.status().as_u16(), 200);
//! assert_eq!(&response.body()[..], b"<h1>User#show</h1>");
//! ```

pub mod conneg;
pub mod dispatch;
pub mod http;
pub mod mime;
pub mod render;
pub mod resource;
pub mod urls;
pub mod util;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use dispatch::{DispatchError, Dispatcher};
pub use http::{Headers, Method, Request, Response, StatusCode};
pub use mime::MimeRegistry;
pub use render::{NegotiateError, Negotiator, Rendered, RendererBackend, RendererTable};
pub use resource::{ActionOutcome, Context, Resource};
pub use urls::{ResourceDecl, RouteArgs, UrlRouter};
