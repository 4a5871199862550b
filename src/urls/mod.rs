//! Declarative resource routing — compile resource declarations into
//! method+path matchers, and generate paths back from symbolic references.
//!
//! A [`ResourceDecl`] names a resource, its shape (collection or singleton),
//! and its identifier parameter. A [`UrlStyle`] turns the declaration into a
//! set of concrete [`Route`]s; the compiled [`RouteTable`] answers forward
//! lookups (method + path → resource, action, captures) and reverse lookups
//! (`"User#show"` + arguments → canonical path).
//!
//! Routes are matched in declaration order; the first route whose pattern
//! matches the path wins. Trailing slashes are normalized for matching; the
//! style's canonical form is what reverse generation emits.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::http::Method;

pub mod styles;

pub use styles::{AtomPubStyle, DefaultStyle, RailsStyle, UrlStyle};

/// The two resource shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Many addressable members under a collection root (`/users/`,
    /// `/users/1/`).
    Collection,
    /// Exactly one instance, no member identifier (`/account/`).
    Singleton,
}

/// Validator for identifier path segments.
///
/// The routing core matches path structure itself; the identifier is the
/// one configurable piece, expressed as a small set of common shapes plus
/// an arbitrary predicate escape hatch.
#[derive(Clone)]
pub enum IdPattern {
    /// One or more ASCII digits (the default).
    Digits,
    /// ASCII alphanumerics, `-`, and `_`.
    Slug,
    /// Any non-empty single segment.
    ///
    /// Greedy: under a style with dotted format extensions the whole
    /// segment is taken as the identifier (`/users/42.json` yields the id
    /// `42.json`, no format). The extension is only split off when the
    /// pattern rejects the full segment, so format extraction needs a
    /// pattern that excludes dots, such as [`Digits`](Self::Digits) or
    /// [`Slug`](Self::Slug).
    Any,
    /// Custom acceptance predicate.
    Predicate(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl IdPattern {
    /// Returns `true` if `value` is a valid identifier under this pattern.
    pub fn accepts(&self, value: &str) -> bool {
        if value.is_empty() {
            return false;
        }
        match self {
            Self::Digits => value.bytes().all(|b| b.is_ascii_digit()),
            Self::Slug => value
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'),
            Self::Any => !value.contains('/'),
            Self::Predicate(test) => test(value),
        }
    }
}

impl fmt::Debug for IdPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digits => f.write_str("Digits"),
            Self::Slug => f.write_str("Slug"),
            Self::Any => f.write_str("Any"),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// How the identifier capture is declared and surfaced to the action body.
#[derive(Debug, Clone)]
pub enum IdParam {
    /// The capture is appended to the context's positional arguments.
    Positional(IdPattern),
    /// The capture lands in the context's named parameter map under the
    /// given key.
    Named(String, IdPattern),
}

impl IdParam {
    /// The identifier's validation pattern.
    pub fn pattern(&self) -> &IdPattern {
        match self {
            Self::Positional(p) | Self::Named(_, p) => p,
        }
    }

    /// The parameter name for named captures.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Positional(_) => None,
            Self::Named(name, _) => Some(name),
        }
    }
}

impl Default for IdParam {
    fn default() -> Self {
        Self::Positional(IdPattern::Digits)
    }
}

/// A resource declaration — the configuration surface a mounting
/// application fills in.
///
/// # Examples
///
/// ```
/// use restroute::urls::{IdParam, IdPattern, ResourceDecl};
///
/// let users = ResourceDecl::collection("User");
/// let posts = ResourceDecl::collection("Post")
///     .id(IdParam::Named("slug".into(), IdPattern::Slug))
///     .only(["index", "show"]);
/// let account = ResourceDecl::singleton("Account").reverse_name("MyAccount");
/// # let _ = (users, posts, account);
/// ```
#[derive(Debug, Clone)]
pub struct ResourceDecl {
    resource: String,
    kind: ResourceKind,
    id: IdParam,
    actions: Option<Vec<String>>,
    reverse_name: Option<String>,
}

impl ResourceDecl {
    /// Declares a collection resource with the default positional digit
    /// identifier.
    pub fn collection(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            kind: ResourceKind::Collection,
            id: IdParam::default(),
            actions: None,
            reverse_name: None,
        }
    }

    /// Declares a singleton resource.
    pub fn singleton(resource: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::Singleton,
            ..Self::collection(resource)
        }
    }

    /// Sets the identifier parameter.
    #[must_use]
    pub fn id(mut self, id: IdParam) -> Self {
        self.id = id;
        self
    }

    /// Restricts the generated routes to the given actions.
    #[must_use]
    pub fn only<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions = Some(actions.into_iter().map(Into::into).collect());
        self
    }

    /// Overrides the name used in reverse references (defaults to the
    /// resource name).
    #[must_use]
    pub fn reverse_name(mut self, name: impl Into<String>) -> Self {
        self.reverse_name = Some(name.into());
        self
    }

    /// The resource name.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The resource shape.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    fn allows(&self, action: &str) -> bool {
        match &self.actions {
            Some(subset) => subset.iter().any(|a| a == action),
            None => true,
        }
    }
}

/// The structural position of a route within a resource's URL space.
///
/// Each slot fixes a method → action map; URL styles only decide what the
/// slot's path looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteSlot {
    /// Collection root: `index` / `create`.
    Collection,
    /// The new-member form.
    New,
    /// One member: `show` / `update` / `destroy`.
    Member,
    /// One member's edit form.
    Edit,
    /// Singleton root: `show` / `create` / `update` / `destroy`.
    Singleton,
    /// The singleton's edit form.
    SingletonEdit,
}

impl RouteSlot {
    /// The slots generated for a resource shape, in declaration order.
    ///
    /// `New` precedes `Member` so that a literal `new` segment is never
    /// swallowed by a permissive identifier pattern.
    pub fn for_kind(kind: ResourceKind) -> &'static [RouteSlot] {
        match kind {
            ResourceKind::Collection => {
                &[Self::Collection, Self::New, Self::Member, Self::Edit]
            }
            ResourceKind::Singleton => &[Self::Singleton, Self::New, Self::SingletonEdit],
        }
    }

    /// Returns `true` if the slot's path contains the member identifier.
    pub fn needs_id(self) -> bool {
        matches!(self, Self::Member | Self::Edit)
    }

    /// The fixed method → action map for this slot.
    ///
    /// A plain `POST` to a member path is deliberately not mapped (verb
    /// emulation goes through the `_method` override instead), so it
    /// surfaces as MethodNotAllowed.
    pub fn methods(self) -> Vec<(Method, &'static str)> {
        match self {
            Self::Collection => vec![(Method::Get, "index"), (Method::Post, "create")],
            Self::New => vec![(Method::Get, "new")],
            Self::Member => vec![
                (Method::Get, "show"),
                (Method::Put, "update"),
                (Method::Patch, "update"),
                (Method::Delete, "destroy"),
            ],
            Self::Edit => vec![(Method::Get, "edit")],
            Self::Singleton => vec![
                (Method::Get, "show"),
                (Method::Post, "create"),
                (Method::Put, "update"),
                (Method::Patch, "update"),
                (Method::Delete, "destroy"),
            ],
            Self::SingletonEdit => vec![(Method::Get, "edit")],
        }
    }
}

/// One path segment of a compiled route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A fixed segment that must match literally.
    Literal(String),
    /// The member identifier, validated by the declaration's [`IdPattern`].
    Id,
}

/// A compiled path pattern: segments relative to the mount prefix, plus the
/// style's canonical-form and format-extension flags.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    /// Segments after the mount prefix.
    pub segments: Vec<Segment>,
    /// Whether the canonical (reverse-generated) form ends with `/`.
    pub trailing_slash: bool,
    /// Whether a dotted format extension may follow the final segment
    /// (Rails style: `/posts/1.json`).
    pub format_ext: bool,
}

/// A compiled route: where it sits, what it matches, and which actions its
/// methods dispatch to.
#[derive(Debug, Clone)]
pub struct Route {
    slot: RouteSlot,
    pattern: RoutePattern,
    methods: Vec<(Method, String)>,
}

impl Route {
    /// The route's structural slot.
    pub fn slot(&self) -> RouteSlot {
        self.slot
    }

    /// The method → action map.
    pub fn methods(&self) -> &[(Method, String)] {
        &self.methods
    }

    fn action_for(&self, method: &Method) -> Option<&str> {
        self.methods
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, action)| action.as_str())
    }

    fn has_action(&self, action: &str) -> bool {
        self.methods.iter().any(|(_, a)| a == action)
    }
}

/// A successful forward match.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The declared resource name.
    pub resource: String,
    /// The action the method mapped to.
    pub action: String,
    /// Positional identifier captures.
    pub args: Vec<String>,
    /// Named captures (named identifiers and the Rails `format` extension).
    pub params: HashMap<String, String>,
    /// Format shortcode derived from a dotted path suffix, if any.
    pub format: Option<String>,
    /// The full method → action map of the matched route.
    ///
    /// The dispatcher uses this to compute an `Allow` set when the mapped
    /// action turns out not to be declared on the resource.
    pub route_methods: Vec<(Method, String)>,
}

/// Forward-lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// No pattern matched the path. Boundary: HTTP 404.
    #[error("no route matches the request path")]
    NotFound,

    /// A pattern matched but the method is not mapped on it. Boundary:
    /// HTTP 405 with an `Allow` header.
    #[error("method not allowed for this path")]
    MethodNotAllowed {
        /// Methods that would have matched.
        allow: Vec<Method>,
    },
}

/// Arguments supplied to a reverse lookup.
#[derive(Debug, Clone, Default)]
pub enum RouteArgs {
    /// No identifier (collection-level and singleton actions).
    #[default]
    Empty,
    /// Positional identifier values, in path order.
    Positional(Vec<String>),
    /// Named identifier values.
    Named(HashMap<String, String>),
}

impl RouteArgs {
    /// No arguments.
    pub fn none() -> Self {
        Self::Empty
    }

    /// A single positional identifier.
    pub fn id(value: impl Into<String>) -> Self {
        Self::Positional(vec![value.into()])
    }

    /// Named identifier values.
    pub fn named<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Positional(values) => values.is_empty(),
            Self::Named(map) => map.is_empty(),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Empty => "no arguments".to_owned(),
            Self::Positional(values) => format!("{} positional argument(s)", values.len()),
            Self::Named(map) => {
                let mut keys: Vec<_> = map.keys().map(String::as_str).collect();
                keys.sort_unstable();
                format!("named arguments [{}]", keys.join(", "))
            }
        }
    }
}

/// Reverse-lookup failures. These are programmer errors surfaced at the
/// call site, not request-time conditions.
#[derive(Debug, thiserror::Error)]
pub enum ReverseError {
    /// The `Resource#action` pair was never registered under that name.
    #[error("unresolved reverse reference `{0}`")]
    UnresolvedReference(String),

    /// The supplied arguments don't fit the identifier's declared shape.
    #[error("`{reference}` expects {expected}, got {got}")]
    ArityMismatch {
        reference: String,
        expected: &'static str,
        got: String,
    },

    /// The identifier value was rejected by the declared pattern.
    #[error("identifier `{value}` is not valid for `{reference}`")]
    IdentifierMismatch { reference: String, value: String },
}

/// The compiled, queryable route set for one mounted resource.
#[derive(Debug, Clone)]
pub struct RouteTable {
    resource: String,
    reverse_name: String,
    prefix: Vec<String>,
    id: IdParam,
    routes: Vec<Route>,
}

impl RouteTable {
    /// Compiles a declaration against a style, mounted under `prefix`.
    pub fn compile(prefix: &str, decl: &ResourceDecl, style: &dyn UrlStyle) -> Self {
        let id = style.coerce_id(decl.id.clone());
        let mut routes = Vec::new();

        for &slot in RouteSlot::for_kind(decl.kind) {
            let methods: Vec<(Method, String)> = slot
                .methods()
                .into_iter()
                .filter(|(_, action)| decl.allows(action))
                .map(|(m, action)| (m, action.to_owned()))
                .collect();
            if methods.is_empty() {
                continue;
            }
            routes.push(Route {
                slot,
                pattern: style.pattern(slot),
                methods,
            });
        }

        Self {
            resource: decl.resource.clone(),
            reverse_name: decl
                .reverse_name
                .clone()
                .unwrap_or_else(|| decl.resource.clone()),
            prefix: split_path(prefix).into_iter().map(str::to_owned).collect(),
            id,
            routes,
        }
    }

    /// The name this table answers reverse references under.
    pub fn reverse_name(&self) -> &str {
        &self.reverse_name
    }

    /// The compiled routes, in declaration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Matches `method` + `path` against this table.
    ///
    /// Patterns are tried in declaration order; the first whose path
    /// matches wins. A path match without a method mapping collects the
    /// pattern's methods into the `MethodNotAllowed` allow set.
    pub fn recognize(&self, method: &Method, path: &str) -> Result<RouteMatch, RouteError> {
        let path_segments = split_path(path);
        let mut allow: Vec<Method> = Vec::new();

        for route in &self.routes {
            let Some(captures) = self.match_route(route, &path_segments) else {
                continue;
            };

            match route.action_for(method) {
                Some(action) => {
                    let mut args = Vec::new();
                    let mut params = HashMap::new();
                    if let Some(value) = captures.id {
                        match &self.id {
                            IdParam::Positional(_) => args.push(value),
                            IdParam::Named(name, _) => {
                                params.insert(name.clone(), value);
                            }
                        }
                    }
                    let format = captures.format.map(|ext| ext.replace('.', "_"));
                    if let Some(fmt) = &format {
                        params.insert("format".to_owned(), fmt.clone());
                    }
                    return Ok(RouteMatch {
                        resource: self.resource.clone(),
                        action: action.to_owned(),
                        args,
                        params,
                        format,
                        route_methods: route.methods.clone(),
                    });
                }
                None => {
                    for (m, _) in &route.methods {
                        if !allow.contains(m) {
                            allow.push(m.clone());
                        }
                    }
                }
            }
        }

        if allow.is_empty() {
            Err(RouteError::NotFound)
        } else {
            Err(RouteError::MethodNotAllowed { allow })
        }
    }

    /// Generates the canonical path for `action` with the given arguments.
    pub fn path_for(&self, action: &str, args: &RouteArgs) -> Result<String, ReverseError> {
        let reference = format!("{}#{}", self.reverse_name, action);
        let route = self
            .routes
            .iter()
            .find(|r| r.has_action(action))
            .ok_or_else(|| ReverseError::UnresolvedReference(reference.clone()))?;

        let id_value = if route.slot.needs_id() {
            Some(self.reverse_id(&reference, args)?)
        } else {
            if !args.is_empty() {
                return Err(ReverseError::ArityMismatch {
                    reference,
                    expected: "no arguments",
                    got: args.describe(),
                });
            }
            None
        };

        let mut out = String::from("/");
        for segment in &self.prefix {
            out.push_str(segment);
            out.push('/');
        }
        for segment in &route.pattern.segments {
            match segment {
                Segment::Literal(literal) => out.push_str(literal),
                // needs_id routes always carry a value here
                Segment::Id => out.push_str(id_value.as_deref().unwrap_or("")),
            }
            out.push('/');
        }
        if !route.pattern.trailing_slash && out.len() > 1 {
            out.pop();
        }
        Ok(out)
    }

    fn reverse_id(&self, reference: &str, args: &RouteArgs) -> Result<String, ReverseError> {
        let value = match (args, &self.id) {
            (RouteArgs::Positional(values), _) if values.len() == 1 => values[0].clone(),
            (RouteArgs::Named(map), IdParam::Named(name, _)) if map.len() == 1 => map
                .get(name)
                .cloned()
                .ok_or_else(|| ReverseError::ArityMismatch {
                    reference: reference.to_owned(),
                    expected: "the declared identifier name",
                    got: args.describe(),
                })?,
            _ => {
                return Err(ReverseError::ArityMismatch {
                    reference: reference.to_owned(),
                    expected: "exactly one identifier",
                    got: args.describe(),
                });
            }
        };

        if !self.id.pattern().accepts(&value) {
            return Err(ReverseError::IdentifierMismatch {
                reference: reference.to_owned(),
                value,
            });
        }
        Ok(value)
    }

    // Try to match the full segment sequence (prefix + pattern) against the
    // path, extracting the identifier and a dotted format extension.
    fn match_route(&self, route: &Route, path_segments: &[&str]) -> Option<Captures> {
        let expected_len = self.prefix.len() + route.pattern.segments.len();
        if path_segments.len() != expected_len {
            return None;
        }

        let mut captures = Captures::default();
        let last = expected_len.checked_sub(1);

        for (i, &got) in path_segments.iter().enumerate() {
            let allow_ext = route.pattern.format_ext && Some(i) == last;
            if i < self.prefix.len() {
                if !literal_matches(&self.prefix[i], got, allow_ext, &mut captures) {
                    return None;
                }
                continue;
            }
            match &route.pattern.segments[i - self.prefix.len()] {
                Segment::Literal(literal) => {
                    if !literal_matches(literal, got, allow_ext, &mut captures) {
                        return None;
                    }
                }
                Segment::Id => {
                    let pattern = self.id.pattern();
                    // Identifier matching is greedy: a pattern that accepts
                    // the dotted segment keeps it whole, no format split.
                    if pattern.accepts(got) {
                        captures.id = Some(got.to_owned());
                    } else if allow_ext {
                        let (head, ext) = split_format_ext(got)?;
                        if !pattern.accepts(head) {
                            return None;
                        }
                        captures.id = Some(head.to_owned());
                        captures.format = Some(ext.to_owned());
                    } else {
                        return None;
                    }
                }
            }
        }
        Some(captures)
    }
}

#[derive(Debug, Default)]
struct Captures {
    id: Option<String>,
    format: Option<String>,
}

// Match a literal segment, optionally allowing a trailing `.format` suffix.
fn literal_matches(literal: &str, got: &str, allow_ext: bool, captures: &mut Captures) -> bool {
    if got == literal {
        return true;
    }
    if allow_ext {
        if let Some(rest) = got.strip_prefix(literal) {
            if let Some(ext) = rest.strip_prefix('.') {
                if valid_format_ext(ext) {
                    captures.format = Some(ext.to_owned());
                    return true;
                }
            }
        }
    }
    false
}

// Split `1.json` into (`1`, `json`) at the first dot.
fn split_format_ext(segment: &str) -> Option<(&str, &str)> {
    let (head, ext) = segment.split_once('.')?;
    if head.is_empty() || !valid_format_ext(ext) {
        return None;
    }
    Some((head, ext))
}

// Extensions look like file extensions: `json`, `tar.bz2`.
fn valid_format_ext(ext: &str) -> bool {
    let mut bytes = ext.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphanumeric() => {}
        _ => return false,
    }
    ext.bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'.')
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Routing front door: one style, many mounted resources.
///
/// # Examples
///
/// ```
/// use restroute::http::Method;
/// use restroute::urls::{DefaultStyle, ResourceDecl, RouteArgs, UrlRouter};
///
/// let mut router = UrlRouter::new(DefaultStyle);
/// router.mount("/users", ResourceDecl::collection("User"));
///
/// let m = router.recognize(&Method::Get, "/users/42/").unwrap();
/// assert_eq!(m.action, "show");
/// assert_eq!(m.args, vec!["42"]);
///
/// let path = router.path_for("User#show", &RouteArgs::id("42")).unwrap();
/// assert_eq!(path, "/users/42/");
/// ```
pub struct UrlRouter {
    style: Arc<dyn UrlStyle>,
    tables: Vec<RouteTable>,
}

impl UrlRouter {
    /// Creates a router generating URLs in the given style.
    pub fn new(style: impl UrlStyle + 'static) -> Self {
        Self {
            style: Arc::new(style),
            tables: Vec::new(),
        }
    }

    /// Compiles `decl` under `prefix` and adds its table.
    pub fn mount(&mut self, prefix: &str, decl: ResourceDecl) -> &mut Self {
        let table = RouteTable::compile(prefix, &decl, self.style.as_ref());
        debug!(
            resource = %decl.resource(),
            prefix,
            routes = table.routes().len(),
            "mounted resource"
        );
        self.tables.push(table);
        self
    }

    /// The compiled tables, in mount order.
    pub fn tables(&self) -> &[RouteTable] {
        &self.tables
    }

    /// Forward lookup across all mounted resources, in mount order.
    ///
    /// A `MethodNotAllowed` from an exact path match outranks `NotFound`
    /// from the remaining tables, and its allow set is the union over
    /// every table whose pattern matched the path (overlapping mounts each
    /// contribute the methods they would accept, per RFC 9110 §10.2.1).
    pub fn recognize(&self, method: &Method, path: &str) -> Result<RouteMatch, RouteError> {
        let mut allow: Vec<Method> = Vec::new();
        for table in &self.tables {
            match table.recognize(method, path) {
                Ok(found) => return Ok(found),
                Err(RouteError::MethodNotAllowed { allow: methods }) => {
                    for m in methods {
                        if !allow.contains(&m) {
                            allow.push(m);
                        }
                    }
                }
                Err(RouteError::NotFound) => {}
            }
        }
        if allow.is_empty() {
            Err(RouteError::NotFound)
        } else {
            Err(RouteError::MethodNotAllowed { allow })
        }
    }

    /// Reverse lookup from a symbolic `Resource#action` reference.
    pub fn path_for(&self, reference: &str, args: &RouteArgs) -> Result<String, ReverseError> {
        let Some((name, action)) = reference.split_once('#') else {
            return Err(ReverseError::UnresolvedReference(reference.to_owned()));
        };
        let table = self
            .tables
            .iter()
            .find(|t| t.reverse_name() == name)
            .ok_or_else(|| ReverseError::UnresolvedReference(reference.to_owned()))?;
        table.path_for(action, args)
    }
}

impl fmt::Debug for UrlRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlRouter")
            .field(
                "resources",
                &self
                    .tables
                    .iter()
                    .map(RouteTable::reverse_name)
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection_router() -> UrlRouter {
        let mut router = UrlRouter::new(DefaultStyle);
        router.mount("/users", ResourceDecl::collection("User"));
        router
    }

    // ── forward dispatch, default style ──────────────────────────────────────

    #[test]
    fn index_and_create() {
        let router = collection_router();
        let m = router.recognize(&Method::Get, "/users/").unwrap();
        assert_eq!((m.resource.as_str(), m.action.as_str()), ("User", "index"));
        assert!(m.args.is_empty());

        let m = router.recognize(&Method::Post, "/users/").unwrap();
        assert_eq!(m.action, "create");
    }

    #[test]
    fn member_actions_capture_positional_id() {
        let router = collection_router();
        let m = router.recognize(&Method::Get, "/users/42/").unwrap();
        assert_eq!(m.action, "show");
        assert_eq!(m.args, vec!["42"]);
        assert!(m.params.is_empty());

        let m = router.recognize(&Method::Delete, "/users/42/").unwrap();
        assert_eq!(m.action, "destroy");

        let m = router.recognize(&Method::Get, "/users/42/edit/").unwrap();
        assert_eq!(m.action, "edit");
    }

    #[test]
    fn new_beats_member_for_permissive_ids() {
        let mut router = UrlRouter::new(DefaultStyle);
        router.mount(
            "/posts",
            ResourceDecl::collection("Post").id(IdParam::Positional(IdPattern::Slug)),
        );
        let m = router.recognize(&Method::Get, "/posts/new/").unwrap();
        assert_eq!(m.action, "new");
    }

    #[test]
    fn trailing_slash_normalized_for_matching() {
        let router = collection_router();
        assert_eq!(router.recognize(&Method::Get, "/users").unwrap().action, "index");
        assert_eq!(router.recognize(&Method::Get, "/users/42").unwrap().action, "show");
    }

    #[test]
    fn invalid_id_is_not_found() {
        let router = collection_router();
        assert_eq!(
            router.recognize(&Method::Get, "/users/abc/").unwrap_err(),
            RouteError::NotFound
        );
    }

    #[test]
    fn unknown_path_is_not_found() {
        let router = collection_router();
        assert_eq!(
            router.recognize(&Method::Get, "/posts/").unwrap_err(),
            RouteError::NotFound
        );
    }

    #[test]
    fn member_post_is_method_not_allowed() {
        let router = collection_router();
        match router.recognize(&Method::Post, "/users/42/").unwrap_err() {
            RouteError::MethodNotAllowed { allow } => {
                assert!(allow.contains(&Method::Get));
                assert!(allow.contains(&Method::Delete));
                assert!(!allow.contains(&Method::Post));
            }
            other => panic!("expected MethodNotAllowed, got {other:?}"),
        }
    }

    #[test]
    fn action_subset_drops_routes() {
        let mut router = UrlRouter::new(DefaultStyle);
        router.mount(
            "/users",
            ResourceDecl::collection("User").only(["index", "show"]),
        );
        assert_eq!(router.recognize(&Method::Get, "/users/").unwrap().action, "index");
        // create was filtered out; the collection pattern still matches.
        assert!(matches!(
            router.recognize(&Method::Post, "/users/").unwrap_err(),
            RouteError::MethodNotAllowed { .. }
        ));
        // the new route disappeared entirely
        assert_eq!(
            router.recognize(&Method::Get, "/users/new/").unwrap_err(),
            RouteError::NotFound
        );
    }

    #[test]
    fn named_id_lands_in_params() {
        let mut router = UrlRouter::new(DefaultStyle);
        router.mount(
            "/posts",
            ResourceDecl::collection("Post")
                .id(IdParam::Named("slug".into(), IdPattern::Slug)),
        );
        let m = router.recognize(&Method::Get, "/posts/hello-world/").unwrap();
        assert_eq!(m.action, "show");
        assert!(m.args.is_empty());
        assert_eq!(m.params.get("slug").map(String::as_str), Some("hello-world"));
    }

    #[test]
    fn singleton_routes() {
        let mut router = UrlRouter::new(DefaultStyle);
        router.mount("/account", ResourceDecl::singleton("Account"));

        assert_eq!(router.recognize(&Method::Get, "/account/").unwrap().action, "show");
        assert_eq!(router.recognize(&Method::Put, "/account/").unwrap().action, "update");
        assert_eq!(
            router.recognize(&Method::Delete, "/account/").unwrap().action,
            "destroy"
        );
        assert_eq!(
            router.recognize(&Method::Get, "/account/edit/").unwrap().action,
            "edit"
        );
        // no index, no member segment
        assert_eq!(
            router.recognize(&Method::Get, "/account/1/").unwrap_err(),
            RouteError::NotFound
        );
    }

    // ── reverse lookup ───────────────────────────────────────────────────────

    #[test]
    fn reverse_default_style() {
        let router = collection_router();
        assert_eq!(router.path_for("User#index", &RouteArgs::none()).unwrap(), "/users/");
        assert_eq!(router.path_for("User#new", &RouteArgs::none()).unwrap(), "/users/new/");
        assert_eq!(
            router.path_for("User#show", &RouteArgs::id("1")).unwrap(),
            "/users/1/"
        );
        assert_eq!(
            router.path_for("User#edit", &RouteArgs::id("1")).unwrap(),
            "/users/1/edit/"
        );
    }

    #[test]
    fn reverse_singleton_collapses_to_root() {
        let mut router = UrlRouter::new(DefaultStyle);
        router.mount("/account", ResourceDecl::singleton("Account"));
        for action in ["show", "update", "destroy", "create"] {
            let reference = format!("Account#{action}");
            assert_eq!(
                router.path_for(&reference, &RouteArgs::none()).unwrap(),
                "/account/"
            );
        }
        assert_eq!(
            router.path_for("Account#edit", &RouteArgs::none()).unwrap(),
            "/account/edit/"
        );
    }

    #[test]
    fn reverse_unknown_reference() {
        let router = collection_router();
        assert!(matches!(
            router.path_for("Post#index", &RouteArgs::none()),
            Err(ReverseError::UnresolvedReference(_))
        ));
        assert!(matches!(
            router.path_for("User#vanish", &RouteArgs::none()),
            Err(ReverseError::UnresolvedReference(_))
        ));
        assert!(matches!(
            router.path_for("garbage", &RouteArgs::none()),
            Err(ReverseError::UnresolvedReference(_))
        ));
    }

    #[test]
    fn reverse_arity_mismatch() {
        let router = collection_router();
        assert!(matches!(
            router.path_for("User#show", &RouteArgs::none()),
            Err(ReverseError::ArityMismatch { .. })
        ));
        assert!(matches!(
            router.path_for("User#index", &RouteArgs::id("1")),
            Err(ReverseError::ArityMismatch { .. })
        ));
        assert!(matches!(
            router.path_for(
                "User#show",
                &RouteArgs::Positional(vec!["1".into(), "2".into()])
            ),
            Err(ReverseError::ArityMismatch { .. })
        ));
    }

    #[test]
    fn reverse_rejects_invalid_identifier() {
        let router = collection_router();
        assert!(matches!(
            router.path_for("User#show", &RouteArgs::id("not-a-number")),
            Err(ReverseError::IdentifierMismatch { .. })
        ));
    }

    #[test]
    fn reverse_named_id() {
        let mut router = UrlRouter::new(DefaultStyle);
        router.mount(
            "/posts",
            ResourceDecl::collection("Post")
                .id(IdParam::Named("slug".into(), IdPattern::Slug)),
        );
        assert_eq!(
            router
                .path_for("Post#show", &RouteArgs::named([("slug", "hello")]))
                .unwrap(),
            "/posts/hello/"
        );
        // wrong key
        assert!(matches!(
            router.path_for("Post#show", &RouteArgs::named([("id", "hello")])),
            Err(ReverseError::ArityMismatch { .. })
        ));
    }

    #[test]
    fn reverse_name_override() {
        let mut router = UrlRouter::new(DefaultStyle);
        router.mount(
            "/admin/users",
            ResourceDecl::collection("User").reverse_name("AdminUser"),
        );
        assert_eq!(
            router.path_for("AdminUser#index", &RouteArgs::none()).unwrap(),
            "/admin/users/"
        );
        assert!(matches!(
            router.path_for("User#index", &RouteArgs::none()),
            Err(ReverseError::UnresolvedReference(_))
        ));
    }

    // ── round-trips ──────────────────────────────────────────────────────────

    #[test]
    fn forward_reverse_round_trip() {
        let router = collection_router();
        for path in ["/users/", "/users/new/", "/users/7/", "/users/7/edit/"] {
            let m = router.recognize(&Method::Get, path).unwrap();
            let args = if m.args.is_empty() {
                RouteArgs::none()
            } else {
                RouteArgs::Positional(m.args.clone())
            };
            let rebuilt = router
                .path_for(&format!("{}#{}", m.resource, m.action), &args)
                .unwrap();
            assert_eq!(rebuilt, path);
        }
    }

    #[test]
    fn identifier_styles_do_not_cross_contaminate() {
        let mut router = UrlRouter::new(DefaultStyle);
        router.mount("/users", ResourceDecl::collection("User"));
        router.mount(
            "/posts",
            ResourceDecl::collection("Post")
                .id(IdParam::Named("slug".into(), IdPattern::Slug)),
        );

        let users = router.recognize(&Method::Get, "/users/3/").unwrap();
        assert_eq!(users.args, vec!["3"]);
        assert!(users.params.is_empty());

        let posts = router.recognize(&Method::Get, "/posts/intro/").unwrap();
        assert!(posts.args.is_empty());
        assert_eq!(posts.params.get("slug").map(String::as_str), Some("intro"));
    }

    #[test]
    fn predicate_pattern() {
        let even = IdPattern::Predicate(Arc::new(|v: &str| {
            v.parse::<u64>().map(|n| n % 2 == 0).unwrap_or(false)
        }));
        let mut router = UrlRouter::new(DefaultStyle);
        router.mount(
            "/evens",
            ResourceDecl::collection("Even").id(IdParam::Positional(even)),
        );
        assert!(router.recognize(&Method::Get, "/evens/4/").is_ok());
        assert_eq!(
            router.recognize(&Method::Get, "/evens/3/").unwrap_err(),
            RouteError::NotFound
        );
    }

    #[test]
    fn allow_set_merged_across_overlapping_mounts() {
        let mut router = UrlRouter::new(DefaultStyle);
        router.mount("/things", ResourceDecl::collection("Readable").only(["index"]));
        router.mount("/things", ResourceDecl::collection("Writable").only(["create"]));

        match router.recognize(&Method::Delete, "/things/").unwrap_err() {
            RouteError::MethodNotAllowed { allow } => {
                assert!(allow.contains(&Method::Get));
                assert!(allow.contains(&Method::Post));
            }
            other => panic!("expected MethodNotAllowed, got {other:?}"),
        }
    }

    #[test]
    fn mount_order_first_match_wins() {
        let mut router = UrlRouter::new(DefaultStyle);
        router.mount("/things", ResourceDecl::collection("First"));
        router.mount("/things", ResourceDecl::collection("Second"));
        let m = router.recognize(&Method::Get, "/things/").unwrap();
        assert_eq!(m.resource, "First");
    }
}
