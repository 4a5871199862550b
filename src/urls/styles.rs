//! URL styles — the pluggable policy for what a resource's paths look like.
//!
//! A style is a pure mapping from [`RouteSlot`] to [`RoutePattern`], plus a
//! hook to coerce the identifier declaration (Rails-style URLs require
//! named identifiers). The structural method → action maps live on the
//! slots themselves and are identical across styles.

use super::{IdParam, RoutePattern, RouteSlot, Segment};

/// Path-shape policy for one router.
pub trait UrlStyle: Send + Sync {
    /// The path pattern for a route slot, relative to the mount prefix.
    fn pattern(&self, slot: RouteSlot) -> RoutePattern;

    /// Adjusts the declared identifier before compilation. The default
    /// keeps it as declared.
    fn coerce_id(&self, id: IdParam) -> IdParam {
        id
    }
}

/// Django-flavored URLs: every path ends with a trailing slash.
///
/// ```text
/// /users/          index, create
/// /users/new/      new
/// /users/1/        show, update, destroy
/// /users/1/edit/   edit
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStyle;

impl UrlStyle for DefaultStyle {
    fn pattern(&self, slot: RouteSlot) -> RoutePattern {
        RoutePattern {
            segments: slot_segments(slot),
            trailing_slash: true,
            format_ext: false,
        }
    }
}

/// AtomPub-flavored URLs: collection roots keep the trailing slash, leaf
/// paths (members, forms) drop it.
///
/// ```text
/// /users/          index, create
/// /users/new       new
/// /users/1         show, update, destroy
/// /users/1/edit    edit
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AtomPubStyle;

impl UrlStyle for AtomPubStyle {
    fn pattern(&self, slot: RouteSlot) -> RoutePattern {
        let segments = slot_segments(slot);
        RoutePattern {
            trailing_slash: segments.is_empty(),
            segments,
            format_ext: false,
        }
    }
}

/// Rails-flavored URLs: no trailing slashes, dotted format extensions on
/// data-bearing paths, and identifiers forced into a named `id` parameter.
///
/// ```text
/// /users           index, create      (/users.json)
/// /users/new       new
/// /users/1         show, update, destroy   (/users/1.json)
/// /users/1/edit    edit
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RailsStyle;

impl UrlStyle for RailsStyle {
    fn pattern(&self, slot: RouteSlot) -> RoutePattern {
        RoutePattern {
            segments: slot_segments(slot),
            trailing_slash: false,
            format_ext: matches!(
                slot,
                RouteSlot::Collection | RouteSlot::Member | RouteSlot::Singleton
            ),
        }
    }

    // Rails surfaces the identifier as params[:id].
    fn coerce_id(&self, id: IdParam) -> IdParam {
        match id {
            IdParam::Positional(pattern) => IdParam::Named("id".to_owned(), pattern),
            named @ IdParam::Named(..) => named,
        }
    }
}

fn slot_segments(slot: RouteSlot) -> Vec<Segment> {
    match slot {
        RouteSlot::Collection | RouteSlot::Singleton => vec![],
        RouteSlot::New => vec![Segment::Literal("new".to_owned())],
        RouteSlot::Member => vec![Segment::Id],
        RouteSlot::Edit => vec![Segment::Id, Segment::Literal("edit".to_owned())],
        RouteSlot::SingletonEdit => vec![Segment::Literal("edit".to_owned())],
    }
}
