//! Bidirectional mapping between MIME shortcodes and full media types.
//!
//! Renderer backends are registered under short format tokens (`json`,
//! `html`, ...) for ergonomics; negotiation works in full MIME types. The
//! [`MimeRegistry`] translates both ways.
//!
//! The registry is meant to be populated during the single-threaded startup
//! phase, then shared immutably (typically behind an `Arc`) into the
//! negotiator and dispatcher. There is deliberately no process-wide global:
//! every consumer receives its registry explicitly, which keeps tests and
//! embedding applications decoupled.

/// Ordered `(shortcode, mime)` registry with exact-key lookup both ways.
///
/// Insertion order is preserved for enumeration. Registering a shortcode
/// twice overwrites the earlier mapping in place (last write wins);
/// [`register_if_absent`] keeps the earlier one.
///
/// [`register_if_absent`]: MimeRegistry::register_if_absent
///
/// # Examples
///
/// ```
/// use restroute::mime::MimeRegistry;
///
/// let mut registry = MimeRegistry::with_defaults();
/// registry.register("png", "image/png");
///
/// assert_eq!(registry.resolve("json"), Some("application/json"));
/// assert_eq!(registry.shortcode_for("image/png"), Some("png"));
/// assert_eq!(registry.resolve("nope"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MimeRegistry {
    entries: Vec<(String, String)>,
}

/// Shortcodes registered by [`MimeRegistry::with_defaults`].
///
/// Dotted file extensions map to underscored shortcodes (`tar.bz2` would
/// register as `tar_bz2`), matching how the Rails-style dotted URL suffix
/// is translated before lookup.
const DEFAULT_TYPES: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("xhtml", "application/xhtml+xml"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("rss", "application/rss+xml"),
    ("atom", "application/atom+xml"),
    ("rdf_xml", "application/rdf+xml"),
    ("txt", "text/plain"),
    ("csv", "text/csv"),
    ("js", "text/javascript"),
    ("svg", "image/svg+xml"),
    ("png", "image/png"),
];

impl MimeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the standard web types
    /// (html, json, xml, rss, atom, plain text, ...).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for &(shortcode, mime) in DEFAULT_TYPES {
            registry.register(shortcode, mime);
        }
        registry
    }

    /// Maps `shortcode` to `mime`, overwriting any existing mapping in place.
    pub fn register(&mut self, shortcode: impl Into<String>, mime: impl Into<String>) {
        let shortcode = shortcode.into();
        let mime = mime.into();
        match self.entries.iter_mut().find(|(sc, _)| *sc == shortcode) {
            Some(entry) => entry.1 = mime,
            None => self.entries.push((shortcode, mime)),
        }
    }

    /// Maps `shortcode` to `mime` only when the shortcode is not yet taken.
    ///
    /// Returns `true` if the mapping was added.
    pub fn register_if_absent(
        &mut self,
        shortcode: impl Into<String>,
        mime: impl Into<String>,
    ) -> bool {
        let shortcode = shortcode.into();
        if self.entries.iter().any(|(sc, _)| *sc == shortcode) {
            return false;
        }
        self.entries.push((shortcode, mime.into()));
        true
    }

    /// Returns the full MIME type for a shortcode.
    pub fn resolve(&self, shortcode: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(sc, _)| sc == shortcode)
            .map(|(_, mime)| mime.as_str())
    }

    /// Returns the first shortcode registered for a MIME type.
    pub fn shortcode_for(&self, mime: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, m)| m == mime)
            .map(|(sc, _)| sc.as_str())
    }

    /// Iterates over `(shortcode, mime)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(sc, m)| (sc.as_str(), m.as_str()))
    }

    /// Returns the number of registered shortcodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
