//! `Accept` header parsing and media-type ranking.
//!
//! Implements the client side of content negotiation: turning a raw
//! quality-weighted `Accept` header into an ordered preference list, and
//! resolving that preference against the MIME types a renderer table can
//! actually produce.
//!
//! Malformed header entries degrade locally: an entry with a broken quality
//! value is excluded from the ranking (quality 0), an entry that is not a
//! media range at all is discarded, and parsing always continues. An absent
//! or empty header means "accept anything".

use std::cmp::Ordering;

/// A single parsed media range from an `Accept` header, e.g.
/// `text/*;q=0.7`.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    kind: String,
    subtype: String,
    quality: f32,
    /// Index of this entry in the raw header, for stable tie-breaking.
    position: usize,
}

impl MediaRange {
    /// Parse one comma-separated `Accept` entry.
    ///
    /// Returns `None` when the entry is not a media range (no `/`). A
    /// malformed `q` parameter yields quality `0.0` rather than a parse
    /// failure, which excludes the entry from ranking without aborting the
    /// rest of the header.
    fn parse(entry: &str, position: usize) -> Option<Self> {
        let mut parts = entry.split(';');
        let range = parts.next()?.trim();
        let (kind, subtype) = range.split_once('/')?;
        if kind.is_empty() || subtype.is_empty() {
            return None;
        }

        let mut quality = 1.0_f32;
        for param in parts {
            let Some((name, value)) = param.split_once('=') else {
                continue;
            };
            if name.trim().eq_ignore_ascii_case("q") {
                quality = value.trim().parse().unwrap_or(0.0);
                quality = quality.clamp(0.0, 1.0);
            }
        }

        Some(Self {
            kind: kind.trim().to_ascii_lowercase(),
            subtype: subtype.trim().to_ascii_lowercase(),
            quality,
            position,
        })
    }

    /// Exact type/subtype (2) beats wildcard subtype (1) beats full
    /// wildcard (0).
    fn specificity(&self) -> u8 {
        match (self.kind.as_str(), self.subtype.as_str()) {
            ("*", _) => 0,
            (_, "*") => 1,
            _ => 2,
        }
    }

    /// Returns `true` if this range matches the given concrete MIME type.
    fn matches(&self, mime: &str) -> bool {
        let mime = mime.split(';').next().unwrap_or(mime).trim();
        let Some((kind, subtype)) = mime.split_once('/') else {
            return false;
        };
        (self.kind == "*" || self.kind.eq_ignore_ascii_case(kind))
            && (self.subtype == "*" || self.subtype.eq_ignore_ascii_case(subtype))
    }

    /// The quality weight of this range, in `[0, 1]`.
    pub fn quality(&self) -> f32 {
        self.quality
    }
}

/// Parse a full `Accept` header into media ranges ordered by descending
/// quality, ties broken by specificity and then by input order.
///
/// # Examples
///
/// ```
/// use restroute::conneg::parse_accept;
///
/// let ranges = parse_accept("application/json;q=0.5, text/html;q=0.9");
/// assert_eq!(ranges[0].quality(), 0.9);
/// ```
pub fn parse_accept(header: &str) -> Vec<MediaRange> {
    let mut ranges: Vec<MediaRange> = header
        .split(',')
        .enumerate()
        .filter_map(|(i, entry)| MediaRange::parse(entry, i))
        .collect();

    ranges.sort_by(|a, b| {
        b.quality
            .partial_cmp(&a.quality)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.specificity().cmp(&a.specificity()))
            .then_with(|| a.position.cmp(&b.position))
    });
    ranges
}

/// Rank the `available` MIME types against an `Accept` header.
///
/// Each available type is scored by its most specific matching range (so
/// `*/*;q=1, text/html;q=0` excludes `text/html` instead of sneaking it in
/// through the wildcard). Types with no match, or a zero-quality match, are
/// dropped. The survivors come back ordered by descending quality; ties go
/// to the type matched by the higher-ranked header entry, then to the
/// earlier position in `available` (i.e. renderer registration order).
///
/// An absent or empty header accepts anything: every available type is
/// returned in registration order.
///
/// # Examples
///
/// ```
/// use restroute::conneg::rank;
///
/// let available = ["application/json", "text/html"];
/// let ranked = rank(Some("application/json;q=0.5, text/html;q=0.9"), &available);
/// assert_eq!(ranked, vec!["text/html", "application/json"]);
///
/// assert_eq!(rank(None, &available), vec!["application/json", "text/html"]);
/// ```
pub fn rank<'a>(header: Option<&str>, available: &[&'a str]) -> Vec<&'a str> {
    let header = match header.map(str::trim) {
        Some(h) if !h.is_empty() => h,
        _ => return available.to_vec(),
    };
    let ranges = parse_accept(header);

    // (mime, quality, index of the determining range, registration index)
    let mut scored: Vec<(&'a str, f32, usize, usize)> = Vec::new();
    for (table_idx, &mime) in available.iter().enumerate() {
        let best = ranges
            .iter()
            .enumerate()
            .filter(|(_, range)| range.matches(mime))
            .max_by(|(ai, a), (bi, b)| {
                a.specificity()
                    .cmp(&b.specificity())
                    .then_with(|| bi.cmp(ai)) // earlier-ranked range wins ties
            });
        if let Some((range_idx, range)) = best {
            if range.quality > 0.0 {
                scored.push((mime, range.quality, range_idx, table_idx));
            }
        }
    }

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.2.cmp(&b.2))
            .then_with(|| a.3.cmp(&b.3))
    });
    scored.into_iter().map(|(mime, ..)| mime).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── parse_accept ─────────────────────────────────────────────────────────

    #[test]
    fn parse_orders_by_quality() {
        let ranges = parse_accept("text/plain;q=0.3, text/html");
        assert_eq!(ranges[0].quality(), 1.0);
        assert_eq!(ranges[1].quality(), 0.3);
    }

    #[test]
    fn parse_specificity_breaks_quality_ties() {
        let ranges = parse_accept("text/*, text/html");
        // Both q=1; the exact type sorts first.
        assert_eq!(ranges[0].specificity(), 2);
        assert_eq!(ranges[1].specificity(), 1);
    }

    #[test]
    fn parse_stable_for_equal_entries() {
        let ranges = parse_accept("application/json, application/xml");
        assert!(ranges[0].matches("application/json"));
        assert!(ranges[1].matches("application/xml"));
    }

    #[test]
    fn malformed_quality_zeroes_entry() {
        let ranges = parse_accept("text/html;q=abc, application/json");
        // The broken entry parses with quality 0 and sorts last.
        assert_eq!(ranges[0].quality(), 1.0);
        assert_eq!(ranges[1].quality(), 0.0);
    }

    #[test]
    fn quality_clamped_to_unit_interval() {
        let ranges = parse_accept("text/html;q=7");
        assert_eq!(ranges[0].quality(), 1.0);
    }

    #[test]
    fn non_media_range_entries_discarded() {
        let ranges = parse_accept("garbage, text/html");
        assert_eq!(ranges.len(), 1);
        assert!(ranges[0].matches("text/html"));
    }

    // ── rank ─────────────────────────────────────────────────────────────────

    #[test]
    fn rank_respects_quality_order() {
        let ranked = rank(
            Some("application/json;q=0.5, text/html;q=0.9"),
            &["application/json", "text/html"],
        );
        assert_eq!(ranked, vec!["text/html", "application/json"]);
    }

    #[test]
    fn rank_absent_header_accepts_everything() {
        let available = ["application/rdf+xml", "text/html"];
        assert_eq!(rank(None, &available), available.to_vec());
        assert_eq!(rank(Some("  "), &available), available.to_vec());
    }

    #[test]
    fn rank_drops_unmatched_types() {
        let ranked = rank(Some("image/png"), &["text/html", "application/json"]);
        assert!(ranked.is_empty());
    }

    #[test]
    fn rank_wildcard_subtype() {
        let ranked = rank(Some("application/*"), &["text/html", "application/json"]);
        assert_eq!(ranked, vec!["application/json"]);
    }

    #[test]
    fn rank_full_wildcard_follows_registration_order() {
        let ranked = rank(Some("*/*"), &["text/html", "application/json"]);
        assert_eq!(ranked, vec!["text/html", "application/json"]);
    }

    #[test]
    fn rank_specific_exclusion_beats_wildcard() {
        // text/html is explicitly refused; the wildcard must not resurrect it.
        let ranked = rank(Some("*/*;q=1, text/html;q=0"), &["text/html", "application/json"]);
        assert_eq!(ranked, vec!["application/json"]);
    }

    #[test]
    fn rank_skip_fallback_ordering() {
        // The scenario behind renderer Skip fallback: both types ranked,
        // rdf+xml first on quality.
        let ranked = rank(
            Some("application/rdf+xml, text/html;q=0.5"),
            &["application/rdf+xml", "text/html"],
        );
        assert_eq!(ranked, vec!["application/rdf+xml", "text/html"]);
    }

    #[test]
    fn rank_matches_parameterized_available_type() {
        let ranked = rank(Some("text/html"), &["text/html; charset=utf-8"]);
        assert_eq!(ranked, vec!["text/html; charset=utf-8"]);
    }
}
