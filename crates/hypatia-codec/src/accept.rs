//! `Accept` header parsing.
//!
//! Splits an `Accept` header into media ranges with their quality values and
//! orders them by client preference: descending quality, header position as
//! the tie-break. Ranges with `q=0` are explicitly unacceptable and dropped.

use mime::Mime;

/// One acceptable media range from an `Accept` header.
#[derive(Debug, Clone)]
pub(crate) struct AcceptEntry {
    /// The media range, possibly with a wildcard type or subtype.
    pub range: Mime,
    /// The quality value, 0.0–1.0, defaulting to 1.0.
    pub quality: f32,
    /// Zero-based position in the header, for stable tie-breaking.
    pub position: usize,
}

/// Parses an `Accept` header into preference-ordered entries.
///
/// Malformed ranges are skipped rather than failing the whole header; an
/// empty result means nothing parseable was acceptable.
pub(crate) fn parse_accept(header: &str) -> Vec<AcceptEntry> {
    let mut entries: Vec<AcceptEntry> = header
        .split(',')
        .map(str::trim)
        .filter(|range| !range.is_empty())
        .enumerate()
        .filter_map(|(position, range)| {
            let mime: Mime = range.parse().ok()?;
            let quality = mime
                .get_param("q")
                .and_then(|q| q.as_str().parse::<f32>().ok())
                .unwrap_or(1.0)
                .clamp(0.0, 1.0);
            Some(AcceptEntry {
                range: mime,
                quality,
                position,
            })
        })
        .filter(|entry| entry.quality > 0.0)
        .collect();

    entries.sort_by(|a, b| {
        b.quality
            .partial_cmp(&a.quality)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.position.cmp(&b.position))
    });
    entries
}

/// Returns `true` when `range` (which may carry wildcards) covers the
/// concrete-or-wildcard `media` pattern in either direction of specificity.
pub(crate) fn range_matches(range: &Mime, media: &Mime) -> bool {
    let type_ok = range.type_() == mime::STAR
        || media.type_() == mime::STAR
        || range.type_() == media.type_();
    let subtype_ok = range.subtype() == mime::STAR
        || media.subtype() == mime::STAR
        || range.subtype() == media.subtype();
    type_ok && subtype_ok
}
