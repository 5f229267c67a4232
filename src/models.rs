//! Data models for article teasers scraped from the listing page.
//!
//! A [`Candidate`] is the transient, per-run representation of one teaser
//! card. It is built while walking the parsed listing markup and dropped at
//! the end of the run; only its title outlives the run, inside the persisted
//! title store.

/// A parsed article teaser, prior to filtering.
///
/// The title doubles as the deduplication key: two runs never post the same
/// title twice, because posted titles are persisted across runs.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The teaser headline. Extraction skips cards without one, so this is
    /// always non-empty.
    pub title: String,
    /// The publication date exactly as printed on the card
    /// (e.g. `"Jun 23, 2025"`), when the card carries one.
    pub date: Option<String>,
    /// The teaser summary, already truncated for the caption. Cards without
    /// one get a fixed placeholder.
    pub summary: String,
    /// Absolute URL of the teaser image, when the card carries one.
    pub image_url: Option<String>,
}
