//! Listing-page scrapers.
//!
//! One module per source. Each scraper exposes:
//! - `fetch_listing()`: download the listing HTML with bounded retry
//! - `extract_candidates()`: pure extraction of teaser [`Candidate`]s from
//!   the HTML, with per-field fallback selector chains
//!
//! Only GameRant is scraped today; the split keeps a second source from
//! touching the pipeline.
//!
//! [`Candidate`]: crate::models::Candidate

pub mod gamerant;
