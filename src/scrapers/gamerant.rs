//! GameRant gaming-feed scraper.
//!
//! The listing page renders each teaser as a `div.display-card.article`
//! card. Markup varies between card styles (featured cards use different
//! heading levels, lazy-loaded images hide the real URL in `data-src`), so
//! every field is extracted through an ordered chain of selectors: the first
//! selector that yields a non-empty result wins, and absence degrades to a
//! default instead of failing the card.

use crate::cli::{MAX_ATTEMPTS, MAX_CANDIDATES, RETRY_DELAY, SUMMARY_MAX_CHARS, USER_AGENT};
use crate::models::Candidate;
use crate::utils::truncate_summary;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Shown in captions when a card has no synopsis at all.
const SUMMARY_PLACEHOLDER: &str = "No summary available";

const TITLE_SELECTORS: &[&str] = &["h5", "h3", "[class*='title']"];
const DATE_SELECTORS: &[&str] = &["span.published", "time", ".date"];
const SUMMARY_SELECTORS: &[&str] = &["p.synopsis", "p", "[class*='excerpt']"];

/// Download the listing page, retrying transient failures.
///
/// Up to 3 attempts with a fixed 2 second pause; the final error is returned
/// to the caller, which aborts the whole run (there is nothing to do without
/// a listing).
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_listing(client: &Client, url: &str) -> Result<String, Box<dyn Error>> {
    let mut last_error: Option<Box<dyn Error>> = None;

    for attempt in 1..=MAX_ATTEMPTS {
        match request_listing(client, url).await {
            Ok(html) => {
                info!(attempt, bytes = html.len(), "Fetched listing page");
                return Ok(html);
            }
            Err(e) => {
                warn!(attempt, max = MAX_ATTEMPTS, error = %e, "Listing fetch attempt failed");
                last_error = Some(e);
            }
        }

        if attempt < MAX_ATTEMPTS {
            sleep(RETRY_DELAY).await;
        }
    }

    Err(last_error.expect("at least one attempt ran"))
}

async fn request_listing(client: &Client, url: &str) -> Result<String, Box<dyn Error>> {
    let body = client
        .get(url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(body)
}

/// Extract up to 20 teaser candidates from the listing HTML.
///
/// Cards without a title are dropped here; every other missing field gets a
/// default. Image URLs are resolved against `base` because the cards mix
/// absolute CDN URLs with relative paths.
pub fn extract_candidates(html: &str, base: &Url) -> Vec<Candidate> {
    let document = Html::parse_document(html);
    let card_selector = Selector::parse("div.display-card.article").unwrap();

    let mut candidates = Vec::new();
    for card in document.select(&card_selector).take(MAX_CANDIDATES) {
        let Some(title) = first_text(card, TITLE_SELECTORS) else {
            debug!("Card without title; skipping");
            continue;
        };

        let date = first_text(card, DATE_SELECTORS);
        let summary = first_text(card, SUMMARY_SELECTORS)
            .map(|s| truncate_summary(&s, SUMMARY_MAX_CHARS))
            .unwrap_or_else(|| SUMMARY_PLACEHOLDER.to_string());
        let image_url = image_source(card)
            .and_then(|src| base.join(&src).ok())
            .map(|u| u.to_string());

        candidates.push(Candidate {
            title,
            date,
            summary,
            image_url,
        });
    }

    info!(count = candidates.len(), "Extracted listing candidates");
    candidates
}

/// Try each selector in order; the first one whose match has non-empty text
/// wins.
fn first_text(card: ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    for raw in selectors {
        let selector = Selector::parse(raw).unwrap();
        if let Some(element) = card.select(&selector).next() {
            let text = element.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// The teaser image URL, preferring the lazy-load `data-src` attribute over
/// the placeholder `src`.
fn image_source(card: ElementRef<'_>) -> Option<String> {
    for (selector, attr) in [("img[data-src]", "data-src"), ("img[src]", "src")] {
        let img_selector = Selector::parse(selector).unwrap();
        if let Some(img) = card.select(&img_selector).next() {
            if let Some(value) = img.value().attr(attr) {
                return Some(value.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://gamerant.com/gaming/").unwrap()
    }

    fn listing(cards: &str) -> String {
        format!("<html><body><main>{cards}</main></body></html>")
    }

    const FULL_CARD: &str = r#"
        <div class="display-card article">
          <h5>Starfield Gets Survival Mode</h5>
          <span class="published">Jun 23, 2025</span>
          <p class="synopsis">Bethesda ships the long-requested mode.</p>
          <img data-src="https://static.gamerant.com/starfield.jpg" src="data:image/gif;base64,stub">
        </div>"#;

    #[test]
    fn test_extracts_all_fields() {
        let html = listing(FULL_CARD);
        let candidates = extract_candidates(&html, &base());

        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.title, "Starfield Gets Survival Mode");
        assert_eq!(c.date.as_deref(), Some("Jun 23, 2025"));
        assert_eq!(c.summary, "Bethesda ships the long-requested mode.");
        assert_eq!(
            c.image_url.as_deref(),
            Some("https://static.gamerant.com/starfield.jpg")
        );
    }

    #[test]
    fn test_title_falls_back_to_h3_then_class() {
        let html = listing(
            r#"
            <div class="display-card article"><h3>From H3</h3></div>
            <div class="display-card article"><span class="card-title">From Class</span></div>"#,
        );
        let candidates = extract_candidates(&html, &base());

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].title, "From H3");
        assert_eq!(candidates[1].title, "From Class");
    }

    #[test]
    fn test_card_without_title_is_skipped() {
        let html = listing(
            r#"
            <div class="display-card article"><p class="synopsis">No headline here.</p></div>
            <div class="display-card article"><h5>Kept</h5></div>"#,
        );
        let candidates = extract_candidates(&html, &base());

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Kept");
    }

    #[test]
    fn test_empty_title_text_is_skipped() {
        let html = listing(r#"<div class="display-card article"><h5>   </h5></div>"#);
        assert!(extract_candidates(&html, &base()).is_empty());
    }

    #[test]
    fn test_date_falls_back_to_time_element() {
        let html = listing(
            r#"<div class="display-card article"><h5>T</h5><time>Jun 24, 2025</time></div>"#,
        );
        let candidates = extract_candidates(&html, &base());
        assert_eq!(candidates[0].date.as_deref(), Some("Jun 24, 2025"));
    }

    #[test]
    fn test_missing_date_is_none() {
        let html = listing(r#"<div class="display-card article"><h5>T</h5></div>"#);
        let candidates = extract_candidates(&html, &base());
        assert!(candidates[0].date.is_none());
    }

    #[test]
    fn test_missing_summary_uses_placeholder() {
        let html = listing(r#"<div class="display-card article"><h5>T</h5></div>"#);
        let candidates = extract_candidates(&html, &base());
        assert_eq!(candidates[0].summary, "No summary available");
    }

    #[test]
    fn test_long_summary_is_truncated() {
        let long = "x".repeat(200);
        let html = listing(&format!(
            r#"<div class="display-card article"><h5>T</h5><p class="synopsis">{long}</p></div>"#
        ));
        let candidates = extract_candidates(&html, &base());

        assert_eq!(candidates[0].summary.chars().count(), 153);
        assert!(candidates[0].summary.ends_with("..."));
    }

    #[test]
    fn test_data_src_preferred_over_src() {
        let html = listing(
            r#"
            <div class="display-card article">
              <h5>T</h5>
              <img data-src="/lazy.jpg" src="/placeholder.gif">
            </div>"#,
        );
        let candidates = extract_candidates(&html, &base());
        assert_eq!(
            candidates[0].image_url.as_deref(),
            Some("https://gamerant.com/lazy.jpg")
        );
    }

    #[test]
    fn test_relative_image_resolved_against_base() {
        let html = listing(
            r#"<div class="display-card article"><h5>T</h5><img src="img/cover.png"></div>"#,
        );
        let candidates = extract_candidates(&html, &base());
        assert_eq!(
            candidates[0].image_url.as_deref(),
            Some("https://gamerant.com/gaming/img/cover.png")
        );
    }

    #[test]
    fn test_missing_image_is_none() {
        let html = listing(r#"<div class="display-card article"><h5>T</h5></div>"#);
        let candidates = extract_candidates(&html, &base());
        assert!(candidates[0].image_url.is_none());
    }

    #[test]
    fn test_candidate_cap() {
        let cards: String = (0..25)
            .map(|i| format!(r#"<div class="display-card article"><h5>Article {i}</h5></div>"#))
            .collect();
        let candidates = extract_candidates(&listing(&cards), &base());

        assert_eq!(candidates.len(), 20);
        assert_eq!(candidates[0].title, "Article 0");
        assert_eq!(candidates[19].title, "Article 19");
    }

    #[test]
    fn test_no_cards_yields_empty() {
        let html = listing(r#"<div class="other-card"><h5>Not an article</h5></div>"#);
        assert!(extract_candidates(&html, &base()).is_empty());
    }
}
