//! The run loop: fetch listing, filter candidates, post survivors, persist.
//!
//! One invocation is one pass over the listing. Articles are processed
//! strictly one at a time (image fetch, composite, send) with no shared
//! state beyond the in-memory title store, which is written back to disk
//! exactly once at the end of the pass.

use crate::banner;
use crate::caption::build_caption;
use crate::cli::{IMAGE_TIMEOUT, POST_WITHOUT_IMAGE};
use crate::models::Candidate;
use crate::scrapers::gamerant;
use crate::store::PostedTitles;
use crate::telegram::{ChannelApi, deliver};
use crate::utils::is_today;
use reqwest::Client;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Why a candidate was filtered out before posting.
#[derive(Debug, PartialEq, Eq)]
enum SkipReason {
    EmptyTitle,
    Duplicate,
    NotToday,
}

/// First matching skip rule, in fixed order: no title, already posted,
/// dated but not today. A candidate without any date is kept.
fn skip_reason(candidate: &Candidate, posted: &PostedTitles) -> Option<SkipReason> {
    if candidate.title.is_empty() {
        return Some(SkipReason::EmptyTitle);
    }
    if posted.contains(&candidate.title) {
        return Some(SkipReason::Duplicate);
    }
    if let Some(date) = &candidate.date {
        if !is_today(date) {
            return Some(SkipReason::NotToday);
        }
    }
    None
}

/// One scrape-and-post pass over the listing.
///
/// Owns its collaborators: the HTTP client shared by every fetch and the
/// channel poster, injected so tests can substitute a fake.
pub struct Pipeline<A: ChannelApi> {
    client: Client,
    api: A,
    listing_url: String,
    banner_url: String,
    posted_file: String,
}

impl<A: ChannelApi> Pipeline<A> {
    pub fn new(
        client: Client,
        api: A,
        listing_url: String,
        banner_url: String,
        posted_file: String,
    ) -> Self {
        Self {
            client,
            api,
            listing_url,
            banner_url,
            posted_file,
        }
    }

    /// Run the full pass.
    ///
    /// A listing that cannot be fetched after retries aborts the run with an
    /// error log and a normal return; per-article failures never do.
    #[instrument(level = "info", skip_all)]
    pub async fn run(&self) -> Result<(), Box<dyn Error>> {
        let mut posted = PostedTitles::load(&self.posted_file);
        if posted.is_empty() {
            debug!("No previously posted titles; treating every candidate as new");
        }

        let html = match gamerant::fetch_listing(&self.client, &self.listing_url).await {
            Ok(html) => html,
            Err(e) => {
                error!(error = %e, "Failed to fetch listing after retries; aborting run");
                return Ok(());
            }
        };

        let base = Url::parse(&self.listing_url)?;
        let candidates = gamerant::extract_candidates(&html, &base);
        if candidates.is_empty() {
            warn!("No articles found in listing");
            return Ok(());
        }

        for candidate in &candidates {
            match skip_reason(candidate, &posted) {
                Some(SkipReason::EmptyTitle) => {
                    debug!("Skipping card without title");
                    continue;
                }
                Some(SkipReason::Duplicate) => {
                    debug!(title = %candidate.title, "Skipping already-posted article");
                    continue;
                }
                Some(SkipReason::NotToday) => {
                    info!(title = %candidate.title, date = ?candidate.date, "Skipping article (not today)");
                    continue;
                }
                None => {}
            }

            self.post_candidate(candidate).await;

            // Even a failed post marks the title as seen, so it is never
            // retried on a later run.
            posted.insert(candidate.title.clone());
        }

        info!(known_titles = posted.len(), "Finished candidate loop");
        posted.save()?;
        Ok(())
    }

    /// Fetch the article image, stamp the banner, and send.
    async fn post_candidate(&self, candidate: &Candidate) {
        let caption = build_caption(candidate);
        debug!(title = %candidate.title, caption = %caption, "Formatted message");

        let image_bytes = match &candidate.image_url {
            Some(url) => self.fetch_article_image(&candidate.title, url).await,
            None => None,
        };
        let photo = match image_bytes {
            Some(bytes) => {
                banner::stamped_photo(&self.client, &self.banner_url, &candidate.title, &bytes)
                    .await
            }
            None => None,
        };

        deliver(
            &self.api,
            &candidate.title,
            &caption,
            photo,
            POST_WITHOUT_IMAGE,
        )
        .await;
    }

    /// Single-attempt image download with the short per-image timeout.
    /// Failure means the article goes out without a photo.
    async fn fetch_article_image(&self, title: &str, url: &str) -> Option<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .timeout(IMAGE_TIMEOUT)
            .send()
            .await
            .and_then(|r| r.error_for_status());

        match response {
            Ok(resp) => match resp.bytes().await {
                Ok(bytes) => Some(bytes.to_vec()),
                Err(e) => {
                    error!(title, %url, error = %e, "Image download failed");
                    None
                }
            },
            Err(e) => {
                error!(title, %url, error = %e, "Image download failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::env;
    use std::path::PathBuf;

    fn today_str() -> String {
        Utc::now().date_naive().format("%b %d, %Y").to_string()
    }

    fn candidate(title: &str, date: Option<&str>) -> Candidate {
        Candidate {
            title: title.to_string(),
            date: date.map(str::to_string),
            summary: "s".to_string(),
            image_url: None,
        }
    }

    fn empty_store(name: &str) -> PostedTitles {
        let path: PathBuf = env::temp_dir().join(format!(
            "gamedia_pipeline_{}_{}.json",
            name,
            std::process::id()
        ));
        PostedTitles::load(path)
    }

    #[test]
    fn test_empty_title_skipped_first() {
        let mut posted = empty_store("empty_title");
        posted.insert(String::new());

        let c = candidate("", Some("garbage date"));
        assert_eq!(skip_reason(&c, &posted), Some(SkipReason::EmptyTitle));
    }

    #[test]
    fn test_duplicate_skipped_before_date_check() {
        let mut posted = empty_store("dup");
        posted.insert("Seen Before".to_string());

        let c = candidate("Seen Before", Some(&today_str()));
        assert_eq!(skip_reason(&c, &posted), Some(SkipReason::Duplicate));
    }

    #[test]
    fn test_todays_article_is_kept() {
        let posted = empty_store("today");
        let c = candidate("Fresh", Some(&today_str()));
        assert_eq!(skip_reason(&c, &posted), None);
    }

    #[test]
    fn test_other_day_is_skipped() {
        let posted = empty_store("other_day");
        let c = candidate("Old", Some("Jan 01, 2020"));
        assert_eq!(skip_reason(&c, &posted), Some(SkipReason::NotToday));
    }

    #[test]
    fn test_unparsable_date_is_skipped() {
        let posted = empty_store("bad_date");
        let c = candidate("Odd", Some("sometime recently"));
        assert_eq!(skip_reason(&c, &posted), Some(SkipReason::NotToday));
    }

    #[test]
    fn test_dateless_article_is_kept() {
        let posted = empty_store("dateless");
        let c = candidate("Undated", None);
        assert_eq!(skip_reason(&c, &posted), None);
    }

    #[test]
    fn test_second_pass_over_same_listing_posts_nothing() {
        let mut posted = empty_store("idempotent");
        let listing = vec![
            candidate("First", Some(&today_str())),
            candidate("Second", None),
            candidate("Third", Some(&today_str())),
        ];

        let first_pass: Vec<_> = listing
            .iter()
            .filter(|c| skip_reason(c, &posted).is_none())
            .cloned()
            .collect();
        assert_eq!(first_pass.len(), 3);
        for c in &first_pass {
            posted.insert(c.title.clone());
        }

        let second_pass: Vec<_> = listing
            .iter()
            .filter(|c| skip_reason(c, &posted).is_none())
            .collect();
        assert!(second_pass.is_empty());
    }
}
