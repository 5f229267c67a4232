//! Date matching and text truncation helpers.

use chrono::{NaiveDate, Utc};
use tracing::debug;

/// Date format printed on GameRant teaser cards, e.g. `"Jun 23, 2025"`.
const CARD_DATE_FORMAT: &str = "%b %d, %Y";

/// Check whether a card's date string names the current UTC calendar day.
///
/// Garbage input is treated as "not today" rather than an error: the caller
/// filters such candidates out instead of aborting the run.
///
/// # Examples
///
/// ```ignore
/// // On 2025-06-23 (UTC):
/// assert!(is_today("Jun 23, 2025"));
/// assert!(!is_today("Jun 22, 2025"));
/// assert!(!is_today("yesterday-ish"));
/// ```
pub fn is_today(date_str: &str) -> bool {
    match NaiveDate::parse_from_str(date_str.trim(), CARD_DATE_FORMAT) {
        Ok(date) => date == Utc::now().date_naive(),
        Err(e) => {
            debug!(date_str, error = %e, "Unparsable card date");
            false
        }
    }
}

/// Truncate a summary to `max` characters, appending `"..."` when trimmed.
///
/// Counts characters rather than bytes so multi-byte text is never split
/// mid-codepoint. Text at or under the cap passes through unchanged.
pub fn truncate_summary(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut truncated: String = text.chars().take(max).collect();
        truncated.push_str("...");
        truncated
    }
}
