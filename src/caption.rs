//! Caption formatting for channel posts.
//!
//! Telegram renders captions with `parse_mode=HTML`, so scraped text has to
//! be entity-escaped before it is embedded in the template. The template
//! itself is fixed: bold headline with a lightning mark, italic summary, and
//! the channel footer.

use crate::models::Candidate;
use html_escape::encode_quoted_attribute;

/// Channel handle printed in the caption footer.
const CHANNEL_HANDLE: &str = "@GamediaNews_acn";

/// Escape `&`, `<`, `>` and quotes for embedding in an HTML caption.
pub fn escape_html(text: &str) -> String {
    encode_quoted_attribute(text).into_owned()
}

/// Render the caption for one candidate.
///
/// Pure: the same candidate always yields the same string.
pub fn build_caption(candidate: &Candidate) -> String {
    format!(
        "<b>{}</b> ⚡\n\n<i>{}</i>\n\n🍁 | {}",
        escape_html(&candidate.title),
        escape_html(&candidate.summary),
        CHANNEL_HANDLE,
    )
}
