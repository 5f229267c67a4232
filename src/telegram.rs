//! Telegram delivery: a thin Bot API client behind a trait seam, plus the
//! bounded-retry send driver.
//!
//! The [`ChannelApi`] trait exists so the pipeline owns a constructed client
//! rather than a module-level global, and so tests can substitute a fake
//! that scripts timeouts and rejections.
//!
//! # Retry Strategy
//!
//! - Up to 3 attempts per article
//! - Fixed 2 second pause between attempts
//! - Timeouts and unexpected errors retry; a Telegram rejection is terminal
//! - Exhaustion is logged and the pipeline moves on to the next article

use crate::cli::{MAX_ATTEMPTS, RETRY_DELAY};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::fmt;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Classified failure of a single send attempt.
#[derive(Debug, Error)]
pub enum SendError {
    /// The request did not complete in time. Worth retrying.
    #[error("request timed out")]
    Timeout,
    /// Telegram rejected the request outright (bad chat id, caption too
    /// long, broken markup). Retrying would fail identically.
    #[error("rejected by Telegram: {0}")]
    BadRequest(String),
    /// Anything else: connection resets, 5xx, unparsable responses.
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for SendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SendError::Timeout
        } else {
            SendError::Other(e.to_string())
        }
    }
}

/// Destination channel operations.
///
/// Both calls deliver one message with an HTML-formatted caption; the photo
/// variant attaches a PNG.
pub trait ChannelApi {
    async fn send_photo(&self, caption: &str, png: Vec<u8>) -> Result<(), SendError>;
    async fn send_message(&self, caption: &str) -> Result<(), SendError>;
}

/// Telegram Bot API envelope. `result` is ignored; only the ok flag and the
/// error description matter here.
#[derive(Debug, Deserialize)]
struct ApiReply {
    ok: bool,
    description: Option<String>,
}

/// Bot API client bound to one token and one destination chat.
pub struct BotClient {
    client: Client,
    token: String,
    chat_id: String,
}

impl BotClient {
    pub fn new(client: Client, token: String, chat_id: String) -> Self {
        Self {
            client,
            token,
            chat_id,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.token, method)
    }

    async fn check_reply(resp: Response) -> Result<(), SendError> {
        let status = resp.status();
        let reply = resp.json::<ApiReply>().await.unwrap_or(ApiReply {
            ok: status.is_success(),
            description: None,
        });

        if reply.ok {
            return Ok(());
        }

        let description = reply
            .description
            .unwrap_or_else(|| format!("HTTP {status}"));
        if status == StatusCode::BAD_REQUEST {
            Err(SendError::BadRequest(description))
        } else {
            Err(SendError::Other(description))
        }
    }
}

// The token is a credential; keep it out of debug output.
impl fmt::Debug for BotClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotClient")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl ChannelApi for BotClient {
    async fn send_photo(&self, caption: &str, png: Vec<u8>) -> Result<(), SendError> {
        let photo = Part::bytes(png)
            .file_name("composite.png")
            .mime_str("image/png")
            .map_err(SendError::from)?;
        let form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", caption.to_string())
            .text("parse_mode", "HTML")
            .part("photo", photo);

        let resp = self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await?;
        Self::check_reply(resp).await
    }

    async fn send_message(&self, caption: &str) -> Result<(), SendError> {
        let payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": caption,
            "parse_mode": "HTML",
        });

        let resp = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&payload)
            .send()
            .await?;
        Self::check_reply(resp).await
    }
}

/// Deliver one article to the channel, retrying transient failures.
///
/// With a photo, sends a photo message; without one, sends a text message if
/// `allow_text_only`, otherwise logs a warning and never attempts a send.
/// A [`SendError::BadRequest`] stops immediately. Only this article's send is
/// suspended during the retry pauses; the caller processes the remaining
/// articles afterwards either way.
#[instrument(level = "info", skip_all, fields(%title))]
pub async fn deliver<A: ChannelApi>(
    api: &A,
    title: &str,
    caption: &str,
    photo: Option<Vec<u8>>,
    allow_text_only: bool,
) {
    if photo.is_none() && !allow_text_only {
        warn!(title, "Skipping post: image missing and text-only posts disabled");
        return;
    }

    for attempt in 1..=MAX_ATTEMPTS {
        let result = match &photo {
            Some(png) => api.send_photo(caption, png.clone()).await,
            None => api.send_message(caption).await,
        };

        match result {
            Ok(()) => {
                info!(title, attempt, "Posted");
                return;
            }
            Err(SendError::Timeout) => {
                warn!(title, attempt, max = MAX_ATTEMPTS, "Timeout sending post");
            }
            Err(e @ SendError::BadRequest(_)) => {
                error!(title, error = %e, "Post rejected; not retrying");
                return;
            }
            Err(e) => {
                error!(title, attempt, max = MAX_ATTEMPTS, error = %e, "Error sending post");
            }
        }

        if attempt < MAX_ATTEMPTS {
            sleep(RETRY_DELAY).await;
        }
    }

    error!(title, attempts = MAX_ATTEMPTS, "Failed to post after retries");
}
