//! Command-line interface and run constants.
//!
//! Credentials come from the environment (the bot is meant to run from CI
//! schedules where `BOT_TOKEN` / `CHANNEL_ID` are injected as secrets), but
//! every option can also be passed as a flag. Everything that the original
//! deployment hard-codes lives here as a `const` so the rest of the crate has
//! one place to read it from.

use clap::Parser;
use std::time::Duration;

/// Maximum attempts for the listing fetch and for each Telegram send.
pub const MAX_ATTEMPTS: usize = 3;

/// Fixed pause between attempts. No backoff, no jitter.
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Timeout for listing page, banner, and Telegram calls.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Shorter timeout for per-article image downloads.
pub const IMAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// How many teaser cards to consider per run.
pub const MAX_CANDIDATES: usize = 20;

/// Summary length cap for the caption, in characters.
pub const SUMMARY_MAX_CHARS: usize = 150;

/// Whether an article whose image could not be fetched is still posted as a
/// text-only message. When false such articles are skipped entirely.
pub const POST_WITHOUT_IMAGE: bool = true;

/// User-Agent sent with the listing fetch; GameRant serves a consent
/// interstitial to clients without a browser UA.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// Command-line arguments for the Gamedia news bot.
///
/// # Examples
///
/// ```sh
/// # Credentials from the environment
/// BOT_TOKEN=123:abc CHANNEL_ID=@GamediaNews_acn gamedia_news_bot
///
/// # Separate state file for a staging channel
/// gamedia_news_bot --posted-file staging_posted.json --channel-id @staging
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Telegram bot token
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: String,

    /// Destination channel (numeric id or @handle)
    #[arg(long, env = "CHANNEL_ID")]
    pub channel_id: String,

    /// Path of the posted-titles state file
    #[arg(short, long, default_value = "posted.json")]
    pub posted_file: String,

    /// Listing page to scrape
    #[arg(long, default_value = "https://gamerant.com/gaming/")]
    pub listing_url: String,

    /// Banner image overlaid on every article image
    #[arg(
        long,
        default_value = "https://pixvid.org/images/2025/06/23/20250623_152444.png"
    )]
    pub banner_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from([
            "gamedia_news_bot",
            "--bot-token",
            "123:abc",
            "--channel-id",
            "@GamediaNews_acn",
        ]);

        assert_eq!(cli.posted_file, "posted.json");
        assert_eq!(cli.listing_url, "https://gamerant.com/gaming/");
        assert!(cli.banner_url.ends_with(".png"));
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "gamedia_news_bot",
            "--bot-token",
            "123:abc",
            "--channel-id",
            "-1001234567890",
            "-p",
            "/tmp/posted.json",
            "--listing-url",
            "https://gamerant.com/game-news/",
        ]);

        assert_eq!(cli.posted_file, "/tmp/posted.json");
        assert_eq!(cli.channel_id, "-1001234567890");
        assert_eq!(cli.listing_url, "https://gamerant.com/game-news/");
    }
}
