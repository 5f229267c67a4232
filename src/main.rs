//! # Gamedia News Bot
//!
//! Scrapes GameRant's gaming listing, picks out articles published today,
//! stamps the channel banner onto each article's image, and posts the result
//! to a Telegram channel with an HTML-formatted caption.
//!
//! ## Pipeline
//!
//! 1. **Load state**: the set of previously-posted titles (`posted.json`)
//! 2. **Fetch + extract**: download the listing (bounded retry) and parse up
//!    to 20 teaser cards with fallback selectors per field
//! 3. **Filter**: drop cards without a title, duplicates, and cards dated
//!    any day other than today (UTC)
//! 4. **Post**: fetch the teaser image, composite the banner, send a photo
//!    (or text-only) message with its own bounded retry
//! 5. **Persist**: write the updated title set back once
//!
//! ## Usage
//!
//! ```sh
//! BOT_TOKEN=123:abc CHANNEL_ID=@GamediaNews_acn gamedia_news_bot
//! ```
//!
//! The process always exits normally; success, partial failure, and an
//! unreachable listing are distinguished only in the log stream.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod banner;
mod caption;
mod cli;
mod models;
mod pipeline;
mod scrapers;
mod store;
mod telegram;
mod utils;

use cli::Cli;
use pipeline::Pipeline;
use telegram::BotClient;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("gamedia_news_bot starting up");

    let args = Cli::parse();
    debug!(
        channel_id = %args.channel_id,
        listing_url = %args.listing_url,
        posted_file = %args.posted_file,
        "Parsed CLI arguments"
    );

    let client = reqwest::Client::builder()
        .timeout(cli::HTTP_TIMEOUT)
        .build()?;
    let api = BotClient::new(client.clone(), args.bot_token, args.channel_id);
    let pipeline = Pipeline::new(
        client,
        api,
        args.listing_url,
        args.banner_url,
        args.posted_file,
    );

    if let Err(e) = pipeline.run().await {
        error!(error = %e, "Run finished with an error");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
