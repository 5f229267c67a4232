//! Banner compositing for article images.
//!
//! Every posted photo is the article's teaser image resized to the banner's
//! pixel dimensions, with the banner alpha-composited on top at the origin.
//! The banner is fetched fresh for each article; it changes on the remote end
//! without redeploys, so nothing is cached.

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat};
use reqwest::Client;
use std::error::Error;
use std::io::Cursor;
use tracing::{debug, error, instrument};

/// Overlay `banner_bytes` onto `article_bytes`, returning a PNG.
///
/// The article image becomes the background: it is resized to exactly the
/// banner's dimensions with Lanczos resampling, then the banner is pasted at
/// (0,0) using its own alpha channel, so transparent banner regions show the
/// resized article through. The result is encoded losslessly.
pub fn composite_onto_banner(
    banner_bytes: &[u8],
    article_bytes: &[u8],
) -> Result<Vec<u8>, Box<dyn Error>> {
    let banner = image::load_from_memory(banner_bytes)?.into_rgba8();
    let (width, height) = banner.dimensions();

    let article = image::load_from_memory(article_bytes)?.into_rgba8();
    let mut composite = imageops::resize(&article, width, height, FilterType::Lanczos3);
    imageops::overlay(&mut composite, &banner, 0, 0);

    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(composite).write_to(&mut buf, ImageFormat::Png)?;
    debug!(width, height, bytes = buf.get_ref().len(), "Composited banner onto article image");
    Ok(buf.into_inner())
}

/// Fetch the banner and composite it onto `article_bytes`.
///
/// Any failure along the way (banner fetch, decode of either image, encode)
/// degrades to `None`: the article is then posted without a photo instead of
/// aborting the run.
#[instrument(level = "debug", skip_all, fields(%title))]
pub async fn stamped_photo(
    client: &Client,
    banner_url: &str,
    title: &str,
    article_bytes: &[u8],
) -> Option<Vec<u8>> {
    match fetch_and_compose(client, banner_url, article_bytes).await {
        Ok(png) => Some(png),
        Err(e) => {
            error!(title, error = %e, "Image processing failed");
            None
        }
    }
}

async fn fetch_and_compose(
    client: &Client,
    banner_url: &str,
    article_bytes: &[u8],
) -> Result<Vec<u8>, Box<dyn Error>> {
    let banner_bytes = client
        .get(banner_url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    composite_onto_banner(&banner_bytes, article_bytes)
}
