//! # Image Assets
//!
//! Best-effort loading of logos and other images embedded in documents.
//!
//! ## Resolution Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  url                                                                    │
//! │   │                                                                     │
//! │   ├── "data:image/png;base64,..."  ──► decode locally (no network)      │
//! │   │                                                                     │
//! │   ├── "http(s)://..."                                                   │
//! │   │      │  remote disabled ─────────────────────────► Skipped         │
//! │   │      ▼                                                              │
//! │   │   select! {                                                         │
//! │   │     cancel.cancelled()          ─────────────────► Skipped         │
//! │   │     timeout(fetcher.fetch(url)) ── Err / elapsed ► Failed          │
//! │   │                                 ── Ok(bytes) ──┐                    │
//! │   │   }                                            ▼                    │
//! │   │                                   sniff PNG / JPEG ► Loaded        │
//! │   │                                   anything else ───► Skipped       │
//! │   │                                                                     │
//! │   └── other schemes ──────────────────────────────────► Skipped        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed or skipped asset NEVER fails a render. The renderer draws without
//! the image (or a fallback label) and the reason is logged here.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use printpdf::image_crate::io::Reader as ImageReader;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{DocError, DocResult};

// =============================================================================
// Image Data
// =============================================================================

/// Raster formats the PDF backend can embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Detects the format from magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else {
            None
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    /// Maps a declared media type (`image/jpg` included) to a format.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type.to_ascii_lowercase().as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }
}

/// A loaded raster image with its pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAsset {
    pub format: ImageFormat,
    pub bytes: Arc<[u8]>,
    pub width_px: u32,
    pub height_px: u32,
}

impl ImageAsset {
    /// Validates `bytes` as PNG or JPEG and reads the pixel size from the header.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, String> {
        let format = ImageFormat::sniff(&bytes)
            .ok_or_else(|| "not a PNG or JPEG image".to_string())?;

        let (width_px, height_px) = ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(|e| e.to_string())?
            .into_dimensions()
            .map_err(|e| format!("unreadable {} header: {}", format.media_type(), e))?;

        Ok(ImageAsset {
            format,
            bytes: bytes.into(),
            width_px,
            height_px,
        })
    }

    /// Width over height; 1.0 for degenerate images.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height_px == 0 {
            1.0
        } else {
            f64::from(self.width_px) / f64::from(self.height_px)
        }
    }

    /// Largest `(width, height)` with this aspect ratio fitting in the box.
    pub fn fit_within(&self, max_width: f64, max_height: f64) -> (f64, f64) {
        let ratio = self.aspect_ratio();
        if max_width / max_height > ratio {
            (max_height * ratio, max_height)
        } else {
            (max_width, max_width / ratio)
        }
    }
}

// =============================================================================
// Data URLs
// =============================================================================

/// A decoded `data:<media-type>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq)]
pub struct DataUrl {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Splits a data URL into its media type and decoded payload.
pub fn decode_data_url(url: &str) -> Result<DataUrl, String> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| "not a data URL".to_string())?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| "data URL has no payload".to_string())?;

    let mut parts = header.split(';');
    let media_type = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
    if !parts.any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err("only base64 data URLs are supported".to_string());
    }

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| format!("invalid base64 payload: {}", e))?;

    Ok(DataUrl { media_type, bytes })
}

// =============================================================================
// Fetching
// =============================================================================

/// Outcome of resolving one image URL.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetFetch {
    Loaded(ImageAsset),
    /// The fetch was attempted and failed (network error, timeout, bad data).
    Failed(String),
    /// The fetch was not attempted or the content is not usable.
    Skipped(String),
}

impl AssetFetch {
    pub fn image(&self) -> Option<&ImageAsset> {
        match self {
            AssetFetch::Loaded(asset) => Some(asset),
            _ => None,
        }
    }
}

/// Downloads raw image bytes.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> DocResult<Vec<u8>>;
}

/// Fetches over HTTP(S) with reqwest.
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new() -> DocResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| DocError::Fetch(e.to_string()))?;
        Ok(HttpImageFetcher { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> DocResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DocError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocError::Fetch(format!("HTTP {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DocError::Fetch(e.to_string()))?;
        Ok(body.to_vec())
    }
}

/// Refuses every request. Used when remote images are disabled and in tests.
pub struct OfflineFetcher;

#[async_trait]
impl ImageFetcher for OfflineFetcher {
    async fn fetch(&self, url: &str) -> DocResult<Vec<u8>> {
        Err(DocError::Fetch(format!("offline: {}", url)))
    }
}

/// Default per-image fetch budget.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves image URLs into an [`AssetBundle`].
#[derive(Clone)]
pub struct AssetResolver {
    fetcher: Arc<dyn ImageFetcher>,
    timeout: Duration,
    remote_enabled: bool,
}

impl AssetResolver {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, timeout: Duration) -> Self {
        AssetResolver {
            fetcher,
            timeout,
            remote_enabled: true,
        }
    }

    /// Resolver that only decodes data URLs.
    pub fn offline() -> Self {
        AssetResolver {
            fetcher: Arc::new(OfflineFetcher),
            timeout: DEFAULT_FETCH_TIMEOUT,
            remote_enabled: false,
        }
    }

    pub fn with_remote(mut self, enabled: bool) -> Self {
        self.remote_enabled = enabled;
        self
    }

    /// Resolves a single URL. Never returns an error.
    pub async fn fetch_one(&self, url: &str, cancel: &CancellationToken) -> AssetFetch {
        fetch_one(
            Arc::clone(&self.fetcher),
            url.to_string(),
            self.timeout,
            self.remote_enabled,
            cancel.clone(),
        )
        .await
    }

    /// Resolves every distinct, non-empty URL concurrently.
    pub async fn resolve<I>(&self, urls: I, cancel: &CancellationToken) -> AssetBundle
    where
        I: IntoIterator<Item = String>,
    {
        let mut bundle = AssetBundle::default();
        let mut tasks = JoinSet::new();
        let mut seen = std::collections::HashSet::new();

        for url in urls {
            if url.trim().is_empty() || !seen.insert(url.clone()) {
                continue;
            }
            let fetcher = Arc::clone(&self.fetcher);
            let timeout = self.timeout;
            let remote = self.remote_enabled;
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let outcome = fetch_one(fetcher, url.clone(), timeout, remote, cancel).await;
                (url, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((url, outcome)) => bundle.insert(url, outcome),
                Err(e) => warn!(?e, "Asset task aborted"),
            }
        }

        bundle
    }
}

async fn fetch_one(
    fetcher: Arc<dyn ImageFetcher>,
    url: String,
    timeout: Duration,
    remote_enabled: bool,
    cancel: CancellationToken,
) -> AssetFetch {
    let outcome = if url.starts_with("data:") {
        load_data_url(&url)
    } else if url.starts_with("http://") || url.starts_with("https://") {
        if !remote_enabled {
            AssetFetch::Skipped("remote images are disabled".to_string())
        } else {
            tokio::select! {
                _ = cancel.cancelled() => AssetFetch::Skipped("cancelled".to_string()),
                result = tokio::time::timeout(timeout, fetcher.fetch(&url)) => match result {
                    Err(_) => AssetFetch::Failed(format!("timed out after {}s", timeout.as_secs())),
                    Ok(Err(e)) => AssetFetch::Failed(e.to_string()),
                    Ok(Ok(bytes)) => load_bytes(bytes),
                },
            }
        }
    } else {
        AssetFetch::Skipped("unsupported image URL scheme".to_string())
    };

    match &outcome {
        AssetFetch::Loaded(asset) => debug!(
            url = %short(&url),
            width = asset.width_px,
            height = asset.height_px,
            "Image loaded"
        ),
        AssetFetch::Failed(reason) => warn!(url = %short(&url), %reason, "Image could not be loaded, continuing without it"),
        AssetFetch::Skipped(reason) => warn!(url = %short(&url), %reason, "Image skipped"),
    }

    outcome
}

fn load_data_url(url: &str) -> AssetFetch {
    match decode_data_url(url) {
        Ok(data) if data.media_type == "image/svg+xml" => {
            AssetFetch::Skipped("SVG images are not supported".to_string())
        }
        Ok(data) => load_bytes(data.bytes),
        Err(reason) => AssetFetch::Failed(reason),
    }
}

fn load_bytes(bytes: Vec<u8>) -> AssetFetch {
    if ImageFormat::sniff(&bytes).is_none() {
        return AssetFetch::Skipped("not a PNG or JPEG image".to_string());
    }
    match ImageAsset::from_bytes(bytes) {
        Ok(asset) => AssetFetch::Loaded(asset),
        Err(reason) => AssetFetch::Failed(reason),
    }
}

/// Keeps data URLs out of log lines.
fn short(url: &str) -> &str {
    if url.starts_with("data:") {
        url.split(',').next().unwrap_or("data:")
    } else {
        url
    }
}

// =============================================================================
// Bundle
// =============================================================================

/// Resolved images keyed by their source URL.
#[derive(Debug, Clone, Default)]
pub struct AssetBundle {
    entries: HashMap<String, AssetFetch>,
}

impl AssetBundle {
    pub fn insert(&mut self, url: impl Into<String>, outcome: AssetFetch) {
        self.entries.insert(url.into(), outcome);
    }

    /// The loaded image for `url`, if any.
    pub fn image(&self, url: &str) -> Option<&ImageAsset> {
        self.entries.get(url).and_then(AssetFetch::image)
    }

    pub fn status(&self, url: &str) -> Option<&AssetFetch> {
        self.entries.get(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use printpdf::image_crate::{DynamicImage, ImageOutputFormat, RgbImage};

    /// A real PNG of the given size.
    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageOutputFormat::Png).unwrap();
        out.into_inner()
    }

    pub(crate) fn encode_data_url(media_type: &str, bytes: &[u8]) -> String {
        format!("data:{};base64,{}", media_type, STANDARD.encode(bytes))
    }

    pub(crate) fn png_asset(width: u32, height: u32) -> ImageAsset {
        ImageAsset::from_bytes(png_bytes(width, height)).unwrap()
    }

    struct StaticFetcher(Vec<u8>);

    #[async_trait]
    impl ImageFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> DocResult<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    struct SlowFetcher;

    #[async_trait]
    impl ImageFetcher for SlowFetcher {
        async fn fetch(&self, _url: &str) -> DocResult<Vec<u8>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_sniff() {
        assert_eq!(ImageFormat::sniff(&png_bytes(1, 1)), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(b"%PDF-1.4"), None);
    }

    #[test]
    fn test_asset_reads_dimensions() {
        let asset = png_asset(40, 10);
        assert_eq!((asset.width_px, asset.height_px), (40, 10));
        let (w, h) = asset.fit_within(30.0, 10.0);
        assert!((w - 30.0).abs() < 1e-9);
        assert!((h - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_data_url_round_trip() {
        let url = encode_data_url("image/png", &[1, 2, 3]);
        assert_eq!(url, "data:image/png;base64,AQID");
        let decoded = decode_data_url(&url).unwrap();
        assert_eq!(decoded.media_type, "image/png");
        assert_eq!(decoded.bytes, vec![1, 2, 3]);

        assert!(decode_data_url("data:image/png,plain").is_err());
        assert!(decode_data_url("https://example.com/a.png").is_err());
    }

    #[tokio::test]
    async fn test_data_url_loads_without_network() {
        let resolver = AssetResolver::offline();
        let url = encode_data_url("image/png", &png_bytes(2, 2));
        let outcome = resolver.fetch_one(&url, &CancellationToken::new()).await;
        assert!(outcome.image().is_some());
    }

    #[tokio::test]
    async fn test_remote_disabled_is_skipped() {
        let resolver = AssetResolver::offline();
        let outcome = resolver
            .fetch_one("https://example.com/logo.png", &CancellationToken::new())
            .await;
        assert!(matches!(outcome, AssetFetch::Skipped(_)));
    }

    #[tokio::test]
    async fn test_fetch_error_is_failed() {
        let resolver = AssetResolver::new(Arc::new(OfflineFetcher), DEFAULT_FETCH_TIMEOUT);
        let outcome = resolver
            .fetch_one("https://example.com/logo.png", &CancellationToken::new())
            .await;
        assert!(matches!(outcome, AssetFetch::Failed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_failed() {
        let resolver = AssetResolver::new(Arc::new(SlowFetcher), Duration::from_secs(5));
        let outcome = resolver
            .fetch_one("https://example.com/slow.png", &CancellationToken::new())
            .await;
        assert_eq!(outcome, AssetFetch::Failed("timed out after 5s".to_string()));
    }

    #[tokio::test]
    async fn test_cancelled_is_skipped() {
        let resolver = AssetResolver::new(Arc::new(SlowFetcher), Duration::from_secs(60));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let outcome = resolver.fetch_one("https://example.com/slow.png", &cancel).await;
        assert_eq!(outcome, AssetFetch::Skipped("cancelled".to_string()));
    }

    #[tokio::test]
    async fn test_non_image_payload_is_skipped() {
        let resolver = AssetResolver::new(Arc::new(StaticFetcher(b"<svg/>".to_vec())), DEFAULT_FETCH_TIMEOUT);
        let outcome = resolver
            .fetch_one("https://example.com/logo.svg", &CancellationToken::new())
            .await;
        assert!(matches!(outcome, AssetFetch::Skipped(_)));
    }

    #[tokio::test]
    async fn test_resolve_dedupes_and_ignores_blank() {
        let resolver = AssetResolver::new(Arc::new(StaticFetcher(png_bytes(3, 3))), DEFAULT_FETCH_TIMEOUT);
        let urls = vec![
            "https://example.com/a.png".to_string(),
            "https://example.com/a.png".to_string(),
            String::new(),
        ];
        let bundle = resolver.resolve(urls, &CancellationToken::new()).await;
        assert_eq!(bundle.len(), 1);
        assert!(bundle.image("https://example.com/a.png").is_some());
    }
}
