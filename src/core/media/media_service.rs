// Commands that download images: emoji lookups, the jumbo composite, JPEG
// re-encoding and avatar accent colours.

use super::compose::{compose_row, decode, dominant_color, encode_jpeg, encode_png};
use super::emoji::EmojiCdn;
use crate::core::commands::CommandError;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;

/// Most emojis a single composite may contain.
pub const MAX_JUMBO_EMOJIS: usize = 5;
/// Concurrent downloads while building a composite.
pub const MAX_PARALLEL_FETCHES: usize = 6;
/// Quality used when deliberately crushing an image.
const CRUSHED_JPEG_QUALITY: u8 = 1;

#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Download a URL. Non-2xx statuses are errors.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, CommandError>;
}

#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub cdn: EmojiCdn,
    /// Timeout for URLs the bot chose itself (CDNs, APIs).
    pub default_timeout: Duration,
    /// Timeout for arbitrary URLs supplied by users.
    pub user_url_timeout: Duration,
}

pub struct MediaService {
    fetcher: Arc<dyn MediaFetcher>,
    config: MediaConfig,
}

impl MediaService {
    pub fn new(fetcher: Arc<dyn MediaFetcher>, config: MediaConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn cdn(&self) -> &EmojiCdn {
        &self.config.cdn
    }

    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, CommandError> {
        self.fetcher.fetch(url, self.config.default_timeout).await
    }

    /// Download every URL with at most `MAX_PARALLEL_FETCHES` in flight.
    /// Results come back in input order; the first failure aborts the rest.
    pub async fn fetch_all(&self, urls: &[String]) -> Result<Vec<Vec<u8>>, CommandError> {
        let mut slots: Vec<Option<Vec<u8>>> = vec![None; urls.len()];

        let timeout = self.config.default_timeout;
        let fetcher = Arc::clone(&self.fetcher);
        let mut downloads = stream::iter(urls.to_vec().into_iter().enumerate())
            .map(move |(idx, url)| {
                let fetcher = Arc::clone(&fetcher);
                async move { (idx, fetcher.fetch(&url, timeout).await) }
            })
            .buffer_unordered(MAX_PARALLEL_FETCHES);

        while let Some((idx, result)) = downloads.next().await {
            slots[idx] = Some(result?);
        }

        slots
            .into_iter()
            .map(|slot| slot.ok_or_else(|| CommandError::Transport("download went missing".into())))
            .collect()
    }

    /// Combine up to five emojis into one PNG, left to right.
    pub async fn jumbo(&self, tokens: &str) -> Result<Vec<u8>, CommandError> {
        let urls: Vec<String> = tokens
            .split_whitespace()
            .take(MAX_JUMBO_EMOJIS)
            .map(|token| self.config.cdn.url_for(token))
            .collect();

        if urls.is_empty() {
            return Err(CommandError::invalid("give me at least one emoji"));
        }

        let downloads = self.fetch_all(&urls).await?;
        let images = downloads
            .iter()
            .map(|bytes| decode(bytes))
            .collect::<Result<Vec<_>, _>>()?;

        encode_png(compose_row(&images)?)
    }

    /// Fetch a user-supplied image and re-encode it as a terrible JPEG.
    /// Any download or decode failure is reported as "Invalid image".
    pub async fn crush_jpeg(&self, url: &str) -> Result<Vec<u8>, CommandError> {
        let bytes = self
            .fetcher
            .fetch(url, self.config.user_url_timeout)
            .await
            .map_err(|err| {
                tracing::debug!(%url, error = %err, "Image download failed");
                CommandError::invalid("Invalid image")
            })?;

        let image = decode(&bytes).map_err(|_| CommandError::invalid("Invalid image"))?;
        encode_jpeg(&image, CRUSHED_JPEG_QUALITY)
    }

    /// Accent colour for an avatar, `None` when it can't be fetched or decoded.
    pub async fn accent_color(&self, avatar_url: &str) -> Option<u32> {
        match self.fetch(avatar_url).await.and_then(|bytes| decode(&bytes)) {
            Ok(image) => dominant_color(&image),
            Err(err) => {
                tracing::warn!(url = %avatar_url, error = %err, "Could not read avatar colours");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    /// Serves canned bodies. Delays vary with the URL so downloads finish out
    /// of input order.
    #[derive(Default)]
    struct CannedFetcher {
        bodies: HashMap<String, Result<Vec<u8>, u16>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        last_timeout: std::sync::Mutex<Option<Duration>>,
    }

    impl CannedFetcher {
        fn with(mut self, url: &str, body: Result<Vec<u8>, u16>) -> Self {
            self.bodies.insert(url.to_string(), body);
            self
        }
    }

    #[async_trait]
    impl MediaFetcher for CannedFetcher {
        async fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, CommandError> {
            *self.last_timeout.lock().unwrap() = Some(timeout);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            let delay = 40 - (url.len() as u64 % 8) * 5;
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match self.bodies.get(url) {
                Some(Ok(bytes)) => Ok(bytes.clone()),
                Some(Err(status)) => Err(CommandError::Status {
                    status: *status,
                    url: url.to_string(),
                }),
                None => Err(CommandError::Status {
                    status: 404,
                    url: url.to_string(),
                }),
            }
        }
    }

    fn config() -> MediaConfig {
        MediaConfig {
            cdn: EmojiCdn {
                custom_base: "https://cdn.test/emojis".into(),
                twemoji_base: "https://tw.test".into(),
            },
            default_timeout: Duration::from_secs(10),
            user_url_timeout: Duration::from_secs(15),
        }
    }

    fn service(fetcher: CannedFetcher) -> (MediaService, Arc<CannedFetcher>) {
        let fetcher = Arc::new(fetcher);
        (MediaService::new(fetcher.clone(), config()), fetcher)
    }

    const RED: [u8; 4] = [255, 0, 0, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    #[tokio::test]
    async fn jumbo_composes_in_input_order() {
        let (service, _) = service(
            CannedFetcher::default()
                .with("https://cdn.test/emojis/1.png", Ok(png(10, 5, RED)))
                .with("https://cdn.test/emojis/22.png", Ok(png(20, 15, GREEN)))
                .with("https://tw.test/1f44d.png", Ok(png(30, 10, BLUE))),
        );

        let bytes = service
            .jumbo("<:a:1> <:bb:22> \u{1F44D}")
            .await
            .unwrap();
        let image = decode(&bytes).unwrap();

        assert_eq!((image.width(), image.height()), (90, 15));
        assert_eq!(image.get_pixel(0, 0).0, RED);
        assert_eq!(image.get_pixel(20, 0).0, GREEN);
        assert_eq!(image.get_pixel(50, 0).0, BLUE);
    }

    #[tokio::test]
    async fn jumbo_fails_when_any_download_fails() {
        let (service, _) = service(
            CannedFetcher::default()
                .with("https://cdn.test/emojis/1.png", Ok(png(10, 5, RED)))
                .with("https://cdn.test/emojis/2.png", Err(500))
                .with("https://cdn.test/emojis/3.png", Ok(png(30, 10, BLUE))),
        );

        let err = service.jumbo("<:a:1> <:b:2> <:c:3>").await.unwrap_err();
        assert!(matches!(err, CommandError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn jumbo_uses_at_most_five_emojis() {
        let mut fetcher = CannedFetcher::default();
        for id in 1..=7 {
            fetcher = fetcher.with(&format!("https://cdn.test/emojis/{}.png", id), Ok(png(2, 2, RED)));
        }
        let (service, _) = service(fetcher);

        let bytes = service
            .jumbo("<:a:1> <:a:2> <:a:3> <:a:4> <:a:5> <:a:6> <:a:7>")
            .await
            .unwrap();
        assert_eq!(decode(&bytes).unwrap().width(), 5 * (2 + 10));
    }

    #[tokio::test]
    async fn fetch_all_caps_parallelism_and_keeps_order() {
        let urls: Vec<String> = (0..12).map(|i| format!("https://x.test/{}", "a".repeat(i))).collect();
        let mut fetcher = CannedFetcher::default();
        for (idx, url) in urls.iter().enumerate() {
            fetcher = fetcher.with(url, Ok(vec![idx as u8]));
        }
        let (service, fetcher) = service(fetcher);

        let bodies = service.fetch_all(&urls).await.unwrap();

        let expected: Vec<Vec<u8>> = (0..12).map(|i| vec![i as u8]).collect();
        assert_eq!(bodies, expected);
        assert_eq!(fetcher.peak.load(Ordering::SeqCst), MAX_PARALLEL_FETCHES);
    }

    #[tokio::test]
    async fn jumbo_runs_inside_a_spawned_boxed_future() {
        let (service, _) = service(
            CannedFetcher::default()
                .with("https://cdn.test/emojis/1.png", Ok(png(4, 4, RED)))
                .with("https://cdn.test/emojis/2.png", Ok(png(4, 4, BLUE))),
        );
        let service = Arc::new(service);

        let job: futures::future::BoxFuture<'static, Result<Vec<u8>, CommandError>> =
            Box::pin(async move { service.jumbo("<:a:1> <:b:2>").await });
        let bytes = tokio::spawn(job).await.unwrap().unwrap();
        assert_eq!(decode(&bytes).unwrap().width(), 4 + 10 + 4);
    }

    #[tokio::test]
    async fn crush_jpeg_uses_user_timeout() {
        let (service, fetcher) = service(
            CannedFetcher::default().with("https://img.test/cat.png", Ok(png(8, 8, GREEN))),
        );

        let bytes = service.crush_jpeg("https://img.test/cat.png").await.unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
        assert_eq!(
            *fetcher.last_timeout.lock().unwrap(),
            Some(Duration::from_secs(15))
        );
    }

    #[tokio::test]
    async fn crush_jpeg_reports_invalid_image() {
        let (service, _) = service(
            CannedFetcher::default()
                .with("https://img.test/text", Ok(b"hello".to_vec()))
                .with("https://img.test/gone", Err(404)),
        );

        for url in ["https://img.test/text", "https://img.test/gone"] {
            let err = service.crush_jpeg(url).await.unwrap_err();
            assert_eq!(err.to_string(), "Invalid image");
        }
    }

    #[tokio::test]
    async fn accent_color_falls_back_to_none() {
        let (service, _) = service(
            CannedFetcher::default().with("https://img.test/avatar.png", Ok(png(4, 4, RED))),
        );
        assert_eq!(service.accent_color("https://img.test/avatar.png").await, Some(0xFF0000));
        assert_eq!(service.accent_color("https://img.test/missing.png").await, None);
    }
}
