//! Turns generated assets into PNG files on disk.

use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose;
use image::{DynamicImage, ImageFormat};
use tracing::{debug, error, info, warn};

use crate::constants::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_BACKOFF};
use crate::error::{DecodeError, DownloadError};
use crate::models::StoredImage;

/// How often, and how patiently, a failed download is retried.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first, at least 1
    pub max_attempts: u32,
    /// Delay after the first failure, doubled after each later one
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    /// Builds a policy, treating `0` attempts as `1`.
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(16);
        self.initial_backoff.saturating_mul(1 << doublings)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_BACKOFF)
    }
}

/// Downloads or decodes images and saves them as `{stem}.png` under `out_dir`.
#[derive(Clone, Debug)]
pub struct ImageProcessor {
    http: reqwest::Client,
    out_dir: PathBuf,
    retry: RetryPolicy,
}

impl ImageProcessor {
    /// Creates a processor writing into `out_dir`.
    pub fn new(http: reqwest::Client, out_dir: impl Into<PathBuf>, retry: RetryPolicy) -> Self {
        Self {
            http,
            out_dir: out_dir.into(),
            retry,
        }
    }

    /// Directory the PNG files are written to.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Path a given stem will be saved under.
    pub fn path_for(&self, stem: &str) -> PathBuf {
        self.out_dir.join(format!("{stem}.png"))
    }

    /// Fetches `url`, retrying non-success statuses per the retry policy, and saves it.
    pub async fn download_image(
        &self,
        url: &str,
        stem: &str,
    ) -> Result<StoredImage, DownloadError> {
        let transport = |source: reqwest::Error| DownloadError::Transport {
            url: url.to_string(),
            source,
        };

        let mut attempt = 0;
        let bytes = loop {
            attempt += 1;
            info!("getting URL: {url}");
            let response = self.http.get(url).send().await.map_err(transport)?;

            let status = response.status();
            if status.is_success() {
                break response.bytes().await.map_err(transport)?;
            }

            warn!(
                "Failed to download image from {url}. Error: {} (attempt {attempt}/{})",
                status.as_u16(),
                self.retry.max_attempts
            );
            if attempt >= self.retry.max_attempts {
                return Err(DownloadError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                    attempts: attempt,
                });
            }
            let delay = self.retry.delay_for(attempt);
            debug!("Retrying {url} in {delay:?}");
            tokio::time::sleep(delay).await;
        };

        let image = match image::load_from_memory(&bytes) {
            Ok(image) => image,
            Err(source) => {
                let url = url.to_string();
                return Err(DownloadError::Decode { url, source });
            }
        };
        let path = self.path_for(stem);
        if let Err(source) = self.save(&image, &path) {
            return Err(DownloadError::Save { path, source });
        }
        Ok(StoredImage { image, path })
    }

    /// Decodes a base64 payload and saves it. Any failure is logged and gives `None`.
    pub fn decode_embedded_image(&self, payload: Option<&str>, stem: &str) -> Option<StoredImage> {
        let Some(payload) = payload else {
            warn!("Base64 data is missing for {stem}");
            return None;
        };

        match self.try_decode(payload, stem) {
            Ok(stored) => Some(stored),
            Err(err) => {
                error!("Skipping {stem}: {err}");
                None
            }
        }
    }

    fn try_decode(&self, payload: &str, stem: &str) -> Result<StoredImage, DecodeError> {
        let bytes = general_purpose::STANDARD.decode(payload.trim())?;
        let image = image::load_from_memory(&bytes)?;
        let path = self.path_for(stem);
        self.save(&image, &path)
            .map_err(|err| DecodeError::Save(path.clone(), err))?;
        Ok(StoredImage { image, path })
    }

    fn save(&self, image: &DynamicImage, path: &Path) -> Result<(), image::ImageError> {
        if !self.out_dir.as_os_str().is_empty() && !self.out_dir.exists() {
            std::fs::create_dir_all(&self.out_dir)?;
        }
        image.save_with_format(path, ImageFormat::Png)?;
        info!("{} was saved", path.display());
        Ok(())
    }
}
