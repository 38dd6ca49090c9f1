//! One generation run: request, fetch and save every image, then show them.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{error, info};

use crate::client::OpenAiClient;
use crate::constants::EMBEDDED_COLLISION_SUFFIX;
use crate::error::{RemoteErrorKind, RemoteServiceError};
use crate::models::{GenerationRequest, StoredImage};
use crate::processor::ImageProcessor;
use crate::viewer::ImageDisplay;

/// What a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Filename stem derived from the response timestamp
    pub stem: String,
    /// Saved PNG files, in acquisition order
    pub saved: Vec<PathBuf>,
    /// Number of images successfully shown
    pub displayed: usize,
}

/// Runs the whole pipeline once. Only the generation call itself can fail the run;
/// per-image problems are logged and skipped.
pub async fn run(
    client: &OpenAiClient,
    processor: &ImageProcessor,
    viewer: &mut dyn ImageDisplay,
    request: &GenerationRequest,
) -> Result<RunSummary, RemoteServiceError> {
    let response = client.generate_images(request).await?;

    let stem = response.run_stem().ok_or_else(|| {
        RemoteServiceError::without_status(
            RemoteErrorKind::InvalidResponse,
            format!("created timestamp {} is out of range", response.created),
        )
    })?;

    if let Some(revised_prompt) = response
        .data
        .first()
        .and_then(|asset| asset.revised_prompt.as_deref())
    {
        info!("Revised prompt: {revised_prompt}");
    }

    let mut images: Vec<StoredImage> = Vec::new();

    for (index, asset) in response.data.iter().enumerate() {
        let Some(url) = asset.url.as_deref() else {
            continue;
        };
        let image_stem = format!("{stem}_{index}");
        match processor.download_image(url, &image_stem).await {
            Ok(stored) => images.push(stored),
            Err(err) => error!("{err}"),
        }
    }

    let downloaded: HashSet<PathBuf> = images.iter().map(|stored| stored.path.clone()).collect();

    for (index, asset) in response.data.iter().enumerate() {
        if asset.b64_json.is_none() && asset.url.is_some() {
            continue;
        }
        let mut image_stem = format!("{stem}_{index}");
        if downloaded.contains(&processor.path_for(&image_stem)) {
            image_stem.push_str(EMBEDDED_COLLISION_SUFFIX);
        }
        let payload = asset.b64_json.as_deref();
        if let Some(stored) = processor.decode_embedded_image(payload, &image_stem) {
            images.push(stored);
        }
    }

    let mut displayed = 0;
    for (index, stored) in images.iter().enumerate() {
        match viewer.display_image(stored, index) {
            Ok(()) => displayed += 1,
            Err(err) => error!("Failed to display {}: {err}", stored.path.display()),
        }
    }

    Ok(RunSummary {
        stem,
        saved: images.into_iter().map(|stored| stored.path).collect(),
        displayed,
    })
}
