//! Request and response types for the Images API, plus saved images.

use std::fmt;
use std::path::PathBuf;

use chrono::DateTime;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::constants::RUN_STEM_FORMAT;

/// Output sizes accepted by the generations endpoint.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
pub enum ImageSize {
    /// 256x256
    #[serde(rename = "256x256")]
    #[value(name = "256x256")]
    Small,
    /// 512x512
    #[serde(rename = "512x512")]
    #[value(name = "512x512")]
    Medium,
    /// 1024x1024
    #[default]
    #[serde(rename = "1024x1024")]
    #[value(name = "1024x1024")]
    Large,
    /// 1792x1024
    #[serde(rename = "1792x1024")]
    #[value(name = "1792x1024")]
    Wide,
    /// 1024x1792
    #[serde(rename = "1024x1792")]
    #[value(name = "1024x1792")]
    Tall,
}

impl ImageSize {
    /// Returns the wire representation, eg `1024x1024`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "256x256",
            Self::Medium => "512x512",
            Self::Large => "1024x1024",
            Self::Wide => "1792x1024",
            Self::Tall => "1024x1792",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the service should hand back the generated images.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Temporary download URLs
    Url,
    /// Base64 PNG data inline in the response
    B64Json,
}

/// Request body for POST /v1/images/generations
#[derive(Clone, Debug, Serialize)]
pub struct GenerationRequest {
    /// Image model, eg `dall-e-2`
    pub model: String,
    /// Number of images to generate
    #[serde(rename = "n")]
    pub count: u8,
    /// Output size
    pub size: ImageSize,
    /// Text prompt
    pub prompt: String,
    /// End-user identifier
    pub user: String,
    /// Requested response format, the service defaults to URLs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// Response body from the generations endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct GenerationResponse {
    /// Unix timestamp of the generation
    pub created: i64,
    /// One entry per generated image
    #[serde(default)]
    pub data: Vec<ImageAsset>,
}

impl GenerationResponse {
    /// The filename stem shared by every image in this run, eg `DALLE-20231114_221320`.
    ///
    /// Returns `None` when `created` is outside the representable range.
    pub fn run_stem(&self) -> Option<String> {
        DateTime::from_timestamp(self.created, 0)
            .map(|created| created.format(RUN_STEM_FORMAT).to_string())
    }
}

/// A single generated image, as returned by the service.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ImageAsset {
    /// Download URL, when the response format is `url`
    #[serde(default)]
    pub url: Option<String>,
    /// Base64 PNG data, when the response format is `b64_json`
    #[serde(default)]
    pub b64_json: Option<String>,
    /// The prompt as rewritten by the service
    #[serde(default)]
    pub revised_prompt: Option<String>,
}

/// A decoded image and the file it was written to.
#[derive(Clone, Debug)]
pub struct StoredImage {
    /// The decoded bitmap
    pub image: DynamicImage,
    /// Where the PNG was saved
    pub path: PathBuf,
}
