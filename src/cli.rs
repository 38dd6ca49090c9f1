//! CLI parser
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::client::ClientSettings;
use crate::constants::{
    CLIENT_VERSION, DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_PROMPT, DEFAULT_USER,
};
use crate::models::{GenerationRequest, ImageSize, ResponseFormat};
use crate::processor::RetryPolicy;

#[derive(Parser, Debug)]
#[command(name = "dalle-viewer")]
/// Generate images with the OpenAI Images API, save them as PNG and view them.
/// Running without flags generates one 1024x1024 dall-e-2 image of the default prompt.
pub struct CliOptions {
    #[clap(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    /// OpenAI API key. Env: OPENAI_API_KEY
    pub openai_api_key: Option<String>,

    #[clap(long, default_value = DEFAULT_API_BASE, env = "OPENAI_BASE_URL")]
    /// API base URL. Env: OPENAI_BASE_URL
    pub api_base: String,

    #[clap(long, default_value = DEFAULT_PROMPT)]
    /// Prompt describing the image
    pub prompt: String,

    #[clap(long, default_value = DEFAULT_MODEL)]
    /// Image model
    pub model: String,

    #[clap(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=10))]
    /// Number of images to generate
    pub count: u8,

    #[clap(long, value_enum, default_value_t = ImageSize::Large)]
    /// Image size
    pub size: ImageSize,

    #[clap(long, default_value = DEFAULT_USER)]
    /// End-user identifier sent with the request
    pub user: String,

    #[clap(long, value_enum)]
    /// Ask for URLs or inline base64 data, the service picks URLs if unset
    pub response_format: Option<ResponseFormat>,

    #[clap(long, short, default_value = ".", env = "DALLE_VIEWER_OUT_DIR")]
    /// Directory the PNG files are written to. Env: DALLE_VIEWER_OUT_DIR
    pub out_dir: PathBuf,

    #[clap(long, default_value_t = crate::constants::DEFAULT_MAX_ATTEMPTS)]
    /// Download attempts per image URL
    pub max_attempts: u32,

    #[clap(long, default_value_t = 1000)]
    /// Delay before the first download retry, doubled after each failure
    pub retry_backoff_ms: u64,

    #[clap(long)]
    /// Timeout for each HTTP request, defaults to none
    pub timeout_secs: Option<u64>,

    #[clap(long, help = "Log images instead of opening viewer windows")]
    /// Don't open viewer windows
    pub no_display: bool,

    #[clap(long, help = "Enable debug logging", env = "DALLE_VIEWER_DEBUG")]
    /// Enable debug logging. Env: DALLE_VIEWER_DEBUG
    pub debug: bool,
}

impl CliOptions {
    /// The generation request described by the options.
    pub fn request(&self) -> GenerationRequest {
        GenerationRequest {
            model: self.model.clone(),
            count: self.count,
            size: self.size,
            prompt: self.prompt.clone(),
            user: self.user.clone(),
            response_format: self.response_format,
        }
    }

    /// Settings for the API client. A missing key becomes an empty one,
    /// which the client rejects.
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            api_key: self.openai_api_key.clone().unwrap_or_default(),
            api_base: self.api_base.clone(),
            client_version: CLIENT_VERSION.to_string(),
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }

    /// Retry policy for image downloads.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.retry_backoff_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fixed_scenario() {
        let cli = CliOptions::try_parse_from(["dalle-viewer", "--openai-api-key", "sk-test"])
            .expect("parse defaults");
        let request = cli.request();
        assert_eq!(request.model, "dall-e-2");
        assert_eq!(request.count, 1);
        assert_eq!(request.size, ImageSize::Large);
        assert_eq!(request.user, "myName");
        assert!(request.prompt.contains("Jack Vettriano"));
        assert!(request.response_format.is_none());
        assert_eq!(cli.retry_policy(), RetryPolicy::default());
        assert_eq!(cli.client_settings().api_key, "sk-test");
    }

    #[test]
    fn test_count_and_size_parsing() {
        let cli = CliOptions::try_parse_from([
            "dalle-viewer",
            "--count",
            "2",
            "--size",
            "1792x1024",
            "--response-format",
            "b64-json",
            "--timeout-secs",
            "30",
        ])
        .expect("parse options");
        assert_eq!(cli.count, 2);
        assert_eq!(cli.size, ImageSize::Wide);
        assert_eq!(cli.response_format, Some(ResponseFormat::B64Json));
        assert_eq!(cli.client_settings().timeout, Some(Duration::from_secs(30)));

        assert!(CliOptions::try_parse_from(["dalle-viewer", "--count", "0"]).is_err());
        assert!(CliOptions::try_parse_from(["dalle-viewer", "--size", "100x100"]).is_err());
    }
}
