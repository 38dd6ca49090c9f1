//! Shared constants and defaults
//!

use std::time::Duration;

/// Oldest client version allowed to talk to the Images API.
pub const MINIMUM_CLIENT_VERSION: &str = "1.2.3";

/// Version of this client, checked against [`MINIMUM_CLIENT_VERSION`].
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default API base, `images/generations` is joined onto it.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1/";

/// Path of the generations endpoint relative to the API base.
pub const GENERATIONS_PATH: &str = "images/generations";

// Subject and style are separated with ". " on purpose; the original
// hardcoded prompt ran the two sentences together.
/// Prompt used when none is given on the command line.
pub const DEFAULT_PROMPT: &str = "Subject: beautiful lady sitting in a wine bar in a green dress. \
     Style: the style of artist Jack Vettriano";

/// Default image model.
pub const DEFAULT_MODEL: &str = "dall-e-2";

/// Default end-user identifier sent with the request.
pub const DEFAULT_USER: &str = "myName";

/// Largest width or height shown in the viewer window.
pub const MAX_DISPLAY_DIMENSION: u32 = 512;

/// `strftime` pattern for the per-run filename stem.
pub const RUN_STEM_FORMAT: &str = "DALLE-%Y%m%d_%H%M%S";

/// Suffix for a base64 image whose name is already taken by a downloaded one.
pub const EMBEDDED_COLLISION_SUFFIX: &str = "_b64";

/// Default number of download attempts per asset URL.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay before the first download retry.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(1000);

/// Redraw rate of the viewer window.
pub const VIEWER_TARGET_FPS: usize = 60;
