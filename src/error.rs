//! Error handling

use std::fmt;
use std::path::PathBuf;

/// Problems found before any request is made.
#[derive(Debug)]
pub enum ConfigurationError {
    /// `OPENAI_API_KEY` was empty or missing
    MissingApiKey,
    /// The client is older than the minimum supported version
    UnsupportedVersion {
        /// Version of this client
        installed: String,
        /// Oldest accepted version
        minimum: String,
    },
    /// A version string had a part that isn't an integer
    InvalidVersion(String),
    /// The API base URL couldn't be used
    InvalidBaseUrl(String),
    /// The HTTP client couldn't be built
    HttpClient(reqwest::Error),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => {
                write!(f, "No API key found, set OPENAI_API_KEY in the environment")
            }
            Self::UnsupportedVersion { installed, minimum } => write!(
                f,
                "Client version {installed} is less than the minimum version {minimum}, \
                 upgrade dalle-viewer"
            ),
            Self::InvalidVersion(version) => write!(f, "Invalid version string: {version}"),
            Self::InvalidBaseUrl(message) => write!(f, "Invalid API base URL: {message}"),
            Self::HttpClient(err) => write!(f, "Failed to build HTTP client: {err}"),
        }
    }
}

impl std::error::Error for ConfigurationError {}

impl From<url::ParseError> for ConfigurationError {
    fn from(err: url::ParseError) -> Self {
        ConfigurationError::InvalidBaseUrl(err.to_string())
    }
}

impl From<reqwest::Error> for ConfigurationError {
    fn from(err: reqwest::Error) -> Self {
        ConfigurationError::HttpClient(err)
    }
}

/// What went wrong talking to the Images API.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RemoteErrorKind {
    /// Couldn't reach the server
    Connection,
    /// HTTP 429
    RateLimited,
    /// HTTP 400
    BadRequest,
    /// Any other non-success status
    Status,
    /// A success status with a body we can't use
    InvalidResponse,
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Connection => "Server connection error",
            Self::RateLimited => "OpenAI RATE LIMIT error",
            Self::BadRequest => "OpenAI BAD REQUEST error",
            Self::Status => "OpenAI STATUS error",
            Self::InvalidResponse => "OpenAI invalid response",
        };
        f.write_str(label)
    }
}

/// Failure of the image generation call.
#[derive(Debug)]
pub struct RemoteServiceError {
    /// Category of the failure
    pub kind: RemoteErrorKind,
    /// HTTP status, when a response was received
    pub status: Option<u16>,
    /// Response body or transport error text
    pub body: String,
}

impl RemoteServiceError {
    /// Builds an error without an HTTP status.
    pub fn without_status(kind: RemoteErrorKind, body: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            body: body.into(),
        }
    }
}

impl fmt::Display for RemoteServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} {}: {}", self.kind, status, self.body),
            None => write!(f, "{}: {}", self.kind, self.body),
        }
    }
}

impl std::error::Error for RemoteServiceError {}

/// Failure fetching a single asset URL.
#[derive(Debug)]
pub enum DownloadError {
    /// The request never got a response
    Transport {
        /// Asset URL
        url: String,
        /// Underlying error
        source: reqwest::Error,
    },
    /// Every attempt came back with a non-success status
    Status {
        /// Asset URL
        url: String,
        /// Status of the last attempt
        status: u16,
        /// Number of attempts made
        attempts: u32,
    },
    /// The body wasn't an image we can read
    Decode {
        /// Asset URL
        url: String,
        /// Underlying error
        source: image::ImageError,
    },
    /// Writing the PNG failed
    Save {
        /// Target file
        path: PathBuf,
        /// Underlying error
        source: image::ImageError,
    },
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { url, source } => {
                write!(f, "Failed to download image from {url}: {source}")
            }
            Self::Status {
                url,
                status,
                attempts,
            } => write!(
                f,
                "Failed to download image from {url}. Error: {status} after {attempts} attempt(s)"
            ),
            Self::Decode { url, source } => {
                write!(f, "Image from {url} could not be decoded: {source}")
            }
            Self::Save { path, source } => {
                write!(f, "Failed to save {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for DownloadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport { source, .. } => Some(source),
            Self::Status { .. } => None,
            Self::Decode { source, .. } | Self::Save { source, .. } => Some(source),
        }
    }
}

/// Failure turning an embedded payload into a saved image.
#[derive(Debug)]
pub enum DecodeError {
    /// The payload isn't valid base64
    Base64(base64::DecodeError),
    /// The decoded bytes aren't an image
    Image(image::ImageError),
    /// Writing the PNG failed
    Save(PathBuf, image::ImageError),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base64(err) => write!(f, "Invalid base64 image data: {err}"),
            Self::Image(err) => write!(f, "Invalid image data: {err}"),
            Self::Save(path, err) => write!(f, "Failed to save {}: {err}", path.display()),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<base64::DecodeError> for DecodeError {
    fn from(err: base64::DecodeError) -> Self {
        DecodeError::Base64(err)
    }
}

impl From<image::ImageError> for DecodeError {
    fn from(err: image::ImageError) -> Self {
        DecodeError::Image(err)
    }
}

/// Failure showing an image.
#[derive(Debug)]
pub enum ViewerError {
    /// The window couldn't be created or updated
    Window(String),
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Window(message) => write!(f, "Viewer window error: {message}"),
        }
    }
}

impl std::error::Error for ViewerError {}

impl From<minifb::Error> for ViewerError {
    fn from(err: minifb::Error) -> Self {
        ViewerError::Window(err.to_string())
    }
}
