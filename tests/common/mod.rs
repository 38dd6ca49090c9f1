//! In-process stand-in for the Images API and the asset host.
#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use base64::Engine;
use base64::engine::general_purpose;
use dalle_viewer::client::{ClientSettings, OpenAiClient};
use dalle_viewer::error::ViewerError;
use dalle_viewer::models::{GenerationRequest, ImageSize, StoredImage};
use dalle_viewer::viewer::{ImageDisplay, thumbnail_for_display};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::{Value, json};

pub const API_KEY: &str = "sk-test";
pub const CREATED: i64 = 1_700_000_000;
pub const STEM: &str = "DALLE-20231114_221320";

pub const RED: Rgb<u8> = Rgb([200, 10, 10]);
pub const BLUE: Rgb<u8> = Rgb([10, 10, 200]);

/// A solid-colour PNG.
pub fn png_bytes(width: u32, height: u32, colour: Rgb<u8>) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, colour))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode png");
    bytes
}

pub fn blue_payload() -> String {
    general_purpose::STANDARD.encode(png_bytes(4, 2, BLUE))
}

/// One entry of the fake `data` array. `url` is a path on the fake server.
#[derive(Clone, Debug, Default)]
pub struct AssetSpec {
    pub url: Option<&'static str>,
    pub b64_json: Option<String>,
    pub revised_prompt: Option<&'static str>,
}

#[derive(Clone, Debug)]
pub enum GenerationReply {
    Assets(Vec<AssetSpec>),
    Error(StatusCode, String),
    Raw(String),
}

pub struct FakeApi {
    pub base: String,
    reply: GenerationReply,
    flaky_failures: AtomicUsize,
    pub image_hits: AtomicUsize,
    pub generation_hits: AtomicUsize,
    pub last_request: Mutex<Option<Value>>,
}

impl FakeApi {
    pub fn api_base(&self) -> String {
        format!("{}/v1", self.base)
    }

    pub fn client(&self) -> OpenAiClient {
        let settings = ClientSettings {
            api_base: self.api_base(),
            ..ClientSettings::new(API_KEY)
        };
        OpenAiClient::new(&settings).expect("build client")
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

/// Starts the fake server. `/images/flaky.png` answers 503 `flaky_failures` times first.
pub async fn spawn_fake_api(reply: GenerationReply, flaky_failures: usize) -> Arc<FakeApi> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake api");
    let addr = listener.local_addr().expect("local addr");

    let state = Arc::new(FakeApi {
        base: format!("http://{addr}"),
        reply,
        flaky_failures: AtomicUsize::new(flaky_failures),
        image_hits: AtomicUsize::new(0),
        generation_hits: AtomicUsize::new(0),
        last_request: Mutex::new(None),
    });

    let app = Router::new()
        .route("/v1/images/generations", post(generations_handler))
        .route("/images/{name}", get(image_handler))
        .with_state(state.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve fake api");
    });

    state
}

async fn generations_handler(
    State(state): State<Arc<FakeApi>>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    state.generation_hits.fetch_add(1, Ordering::SeqCst);
    *state.last_request.lock().expect("lock last request") = Some(body);

    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value == format!("Bearer {API_KEY}"))
        .unwrap_or(false);
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            axum::Json(json!({"error": {"message": "Incorrect API key provided"}})),
        )
            .into_response();
    }

    match &state.reply {
        GenerationReply::Assets(assets) => {
            let data: Vec<Value> = assets
                .iter()
                .map(|asset| {
                    json!({
                        "url": asset.url.map(|path| state.url(path)),
                        "b64_json": asset.b64_json,
                        "revised_prompt": asset.revised_prompt,
                    })
                })
                .collect();
            axum::Json(json!({"created": CREATED, "data": data})).into_response()
        }
        GenerationReply::Error(status, message) => (
            *status,
            axum::Json(json!({"error": {"message": message, "type": "invalid_request_error"}})),
        )
            .into_response(),
        GenerationReply::Raw(body) => (StatusCode::OK, body.clone()).into_response(),
    }
}

async fn image_handler(State(state): State<Arc<FakeApi>>, Path(name): Path<String>) -> Response {
    state.image_hits.fetch_add(1, Ordering::SeqCst);
    match name.as_str() {
        "red.png" => png_response(png_bytes(4, 2, RED)),
        "large.png" => png_response(png_bytes(2048, 1024, RED)),
        "flaky.png" => {
            let remaining = state.flaky_failures.load(Ordering::SeqCst);
            if remaining > 0 {
                state.flaky_failures.store(remaining - 1, Ordering::SeqCst);
                StatusCode::SERVICE_UNAVAILABLE.into_response()
            } else {
                png_response(png_bytes(4, 2, RED))
            }
        }
        "broken.png" => png_response(b"This is not a PNG file.".to_vec()),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

fn png_response(bytes: Vec<u8>) -> Response {
    ([(CONTENT_TYPE, "image/png")], bytes).into_response()
}

pub fn request(count: u8) -> GenerationRequest {
    GenerationRequest {
        model: "dall-e-2".to_string(),
        count,
        size: ImageSize::Large,
        prompt: "a goat wearing a teapot".to_string(),
        user: "tester".to_string(),
        response_format: None,
    }
}

/// What a viewer was asked to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shown {
    pub index: usize,
    pub file_name: String,
    pub size: (u32, u32),
    pub colour: Rgb<u8>,
}

/// Records display calls instead of opening windows.
#[derive(Debug, Default)]
pub struct RecordingViewer {
    pub shown: Vec<Shown>,
    pub fail_on: Option<usize>,
}

impl ImageDisplay for RecordingViewer {
    fn display_image(&mut self, image: &StoredImage, index: usize) -> Result<(), ViewerError> {
        if self.fail_on == Some(index) {
            return Err(ViewerError::Window("no display".to_string()));
        }
        let thumb = thumbnail_for_display(&image.image);
        self.shown.push(Shown {
            index,
            file_name: image
                .path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default()
                .to_string(),
            size: (thumb.width(), thumb.height()),
            colour: *image.image.to_rgb8().get_pixel(0, 0),
        });
        Ok(())
    }
}
