//! Shows saved images in a minimal window, one at a time.

use image::DynamicImage;
use minifb::{Key, Window, WindowOptions};
use tracing::{debug, info};

use crate::constants::{MAX_DISPLAY_DIMENSION, VIEWER_TARGET_FPS};
use crate::error::ViewerError;
use crate::models::StoredImage;

/// Something that can present an image to the user.
pub trait ImageDisplay {
    /// Shows `image`, returning once the user is done with it.
    fn display_image(&mut self, image: &StoredImage, index: usize) -> Result<(), ViewerError>;
}

/// Downscales so neither side exceeds the display limit, keeping the aspect ratio.
pub fn thumbnail_for_display(image: &DynamicImage) -> DynamicImage {
    if image.width() > MAX_DISPLAY_DIMENSION || image.height() > MAX_DISPLAY_DIMENSION {
        image.thumbnail(MAX_DISPLAY_DIMENSION, MAX_DISPLAY_DIMENSION)
    } else {
        image.clone()
    }
}

/// Packs pixels as `0RGB` words, the layout minifb draws.
pub fn to_framebuffer(image: &DynamicImage) -> Vec<u32> {
    image
        .to_rgb8()
        .pixels()
        .map(|pixel| {
            let [r, g, b] = pixel.0;
            (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
        })
        .collect()
}

/// Opens a native window per image and blocks until it is closed.
#[derive(Debug, Default)]
pub struct WindowViewer;

impl ImageDisplay for WindowViewer {
    fn display_image(&mut self, image: &StoredImage, index: usize) -> Result<(), ViewerError> {
        let shown = thumbnail_for_display(&image.image);
        let width = shown.width() as usize;
        let height = shown.height() as usize;
        let buffer = to_framebuffer(&shown);

        let mut window = Window::new(
            &format!("Image {index}"),
            width,
            height,
            WindowOptions::default(),
        )?;
        window.set_target_fps(VIEWER_TARGET_FPS);
        debug!(
            "Showing {} at {width}x{height} in window {index}",
            image.path.display()
        );

        while window.is_open() && !window.is_key_down(Key::Escape) {
            window.update_with_buffer(&buffer, width, height)?;
        }
        Ok(())
    }
}

/// Logs instead of opening windows, for `--no-display` runs.
#[derive(Debug, Default)]
pub struct HeadlessViewer;

impl ImageDisplay for HeadlessViewer {
    fn display_image(&mut self, image: &StoredImage, index: usize) -> Result<(), ViewerError> {
        let shown = thumbnail_for_display(&image.image);
        info!(
            "Image {index}: {} ({}x{})",
            image.path.display(),
            shown.width(),
            shown.height()
        );
        Ok(())
    }
}
