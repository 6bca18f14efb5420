//! Saving captured frames to disk.

use std::path::Path;

use image::{ImageBuffer, Rgba};

/// Saves tightly packed RGBA8 pixel data to an image file.
///
/// The format follows the file extension: `.png`, `.jpg` or `.jpeg`.
pub fn save_image(
    path: impl AsRef<Path>,
    data: &[u8],
    width: u32,
    height: u32,
) -> Result<(), ScreenshotError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_raw(width, height, data.to_vec())
        .ok_or(ScreenshotError::InvalidImageData)?;

    match extension.as_str() {
        "png" => {
            img.save_with_format(path, image::ImageFormat::Png)?;
        }
        "jpg" | "jpeg" => {
            // JPEG has no alpha channel
            let rgb_img = image::DynamicImage::ImageRgba8(img).to_rgb8();
            rgb_img.save_with_format(path, image::ImageFormat::Jpeg)?;
        }
        _ => {
            return Err(ScreenshotError::UnsupportedFormat(extension));
        }
    }

    log::info!("saved {width}x{height} image to {}", path.display());
    Ok(())
}

/// Error type for screenshot operations.
#[derive(Debug, thiserror::Error)]
pub enum ScreenshotError {
    #[error("failed to save image: {0}")]
    IoError(#[from] std::io::Error),

    #[error("image encoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("unsupported image format: '{0}'")]
    UnsupportedFormat(String),

    #[error("pixel data does not match the image size")]
    InvalidImageData,
}
