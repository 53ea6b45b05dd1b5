//! Decoding of the drawing payload attached to each signature

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Payload is empty")]
    Empty,
    #[error("Data URL is not base64 encoded")]
    NotBase64,
    #[error("Invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Invalid image: {0}")]
    Image(#[from] image::ImageError),
}

/// Base64 body of a `data:<mime>;base64,<body>` URL, or the input itself
/// when it carries no `data:` header
fn base64_body(data: &str) -> Result<&str, PayloadError> {
    let data = data.trim();
    let body = match data.strip_prefix("data:") {
        Some(rest) => {
            let (header, body) = rest.split_once(',').ok_or(PayloadError::NotBase64)?;
            if !header.ends_with(";base64") {
                return Err(PayloadError::NotBase64);
            }
            body
        }
        None => data,
    };
    if body.is_empty() {
        return Err(PayloadError::Empty);
    }
    Ok(body)
}

/// True when the payload carries no drawing at all
pub fn is_empty_drawing(data: &str) -> bool {
    matches!(base64_body(data), Err(PayloadError::Empty))
}

/// Decode a drawing payload into an RGBA image
pub fn decode_drawing(data: &str) -> Result<RgbaImage, PayloadError> {
    let bytes = STANDARD.decode(base64_body(data)?)?;
    Ok(image::load_from_memory(&bytes)?.to_rgba8())
}

/// Decode and scale a drawing to exactly `width` x `height`
pub fn decode_drawing_scaled(data: &str, width: u32, height: u32) -> Result<RgbaImage, PayloadError> {
    let image = decode_drawing(data)?;
    if image.dimensions() == (width, height) {
        return Ok(image);
    }
    Ok(imageops::resize(&image, width.max(1), height.max(1), FilterType::Triangle))
}
