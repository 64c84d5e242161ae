//! Photo compression and data-URI encoding.
//!
//! Photos are persisted inline as string fields on the content document,
//! not as external blob references, so the store's per-document size
//! ceiling applies to every attachment. Each incoming photo is therefore
//! downscaled and re-encoded as JPEG before being embedded; thumbnails
//! get a separate, much smaller pass.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use crate::error::CoreError;

/// Max pixel width of a stored photo.
pub const PHOTO_MAX_WIDTH: u32 = 800;
/// JPEG quality of a stored photo.
pub const PHOTO_JPEG_QUALITY: u8 = 60;
/// Max pixel width of a thumbnail.
pub const THUMBNAIL_MAX_WIDTH: u32 = 150;
/// JPEG quality of a thumbnail (higher compression).
pub const THUMBNAIL_JPEG_QUALITY: u8 = 50;

const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Compress raw photo bytes and encode the result as a JPEG data URI.
pub fn compress_to_data_uri(bytes: &[u8]) -> Result<String, CoreError> {
    encode(bytes, PHOTO_MAX_WIDTH, PHOTO_JPEG_QUALITY)
}

/// Derive a thumbnail data URI from an already-stored photo data URI.
pub fn thumbnail_from_data_uri(uri: &str) -> Result<String, CoreError> {
    let bytes = decode_payload(uri)?;
    encode(&bytes, THUMBNAIL_MAX_WIDTH, THUMBNAIL_JPEG_QUALITY)
}

/// Whether a stored photo string is an inline data URI (as opposed to a
/// legacy external storage URL, which cannot be decoded locally).
pub fn is_data_uri(s: &str) -> bool {
    s.starts_with("data:")
}

/// Decode an uploaded photo payload: a data URI or bare base64.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, CoreError> {
    let b64 = match payload.split_once(";base64,") {
        Some((_, rest)) => rest,
        None if payload.starts_with("data:") => {
            return Err(CoreError::Validation(
                "Photo data URI is not base64-encoded".into(),
            ));
        }
        None => payload,
    };
    BASE64
        .decode(b64.trim())
        .map_err(|e| CoreError::Validation(format!("Invalid base64 photo payload: {e}")))
}

fn encode(bytes: &[u8], max_width: u32, quality: u8) -> Result<String, CoreError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| CoreError::Validation(format!("Unreadable image: {e}")))?;
    let img = bound_width(img, max_width);

    let mut jpeg = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut jpeg, quality);
    img.to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| CoreError::Internal(format!("JPEG encode failed: {e}")))?;

    Ok(format!("{DATA_URI_PREFIX}{}", BASE64.encode(&jpeg)))
}

/// Downscale to `max_width`, preserving aspect ratio. Narrower images
/// pass through untouched.
fn bound_width(img: DynamicImage, max_width: u32) -> DynamicImage {
    if img.width() <= max_width {
        return img;
    }
    let scale = f64::from(max_width) / f64::from(img.width());
    let height = (f64::from(img.height()) * scale).round().max(1.0) as u32;
    img.resize_exact(max_width, height, FilterType::Triangle)
}
