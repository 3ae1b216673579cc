//! Profile photo loading and circular cropping.

use std::path::Path;
use std::time::Duration;

use base64::Engine;
use image::imageops::FilterType;
use thiserror::Error;

/// Pixels per point of the embedded photo.
const OVERSAMPLE: f32 = 2.0;

#[derive(Error, Debug)]
pub enum PhotoError {
    #[error("malformed data URL")]
    DataUrl,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("could not read photo: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not fetch photo: {0}")]
    Fetch(String),

    #[error("remote photos are not supported by this build")]
    RemoteDisabled,

    #[error("unsupported or corrupt image: {0}")]
    Decode(#[from] image::ImageError),
}

/// A square photo cropped to a circle: RGB samples plus an alpha mask of
/// the same dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct Photo {
    pub pixels: u32,
    pub rgb: Vec<u8>,
    pub alpha: Vec<u8>,
}

/// Read the raw bytes behind a photo reference: a `data:` URL, an http(s)
/// URL or a local path.
pub fn load_source(source: &str, timeout: Duration) -> Result<Vec<u8>, PhotoError> {
    let source = source.trim();
    if source.starts_with("data:") {
        decode_data_url(source)
    } else if source.starts_with("http://") || source.starts_with("https://") {
        fetch(source, timeout)
    } else {
        Ok(std::fs::read(Path::new(source))?)
    }
}

fn decode_data_url(url: &str) -> Result<Vec<u8>, PhotoError> {
    let (header, payload) = url.split_once(',').ok_or(PhotoError::DataUrl)?;
    if !header.ends_with(";base64") {
        return Err(PhotoError::DataUrl);
    }
    let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}

#[cfg(feature = "remote-photo")]
fn fetch(url: &str, timeout: Duration) -> Result<Vec<u8>, PhotoError> {
    let fetch_err = |e: reqwest::Error| PhotoError::Fetch(e.to_string());
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(fetch_err)?;
    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(fetch_err)?;
    Ok(response.bytes().map_err(fetch_err)?.to_vec())
}

#[cfg(not(feature = "remote-photo"))]
fn fetch(_url: &str, _timeout: Duration) -> Result<Vec<u8>, PhotoError> {
    Err(PhotoError::RemoteDisabled)
}

/// Decode, centre-crop to a square, scale to twice `size_pt` and mask to a
/// circle with an anti-aliased edge.
pub fn prepare(bytes: &[u8], size_pt: f32) -> Result<Photo, PhotoError> {
    let decoded = image::load_from_memory(bytes)?;
    let pixels = ((size_pt * OVERSAMPLE).round() as u32).max(1);
    let square = decoded
        .resize_to_fill(pixels, pixels, FilterType::Lanczos3)
        .to_rgb8();

    let radius = pixels as f32 / 2.0;
    let mut alpha = Vec::with_capacity((pixels * pixels) as usize);
    for y in 0..pixels {
        for x in 0..pixels {
            let dx = x as f32 + 0.5 - radius;
            let dy = y as f32 + 0.5 - radius;
            let coverage = (radius - (dx * dx + dy * dy).sqrt() + 0.5).clamp(0.0, 1.0);
            alpha.push((coverage * 255.0).round() as u8);
        }
    }

    Ok(Photo {
        pixels,
        rgb: square.into_raw(),
        alpha,
    })
}

/// Load and prepare in one go.
pub fn load(source: &str, size_pt: f32, timeout: Duration) -> Result<Photo, PhotoError> {
    let bytes = load_source(source, timeout)?;
    log::debug!("photo source read: {} bytes", bytes.len());
    prepare(&bytes, size_pt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(w, h, image::Rgb([200, 40, 40]));
        let mut out = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn data_url_photo_is_cropped_to_a_circle() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(png_bytes(64, 40));
        let url = format!("data:image/png;base64,{encoded}");
        let photo = load(&url, 20.0, Duration::from_secs(1)).unwrap();
        assert_eq!(photo.pixels, 40);
        assert_eq!(photo.rgb.len(), 40 * 40 * 3);
        assert_eq!(photo.alpha.len(), 40 * 40);
        assert_eq!(photo.alpha[0], 0);
        assert_eq!(photo.alpha[20 * 40 + 20], 255);
        let expected = [200u8, 40, 40];
        assert!(photo.rgb[..3].iter().zip(expected).all(|(a, b)| a.abs_diff(b) <= 1));
    }

    #[test]
    fn malformed_data_url_is_rejected() {
        assert!(matches!(
            load_source("data:image/png,abc", Duration::from_secs(1)),
            Err(PhotoError::DataUrl)
        ));
        assert!(matches!(
            load_source("data:image/png;base64,@@@", Duration::from_secs(1)),
            Err(PhotoError::Base64(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_source("/nonexistent/photo.jpg", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, PhotoError::Io(_)));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(prepare(b"not an image", 10.0), Err(PhotoError::Decode(_))));
    }
}
