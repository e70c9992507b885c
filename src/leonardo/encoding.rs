use crate::error::{GenerationFailure, Result, SketchError};
use crate::models::{GeneratedImage, HexColor};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use std::io::Cursor;

pub const CANVAS_MIME: &str = "image/jpeg";

/// Composites the canvas onto an opaque background and drops alpha.
pub fn flatten(canvas: &RgbaImage, background: HexColor) -> RgbImage {
    let [br, bg, bb] = background.channels();
    RgbImage::from_fn(canvas.width(), canvas.height(), |x, y| {
        let [r, g, b, a] = canvas.get_pixel(x, y).0;
        let blend = |fg: u8, bgc: u8| -> u8 {
            let alpha = a as u32;
            ((fg as u32 * alpha + bgc as u32 * (255 - alpha) + 127) / 255) as u8
        };
        image::Rgb([blend(r, br), blend(g, bg), blend(b, bb)])
    })
}

/// Flattens and JPEG-encodes the canvas into a `data:` URI.
pub fn canvas_to_data_url(canvas: &RgbaImage, background: HexColor) -> Result<String> {
    let rgb = DynamicImage::ImageRgb8(flatten(canvas, background));
    let mut buf = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .map_err(|e| SketchError::EncodingError(e.to_string()))?;
    Ok(to_data_url(CANVAS_MIME, &buf))
}

pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Splits a `data:<mime>;base64,<payload>` string and decodes the payload.
pub fn parse_data_url(value: &str) -> std::result::Result<(String, Vec<u8>), GenerationFailure> {
    let (meta, payload) = value
        .trim()
        .split_once(',')
        .ok_or_else(|| GenerationFailure::MalformedResponse("image is not a data URL".into()))?;
    let mime = meta
        .strip_prefix("data:")
        .and_then(|rest| rest.split(';').next())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or("image/png")
        .to_string();
    let bytes = BASE64
        .decode(payload.trim().as_bytes())
        .map_err(|e| GenerationFailure::MalformedResponse(format!("bad base64 payload: {}", e)))?;
    Ok((mime, bytes))
}

/// Turns the service's data URI into a displayable image, checking that the
/// bytes really decode.
pub fn decode_generated(value: &str) -> std::result::Result<GeneratedImage, GenerationFailure> {
    let (mime_type, bytes) = parse_data_url(value)?;
    let decoded = image::load_from_memory(&bytes).map_err(|e| {
        GenerationFailure::MalformedResponse(format!("generated image does not decode: {}", e))
    })?;
    Ok(GeneratedImage {
        width: decoded.width(),
        height: decoded.height(),
        bytes,
        mime_type,
    })
}
