use crate::error::GenerationFailure;
use crate::models::snapshot::{InputSnapshot, Style};
use serde::Serialize;
use std::hash::{Hash, Hasher};

/// JSON body of `POST /v1/generations-lcm`. Also the memoization key: two
/// requests are the same call iff every field matches.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub width: u32,
    pub height: u32,
    pub image_data_url: String,
    pub prompt: String,
    pub style: Style,
    pub strength: f64,
}

impl GenerationRequest {
    pub fn from_snapshot(snapshot: &InputSnapshot, image_data_url: String) -> Self {
        Self {
            width: snapshot.width(),
            height: snapshot.height(),
            image_data_url,
            prompt: snapshot.prompt().to_string(),
            style: snapshot.style(),
            strength: snapshot.strength(),
        }
    }
}

impl PartialEq for GenerationRequest {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.image_data_url == other.image_data_url
            && self.prompt == other.prompt
            && self.style == other.style
            && self.strength.to_bits() == other.strength.to_bits()
    }
}

impl Eq for GenerationRequest {}

impl Hash for GenerationRequest {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.width.hash(state);
        self.height.hash(state);
        self.image_data_url.hash(state);
        self.prompt.hash(state);
        self.style.hash(state);
        self.strength.to_bits().hash(state);
    }
}

/// Decoded output of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
}

impl GeneratedImage {
    pub fn decode(&self) -> image::ImageResult<image::DynamicImage> {
        image::load_from_memory(&self.bytes)
    }
}

pub type GenerationResult = std::result::Result<GeneratedImage, GenerationFailure>;
