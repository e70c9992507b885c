use crate::error::{Result, SketchError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_STRENGTH: f64 = 0.65;

/// Drawing log reported by the drawing surface. Opaque to this crate;
/// compared structurally, so stroke order matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanvasState(Value);

impl CanvasState {
    pub fn new(log: Value) -> Self {
        Self(log)
    }

    /// A canvas with no strokes.
    pub fn empty() -> Self {
        Self(json!({ "objects": [] }))
    }

    pub fn stroke_count(&self) -> usize {
        self.0
            .get("objects")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Style {
    Anime,
    #[default]
    Cinematic,
    ConceptArt,
    Creative,
    Dynamic,
    Environment,
    FantasyArt,
    Painting,
    Photography,
    Product,
    Raytraced,
    SketchBw,
    SketchColor,
    Vibrant,
    None,
}

impl Style {
    pub const ALL: [Style; 15] = [
        Style::Anime,
        Style::Cinematic,
        Style::ConceptArt,
        Style::Creative,
        Style::Dynamic,
        Style::Environment,
        Style::FantasyArt,
        Style::Painting,
        Style::Photography,
        Style::Product,
        Style::Raytraced,
        Style::SketchBw,
        Style::SketchColor,
        Style::Vibrant,
        Style::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Anime => "ANIME",
            Style::Cinematic => "CINEMATIC",
            Style::ConceptArt => "CONCEPT_ART",
            Style::Creative => "CREATIVE",
            Style::Dynamic => "DYNAMIC",
            Style::Environment => "ENVIRONMENT",
            Style::FantasyArt => "FANTASY_ART",
            Style::Painting => "PAINTING",
            Style::Photography => "PHOTOGRAPHY",
            Style::Product => "PRODUCT",
            Style::Raytraced => "RAYTRACED",
            Style::SketchBw => "SKETCH_BW",
            Style::SketchColor => "SKETCH_COLOR",
            Style::Vibrant => "VIBRANT",
            Style::None => "NONE",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Style {
    type Err = SketchError;

    fn from_str(s: &str) -> Result<Self> {
        Style::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SketchError::InvalidInput(format!("unknown style '{}'", s)))
    }
}

/// Everything the user controls that feeds a generation, captured at one
/// instant. Two snapshots are equal iff every field is equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    canvas_state: CanvasState,
    prompt: String,
    style: Style,
    strength: f64,
    width: u32,
    height: u32,
}

impl InputSnapshot {
    pub fn new(
        canvas_state: CanvasState,
        prompt: impl Into<String>,
        style: Style,
        strength: f64,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&strength) {
            return Err(SketchError::InvalidInput(format!(
                "strength must be within [0.0, 1.0], got {}",
                strength
            )));
        }
        if width == 0 || height == 0 {
            return Err(SketchError::InvalidInput(format!(
                "canvas dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            canvas_state,
            prompt: prompt.into(),
            style,
            strength,
            width,
            height,
        })
    }

    pub fn canvas_state(&self) -> &CanvasState {
        &self.canvas_state
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}
