use crate::error::{Result, SketchError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_STROKE_WIDTH: u32 = 3;
pub const STROKE_WIDTH_RANGE: (u32, u32) = (1, 25);
pub const DEFAULT_FILL_COLOR: &str = "rgba(255, 165, 0, 0.3)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const OPTIONS: [CanvasSize; 7] = [
        CanvasSize::new(512, 512),
        CanvasSize::new(768, 768),
        CanvasSize::new(1024, 1024),
        CanvasSize::new(512, 768),
        CanvasSize::new(768, 512),
        CanvasSize::new(1024, 768),
        CanvasSize::new(768, 1024),
    ];

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::OPTIONS[0]
    }
}

impl fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for CanvasSize {
    type Err = SketchError;

    fn from_str(s: &str) -> Result<Self> {
        let (w, h) = s
            .trim()
            .split_once('x')
            .ok_or_else(|| SketchError::InvalidInput(format!("canvas size '{}' is not WxH", s)))?;
        let width: u32 = w
            .parse()
            .map_err(|_| SketchError::InvalidInput(format!("bad canvas width '{}'", w)))?;
        let height: u32 = h
            .parse()
            .map_err(|_| SketchError::InvalidInput(format!("bad canvas height '{}'", h)))?;
        if width == 0 || height == 0 {
            return Err(SketchError::InvalidInput(format!(
                "canvas size must be positive, got {}",
                s
            )));
        }
        Ok(Self { width, height })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawingMode {
    #[default]
    Freedraw,
    Line,
    Rect,
    Circle,
    Transform,
}

impl DrawingMode {
    pub const ALL: [DrawingMode; 5] = [
        DrawingMode::Freedraw,
        DrawingMode::Line,
        DrawingMode::Rect,
        DrawingMode::Circle,
        DrawingMode::Transform,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DrawingMode::Freedraw => "freedraw",
            DrawingMode::Line => "line",
            DrawingMode::Rect => "rect",
            DrawingMode::Circle => "circle",
            DrawingMode::Transform => "transform",
        }
    }
}

impl FromStr for DrawingMode {
    type Err = SketchError;

    fn from_str(s: &str) -> Result<Self> {
        DrawingMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SketchError::InvalidInput(format!("unknown drawing tool '{}'", s)))
    }
}

/// `#RRGGBB` colour as produced by the colour pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor([u8; 3]);

impl HexColor {
    pub const BLACK: HexColor = HexColor([0, 0, 0]);
    pub const WHITE: HexColor = HexColor([255, 255, 255]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    pub fn channels(&self) -> [u8; 3] {
        self.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{:02X}{:02X}{:02X}", r, g, b)
    }
}

impl FromStr for HexColor {
    type Err = SketchError;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || SketchError::InvalidInput(format!("'{}' is not a #RRGGBB colour", s));
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl Serialize for HexColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Configuration handed to the drawing surface. Changing `key` resets it to
/// a blank canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasSettings {
    pub size: CanvasSize,
    pub drawing_mode: DrawingMode,
    pub stroke_width: u32,
    pub stroke_color: HexColor,
    pub background_color: HexColor,
    pub fill_color: String,
    pub key: String,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            size: CanvasSize::default(),
            drawing_mode: DrawingMode::default(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            stroke_color: HexColor::BLACK,
            background_color: HexColor::WHITE,
            fill_color: DEFAULT_FILL_COLOR.to_string(),
            key: "canvas_0".to_string(),
        }
    }
}

impl CanvasSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, size: CanvasSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_drawing_mode(mut self, mode: DrawingMode) -> Self {
        self.drawing_mode = mode;
        self
    }

    /// Clamped to the slider range.
    pub fn with_stroke_width(mut self, width: u32) -> Self {
        self.stroke_width = width.clamp(STROKE_WIDTH_RANGE.0, STROKE_WIDTH_RANGE.1);
        self
    }

    pub fn with_background(mut self, color: HexColor) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_stroke_color(mut self, color: HexColor) -> Self {
        self.stroke_color = color;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_size_parsing() {
        let size: CanvasSize = "1024x768".parse().unwrap();
        assert_eq!(size, CanvasSize::new(1024, 768));
        assert_eq!(size.to_string(), "1024x768");
        assert!("0x512".parse::<CanvasSize>().is_err());
        assert!("512".parse::<CanvasSize>().is_err());
        for option in CanvasSize::OPTIONS {
            assert_eq!(option.to_string().parse::<CanvasSize>().unwrap(), option);
        }
    }

    #[test]
    fn test_hex_color() {
        let color: HexColor = "#ff00Aa".parse().unwrap();
        assert_eq!(color.channels(), [255, 0, 170]);
        assert_eq!(color.to_string(), "#FF00AA");
        assert!("#fff".parse::<HexColor>().is_err());
        assert!("#gg0000".parse::<HexColor>().is_err());
        assert!("#+f0000".parse::<HexColor>().is_err());

        let json = serde_json::to_string(&HexColor::WHITE).unwrap();
        assert_eq!(json, "\"#FFFFFF\"");
    }

    #[test]
    fn test_drawing_mode_and_stroke_width() {
        assert_eq!("rect".parse::<DrawingMode>().unwrap(), DrawingMode::Rect);
        assert!("spray".parse::<DrawingMode>().is_err());

        let settings = CanvasSettings::new().with_stroke_width(90);
        assert_eq!(settings.stroke_width, 25);
        let settings = settings.with_stroke_width(0);
        assert_eq!(settings.stroke_width, 1);
    }
}
