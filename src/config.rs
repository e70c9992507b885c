use crate::error::{Result, SketchError};
use crate::models::{CanvasSettings, HexColor, Style};
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://cloud.leonardo.ai/api/rest";
pub const DEFAULT_JOB_FIELD: &str = "lcmGenerationJob";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const QUICK_COLORS: [HexColor; 8] = [
    HexColor::rgb(0x00, 0x00, 0x00),
    HexColor::rgb(0xFF, 0x00, 0x00),
    HexColor::rgb(0x00, 0xFF, 0x00),
    HexColor::rgb(0x00, 0x00, 0xFF),
    HexColor::rgb(0xFF, 0xFF, 0x00),
    HexColor::rgb(0xFF, 0x00, 0xFF),
    HexColor::rgb(0x00, 0xFF, 0xFF),
    HexColor::rgb(0xFF, 0xFF, 0xFF),
];

#[derive(Debug, Clone)]
pub struct LeonardoConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
    /// Top-level response field holding `imageDataUrl`.
    pub job_field: String,
}

impl Default for LeonardoConfig {
    fn default() -> Self {
        LeonardoConfig {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            job_field: DEFAULT_JOB_FIELD.to_string(),
        }
    }
}

impl LeonardoConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_key = env::var("LEONARDO_API_KEY").ok().filter(|k| !k.is_empty());
        let base_url = env::var("LEONARDO_BASE_URL").unwrap_or(defaults.base_url);
        let timeout = env::var("LEONARDO_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        let job_field = env::var("LEONARDO_JOB_FIELD").unwrap_or(defaults.job_field);

        LeonardoConfig {
            api_key,
            base_url,
            timeout,
            job_field,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_job_field(mut self, job_field: impl Into<String>) -> Self {
        self.job_field = job_field.into();
        self
    }

    pub fn generations_url(&self) -> String {
        format!("{}/v1/generations-lcm", self.base_url.trim_end_matches('/'))
    }

    pub(crate) fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| SketchError::ConfigError("LEONARDO_API_KEY is required".into()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub background: HexColor,
    pub surface: HexColor,
    pub text: HexColor,
    pub accent: HexColor,
}

impl Theme {
    pub fn palette(&self) -> Palette {
        match self {
            Theme::Light => Palette {
                background: HexColor::WHITE,
                surface: HexColor::rgb(0xF0, 0xF2, 0xF6),
                text: HexColor::rgb(0x31, 0x33, 0x3F),
                accent: HexColor::rgb(0xFF, 0x4B, 0x4B),
            },
            Theme::Dark => Palette {
                background: HexColor::rgb(0x12, 0x12, 0x12),
                surface: HexColor::rgb(0x2D, 0x2D, 0x2D),
                text: HexColor::rgb(0xE0, 0xE0, 0xE0),
                accent: HexColor::rgb(0xBB, 0x86, 0xFC),
            },
        }
    }
}

/// Presentation profile. One application, three looks.
#[derive(Debug, Clone, PartialEq)]
pub struct AppProfile {
    pub name: &'static str,
    pub page_title: String,
    pub theme: Theme,
    pub styles: Vec<Style>,
    pub quick_colors: Vec<HexColor>,
}

impl AppProfile {
    /// Plain stroke-colour picker and a short style list.
    pub fn classic() -> Self {
        Self {
            name: "classic",
            page_title: "Leonardo AI Image Generator".to_string(),
            theme: Theme::Light,
            styles: vec![Style::Cinematic, Style::Dynamic, Style::Creative],
            quick_colors: Vec::new(),
        }
    }

    pub fn quick_pick() -> Self {
        Self {
            name: "quick_pick",
            page_title: "Leonardo AI Image Generator".to_string(),
            theme: Theme::Light,
            styles: Style::ALL
                .into_iter()
                .filter(|s| *s != Style::Creative)
                .collect(),
            quick_colors: QUICK_COLORS.to_vec(),
        }
    }

    pub fn dark() -> Self {
        Self {
            name: "dark",
            theme: Theme::Dark,
            ..Self::quick_pick()
        }
    }

    pub fn by_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(Self::classic()),
            "quick_pick" | "quick-pick" => Ok(Self::quick_pick()),
            "dark" => Ok(Self::dark()),
            other => Err(SketchError::ConfigError(format!(
                "unknown profile '{}', expected classic, quick_pick or dark",
                other
            ))),
        }
    }

    pub fn quick_pick_enabled(&self) -> bool {
        !self.quick_colors.is_empty()
    }

    pub fn default_style(&self) -> Style {
        if self.styles.contains(&Style::default()) {
            Style::default()
        } else {
            self.styles.first().copied().unwrap_or_default()
        }
    }
}

impl Default for AppProfile {
    fn default() -> Self {
        Self::quick_pick()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub leonardo: LeonardoConfig,
    pub profile: AppProfile,
    pub canvas: CanvasSettings,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            leonardo: LeonardoConfig::default(),
            profile: AppProfile::default(),
            canvas: CanvasSettings::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self> {
        let profile = match env::var("SKETCHGEN_PROFILE") {
            Ok(name) => AppProfile::by_name(&name)?,
            Err(_) => AppProfile::default(),
        };

        Ok(Config {
            leonardo: LeonardoConfig::from_env(),
            profile,
            canvas: canvas_from_lookup(|key| env::var(key).ok())?,
        })
    }

    pub fn with_leonardo(mut self, config: LeonardoConfig) -> Self {
        self.leonardo = config;
        self
    }

    pub fn with_profile(mut self, profile: AppProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_canvas(mut self, canvas: CanvasSettings) -> Self {
        self.canvas = canvas;
        self
    }
}

/// Drawing surface defaults from `SKETCHGEN_CANVAS_SIZE`, `SKETCHGEN_DRAWING_MODE`,
/// `SKETCHGEN_STROKE_WIDTH`, `SKETCHGEN_STROKE_COLOR` and `SKETCHGEN_BACKGROUND`.
/// Unset or empty keys keep the default; malformed values are config errors.
fn canvas_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<CanvasSettings> {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    let invalid = |key: &str, err: SketchError| SketchError::ConfigError(format!("{}: {}", key, err));
    let mut canvas = CanvasSettings::new();

    if let Some(raw) = get("SKETCHGEN_CANVAS_SIZE") {
        canvas = canvas.with_size(raw.parse().map_err(|e| invalid("SKETCHGEN_CANVAS_SIZE", e))?);
    }
    if let Some(raw) = get("SKETCHGEN_DRAWING_MODE") {
        canvas = canvas
            .with_drawing_mode(raw.parse().map_err(|e| invalid("SKETCHGEN_DRAWING_MODE", e))?);
    }
    if let Some(raw) = get("SKETCHGEN_STROKE_WIDTH") {
        let width: u32 = raw.trim().parse().map_err(|_| {
            SketchError::ConfigError(format!("SKETCHGEN_STROKE_WIDTH: '{}' is not a number", raw))
        })?;
        canvas = canvas.with_stroke_width(width);
    }
    if let Some(raw) = get("SKETCHGEN_STROKE_COLOR") {
        canvas = canvas
            .with_stroke_color(raw.parse().map_err(|e| invalid("SKETCHGEN_STROKE_COLOR", e))?);
    }
    if let Some(raw) = get("SKETCHGEN_BACKGROUND") {
        canvas =
            canvas.with_background(raw.parse().map_err(|e| invalid("SKETCHGEN_BACKGROUND", e))?);
    }
    Ok(canvas)
}
