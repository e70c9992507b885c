use crate::{
    config::AppProfile,
    detector::SessionState,
    error::{Result, SketchError},
    leonardo::ImageGenerator,
    models::{
        CanvasSettings, CanvasSize, CanvasState, DrawingMode, GenerationResult, HexColor,
        InputSnapshot, Style, DEFAULT_STRENGTH,
    },
};
use image::RgbaImage;
use uuid::Uuid;

/// What the drawing surface reports on each interaction. Either part may be
/// missing while the surface is still initialising.
#[derive(Debug, Clone, Default)]
pub struct CanvasFrame {
    pub image_data: Option<RgbaImage>,
    pub json_data: Option<CanvasState>,
}

impl CanvasFrame {
    pub fn new(image_data: RgbaImage, json_data: CanvasState) -> Self {
        Self {
            image_data: Some(image_data),
            json_data: Some(json_data),
        }
    }
}

/// Generation controls from the sidebar.
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    pub prompt: String,
    pub style: Style,
    pub strength: f64,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            style: Style::default(),
            strength: DEFAULT_STRENGTH,
        }
    }
}

impl Controls {
    pub fn new(prompt: impl Into<String>, style: Style, strength: f64) -> Self {
        Self {
            prompt: prompt.into(),
            style,
            strength,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The surface had no bitmap or drawing log yet.
    NotReady,
    /// Same inputs as the last generation.
    Unchanged,
    Generated(GenerationResult),
}

/// One user's sketch session: the event handler that runs on every UI
/// update and decides whether to call the generator.
pub struct SketchSession<G> {
    id: Uuid,
    state: SessionState,
    profile: AppProfile,
    settings: CanvasSettings,
    generator: G,
    last_result: Option<GenerationResult>,
}

impl<G: ImageGenerator> SketchSession<G> {
    pub fn new(generator: G, profile: AppProfile, settings: CanvasSettings) -> Self {
        let id = Uuid::new_v4();
        log::info!(
            "Starting {} sketch session {} on a {} canvas",
            profile.name,
            id,
            settings.size
        );
        Self {
            id,
            state: SessionState::with_stroke_color(settings.stroke_color),
            profile,
            settings,
            generator,
            last_result: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn profile(&self) -> &AppProfile {
        &self.profile
    }

    /// Latest image or failure to display, if any generation has run.
    pub fn last_result(&self) -> Option<&GenerationResult> {
        self.last_result.as_ref()
    }

    /// Settings for the drawing surface, with the session's current stroke
    /// colour and reset key.
    pub fn canvas_settings(&self) -> CanvasSettings {
        CanvasSettings {
            stroke_color: self.state.current_stroke_color(),
            key: self.state.canvas_key(),
            ..self.settings.clone()
        }
    }

    pub fn set_canvas_size(&mut self, size: CanvasSize) {
        self.settings.size = size;
    }

    pub fn set_drawing_mode(&mut self, mode: DrawingMode) {
        self.settings.drawing_mode = mode;
    }

    pub fn set_stroke_width(&mut self, width: u32) {
        self.settings = self.settings.clone().with_stroke_width(width);
    }

    pub fn set_background(&mut self, color: HexColor) {
        self.settings.background_color = color;
    }

    pub fn select_stroke_color(&mut self, color: HexColor) {
        self.state.select_stroke_color(color);
    }

    /// Clear action from the user.
    pub fn reset(&mut self) {
        self.state.reset();
        self.last_result = None;
    }

    pub async fn on_update(&mut self, frame: &CanvasFrame, controls: &Controls) -> Result<UpdateOutcome> {
        let (Some(bitmap), Some(drawing_log)) = (&frame.image_data, &frame.json_data) else {
            return Ok(UpdateOutcome::NotReady);
        };

        if !self.profile.styles.contains(&controls.style) {
            return Err(SketchError::InvalidInput(format!(
                "style {} is not offered by the {} profile",
                controls.style, self.profile.name
            )));
        }

        let snapshot = InputSnapshot::new(
            drawing_log.clone(),
            controls.prompt.clone(),
            controls.style,
            controls.strength,
            self.settings.size.width,
            self.settings.size.height,
        )?;

        if !self.state.claim(&snapshot) {
            return Ok(UpdateOutcome::Unchanged);
        }

        let result = self
            .generator
            .generate_sketch(&snapshot, bitmap, self.settings.background_color)
            .await;
        match &result {
            Ok(image) => log::info!(
                "Session {} generated a {}x{} image",
                self.id,
                image.width,
                image.height
            ),
            Err(failure) => log::warn!("Session {} generation failed: {}", self.id, failure),
        }

        self.last_result = Some(result.clone());
        Ok(UpdateOutcome::Generated(result))
    }
}
