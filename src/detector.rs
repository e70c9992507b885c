use crate::models::{HexColor, InputSnapshot};

/// Per-session record that survives every re-render until the user resets.
#[derive(Debug, Clone)]
pub struct SessionState {
    last_snapshot: Option<InputSnapshot>,
    canvas_generation: u64,
    current_stroke_color: HexColor,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            last_snapshot: None,
            canvas_generation: 0,
            current_stroke_color: HexColor::BLACK,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh state whose picker starts on `color`.
    pub fn with_stroke_color(color: HexColor) -> Self {
        Self {
            current_stroke_color: color,
            ..Self::default()
        }
    }

    pub fn last_snapshot(&self) -> Option<&InputSnapshot> {
        self.last_snapshot.as_ref()
    }

    pub fn canvas_generation(&self) -> u64 {
        self.canvas_generation
    }

    /// Key for the drawing surface; a new key means a blank canvas.
    pub fn canvas_key(&self) -> String {
        format!("canvas_{}", self.canvas_generation)
    }

    pub fn current_stroke_color(&self) -> HexColor {
        self.current_stroke_color
    }

    pub fn select_stroke_color(&mut self, color: HexColor) {
        self.current_stroke_color = color;
    }

    /// Checks `current` against the last triggering snapshot and, if it
    /// differs, records it before returning `true`. Recording first keeps a
    /// re-render during an in-flight request from triggering twice.
    pub fn claim(&mut self, current: &InputSnapshot) -> bool {
        if !should_regenerate(current, self) {
            log::debug!("Snapshot unchanged, skipping generation");
            return false;
        }
        log::debug!(
            "Snapshot changed (strokes: {}, style: {}, strength: {}), triggering generation",
            current.canvas_state().stroke_count(),
            current.style(),
            current.strength()
        );
        self.last_snapshot = Some(current.clone());
        true
    }

    /// Clear action: drop the remembered snapshot and move to a fresh
    /// canvas. The stroke colour is kept.
    pub fn reset(&mut self) {
        self.last_snapshot = None;
        self.canvas_generation += 1;
        log::info!("Canvas reset, now on {}", self.canvas_key());
    }
}

pub fn should_regenerate(current: &InputSnapshot, session: &SessionState) -> bool {
    session
        .last_snapshot
        .as_ref()
        .map_or(true, |last| last != current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CanvasState, Style};
    use serde_json::json;

    fn snapshot(prompt: &str, strength: f64) -> InputSnapshot {
        InputSnapshot::new(CanvasState::empty(), prompt, Style::Cinematic, strength, 512, 512)
            .unwrap()
    }

    #[test]
    fn test_first_snapshot_always_triggers() {
        let session = SessionState::new();
        assert!(should_regenerate(&snapshot("", 0.65), &session));
    }

    #[test]
    fn test_same_snapshot_does_not_retrigger() {
        let mut session = SessionState::new();
        let a = snapshot("a castle", 0.65);
        assert!(session.claim(&a));
        assert!(!should_regenerate(&a, &session));
        assert!(!session.claim(&a.clone()));
    }

    #[test]
    fn test_changed_field_triggers() {
        let mut session = SessionState::new();
        assert!(session.claim(&snapshot("a castle", 0.65)));
        assert!(session.claim(&snapshot("a castle", 0.7)));
        assert!(session.claim(&snapshot("a keep", 0.7)));

        let drawn = InputSnapshot::new(
            CanvasState::new(json!({ "objects": [{ "type": "path" }] })),
            "a keep",
            Style::Cinematic,
            0.7,
            512,
            512,
        )
        .unwrap();
        assert!(session.claim(&drawn));
        assert_eq!(session.last_snapshot(), Some(&drawn));
    }

    #[test]
    fn test_initial_stroke_color() {
        assert_eq!(SessionState::new().current_stroke_color(), HexColor::BLACK);
        let state = SessionState::with_stroke_color(HexColor::rgb(0xFF, 0, 0));
        assert_eq!(state.current_stroke_color(), HexColor::rgb(0xFF, 0, 0));
        assert!(state.last_snapshot().is_none());
        assert_eq!(state.canvas_generation(), 0);
    }

    #[test]
    fn test_reset_forces_next_trigger() {
        let mut session = SessionState::new();
        let a = snapshot("a castle", 0.65);
        assert!(session.claim(&a));
        session.select_stroke_color(HexColor::rgb(255, 0, 0));

        session.reset();
        assert!(session.last_snapshot().is_none());
        assert_eq!(session.canvas_generation(), 1);
        assert_eq!(session.canvas_key(), "canvas_1");
        assert_eq!(session.current_stroke_color(), HexColor::rgb(255, 0, 0));
        assert!(should_regenerate(&a, &session));
    }
}
