//! Sketch-to-image control logic for Leonardo AI's LCM endpoint.
//!
//! A [`SketchSession`] receives every drawing-surface update, asks the
//! change detector whether the inputs moved since the last generation, and if
//! so encodes the canvas and issues one (memoized) request through an
//! [`ImageGenerator`].

pub mod config;
pub mod detector;
pub mod error;
pub mod leonardo;
pub mod logger;
pub mod models;
pub mod session;

pub use config::{AppProfile, Config, LeonardoConfig, Theme};
pub use detector::{should_regenerate, SessionState};
pub use error::{FailureKind, GenerationFailure, Result, SketchError};
pub use leonardo::{CachedGenerator, ImageGenerator, LcmClient, LeonardoClient};
pub use models::{
    CanvasSettings, CanvasSize, CanvasState, DrawingMode, GeneratedImage, GenerationRequest,
    GenerationResult, HexColor, InputSnapshot, Style,
};
pub use session::{CanvasFrame, Controls, SketchSession, UpdateOutcome};
