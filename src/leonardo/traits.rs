use crate::{
    leonardo::encoding::canvas_to_data_url,
    models::{GenerationRequest, GenerationResult, HexColor, InputSnapshot},
};
use async_trait::async_trait;
use image::RgbaImage;

/// Anything that can turn a generation request into an image.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult;

    /// Encodes the canvas for `snapshot` and generates from it. Local
    /// encoding problems come back as `GenerationFailure::Unknown`.
    async fn generate_sketch(
        &self,
        snapshot: &InputSnapshot,
        canvas: &RgbaImage,
        background: HexColor,
    ) -> GenerationResult {
        if (canvas.width(), canvas.height()) != (snapshot.width(), snapshot.height()) {
            log::warn!(
                "Canvas bitmap is {}x{} but the snapshot says {}x{}",
                canvas.width(),
                canvas.height(),
                snapshot.width(),
                snapshot.height()
            );
        }
        let image_data_url = canvas_to_data_url(canvas, background)?;
        let request = GenerationRequest::from_snapshot(snapshot, image_data_url);
        self.generate(&request).await
    }
}
