use image::{Rgba, RgbaImage};
use serde_json::json;
use sketchgen::{
    models::DEFAULT_STRENGTH, CanvasFrame, CanvasSettings, CanvasSize, CanvasState, Config,
    Controls, LeonardoClient, SketchSession, Style, UpdateOutcome,
};
use std::env;
use std::fs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    sketchgen::logger::init_with_config(sketchgen::logger::LoggerConfig::development())?;

    if dotenv_loaded {
        log::info!(".env file loaded");
    } else {
        log::warn!("No .env file found, using system environment variables");
    }

    let config = Config::from_env()?;
    sketchgen::logger::log_config_info(&config);

    let mut args = env::args().skip(1);
    let sketch_path = args.next();
    let prompt = args.next().unwrap_or_else(|| "a castle on a hill".to_string());
    let style: Style = match env::var("SKETCH_STYLE") {
        Ok(name) => name.parse()?,
        Err(_) => config.profile.default_style(),
    };
    let strength = strength_from(env::var("SKETCH_STRENGTH").ok());

    let client = match LeonardoClient::new(config.leonardo.clone()) {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to initialize Leonardo client: {}", e);
            return Err(e.into());
        }
    };

    let (bitmap, drawing_log) = match &sketch_path {
        Some(path) => {
            log::info!("Loading sketch from {}", path);
            let bitmap = image::open(path)?.to_rgba8();
            let drawing_log = json!({ "objects": [{ "type": "image", "src": path }] });
            (bitmap, CanvasState::new(drawing_log))
        }
        None => {
            log::info!("No sketch given, drawing a placeholder");
            placeholder_sketch(&config.canvas)
        }
    };

    let canvas = config
        .canvas
        .clone()
        .with_size(CanvasSize::new(bitmap.width(), bitmap.height()));
    let mut session = SketchSession::new(client, config.profile.clone(), canvas);
    let frame = CanvasFrame::new(bitmap, drawing_log);
    let controls = Controls::new(prompt, style, strength);

    match session.on_update(&frame, &controls).await? {
        UpdateOutcome::Generated(Ok(image)) => {
            let extension = image.mime_type.rsplit('/').next().unwrap_or("png");
            let filename = format!(
                "generated_{}_{}.{}",
                style.as_str().to_lowercase(),
                chrono::Utc::now().timestamp(),
                extension
            );
            fs::write(&filename, &image.bytes)?;
            log::info!("Image saved to {} ({}x{})", filename, image.width, image.height);
        }
        UpdateOutcome::Generated(Err(failure)) => {
            log::error!("Failed to generate image: {}", failure);
            if let Some(body) = failure.response_body() {
                log::error!("Response content: {}", body);
            }
        }
        UpdateOutcome::Unchanged | UpdateOutcome::NotReady => {
            log::warn!("Nothing to generate");
        }
    }

    // Same inputs again: answered without a second request.
    if let UpdateOutcome::Unchanged = session.on_update(&frame, &controls).await? {
        log::info!("Re-render with unchanged inputs skipped");
    }

    Ok(())
}

/// Unset keeps the default; an unparseable value is reported and also falls
/// back to the default. Range checks happen when the snapshot is built.
fn strength_from(raw: Option<String>) -> f64 {
    let Some(raw) = raw else {
        return DEFAULT_STRENGTH;
    };
    match raw.trim().parse() {
        Ok(strength) => strength,
        Err(_) => {
            log::warn!(
                "SKETCH_STRENGTH '{}' is not a number, using {}",
                raw,
                DEFAULT_STRENGTH
            );
            DEFAULT_STRENGTH
        }
    }
}

fn placeholder_sketch(settings: &CanvasSettings) -> (RgbaImage, CanvasState) {
    let (w, h) = (settings.size.width, settings.size.height);
    let [r, g, b] = settings.background_color.channels();
    let mut bitmap = RgbaImage::from_pixel(w, h, Rgba([r, g, b, 255]));
    let [sr, sg, sb] = settings.stroke_color.channels();
    let ink = Rgba([sr, sg, sb, 255]);
    let thickness = settings.stroke_width;

    // Outline of a house front.
    let (left, right, top, bottom) = (w / 4, w * 3 / 4, h / 2, h * 7 / 8);
    for x in left..right {
        for t in 0..thickness {
            bitmap.put_pixel(x, (top + t).min(h - 1), ink);
            bitmap.put_pixel(x, (bottom + t).min(h - 1), ink);
        }
    }
    for y in top..bottom {
        for t in 0..thickness {
            bitmap.put_pixel((left + t).min(w - 1), y, ink);
            bitmap.put_pixel((right + t).min(w - 1), y, ink);
        }
    }

    let drawing_log = json!({
        "objects": [
            { "type": "rect", "left": left, "top": top, "width": right - left, "height": bottom - top,
              "stroke": settings.stroke_color, "strokeWidth": thickness }
        ]
    });
    (bitmap, CanvasState::new(drawing_log))
}
