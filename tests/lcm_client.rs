use std::io::Cursor;
use std::net::TcpListener;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use serde_json::{json, Value};
use sketchgen::{
    AppProfile, CanvasFrame, CanvasSettings, CanvasState, Controls, FailureKind, GenerationRequest,
    ImageGenerator, InputSnapshot, LeonardoClient, LeonardoConfig, SketchSession, Style,
    UpdateOutcome,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-key";
const LCM_PATH: &str = "/v1/generations-lcm";

fn png_data_url(width: u32, height: u32) -> String {
    let img = RgbImage::from_pixel(width, height, Rgb([40, 90, 160]));
    let mut buf = Vec::new();
    if let Err(e) = img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png) {
        panic!("failed to encode test png: {e}");
    }
    format!("data:image/png;base64,{}", BASE64.encode(buf))
}

fn job_body(urls: Value) -> Value {
    json!({ "lcmGenerationJob": { "imageDataUrl": urls } })
}

fn client_for(server: &MockServer) -> LeonardoClient {
    client_with(LeonardoConfig::new().with_base_url(server.uri()))
}

fn client_with(config: LeonardoConfig) -> LeonardoClient {
    match LeonardoClient::new(config.with_api_key(API_KEY)) {
        Ok(client) => client,
        Err(e) => panic!("client construction failed: {e}"),
    }
}

fn castle_request() -> GenerationRequest {
    let snapshot = match InputSnapshot::new(
        CanvasState::empty(),
        "a castle",
        Style::Cinematic,
        0.65,
        512,
        512,
    ) {
        Ok(s) => s,
        Err(e) => panic!("invalid snapshot: {e}"),
    };
    GenerationRequest::from_snapshot(&snapshot, "data:image/jpeg;base64,/9j/AA==".to_string())
}

async fn mount(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(LCM_PATH))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn sends_expected_headers_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LCM_PATH))
        .and(header("authorization", "Bearer test-key"))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_body(json!([png_data_url(8, 8)]))))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server).lcm_uncached().send(&castle_request()).await;
    assert!(result.is_ok(), "{result:?}");

    let requests = match server.received_requests().await {
        Some(reqs) => reqs,
        None => panic!("request not recorded"),
    };
    let body: Value = match requests[0].body_json() {
        Ok(v) => v,
        Err(e) => panic!("invalid json body: {e}"),
    };
    assert_eq!(body["width"], 512);
    assert_eq!(body["height"], 512);
    assert_eq!(body["prompt"], "a castle");
    assert_eq!(body["style"], "CINEMATIC");
    assert_eq!(body["strength"], 0.65);
    assert_eq!(body["imageDataUrl"], "data:image/jpeg;base64,/9j/AA==");
}

#[tokio::test]
async fn decodes_successful_generation() {
    let server = MockServer::start().await;
    let extra = png_data_url(4, 4);
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(job_body(json!([png_data_url(512, 512), extra]))),
    )
    .await;

    let image = match client_for(&server).lcm_uncached().send(&castle_request()).await {
        Ok(image) => image,
        Err(e) => panic!("generation failed: {e}"),
    };
    assert_eq!((image.width, image.height), (512, 512));
    assert_eq!(image.mime_type, "image/png");
    let decoded = match image.decode() {
        Ok(d) => d,
        Err(e) => panic!("bytes do not decode: {e}"),
    };
    assert_eq!((decoded.width(), decoded.height()), (512, 512));
}

#[tokio::test]
async fn non_success_status_is_http_error_with_body() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(429).set_body_string("{\"error\":\"Too many requests\"}"),
    )
    .await;

    let failure = match client_for(&server).lcm_uncached().send(&castle_request()).await {
        Ok(_) => panic!("429 should fail"),
        Err(f) => f,
    };
    assert_eq!(failure.kind(), FailureKind::HttpError(429));
    assert_eq!(failure.response_body(), Some("{\"error\":\"Too many requests\"}"));
}

#[tokio::test]
async fn slow_service_is_a_timeout() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(job_body(json!([png_data_url(8, 8)])))
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let client = client_with(
        LeonardoConfig::new()
            .with_base_url(server.uri())
            .with_timeout(Duration::from_millis(200)),
    );
    let failure = match client.lcm_uncached().send(&castle_request()).await {
        Ok(_) => panic!("delayed response should time out"),
        Err(f) => f,
    };
    assert_eq!(failure.kind(), FailureKind::Timeout);
}

#[tokio::test]
async fn refused_connection_is_a_connection_error() {
    let addr = match TcpListener::bind("127.0.0.1:0").and_then(|l| l.local_addr()) {
        Ok(addr) => addr,
        Err(e) => panic!("failed to reserve a port: {e}"),
    };
    // Listener dropped above; nothing is accepting on this port now.
    let client = client_with(LeonardoConfig::new().with_base_url(format!("http://{addr}")));
    let failure = match client.lcm_uncached().send(&castle_request()).await {
        Ok(_) => panic!("closed port should not answer"),
        Err(f) => f,
    };
    assert_eq!(failure.kind(), FailureKind::ConnectionError);
}

#[tokio::test]
async fn missing_or_empty_image_list_is_malformed() {
    let bodies = [
        job_body(json!([])),
        json!({ "lcmGenerationJob": {} }),
        json!({ "sdGenerationJob": { "imageDataUrl": [png_data_url(8, 8)] } }),
    ];
    for body in bodies {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(200).set_body_json(body.clone())).await;

        let failure = match client_for(&server).lcm_uncached().send(&castle_request()).await {
            Ok(_) => panic!("{body} should not succeed"),
            Err(f) => f,
        };
        assert_eq!(failure.kind(), FailureKind::MalformedResponse, "{body}");
    }
}

#[tokio::test]
async fn undecodable_image_is_malformed() {
    let server = MockServer::start().await;
    let not_an_image = format!("data:image/png;base64,{}", BASE64.encode(b"definitely not a png"));
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(job_body(json!([not_an_image]))),
    )
    .await;

    let failure = match client_for(&server).lcm_uncached().send(&castle_request()).await {
        Ok(_) => panic!("garbage bytes should not decode"),
        Err(f) => f,
    };
    assert_eq!(failure.kind(), FailureKind::MalformedResponse);
}

#[tokio::test]
async fn custom_job_field_is_honoured() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!({ "job": { "imageDataUrl": [png_data_url(8, 8)] } })),
    )
    .await;

    let client = client_with(
        LeonardoConfig::new()
            .with_base_url(server.uri())
            .with_job_field("job"),
    );
    assert!(client.lcm_uncached().send(&castle_request()).await.is_ok());
}

#[tokio::test]
async fn identical_requests_are_sent_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LCM_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_body(json!([png_data_url(64, 64)]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = client.generate(&castle_request()).await;
    let second = client.generate(&castle_request()).await;
    assert!(first.is_ok());
    assert_eq!(first, second);
    assert_eq!(client.lcm().len().await, 1);

    server.verify().await;
}

#[tokio::test]
async fn session_end_to_end_produces_512_square() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LCM_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_body(json!([png_data_url(512, 512)]))))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = SketchSession::new(
        client_for(&server),
        AppProfile::default(),
        CanvasSettings::default(),
    );
    let frame = CanvasFrame::new(
        RgbaImage::from_pixel(512, 512, Rgba([255, 255, 255, 255])),
        CanvasState::empty(),
    );
    let controls = Controls::new("a castle", Style::Cinematic, 0.65);

    let outcome = match session.on_update(&frame, &controls).await {
        Ok(outcome) => outcome,
        Err(e) => panic!("update rejected: {e}"),
    };
    match outcome {
        UpdateOutcome::Generated(Ok(image)) => {
            assert_eq!((image.width, image.height), (512, 512));
        }
        other => panic!("expected a generated image, got {other:?}"),
    }

    // A re-render with the same inputs does not reach the service.
    let again = match session.on_update(&frame, &controls).await {
        Ok(outcome) => outcome,
        Err(e) => panic!("update rejected: {e}"),
    };
    assert_eq!(again, UpdateOutcome::Unchanged);

    // After a reset the same inputs trigger again, and the cache answers.
    session.reset();
    let after_reset = match session.on_update(&frame, &controls).await {
        Ok(outcome) => outcome,
        Err(e) => panic!("update rejected: {e}"),
    };
    assert!(matches!(after_reset, UpdateOutcome::Generated(Ok(_))));

    server.verify().await;
}
