use agrismart::disease::precautions::GENERAL_ADVICE;
use agrismart::{AgriConfig, AgriError, DiseaseLabels, LeafDiseaseClassifier, ModelId, TfServingBackend};
use httpmock::prelude::*;
use std::io::Cursor;
use std::time::Duration;

fn leaf_png() -> Vec<u8> {
    let img = image::RgbImage::from_fn(32, 24, |x, y| image::Rgb([(x * 8) as u8, 180, (y * 10) as u8]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn labels() -> DiseaseLabels {
    DiseaseLabels::from_names([
        "Tomato_Bacterial_spot",
        "Tomato_Late_blight",
        "Tomato_healthy",
        "Tomato_mosaic_virus",
    ])
    .unwrap()
}

fn classifier(server: &MockServer) -> LeafDiseaseClassifier<TfServingBackend> {
    let backend = TfServingBackend::new(server.base_url(), Duration::from_secs(5)).unwrap();
    LeafDiseaseClassifier::new(backend, labels(), 224)
}

#[tokio::test]
async fn test_classify_with_model_server() {
    let server = MockServer::start();
    let predict_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/models/plant_disease_vgg16_e10:predict")
            .body_contains("\"instances\"");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"predictions": [[0.02, 0.91, 0.05, 0.02]]}));
    });

    let diagnosis = classifier(&server)
        .classify(&leaf_png(), ModelId::Vgg16)
        .await
        .unwrap();

    predict_mock.assert();
    assert_eq!(diagnosis.label, "Tomato_Late_blight");
    assert_eq!(diagnosis.display_label, "Tomato Late blight");
    assert!((diagnosis.confidence_pct - 91.0).abs() < 1e-3);
    assert!(!diagnosis.healthy);
    assert!(diagnosis.summary().contains("Recommended precautions: Destroy infected plants"));
}

#[tokio::test]
async fn test_vgg19_uses_configured_model_name() {
    let server = MockServer::start();
    let predict_mock = server.mock(|when, then| {
        when.method(POST).path("/v1/models/leaf_vgg19_v2:predict");
        then.status(200)
            .json_body(serde_json::json!({"predictions": [[0.1, 0.1, 0.1, 0.7]]}));
    });

    let config = AgriConfig::from_toml_str(
        r#"
[classifier.models]
vgg19 = "leaf_vgg19_v2"
"#,
    )
    .unwrap();

    let diagnosis = classifier(&server)
        .with_served_name(ModelId::Vgg19, config.served_model_name(ModelId::Vgg19))
        .classify(&leaf_png(), ModelId::Vgg19)
        .await
        .unwrap();

    predict_mock.assert();
    assert_eq!(diagnosis.label, "Tomato_mosaic_virus");
    assert_eq!(diagnosis.precaution.as_deref(), Some(GENERAL_ADVICE));
}

#[tokio::test]
async fn test_model_server_failure_is_inference_error() {
    let server = MockServer::start();
    let predict_mock = server.mock(|when, then| {
        when.method(POST).path("/v1/models/plant_disease_vgg16_e10:predict");
        then.status(503).body("model not loaded");
    });

    let err = classifier(&server)
        .classify(&leaf_png(), ModelId::Vgg16)
        .await
        .unwrap_err();

    predict_mock.assert();
    assert!(matches!(err, AgriError::InferenceError { .. }));
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_label_count_mismatch_is_rejected() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/models/plant_disease_vgg16_e10:predict");
        then.status(200)
            .json_body(serde_json::json!({"predictions": [[0.5, 0.5]]}));
    });

    let err = classifier(&server)
        .classify(&leaf_png(), ModelId::Vgg16)
        .await
        .unwrap_err();
    assert!(matches!(err, AgriError::InferenceError { .. }));
}

#[tokio::test]
async fn test_invalid_upload_never_reaches_server() {
    let server = MockServer::start();
    let predict_mock = server.mock(|when, then| {
        when.method(POST);
        then.status(200);
    });

    let err = classifier(&server)
        .classify(b"not an image", ModelId::Vgg16)
        .await
        .unwrap_err();

    assert!(matches!(err, AgriError::ImageError(_)));
    predict_mock.assert_hits(0);
}
