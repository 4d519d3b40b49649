//! Remote inference capability against a mock endpoint.

use std::sync::Arc;

use serde_json::json;
use sumeval_core::{
    EvalError, GenerationCapability, GenerationError, GenerationParams, HttpCapability,
    HttpCapabilityConfig, Summarizer,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_posts_inputs_and_flattened_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/summarize"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_json(json!({
            "inputs": "long article",
            "parameters": {"min_length": 30, "max_length": 60, "num_beams": 4}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"summary_text": "short"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config =
        HttpCapabilityConfig::new(format!("{}/summarize", server.uri())).with_token("sk-test");
    let capability = HttpCapability::new(&config).unwrap();
    let summarizer = Summarizer::new(Arc::new(capability));

    let overrides = GenerationParams::default()
        .with_max_length(60)
        .with_extra("num_beams", json!(4));
    let summary = summarizer.summarize("long article", &overrides).await.unwrap();
    assert_eq!(summary, "short");
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
        .mount(&server)
        .await;

    let capability = HttpCapability::new(&HttpCapabilityConfig::new(server.uri())).unwrap();
    let err = capability
        .generate("text", &GenerationParams::default())
        .await
        .unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("503"), "{msg}");
    assert!(msg.contains("model loading"), "{msg}");
}

#[tokio::test]
async fn test_unexpected_shape_is_malformed_output() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "nope"})))
        .mount(&server)
        .await;

    let capability = HttpCapability::new(&HttpCapabilityConfig::new(server.uri())).unwrap();
    let err = Summarizer::new(Arc::new(capability))
        .summarize("text", &GenerationParams::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EvalError::Generation(GenerationError::MalformedOutput(_))
    ));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_capability_error() {
    // Port 9 (discard) is not expected to host an HTTP server.
    let config = HttpCapabilityConfig::new("http://127.0.0.1:9/summarize").with_timeout_secs(2);
    let err = Summarizer::new(Arc::new(HttpCapability::new(&config).unwrap()))
        .summarize("text", &GenerationParams::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EvalError::Generation(GenerationError::Capability(_))
    ));
}
