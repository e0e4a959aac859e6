use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;

mod common;

use common::{
    create_test_app, create_test_app_with_policy, post_json, read_json, send, words_reply,
    FakeCompletion, Upstream,
};
use polypath_backend::config::ValidationPolicy;

const FIVE_FOOD_WORDS: &[(&str, &str)] = &[
    ("bread", "pan"),
    ("water", "agua"),
    ("apple", "manzana"),
    ("cheese", "queso"),
    ("milk", "leche"),
];

fn food_request() -> serde_json::Value {
    json!({ "l1": "en", "tl": "es", "theme": "food", "count": 5 })
}

#[tokio::test]
async fn test_generate_words_success() {
    let fake = FakeCompletion::replying(words_reply(FIVE_FOOD_WORDS));
    let app = create_test_app(fake.clone());

    let (status, body) = read_json(send(app, post_json("/generate-words", food_request())).await).await;

    assert_eq!(status, StatusCode::OK);
    let words = body["words"].as_array().unwrap();
    assert_eq!(words.len(), 5);
    assert_eq!(words[0], json!({ "native": "bread", "target": "pan" }));
    assert_eq!(body["theme"], "food");
    assert_eq!(body["count"], 5);
    assert_eq!(fake.calls(), 1);
}

#[tokio::test]
async fn test_prompt_carries_request_parameters() {
    let fake = FakeCompletion::replying(words_reply(FIVE_FOOD_WORDS));
    let app = create_test_app(fake.clone());

    send(app, post_json("/generate-words", food_request())).await;

    let prompt = fake.last_prompt().unwrap();
    assert!(prompt.contains("Generate exactly 5 common food words"));
    assert!(prompt.contains("Source language: en"));
    assert!(prompt.contains("Target language: es"));
}

#[tokio::test]
async fn test_legacy_function_path() {
    let fake = FakeCompletion::replying(words_reply(FIVE_FOOD_WORDS));
    let app = create_test_app(fake);

    let response = send(app, post_json("/.netlify/functions/getWords", food_request())).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_fenced_reply_is_accepted() {
    let reply = format!("```json\n{}\n```", words_reply(FIVE_FOOD_WORDS));
    let app = create_test_app(FakeCompletion::replying(reply));

    let (status, body) = read_json(send(app, post_json("/generate-words", food_request())).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["words"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_prose_reply_is_500() {
    let fake = FakeCompletion::replying("Sure! Here are five food words: pan, agua, manzana.");
    let app = create_test_app(fake);

    let (status, body) = read_json(send(app, post_json("/generate-words", food_request())).await).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
    assert!(body.get("words").is_none());
}

#[tokio::test]
async fn test_reply_without_words_array_is_500() {
    let app = create_test_app(FakeCompletion::replying(r#"{"vocabulary":[]}"#));

    let (status, body) = read_json(send(app, post_json("/generate-words", food_request())).await).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INVALID_RESPONSE");
}

#[tokio::test]
async fn test_lenient_returns_partial_results() {
    let reply = words_reply(&[("bread", "pan"), ("", "agua"), ("apple", "manzana")]);
    let app = create_test_app(FakeCompletion::replying(reply));

    let (status, body) = read_json(send(app, post_json("/generate-words", food_request())).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["words"].as_array().unwrap().len(), 2);
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn test_strict_rejects_partial_results() {
    let reply = words_reply(&[("bread", "pan"), ("apple", "manzana")]);
    let app = create_test_app_with_policy(FakeCompletion::replying(reply), ValidationPolicy::Strict);

    let (status, body) = read_json(send(app, post_json("/generate-words", food_request())).await).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INSUFFICIENT_WORDS");
}

#[tokio::test]
async fn test_excess_words_are_trimmed() {
    let mut pairs = FIVE_FOOD_WORDS.to_vec();
    pairs.push(("egg", "huevo"));
    pairs.push(("rice", "arroz"));
    let app = create_test_app_with_policy(
        FakeCompletion::replying(words_reply(&pairs)),
        ValidationPolicy::Strict,
    );

    let (status, body) = read_json(send(app, post_json("/generate-words", food_request())).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["words"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_same_languages_rejected_without_upstream_call() {
    let fake = FakeCompletion::replying(words_reply(FIVE_FOOD_WORDS));
    let app = create_test_app(fake.clone());

    let (status, body) = read_json(
        send(app, post_json("/generate-words", json!({ "l1": "es", "tl": "es" }))).await,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert_eq!(fake.calls(), 0);
}

#[tokio::test]
async fn test_missing_language_rejected() {
    let app = create_test_app(FakeCompletion::replying(words_reply(FIVE_FOOD_WORDS)));

    let (status, body) =
        read_json(send(app, post_json("/generate-words", json!({ "l1": "en" }))).await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required languages (l1, tl)");
}

#[tokio::test]
async fn test_invalid_json_body_rejected() {
    let app = create_test_app(FakeCompletion::replying(words_reply(FIVE_FOOD_WORDS)));
    let request = Request::builder()
        .method("POST")
        .uri("/generate-words")
        .body(Body::from("l1=en&tl=es"))
        .unwrap();

    let (status, _) = read_json(send(app, request).await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_integral_float_count_is_accepted() {
    let fake = FakeCompletion::replying(words_reply(FIVE_FOOD_WORDS));
    let app = create_test_app(fake.clone());
    let request = json!({ "l1": "en", "tl": "es", "theme": "food", "count": 5.0 });

    let (status, body) = read_json(send(app, post_json("/generate-words", request)).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 5);
    assert!(fake.last_prompt().unwrap().contains("Generate exactly 5 common food words"));
}

#[tokio::test]
async fn test_fractional_or_string_count_gets_count_error() {
    for count in [json!(2.5), json!("5")] {
        let fake = FakeCompletion::replying(words_reply(FIVE_FOOD_WORDS));
        let app = create_test_app(fake.clone());
        let request = json!({ "l1": "en", "tl": "es", "count": count });

        let (status, body) = read_json(send(app, post_json("/generate-words", request)).await).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"], "count must be a whole number between 1 and 20");
        assert_eq!(fake.calls(), 0);
    }
}

#[tokio::test]
async fn test_default_count_is_six() {
    let fake = FakeCompletion::replying(words_reply(FIVE_FOOD_WORDS));
    let app = create_test_app(fake.clone());

    send(app, post_json("/generate-words", json!({ "l1": "en", "tl": "fr" }))).await;

    let prompt = fake.last_prompt().unwrap();
    assert!(prompt.contains("Generate exactly 6 common basic everyday vocabulary words"));
}

#[tokio::test]
async fn test_upstream_failure_is_generic_500() {
    let fake = FakeCompletion::new(Upstream::Status(429, "rate limited: key sk-abc".into()));
    let app = create_test_app(fake.clone());

    let (status, body) = read_json(send(app, post_json("/generate-words", food_request())).await).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to generate words");
    assert_eq!(fake.calls(), 1);
}

#[tokio::test]
async fn test_missing_credential_is_500_at_request_time() {
    let app = create_test_app(FakeCompletion::new(Upstream::Unconfigured));

    let (status, body) = read_json(send(app, post_json("/generate-words", food_request())).await).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_options_preflight_is_empty_200() {
    let app = create_test_app(FakeCompletion::new(Upstream::Unconfigured));
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/generate-words")
        .body(Body::empty())
        .unwrap();

    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_other_methods_are_405() {
    for method in ["GET", "PUT", "DELETE"] {
        let app = create_test_app(FakeCompletion::replying(words_reply(FIVE_FOOD_WORDS)));
        let request = Request::builder()
            .method(method)
            .uri("/generate-words")
            .body(Body::empty())
            .unwrap();

        let response = send(app, request).await;
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS],
            "POST, OPTIONS"
        );
        let (status, body) = read_json(response).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_eq!(body["error"], "Method not allowed");
    }
}

#[tokio::test]
async fn test_cors_headers_on_error_paths() {
    let app = create_test_app(FakeCompletion::replying("not json"));

    let response = send(app, post_json("/generate-words", food_request())).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "Content-Type"
    );
}

#[tokio::test]
async fn test_health_reports_llm_state() {
    let app = create_test_app(FakeCompletion::new(Upstream::Unconfigured));
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = read_json(send(app, request).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["llm"], "missing");
}

#[tokio::test]
async fn test_health_live() {
    let app = create_test_app(FakeCompletion::replying("{}"));
    let request = Request::builder().uri("/health/live").body(Body::empty()).unwrap();

    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_404_not_found() {
    let app = create_test_app(FakeCompletion::replying("{}"));
    let request = Request::builder()
        .uri("/nonexistent/path")
        .body(Body::empty())
        .unwrap();

    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}
