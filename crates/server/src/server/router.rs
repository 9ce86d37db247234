//! Axum router construction.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, middleware, state::AppState};

/// Build the application [`Router`] with all routes and middleware attached.
pub fn build(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/encryption/encrypt", post(handlers::encrypt))
        .route("/api/encryption/decrypt", post(handlers::decrypt))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::cors())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(middleware::REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use envelope_codec::{CodecSettings, EnvelopeCodec, Secret};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const LIMIT: usize = 1024 * 1024;

    fn test_state() -> AppState {
        let codec = EnvelopeCodec::new(CodecSettings {
            secret: Secret::from("test-secret"),
            salt: "74657374".into(),
            fixed_iv: None,
            algorithm: None,
        })
        .unwrap();
        AppState::new(codec)
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> Response {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        app.clone().oneshot(req).await.unwrap()
    }

    async fn json_body(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn encrypt(app: &Router, data: Value) -> Value {
        let resp = post_json(app, "/api/encryption/encrypt", json!({ "data": data })).await;
        assert_eq!(resp.status(), StatusCode::OK);
        json_body(resp).await
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let app = build(test_state(), LIMIT);
        let req = Request::builder()
            .uri("/unknown")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(resp).await["code"], "not_found");
    }

    #[tokio::test]
    async fn health_reflects_key_readiness() {
        let state = test_state();
        let app = build(state.clone(), LIMIT);
        let req = || Request::builder().uri("/api/health").body(Body::empty()).unwrap();

        let resp = app.clone().oneshot(req()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.codec.self_check().await.unwrap();
        let resp = app.oneshot(req()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["key_ready"], true);
    }

    #[tokio::test]
    async fn object_round_trip_over_http() {
        let app = build(test_state(), LIMIT);
        let sealed = encrypt(&app, json!({"ssn": "123-45-6789", "tags": [1, 2]})).await;
        assert_eq!(sealed["statusCode"], 200);
        assert_eq!(sealed["type"], "object");

        let resp = post_json(&app, "/api/encryption/decrypt", json!({"data": sealed["data"]})).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let opened = json_body(resp).await;
        assert_eq!(opened["type"], "object");
        assert_eq!(opened["data"], json!({"ssn": "123-45-6789", "tags": [1, 2]}));
    }

    #[tokio::test]
    async fn text_round_trip_via_legacy_field() {
        let app = build(test_state(), LIMIT);
        let sealed = encrypt(&app, json!("plain words")).await;
        assert_eq!(sealed["type"], "text");

        let resp = post_json(
            &app,
            "/api/encryption/decrypt",
            json!({"encryptedData": format!("  {}  ", sealed["data"].as_str().unwrap())}),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let opened = json_body(resp).await;
        assert_eq!(opened["type"], "text");
        assert_eq!(opened["data"], "plain words");
    }

    #[tokio::test]
    async fn missing_data_is_rejected() {
        let app = build(test_state(), LIMIT);
        for uri in ["/api/encryption/encrypt", "/api/encryption/decrypt"] {
            for body in [json!({}), json!({"data": 0}), json!({"data": false})] {
                let resp = post_json(&app, uri, body).await;
                assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
                assert!(json_body(resp).await["message"]
                    .as_str()
                    .unwrap()
                    .contains("data is required"));
            }
        }
    }

    #[tokio::test]
    async fn non_envelope_is_rejected_before_decryption() {
        let app = build(test_state(), LIMIT);
        for data in [json!("hello"), json!(12345), json!({"iv": "00"})] {
            let resp = post_json(&app, "/api/encryption/decrypt", json!({ "data": data })).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body = json_body(resp).await;
            assert_eq!(body["code"], "format_error");
            assert_eq!(body["message"], "The provided data is not encrypted");
        }
    }

    #[tokio::test]
    async fn tampered_envelope_reports_authentication_error() {
        let app = build(test_state(), LIMIT);
        let sealed = encrypt(&app, json!("secret")).await;
        let envelope = sealed["data"].as_str().unwrap();
        let last = if envelope.ends_with('0') { '1' } else { '0' };
        let tampered = format!("{}{last}", &envelope[..envelope.len() - 1]);

        let resp = post_json(&app, "/api/encryption/decrypt", json!({ "data": tampered })).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["code"], "authentication_error");
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let app = build(test_state(), 64);
        let resp = post_json(&app, "/api/encryption/encrypt", json!({"data": "x".repeat(256)})).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
