//! Axum request handlers for all service endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use common::protocol::{
    CodecResponse, DataType, DecryptRequest, EncryptRequest, ErrorResponse, HealthResponse,
};
use common::ServiceError;
use envelope_codec::{value_looks_like_envelope, CodecError, ContentKind};
use serde_json::Value;
use tracing::{debug, warn};

use super::state::AppState;

/// `POST /api/encryption/encrypt` — seal `data` into an envelope.
///
/// JSON values (and strings that parse as JSON) are sealed as objects; any
/// other string is sealed as raw text. The response `type` reports which.
pub async fn encrypt(State(state): State<AppState>, Json(req): Json<EncryptRequest>) -> Response {
    let Some(input) = req.input() else {
        return error_response(ServiceError::BadRequest("data is required".into()));
    };

    match state.codec.encrypt_data(input).await {
        Ok(sealed) => {
            debug!(data_type = sealed.kind.as_str(), "data encrypted");
            let body = CodecResponse::ok(Value::String(sealed.envelope), data_type(sealed.kind));
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            warn!(kind = e.kind().as_str(), "encryption failed");
            error_response(service_error(e, "Failed to encrypt data"))
        }
    }
}

/// `POST /api/encryption/decrypt` — open an envelope.
///
/// Accepts the envelope as `data` or the legacy `encryptedData`. Input that
/// does not look like an envelope is rejected before any decryption attempt.
pub async fn decrypt(State(state): State<AppState>, Json(req): Json<DecryptRequest>) -> Response {
    let Some(input) = req.input() else {
        return error_response(ServiceError::BadRequest("data is required".into()));
    };
    if !value_looks_like_envelope(&input) {
        return error_response(ServiceError::Format(
            "The provided data is not encrypted".into(),
        ));
    }
    let envelope = input.as_str().unwrap_or_default();

    match state.codec.decrypt_content(envelope).await {
        Ok(content) => {
            let kind = content.kind();
            debug!(data_type = kind.as_str(), "data decrypted");
            let body = CodecResponse::ok(content.into_value(), data_type(kind));
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            warn!(kind = e.kind().as_str(), "decryption failed");
            error_response(service_error(e, "Failed to decrypt data"))
        }
    }
}

/// `GET /api/health` — liveness and readiness check.
///
/// Returns `200 OK` once the encryption key has been derived.
/// Returns `503 Service Unavailable` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let key_ready = state.codec.is_key_ready();

    let (status_code, status_str) = if key_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status_str.into(),
        timestamp: Utc::now(),
        key_ready,
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

fn data_type(kind: ContentKind) -> DataType {
    match kind {
        ContentKind::Object => DataType::Object,
        ContentKind::Text => DataType::Text,
    }
}

fn service_error(err: CodecError, context: &str) -> ServiceError {
    let message = format!("{context}: {err}");
    match err {
        CodecError::Configuration(_) => ServiceError::Unavailable(message),
        CodecError::Format(_) => ServiceError::Format(message),
        CodecError::Authentication => ServiceError::Authentication(message),
    }
}

fn error_response(err: ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::new(err.code(), err.to_string()))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_errors_keep_their_kind() {
        let e = service_error(CodecError::Authentication, "Failed to decrypt data");
        assert_eq!(e.code(), "authentication_error");
        assert!(e.to_string().starts_with("Failed to decrypt data"));

        let e = service_error(CodecError::Format("bad".into()), "ctx");
        assert_eq!(e.code(), "format_error");
        assert_eq!(e.http_status(), 400);

        let e = service_error(CodecError::Configuration("no key".into()), "ctx");
        assert_eq!(e.http_status(), 503);
    }

    #[test]
    fn content_kind_maps_to_wire_type() {
        assert_eq!(data_type(ContentKind::Object), DataType::Object);
        assert_eq!(data_type(ContentKind::Text), DataType::Text);
    }
}
