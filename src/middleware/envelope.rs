use axum::{
    body::{to_bytes, Body, Bytes},
    extract::Request,
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::response::{is_enveloped, Envelope};

/// Largest body the envelope will buffer and rewrite.
const MAX_WRAPPED_BODY: usize = 16 * 1024 * 1024;

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}

/// Wraps every JSON body and every error body in the `{code, msg, data}`
/// envelope. Bodies already in that shape, and non-JSON success bodies such
/// as file downloads or `204 No Content`, are passed through untouched.
pub async fn wrap_response(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let status = response.status();
    let is_error = status.is_client_error() || status.is_server_error();
    let json = is_json(&response);

    if !json && !is_error {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_WRAPPED_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "Failed to buffer response body");
            return Envelope::from_reason(StatusCode::INTERNAL_SERVER_ERROR).into_response();
        }
    };

    let wrapped = match json.then(|| serde_json::from_slice::<Value>(&bytes).ok()).flatten() {
        Some(value) if is_enveloped(&value) => {
            return Response::from_parts(parts, Body::from(bytes));
        }
        Some(value) => Envelope::wrap(status, value),
        None if !is_error => return Response::from_parts(parts, Body::from(bytes)),
        None => error_from_text(status, &bytes),
    };

    match serde_json::to_vec(&wrapped) {
        Ok(body) => {
            parts.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(body))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response envelope");
            Envelope::from_reason(StatusCode::INTERNAL_SERVER_ERROR).into_response()
        }
    }
}

/// Framework rejections carry plain text; empty bodies get the status reason.
fn error_from_text(status: StatusCode, bytes: &Bytes) -> Value {
    let text = String::from_utf8_lossy(bytes).trim().to_string();
    let envelope = if text.is_empty() {
        Envelope::from_reason(status)
    } else {
        Envelope::error(status, Value::String(text))
    };
    serde_json::to_value(envelope).unwrap_or(Value::Null)
}
