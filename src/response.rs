//! Uniform `{code, msg, data}` response envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SUCCESS_MSG: &str = "success";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub code: u16,
    pub msg: Value,
    pub data: Value,
}

impl Envelope {
    pub fn success(status: StatusCode, data: Value) -> Self {
        Envelope {
            code: status.as_u16(),
            msg: Value::String(SUCCESS_MSG.to_string()),
            data,
        }
    }

    pub fn error(status: StatusCode, msg: Value) -> Self {
        Envelope {
            code: status.as_u16(),
            msg,
            data: Value::Null,
        }
    }

    /// Error envelope for a body that carried no usable detail.
    pub fn from_reason(status: StatusCode) -> Self {
        let reason = status.canonical_reason().unwrap_or("Error");
        Envelope::error(status, Value::String(reason.to_string()))
    }

    /// Wraps an arbitrary JSON body. Bodies that already carry `code` and
    /// `msg` are returned untouched, so wrapping twice is a no-op.
    pub fn wrap(status: StatusCode, body: Value) -> Value {
        if is_enveloped(&body) {
            return body;
        }

        let envelope = if status.is_client_error() || status.is_server_error() {
            Envelope::error(status, body)
        } else {
            Envelope::success(status, body)
        };
        serde_json::to_value(envelope).unwrap_or(Value::Null)
    }
}

pub fn is_enveloped(body: &Value) -> bool {
    body.as_object()
        .is_some_and(|obj| obj.contains_key("code") && obj.contains_key("msg"))
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wrap_success() {
        let wrapped = Envelope::wrap(StatusCode::CREATED, json!({"id": 1}));
        assert_eq!(wrapped, json!({"code": 201, "msg": "success", "data": {"id": 1}}));
    }

    #[test]
    fn test_wrap_error_moves_body_into_msg() {
        let wrapped = Envelope::wrap(
            StatusCode::BAD_REQUEST,
            json!({"quantity": ["must be positive"]}),
        );
        assert_eq!(
            wrapped,
            json!({"code": 400, "msg": {"quantity": ["must be positive"]}, "data": null})
        );
    }

    #[test]
    fn test_wrap_is_idempotent() {
        let once = Envelope::wrap(StatusCode::OK, json!([1, 2, 3]));
        let twice = Envelope::wrap(StatusCode::OK, once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_reason_fallback() {
        let envelope = Envelope::from_reason(StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(envelope.code, 405);
        assert_eq!(envelope.msg, json!("Method Not Allowed"));
        assert_eq!(envelope.data, Value::Null);
    }
}
