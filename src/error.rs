use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::{json, Map, Value};

use crate::audit::export::ExportError;
use crate::money::MoneyError;
use crate::pricing::PricingError;
use crate::response::Envelope;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest(_) | AppError::Integrity(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `msg` member of the error envelope. Field errors keep their
    /// field-level shape, everything else is a plain string.
    fn detail(&self) -> Value {
        match self {
            AppError::Validation { field, message } => {
                let mut detail = Map::new();
                detail.insert(field.clone(), json!([message]));
                Value::Object(detail)
            }
            AppError::BadRequest(msg)
            | AppError::Integrity(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => Value::String(msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                Value::String("Internal server error".to_string())
            }
            AppError::Database(err) => {
                tracing::error!("Database error: {:?}", err);
                Value::String("Internal server error".to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        Envelope::error(status, self.detail()).into_response()
    }
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        match &err {
            PricingError::InvalidQuantity { field, .. } => {
                AppError::validation(*field, err.to_string())
            }
            PricingError::InvalidDateRange { .. } => {
                AppError::validation("check_out_date", err.to_string())
            }
            PricingError::InvalidDiscount(_) => AppError::validation("discount", err.to_string()),
            PricingError::InvalidDistance(_) => {
                AppError::validation("distance_km", err.to_string())
            }
            PricingError::UnknownMenuItem { .. } => AppError::NotFound(err.to_string()),
        }
    }
}

impl From<MoneyError> for AppError {
    fn from(err: MoneyError) -> Self {
        match err {
            MoneyError::Invalid(_) => AppError::BadRequest(err.to_string()),
            MoneyError::OutOfRange(_) => AppError::validation("amount", err.to_string()),
        }
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Empty => AppError::NotFound(err.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}
