use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::domain::{Decimal, Symbol};

/// Rejections raised by simulation commands.
///
/// All of them are recoverable; state is left untouched when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("Invalid amount: quantity must be a positive number")]
    InvalidAmount,
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Decimal, available: Decimal },
    #[error("Insufficient holdings of {symbol}: requested {requested}, held {held}")]
    InsufficientHoldings {
        symbol: Symbol,
        requested: Decimal,
        held: Decimal,
    },
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(Symbol),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Rejected: {0}")]
    Rejected(String),
}

impl From<SimError> for AppError {
    fn from(err: SimError) -> Self {
        match err {
            SimError::InvalidAmount => AppError::BadRequest(err.to_string()),
            SimError::UnknownSymbol(_) => AppError::NotFound(err.to_string()),
            SimError::InsufficientFunds { .. } | SimError::InsufficientHoldings { .. } => {
                AppError::Rejected(err.to_string())
            }
        }
    }
}

impl From<crate::settings::SettingsError> for AppError {
    fn from(err: crate::settings::SettingsError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Rejected(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
