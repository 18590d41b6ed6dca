use poem_openapi::{payload::Json, ApiResponse};
use std::fmt;

use crate::errors::AuthFailure;
use crate::types::dto::common::ErrorResponse;

/// Points ledger error types
#[derive(ApiResponse, Debug)]
pub enum PointsError {
    /// Transfer amount is zero or negative, or grant amount is negative
    #[oai(status = 400)]
    InvalidAmount(Json<ErrorResponse>),

    /// Sender and recipient are the same user
    #[oai(status = 409)]
    SelfTransfer(Json<ErrorResponse>),

    /// Recipient user does not exist
    #[oai(status = 404)]
    RecipientNotFound(Json<ErrorResponse>),

    /// Sender balance is lower than the transfer amount
    #[oai(status = 422)]
    InsufficientBalance(Json<ErrorResponse>),

    /// Uploaded file has an unsupported extension
    #[oai(status = 400)]
    UnsupportedFile(Json<ErrorResponse>),

    /// Tabular file could not be parsed
    #[oai(status = 502)]
    ImportFailed(Json<ErrorResponse>),

    /// Invalid or malformed session token
    #[oai(status = 401)]
    InvalidToken(Json<ErrorResponse>),

    /// Session token has expired
    #[oai(status = 401)]
    ExpiredToken(Json<ErrorResponse>),

    /// Account has been banned
    #[oai(status = 403)]
    UserBanned(Json<ErrorResponse>),

    /// Admin role required
    #[oai(status = 403)]
    Forbidden(Json<ErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

impl PointsError {
    pub fn invalid_amount(message: &str) -> Self {
        PointsError::InvalidAmount(Json(ErrorResponse {
            error: "invalid_amount".to_string(),
            message: message.to_string(),
            status_code: 400,
        }))
    }

    pub fn self_transfer() -> Self {
        PointsError::SelfTransfer(Json(ErrorResponse {
            error: "self_transfer".to_string(),
            message: "Points cannot be transferred to yourself".to_string(),
            status_code: 409,
        }))
    }

    pub fn recipient_not_found(user_id: i32) -> Self {
        PointsError::RecipientNotFound(Json(ErrorResponse {
            error: "recipient_not_found".to_string(),
            message: format!("Recipient user not found: {}", user_id),
            status_code: 404,
        }))
    }

    pub fn insufficient_balance() -> Self {
        PointsError::InsufficientBalance(Json(ErrorResponse {
            error: "insufficient_balance".to_string(),
            message: "Transfer amount exceeds the available balance".to_string(),
            status_code: 422,
        }))
    }

    pub fn unsupported_file() -> Self {
        PointsError::UnsupportedFile(Json(ErrorResponse {
            error: "unsupported_file".to_string(),
            message: "Only .csv, .xlsx and .xls files are supported".to_string(),
            status_code: 400,
        }))
    }

    pub fn import_failed(message: String) -> Self {
        PointsError::ImportFailed(Json(ErrorResponse {
            error: "import_failed".to_string(),
            message,
            status_code: 502,
        }))
    }

    fn body(&self) -> &ErrorResponse {
        match self {
            PointsError::InvalidAmount(json) => &json.0,
            PointsError::SelfTransfer(json) => &json.0,
            PointsError::RecipientNotFound(json) => &json.0,
            PointsError::InsufficientBalance(json) => &json.0,
            PointsError::UnsupportedFile(json) => &json.0,
            PointsError::ImportFailed(json) => &json.0,
            PointsError::InvalidToken(json) => &json.0,
            PointsError::ExpiredToken(json) => &json.0,
            PointsError::UserBanned(json) => &json.0,
            PointsError::Forbidden(json) => &json.0,
            PointsError::InternalError(json) => &json.0,
        }
    }

    pub fn message(&self) -> String {
        self.body().message.clone()
    }
}

impl AuthFailure for PointsError {
    fn invalid_token() -> Self {
        PointsError::InvalidToken(Json(ErrorResponse {
            error: "invalid_token".to_string(),
            message: "Invalid or malformed session token".to_string(),
            status_code: 401,
        }))
    }

    fn expired_token() -> Self {
        PointsError::ExpiredToken(Json(ErrorResponse {
            error: "expired_token".to_string(),
            message: "Session token has expired".to_string(),
            status_code: 401,
        }))
    }

    fn user_banned() -> Self {
        PointsError::UserBanned(Json(ErrorResponse {
            error: "user_banned".to_string(),
            message: "Account has been banned".to_string(),
            status_code: 403,
        }))
    }

    fn forbidden() -> Self {
        PointsError::Forbidden(Json(ErrorResponse {
            error: "forbidden".to_string(),
            message: "Admin role required".to_string(),
            status_code: 403,
        }))
    }

    fn internal_error(message: String) -> Self {
        PointsError::InternalError(Json(ErrorResponse {
            error: "internal_error".to_string(),
            message,
            status_code: 500,
        }))
    }
}

impl fmt::Display for PointsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
