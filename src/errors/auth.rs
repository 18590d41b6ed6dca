use poem_openapi::{payload::Json, ApiResponse};
use std::fmt;

use crate::errors::AuthFailure;
use crate::types::dto::common::ErrorResponse;

/// Authentication error types
#[derive(ApiResponse, Debug)]
pub enum AuthError {
    /// Required fields are missing or empty
    #[oai(status = 400)]
    MissingFields(Json<ErrorResponse>),

    /// Username already exists
    #[oai(status = 409)]
    DuplicateUsername(Json<ErrorResponse>),

    /// Email already exists
    #[oai(status = 409)]
    DuplicateEmail(Json<ErrorResponse>),

    /// Invalid email or password
    #[oai(status = 401)]
    InvalidCredentials(Json<ErrorResponse>),

    /// No account matches the given email
    #[oai(status = 404)]
    UserNotFound(Json<ErrorResponse>),

    /// Account has been banned
    #[oai(status = 403)]
    UserBanned(Json<ErrorResponse>),

    /// One-time code has expired
    #[oai(status = 401)]
    OtpExpired(Json<ErrorResponse>),

    /// One-time code does not match
    #[oai(status = 401)]
    OtpInvalid(Json<ErrorResponse>),

    /// Invalid or malformed session token
    #[oai(status = 401)]
    InvalidToken(Json<ErrorResponse>),

    /// Session token has expired
    #[oai(status = 401)]
    ExpiredToken(Json<ErrorResponse>),

    /// Admin role required
    #[oai(status = 403)]
    Forbidden(Json<ErrorResponse>),

    /// Outbound mail could not be delivered
    #[oai(status = 502)]
    MailDeliveryFailed(Json<ErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

impl AuthError {
    pub fn missing_fields() -> Self {
        AuthError::MissingFields(Json(ErrorResponse {
            error: "missing_fields".to_string(),
            message: "Username, password and email are required".to_string(),
            status_code: 400,
        }))
    }

    pub fn duplicate_username() -> Self {
        AuthError::DuplicateUsername(Json(ErrorResponse {
            error: "duplicate_username".to_string(),
            message: "Username already exists".to_string(),
            status_code: 409,
        }))
    }

    pub fn duplicate_email() -> Self {
        AuthError::DuplicateEmail(Json(ErrorResponse {
            error: "duplicate_email".to_string(),
            message: "Email already exists".to_string(),
            status_code: 409,
        }))
    }

    pub fn invalid_credentials() -> Self {
        AuthError::InvalidCredentials(Json(ErrorResponse {
            error: "invalid_credentials".to_string(),
            message: "Invalid email or password".to_string(),
            status_code: 401,
        }))
    }

    pub fn user_not_found() -> Self {
        AuthError::UserNotFound(Json(ErrorResponse {
            error: "user_not_found".to_string(),
            message: "No account matches the given email".to_string(),
            status_code: 404,
        }))
    }

    pub fn otp_expired() -> Self {
        AuthError::OtpExpired(Json(ErrorResponse {
            error: "otp_expired".to_string(),
            message: "One-time code has expired".to_string(),
            status_code: 401,
        }))
    }

    pub fn otp_invalid() -> Self {
        AuthError::OtpInvalid(Json(ErrorResponse {
            error: "otp_invalid".to_string(),
            message: "One-time code is incorrect".to_string(),
            status_code: 401,
        }))
    }

    pub fn mail_delivery_failed(message: String) -> Self {
        AuthError::MailDeliveryFailed(Json(ErrorResponse {
            error: "mail_delivery_failed".to_string(),
            message,
            status_code: 502,
        }))
    }

    fn body(&self) -> &ErrorResponse {
        match self {
            AuthError::MissingFields(json) => &json.0,
            AuthError::DuplicateUsername(json) => &json.0,
            AuthError::DuplicateEmail(json) => &json.0,
            AuthError::InvalidCredentials(json) => &json.0,
            AuthError::UserNotFound(json) => &json.0,
            AuthError::UserBanned(json) => &json.0,
            AuthError::OtpExpired(json) => &json.0,
            AuthError::OtpInvalid(json) => &json.0,
            AuthError::InvalidToken(json) => &json.0,
            AuthError::ExpiredToken(json) => &json.0,
            AuthError::Forbidden(json) => &json.0,
            AuthError::MailDeliveryFailed(json) => &json.0,
            AuthError::InternalError(json) => &json.0,
        }
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        self.body().message.clone()
    }
}

impl AuthFailure for AuthError {
    fn invalid_token() -> Self {
        AuthError::InvalidToken(Json(ErrorResponse {
            error: "invalid_token".to_string(),
            message: "Invalid or malformed session token".to_string(),
            status_code: 401,
        }))
    }

    fn expired_token() -> Self {
        AuthError::ExpiredToken(Json(ErrorResponse {
            error: "expired_token".to_string(),
            message: "Session token has expired".to_string(),
            status_code: 401,
        }))
    }

    fn user_banned() -> Self {
        AuthError::UserBanned(Json(ErrorResponse {
            error: "user_banned".to_string(),
            message: "Account has been banned".to_string(),
            status_code: 403,
        }))
    }

    fn forbidden() -> Self {
        AuthError::Forbidden(Json(ErrorResponse {
            error: "forbidden".to_string(),
            message: "Admin role required".to_string(),
            status_code: 403,
        }))
    }

    fn internal_error(message: String) -> Self {
        AuthError::InternalError(Json(ErrorResponse {
            error: "internal_error".to_string(),
            message,
            status_code: 500,
        }))
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
