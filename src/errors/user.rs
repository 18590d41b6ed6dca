use poem_openapi::{payload::Json, ApiResponse};
use std::fmt;

use crate::errors::AuthFailure;
use crate::types::dto::common::ErrorResponse;

/// User administration and bulk import error types
#[derive(ApiResponse, Debug)]
pub enum UserError {
    /// User not found
    #[oai(status = 404)]
    NotFound(Json<ErrorResponse>),

    /// Username already exists
    #[oai(status = 409)]
    DuplicateUsername(Json<ErrorResponse>),

    /// Email already exists
    #[oai(status = 409)]
    DuplicateEmail(Json<ErrorResponse>),

    /// Role value is not one of banned/user/admin
    #[oai(status = 400)]
    InvalidRole(Json<ErrorResponse>),

    /// Unknown template type
    #[oai(status = 400)]
    InvalidTemplateType(Json<ErrorResponse>),

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

    /// Operation requires a higher role or ownership of the record
    #[oai(status = 403)]
    Forbidden(Json<ErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

impl UserError {
    pub fn not_found() -> Self {
        UserError::NotFound(Json(ErrorResponse {
            error: "user_not_found".to_string(),
            message: "User not found".to_string(),
            status_code: 404,
        }))
    }

    pub fn duplicate_username() -> Self {
        UserError::DuplicateUsername(Json(ErrorResponse {
            error: "duplicate_username".to_string(),
            message: "Username already exists".to_string(),
            status_code: 409,
        }))
    }

    pub fn duplicate_email() -> Self {
        UserError::DuplicateEmail(Json(ErrorResponse {
            error: "duplicate_email".to_string(),
            message: "Email already exists".to_string(),
            status_code: 409,
        }))
    }

    pub fn invalid_role() -> Self {
        UserError::InvalidRole(Json(ErrorResponse {
            error: "invalid_role".to_string(),
            message: "Role must be -1 (banned), 0 (user) or 1 (admin)".to_string(),
            status_code: 400,
        }))
    }

    pub fn invalid_template_type(requested: &str) -> Self {
        UserError::InvalidTemplateType(Json(ErrorResponse {
            error: "invalid_template_type".to_string(),
            message: format!("Unknown template type: {}", requested),
            status_code: 400,
        }))
    }

    pub fn unsupported_file() -> Self {
        UserError::UnsupportedFile(Json(ErrorResponse {
            error: "unsupported_file".to_string(),
            message: "Only .csv, .xlsx and .xls files are supported".to_string(),
            status_code: 400,
        }))
    }

    pub fn import_failed(message: String) -> Self {
        UserError::ImportFailed(Json(ErrorResponse {
            error: "import_failed".to_string(),
            message,
            status_code: 502,
        }))
    }

    fn body(&self) -> &ErrorResponse {
        match self {
            UserError::NotFound(json) => &json.0,
            UserError::DuplicateUsername(json) => &json.0,
            UserError::DuplicateEmail(json) => &json.0,
            UserError::InvalidRole(json) => &json.0,
            UserError::InvalidTemplateType(json) => &json.0,
            UserError::UnsupportedFile(json) => &json.0,
            UserError::ImportFailed(json) => &json.0,
            UserError::InvalidToken(json) => &json.0,
            UserError::ExpiredToken(json) => &json.0,
            UserError::UserBanned(json) => &json.0,
            UserError::Forbidden(json) => &json.0,
            UserError::InternalError(json) => &json.0,
        }
    }

    pub fn message(&self) -> String {
        self.body().message.clone()
    }
}

impl AuthFailure for UserError {
    fn invalid_token() -> Self {
        UserError::InvalidToken(Json(ErrorResponse {
            error: "invalid_token".to_string(),
            message: "Invalid or malformed session token".to_string(),
            status_code: 401,
        }))
    }

    fn expired_token() -> Self {
        UserError::ExpiredToken(Json(ErrorResponse {
            error: "expired_token".to_string(),
            message: "Session token has expired".to_string(),
            status_code: 401,
        }))
    }

    fn user_banned() -> Self {
        UserError::UserBanned(Json(ErrorResponse {
            error: "user_banned".to_string(),
            message: "Account has been banned".to_string(),
            status_code: 403,
        }))
    }

    fn forbidden() -> Self {
        UserError::Forbidden(Json(ErrorResponse {
            error: "forbidden".to_string(),
            message: "Insufficient permissions".to_string(),
            status_code: 403,
        }))
    }

    fn internal_error(message: String) -> Self {
        UserError::InternalError(Json(ErrorResponse {
            error: "internal_error".to_string(),
            message,
            status_code: 500,
        }))
    }
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
