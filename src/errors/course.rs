use poem_openapi::{payload::Json, ApiResponse};
use std::fmt;

use crate::errors::AuthFailure;
use crate::types::dto::common::ErrorResponse;

/// Course catalog, recommendation workflow and registration error types
#[derive(ApiResponse, Debug)]
pub enum CourseError {
    /// Required fields are missing or empty
    #[oai(status = 400)]
    MissingFields(Json<ErrorResponse>),

    /// Course date precedes the sign-up deadline
    #[oai(status = 400)]
    InvalidDateRange(Json<ErrorResponse>),

    /// Sign-up start date is after the sign-up deadline
    #[oai(status = 400)]
    InvalidSignupWindow(Json<ErrorResponse>),

    /// Maximum participant count is out of range
    #[oai(status = 400)]
    InvalidCapacity(Json<ErrorResponse>),

    /// Course not found
    #[oai(status = 404)]
    NotFound(Json<ErrorResponse>),

    /// Recommendation not found
    #[oai(status = 404)]
    RecommendationNotFound(Json<ErrorResponse>),

    /// No active registration for this user and course
    #[oai(status = 404)]
    RegistrationNotFound(Json<ErrorResponse>),

    /// Course exists but is not in a status this transition accepts
    #[oai(status = 409)]
    StatusConflict(Json<ErrorResponse>),

    /// Recommendation has already been approved or rejected
    #[oai(status = 409)]
    AlreadyReviewed(Json<ErrorResponse>),

    /// Cap of concurrently published courses reached
    #[oai(status = 409)]
    PublishLimitReached(Json<ErrorResponse>),

    /// Current time is outside the sign-up window
    #[oai(status = 409)]
    SignupWindowClosed(Json<ErrorResponse>),

    /// Course has no remaining capacity
    #[oai(status = 409)]
    CourseFull(Json<ErrorResponse>),

    /// User already holds an upcoming registration for this course
    #[oai(status = 409)]
    AlreadyRegistered(Json<ErrorResponse>),

    /// Image upload to blob storage failed
    #[oai(status = 502)]
    UploadFailed(Json<ErrorResponse>),

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

impl CourseError {
    pub fn missing_fields(message: &str) -> Self {
        CourseError::MissingFields(Json(ErrorResponse {
            error: "missing_fields".to_string(),
            message: message.to_string(),
            status_code: 400,
        }))
    }

    pub fn invalid_date_range() -> Self {
        CourseError::InvalidDateRange(Json(ErrorResponse {
            error: "invalid_date_range".to_string(),
            message: "Course date must not precede the sign-up deadline".to_string(),
            status_code: 400,
        }))
    }

    pub fn invalid_signup_window() -> Self {
        CourseError::InvalidSignupWindow(Json(ErrorResponse {
            error: "invalid_signup_window".to_string(),
            message: "Sign-up start date must not be after the sign-up deadline".to_string(),
            status_code: 400,
        }))
    }

    pub fn invalid_capacity(message: &str) -> Self {
        CourseError::InvalidCapacity(Json(ErrorResponse {
            error: "invalid_capacity".to_string(),
            message: message.to_string(),
            status_code: 400,
        }))
    }

    pub fn not_found() -> Self {
        CourseError::NotFound(Json(ErrorResponse {
            error: "course_not_found".to_string(),
            message: "Course not found".to_string(),
            status_code: 404,
        }))
    }

    pub fn recommendation_not_found() -> Self {
        CourseError::RecommendationNotFound(Json(ErrorResponse {
            error: "recommendation_not_found".to_string(),
            message: "Recommended course not found".to_string(),
            status_code: 404,
        }))
    }

    pub fn registration_not_found() -> Self {
        CourseError::RegistrationNotFound(Json(ErrorResponse {
            error: "registration_not_found".to_string(),
            message: "No upcoming registration for this course".to_string(),
            status_code: 404,
        }))
    }

    pub fn status_conflict(message: &str) -> Self {
        CourseError::StatusConflict(Json(ErrorResponse {
            error: "status_conflict".to_string(),
            message: message.to_string(),
            status_code: 409,
        }))
    }

    pub fn already_reviewed() -> Self {
        CourseError::AlreadyReviewed(Json(ErrorResponse {
            error: "already_reviewed".to_string(),
            message: "Recommendation has already been reviewed".to_string(),
            status_code: 409,
        }))
    }

    pub fn publish_limit_reached() -> Self {
        CourseError::PublishLimitReached(Json(ErrorResponse {
            error: "publish_limit_reached".to_string(),
            message: "Maximum number of published courses reached".to_string(),
            status_code: 409,
        }))
    }

    pub fn signup_window_closed() -> Self {
        CourseError::SignupWindowClosed(Json(ErrorResponse {
            error: "signup_window_closed".to_string(),
            message: "Sign-up window for this course is closed".to_string(),
            status_code: 409,
        }))
    }

    pub fn course_full() -> Self {
        CourseError::CourseFull(Json(ErrorResponse {
            error: "course_full".to_string(),
            message: "Course has no remaining capacity".to_string(),
            status_code: 409,
        }))
    }

    pub fn already_registered() -> Self {
        CourseError::AlreadyRegistered(Json(ErrorResponse {
            error: "already_registered".to_string(),
            message: "Already registered for this course".to_string(),
            status_code: 409,
        }))
    }

    pub fn upload_failed(message: String) -> Self {
        CourseError::UploadFailed(Json(ErrorResponse {
            error: "upload_failed".to_string(),
            message,
            status_code: 502,
        }))
    }

    fn body(&self) -> &ErrorResponse {
        match self {
            CourseError::MissingFields(json) => &json.0,
            CourseError::InvalidDateRange(json) => &json.0,
            CourseError::InvalidSignupWindow(json) => &json.0,
            CourseError::InvalidCapacity(json) => &json.0,
            CourseError::NotFound(json) => &json.0,
            CourseError::RecommendationNotFound(json) => &json.0,
            CourseError::RegistrationNotFound(json) => &json.0,
            CourseError::StatusConflict(json) => &json.0,
            CourseError::AlreadyReviewed(json) => &json.0,
            CourseError::PublishLimitReached(json) => &json.0,
            CourseError::SignupWindowClosed(json) => &json.0,
            CourseError::CourseFull(json) => &json.0,
            CourseError::AlreadyRegistered(json) => &json.0,
            CourseError::UploadFailed(json) => &json.0,
            CourseError::InvalidToken(json) => &json.0,
            CourseError::ExpiredToken(json) => &json.0,
            CourseError::UserBanned(json) => &json.0,
            CourseError::Forbidden(json) => &json.0,
            CourseError::InternalError(json) => &json.0,
        }
    }

    pub fn message(&self) -> String {
        self.body().message.clone()
    }
}

impl AuthFailure for CourseError {
    fn invalid_token() -> Self {
        CourseError::InvalidToken(Json(ErrorResponse {
            error: "invalid_token".to_string(),
            message: "Invalid or malformed session token".to_string(),
            status_code: 401,
        }))
    }

    fn expired_token() -> Self {
        CourseError::ExpiredToken(Json(ErrorResponse {
            error: "expired_token".to_string(),
            message: "Session token has expired".to_string(),
            status_code: 401,
        }))
    }

    fn user_banned() -> Self {
        CourseError::UserBanned(Json(ErrorResponse {
            error: "user_banned".to_string(),
            message: "Account has been banned".to_string(),
            status_code: 403,
        }))
    }

    fn forbidden() -> Self {
        CourseError::Forbidden(Json(ErrorResponse {
            error: "forbidden".to_string(),
            message: "Admin role required".to_string(),
            status_code: 403,
        }))
    }

    fn internal_error(message: String) -> Self {
        CourseError::InternalError(Json(ErrorResponse {
            error: "internal_error".to_string(),
            message,
            status_code: 500,
        }))
    }
}

impl fmt::Display for CourseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
