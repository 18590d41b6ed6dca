use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::types::db::user;

/// User view with credentials and OTP state excluded
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,

    /// -1: banned, 0: user, 1: admin
    pub role: i16,

    /// Current points balance
    pub points: i32,

    pub created_at: i64,
    pub last_login_at: Option<i64>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            role: model.role,
            points: model.points,
            created_at: model.created_at,
            last_login_at: model.last_login_at,
        }
    }
}

/// Request model for updating a user profile.
///
/// Admins may set every field on any user; a regular user may only change
/// their own username.
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,

    /// -1: banned, 0: user, 1: admin
    pub role: Option<i16>,
}

/// Response model wrapping a user with a message
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UserDataResponse {
    pub message: String,
    pub data: UserResponse,
}

/// Outcome of a bulk import run
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct ImportSummaryResponse {
    pub message: String,

    /// Rows applied
    pub success_count: u32,

    /// Rows skipped
    pub error_count: u32,

    /// One entry per skipped row
    pub errors: Vec<String>,
}
