use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Request model for user registration
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Username, unique across all users
    pub username: String,

    /// Password in plaintext; stored only as a hash
    pub password: String,

    /// Email address, unique across all users
    pub email: String,
}

/// Request model for password login
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Email address of the account
    pub email: String,

    /// Password for authentication
    pub password: String,
}

/// Response model carrying a freshly minted session token
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed session token (JWT)
    pub token: String,

    /// Success message
    pub message: String,
}

/// Request model for sending a one-time code
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct SendOtpRequest {
    /// Email address of the account
    pub email: String,
}

/// Request model for verifying a one-time code
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    /// Email address of the account
    pub email: String,

    /// Submitted one-time code; compared by numeric value
    pub otp: String,
}
