use std::sync::Arc;

use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::api::helpers::{authenticate, require_admin, BearerAuth};
use crate::errors::auth::AuthError;
use crate::errors::AuthFailure;
use crate::services::{OtpAuthenticator, TokenService};
use crate::stores::UserStore;
use crate::types::dto::auth::{
    LoginRequest, RegisterRequest, SendOtpRequest, TokenResponse, VerifyOtpRequest,
};
use crate::types::dto::common::MessageResponse;
use crate::types::internal::UserRole;

/// Authentication API endpoints
pub struct AuthApi {
    user_store: Arc<UserStore>,
    token_service: Arc<TokenService>,
    otp: Arc<OtpAuthenticator>,
}

impl AuthApi {
    pub fn new(
        user_store: Arc<UserStore>,
        token_service: Arc<TokenService>,
        otp: Arc<OtpAuthenticator>,
    ) -> Self {
        Self {
            user_store,
            token_service,
            otp,
        }
    }

    fn check_registration_fields(body: &RegisterRequest) -> Result<(), AuthError> {
        if body.username.trim().is_empty()
            || body.password.is_empty()
            || body.email.trim().is_empty()
        {
            return Err(AuthError::missing_fields());
        }
        Ok(())
    }
}

/// API tags for authentication endpoints
#[derive(Tags)]
enum AuthTags {
    /// Authentication endpoints
    Authentication,
}

#[OpenApi(prefix_path = "/auth")]
impl AuthApi {
    /// Register a regular user account
    #[oai(path = "/register", method = "post", tag = "AuthTags::Authentication")]
    async fn register(&self, body: Json<RegisterRequest>) -> Result<Json<MessageResponse>, AuthError> {
        Self::check_registration_fields(&body)?;

        let user = self
            .user_store
            .register(&body.username, &body.password, &body.email, UserRole::User)
            .await?;

        tracing::info!(user_id = user.id, "user registered");

        Ok(Json(MessageResponse {
            message: "User registered successfully".to_string(),
        }))
    }

    /// Register an admin account; admin-gated
    #[oai(path = "/admin/register", method = "post", tag = "AuthTags::Authentication")]
    async fn register_admin(
        &self,
        auth: BearerAuth,
        body: Json<RegisterRequest>,
    ) -> Result<Json<MessageResponse>, AuthError> {
        let claims = authenticate::<AuthError>(&self.token_service, &auth)?;
        require_admin::<AuthError>(&self.user_store, &claims).await?;

        Self::check_registration_fields(&body)?;

        let user = self
            .user_store
            .register(&body.username, &body.password, &body.email, UserRole::Admin)
            .await?;

        tracing::info!(user_id = user.id, created_by = claims.id, "admin registered");

        Ok(Json(MessageResponse {
            message: "Admin registered successfully".to_string(),
        }))
    }

    /// Login with email and password to receive a session token
    #[oai(path = "/login", method = "post", tag = "AuthTags::Authentication")]
    async fn login(&self, body: Json<LoginRequest>) -> Result<Json<TokenResponse>, AuthError> {
        if body.email.trim().is_empty() || body.password.is_empty() {
            return Err(AuthError::missing_fields());
        }

        let user = self.user_store.login(&body.email, &body.password).await?;

        let token = self
            .token_service
            .generate_token(&user)
            .map_err(|e| AuthError::internal_error(e.to_string()))?;

        Ok(Json(TokenResponse {
            token,
            message: "Login successful".to_string(),
        }))
    }

    /// Email a one-time login code to the account
    #[oai(path = "/send-otp", method = "post", tag = "AuthTags::Authentication")]
    async fn send_otp(&self, body: Json<SendOtpRequest>) -> Result<Json<MessageResponse>, AuthError> {
        self.otp.issue(&body.email).await?;

        Ok(Json(MessageResponse {
            message: "One-time code sent".to_string(),
        }))
    }

    /// Verify a one-time code and receive a session token
    #[oai(path = "/verify-otp", method = "post", tag = "AuthTags::Authentication")]
    async fn verify_otp(&self, body: Json<VerifyOtpRequest>) -> Result<Json<TokenResponse>, AuthError> {
        let (_user, token) = self.otp.verify(&body.email, &body.otp).await?;

        Ok(Json(TokenResponse {
            token,
            message: "One-time code verified".to_string(),
        }))
    }
}
