use std::sync::Arc;

use poem_openapi::param::Path;
use poem_openapi::payload::Attachment;
use poem_openapi::types::multipart::Upload;
use poem_openapi::{payload::Json, Multipart, OpenApi, Tags};

use crate::api::helpers::{authenticate, require_admin, BearerAuth};
use crate::errors::user::UserError;
use crate::errors::AuthFailure;
use crate::services::tabular::TabularError;
use crate::services::{BulkImporter, TokenService};
use crate::stores::UserStore;
use crate::types::dto::user::{
    ImportSummaryResponse, UpdateUserRequest, UserDataResponse, UserResponse,
};
use crate::types::internal::UserRole;

/// Uploaded tabular file of accounts to create
#[derive(Debug, Multipart)]
pub struct UserImportPayload {
    /// CSV or Excel file with `username` and `email` columns
    pub file: Upload,
}

/// User administration endpoints
pub struct UserApi {
    user_store: Arc<UserStore>,
    token_service: Arc<TokenService>,
    importer: Arc<BulkImporter>,
}

impl UserApi {
    pub fn new(
        user_store: Arc<UserStore>,
        token_service: Arc<TokenService>,
        importer: Arc<BulkImporter>,
    ) -> Self {
        Self {
            user_store,
            token_service,
            importer,
        }
    }

    fn map_import_error(e: TabularError) -> UserError {
        match e {
            TabularError::Unsupported(_) => UserError::unsupported_file(),
            TabularError::Parse(message) => UserError::import_failed(message),
        }
    }

    fn template_csv(header: [&str; 2], example: [&str; 2]) -> Result<Vec<u8>, UserError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(header)
            .and_then(|_| writer.write_record(example))
            .map_err(|e| UserError::internal_error(format!("Failed to build template: {}", e)))?;
        writer
            .into_inner()
            .map_err(|e| UserError::internal_error(format!("Failed to build template: {}", e)))
    }
}

/// API tags for user endpoints
#[derive(Tags)]
enum UserTags {
    /// User administration endpoints
    Users,
}

#[OpenApi]
impl UserApi {
    /// List all users; credentials and OTP state are never exposed
    #[oai(path = "/users", method = "get", tag = "UserTags::Users")]
    async fn list(&self, auth: BearerAuth) -> Result<Json<Vec<UserResponse>>, UserError> {
        authenticate::<UserError>(&self.token_service, &auth)?;

        let users = self
            .user_store
            .list()
            .await
            .map_err(|e| UserError::internal_error(format!("Database error: {}", e)))?;

        Ok(Json(users.into_iter().map(UserResponse::from).collect()))
    }

    /// Get a single user
    #[oai(path = "/users/:id", method = "get", tag = "UserTags::Users")]
    async fn get(&self, auth: BearerAuth, id: Path<i32>) -> Result<Json<UserResponse>, UserError> {
        authenticate::<UserError>(&self.token_service, &auth)?;

        let user = self
            .user_store
            .find_by_id(id.0)
            .await
            .map_err(|e| UserError::internal_error(format!("Database error: {}", e)))?
            .ok_or_else(UserError::not_found)?;

        Ok(Json(user.into()))
    }

    /// Update a user profile.
    ///
    /// Admins may change username, email and role of anyone; a regular user
    /// may only change their own username.
    #[oai(path = "/users/:id", method = "put", tag = "UserTags::Users")]
    async fn update(
        &self,
        auth: BearerAuth,
        id: Path<i32>,
        body: Json<UpdateUserRequest>,
    ) -> Result<Json<UserDataResponse>, UserError> {
        let claims = authenticate::<UserError>(&self.token_service, &auth)?;

        // Re-fetch the caller; the token's role claim may be stale
        let actor = self
            .user_store
            .find_by_id(claims.id)
            .await
            .map_err(|e| UserError::internal_error(format!("Database error: {}", e)))?
            .ok_or_else(UserError::invalid_token)?;

        let body = body.0;
        let updated = match UserRole::from_i16(actor.role) {
            Some(UserRole::Admin) => {
                self.user_store
                    .update_user(id.0, body.username, body.email, body.role)
                    .await?
            }
            Some(UserRole::User) => {
                if actor.id != id.0 {
                    return Err(UserError::forbidden());
                }
                if body.email.is_some() || body.role.is_some() {
                    return Err(UserError::forbidden());
                }
                self.user_store
                    .update_user(id.0, body.username, None, None)
                    .await?
            }
            _ => return Err(UserError::user_banned()),
        };

        Ok(Json(UserDataResponse {
            message: "User updated successfully".to_string(),
            data: updated.into(),
        }))
    }

    /// Create one account per row of an uploaded tabular file; admin-gated
    #[oai(path = "/users/bulk-import", method = "post", tag = "UserTags::Users")]
    async fn bulk_import(
        &self,
        auth: BearerAuth,
        payload: UserImportPayload,
    ) -> Result<Json<ImportSummaryResponse>, UserError> {
        let claims = authenticate::<UserError>(&self.token_service, &auth)?;
        require_admin::<UserError>(&self.user_store, &claims).await?;

        let filename = payload
            .file
            .file_name()
            .map(ToString::to_string)
            .unwrap_or_default();
        let bytes = payload
            .file
            .into_vec()
            .await
            .map_err(|e| UserError::internal_error(format!("Failed to read upload: {}", e)))?;

        let summary = self
            .importer
            .import_users(&filename, &bytes)
            .await
            .map_err(Self::map_import_error)?;

        Ok(Json(ImportSummaryResponse {
            message: "Bulk import finished".to_string(),
            success_count: summary.success_count,
            error_count: summary.error_count,
            errors: summary.errors,
        }))
    }

    /// Download a one-example-row CSV template for bulk operations;
    /// admin-gated. Supported types: `user`, `points`.
    #[oai(path = "/users/download-template/:template_type", method = "get", tag = "UserTags::Users")]
    async fn download_template(
        &self,
        auth: BearerAuth,
        template_type: Path<String>,
    ) -> Result<Attachment<Vec<u8>>, UserError> {
        let claims = authenticate::<UserError>(&self.token_service, &auth)?;
        require_admin::<UserError>(&self.user_store, &claims).await?;

        let data = match template_type.0.as_str() {
            "user" => Self::template_csv(
                ["username", "email"],
                ["example_user", "user@example.com"],
            )?,
            "points" => Self::template_csv(["username", "points"], ["example_user", "200"])?,
            other => return Err(UserError::invalid_template_type(other)),
        };

        Ok(Attachment::new(data).filename(format!("{}_template.csv", template_type.0)))
    }
}
