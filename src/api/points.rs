use std::sync::Arc;

use poem_openapi::types::multipart::Upload;
use poem_openapi::{payload::Json, Multipart, OpenApi, Tags};

use crate::api::helpers::{authenticate, require_admin, BearerAuth};
use crate::errors::points::PointsError;
use crate::errors::AuthFailure;
use crate::services::tabular::TabularError;
use crate::services::{BulkImporter, TokenService};
use crate::stores::{PointsStore, UserStore};
use crate::types::dto::common::MessageResponse;
use crate::types::dto::points::{ManualPointsRequest, TransferRequest, TransferResponse};
use crate::types::dto::user::ImportSummaryResponse;

/// Uploaded tabular file of per-user point grants
#[derive(Debug, Multipart)]
pub struct PointsImportPayload {
    /// CSV or Excel file with `username` and `points` columns
    pub file: Upload,
}

/// Points ledger endpoints
pub struct PointsApi {
    points_store: Arc<PointsStore>,
    user_store: Arc<UserStore>,
    token_service: Arc<TokenService>,
    importer: Arc<BulkImporter>,
}

impl PointsApi {
    pub fn new(
        points_store: Arc<PointsStore>,
        user_store: Arc<UserStore>,
        token_service: Arc<TokenService>,
        importer: Arc<BulkImporter>,
    ) -> Self {
        Self {
            points_store,
            user_store,
            token_service,
            importer,
        }
    }

    fn map_import_error(e: TabularError) -> PointsError {
        match e {
            TabularError::Unsupported(_) => PointsError::unsupported_file(),
            TabularError::Parse(message) => PointsError::import_failed(message),
        }
    }
}

/// API tags for points endpoints
#[derive(Tags)]
enum PointsTags {
    /// Points ledger endpoints
    Points,
}

#[OpenApi(prefix_path = "/points")]
impl PointsApi {
    /// Transfer points from the caller to another user
    #[oai(path = "/transfer-points", method = "post", tag = "PointsTags::Points")]
    async fn transfer(
        &self,
        auth: BearerAuth,
        body: Json<TransferRequest>,
    ) -> Result<Json<TransferResponse>, PointsError> {
        let claims = authenticate::<PointsError>(&self.token_service, &auth)?;

        let description = self
            .points_store
            .transfer(claims.id, body.to_user_id, body.points)
            .await?;

        Ok(Json(TransferResponse {
            message: "Points transferred successfully".to_string(),
            description,
        }))
    }

    /// Grant points to a set of users; admin-gated
    #[oai(path = "/manual-points", method = "post", tag = "PointsTags::Points")]
    async fn manual_points(
        &self,
        auth: BearerAuth,
        body: Json<ManualPointsRequest>,
    ) -> Result<Json<MessageResponse>, PointsError> {
        let claims = authenticate::<PointsError>(&self.token_service, &auth)?;
        require_admin::<PointsError>(&self.user_store, &claims).await?;

        self.points_store.grant(&body.user_ids, body.points).await?;

        Ok(Json(MessageResponse {
            message: "Points granted successfully".to_string(),
        }))
    }

    /// Grant points per row of an uploaded tabular file; admin-gated
    #[oai(path = "/bulk-import", method = "post", tag = "PointsTags::Points")]
    async fn bulk_import(
        &self,
        auth: BearerAuth,
        payload: PointsImportPayload,
    ) -> Result<Json<ImportSummaryResponse>, PointsError> {
        let claims = authenticate::<PointsError>(&self.token_service, &auth)?;
        require_admin::<PointsError>(&self.user_store, &claims).await?;

        let filename = payload
            .file
            .file_name()
            .map(ToString::to_string)
            .unwrap_or_default();
        let bytes = payload
            .file
            .into_vec()
            .await
            .map_err(|e| PointsError::internal_error(format!("Failed to read upload: {}", e)))?;

        let summary = self
            .importer
            .import_points(&filename, &bytes)
            .await
            .map_err(Self::map_import_error)?;

        Ok(Json(ImportSummaryResponse {
            message: "Bulk import finished".to_string(),
            success_count: summary.success_count,
            error_count: summary.error_count,
            errors: summary.errors,
        }))
    }
}
