use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppSettings;
use crate::services::mailer::MailError;
use crate::services::{
    BlobStore, BulkImporter, FileTabularReader, FsBlobStore, MailSender, OtpAuthenticator,
    SmtpMailer, TabularReader, TokenService,
};
use crate::stores::{CourseStore, PointsStore, RecommendationStore, RegistrationStore, UserStore};

/// Centralized application data.
///
/// Every store and service is created once here and shared as an `Arc`;
/// the API structs receive the handles they need. No process-wide state.
pub struct AppData {
    pub db: DatabaseConnection,

    pub user_store: Arc<UserStore>,
    pub course_store: Arc<CourseStore>,
    pub recommendation_store: Arc<RecommendationStore>,
    pub registration_store: Arc<RegistrationStore>,
    pub points_store: Arc<PointsStore>,

    pub token_service: Arc<TokenService>,
    pub mailer: Arc<dyn MailSender>,
    pub tabular_reader: Arc<dyn TabularReader>,
    pub blob_store: Arc<dyn BlobStore>,
    pub otp: Arc<OtpAuthenticator>,
    pub importer: Arc<BulkImporter>,
}

impl AppData {
    /// Initialize all application data.
    ///
    /// The database connection should be connected and migrated before this
    /// is called.
    pub fn init(db: DatabaseConnection, settings: &AppSettings) -> Result<Self, MailError> {
        tracing::info!("Initializing AppData...");

        let user_store = Arc::new(UserStore::new(db.clone()));
        let course_store = Arc::new(CourseStore::new(db.clone()));
        let recommendation_store = Arc::new(RecommendationStore::new(db.clone()));
        let registration_store = Arc::new(RegistrationStore::new(db.clone()));
        let points_store = Arc::new(PointsStore::new(db.clone()));

        let token_service = Arc::new(TokenService::new(
            settings.jwt_secret.clone(),
            settings.token_ttl_minutes,
        ));

        let mailer: Arc<dyn MailSender> = Arc::new(SmtpMailer::new(&settings.smtp)?);
        let tabular_reader: Arc<dyn TabularReader> = Arc::new(FileTabularReader);
        let blob_store: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(
            settings.blob_root.clone(),
            settings.blob_public_base_url.clone(),
        ));

        let otp = Arc::new(OtpAuthenticator::new(
            user_store.clone(),
            token_service.clone(),
            mailer.clone(),
            settings.otp_ttl_minutes,
        ));

        let importer = Arc::new(BulkImporter::new(
            user_store.clone(),
            points_store.clone(),
            tabular_reader.clone(),
            settings.default_import_password.clone(),
        ));

        tracing::info!("AppData initialization complete");

        Ok(Self {
            db,
            user_store,
            course_store,
            recommendation_store,
            registration_store,
            points_store,
            token_service,
            mailer,
            tabular_reader,
            blob_store,
            otp,
            importer,
        })
    }
}
