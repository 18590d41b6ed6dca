use std::sync::Arc;

use poem_openapi::param::Path;
use poem_openapi::types::multipart::Upload;
use poem_openapi::{payload::Json, Multipart, OpenApi, Tags};

use crate::api::helpers::{authenticate, require_admin, BearerAuth};
use crate::errors::course::CourseError;
use crate::errors::AuthFailure;
use crate::services::{BlobStore, TokenService};
use crate::stores::course_store::CourseFields;
use crate::stores::recommendation_store::{ApprovalFields, RecommendationFields};
use crate::stores::{CourseStore, RecommendationStore, RegistrationStore, UserStore};
use crate::types::dto::common::MessageResponse;
use crate::types::dto::course::{
    ApproveRecommendationRequest, CourseDataResponse, CourseResponse, CreateCourseRequest,
    EditRecommendationRequest, ImageUploadResponse, RecommendationDataResponse,
    RecommendationListResponse, RecommendationResponse, RegistrationDataResponse,
    SubmitRecommendationRequest, UpdateCourseRequest,
};

/// Uploaded course image
#[derive(Debug, Multipart)]
pub struct UploadImagePayload {
    /// Image file
    pub image: Upload,
}

/// Course catalog, recommendation workflow and registration endpoints
pub struct CourseApi {
    course_store: Arc<CourseStore>,
    recommendation_store: Arc<RecommendationStore>,
    registration_store: Arc<RegistrationStore>,
    user_store: Arc<UserStore>,
    token_service: Arc<TokenService>,
    blob_store: Arc<dyn BlobStore>,
}

impl CourseApi {
    pub fn new(
        course_store: Arc<CourseStore>,
        recommendation_store: Arc<RecommendationStore>,
        registration_store: Arc<RegistrationStore>,
        user_store: Arc<UserStore>,
        token_service: Arc<TokenService>,
        blob_store: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            course_store,
            recommendation_store,
            registration_store,
            user_store,
            token_service,
            blob_store,
        }
    }

    async fn admin(&self, auth: &BearerAuth) -> Result<i32, CourseError> {
        let claims = authenticate::<CourseError>(&self.token_service, auth)?;
        require_admin::<CourseError>(&self.user_store, &claims).await?;
        Ok(claims.id)
    }

    fn recommendation_fields(
        title: &str,
        description: &str,
        instructor: &str,
        image_url: Option<String>,
    ) -> Result<RecommendationFields, CourseError> {
        if title.trim().is_empty() || description.trim().is_empty() || instructor.trim().is_empty()
        {
            return Err(CourseError::missing_fields(
                "Title, description and instructor are required",
            ));
        }
        Ok(RecommendationFields {
            title: title.to_string(),
            description: description.to_string(),
            instructor: instructor.to_string(),
            image_url,
        })
    }
}

/// API tags for course endpoints
#[derive(Tags)]
enum CourseTags {
    /// Course catalog endpoints
    Courses,
    /// Recommended course workflow endpoints
    Recommendations,
}

#[OpenApi]
impl CourseApi {
    /// List all courses
    #[oai(path = "/courses", method = "get", tag = "CourseTags::Courses")]
    async fn list(&self, auth: BearerAuth) -> Result<Json<Vec<CourseResponse>>, CourseError> {
        authenticate::<CourseError>(&self.token_service, &auth)?;

        let courses = self.course_store.list().await?;
        Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
    }

    /// Get a single course
    #[oai(path = "/courses/info/:id", method = "get", tag = "CourseTags::Courses")]
    async fn info(&self, auth: BearerAuth, id: Path<i32>) -> Result<Json<CourseResponse>, CourseError> {
        authenticate::<CourseError>(&self.token_service, &auth)?;

        let course = self.course_store.find(id.0).await?;
        Ok(Json(course.into()))
    }

    /// Create a course in draft status; admin-gated
    #[oai(path = "/courses", method = "post", tag = "CourseTags::Courses")]
    async fn create(
        &self,
        auth: BearerAuth,
        body: Json<CreateCourseRequest>,
    ) -> Result<Json<CourseResponse>, CourseError> {
        self.admin(&auth).await?;

        let body = body.0;
        if body.title.trim().is_empty()
            || body.description.trim().is_empty()
            || body.instructor.trim().is_empty()
            || body.image_url.trim().is_empty()
        {
            return Err(CourseError::missing_fields(
                "Title, description, instructor and image URL are required",
            ));
        }

        let course = self
            .course_store
            .create(CourseFields {
                title: body.title,
                description: body.description,
                instructor: body.instructor,
                course_date: body.course_date,
                image_url: Some(body.image_url),
                max_participants: body.max_participants,
                sign_up_start_date: body.sign_up_start_date,
                sign_up_end_date: body.sign_up_end_date,
            })
            .await?;

        Ok(Json(course.into()))
    }

    /// Update a course; admin-gated
    #[oai(path = "/courses/:id", method = "put", tag = "CourseTags::Courses")]
    async fn update(
        &self,
        auth: BearerAuth,
        id: Path<i32>,
        body: Json<UpdateCourseRequest>,
    ) -> Result<Json<CourseResponse>, CourseError> {
        self.admin(&auth).await?;

        let body = body.0;
        let course = self
            .course_store
            .update(
                id.0,
                CourseFields {
                    title: body.title,
                    description: body.description,
                    instructor: body.instructor,
                    course_date: body.course_date,
                    image_url: Some(body.image_url),
                    max_participants: body.max_participants,
                    sign_up_start_date: body.sign_up_start_date,
                    sign_up_end_date: body.sign_up_end_date,
                },
            )
            .await?;

        Ok(Json(course.into()))
    }

    /// Delete a course; admin-gated
    #[oai(path = "/courses/:id", method = "delete", tag = "CourseTags::Courses")]
    async fn delete(&self, auth: BearerAuth, id: Path<i32>) -> Result<Json<MessageResponse>, CourseError> {
        self.admin(&auth).await?;

        self.course_store.delete(id.0).await?;

        Ok(Json(MessageResponse {
            message: "Course deleted successfully".to_string(),
        }))
    }

    /// Publish a course; admin-gated
    #[oai(path = "/courses/:id/publish", method = "put", tag = "CourseTags::Courses")]
    async fn publish(&self, auth: BearerAuth, id: Path<i32>) -> Result<Json<CourseResponse>, CourseError> {
        self.admin(&auth).await?;

        let course = self.course_store.publish(id.0).await?;
        Ok(Json(course.into()))
    }

    /// Close a course; admin-gated
    #[oai(path = "/courses/:id/unpublish", method = "put", tag = "CourseTags::Courses")]
    async fn unpublish(&self, auth: BearerAuth, id: Path<i32>) -> Result<Json<CourseResponse>, CourseError> {
        self.admin(&auth).await?;

        let course = self.course_store.unpublish(id.0).await?;
        Ok(Json(course.into()))
    }

    /// Sign up for a published course
    #[oai(path = "/courses/:id/signup", method = "post", tag = "CourseTags::Courses")]
    async fn signup(
        &self,
        auth: BearerAuth,
        id: Path<i32>,
    ) -> Result<Json<RegistrationDataResponse>, CourseError> {
        let claims = authenticate::<CourseError>(&self.token_service, &auth)?;

        let registration = self.registration_store.register(claims.id, id.0).await?;

        Ok(Json(RegistrationDataResponse {
            message: "Signed up successfully".to_string(),
            data: registration.into(),
        }))
    }

    /// Cancel an upcoming registration
    #[oai(path = "/courses/:id/signup", method = "delete", tag = "CourseTags::Courses")]
    async fn cancel_signup(
        &self,
        auth: BearerAuth,
        id: Path<i32>,
    ) -> Result<Json<RegistrationDataResponse>, CourseError> {
        let claims = authenticate::<CourseError>(&self.token_service, &auth)?;

        let registration = self.registration_store.cancel(claims.id, id.0).await?;

        Ok(Json(RegistrationDataResponse {
            message: "Registration canceled".to_string(),
            data: registration.into(),
        }))
    }

    /// List recommended courses, newest first
    #[oai(path = "/courses/recommended", method = "get", tag = "CourseTags::Recommendations")]
    async fn list_recommended(
        &self,
        auth: BearerAuth,
    ) -> Result<Json<RecommendationListResponse>, CourseError> {
        authenticate::<CourseError>(&self.token_service, &auth)?;

        let recommendations = self.recommendation_store.list().await?;
        let courses: Vec<RecommendationResponse> = recommendations
            .into_iter()
            .map(RecommendationResponse::from)
            .collect();

        Ok(Json(RecommendationListResponse {
            count: courses.len() as u64,
            courses,
        }))
    }

    /// Get a single recommended course
    #[oai(path = "/courses/recommended/:id", method = "get", tag = "CourseTags::Recommendations")]
    async fn recommended_info(
        &self,
        auth: BearerAuth,
        id: Path<i32>,
    ) -> Result<Json<RecommendationResponse>, CourseError> {
        authenticate::<CourseError>(&self.token_service, &auth)?;

        let recommendation = self.recommendation_store.find(id.0).await?;
        Ok(Json(recommendation.into()))
    }

    /// Submit a course recommendation
    #[oai(path = "/courses/recommended", method = "post", tag = "CourseTags::Recommendations")]
    async fn submit_recommendation(
        &self,
        auth: BearerAuth,
        body: Json<SubmitRecommendationRequest>,
    ) -> Result<Json<RecommendationDataResponse>, CourseError> {
        let claims = authenticate::<CourseError>(&self.token_service, &auth)?;

        let body = body.0;
        let fields = Self::recommendation_fields(
            &body.title,
            &body.description,
            &body.instructor,
            body.image_url,
        )?;

        let recommendation = self.recommendation_store.submit(claims.id, fields).await?;

        Ok(Json(RecommendationDataResponse {
            message: "Course recommendation submitted".to_string(),
            data: recommendation.into(),
        }))
    }

    /// Edit a pending recommendation
    #[oai(path = "/courses/recommended/:id", method = "put", tag = "CourseTags::Recommendations")]
    async fn edit_recommendation(
        &self,
        auth: BearerAuth,
        id: Path<i32>,
        body: Json<EditRecommendationRequest>,
    ) -> Result<Json<RecommendationDataResponse>, CourseError> {
        authenticate::<CourseError>(&self.token_service, &auth)?;

        let body = body.0;
        let fields = Self::recommendation_fields(
            &body.title,
            &body.description,
            &body.instructor,
            body.image_url,
        )?;

        let recommendation = self.recommendation_store.edit(id.0, fields).await?;

        Ok(Json(RecommendationDataResponse {
            message: "Course recommendation updated".to_string(),
            data: recommendation.into(),
        }))
    }

    /// Approve a recommendation, promoting it into a course; admin-gated
    #[oai(path = "/courses/recommended/:id/approve", method = "put", tag = "CourseTags::Recommendations")]
    async fn approve_recommendation(
        &self,
        auth: BearerAuth,
        id: Path<i32>,
        body: Json<ApproveRecommendationRequest>,
    ) -> Result<Json<CourseDataResponse>, CourseError> {
        self.admin(&auth).await?;

        let body = body.0;
        let course = self
            .recommendation_store
            .approve(
                id.0,
                ApprovalFields {
                    course_date: body.course_date,
                    sign_up_end_date: body.sign_up_end_date,
                    max_participants: body.max_participants,
                    sign_up_start_date: body.sign_up_start_date,
                    title: body.title,
                    description: body.description,
                    instructor: body.instructor,
                    image_url: body.image_url,
                },
            )
            .await?;

        Ok(Json(CourseDataResponse {
            message: "Course approved".to_string(),
            data: course.into(),
        }))
    }

    /// Reject a recommendation, closing any promoted course; admin-gated
    #[oai(path = "/courses/recommended/:id/reject", method = "put", tag = "CourseTags::Recommendations")]
    async fn reject_recommendation(
        &self,
        auth: BearerAuth,
        id: Path<i32>,
    ) -> Result<Json<RecommendationDataResponse>, CourseError> {
        self.admin(&auth).await?;

        let recommendation = self.recommendation_store.reject(id.0).await?;

        Ok(Json(RecommendationDataResponse {
            message: "Course rejected".to_string(),
            data: recommendation.into(),
        }))
    }

    /// Upload an image for a recommended course
    #[oai(path = "/courses/recommended/:id/image", method = "post", tag = "CourseTags::Recommendations")]
    async fn upload_image(
        &self,
        auth: BearerAuth,
        id: Path<i32>,
        payload: UploadImagePayload,
    ) -> Result<Json<ImageUploadResponse>, CourseError> {
        authenticate::<CourseError>(&self.token_service, &auth)?;

        // Confirm the recommendation exists before accepting the bytes
        self.recommendation_store.find(id.0).await?;

        let filename = payload
            .image
            .file_name()
            .map(ToString::to_string)
            .unwrap_or_else(|| "image".to_string());

        let bytes = payload
            .image
            .into_vec()
            .await
            .map_err(|e| CourseError::internal_error(format!("Failed to read upload: {}", e)))?;

        let key = format!("courses/{}/{}", id.0, filename);
        let image_url = self
            .blob_store
            .upload(bytes, &key)
            .await
            .map_err(|e| CourseError::upload_failed(e.to_string()))?;

        self.recommendation_store.set_image_url(id.0, &image_url).await?;

        Ok(Json(ImageUploadResponse { image_url }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::FsBlobStore;
    use crate::types::internal::{CourseStatus, UserRole};
    use migration::{Migrator, MigratorTrait};
    use poem_openapi::auth::Bearer;
    use sea_orm::Database;

    struct TestContext {
        api: CourseApi,
        admin_token: String,
        user_token: String,
    }

    impl TestContext {
        fn admin_auth(&self) -> BearerAuth {
            BearerAuth(Bearer {
                token: self.admin_token.clone(),
            })
        }

        fn user_auth(&self) -> BearerAuth {
            BearerAuth(Bearer {
                token: self.user_token.clone(),
            })
        }
    }

    async fn setup_api() -> TestContext {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let user_store = Arc::new(UserStore::new(db.clone()));
        let token_service = Arc::new(TokenService::new(
            "test-secret-key-minimum-32-characters".to_string(),
            60,
        ));

        let admin = user_store
            .register("admin", "pw", "admin@example.com", UserRole::Admin)
            .await
            .unwrap();
        let user = user_store
            .register("user", "pw", "user@example.com", UserRole::User)
            .await
            .unwrap();

        let admin_token = token_service.generate_token(&admin).unwrap();
        let user_token = token_service.generate_token(&user).unwrap();

        let blob_root = std::env::temp_dir().join("courseledger-api-test-blobs");
        let api = CourseApi::new(
            Arc::new(CourseStore::new(db.clone())),
            Arc::new(RecommendationStore::new(db.clone())),
            Arc::new(RegistrationStore::new(db.clone())),
            user_store,
            token_service,
            Arc::new(FsBlobStore::new(blob_root, "http://localhost:3000/uploads")),
        );

        TestContext {
            api,
            admin_token,
            user_token,
        }
    }

    fn create_request() -> CreateCourseRequest {
        CreateCourseRequest {
            title: "Rust 101".to_string(),
            description: "Introductory Rust".to_string(),
            instructor: "Ferris".to_string(),
            course_date: 1_900_000_000,
            image_url: "http://example.com/rust.png".to_string(),
            max_participants: 25,
            sign_up_start_date: 1_890_000_000,
            sign_up_end_date: 1_895_000_000,
        }
    }

    #[tokio::test]
    async fn test_create_requires_admin() {
        let ctx = setup_api().await;

        let result = ctx.api.create(ctx.user_auth(), Json(create_request())).await;

        assert!(matches!(result, Err(CourseError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_admin_creates_and_publishes_course() {
        let ctx = setup_api().await;

        let created = ctx
            .api
            .create(ctx.admin_auth(), Json(create_request()))
            .await
            .unwrap();
        assert_eq!(created.status, CourseStatus::Draft.as_i16());

        let published = ctx
            .api
            .publish(ctx.admin_auth(), Path(created.id))
            .await
            .unwrap();
        assert_eq!(published.status, CourseStatus::Published.as_i16());
    }

    #[tokio::test]
    async fn test_submit_and_approve_recommendation() {
        let ctx = setup_api().await;

        let submitted = ctx
            .api
            .submit_recommendation(
                ctx.user_auth(),
                Json(SubmitRecommendationRequest {
                    title: "Soldering".to_string(),
                    description: "Electronics".to_string(),
                    instructor: "Dana".to_string(),
                    image_url: None,
                }),
            )
            .await
            .unwrap();

        let approved = ctx
            .api
            .approve_recommendation(
                ctx.admin_auth(),
                Path(submitted.data.id),
                Json(ApproveRecommendationRequest {
                    course_date: 1_900_000_000,
                    sign_up_end_date: 1_895_000_000,
                    max_participants: 30,
                    sign_up_start_date: 1_890_000_000,
                    title: None,
                    description: None,
                    instructor: None,
                    image_url: None,
                }),
            )
            .await
            .unwrap();

        assert_eq!(approved.data.recommended_course_id, Some(submitted.data.id));
        assert_eq!(approved.data.title, "Soldering");
    }

    #[tokio::test]
    async fn test_submit_rejects_blank_fields() {
        let ctx = setup_api().await;

        let result = ctx
            .api
            .submit_recommendation(
                ctx.user_auth(),
                Json(SubmitRecommendationRequest {
                    title: " ".to_string(),
                    description: "Electronics".to_string(),
                    instructor: "Dana".to_string(),
                    image_url: None,
                }),
            )
            .await;

        assert!(matches!(result, Err(CourseError::MissingFields(_))));
    }
}
