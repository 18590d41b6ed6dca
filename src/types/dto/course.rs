use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::types::db::{course, course_registration, recommended_course};

/// Course view returned by catalog endpoints
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CourseResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub instructor: String,

    /// Course date (Unix timestamp)
    pub course_date: i64,
    pub image_url: Option<String>,
    pub max_participants: i32,

    /// Sign-up window (Unix timestamps)
    pub sign_up_start_date: i64,
    pub sign_up_end_date: i64,

    /// 0: draft, 1: published, 2: closed
    pub status: i16,

    /// Recommendation this course was promoted from, if any
    pub recommended_course_id: Option<i32>,

    pub created_at: i64,
    pub updated_at: i64,
}

impl From<course::Model> for CourseResponse {
    fn from(model: course::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            instructor: model.instructor,
            course_date: model.course_date,
            image_url: model.image_url,
            max_participants: model.max_participants,
            sign_up_start_date: model.sign_up_start_date,
            sign_up_end_date: model.sign_up_end_date,
            status: model.status,
            recommended_course_id: model.recommended_course_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Request model for creating a course; every field is required
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: String,
    pub instructor: String,

    /// Course date (Unix timestamp); must not precede the sign-up deadline
    pub course_date: i64,
    pub image_url: String,
    pub max_participants: i32,
    pub sign_up_start_date: i64,
    pub sign_up_end_date: i64,
}

/// Request model for updating a course
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UpdateCourseRequest {
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub course_date: i64,
    pub image_url: String,
    pub max_participants: i32,
    pub sign_up_start_date: i64,
    pub sign_up_end_date: i64,
}

/// Recommendation view returned by workflow endpoints
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub id: i32,

    /// Submitting user
    pub user_id: i32,
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub image_url: Option<String>,

    /// 0: pending, 1: approved, 2: rejected
    pub status: i16,

    pub created_at: i64,
    pub updated_at: i64,
}

impl From<recommended_course::Model> for RecommendationResponse {
    fn from(model: recommended_course::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            description: model.description,
            instructor: model.instructor,
            image_url: model.image_url,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Listing of recommendations, newest first
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct RecommendationListResponse {
    /// Number of rows returned
    pub count: u64,
    pub courses: Vec<RecommendationResponse>,
}

/// Request model for submitting a course recommendation
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct SubmitRecommendationRequest {
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub image_url: Option<String>,
}

/// Request model for editing a pending recommendation
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct EditRecommendationRequest {
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub image_url: Option<String>,
}

/// Request model for approving a recommendation.
///
/// The date/capacity fields are required; the remaining fields override the
/// recommendation's values on the promoted course when supplied.
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct ApproveRecommendationRequest {
    pub course_date: i64,
    pub sign_up_end_date: i64,
    pub max_participants: i32,
    pub sign_up_start_date: i64,

    pub title: Option<String>,
    pub description: Option<String>,
    pub instructor: Option<String>,
    pub image_url: Option<String>,
}

/// Response model wrapping a recommendation with a message
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct RecommendationDataResponse {
    pub message: String,
    pub data: RecommendationResponse,
}

/// Response model wrapping a course with a message
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CourseDataResponse {
    pub message: String,
    pub data: CourseResponse,
}

/// Registration view returned by sign-up endpoints
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub id: i32,
    pub user_id: i32,
    pub course_id: i32,

    /// 0: upcoming, 1: closed, 2: canceled
    pub registration_status: i16,
    pub points_deducted: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<course_registration::Model> for RegistrationResponse {
    fn from(model: course_registration::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            course_id: model.course_id,
            registration_status: model.registration_status,
            points_deducted: model.points_deducted,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Response model wrapping a registration with a message
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct RegistrationDataResponse {
    pub message: String,
    pub data: RegistrationResponse,
}

/// Response model for course image upload
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct ImageUploadResponse {
    /// Public URL of the stored image
    pub image_url: String,
}
