use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::errors::course::CourseError;
use crate::errors::AuthFailure;
use crate::types::db::course::{self, Entity as Course};
use crate::types::db::recommended_course::{self, Entity as RecommendedCourse};
use crate::types::internal::{CourseStatus, RecommendationStatus};

/// Listing page size for recommendations
const LIST_LIMIT: u64 = 10;

/// Editable fields of a recommendation
#[derive(Debug, Clone)]
pub struct RecommendationFields {
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub image_url: Option<String>,
}

/// Scheduling fields required for approval, plus optional overrides of the
/// recommendation's own values
#[derive(Debug, Clone)]
pub struct ApprovalFields {
    pub course_date: i64,
    pub sign_up_end_date: i64,
    pub max_participants: i32,
    pub sign_up_start_date: i64,

    pub title: Option<String>,
    pub description: Option<String>,
    pub instructor: Option<String>,
    pub image_url: Option<String>,
}

impl ApprovalFields {
    fn validate(&self) -> Result<(), CourseError> {
        if self.course_date < self.sign_up_end_date {
            return Err(CourseError::invalid_date_range());
        }
        if self.sign_up_start_date > self.sign_up_end_date {
            return Err(CourseError::invalid_signup_window());
        }
        if self.max_participants < 1 {
            return Err(CourseError::invalid_capacity(
                "Maximum participants must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Recommendation workflow: user submissions with admin approve/reject
/// transitions that promote a recommendation into a real course.
pub struct RecommendationStore {
    db: DatabaseConnection,
}

impl RecommendationStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Most recent recommendations, newest first
    pub async fn list(&self) -> Result<Vec<recommended_course::Model>, CourseError> {
        RecommendedCourse::find()
            .order_by_desc(recommended_course::Column::CreatedAt)
            .limit(LIST_LIMIT)
            .all(&self.db)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))
    }

    pub async fn find(&self, id: i32) -> Result<recommended_course::Model, CourseError> {
        RecommendedCourse::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))?
            .ok_or_else(CourseError::recommendation_not_found)
    }

    /// Create a pending recommendation owned by the submitting user
    pub async fn submit(
        &self,
        user_id: i32,
        fields: RecommendationFields,
    ) -> Result<recommended_course::Model, CourseError> {
        let now = Utc::now().timestamp();
        let new_recommendation = recommended_course::ActiveModel {
            user_id: Set(user_id),
            title: Set(fields.title),
            description: Set(fields.description),
            instructor: Set(fields.instructor),
            image_url: Set(fields.image_url),
            status: Set(RecommendationStatus::Pending.as_i16()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        new_recommendation
            .insert(&self.db)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))
    }

    /// Edit a recommendation. Only pending recommendations are editable;
    /// approved and rejected ones are terminal.
    pub async fn edit(
        &self,
        id: i32,
        fields: RecommendationFields,
    ) -> Result<recommended_course::Model, CourseError> {
        let recommendation = self.find(id).await?;

        if recommendation.status != RecommendationStatus::Pending.as_i16() {
            return Err(CourseError::already_reviewed());
        }

        let mut active: recommended_course::ActiveModel = recommendation.into();
        active.title = Set(fields.title);
        active.description = Set(fields.description);
        active.instructor = Set(fields.instructor);
        active.image_url = Set(fields.image_url);
        active.updated_at = Set(Utc::now().timestamp());

        active
            .update(&self.db)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))
    }

    /// Store an uploaded image URL on a recommendation
    pub async fn set_image_url(&self, id: i32, image_url: &str) -> Result<(), CourseError> {
        let recommendation = self.find(id).await?;

        let mut active: recommended_course::ActiveModel = recommendation.into();
        active.image_url = Set(Some(image_url.to_string()));
        active.updated_at = Set(Utc::now().timestamp());
        active
            .update(&self.db)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))?;
        Ok(())
    }

    /// Approve a recommendation and promote it into a course.
    ///
    /// Runs inside one transaction. If a course already carries this
    /// recommendation's back-reference, only its status is refreshed to
    /// published and the existing row is returned; otherwise a new draft
    /// course is created from the recommendation, with the approval fields
    /// and any overrides applied. A recommendation therefore maps to at most
    /// one course, enforced by the unique back-reference column.
    pub async fn approve(
        &self,
        id: i32,
        fields: ApprovalFields,
    ) -> Result<course::Model, CourseError> {
        fields.validate()?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CourseError::internal_error(format!("Failed to start transaction: {}", e)))?;

        let recommendation = RecommendedCourse::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))?
            .ok_or_else(CourseError::recommendation_not_found)?;

        let now = Utc::now().timestamp();

        let mut active: recommended_course::ActiveModel = recommendation.clone().into();
        active.status = Set(RecommendationStatus::Approved.as_i16());
        active.updated_at = Set(now);
        active
            .update(&txn)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))?;

        let course = match Self::find_linked_course(&txn, id).await? {
            Some(existing) => {
                // Re-approval: refresh the promoted course instead of
                // creating a second one
                let mut active: course::ActiveModel = existing.into();
                active.status = Set(CourseStatus::Published.as_i16());
                active.updated_at = Set(now);
                active
                    .update(&txn)
                    .await
                    .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))?
            }
            None => {
                let new_course = course::ActiveModel {
                    title: Set(fields.title.unwrap_or(recommendation.title)),
                    description: Set(fields.description.unwrap_or(recommendation.description)),
                    instructor: Set(fields.instructor.unwrap_or(recommendation.instructor)),
                    image_url: Set(fields.image_url.or(recommendation.image_url)),
                    course_date: Set(fields.course_date),
                    sign_up_start_date: Set(fields.sign_up_start_date),
                    sign_up_end_date: Set(fields.sign_up_end_date),
                    max_participants: Set(fields.max_participants),
                    status: Set(CourseStatus::Draft.as_i16()),
                    recommended_course_id: Set(Some(id)),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };

                new_course.insert(&txn).await.map_err(|e| {
                    if e.to_string().contains("UNIQUE") {
                        CourseError::status_conflict(
                            "A course for this recommendation already exists",
                        )
                    } else {
                        CourseError::internal_error(format!("Database error: {}", e))
                    }
                })?
            }
        };

        txn.commit()
            .await
            .map_err(|e| CourseError::internal_error(format!("Failed to commit transaction: {}", e)))?;

        Ok(course)
    }

    /// Reject a recommendation. If it was already promoted, the linked
    /// course is closed in the same transaction.
    pub async fn reject(&self, id: i32) -> Result<recommended_course::Model, CourseError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CourseError::internal_error(format!("Failed to start transaction: {}", e)))?;

        let recommendation = RecommendedCourse::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))?
            .ok_or_else(CourseError::recommendation_not_found)?;

        let now = Utc::now().timestamp();

        let mut active: recommended_course::ActiveModel = recommendation.into();
        active.status = Set(RecommendationStatus::Rejected.as_i16());
        active.updated_at = Set(now);
        let rejected = active
            .update(&txn)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))?;

        if let Some(linked) = Self::find_linked_course(&txn, id).await? {
            let mut active: course::ActiveModel = linked.into();
            active.status = Set(CourseStatus::Closed.as_i16());
            active.updated_at = Set(now);
            active
                .update(&txn)
                .await
                .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))?;
        }

        txn.commit()
            .await
            .map_err(|e| CourseError::internal_error(format!("Failed to commit transaction: {}", e)))?;

        Ok(rejected)
    }

    async fn find_linked_course(
        txn: &DatabaseTransaction,
        recommendation_id: i32,
    ) -> Result<Option<course::Model>, CourseError> {
        Course::find()
            .filter(course::Column::RecommendedCourseId.eq(recommendation_id))
            .one(txn)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))
    }
}

impl std::fmt::Debug for RecommendationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationStore")
            .field("db", &"<connection>")
            .finish()
    }
}
