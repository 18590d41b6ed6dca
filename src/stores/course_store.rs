use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::errors::course::CourseError;
use crate::errors::AuthFailure;
use crate::types::db::course::{self, Entity as Course};
use crate::types::internal::CourseStatus;

/// Cap of concurrently published courses
pub const MAX_PUBLISHED_COURSES: u64 = 10;

/// Validated field set shared by create and update
#[derive(Debug, Clone)]
pub struct CourseFields {
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub course_date: i64,
    pub image_url: Option<String>,
    pub max_participants: i32,
    pub sign_up_start_date: i64,
    pub sign_up_end_date: i64,
}

impl CourseFields {
    /// Enforce the catalog date/capacity invariants:
    /// sign_up_start_date <= sign_up_end_date <= course_date, capacity >= 0.
    fn validate(&self) -> Result<(), CourseError> {
        if self.course_date < self.sign_up_end_date {
            return Err(CourseError::invalid_date_range());
        }
        if self.sign_up_start_date > self.sign_up_end_date {
            return Err(CourseError::invalid_signup_window());
        }
        if self.max_participants < 0 {
            return Err(CourseError::invalid_capacity(
                "Maximum participants must not be negative",
            ));
        }
        Ok(())
    }
}

/// Course catalog: CRUD and the publish/unpublish state machine
pub struct CourseStore {
    db: DatabaseConnection,
}

impl CourseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<course::Model>, CourseError> {
        Course::find()
            .order_by_asc(course::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))
    }

    pub async fn find(&self, id: i32) -> Result<course::Model, CourseError> {
        Course::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))?
            .ok_or_else(CourseError::not_found)
    }

    /// Create a course in draft status
    pub async fn create(&self, fields: CourseFields) -> Result<course::Model, CourseError> {
        fields.validate()?;

        let now = Utc::now().timestamp();
        let new_course = course::ActiveModel {
            title: Set(fields.title),
            description: Set(fields.description),
            instructor: Set(fields.instructor),
            course_date: Set(fields.course_date),
            image_url: Set(fields.image_url),
            max_participants: Set(fields.max_participants),
            sign_up_start_date: Set(fields.sign_up_start_date),
            sign_up_end_date: Set(fields.sign_up_end_date),
            status: Set(CourseStatus::Draft.as_i16()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        new_course
            .insert(&self.db)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))
    }

    /// Update an existing course; status is not touched here
    pub async fn update(&self, id: i32, fields: CourseFields) -> Result<course::Model, CourseError> {
        fields.validate()?;

        let existing = self.find(id).await?;

        let mut active: course::ActiveModel = existing.into();
        active.title = Set(fields.title);
        active.description = Set(fields.description);
        active.instructor = Set(fields.instructor);
        active.course_date = Set(fields.course_date);
        active.image_url = Set(fields.image_url);
        active.max_participants = Set(fields.max_participants);
        active.sign_up_start_date = Set(fields.sign_up_start_date);
        active.sign_up_end_date = Set(fields.sign_up_end_date);
        active.updated_at = Set(Utc::now().timestamp());

        active
            .update(&self.db)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))
    }

    /// Count of currently published courses
    pub async fn published_count(&self) -> Result<u64, CourseError> {
        Course::find()
            .filter(course::Column::Status.eq(CourseStatus::Published.as_i16()))
            .count(&self.db)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))
    }

    /// Transition a course from draft or closed to published.
    ///
    /// # Errors
    /// * `PublishLimitReached` once the published cap is hit
    /// * `NotFound` when no course has this id
    /// * `StatusConflict` when the course exists but is already published
    pub async fn publish(&self, id: i32) -> Result<course::Model, CourseError> {
        if self.published_count().await? >= MAX_PUBLISHED_COURSES {
            return Err(CourseError::publish_limit_reached());
        }

        self.transition(
            id,
            &[CourseStatus::Draft, CourseStatus::Closed],
            CourseStatus::Published,
            "Course is already published",
        )
        .await
    }

    /// Transition a course from draft or published to closed
    pub async fn unpublish(&self, id: i32) -> Result<course::Model, CourseError> {
        self.transition(
            id,
            &[CourseStatus::Draft, CourseStatus::Published],
            CourseStatus::Closed,
            "Course is already closed",
        )
        .await
    }

    async fn transition(
        &self,
        id: i32,
        from: &[CourseStatus],
        to: CourseStatus,
        conflict_message: &str,
    ) -> Result<course::Model, CourseError> {
        let accepted: Vec<i16> = from.iter().map(|s| s.as_i16()).collect();

        let result = Course::update_many()
            .col_expr(course::Column::Status, Expr::value(to.as_i16()))
            .col_expr(course::Column::UpdatedAt, Expr::value(Utc::now().timestamp()))
            .filter(course::Column::Id.eq(id))
            .filter(course::Column::Status.is_in(accepted))
            .exec(&self.db)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))?;

        if result.rows_affected == 0 {
            // Zero rows covers both a missing id and a wrong status; look the
            // row up to tell the two apart.
            return match Course::find_by_id(id)
                .one(&self.db)
                .await
                .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))?
            {
                Some(_) => Err(CourseError::status_conflict(conflict_message)),
                None => Err(CourseError::not_found()),
            };
        }

        self.find(id).await
    }

    /// Hard delete
    pub async fn delete(&self, id: i32) -> Result<(), CourseError> {
        let result = Course::delete_many()
            .filter(course::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))?;

        if result.rows_affected == 0 {
            return Err(CourseError::not_found());
        }
        Ok(())
    }
}

impl std::fmt::Debug for CourseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CourseStore").field("db", &"<connection>").finish()
    }
}
