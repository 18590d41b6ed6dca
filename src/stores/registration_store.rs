use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, TransactionTrait,
};

use crate::errors::course::CourseError;
use crate::errors::AuthFailure;
use crate::types::db::course::Entity as Course;
use crate::types::db::course_registration::{self, Entity as CourseRegistration};
use crate::types::db::notification;
use crate::types::db::points_transaction;
use crate::types::db::user::{self, Entity as User};
use crate::types::internal::{CourseStatus, RegistrationStatus, TransactionType};

/// Course sign-up and cancellation.
///
/// Registrations carry the points paid at sign-up time; cancellation refunds
/// that amount with a ledger entry.
pub struct RegistrationStore {
    db: DatabaseConnection,
}

impl RegistrationStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Register a user for a published course.
    ///
    /// # Errors
    /// * `NotFound` when the course does not exist
    /// * `StatusConflict` when the course is not published
    /// * `SignupWindowClosed` when now is outside the sign-up window
    /// * `AlreadyRegistered` when an upcoming registration already exists
    /// * `CourseFull` when capacity is exhausted
    pub async fn register(
        &self,
        user_id: i32,
        course_id: i32,
    ) -> Result<course_registration::Model, CourseError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CourseError::internal_error(format!("Failed to start transaction: {}", e)))?;

        let course = Course::find_by_id(course_id)
            .one(&txn)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))?
            .ok_or_else(CourseError::not_found)?;

        if course.status != CourseStatus::Published.as_i16() {
            return Err(CourseError::status_conflict(
                "Course is not open for registration",
            ));
        }

        let now = Utc::now().timestamp();
        if now < course.sign_up_start_date || now > course.sign_up_end_date {
            return Err(CourseError::signup_window_closed());
        }

        let existing = CourseRegistration::find()
            .filter(course_registration::Column::UserId.eq(user_id))
            .filter(course_registration::Column::CourseId.eq(course_id))
            .filter(
                course_registration::Column::RegistrationStatus
                    .eq(RegistrationStatus::Upcoming.as_i16()),
            )
            .one(&txn)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))?;
        if existing.is_some() {
            return Err(CourseError::already_registered());
        }

        let taken = CourseRegistration::find()
            .filter(course_registration::Column::CourseId.eq(course_id))
            .filter(
                course_registration::Column::RegistrationStatus
                    .eq(RegistrationStatus::Upcoming.as_i16()),
            )
            .count(&txn)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))?;
        if taken >= course.max_participants.max(0) as u64 {
            return Err(CourseError::course_full());
        }

        let registration = course_registration::ActiveModel {
            user_id: Set(user_id),
            course_id: Set(course_id),
            registration_status: Set(RegistrationStatus::Upcoming.as_i16()),
            points_deducted: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let registration = registration
            .insert(&txn)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))?;

        let notice = notification::ActiveModel {
            user_id: Set(user_id),
            message: Set(format!("Successfully signed up for {}", course.title)),
            is_read: Set(false),
            created_at: Set(now),
            ..Default::default()
        };
        notice
            .insert(&txn)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))?;

        txn.commit()
            .await
            .map_err(|e| CourseError::internal_error(format!("Failed to commit transaction: {}", e)))?;

        Ok(registration)
    }

    /// Cancel a user's upcoming registration, refunding any points paid
    pub async fn cancel(
        &self,
        user_id: i32,
        course_id: i32,
    ) -> Result<course_registration::Model, CourseError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CourseError::internal_error(format!("Failed to start transaction: {}", e)))?;

        let registration = CourseRegistration::find()
            .filter(course_registration::Column::UserId.eq(user_id))
            .filter(course_registration::Column::CourseId.eq(course_id))
            .filter(
                course_registration::Column::RegistrationStatus
                    .eq(RegistrationStatus::Upcoming.as_i16()),
            )
            .one(&txn)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))?
            .ok_or_else(CourseError::registration_not_found)?;

        let now = Utc::now().timestamp();
        let refund = registration.points_deducted;

        let mut active: course_registration::ActiveModel = registration.into();
        active.registration_status = Set(RegistrationStatus::Canceled.as_i16());
        active.updated_at = Set(now);
        let canceled = active
            .update(&txn)
            .await
            .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))?;

        if refund > 0 {
            User::update_many()
                .col_expr(
                    user::Column::Points,
                    Expr::col(user::Column::Points).add(refund),
                )
                .filter(user::Column::Id.eq(user_id))
                .exec(&txn)
                .await
                .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))?;

            let ledger_entry = points_transaction::ActiveModel {
                user_id: Set(Some(user_id)),
                points: Set(refund),
                transaction_type: Set(TransactionType::Refund.as_i16()),
                description: Set(format!(
                    "Refund of {} points for canceled registration to course {}",
                    refund, course_id
                )),
                created_at: Set(now),
                ..Default::default()
            };
            ledger_entry
                .insert(&txn)
                .await
                .map_err(|e| CourseError::internal_error(format!("Database error: {}", e)))?;
        }

        txn.commit()
            .await
            .map_err(|e| CourseError::internal_error(format!("Failed to commit transaction: {}", e)))?;

        Ok(canceled)
    }
}

impl std::fmt::Debug for RegistrationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationStore")
            .field("db", &"<connection>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::UserStore;
    use crate::types::db::course;
    use crate::types::db::notification::Entity as Notification;
    use crate::types::db::points_transaction::Entity as PointsTransaction;
    use crate::types::internal::UserRole;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup_test_db() -> (DatabaseConnection, RegistrationStore, UserStore) {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        (
            db.clone(),
            RegistrationStore::new(db.clone()),
            UserStore::new(db),
        )
    }

    async fn create_course(
        db: &DatabaseConnection,
        status: CourseStatus,
        max_participants: i32,
        window: (i64, i64),
    ) -> course::Model {
        let now = Utc::now().timestamp();
        course::ActiveModel {
            title: Set("Workshop".to_string()),
            description: Set("Hands-on".to_string()),
            instructor: Set("Instructor".to_string()),
            course_date: Set(window.1 + 86_400),
            image_url: Set(None),
            max_participants: Set(max_participants),
            sign_up_start_date: Set(window.0),
            sign_up_end_date: Set(window.1),
            status: Set(status.as_i16()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    }

    fn open_window() -> (i64, i64) {
        let now = Utc::now().timestamp();
        (now - 3_600, now + 3_600)
    }

    async fn create_user(users: &UserStore, name: &str) -> i32 {
        users
            .register(name, "pw", &format!("{}@example.com", name), UserRole::User)
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_register_creates_upcoming_registration_and_notification() {
        let (db, store, users) = setup_test_db().await;
        let user_id = create_user(&users, "attendee").await;
        let course = create_course(&db, CourseStatus::Published, 10, open_window()).await;

        let registration = store.register(user_id, course.id).await.unwrap();

        assert_eq!(
            registration.registration_status,
            RegistrationStatus::Upcoming.as_i16()
        );
        assert_eq!(registration.points_deducted, 0);

        let notices = Notification::find().all(&db).await.unwrap();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].message.contains("Workshop"));
    }

    #[tokio::test]
    async fn test_register_rejects_unpublished_course() {
        let (db, store, users) = setup_test_db().await;
        let user_id = create_user(&users, "attendee").await;
        let course = create_course(&db, CourseStatus::Draft, 10, open_window()).await;

        let result = store.register(user_id, course.id).await;

        assert!(matches!(result, Err(CourseError::StatusConflict(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_outside_signup_window() {
        let (db, store, users) = setup_test_db().await;
        let user_id = create_user(&users, "late").await;
        let now = Utc::now().timestamp();
        let course =
            create_course(&db, CourseStatus::Published, 10, (now - 7_200, now - 3_600)).await;

        let result = store.register(user_id, course.id).await;

        assert!(matches!(result, Err(CourseError::SignupWindowClosed(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_signup() {
        let (db, store, users) = setup_test_db().await;
        let user_id = create_user(&users, "eager").await;
        let course = create_course(&db, CourseStatus::Published, 10, open_window()).await;

        store.register(user_id, course.id).await.unwrap();
        let result = store.register(user_id, course.id).await;

        assert!(matches!(result, Err(CourseError::AlreadyRegistered(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_full_course() {
        let (db, store, users) = setup_test_db().await;
        let first = create_user(&users, "first").await;
        let second = create_user(&users, "second").await;
        let course = create_course(&db, CourseStatus::Published, 1, open_window()).await;

        store.register(first, course.id).await.unwrap();
        let result = store.register(second, course.id).await;

        assert!(matches!(result, Err(CourseError::CourseFull(_))));
    }

    #[tokio::test]
    async fn test_cancel_marks_registration_canceled() {
        let (db, store, users) = setup_test_db().await;
        let user_id = create_user(&users, "flaky").await;
        let course = create_course(&db, CourseStatus::Published, 10, open_window()).await;

        store.register(user_id, course.id).await.unwrap();
        let canceled = store.cancel(user_id, course.id).await.unwrap();

        assert_eq!(
            canceled.registration_status,
            RegistrationStatus::Canceled.as_i16()
        );

        // A canceled registration frees the seat
        let again = store.register(user_id, course.id).await.unwrap();
        assert_eq!(
            again.registration_status,
            RegistrationStatus::Upcoming.as_i16()
        );
    }

    #[tokio::test]
    async fn test_cancel_refunds_points_with_ledger_row() {
        let (db, store, users) = setup_test_db().await;
        let user_id = create_user(&users, "payer").await;
        let course = create_course(&db, CourseStatus::Published, 10, open_window()).await;

        // A registration that cost points, as written by an earlier release
        let now = Utc::now().timestamp();
        course_registration::ActiveModel {
            user_id: Set(user_id),
            course_id: Set(course.id),
            registration_status: Set(RegistrationStatus::Upcoming.as_i16()),
            points_deducted: Set(40),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        store.cancel(user_id, course.id).await.unwrap();

        let refunded = User::find_by_id(user_id).one(&db).await.unwrap().unwrap();
        assert_eq!(refunded.points, 40);

        let entries = PointsTransaction::find().all(&db).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].transaction_type, TransactionType::Refund.as_i16());
        assert_eq!(entries[0].points, 40);
    }

    #[tokio::test]
    async fn test_cancel_without_registration_is_not_found() {
        let (db, store, users) = setup_test_db().await;
        let user_id = create_user(&users, "ghost").await;
        let course = create_course(&db, CourseStatus::Published, 10, open_window()).await;

        let result = store.cancel(user_id, course.id).await;

        assert!(matches!(result, Err(CourseError::RegistrationNotFound(_))));
    }
}
