// Common test utilities for integration tests

use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};

use courseledger_backend::stores::UserStore;
use courseledger_backend::types::db::user;
use courseledger_backend::types::internal::UserRole;

/// Creates a test database with migrations applied
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Registers a user and sets their starting balance
pub async fn create_user_with_points(
    db: &DatabaseConnection,
    name: &str,
    points: i32,
) -> user::Model {
    let store = UserStore::new(db.clone());
    let created = store
        .register(name, "pw", &format!("{}@example.com", name), UserRole::User)
        .await
        .expect("Failed to register user");

    let mut active: user::ActiveModel = created.into();
    active.points = Set(points);
    active.update(db).await.expect("Failed to set balance")
}
