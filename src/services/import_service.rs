use std::sync::Arc;

use crate::services::tabular::{Row, TabularError, TabularReader};
use crate::stores::{PointsStore, UserStore};
use crate::types::internal::UserRole;

/// Outcome of a bulk import run. Row failures are collected, not raised;
/// rows before a failing row stay applied.
#[derive(Debug, Default)]
pub struct ImportSummary {
    pub success_count: u32,
    pub error_count: u32,
    pub errors: Vec<String>,
}

impl ImportSummary {
    fn ok(&mut self) {
        self.success_count += 1;
    }

    fn fail(&mut self, message: String) {
        self.error_count += 1;
        self.errors.push(message);
    }
}

/// Tabular-file ingestion: batch-creates users or batch-grants points.
pub struct BulkImporter {
    user_store: Arc<UserStore>,
    points_store: Arc<PointsStore>,
    reader: Arc<dyn TabularReader>,

    /// Password assigned to imported accounts
    default_password: String,
}

impl BulkImporter {
    pub fn new(
        user_store: Arc<UserStore>,
        points_store: Arc<PointsStore>,
        reader: Arc<dyn TabularReader>,
        default_password: String,
    ) -> Self {
        Self {
            user_store,
            points_store,
            reader,
            default_password,
        }
    }

    fn field<'a>(row: &'a Row, name: &str) -> Option<&'a str> {
        row.get(name).map(|value| value.trim()).filter(|value| !value.is_empty())
    }

    /// Create one user per row (`username`, `email` columns). Rows with a
    /// missing field or an already-taken identifier are skipped with a
    /// per-row error.
    pub async fn import_users(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> Result<ImportSummary, TabularError> {
        let rows = self.reader.parse(filename, bytes)?;
        let mut summary = ImportSummary::default();

        for (index, row) in rows.iter().enumerate() {
            let line = index + 2; // header occupies line 1

            let Some(username) = Self::field(row, "username") else {
                summary.fail(format!("Line {}: missing username", line));
                continue;
            };
            let Some(email) = Self::field(row, "email") else {
                summary.fail(format!("Line {}: missing email", line));
                continue;
            };

            match self
                .user_store
                .register(username, &self.default_password, email, UserRole::User)
                .await
            {
                Ok(_) => summary.ok(),
                Err(e) => summary.fail(format!("{}: {}", username, e.message())),
            }
        }

        tracing::info!(
            success = summary.success_count,
            errors = summary.error_count,
            "user import finished"
        );

        Ok(summary)
    }

    /// Grant points per row (`username`, `points` columns). Unknown users and
    /// unparseable or negative amounts are collected as row errors.
    pub async fn import_points(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> Result<ImportSummary, TabularError> {
        let rows = self.reader.parse(filename, bytes)?;
        let mut summary = ImportSummary::default();

        for (index, row) in rows.iter().enumerate() {
            let line = index + 2;

            let Some(username) = Self::field(row, "username") else {
                summary.fail(format!("Line {}: missing username", line));
                continue;
            };
            let Some(raw_points) = Self::field(row, "points") else {
                summary.fail(format!("Line {}: missing points", line));
                continue;
            };

            let points: i32 = match raw_points.parse() {
                Ok(value) => value,
                Err(_) => {
                    summary.fail(format!("{}: invalid points value '{}'", username, raw_points));
                    continue;
                }
            };
            if points < 0 {
                summary.fail(format!("{}: points must not be negative", username));
                continue;
            }

            let user = match self.user_store.find_by_username(username).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    summary.fail(format!("{}: user not found", username));
                    continue;
                }
                Err(e) => {
                    summary.fail(format!("{}: database error: {}", username, e));
                    continue;
                }
            };

            match self.points_store.grant(&[user.id], points).await {
                Ok(()) => summary.ok(),
                Err(e) => summary.fail(format!("{}: {}", username, e.message())),
            }
        }

        tracing::info!(
            success = summary.success_count,
            errors = summary.error_count,
            "points import finished"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::tabular::FileTabularReader;
    use crate::types::db::points_transaction::Entity as PointsTransaction;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, DatabaseConnection, EntityTrait, PaginatorTrait};

    async fn setup() -> (DatabaseConnection, Arc<UserStore>, BulkImporter) {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let user_store = Arc::new(UserStore::new(db.clone()));
        let points_store = Arc::new(PointsStore::new(db.clone()));
        let importer = BulkImporter::new(
            user_store.clone(),
            points_store,
            Arc::new(FileTabularReader),
            "111111".to_string(),
        );

        (db, user_store, importer)
    }

    #[tokio::test]
    async fn test_import_users_creates_accounts_with_default_password() {
        let (_db, user_store, importer) = setup().await;

        let csv = b"username,email\nalice,alice@example.com\nbob,bob@example.com\n";
        let summary = importer.import_users("users.csv", csv).await.unwrap();

        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.error_count, 0);

        // Imported accounts log in with the default password
        let user = user_store.login("alice@example.com", "111111").await.unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_import_users_skips_duplicates_without_stopping() {
        let (_db, user_store, importer) = setup().await;

        user_store
            .register("alice", "pw", "alice@example.com", UserRole::User)
            .await
            .unwrap();

        let csv = b"username,email\nalice,alice2@example.com\ncarol,carol@example.com\n";
        let summary = importer.import_users("users.csv", csv).await.unwrap();

        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].starts_with("alice:"));

        // The failing row did not block the one after it
        assert!(user_store
            .find_by_username("carol")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_import_users_reports_missing_fields_by_line() {
        let (_db, _user_store, importer) = setup().await;

        let csv = b"username,email\n,missing@example.com\ndave,\n";
        let summary = importer.import_users("users.csv", csv).await.unwrap();

        assert_eq!(summary.success_count, 0);
        assert_eq!(summary.error_count, 2);
        assert!(summary.errors[0].contains("Line 2"));
        assert!(summary.errors[1].contains("missing email"));
    }

    #[tokio::test]
    async fn test_import_users_rejects_unsupported_extension() {
        let (_db, _user_store, importer) = setup().await;

        let result = importer.import_users("users.txt", b"whatever").await;

        assert!(matches!(result, Err(TabularError::Unsupported(_))));
    }

    #[tokio::test]
    async fn test_import_points_grants_and_audits_per_row() {
        let (db, user_store, importer) = setup().await;

        user_store
            .register("alice", "pw", "alice@example.com", UserRole::User)
            .await
            .unwrap();
        user_store
            .register("bob", "pw", "bob@example.com", UserRole::User)
            .await
            .unwrap();

        let csv = b"username,points\nalice,200\nbob,50\n";
        let summary = importer.import_points("points.csv", csv).await.unwrap();

        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.error_count, 0);

        let alice = user_store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(alice.points, 200);

        let ledger_rows = PointsTransaction::find().count(&db).await.unwrap();
        assert_eq!(ledger_rows, 2);
    }

    #[tokio::test]
    async fn test_import_points_collects_row_errors() {
        let (_db, user_store, importer) = setup().await;

        user_store
            .register("alice", "pw", "alice@example.com", UserRole::User)
            .await
            .unwrap();

        let csv = b"username,points\nghost,100\nalice,abc\nalice,-5\nalice,30\n";
        let summary = importer.import_points("points.csv", csv).await.unwrap();

        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.error_count, 3);
        assert!(summary.errors[0].contains("user not found"));
        assert!(summary.errors[1].contains("invalid points value"));
        assert!(summary.errors[2].contains("must not be negative"));

        let alice = user_store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(alice.points, 30);
    }
}
