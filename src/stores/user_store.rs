use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::errors::auth::AuthError;
use crate::errors::user::UserError;
use crate::errors::AuthFailure;
use crate::types::db::user::{self, Entity as User};
use crate::types::internal::UserRole;

/// Identity store: user records, credentials and OTP state
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Hash a plaintext password into PHC format
    fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut rand_core::OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::internal_error(format!("Password hashing error: {}", e)))?
            .to_string();
        Ok(hash)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<user::Model>, DbErr> {
        User::find_by_id(id).one(&self.db).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, DbErr> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<user::Model>, DbErr> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
    }

    pub async fn list(&self) -> Result<Vec<user::Model>, DbErr> {
        User::find().order_by_asc(user::Column::Id).all(&self.db).await
    }

    /// Create a new account.
    ///
    /// # Errors
    /// * `DuplicateUsername` / `DuplicateEmail` when either identifier is
    ///   already taken
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
        role: UserRole,
    ) -> Result<user::Model, AuthError> {
        let existing_user = self
            .find_by_username(username)
            .await
            .map_err(|e| AuthError::internal_error(format!("Database error: {}", e)))?;
        if existing_user.is_some() {
            return Err(AuthError::duplicate_username());
        }

        let existing_email = self
            .find_by_email(email)
            .await
            .map_err(|e| AuthError::internal_error(format!("Database error: {}", e)))?;
        if existing_email.is_some() {
            return Err(AuthError::duplicate_email());
        }

        let password_hash = Self::hash_password(password)?;

        let new_user = user::ActiveModel {
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash),
            role: Set(role.as_i16()),
            points: Set(0),
            created_at: Set(Utc::now().timestamp()),
            ..Default::default()
        };

        new_user.insert(&self.db).await.map_err(|e| {
            // Duplicate inserts can still race past the lookups
            if e.to_string().contains("UNIQUE") {
                AuthError::duplicate_username()
            } else {
                AuthError::internal_error(format!("Database error: {}", e))
            }
        })
    }

    /// Verify email/password credentials and stamp the login time.
    ///
    /// # Errors
    /// * `InvalidCredentials` when the email is unknown or the password wrong
    /// * `UserBanned` when the account is banned
    pub async fn login(&self, email: &str, password: &str) -> Result<user::Model, AuthError> {
        let user = self
            .find_by_email(email)
            .await
            .map_err(|e| AuthError::internal_error(format!("Database error: {}", e)))?
            .ok_or_else(AuthError::invalid_credentials)?;

        if user.role == UserRole::Banned.as_i16() {
            return Err(AuthError::user_banned());
        }

        let parsed_hash =
            PasswordHash::new(&user.password_hash).map_err(|_| AuthError::invalid_credentials())?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::invalid_credentials())?;

        let mut active: user::ActiveModel = user.into();
        active.last_login_at = Set(Some(Utc::now().timestamp()));
        active
            .update(&self.db)
            .await
            .map_err(|e| AuthError::internal_error(format!("Database error: {}", e)))
    }

    /// Store a one-time code, replacing any previous one
    pub async fn set_otp(&self, user_id: i32, code: &str, expires_at: i64) -> Result<(), DbErr> {
        let user = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("user {}", user_id)))?;

        let mut active: user::ActiveModel = user.into();
        active.otp_code = Set(Some(code.to_string()));
        active.otp_expires_at = Set(Some(expires_at));
        active.update(&self.db).await?;
        Ok(())
    }

    /// Clear the one-time code after a successful verification and stamp the
    /// login time
    pub async fn complete_otp_login(&self, user_id: i32) -> Result<user::Model, DbErr> {
        let user = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("user {}", user_id)))?;

        let mut active: user::ActiveModel = user.into();
        active.otp_code = Set(None);
        active.otp_expires_at = Set(None);
        active.last_login_at = Set(Some(Utc::now().timestamp()));
        active.update(&self.db).await
    }

    /// Apply a profile update. Caller is responsible for authorization;
    /// this validates the new values and duplicate identifiers.
    pub async fn update_user(
        &self,
        id: i32,
        username: Option<String>,
        email: Option<String>,
        role: Option<i16>,
    ) -> Result<user::Model, UserError> {
        let user = self
            .find_by_id(id)
            .await
            .map_err(|e| UserError::internal_error(format!("Database error: {}", e)))?
            .ok_or_else(UserError::not_found)?;

        if username.is_none() && email.is_none() && role.is_none() {
            return Ok(user);
        }

        if let Some(new_role) = role {
            if UserRole::from_i16(new_role).is_none() {
                return Err(UserError::invalid_role());
            }
        }

        if let Some(new_username) = &username {
            let taken = self
                .find_by_username(new_username)
                .await
                .map_err(|e| UserError::internal_error(format!("Database error: {}", e)))?;
            if taken.is_some_and(|other| other.id != id) {
                return Err(UserError::duplicate_username());
            }
        }

        if let Some(new_email) = &email {
            let taken = self
                .find_by_email(new_email)
                .await
                .map_err(|e| UserError::internal_error(format!("Database error: {}", e)))?;
            if taken.is_some_and(|other| other.id != id) {
                return Err(UserError::duplicate_email());
            }
        }

        let mut active: user::ActiveModel = user.into();
        if let Some(new_username) = username {
            active.username = Set(new_username);
        }
        if let Some(new_email) = email {
            active.email = Set(new_email);
        }
        if let Some(new_role) = role {
            active.role = Set(new_role);
        }

        active
            .update(&self.db)
            .await
            .map_err(|e| UserError::internal_error(format!("Database error: {}", e)))
    }
}

impl std::fmt::Debug for UserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserStore").field("db", &"<connection>").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup_test_db() -> UserStore {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        UserStore::new(db)
    }

    #[tokio::test]
    async fn test_register_creates_user_with_hashed_password() {
        let store = setup_test_db().await;

        let user = store
            .register("alice", "secret-password", "alice@example.com", UserRole::User)
            .await
            .unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(user.role, UserRole::User.as_i16());
        assert_eq!(user.points, 0);
        assert_ne!(user.password_hash, "secret-password");
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_username() {
        let store = setup_test_db().await;

        store
            .register("dup", "pw1", "first@example.com", UserRole::User)
            .await
            .unwrap();
        let result = store
            .register("dup", "pw2", "second@example.com", UserRole::User)
            .await;

        assert!(matches!(result, Err(AuthError::DuplicateUsername(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let store = setup_test_db().await;

        store
            .register("first", "pw1", "same@example.com", UserRole::User)
            .await
            .unwrap();
        let result = store
            .register("second", "pw2", "same@example.com", UserRole::User)
            .await;

        assert!(matches!(result, Err(AuthError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_login_succeeds_and_stamps_last_login() {
        let store = setup_test_db().await;

        store
            .register("bob", "correct-horse", "bob@example.com", UserRole::User)
            .await
            .unwrap();
        let user = store.login("bob@example.com", "correct-horse").await.unwrap();

        assert_eq!(user.username, "bob");
        assert!(user.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password() {
        let store = setup_test_db().await;

        store
            .register("bob", "correct-horse", "bob@example.com", UserRole::User)
            .await
            .unwrap();
        let result = store.login("bob@example.com", "battery-staple").await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials(_))));
    }

    #[tokio::test]
    async fn test_login_rejects_unknown_email() {
        let store = setup_test_db().await;

        let result = store.login("nobody@example.com", "whatever").await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials(_))));
    }

    #[tokio::test]
    async fn test_login_rejects_banned_user() {
        let store = setup_test_db().await;

        let user = store
            .register("banned", "pw", "banned@example.com", UserRole::User)
            .await
            .unwrap();
        store
            .update_user(user.id, None, None, Some(UserRole::Banned.as_i16()))
            .await
            .unwrap();

        let result = store.login("banned@example.com", "pw").await;

        assert!(matches!(result, Err(AuthError::UserBanned(_))));
    }

    #[tokio::test]
    async fn test_set_and_complete_otp_round_trip() {
        let store = setup_test_db().await;

        let user = store
            .register("otp", "pw", "otp@example.com", UserRole::User)
            .await
            .unwrap();
        let expires_at = Utc::now().timestamp() + 600;
        store.set_otp(user.id, "123456", expires_at).await.unwrap();

        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.otp_code.as_deref(), Some("123456"));
        assert_eq!(stored.otp_expires_at, Some(expires_at));

        let completed = store.complete_otp_login(user.id).await.unwrap();
        assert!(completed.otp_code.is_none());
        assert!(completed.otp_expires_at.is_none());
        assert!(completed.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_update_user_rejects_taken_username() {
        let store = setup_test_db().await;

        store
            .register("taken", "pw", "taken@example.com", UserRole::User)
            .await
            .unwrap();
        let user = store
            .register("free", "pw", "free@example.com", UserRole::User)
            .await
            .unwrap();

        let result = store
            .update_user(user.id, Some("taken".to_string()), None, None)
            .await;

        assert!(matches!(result, Err(UserError::DuplicateUsername(_))));
    }

    #[tokio::test]
    async fn test_update_user_allows_keeping_own_username() {
        let store = setup_test_db().await;

        let user = store
            .register("same", "pw", "same@example.com", UserRole::User)
            .await
            .unwrap();

        let updated = store
            .update_user(user.id, Some("same".to_string()), None, Some(1))
            .await
            .unwrap();

        assert_eq!(updated.username, "same");
        assert_eq!(updated.role, 1);
    }

    #[tokio::test]
    async fn test_update_user_rejects_unknown_role() {
        let store = setup_test_db().await;

        let user = store
            .register("roley", "pw", "roley@example.com", UserRole::User)
            .await
            .unwrap();

        let result = store.update_user(user.id, None, None, Some(7)).await;

        assert!(matches!(result, Err(UserError::InvalidRole(_))));
    }
}
