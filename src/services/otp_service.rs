use std::sync::Arc;

use chrono::Utc;
use rand::Rng;

use crate::errors::auth::AuthError;
use crate::errors::AuthFailure;
use crate::services::mailer::{otp_email_html, MailSender, OutgoingMail};
use crate::services::token_service::TokenService;
use crate::stores::UserStore;
use crate::types::db::user;
use crate::types::internal::UserRole;

/// Issues and verifies emailed one-time login codes.
///
/// A user has at most one active code; issuing a new one overwrites any
/// previous code. Codes are compared by numeric value, so leading zeros and
/// surrounding whitespace in the submitted code are tolerated.
pub struct OtpAuthenticator {
    user_store: Arc<UserStore>,
    token_service: Arc<TokenService>,
    mailer: Arc<dyn MailSender>,
    otp_ttl_minutes: i64,
}

impl OtpAuthenticator {
    pub fn new(
        user_store: Arc<UserStore>,
        token_service: Arc<TokenService>,
        mailer: Arc<dyn MailSender>,
        otp_ttl_minutes: i64,
    ) -> Self {
        Self {
            user_store,
            token_service,
            mailer,
            otp_ttl_minutes,
        }
    }

    /// Generate a 6-digit numeric code, zero-padded
    fn generate_code() -> String {
        let code: u32 = rand::rng().random_range(0..1_000_000);
        format!("{:06}", code)
    }

    async fn lookup(&self, email: &str) -> Result<user::Model, AuthError> {
        let user = self
            .user_store
            .find_by_email(email)
            .await
            .map_err(|e| AuthError::internal_error(format!("Database error: {}", e)))?
            .ok_or_else(AuthError::user_not_found)?;

        if user.role == UserRole::Banned.as_i16() {
            return Err(AuthError::user_banned());
        }
        Ok(user)
    }

    /// Issue a fresh one-time code and email it to the account.
    ///
    /// The code is persisted before dispatch. A delivery failure surfaces as
    /// `MailDeliveryFailed`; the stored code stays valid, so the caller can
    /// simply request delivery again.
    pub async fn issue(&self, email: &str) -> Result<(), AuthError> {
        let user = self.lookup(email).await?;

        let code = Self::generate_code();
        let expires_at = Utc::now().timestamp() + self.otp_ttl_minutes * 60;

        self.user_store
            .set_otp(user.id, &code, expires_at)
            .await
            .map_err(|e| AuthError::internal_error(format!("Failed to store code: {}", e)))?;

        tracing::info!(user_id = user.id, "one-time code issued");

        self.mailer
            .send(OutgoingMail {
                to: email.to_string(),
                subject: "Your one-time login code".to_string(),
                html: otp_email_html(&code, self.otp_ttl_minutes),
            })
            .await
            .map_err(|e| {
                tracing::warn!(user_id = user.id, error = %e, "one-time code email failed");
                AuthError::mail_delivery_failed(format!("Could not send code email: {}", e))
            })?;

        Ok(())
    }

    /// Verify a submitted code and mint a session token.
    ///
    /// Failed attempts leave the stored code untouched; success clears it and
    /// stamps the login time.
    pub async fn verify(&self, email: &str, submitted: &str) -> Result<(user::Model, String), AuthError> {
        let user = self.lookup(email).await?;

        let expires_at = user.otp_expires_at.ok_or_else(AuthError::otp_expired)?;
        if Utc::now().timestamp() > expires_at {
            return Err(AuthError::otp_expired());
        }

        let stored = user.otp_code.as_deref().ok_or_else(AuthError::otp_expired)?;

        // Numeric-value equality, not string equality
        let stored_value: i64 = stored
            .trim()
            .parse()
            .map_err(|_| AuthError::otp_invalid())?;
        let submitted_value: i64 = submitted
            .trim()
            .parse()
            .map_err(|_| AuthError::otp_invalid())?;

        if stored_value != submitted_value {
            tracing::debug!(user_id = user.id, "one-time code mismatch");
            return Err(AuthError::otp_invalid());
        }

        let user = self
            .user_store
            .complete_otp_login(user.id)
            .await
            .map_err(|e| AuthError::internal_error(format!("Failed to clear code: {}", e)))?;

        let token = self
            .token_service
            .generate_token(&user)
            .map_err(|e| AuthError::internal_error(e.to_string()))?;

        Ok((user, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mailer::MailError;
    use async_trait::async_trait;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;
    use std::sync::Mutex;

    /// Captures outgoing mail instead of delivering it
    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingMail>>,
    }

    #[async_trait]
    impl MailSender for RecordingMailer {
        async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
            self.sent.lock().unwrap().push(mail);
            Ok(())
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl MailSender for FailingMailer {
        async fn send(&self, _mail: OutgoingMail) -> Result<(), MailError> {
            Err(MailError::Transport("connection refused".to_string()))
        }
    }

    async fn setup(mailer: Arc<dyn MailSender>) -> (Arc<UserStore>, Arc<TokenService>, OtpAuthenticator) {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let user_store = Arc::new(UserStore::new(db));
        let token_service = Arc::new(TokenService::new(
            "test-secret-key-minimum-32-characters".to_string(),
            60,
        ));
        let authenticator = OtpAuthenticator::new(
            user_store.clone(),
            token_service.clone(),
            mailer,
            10,
        );

        (user_store, token_service, authenticator)
    }

    #[tokio::test]
    async fn test_issue_stores_code_and_sends_mail() {
        let mailer = Arc::new(RecordingMailer::default());
        let (user_store, _tokens, authenticator) = setup(mailer.clone()).await;

        let user = user_store
            .register("otpuser", "pw", "otp@example.com", UserRole::User)
            .await
            .unwrap();

        authenticator.issue("otp@example.com").await.unwrap();

        let stored = user_store.find_by_id(user.id).await.unwrap().unwrap();
        let code = stored.otp_code.expect("code should be stored");
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
        assert!(stored.otp_expires_at.unwrap() > Utc::now().timestamp());

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "otp@example.com");
        assert!(sent[0].html.contains(&code));
    }

    #[tokio::test]
    async fn test_issue_overwrites_previous_code() {
        let mailer = Arc::new(RecordingMailer::default());
        let (user_store, _tokens, authenticator) = setup(mailer.clone()).await;

        let user = user_store
            .register("otpuser", "pw", "otp@example.com", UserRole::User)
            .await
            .unwrap();

        user_store
            .set_otp(user.id, "000001", Utc::now().timestamp() + 600)
            .await
            .unwrap();

        authenticator.issue("otp@example.com").await.unwrap();

        let stored = user_store.find_by_id(user.id).await.unwrap().unwrap();
        let code = stored.otp_code.expect("code should be stored");
        // The freshly issued code replaces the old one, and it is the one
        // that went out by mail
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].html.contains(&code));
    }

    #[tokio::test]
    async fn test_issue_unknown_email_is_not_found() {
        let (_users, _tokens, authenticator) = setup(Arc::new(RecordingMailer::default())).await;

        let result = authenticator.issue("nobody@example.com").await;

        assert!(matches!(result, Err(AuthError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_issue_banned_user_is_denied() {
        let (user_store, _tokens, authenticator) =
            setup(Arc::new(RecordingMailer::default())).await;

        let user = user_store
            .register("banned", "pw", "banned@example.com", UserRole::User)
            .await
            .unwrap();
        user_store
            .update_user(user.id, None, None, Some(UserRole::Banned.as_i16()))
            .await
            .unwrap();

        let result = authenticator.issue("banned@example.com").await;

        assert!(matches!(result, Err(AuthError::UserBanned(_))));
    }

    #[tokio::test]
    async fn test_issue_surfaces_mail_failure_but_keeps_code() {
        let (user_store, _tokens, authenticator) = setup(Arc::new(FailingMailer)).await;

        let user = user_store
            .register("unlucky", "pw", "unlucky@example.com", UserRole::User)
            .await
            .unwrap();

        let result = authenticator.issue("unlucky@example.com").await;
        assert!(matches!(result, Err(AuthError::MailDeliveryFailed(_))));

        // The stored code remains valid for a retried delivery
        let stored = user_store.find_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.otp_code.is_some());
    }

    #[tokio::test]
    async fn test_verify_success_clears_code_and_returns_valid_token() {
        let (user_store, token_service, authenticator) =
            setup(Arc::new(RecordingMailer::default())).await;

        let user = user_store
            .register("verifier", "pw", "verifier@example.com", UserRole::User)
            .await
            .unwrap();
        user_store
            .set_otp(user.id, "123456", Utc::now().timestamp() + 600)
            .await
            .unwrap();

        let (logged_in, token) = authenticator
            .verify("verifier@example.com", "123456")
            .await
            .unwrap();

        assert!(logged_in.otp_code.is_none());
        assert!(logged_in.last_login_at.is_some());

        let claims = token_service.validate_token(&token).unwrap();
        assert_eq!(claims.id, user.id);
        assert_eq!(claims.email, "verifier@example.com");
    }

    #[tokio::test]
    async fn test_verify_tolerates_leading_zeros_and_whitespace() {
        let (user_store, _tokens, authenticator) =
            setup(Arc::new(RecordingMailer::default())).await;

        let user = user_store
            .register("zeros", "pw", "zeros@example.com", UserRole::User)
            .await
            .unwrap();
        user_store
            .set_otp(user.id, "012345", Utc::now().timestamp() + 600)
            .await
            .unwrap();

        let result = authenticator.verify("zeros@example.com", " 12345 ").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_verify_wrong_code_keeps_stored_code() {
        let (user_store, _tokens, authenticator) =
            setup(Arc::new(RecordingMailer::default())).await;

        let user = user_store
            .register("wrong", "pw", "wrong@example.com", UserRole::User)
            .await
            .unwrap();
        user_store
            .set_otp(user.id, "123456", Utc::now().timestamp() + 600)
            .await
            .unwrap();

        let result = authenticator.verify("wrong@example.com", "654321").await;
        assert!(matches!(result, Err(AuthError::OtpInvalid(_))));

        // A failed attempt must not burn the code
        let stored = user_store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.otp_code.as_deref(), Some("123456"));

        let retry = authenticator.verify("wrong@example.com", "123456").await;
        assert!(retry.is_ok());
    }

    #[tokio::test]
    async fn test_verify_expired_code_is_rejected() {
        let (user_store, _tokens, authenticator) =
            setup(Arc::new(RecordingMailer::default())).await;

        let user = user_store
            .register("slow", "pw", "slow@example.com", UserRole::User)
            .await
            .unwrap();
        user_store
            .set_otp(user.id, "123456", Utc::now().timestamp() - 1)
            .await
            .unwrap();

        let result = authenticator.verify("slow@example.com", "123456").await;

        assert!(matches!(result, Err(AuthError::OtpExpired(_))));
    }

    #[tokio::test]
    async fn test_verify_without_issued_code_is_rejected() {
        let (user_store, _tokens, authenticator) =
            setup(Arc::new(RecordingMailer::default())).await;

        user_store
            .register("fresh", "pw", "fresh@example.com", UserRole::User)
            .await
            .unwrap();

        let result = authenticator.verify("fresh@example.com", "123456").await;

        assert!(matches!(result, Err(AuthError::OtpExpired(_))));
    }

    #[tokio::test]
    async fn test_verify_twice_fails_after_code_is_cleared() {
        let (user_store, _tokens, authenticator) =
            setup(Arc::new(RecordingMailer::default())).await;

        let user = user_store
            .register("once", "pw", "once@example.com", UserRole::User)
            .await
            .unwrap();
        user_store
            .set_otp(user.id, "123456", Utc::now().timestamp() + 600)
            .await
            .unwrap();

        authenticator.verify("once@example.com", "123456").await.unwrap();
        let result = authenticator.verify("once@example.com", "123456").await;

        assert!(matches!(result, Err(AuthError::OtpExpired(_))));
    }
}
