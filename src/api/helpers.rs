use poem_openapi::{auth::Bearer, SecurityScheme};

use crate::errors::AuthFailure;
use crate::services::{TokenError, TokenService};
use crate::stores::UserStore;
use crate::types::db::user;
use crate::types::internal::{Claims, UserRole};

/// JWT Bearer token authentication
#[derive(SecurityScheme)]
#[oai(ty = "bearer", bearer_format = "JWT")]
pub struct BearerAuth(pub Bearer);

/// Validate the bearer token and return its claims.
///
/// A token decoding to a banned role is answered with a denial response
/// rather than a hard auth failure.
pub fn authenticate<E: AuthFailure>(
    token_service: &TokenService,
    auth: &BearerAuth,
) -> Result<Claims, E> {
    let claims = token_service
        .validate_token(&auth.0.token)
        .map_err(|e| match e {
            TokenError::Expired => E::expired_token(),
            _ => E::invalid_token(),
        })?;

    if claims.role == UserRole::Banned.as_i16() {
        return Err(E::user_banned());
    }

    Ok(claims)
}

/// Require the caller to be an admin.
///
/// The role is re-fetched from the identity store rather than trusted from
/// the token, so role changes since issuance take effect immediately.
pub async fn require_admin<E: AuthFailure>(
    user_store: &UserStore,
    claims: &Claims,
) -> Result<user::Model, E> {
    let user = user_store
        .find_by_id(claims.id)
        .await
        .map_err(|e| E::internal_error(format!("Database error: {}", e)))?
        .ok_or_else(E::invalid_token)?;

    match UserRole::from_i16(user.role) {
        Some(UserRole::Admin) => Ok(user),
        Some(UserRole::Banned) => Err(E::user_banned()),
        _ => Err(E::forbidden()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AuthError;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    fn bearer(token: &str) -> BearerAuth {
        BearerAuth(Bearer {
            token: token.to_string(),
        })
    }

    fn sample_user(role: UserRole) -> user::Model {
        user::Model {
            id: 7,
            username: "helper".to_string(),
            email: "helper@example.com".to_string(),
            password_hash: "$argon2id$test".to_string(),
            role: role.as_i16(),
            points: 0,
            otp_code: None,
            otp_expires_at: None,
            created_at: 0,
            last_login_at: None,
        }
    }

    #[test]
    fn test_authenticate_accepts_valid_token() {
        let tokens = TokenService::new("test-secret-key-minimum-32-characters".to_string(), 60);
        let token = tokens.generate_token(&sample_user(UserRole::User)).unwrap();

        let claims: Claims = authenticate::<AuthError>(&tokens, &bearer(&token)).unwrap();

        assert_eq!(claims.id, 7);
    }

    #[test]
    fn test_authenticate_rejects_garbage_token() {
        let tokens = TokenService::new("test-secret-key-minimum-32-characters".to_string(), 60);

        let result = authenticate::<AuthError>(&tokens, &bearer("garbage"));

        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_authenticate_rejects_expired_token() {
        let tokens = TokenService::new("test-secret-key-minimum-32-characters".to_string(), -10);
        let token = tokens.generate_token(&sample_user(UserRole::User)).unwrap();

        let result = authenticate::<AuthError>(&tokens, &bearer(&token));

        assert!(matches!(result, Err(AuthError::ExpiredToken(_))));
    }

    #[test]
    fn test_authenticate_soft_denies_banned_claims() {
        let tokens = TokenService::new("test-secret-key-minimum-32-characters".to_string(), 60);
        let token = tokens.generate_token(&sample_user(UserRole::Banned)).unwrap();

        let result = authenticate::<AuthError>(&tokens, &bearer(&token));

        assert!(matches!(result, Err(AuthError::UserBanned(_))));
    }

    #[tokio::test]
    async fn test_require_admin_uses_fresh_role_not_token_role() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let user_store = UserStore::new(db);
        let tokens = TokenService::new("test-secret-key-minimum-32-characters".to_string(), 60);

        let admin = user_store
            .register("admin", "pw", "admin@example.com", UserRole::Admin)
            .await
            .unwrap();
        let token = tokens.generate_token(&admin).unwrap();
        let claims: Claims = authenticate::<AuthError>(&tokens, &bearer(&token)).unwrap();

        // Admin passes
        require_admin::<AuthError>(&user_store, &claims).await.unwrap();

        // Demotion takes effect even while the old token is still valid
        user_store
            .update_user(admin.id, None, None, Some(UserRole::User.as_i16()))
            .await
            .unwrap();
        let result = require_admin::<AuthError>(&user_store, &claims).await;
        assert!(matches!(result, Err(AuthError::Forbidden(_))));

        // A ban denies outright
        user_store
            .update_user(admin.id, None, None, Some(UserRole::Banned.as_i16()))
            .await
            .unwrap();
        let result = require_admin::<AuthError>(&user_store, &claims).await;
        assert!(matches!(result, Err(AuthError::UserBanned(_))));
    }
}
