// Errors layer - per-domain API error types
pub mod auth;
pub mod course;
pub mod points;
pub mod user;

pub use auth::AuthError;
pub use course::CourseError;
pub use points::PointsError;
pub use user::UserError;

/// Failures every authenticated endpoint can produce, regardless of domain.
///
/// The shared `authenticate`/`require_admin` helpers are generic over this
/// trait so each API can receive denials in its own error type.
pub trait AuthFailure {
    fn invalid_token() -> Self;
    fn expired_token() -> Self;
    fn user_banned() -> Self;
    fn forbidden() -> Self;
    fn internal_error(message: String) -> Self;
}
