// API layer - HTTP endpoints
pub mod auth;
pub mod courses;
pub mod health;
pub mod helpers;
pub mod points;
pub mod users;

pub use auth::AuthApi;
pub use courses::CourseApi;
pub use health::HealthApi;
pub use points::PointsApi;
pub use users::UserApi;
