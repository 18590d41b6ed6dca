// Database entities
pub mod course;
pub mod course_registration;
pub mod notification;
pub mod points_transaction;
pub mod recommended_course;
pub mod user;
