// Request/response models exposed over the wire
pub mod auth;
pub mod common;
pub mod course;
pub mod points;
pub mod user;
