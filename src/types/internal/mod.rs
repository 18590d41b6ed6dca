// Internal types - not exposed over the wire
pub mod claims;
pub mod enums;

pub use claims::Claims;
pub use enums::{CourseStatus, RecommendationStatus, RegistrationStatus, TransactionType, UserRole};
