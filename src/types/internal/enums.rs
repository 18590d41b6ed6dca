//! Status discriminants stored as `i16` columns.

/// User role stored on the `users` table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Banned,
    User,
    Admin,
}

impl UserRole {
    pub const fn as_i16(self) -> i16 {
        match self {
            UserRole::Banned => -1,
            UserRole::User => 0,
            UserRole::Admin => 1,
        }
    }

    pub const fn from_i16(value: i16) -> Option<Self> {
        match value {
            -1 => Some(UserRole::Banned),
            0 => Some(UserRole::User),
            1 => Some(UserRole::Admin),
            _ => None,
        }
    }
}

/// Course lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseStatus {
    Draft,
    Published,
    Closed,
}

impl CourseStatus {
    pub const fn as_i16(self) -> i16 {
        match self {
            CourseStatus::Draft => 0,
            CourseStatus::Published => 1,
            CourseStatus::Closed => 2,
        }
    }
}

/// Recommendation review status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationStatus {
    Pending,
    Approved,
    Rejected,
}

impl RecommendationStatus {
    pub const fn as_i16(self) -> i16 {
        match self {
            RecommendationStatus::Pending => 0,
            RecommendationStatus::Approved => 1,
            RecommendationStatus::Rejected => 2,
        }
    }
}

/// Ledger entry type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Add,
    Deduct,
    Refund,
    Transfer,
}

impl TransactionType {
    pub const fn as_i16(self) -> i16 {
        match self {
            TransactionType::Add => 1,
            TransactionType::Deduct => 2,
            TransactionType::Refund => 3,
            TransactionType::Transfer => 4,
        }
    }
}

/// Course registration status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    Upcoming,
    Closed,
    Canceled,
}

impl RegistrationStatus {
    pub const fn as_i16(self) -> i16 {
        match self {
            RegistrationStatus::Upcoming => 0,
            RegistrationStatus::Closed => 1,
            RegistrationStatus::Canceled => 2,
        }
    }
}
