use serde::{Deserialize, Serialize};

/// JWT claims carried by session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub id: i32,

    /// Username at issuance time
    pub username: String,

    /// Email at issuance time
    pub email: String,

    /// Role discriminant at issuance time (-1 banned, 0 user, 1 admin).
    /// Admin-gated operations re-fetch the user row instead of trusting this.
    pub role: i16,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}
