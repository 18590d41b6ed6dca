use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Request model for transferring points to another user
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Recipient user id
    pub to_user_id: i32,

    /// Amount to transfer; must be positive
    pub points: i32,
}

/// Response model for a completed transfer
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct TransferResponse {
    pub message: String,

    /// Ledger description of the transfer
    pub description: String,
}

/// Request model for manually granting points to a set of users
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct ManualPointsRequest {
    /// Recipient user ids
    pub user_ids: Vec<i32>,

    /// Amount credited to every listed user; must not be negative
    pub points: i32,
}
