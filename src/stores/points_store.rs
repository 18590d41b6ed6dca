use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};

use crate::errors::points::PointsError;
use crate::errors::AuthFailure;
use crate::types::db::notification;
use crate::types::db::points_transaction;
use crate::types::db::user::{self, Entity as User};
use crate::types::internal::TransactionType;

/// Points ledger: balance mutation with append-only transaction history.
///
/// Every balance change commits together with its ledger row (and the
/// recipient's notification) in a single database transaction.
pub struct PointsStore {
    db: DatabaseConnection,
}

impl PointsStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Transfer points between two users.
    ///
    /// The debit is a guarded conditional update, so a concurrent spend from
    /// the same sender cannot push the balance negative; the debit and credit
    /// statements run in ascending-user-id order, so two opposing transfers
    /// between the same pair cannot deadlock.
    ///
    /// # Errors
    /// * `SelfTransfer` when sender and recipient are the same user
    /// * `InvalidAmount` when the amount is zero or negative
    /// * `RecipientNotFound` when the recipient does not exist
    /// * `InsufficientBalance` when the sender balance is too low
    pub async fn transfer(
        &self,
        from_user_id: i32,
        to_user_id: i32,
        points: i32,
    ) -> Result<String, PointsError> {
        if from_user_id == to_user_id {
            return Err(PointsError::self_transfer());
        }
        if points <= 0 {
            return Err(PointsError::invalid_amount("Transfer amount must be positive"));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PointsError::internal_error(format!("Failed to start transaction: {}", e)))?;

        let from_user = User::find_by_id(from_user_id)
            .one(&txn)
            .await
            .map_err(|e| PointsError::internal_error(format!("Database error: {}", e)))?
            .ok_or_else(|| {
                PointsError::internal_error(format!("Sender account missing: {}", from_user_id))
            })?;

        let to_user = User::find_by_id(to_user_id)
            .one(&txn)
            .await
            .map_err(|e| PointsError::internal_error(format!("Database error: {}", e)))?
            .ok_or_else(|| PointsError::recipient_not_found(to_user_id))?;

        if from_user.points < points {
            return Err(PointsError::insufficient_balance());
        }

        // Statement order follows ascending user id
        let debited = if from_user_id < to_user_id {
            let debited = Self::debit(&txn, from_user_id, points).await?;
            Self::credit(&txn, to_user_id, points).await?;
            debited
        } else {
            Self::credit(&txn, to_user_id, points).await?;
            Self::debit(&txn, from_user_id, points).await?
        };

        if !debited {
            // Balance changed under us since the check above
            txn.rollback()
                .await
                .map_err(|e| PointsError::internal_error(format!("Rollback failed: {}", e)))?;
            return Err(PointsError::insufficient_balance());
        }

        let now = Utc::now().timestamp();
        let description = format!(
            "{} transferred {} points to {}",
            from_user.username, points, to_user.username
        );

        let ledger_entry = points_transaction::ActiveModel {
            from_user_id: Set(Some(from_user_id)),
            to_user_id: Set(Some(to_user_id)),
            points: Set(points),
            transaction_type: Set(TransactionType::Transfer.as_i16()),
            description: Set(description.clone()),
            created_at: Set(now),
            ..Default::default()
        };
        ledger_entry
            .insert(&txn)
            .await
            .map_err(|e| PointsError::internal_error(format!("Database error: {}", e)))?;

        let recipient_notice = notification::ActiveModel {
            user_id: Set(to_user_id),
            message: Set(format!(
                "You received {} points from {}",
                points, from_user.username
            )),
            is_read: Set(false),
            created_at: Set(now),
            ..Default::default()
        };
        recipient_notice
            .insert(&txn)
            .await
            .map_err(|e| PointsError::internal_error(format!("Database error: {}", e)))?;

        txn.commit()
            .await
            .map_err(|e| PointsError::internal_error(format!("Failed to commit transaction: {}", e)))?;

        tracing::info!(from_user_id, to_user_id, points, "points transferred");

        Ok(description)
    }

    /// Credit every listed user with the same amount.
    ///
    /// All recipients are resolved before any balance changes; a single
    /// unknown id fails the whole grant. One ledger row and one notification
    /// are written per recipient, in the same transaction as the credits.
    pub async fn grant(&self, user_ids: &[i32], points: i32) -> Result<(), PointsError> {
        if points < 0 {
            return Err(PointsError::invalid_amount("Granted points must not be negative"));
        }

        let mut recipients = Vec::with_capacity(user_ids.len());
        for &user_id in user_ids {
            let user = User::find_by_id(user_id)
                .one(&self.db)
                .await
                .map_err(|e| PointsError::internal_error(format!("Database error: {}", e)))?
                .ok_or_else(|| PointsError::recipient_not_found(user_id))?;
            recipients.push(user);
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PointsError::internal_error(format!("Failed to start transaction: {}", e)))?;

        let now = Utc::now().timestamp();
        for recipient in &recipients {
            Self::credit(&txn, recipient.id, points).await?;

            let ledger_entry = points_transaction::ActiveModel {
                user_id: Set(Some(recipient.id)),
                points: Set(points),
                transaction_type: Set(TransactionType::Add.as_i16()),
                description: Set(format!(
                    "Manual grant of {} points to {}",
                    points, recipient.username
                )),
                created_at: Set(now),
                ..Default::default()
            };
            ledger_entry
                .insert(&txn)
                .await
                .map_err(|e| PointsError::internal_error(format!("Database error: {}", e)))?;

            let notice = notification::ActiveModel {
                user_id: Set(recipient.id),
                message: Set(format!("You were granted {} points", points)),
                is_read: Set(false),
                created_at: Set(now),
                ..Default::default()
            };
            notice
                .insert(&txn)
                .await
                .map_err(|e| PointsError::internal_error(format!("Database error: {}", e)))?;
        }

        txn.commit()
            .await
            .map_err(|e| PointsError::internal_error(format!("Failed to commit transaction: {}", e)))?;

        tracing::info!(recipients = user_ids.len(), points, "points granted");

        Ok(())
    }

    /// Guarded debit; returns false when the balance no longer covers the
    /// amount
    async fn debit(
        txn: &DatabaseTransaction,
        user_id: i32,
        points: i32,
    ) -> Result<bool, PointsError> {
        let result = User::update_many()
            .col_expr(
                user::Column::Points,
                Expr::col(user::Column::Points).sub(points),
            )
            .filter(user::Column::Id.eq(user_id))
            .filter(user::Column::Points.gte(points))
            .exec(txn)
            .await
            .map_err(|e| PointsError::internal_error(format!("Database error: {}", e)))?;

        Ok(result.rows_affected == 1)
    }

    async fn credit(
        txn: &DatabaseTransaction,
        user_id: i32,
        points: i32,
    ) -> Result<(), PointsError> {
        User::update_many()
            .col_expr(
                user::Column::Points,
                Expr::col(user::Column::Points).add(points),
            )
            .filter(user::Column::Id.eq(user_id))
            .exec(txn)
            .await
            .map_err(|e| PointsError::internal_error(format!("Database error: {}", e)))?;
        Ok(())
    }
}

impl std::fmt::Debug for PointsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointsStore").field("db", &"<connection>").finish()
    }
}
