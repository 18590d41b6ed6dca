use sea_orm::entity::prelude::*;

/// Append-only ledger entry. Rows are never mutated after creation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "points_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    // Subject of a grant/deduct/refund entry
    pub user_id: Option<i32>,

    // Both ends of a transfer entry
    pub from_user_id: Option<i32>,
    pub to_user_id: Option<i32>,

    pub points: i32,

    // 1: add, 2: deduct, 3: refund, 4: transfer
    pub transaction_type: i16,

    pub description: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
