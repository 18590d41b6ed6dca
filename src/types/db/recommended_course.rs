use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recommended_courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    // Submitting user
    pub user_id: i32,

    pub title: String,
    pub description: String,
    pub instructor: String,
    pub image_url: Option<String>,

    // 0: pending, 1: approved, 2: rejected
    pub status: i16,

    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
