use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub course_date: i64,
    pub image_url: Option<String>,
    pub max_participants: i32,
    pub sign_up_start_date: i64,
    pub sign_up_end_date: i64,

    // 0: draft, 1: published, 2: closed
    pub status: i16,

    // Back-reference to the recommendation this course was promoted from.
    // Unique: a recommendation maps to at most one course.
    #[sea_orm(unique)]
    pub recommended_course_id: Option<i32>,

    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
