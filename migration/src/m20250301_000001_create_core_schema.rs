use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::PasswordHash)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::Role)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::Points)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Users::OtpCode).string().null())
                    .col(ColumnDef::new(Users::OtpExpiresAt).big_integer().null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Users::LastLoginAt).big_integer().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .to_owned(),
            )
            .await?;

        // Create recommended_courses table
        manager
            .create_table(
                Table::create()
                    .table(RecommendedCourses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecommendedCourses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RecommendedCourses::UserId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendedCourses::Title)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendedCourses::Description)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendedCourses::Instructor)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendedCourses::ImageUrl)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RecommendedCourses::Status)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RecommendedCourses::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendedCourses::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recommended_courses_user_id")
                            .from(RecommendedCourses::Table, RecommendedCourses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create courses table
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Courses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Courses::Title).string().not_null())
                    .col(ColumnDef::new(Courses::Description).text().not_null())
                    .col(ColumnDef::new(Courses::Instructor).string().not_null())
                    .col(
                        ColumnDef::new(Courses::CourseDate)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Courses::ImageUrl).string().null())
                    .col(
                        ColumnDef::new(Courses::MaxParticipants)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Courses::SignUpStartDate)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Courses::SignUpEndDate)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Courses::Status)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Courses::RecommendedCourseId)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Courses::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Courses::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_courses_recommended_course_id")
                            .from(Courses::Table, Courses::RecommendedCourseId)
                            .to(RecommendedCourses::Table, RecommendedCourses::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // One promoted Course per recommendation
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_courses_recommended_course_id")
                    .table(Courses::Table)
                    .col(Courses::RecommendedCourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_courses_status")
                    .table(Courses::Table)
                    .col(Courses::Status)
                    .to_owned(),
            )
            .await?;

        // Create points_transactions table
        manager
            .create_table(
                Table::create()
                    .table(PointsTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PointsTransactions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PointsTransactions::UserId).integer().null())
                    .col(
                        ColumnDef::new(PointsTransactions::FromUserId)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PointsTransactions::ToUserId)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PointsTransactions::Points)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointsTransactions::TransactionType)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointsTransactions::Description)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointsTransactions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_points_transactions_user_id")
                    .table(PointsTransactions::Table)
                    .col(PointsTransactions::UserId)
                    .to_owned(),
            )
            .await?;

        // Create course_registrations table
        manager
            .create_table(
                Table::create()
                    .table(CourseRegistrations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CourseRegistrations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CourseRegistrations::UserId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CourseRegistrations::CourseId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CourseRegistrations::RegistrationStatus)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CourseRegistrations::PointsDeducted)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CourseRegistrations::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CourseRegistrations::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_registrations_user_id")
                            .from(CourseRegistrations::Table, CourseRegistrations::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_registrations_course_id")
                            .from(CourseRegistrations::Table, CourseRegistrations::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_course_registrations_course_id")
                    .table(CourseRegistrations::Table)
                    .col(CourseRegistrations::CourseId)
                    .to_owned(),
            )
            .await?;

        // Create notifications table
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Notifications::UserId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Notifications::Message).text().not_null())
                    .col(
                        ColumnDef::new(Notifications::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notifications_user_id")
                            .from(Notifications::Table, Notifications::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(CourseRegistrations::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(PointsTransactions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(RecommendedCourses::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Role,
    Points,
    OtpCode,
    OtpExpiresAt,
    CreatedAt,
    LastLoginAt,
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    Id,
    Title,
    Description,
    Instructor,
    CourseDate,
    ImageUrl,
    MaxParticipants,
    SignUpStartDate,
    SignUpEndDate,
    Status,
    RecommendedCourseId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum RecommendedCourses {
    Table,
    Id,
    UserId,
    Title,
    Description,
    Instructor,
    ImageUrl,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PointsTransactions {
    Table,
    Id,
    UserId,
    FromUserId,
    ToUserId,
    Points,
    TransactionType,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CourseRegistrations {
    Table,
    Id,
    UserId,
    CourseId,
    RegistrationStatus,
    PointsDeducted,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    UserId,
    Message,
    IsRead,
    CreatedAt,
}
