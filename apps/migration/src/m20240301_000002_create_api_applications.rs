use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ApiApplications::Table)
                    .if_not_exists()
                    .col(uuid(ApiApplications::Id).primary_key())
                    .col(string(ApiApplications::Name))
                    .col(string_uniq(ApiApplications::ApiToken))
                    .col(boolean(ApiApplications::Active).default(true))
                    .col(timestamp_with_time_zone(ApiApplications::CreatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ApiApplications::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ApiApplications {
    Table,
    Id,
    Name,
    ApiToken,
    Active,
    CreatedAt,
}
