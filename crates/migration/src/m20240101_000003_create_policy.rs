use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Policy::Table)
                    .if_not_exists()
                    .col(string_len(Policy::Id, 64).primary_key())
                    .col(string_len(Policy::EndpointId, 64).not_null())
                    .col(string_len(Policy::Type, 255).not_null())
                    .col(json_binary(Policy::Blob).not_null())
                    .col(json_binary(Policy::Extra).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Policy::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Policy {
    Table,
    Id,
    EndpointId,
    Type,
    Blob,
    Extra,
}
