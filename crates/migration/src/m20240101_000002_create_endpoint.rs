use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Endpoint::Table)
                    .if_not_exists()
                    .col(string_len(Endpoint::Id, 64).primary_key())
                    .col(string_len(Endpoint::Region, 255).not_null())
                    .col(string_len(Endpoint::ServiceId, 64).not_null())
                    .col(json_binary(Endpoint::Extra).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_endpoint_service")
                            .from(Endpoint::Table, Endpoint::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Endpoint::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Endpoint {
    Table,
    Id,
    Region,
    ServiceId,
    Extra,
}

#[derive(DeriveIden)]
enum Service {
    Table,
    Id,
}
