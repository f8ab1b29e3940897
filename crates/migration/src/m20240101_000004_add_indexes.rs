use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Endpoint: index on service_id for catalog assembly joins
        manager
            .create_index(
                Index::create()
                    .name("idx_endpoint_service")
                    .table(Endpoint::Table)
                    .col(Endpoint::ServiceId)
                    .to_owned(),
            )
            .await?;

        // Endpoint: index on region, catalog output is grouped by region
        manager
            .create_index(
                Index::create()
                    .name("idx_endpoint_region")
                    .table(Endpoint::Table)
                    .col(Endpoint::Region)
                    .to_owned(),
            )
            .await?;

        // Policy: index on endpoint_id
        manager
            .create_index(
                Index::create()
                    .name("idx_policy_endpoint")
                    .table(Policy::Table)
                    .col(Policy::EndpointId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_endpoint_service").table(Endpoint::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_endpoint_region").table(Endpoint::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_policy_endpoint").table(Policy::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Endpoint {
    Table,
    ServiceId,
    Region,
}

#[derive(DeriveIden)]
enum Policy {
    Table,
    EndpointId,
}
