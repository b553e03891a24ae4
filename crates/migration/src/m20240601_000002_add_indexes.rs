use sea_orm_migration::prelude::*;

use crate::m20240601_000001_create_product::Product;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Product: listing is ordered and filtered by the folded name
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_product_name_key")
                    .table(Product::Table)
                    .col(Product::NameKey)
                    .to_owned(),
            )
            .await?;

        // Product: lookups by code (not unique)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_product_code")
                    .table(Product::Table)
                    .col(Product::Code)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_product_code").table(Product::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_product_name_key").table(Product::Table).to_owned())
            .await
    }
}
