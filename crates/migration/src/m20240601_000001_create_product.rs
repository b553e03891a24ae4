//! Create `product` table.
//! Holds the catalog records; `image_path` points at a blob in the image store.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Product::Table)
                    .if_not_exists()
                    .col(uuid(Product::Id).primary_key())
                    .col(string_len(Product::Name, 255).not_null())
                    // lower-cased name, searched and sorted on instead of `name`
                    .col(string_len(Product::NameKey, 1024).not_null())
                    .col(string_len(Product::Code, 255).not_null())
                    .col(string_len(Product::Variant, 255).not_null())
                    .col(string_len(Product::Manufacturer, 255).not_null())
                    .col(integer(Product::Stock).not_null())
                    .col(string_len_null(Product::ImagePath, 1024))
                    .col(timestamp_with_time_zone(Product::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Product::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Product::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Product {
    Table,
    Id,
    Name,
    NameKey,
    Code,
    Variant,
    Manufacturer,
    Stock,
    ImagePath,
    CreatedAt,
    UpdatedAt,
}
