use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000006_create_pre_order_items_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PreOrderItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PreOrderItems::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PreOrderItems::PreOrderId).uuid().not_null())
                    .col(ColumnDef::new(PreOrderItems::ProductId).uuid().not_null())
                    .col(
                        ColumnDef::new(PreOrderItems::Quantity)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PreOrderItems::UnitPrice)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PreOrderItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pre_order_items_pre_order_id")
                    .table(PreOrderItems::Table)
                    .col(PreOrderItems::PreOrderId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PreOrderItems::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PreOrderItems {
    Table,
    Id,
    PreOrderId,
    ProductId,
    Quantity,
    UnitPrice,
    CreatedAt,
}
