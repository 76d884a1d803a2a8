use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000005_create_pre_orders_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PreOrders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PreOrders::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    // customer_id XOR guest fields; enforced by the service layer
                    .col(ColumnDef::new(PreOrders::CustomerId).uuid().null())
                    .col(ColumnDef::new(PreOrders::GuestName).string_len(100).null())
                    .col(ColumnDef::new(PreOrders::GuestPhone).string_len(30).null())
                    .col(ColumnDef::new(PreOrders::GuestCity).string_len(100).null())
                    .col(
                        ColumnDef::new(PreOrders::Total)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PreOrders::Status).string_len(20).not_null())
                    .col(ColumnDef::new(PreOrders::WhatsappLink).text().not_null())
                    .col(
                        ColumnDef::new(PreOrders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PreOrders::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PreOrders {
    Table,
    Id,
    CustomerId,
    GuestName,
    GuestPhone,
    GuestCity,
    Total,
    Status,
    WhatsappLink,
    CreatedAt,
}
