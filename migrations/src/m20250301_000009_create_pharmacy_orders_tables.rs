use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PharmacyOrders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PharmacyOrders::Id)
                            .integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PharmacyOrders::PatientId).string().not_null())
                    .col(ColumnDef::new(PharmacyOrders::DoctorId).string().not_null())
                    .col(
                        ColumnDef::new(PharmacyOrders::Status)
                            .string()
                            .not_null()
                            .default("Pending"),
                    )
                    .col(
                        ColumnDef::new(PharmacyOrders::TotalItemsRequested)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PharmacyOrders::TotalAmount)
                            .decimal()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(PharmacyOrders::ItemsDispensed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PharmacyOrders::ItemsMissing)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PharmacyOrders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PharmacyOrders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PharmacyOrderItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PharmacyOrderItems::Id)
                            .integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PharmacyOrderItems::OrderId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PharmacyOrderItems::MedicineName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PharmacyOrderItems::QuantityRequested)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PharmacyOrderItems::QuantityDispensed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PharmacyOrderItems::Status)
                            .string()
                            .not_null()
                            .default("Pending"),
                    )
                    .col(ColumnDef::new(PharmacyOrderItems::UnitPrice).decimal().null())
                    .col(ColumnDef::new(PharmacyOrderItems::TotalPrice).decimal().null())
                    .col(ColumnDef::new(PharmacyOrderItems::BatchId).string().null())
                    .col(
                        ColumnDef::new(PharmacyOrderItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pharmacy_order_items_order_id")
                            .from(PharmacyOrderItems::Table, PharmacyOrderItems::OrderId)
                            .to(PharmacyOrders::Table, PharmacyOrders::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pharmacy_orders_status")
                    .table(PharmacyOrders::Table)
                    .col(PharmacyOrders::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PharmacyOrderItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PharmacyOrders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PharmacyOrders {
    Table,
    Id,
    PatientId,
    DoctorId,
    Status,
    TotalItemsRequested,
    TotalAmount,
    ItemsDispensed,
    ItemsMissing,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum PharmacyOrderItems {
    Table,
    Id,
    OrderId,
    MedicineName,
    QuantityRequested,
    QuantityDispensed,
    Status,
    UnitPrice,
    TotalPrice,
    BatchId,
    CreatedAt,
}
