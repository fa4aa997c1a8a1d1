use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LabOrders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LabOrders::Id)
                            .integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LabOrders::Barcode)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(LabOrders::PatientId).string().not_null())
                    .col(ColumnDef::new(LabOrders::DoctorId).string().not_null())
                    .col(ColumnDef::new(LabOrders::TestType).string().not_null())
                    .col(
                        ColumnDef::new(LabOrders::Status)
                            .string()
                            .not_null()
                            .default("Pending"),
                    )
                    .col(ColumnDef::new(LabOrders::Technician).string().null())
                    .col(ColumnDef::new(LabOrders::ResultValue).text().null())
                    .col(ColumnDef::new(LabOrders::TechnicianRemarks).text().null())
                    .col(
                        ColumnDef::new(LabOrders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LabOrders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_lab_orders_status")
                    .table(LabOrders::Table)
                    .col(LabOrders::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LabOrders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum LabOrders {
    Table,
    Id,
    Barcode,
    PatientId,
    DoctorId,
    TestType,
    Status,
    Technician,
    ResultValue,
    TechnicianRemarks,
    CreatedAt,
    UpdatedAt,
}
