use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MedicineBatches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MedicineBatches::Id)
                            .integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MedicineBatches::MedicineId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MedicineBatches::BatchNo)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(MedicineBatches::CurrentStock)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(MedicineBatches::ExpiryDate).date().not_null())
                    .col(ColumnDef::new(MedicineBatches::RackLocation).string().null())
                    .col(
                        ColumnDef::new(MedicineBatches::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_medicine_batches_medicine_id")
                            .from(MedicineBatches::Table, MedicineBatches::MedicineId)
                            .to(
                                super::m20250301_000007_create_medicine_master_table::MedicineMaster::Table,
                                super::m20250301_000007_create_medicine_master_table::MedicineMaster::Id,
                            )
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MedicineBatches::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum MedicineBatches {
    Table,
    Id,
    MedicineId,
    BatchNo,
    CurrentStock,
    ExpiryDate,
    RackLocation,
    CreatedAt,
}
