use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Patients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Patients::Id)
                            .integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Patients::PatientId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Patients::FullName).string().not_null())
                    .col(ColumnDef::new(Patients::Phone).string().not_null())
                    .col(ColumnDef::new(Patients::Age).string().null())
                    .col(ColumnDef::new(Patients::Gender).string().null())
                    .col(ColumnDef::new(Patients::Department).string().not_null())
                    .col(ColumnDef::new(Patients::Email).string().null())
                    .col(ColumnDef::new(Patients::Address).string().null())
                    .col(ColumnDef::new(Patients::AadharCard).string().null())
                    .col(
                        ColumnDef::new(Patients::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Patients::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Patients {
    Table,
    Id,
    PatientId,
    FullName,
    Phone,
    Age,
    Gender,
    Department,
    Email,
    Address,
    AadharCard,
    CreatedAt,
}
