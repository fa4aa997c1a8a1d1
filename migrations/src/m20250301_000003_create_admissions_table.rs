use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Admissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Admissions::Id)
                            .integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Admissions::AdmissionId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Admissions::PatientId).string().not_null())
                    .col(ColumnDef::new(Admissions::DoctorName).string().not_null())
                    .col(ColumnDef::new(Admissions::Diagnosis).text().null())
                    .col(
                        ColumnDef::new(Admissions::Status)
                            .string()
                            .not_null()
                            .default("Admitted"),
                    )
                    .col(
                        ColumnDef::new(Admissions::AdmissionDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Admissions::DischargeDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Discharge resolves "latest active admission for patient" frequently.
        manager
            .create_index(
                Index::create()
                    .name("idx_admissions_patient_status")
                    .table(Admissions::Table)
                    .col(Admissions::PatientId)
                    .col(Admissions::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Admissions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Admissions {
    Table,
    Id,
    AdmissionId,
    PatientId,
    DoctorName,
    Diagnosis,
    Status,
    AdmissionDate,
    DischargeDate,
}
