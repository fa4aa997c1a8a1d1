use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One EHR record per appointment; re-saves overwrite in place.
        manager
            .create_table(
                Table::create()
                    .table(ClinicalNotes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClinicalNotes::AppointmentId)
                            .string()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ClinicalNotes::PatientId).string().not_null())
                    .col(ColumnDef::new(ClinicalNotes::DoctorName).string().null())
                    .col(ColumnDef::new(ClinicalNotes::DoctorNotes).text().null())
                    .col(ColumnDef::new(ClinicalNotes::Diagnosis).text().null())
                    .col(
                        ColumnDef::new(ClinicalNotes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClinicalNotes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_clinical_notes_patient_id")
                    .table(ClinicalNotes::Table)
                    .col(ClinicalNotes::PatientId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClinicalNotes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ClinicalNotes {
    Table,
    AppointmentId,
    PatientId,
    DoctorName,
    DoctorNotes,
    Diagnosis,
    CreatedAt,
    UpdatedAt,
}
