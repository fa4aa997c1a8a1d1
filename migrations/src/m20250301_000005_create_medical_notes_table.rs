use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MedicalNotes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MedicalNotes::Id)
                            .integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MedicalNotes::AdmissionId).string().not_null())
                    .col(ColumnDef::new(MedicalNotes::NoteType).string().not_null())
                    .col(ColumnDef::new(MedicalNotes::Details).text().not_null())
                    .col(
                        ColumnDef::new(MedicalNotes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_medical_notes_admission_id")
                    .table(MedicalNotes::Table)
                    .col(MedicalNotes::AdmissionId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MedicalNotes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum MedicalNotes {
    Table,
    Id,
    AdmissionId,
    NoteType,
    Details,
    CreatedAt,
}
