use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MedicineMaster::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MedicineMaster::Id)
                            .integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MedicineMaster::BrandName)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(MedicineMaster::GenericName)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(MedicineMaster::PricePerUnit)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MedicineMaster::MinThreshold)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MedicineMaster::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum MedicineMaster {
    Table,
    Id,
    BrandName,
    GenericName,
    PricePerUnit,
    MinThreshold,
}
