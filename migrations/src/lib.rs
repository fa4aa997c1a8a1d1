pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_patients_table;
mod m20250301_000002_create_appointments_table;
mod m20250301_000003_create_admissions_table;
mod m20250301_000004_create_clinical_notes_table;
mod m20250301_000005_create_medical_notes_table;
mod m20250301_000006_create_lab_orders_table;
mod m20250301_000007_create_medicine_master_table;
mod m20250301_000008_create_medicine_batches_table;
mod m20250301_000009_create_pharmacy_orders_tables;
mod m20250301_000010_create_users_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_patients_table::Migration),
            Box::new(m20250301_000002_create_appointments_table::Migration),
            Box::new(m20250301_000003_create_admissions_table::Migration),
            Box::new(m20250301_000004_create_clinical_notes_table::Migration),
            Box::new(m20250301_000005_create_medical_notes_table::Migration),
            Box::new(m20250301_000006_create_lab_orders_table::Migration),
            Box::new(m20250301_000007_create_medicine_master_table::Migration),
            Box::new(m20250301_000008_create_medicine_batches_table::Migration),
            Box::new(m20250301_000009_create_pharmacy_orders_tables::Migration),
            Box::new(m20250301_000010_create_users_table::Migration),
        ]
    }
}
