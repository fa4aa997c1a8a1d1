use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "medicine_batches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub medicine_id: i32,
    #[sea_orm(unique)]
    pub batch_no: String,
    pub current_stock: i32,
    pub expiry_date: Date,
    pub rack_location: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::medicine_master::Entity",
        from = "Column::MedicineId",
        to = "super::medicine_master::Column::Id"
    )]
    Medicine,
}

impl Related<super::medicine_master::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Medicine.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
