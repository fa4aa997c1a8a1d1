use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lab order. The barcode and the assigned technician come back from the
/// fulfillment service when the order is placed; the worklist is keyed by
/// barcode from then on.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lab_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub barcode: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub test_type: String,
    pub status: String,
    pub technician: Option<String>,
    pub result_value: Option<String>,
    pub technician_remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
