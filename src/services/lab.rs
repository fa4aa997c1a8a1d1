use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        lab_order::{self, Entity as LabOrderEntity},
        patient::{self, Entity as PatientEntity},
        LabOrderStatus,
    },
    errors::ServiceError,
    fulfillment::FulfillmentClient,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
pub enum WorklistFilter {
    #[default]
    Pending,
    Completed,
    All,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LabOrderResponse {
    pub id: i32,
    pub barcode: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub test_type: String,
    pub status: String,
    pub technician: Option<String>,
    pub result_value: Option<String>,
    pub technician_remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Worklist row, enriched with the patient's name for display.
#[derive(Debug, Serialize, ToSchema)]
pub struct WorklistEntry {
    pub order_id: String,
    pub patient_name: String,
    pub test_type: String,
    pub doctor_name: String,
    pub status: String,
    pub result_value: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LabStats {
    pub pending_count: u64,
    pub completed_today: u64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UploadResultRequest {
    #[validate(length(min = 1, message = "result_value is required"))]
    pub result_value: String,
    pub remarks: Option<String>,
}

/// Lab technician workflows: worklist, stats and result capture.
#[derive(Clone)]
pub struct LabService {
    db: Arc<DbPool>,
    fulfillment: Arc<FulfillmentClient>,
}

impl LabService {
    pub fn new(db: Arc<DbPool>, fulfillment: Arc<FulfillmentClient>) -> Self {
        Self { db, fulfillment }
    }

    /// Orders for the technician screen, newest first, with patient names
    /// joined in manually. Unknown patients render as "Unknown" rather
    /// than dropping the row.
    #[instrument(skip(self))]
    pub async fn worklist(
        &self,
        filter: WorklistFilter,
    ) -> Result<Vec<WorklistEntry>, ServiceError> {
        let db = &*self.db;

        let mut query = LabOrderEntity::find();
        query = match filter {
            WorklistFilter::Pending => query.filter(lab_order::Column::Status.is_in([
                LabOrderStatus::Pending.to_string(),
                LabOrderStatus::Processing.to_string(),
            ])),
            WorklistFilter::Completed => query
                .filter(lab_order::Column::Status.eq(LabOrderStatus::Completed.to_string())),
            WorklistFilter::All => query,
        };

        let orders = query
            .order_by_desc(lab_order::Column::CreatedAt)
            .all(db)
            .await?;

        let mut patient_ids: Vec<String> =
            orders.iter().map(|o| o.patient_id.clone()).collect();
        patient_ids.sort();
        patient_ids.dedup();

        let names: HashMap<String, String> = PatientEntity::find()
            .filter(patient::Column::PatientId.is_in(patient_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.patient_id, p.full_name))
            .collect();

        Ok(orders
            .into_iter()
            .map(|order| WorklistEntry {
                order_id: order.barcode,
                patient_name: names
                    .get(&order.patient_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string()),
                test_type: order.test_type,
                doctor_name: order.doctor_id,
                status: order.status,
                result_value: order.result_value,
                created_at: order.created_at,
            })
            .collect())
    }

    /// Open order count plus completions since midnight.
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<LabStats, ServiceError> {
        let db = &*self.db;
        let start_of_day = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();

        let pending_count = LabOrderEntity::find()
            .filter(lab_order::Column::Status.is_in([
                LabOrderStatus::Pending.to_string(),
                LabOrderStatus::Processing.to_string(),
            ]))
            .count(db)
            .await?;

        let completed_today = LabOrderEntity::find()
            .filter(lab_order::Column::Status.eq(LabOrderStatus::Completed.to_string()))
            .filter(lab_order::Column::CreatedAt.gte(start_of_day))
            .count(db)
            .await?;

        Ok(LabStats {
            pending_count,
            completed_today,
        })
    }

    /// Records a result against the barcode and notifies the analysis
    /// workflow. The notification is best-effort; the local write is what
    /// completes the order.
    #[instrument(skip(self, request), fields(barcode = %barcode))]
    pub async fn upload_result(
        &self,
        barcode: &str,
        request: UploadResultRequest,
    ) -> Result<LabOrderResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db;

        let order = LabOrderEntity::find()
            .filter(lab_order::Column::Barcode.eq(barcode))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Lab order {} not found", barcode)))?;

        let mut active: lab_order::ActiveModel = order.into();
        active.status = Set(LabOrderStatus::Completed.to_string());
        active.result_value = Set(Some(request.result_value.clone()));
        active.technician_remarks = Set(request.remarks.clone());
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(db).await?;

        self.fulfillment.notify_lab_result(
            barcode.to_string(),
            request.result_value,
            request.remarks,
        );

        info!(barcode, "lab result uploaded");
        Ok(lab_order_to_response(updated))
    }
}

pub(crate) fn lab_order_to_response(model: lab_order::Model) -> LabOrderResponse {
    LabOrderResponse {
        id: model.id,
        barcode: model.barcode,
        patient_id: model.patient_id,
        doctor_id: model.doctor_id,
        test_type: model.test_type,
        status: model.status,
        technician: model.technician,
        result_value: model.result_value,
        technician_remarks: model.technician_remarks,
        created_at: model.created_at,
    }
}
