use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Serialize;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::{
    db::DbPool,
    entities::{
        admission::{self, Entity as AdmissionEntity},
        AdmissionStatus,
    },
    errors::ServiceError,
    fulfillment::FulfillmentClient,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct DischargeResponse {
    pub patient_id: String,
    /// The admission that was closed, when one was open.
    pub admission_id: Option<String>,
    /// Discharge summary document, base64-encoded for transport.
    pub pdf_base64: String,
}

/// Discharge workflow: closes the active admission and fetches the
/// externally rendered discharge summary.
#[derive(Clone)]
pub struct DischargeService {
    db: Arc<DbPool>,
    fulfillment: Arc<FulfillmentClient>,
}

impl DischargeService {
    pub fn new(db: Arc<DbPool>, fulfillment: Arc<FulfillmentClient>) -> Self {
        Self { db, fulfillment }
    }

    /// Marks the latest active admission as Discharged (when there is
    /// one), then retrieves the rendered summary. The admission update is
    /// not rolled back when the document fetch fails.
    #[instrument(skip(self))]
    pub async fn discharge_patient(
        &self,
        patient_id: &str,
    ) -> Result<DischargeResponse, ServiceError> {
        let db = &*self.db;

        let active_admission = AdmissionEntity::find()
            .filter(admission::Column::PatientId.eq(patient_id))
            .filter(admission::Column::Status.eq(AdmissionStatus::Admitted.to_string()))
            .order_by_desc(admission::Column::AdmissionDate)
            .one(db)
            .await?;

        let admission_id = match active_admission {
            Some(active) => {
                let admission_id = active.admission_id.clone();
                let mut model: admission::ActiveModel = active.into();
                model.status = Set(AdmissionStatus::Discharged.to_string());
                model.discharge_date = Set(Some(Utc::now()));
                model.update(db).await?;
                info!(admission_id = %admission_id, "admission closed");
                Some(admission_id)
            }
            None => {
                warn!(patient_id, "discharge requested with no active admission");
                None
            }
        };

        let document = self.fulfillment.discharge_document(patient_id).await?;

        Ok(DischargeResponse {
            patient_id: patient_id.to_string(),
            admission_id,
            pdf_base64: BASE64.encode(document),
        })
    }
}
