use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        appointment::{self, Entity as AppointmentEntity},
        patient::{self, Entity as PatientEntity},
        AppointmentStatus,
    },
    errors::ServiceError,
    fulfillment::FulfillmentClient,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterPatientRequest {
    #[validate(length(min = 1, message = "full_name is required"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
    pub age: Option<String>,
    pub gender: Option<String>,
    #[validate(length(min = 1, message = "department is required"))]
    pub department: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub aadhar: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterPatientResponse {
    pub patient_id: String,
    pub appointment_id: String,
    pub user_type: String,
}

/// Front-desk registration. The fulfillment service is the id authority:
/// it is called first and nothing is written locally until it has handed
/// out both the patient id and the appointment id.
#[derive(Clone)]
pub struct RegistrationService {
    db: Arc<DbPool>,
    fulfillment: Arc<FulfillmentClient>,
}

impl RegistrationService {
    pub fn new(db: Arc<DbPool>, fulfillment: Arc<FulfillmentClient>) -> Self {
        Self { db, fulfillment }
    }

    #[instrument(skip(self, request), fields(full_name = %request.full_name, department = %request.department))]
    pub async fn register_patient(
        &self,
        request: RegisterPatientRequest,
    ) -> Result<RegisterPatientResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let form = json!({
            "full_name": request.full_name,
            "phone": request.phone,
            "age": request.age,
            "gender": request.gender,
            "department": request.department,
            "email": request.email.as_deref().unwrap_or("not given"),
            "address": request.address.as_deref().unwrap_or("not given"),
            "aadhar": request.aadhar,
        });

        let reply = self.fulfillment.submit_registration(&form).await?;
        info!(
            patient_id = %reply.patient_id,
            appointment_id = %reply.appointment_id,
            "registration confirmed by fulfillment service"
        );

        let db = &*self.db;
        let now = Utc::now();

        let existing_patient = PatientEntity::find()
            .filter(patient::Column::PatientId.eq(reply.patient_id.clone()))
            .one(db)
            .await?;

        if existing_patient.is_none() {
            patient::ActiveModel {
                patient_id: Set(reply.patient_id.clone()),
                full_name: Set(request.full_name.clone()),
                phone: Set(request.phone.clone()),
                age: Set(request.age.clone()),
                gender: Set(request.gender.clone()),
                department: Set(request.department.clone()),
                email: Set(request.email.clone()),
                address: Set(request.address.clone()),
                aadhar_card: Set(request.aadhar.clone()),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }

        let existing_appointment = AppointmentEntity::find()
            .filter(appointment::Column::AppointmentId.eq(reply.appointment_id.clone()))
            .one(db)
            .await?;

        if existing_appointment.is_none() {
            appointment::ActiveModel {
                appointment_id: Set(reply.appointment_id.clone()),
                patient_id: Set(reply.patient_id.clone()),
                status: Set(AppointmentStatus::Pending.to_string()),
                department: Set(Some(request.department.clone())),
                reason_for_visit: Set(Some("Initial Consultation".to_string())),
                appointment_date: Set(now),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }

        Ok(RegisterPatientResponse {
            patient_id: reply.patient_id,
            appointment_id: reply.appointment_id,
            user_type: "OPD".to_string(),
        })
    }
}
