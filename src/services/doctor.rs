use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        admission::{self, Entity as AdmissionEntity},
        appointment::{self, Entity as AppointmentEntity},
        clinical_note::{self, Entity as ClinicalNoteEntity},
        lab_order::{self, Entity as LabOrderEntity},
        medical_note,
        patient::Entity as PatientEntity,
        AdmissionStatus, AppointmentStatus, LabOrderStatus,
    },
    errors::ServiceError,
    fulfillment::FulfillmentClient,
    services::lab::{lab_order_to_response, LabOrderResponse},
};

/// One row of the consultation queue: the patient, flattened, plus the
/// appointment that put them there.
#[derive(Debug, Serialize, ToSchema)]
pub struct QueuePatient {
    pub patient_id: String,
    pub full_name: String,
    pub phone: String,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub department: Option<String>,
    pub status: String,
    pub appointment_id: String,
    pub internal_id: i32,
    pub appointment_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdmitPatientRequest {
    #[validate(length(min = 1, message = "patient_id is required"))]
    pub patient_id: String,
    #[validate(length(min = 1, message = "doctor_name is required"))]
    pub doctor_name: String,
    pub diagnosis: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdmissionResponse {
    pub admission_id: String,
    pub patient_id: String,
    pub doctor_name: String,
    pub diagnosis: Option<String>,
    pub status: String,
    pub admission_date: DateTime<Utc>,
    pub discharge_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClinicalNoteResponse {
    pub appointment_id: String,
    pub patient_id: String,
    pub doctor_name: Option<String>,
    pub doctor_notes: Option<String>,
    pub diagnosis: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SaveClinicalNotesRequest {
    #[validate(length(min = 1, message = "appointment_id is required"))]
    pub appointment_id: String,
    #[validate(length(min = 1, message = "patient_id is required"))]
    pub patient_id: String,
    pub doctor_name: Option<String>,
    pub notes: Option<String>,
    pub diagnosis: Option<String>,
}

/// Ward note target: either an explicit admission or "the latest active
/// admission of this patient".
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SaveMedicalNoteRequest {
    pub admission_id: Option<String>,
    pub patient_id: Option<String>,
    #[validate(length(min = 1, message = "note_type is required"))]
    pub note_type: String,
    #[validate(length(min = 1, message = "details are required"))]
    pub details: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OrderLabTestRequest {
    #[validate(length(min = 1, message = "patient_id is required"))]
    pub patient_id: String,
    #[validate(length(min = 1, message = "doctor_id is required"))]
    pub doctor_id: String,
    #[validate(length(min = 1, message = "test_type is required"))]
    pub test_type: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAppointmentStatusRequest {
    #[validate(length(min = 1, message = "status is required"))]
    pub status: String,
}

/// Doctor console: queue, admissions, notes and lab ordering.
#[derive(Clone)]
pub struct DoctorService {
    db: Arc<DbPool>,
    fulfillment: Arc<FulfillmentClient>,
}

impl DoctorService {
    pub fn new(db: Arc<DbPool>, fulfillment: Arc<FulfillmentClient>) -> Self {
        Self { db, fulfillment }
    }

    /// Today's open appointments joined with patient details, soonest
    /// first. Admitted patients stay visible for rounds.
    #[instrument(skip(self))]
    pub async fn patient_queue(&self) -> Result<Vec<QueuePatient>, ServiceError> {
        let start_of_day = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
        let end_of_day = start_of_day + Duration::days(1);

        let rows = AppointmentEntity::find()
            .filter(appointment::Column::Status.is_in([
                AppointmentStatus::Pending.to_string(),
                AppointmentStatus::Scheduled.to_string(),
                AppointmentStatus::CheckedIn.to_string(),
                AppointmentStatus::InProgress.to_string(),
                AppointmentStatus::Admitted.to_string(),
            ]))
            .filter(appointment::Column::AppointmentDate.gte(start_of_day))
            .filter(appointment::Column::AppointmentDate.lt(end_of_day))
            .order_by_asc(appointment::Column::AppointmentDate)
            .find_also_related(PatientEntity)
            .all(&*self.db)
            .await?;

        let queue = rows
            .into_iter()
            .filter_map(|(appt, maybe_patient)| {
                let Some(patient) = maybe_patient else {
                    warn!(appointment_id = %appt.appointment_id, "appointment without patient row skipped");
                    return None;
                };
                Some(QueuePatient {
                    patient_id: patient.patient_id,
                    full_name: patient.full_name,
                    phone: patient.phone,
                    age: patient.age,
                    gender: patient.gender,
                    department: appt.department,
                    status: appt.status,
                    appointment_id: appt.appointment_id,
                    internal_id: appt.id,
                    appointment_date: appt.appointment_date,
                })
            })
            .collect();

        Ok(queue)
    }

    /// Opens an inpatient admission for the patient.
    #[instrument(skip(self, request), fields(patient_id = %request.patient_id))]
    pub async fn admit_patient(
        &self,
        request: AdmitPatientRequest,
    ) -> Result<AdmissionResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let token = Uuid::new_v4().simple().to_string();
        let admission_id = format!("ADM-{}", token[..12].to_uppercase());

        let created = admission::ActiveModel {
            admission_id: Set(admission_id),
            patient_id: Set(request.patient_id.clone()),
            doctor_name: Set(request.doctor_name.clone()),
            diagnosis: Set(request.diagnosis.clone()),
            status: Set(AdmissionStatus::Admitted.to_string()),
            admission_date: Set(Utc::now()),
            discharge_date: Set(None),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        info!(admission_id = %created.admission_id, "patient admitted");
        Ok(admission_to_response(created))
    }

    /// Clinical history of a patient, newest note first.
    pub async fn patient_history(
        &self,
        patient_id: &str,
    ) -> Result<Vec<ClinicalNoteResponse>, ServiceError> {
        let notes = ClinicalNoteEntity::find()
            .filter(clinical_note::Column::PatientId.eq(patient_id))
            .order_by_desc(clinical_note::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(notes.into_iter().map(clinical_note_to_response).collect())
    }

    /// Saves (or re-saves) the EHR record for a consultation, then forwards
    /// it to the EHR workflow. The forward is best-effort.
    #[instrument(skip(self, request), fields(appointment_id = %request.appointment_id))]
    pub async fn save_clinical_notes(
        &self,
        request: SaveClinicalNotesRequest,
    ) -> Result<ClinicalNoteResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db;
        let now = Utc::now();

        let existing = ClinicalNoteEntity::find_by_id(request.appointment_id.clone())
            .one(db)
            .await?;

        let saved = match existing {
            Some(existing) => {
                let mut active: clinical_note::ActiveModel = existing.into();
                active.doctor_name = Set(request.doctor_name.clone());
                active.doctor_notes = Set(request.notes.clone());
                active.diagnosis = Set(request.diagnosis.clone());
                active.updated_at = Set(Some(now));
                active.update(db).await?
            }
            None => {
                clinical_note::ActiveModel {
                    appointment_id: Set(request.appointment_id.clone()),
                    patient_id: Set(request.patient_id.clone()),
                    doctor_name: Set(request.doctor_name.clone()),
                    doctor_notes: Set(request.notes.clone()),
                    diagnosis: Set(request.diagnosis.clone()),
                    created_at: Set(now),
                    updated_at: Set(None),
                }
                .insert(db)
                .await?
            }
        };

        self.fulfillment.notify_clinical_note(json!({
            "appointment_id": request.appointment_id,
            "patient_id": request.patient_id,
            "doctor_name": request.doctor_name,
            "notes": request.notes,
            "diagnosis": request.diagnosis,
        }));

        Ok(clinical_note_to_response(saved))
    }

    /// Attaches a ward note to an admission, resolving the target through
    /// the patient's latest active admission when no explicit id is given.
    #[instrument(skip(self, request))]
    pub async fn save_medical_note(
        &self,
        request: SaveMedicalNoteRequest,
    ) -> Result<medical_note::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db;

        let admission_id = match (&request.admission_id, &request.patient_id) {
            (Some(admission_id), _) if !admission_id.trim().is_empty() => {
                AdmissionEntity::find()
                    .filter(admission::Column::AdmissionId.eq(admission_id.clone()))
                    .one(db)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Admission {} not found", admission_id))
                    })?
                    .admission_id
            }
            (_, Some(patient_id)) if !patient_id.trim().is_empty() => {
                AdmissionEntity::find()
                    .filter(admission::Column::PatientId.eq(patient_id.clone()))
                    .filter(admission::Column::Status.eq(AdmissionStatus::Admitted.to_string()))
                    .order_by_desc(admission::Column::AdmissionDate)
                    .one(db)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(
                            "No active admission found for this patient".to_string(),
                        )
                    })?
                    .admission_id
            }
            _ => {
                return Err(ServiceError::ValidationError(
                    "either admission_id or patient_id must be provided".to_string(),
                ))
            }
        };

        let note = medical_note::ActiveModel {
            admission_id: Set(admission_id),
            note_type: Set(request.note_type.clone()),
            details: Set(request.details.clone()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        Ok(note)
    }

    /// Places a lab order. The fulfillment service checks availability,
    /// assigns the technician and generates the barcode; the local row is
    /// created from its reply.
    #[instrument(skip(self, request), fields(patient_id = %request.patient_id, test_type = %request.test_type))]
    pub async fn order_lab_test(
        &self,
        request: OrderLabTestRequest,
    ) -> Result<LabOrderResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let reply = self
            .fulfillment
            .create_lab_order(&request.patient_id, &request.doctor_id, &request.test_type)
            .await?;

        info!(
            barcode = %reply.barcode,
            technician = reply.technician.as_deref().unwrap_or("unassigned"),
            "lab order confirmed"
        );

        let created = lab_order::ActiveModel {
            barcode: Set(reply.barcode.clone()),
            patient_id: Set(request.patient_id.clone()),
            doctor_id: Set(request.doctor_id.clone()),
            test_type: Set(request.test_type.clone()),
            status: Set(LabOrderStatus::Pending.to_string()),
            technician: Set(reply.technician.clone()),
            result_value: Set(None),
            technician_remarks: Set(None),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        Ok(lab_order_to_response(created))
    }

    /// Lab orders of one patient, newest first.
    pub async fn patient_lab_orders(
        &self,
        patient_id: &str,
    ) -> Result<Vec<LabOrderResponse>, ServiceError> {
        let orders = LabOrderEntity::find()
            .filter(lab_order::Column::PatientId.eq(patient_id))
            .order_by_desc(lab_order::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        Ok(orders.into_iter().map(lab_order_to_response).collect())
    }

    /// Moves an appointment through its lifecycle (check-in, in progress,
    /// admitted, completed…).
    #[instrument(skip(self))]
    pub async fn update_appointment_status(
        &self,
        appointment_id: &str,
        status: &str,
    ) -> Result<(), ServiceError> {
        let parsed = AppointmentStatus::from_str(status)
            .map_err(|_| ServiceError::InvalidStatus(format!("Unknown appointment status: {status}")))?;

        let db = &*self.db;

        let appointment = AppointmentEntity::find()
            .filter(appointment::Column::AppointmentId.eq(appointment_id))
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Appointment {} not found", appointment_id))
            })?;

        let mut active: appointment::ActiveModel = appointment.into();
        active.status = Set(parsed.to_string());
        active.update(db).await?;

        info!(appointment_id, status = %parsed, "appointment status updated");
        Ok(())
    }
}

fn admission_to_response(model: admission::Model) -> AdmissionResponse {
    AdmissionResponse {
        admission_id: model.admission_id,
        patient_id: model.patient_id,
        doctor_name: model.doctor_name,
        diagnosis: model.diagnosis,
        status: model.status,
        admission_date: model.admission_date,
        discharge_date: model.discharge_date,
    }
}

fn clinical_note_to_response(model: clinical_note::Model) -> ClinicalNoteResponse {
    ClinicalNoteResponse {
        appointment_id: model.appointment_id,
        patient_id: model.patient_id,
        doctor_name: model.doctor_name,
        doctor_notes: model.doctor_notes,
        diagnosis: model.diagnosis,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
