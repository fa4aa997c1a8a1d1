use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};

use crate::services::doctor::{
    AdmissionResponse, AdmitPatientRequest, ClinicalNoteResponse, OrderLabTestRequest,
    QueuePatient, SaveClinicalNotesRequest, SaveMedicalNoteRequest,
    UpdateAppointmentStatusRequest,
};
use crate::services::lab::LabOrderResponse;
use crate::{errors::ServiceError, ApiResponse, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/doctor/queue", get(patient_queue))
        .route("/admissions", post(admit_patient))
        .route("/patients/:patient_id/history", get(patient_history))
        .route("/patients/:patient_id/lab-orders", get(patient_lab_orders))
        .route("/clinical-notes", post(save_clinical_notes))
        .route("/medical-notes", post(save_medical_note))
        .route("/lab-orders", post(order_lab_test))
        .route(
            "/appointments/:appointment_id/status",
            put(update_appointment_status),
        )
}

/// Today's consultation queue
#[utoipa::path(
    get,
    path = "/api/v1/doctor/queue",
    summary = "Consultation queue",
    responses(
        (status = 200, description = "Today's open appointments with patient details", body = ApiResponse<Vec<QueuePatient>>),
    ),
    tag = "Doctor"
)]
pub async fn patient_queue(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<QueuePatient>>>, ServiceError> {
    let queue = state.services.doctor.patient_queue().await?;
    Ok(Json(ApiResponse::success(queue)))
}

/// Admit a patient
#[utoipa::path(
    post,
    path = "/api/v1/admissions",
    summary = "Admit patient",
    request_body = AdmitPatientRequest,
    responses(
        (status = 201, description = "Admission created", body = ApiResponse<AdmissionResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
    ),
    tag = "Doctor"
)]
pub async fn admit_patient(
    State(state): State<AppState>,
    Json(request): Json<AdmitPatientRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AdmissionResponse>>), ServiceError> {
    let admission = state.services.doctor.admit_patient(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(admission))))
}

/// Clinical history for a patient
#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/history",
    summary = "Patient history",
    params(("patient_id" = String, Path, description = "External patient id")),
    responses(
        (status = 200, description = "Clinical notes, newest first", body = ApiResponse<Vec<ClinicalNoteResponse>>),
    ),
    tag = "Doctor"
)]
pub async fn patient_history(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ClinicalNoteResponse>>>, ServiceError> {
    let history = state.services.doctor.patient_history(&patient_id).await?;
    Ok(Json(ApiResponse::success(history)))
}

/// Lab orders for a patient
#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/lab-orders",
    summary = "Patient lab orders",
    params(("patient_id" = String, Path, description = "External patient id")),
    responses(
        (status = 200, description = "Lab orders, newest first", body = ApiResponse<Vec<LabOrderResponse>>),
    ),
    tag = "Doctor"
)]
pub async fn patient_lab_orders(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<LabOrderResponse>>>, ServiceError> {
    let orders = state
        .services
        .doctor
        .patient_lab_orders(&patient_id)
        .await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// Save (or re-save) consultation notes
#[utoipa::path(
    post,
    path = "/api/v1/clinical-notes",
    summary = "Save clinical notes",
    request_body = SaveClinicalNotesRequest,
    responses(
        (status = 200, description = "Notes saved", body = ApiResponse<ClinicalNoteResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
    ),
    tag = "Doctor"
)]
pub async fn save_clinical_notes(
    State(state): State<AppState>,
    Json(request): Json<SaveClinicalNotesRequest>,
) -> Result<Json<ApiResponse<ClinicalNoteResponse>>, ServiceError> {
    let saved = state.services.doctor.save_clinical_notes(request).await?;
    Ok(Json(ApiResponse::success(saved)))
}

/// Attach a ward note to an admission
#[utoipa::path(
    post,
    path = "/api/v1/medical-notes",
    summary = "Save medical note",
    request_body = SaveMedicalNoteRequest,
    responses(
        (status = 201, description = "Note recorded", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "No matching admission", body = crate::errors::ErrorResponse),
    ),
    tag = "Doctor"
)]
pub async fn save_medical_note(
    State(state): State<AppState>,
    Json(request): Json<SaveMedicalNoteRequest>,
) -> Result<(StatusCode, Json<ApiResponse<serde_json::Value>>), ServiceError> {
    let note = state.services.doctor.save_medical_note(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(serde_json::json!({
            "id": note.id,
            "admission_id": note.admission_id,
            "note_type": note.note_type,
        }))),
    ))
}

/// Order a lab test
#[utoipa::path(
    post,
    path = "/api/v1/lab-orders",
    summary = "Order lab test",
    request_body = OrderLabTestRequest,
    responses(
        (status = 201, description = "Lab order placed", body = ApiResponse<LabOrderResponse>),
        (status = 502, description = "Fulfillment service unavailable", body = crate::errors::ErrorResponse),
    ),
    tag = "Doctor"
)]
pub async fn order_lab_test(
    State(state): State<AppState>,
    Json(request): Json<OrderLabTestRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LabOrderResponse>>), ServiceError> {
    let order = state.services.doctor.order_lab_test(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

/// Update an appointment's status
#[utoipa::path(
    put,
    path = "/api/v1/appointments/{appointment_id}/status",
    summary = "Update appointment status",
    params(("appointment_id" = String, Path, description = "Public appointment id")),
    request_body = UpdateAppointmentStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Unknown status", body = crate::errors::ErrorResponse),
        (status = 404, description = "Appointment not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Doctor"
)]
pub async fn update_appointment_status(
    State(state): State<AppState>,
    Path(appointment_id): Path<String>,
    Json(request): Json<UpdateAppointmentStatusRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ServiceError> {
    state
        .services
        .doctor
        .update_appointment_status(&appointment_id, &request.status)
        .await?;
    Ok(Json(ApiResponse::success(serde_json::json!({
        "appointment_id": appointment_id,
        "status": request.status,
    }))))
}
