use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};

use crate::services::discharge::DischargeResponse;
use crate::{errors::ServiceError, ApiResponse, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/discharges/:patient_id", post(discharge_patient))
}

/// Discharge a patient and fetch the rendered summary document
#[utoipa::path(
    post,
    path = "/api/v1/discharges/{patient_id}",
    summary = "Discharge patient",
    params(("patient_id" = String, Path, description = "External patient id")),
    responses(
        (status = 200, description = "Admission closed; document returned base64-encoded", body = ApiResponse<DischargeResponse>),
        (status = 502, description = "Document service unavailable", body = crate::errors::ErrorResponse),
    ),
    tag = "Discharge"
)]
pub async fn discharge_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<ApiResponse<DischargeResponse>>, ServiceError> {
    let discharge = state
        .services
        .discharge
        .discharge_patient(&patient_id)
        .await?;
    Ok(Json(ApiResponse::success(discharge)))
}
