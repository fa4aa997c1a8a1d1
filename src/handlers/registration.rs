use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use validator::Validate;

use crate::services::registration::{RegisterPatientRequest, RegisterPatientResponse};
use crate::{errors::ServiceError, ApiResponse, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/patients/register", post(register_patient))
}

/// Register a new outpatient and open their first appointment
#[utoipa::path(
    post,
    path = "/api/v1/patients/register",
    summary = "Register patient",
    request_body = RegisterPatientRequest,
    responses(
        (status = 201, description = "Patient registered", body = ApiResponse<RegisterPatientResponse>),
        (status = 400, description = "Invalid registration form", body = crate::errors::ErrorResponse),
        (status = 502, description = "Fulfillment service unavailable", body = crate::errors::ErrorResponse),
    ),
    tag = "Registration"
)]
pub async fn register_patient(
    State(state): State<AppState>,
    Json(request): Json<RegisterPatientRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterPatientResponse>>), ServiceError> {
    if let Err(validation_errors) = request.validate() {
        let errors: Vec<String> = validation_errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                let field = field.clone();
                errors.iter().map(move |error| {
                    format!(
                        "{}: {}",
                        field,
                        error.message.as_ref().unwrap_or(&"Invalid value".into())
                    )
                })
            })
            .collect();
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::validation_errors(errors)),
        ));
    }

    let registered = state.services.registration.register_patient(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(registered))))
}
