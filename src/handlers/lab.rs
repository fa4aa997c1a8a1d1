use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::services::lab::{
    LabOrderResponse, LabStats, UploadResultRequest, WorklistEntry, WorklistFilter,
};
use crate::{errors::ServiceError, ApiResponse, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/lab/worklist", get(worklist))
        .route("/lab/stats", get(stats))
        .route("/lab/orders/:barcode/result", post(upload_result))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct WorklistQuery {
    #[serde(default)]
    pub status: WorklistFilter,
}

/// Technician worklist
#[utoipa::path(
    get,
    path = "/api/v1/lab/worklist",
    summary = "Lab worklist",
    params(("status" = Option<String>, Query, description = "Pending (default), Completed or All")),
    responses(
        (status = 200, description = "Lab orders for the technician screen", body = ApiResponse<Vec<WorklistEntry>>),
    ),
    tag = "Lab"
)]
pub async fn worklist(
    State(state): State<AppState>,
    Query(query): Query<WorklistQuery>,
) -> Result<Json<ApiResponse<Vec<WorklistEntry>>>, ServiceError> {
    let entries = state.services.lab.worklist(query.status).await?;
    Ok(Json(ApiResponse::success(entries)))
}

/// Lab dashboard counters
#[utoipa::path(
    get,
    path = "/api/v1/lab/stats",
    summary = "Lab stats",
    responses(
        (status = 200, description = "Open orders and completions today", body = ApiResponse<LabStats>),
    ),
    tag = "Lab"
)]
pub async fn stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<LabStats>>, ServiceError> {
    let stats = state.services.lab.stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// Upload a result for a barcode
#[utoipa::path(
    post,
    path = "/api/v1/lab/orders/{barcode}/result",
    summary = "Upload lab result",
    params(("barcode" = String, Path, description = "Order barcode")),
    request_body = UploadResultRequest,
    responses(
        (status = 200, description = "Result recorded", body = ApiResponse<LabOrderResponse>),
        (status = 404, description = "Unknown barcode", body = crate::errors::ErrorResponse),
    ),
    tag = "Lab"
)]
pub async fn upload_result(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
    Json(request): Json<UploadResultRequest>,
) -> Result<Json<ApiResponse<LabOrderResponse>>, ServiceError> {
    let updated = state.services.lab.upload_result(&barcode, request).await?;
    Ok(Json(ApiResponse::success(updated)))
}
