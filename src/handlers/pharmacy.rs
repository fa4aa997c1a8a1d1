use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::services::pharmacy::{
    AddBatchRequest, CreateOrderOutcome, CreatePharmacyOrderRequest, GenerateInvoiceRequest,
    InventoryBatchResponse, InvoiceResponse, MedicineResponse, PharmacyOrderResponse, QueueEntry,
};
use crate::{errors::ServiceError, ApiResponse, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pharmacy/inventory", get(inventory))
        .route("/pharmacy/inventory/batches", post(add_batch))
        .route("/pharmacy/medicines", get(medicine_list))
        .route("/pharmacy/queue", get(queue))
        .route("/pharmacy/orders", post(create_order))
        .route("/pharmacy/orders/:id/paid", post(mark_order_paid))
        .route("/pharmacy/invoices", post(generate_invoice))
}

/// Sellable stock, soonest expiry first
#[utoipa::path(
    get,
    path = "/api/v1/pharmacy/inventory",
    summary = "Pharmacy inventory",
    responses(
        (status = 200, description = "Batches with stock remaining", body = ApiResponse<Vec<InventoryBatchResponse>>),
    ),
    tag = "Pharmacy"
)]
pub async fn inventory(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<InventoryBatchResponse>>>, ServiceError> {
    let batches = state.services.pharmacy.inventory().await?;
    Ok(Json(ApiResponse::success(batches)))
}

/// Register a stock batch (optionally creating the master row)
#[utoipa::path(
    post,
    path = "/api/v1/pharmacy/inventory/batches",
    summary = "Add inventory batch",
    request_body = AddBatchRequest,
    responses(
        (status = 201, description = "Batch registered", body = ApiResponse<InventoryBatchResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
    ),
    tag = "Pharmacy"
)]
pub async fn add_batch(
    State(state): State<AppState>,
    Json(request): Json<AddBatchRequest>,
) -> Result<(StatusCode, Json<ApiResponse<InventoryBatchResponse>>), ServiceError> {
    let batch = state.services.pharmacy.add_batch(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(batch))))
}

/// The medicine master price list
#[utoipa::path(
    get,
    path = "/api/v1/pharmacy/medicines",
    summary = "Medicine list",
    responses(
        (status = 200, description = "Master price list, alphabetical", body = ApiResponse<Vec<MedicineResponse>>),
    ),
    tag = "Pharmacy"
)]
pub async fn medicine_list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<MedicineResponse>>>, ServiceError> {
    let medicines = state.services.pharmacy.medicine_list().await?;
    Ok(Json(ApiResponse::success(medicines)))
}

/// Billing queue (Pending and Processed orders)
#[utoipa::path(
    get,
    path = "/api/v1/pharmacy/queue",
    summary = "Pharmacy queue",
    responses(
        (status = 200, description = "Open orders with items and patient details", body = ApiResponse<Vec<QueueEntry>>),
    ),
    tag = "Pharmacy"
)]
pub async fn queue(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<QueueEntry>>>, ServiceError> {
    let entries = state.services.pharmacy.queue().await?;
    Ok(Json(ApiResponse::success(entries)))
}

/// Create a pharmacy order and settle it against the dispense report
#[utoipa::path(
    post,
    path = "/api/v1/pharmacy/orders",
    summary = "Create pharmacy order",
    request_body = CreatePharmacyOrderRequest,
    responses(
        (status = 201, description = "Order settled (or recorded pending when the fulfillment service is down)", body = ApiResponse<CreateOrderOutcome>),
        (status = 400, description = "Invalid prescription", body = crate::errors::ErrorResponse),
        (status = 502, description = "Fulfillment reply was undecodable; order left pending", body = crate::errors::ErrorResponse),
    ),
    tag = "Pharmacy"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreatePharmacyOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreateOrderOutcome>>), ServiceError> {
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

    let outcome = state.services.pharmacy.create_order(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(outcome))))
}

/// Mark a processed order as paid
#[utoipa::path(
    post,
    path = "/api/v1/pharmacy/orders/{id}/paid",
    summary = "Mark order paid",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order completed", body = ApiResponse<PharmacyOrderResponse>),
        (status = 400, description = "Order not yet processed", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order already completed", body = crate::errors::ErrorResponse),
    ),
    tag = "Pharmacy"
)]
pub async fn mark_order_paid(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<PharmacyOrderResponse>>, ServiceError> {
    let order = state.services.pharmacy.mark_order_paid(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Bill a walk-in sale and trigger invoice rendering
#[utoipa::path(
    post,
    path = "/api/v1/pharmacy/invoices",
    summary = "Generate invoice",
    request_body = GenerateInvoiceRequest,
    responses(
        (status = 200, description = "Stock deducted and bill computed", body = ApiResponse<InvoiceResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
    ),
    tag = "Pharmacy"
)]
pub async fn generate_invoice(
    State(state): State<AppState>,
    Json(request): Json<GenerateInvoiceRequest>,
) -> Result<Json<ApiResponse<InvoiceResponse>>, ServiceError> {
    let invoice = state.services.pharmacy.generate_invoice(request).await?;
    Ok(Json(ApiResponse::success(invoice)))
}
