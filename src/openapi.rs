use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MedFlow API",
        version = "0.3.0",
        description = r#"
# MedFlow Hospital Operations API

Backend for the hospital dashboards: reception registration, doctor
console, lab worklist, pharmacy billing and discharge administration.

Domain decisions (technician assignment, barcode generation, dispensing,
document rendering) are delegated to an external workflow-automation
service; this API owns the relational state and reconciles the service's
reports back into it.

## Error Handling

Failing endpoints return a consistent error body:

```json
{
  "error": "Bad Gateway",
  "message": "Fulfillment service error: fulfillment service returned status 503",
  "timestamp": "2026-03-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Registration", description = "Front-desk patient registration"),
        (name = "Doctor", description = "Consultation queue, admissions, notes and lab ordering"),
        (name = "Lab", description = "Technician worklist and result capture"),
        (name = "Pharmacy", description = "Inventory, dispensing, settlement and billing"),
        (name = "Discharge", description = "Discharge workflow")
    ),
    paths(
        crate::handlers::registration::register_patient,
        crate::handlers::doctor::patient_queue,
        crate::handlers::doctor::admit_patient,
        crate::handlers::doctor::patient_history,
        crate::handlers::doctor::patient_lab_orders,
        crate::handlers::doctor::save_clinical_notes,
        crate::handlers::doctor::save_medical_note,
        crate::handlers::doctor::order_lab_test,
        crate::handlers::doctor::update_appointment_status,
        crate::handlers::lab::worklist,
        crate::handlers::lab::stats,
        crate::handlers::lab::upload_result,
        crate::handlers::pharmacy::inventory,
        crate::handlers::pharmacy::add_batch,
        crate::handlers::pharmacy::medicine_list,
        crate::handlers::pharmacy::queue,
        crate::handlers::pharmacy::create_order,
        crate::handlers::pharmacy::mark_order_paid,
        crate::handlers::pharmacy::generate_invoice,
        crate::handlers::discharge::discharge_patient,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,
            crate::errors::ErrorResponse,
            crate::services::registration::RegisterPatientRequest,
            crate::services::registration::RegisterPatientResponse,
            crate::services::doctor::QueuePatient,
            crate::services::doctor::AdmitPatientRequest,
            crate::services::doctor::AdmissionResponse,
            crate::services::doctor::ClinicalNoteResponse,
            crate::services::doctor::SaveClinicalNotesRequest,
            crate::services::doctor::SaveMedicalNoteRequest,
            crate::services::doctor::OrderLabTestRequest,
            crate::services::doctor::UpdateAppointmentStatusRequest,
            crate::services::lab::WorklistEntry,
            crate::services::lab::LabStats,
            crate::services::lab::LabOrderResponse,
            crate::services::lab::UploadResultRequest,
            crate::services::pharmacy::CreatePharmacyOrderRequest,
            crate::services::pharmacy::PrescriptionLine,
            crate::services::pharmacy::CreateOrderOutcome,
            crate::services::pharmacy::FulfillmentStatus,
            crate::services::pharmacy::PharmacyOrderResponse,
            crate::services::pharmacy::PharmacyOrderItemResponse,
            crate::services::pharmacy::QueueEntry,
            crate::services::pharmacy::PatientSummary,
            crate::services::pharmacy::MedicineResponse,
            crate::services::pharmacy::InventoryBatchResponse,
            crate::services::pharmacy::AddBatchRequest,
            crate::services::pharmacy::GenerateInvoiceRequest,
            crate::services::pharmacy::InvoiceLineRequest,
            crate::services::pharmacy::InvoiceLine,
            crate::services::pharmacy::InvoiceResponse,
            crate::services::discharge::DischargeResponse,
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
