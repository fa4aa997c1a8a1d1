use std::time::Duration;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, instrument, warn};

use crate::errors::ServiceError;
use crate::fulfillment::response::{DispenseReport, LabOrderReply, RegistrationReply};

// One webhook per workflow; all hang off the configured base URL.
const REGISTRATION_PATH: &str = "webhook/hospital-reg";
const EHR_NOTE_PATH: &str = "webhook/doctor-visit";
const LAB_ORDER_PATH: &str = "webhook/create-lab-order";
const LAB_RESULT_PATH: &str = "webhook/submit-lab-result";
const DISPENSE_PATH: &str = "webhook/dispense-medicine";
const INVOICE_PATH: &str = "webhook/generate-invoice";
const DISCHARGE_PATH: &str = "webhook/discharge-patient";

/// One prescription line as sent to the dispense workflow.
#[derive(Debug, Clone, Serialize)]
pub struct RequestedMedicine {
    pub name: String,
    pub qty: i32,
}

/// HTTP client for the workflow-automation service. One reqwest client,
/// shared; a flat request timeout and no retries (failures surface to the
/// caller or, for notifications, to the log).
#[derive(Clone)]
pub struct FulfillmentClient {
    client: reqwest::Client,
    base_url: String,
}

impl FulfillmentClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// POST a JSON body and check for a 2xx reply. Transport errors and
    /// non-success statuses both surface as `ExternalServiceError`.
    async fn post_json(&self, path: &str, body: &Value) -> Result<reqwest::Response, ServiceError> {
        let url = self.endpoint(path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(url = %url, error = %e, "fulfillment call failed to send");
                ServiceError::ExternalServiceError(format!(
                    "fulfillment service unreachable: {}",
                    e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            error!(url = %url, status = %status, body = %body_text, "fulfillment call rejected");
            return Err(ServiceError::ExternalServiceError(format!(
                "fulfillment service returned status {}",
                status
            )));
        }

        Ok(response)
    }

    async fn body_text(response: reqwest::Response) -> Result<String, ServiceError> {
        response.text().await.map_err(|e| {
            ServiceError::ExternalServiceError(format!(
                "failed reading fulfillment response body: {}",
                e
            ))
        })
    }

    /// Submit a registration form. The reply carries the official patient
    /// and appointment ids; local rows are only created once both exist.
    #[instrument(skip(self, form))]
    pub async fn submit_registration(&self, form: &Value) -> Result<RegistrationReply, ServiceError> {
        let response = self.post_json(REGISTRATION_PATH, form).await?;
        let body = Self::body_text(response).await?;
        RegistrationReply::from_body(&body)
    }

    /// Place a lab order; the service checks availability, assigns a
    /// technician and generates the barcode.
    #[instrument(skip(self))]
    pub async fn create_lab_order(
        &self,
        patient_id: &str,
        doctor_id: &str,
        test_type: &str,
    ) -> Result<LabOrderReply, ServiceError> {
        let body = json!({
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "test_type": test_type,
        });
        let response = self.post_json(LAB_ORDER_PATH, &body).await?;
        let body = Self::body_text(response).await?;
        LabOrderReply::from_body(&body)
    }

    /// Ask the service to dispense a prescription. Returns the raw report,
    /// normalized; settlement happens in the pharmacy service.
    #[instrument(skip(self, medicines), fields(patient_id = %patient_id, lines = medicines.len()))]
    pub async fn dispense_medicines(
        &self,
        patient_id: &str,
        medicines: &[RequestedMedicine],
    ) -> Result<DispenseReport, ServiceError> {
        let body = json!({
            "patient_id": patient_id,
            "medicines": medicines,
        });
        let response = self.post_json(DISPENSE_PATH, &body).await?;
        let body = Self::body_text(response).await?;
        info!(bytes = body.len(), "dispense report received");
        DispenseReport::from_body(&body)
    }

    /// Fetch the rendered discharge document as raw bytes.
    #[instrument(skip(self))]
    pub async fn discharge_document(&self, patient_id: &str) -> Result<Vec<u8>, ServiceError> {
        let body = json!({ "patient_id": patient_id });
        let response = self.post_json(DISCHARGE_PATH, &body).await?;

        let bytes = response.bytes().await.map_err(|e| {
            ServiceError::ExternalServiceError(format!(
                "failed reading discharge document stream: {}",
                e
            ))
        })?;

        Ok(bytes.to_vec())
    }

    /// Notify the service of an uploaded lab result (AI analysis + report
    /// rendering happen externally). Fire-and-forget.
    pub fn notify_lab_result(&self, barcode: String, result_value: String, remarks: Option<String>) {
        let body = json!({
            "barcode": barcode,
            "result_value": result_value,
            "remarks": remarks,
        });
        self.notify(LAB_RESULT_PATH, body);
    }

    /// Forward a saved clinical note to the EHR workflow. Fire-and-forget.
    pub fn notify_clinical_note(&self, payload: Value) {
        self.notify(EHR_NOTE_PATH, payload);
    }

    /// Send a computed bill to the invoice-rendering workflow.
    /// Fire-and-forget.
    pub fn notify_invoice(&self, payload: Value) {
        self.notify(INVOICE_PATH, payload);
    }

    /// Deliver a notification without blocking the caller; delivery
    /// failures are logged and dropped.
    fn notify(&self, path: &'static str, body: Value) {
        let client = self.clone();

        tokio::spawn(async move {
            match client.post_json(path, &body).await {
                Ok(_) => info!(path, "fulfillment notification delivered"),
                Err(e) => warn!(path, error = %e, "fulfillment notification failed"),
            }
        });
    }
}
