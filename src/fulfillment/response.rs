use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::ServiceError;

/// How much of a raw body is quoted back in decode diagnostics.
const EXCERPT_LEN: usize = 100;

/// Truncated excerpt of a raw response body, for error messages.
pub(crate) fn excerpt(body: &str) -> String {
    if body.chars().count() <= EXCERPT_LEN {
        body.to_string()
    } else {
        let cut: String = body.chars().take(EXCERPT_LEN).collect();
        format!("{}...", cut)
    }
}

/// Reply to a patient-registration submission. The service is not strict
/// about the key carrying the patient id, so all observed spellings are
/// accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationReply {
    pub patient_id: String,
    pub appointment_id: String,
}

impl RegistrationReply {
    pub fn from_body(body: &str) -> Result<Self, ServiceError> {
        let value: Value = serde_json::from_str(body).map_err(|_| {
            ServiceError::ResponseShapeError(format!(
                "registration reply is not valid JSON: \"{}\"",
                excerpt(body)
            ))
        })?;

        let patient_id = ["patient_id", "id", "digital_id"]
            .iter()
            .find_map(|key| id_string(value.get(*key)));
        let appointment_id = id_string(value.get("appointment_id"));

        match (patient_id, appointment_id) {
            (Some(patient_id), Some(appointment_id)) => Ok(Self {
                patient_id,
                appointment_id,
            }),
            _ => Err(ServiceError::ResponseShapeError(format!(
                "registration reply is missing a patient or appointment id: \"{}\"",
                excerpt(body)
            ))),
        }
    }
}

/// Reply to a lab-order submission. Keys arrive in either spelling.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LabOrderReply {
    #[serde(alias = "Barcode")]
    pub barcode: String,
    #[serde(alias = "Technician")]
    pub technician: Option<String>,
    #[serde(alias = "Order_Status", alias = "order_status")]
    pub status: Option<String>,
}

impl LabOrderReply {
    pub fn from_body(body: &str) -> Result<Self, ServiceError> {
        serde_json::from_str(body).map_err(|_| {
            ServiceError::ResponseShapeError(format!(
                "lab order reply did not decode: \"{}\"",
                excerpt(body)
            ))
        })
    }
}

/// Aggregate billing figures reported alongside a dispense run. These are
/// informational; settlement recomputes the authoritative totals locally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillSummary {
    pub total_amount_to_collect: Option<Decimal>,
    pub items_dispensed: Option<i32>,
    pub items_missing: Option<i32>,
}

/// One fulfilled (or refused) medicine line as reported externally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FulfilledLine {
    pub medicine: String,
    pub price: Option<Decimal>,
    pub batch: Option<String>,
}

/// Normalized dispense report. The wire shape is not strictly contracted:
/// the report may arrive wrapped in a one-element array, and each medicine
/// list may be a flat array or nested one level under a same-named key.
/// All of that is flattened here, exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispenseReport {
    pub bill_summary: BillSummary,
    pub dispensed: Vec<FulfilledLine>,
    pub unavailable: Vec<FulfilledLine>,
}

impl DispenseReport {
    pub fn from_body(body: &str) -> Result<Self, ServiceError> {
        let parsed: Value = serde_json::from_str(body).map_err(|_| {
            ServiceError::ResponseShapeError(format!(
                "fulfillment service returned invalid JSON: \"{}\"",
                excerpt(body)
            ))
        })?;

        // Some workflows answer `[{...}]` instead of `{...}`.
        let root = match &parsed {
            Value::Array(elements) => elements.first().ok_or_else(|| {
                ServiceError::ResponseShapeError(format!(
                    "fulfillment service returned an empty array: \"{}\"",
                    excerpt(body)
                ))
            })?,
            other => other,
        };

        let root = root.as_object().ok_or_else(|| {
            ServiceError::ResponseShapeError(format!(
                "dispense report is not a JSON object: \"{}\"",
                excerpt(body)
            ))
        })?;

        let bill_summary = root
            .get("bill_summary")
            .map(|bill| BillSummary {
                total_amount_to_collect: decimal_field(bill.get("total_amount_to_collect")),
                items_dispensed: int_field(bill.get("items_dispensed")),
                items_missing: int_field(bill.get("items_missing")),
            })
            .unwrap_or_default();

        Ok(Self {
            bill_summary,
            dispensed: medicine_list(root.get("dispensed_medicines"), "dispensed_medicines"),
            unavailable: medicine_list(root.get("unavailable_medicines"), "unavailable_medicines"),
        })
    }
}

/// Flattens a medicine list that is either `[...]` or `{key: [...]}`.
fn medicine_list(value: Option<&Value>, key: &str) -> Vec<FulfilledLine> {
    let entries = match value {
        Some(Value::Array(entries)) => entries.as_slice(),
        Some(Value::Object(map)) => match map.get(key) {
            Some(Value::Array(entries)) => entries.as_slice(),
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    entries
        .iter()
        .filter_map(|entry| {
            let medicine = entry.get("medicine")?.as_str()?.to_string();
            Some(FulfilledLine {
                medicine,
                price: decimal_field(entry.get("price")),
                batch: entry
                    .get("batch")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
        .collect()
}

/// Prices arrive as JSON numbers or strings depending on the workflow.
fn decimal_field(value: Option<&Value>) -> Option<Decimal> {
    match value? {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn int_field(value: Option<&Value>) -> Option<i32> {
    match value? {
        Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
