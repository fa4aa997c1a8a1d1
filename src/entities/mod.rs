pub mod admission;
pub mod appointment;
pub mod clinical_note;
pub mod lab_order;
pub mod medical_note;
pub mod medicine_batch;
pub mod medicine_master;
pub mod patient;
pub mod pharmacy_order;
pub mod pharmacy_order_item;
pub mod user;

use strum::{Display, EnumString};

/// Lifecycle of an outpatient appointment as driven by the front desk and
/// the doctor console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum AppointmentStatus {
    Pending,
    Scheduled,
    #[strum(serialize = "Checked In")]
    CheckedIn,
    #[strum(serialize = "In Progress")]
    InProgress,
    Admitted,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum AdmissionStatus {
    Admitted,
    Discharged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum LabOrderStatus {
    Pending,
    Processing,
    Completed,
}

/// Pending until the fulfillment service has reported, Processed once the
/// settlement has been written, Completed when the operator marks it paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum PharmacyOrderStatus {
    Pending,
    Processed,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum OrderItemStatus {
    Pending,
    Dispensed,
    #[strum(serialize = "Out of Stock")]
    OutOfStock,
}

#[cfg(test)]
mod status_tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn spaced_variants_round_trip() {
        assert_eq!(OrderItemStatus::OutOfStock.to_string(), "Out of Stock");
        assert_eq!(
            OrderItemStatus::from_str("Out of Stock").unwrap(),
            OrderItemStatus::OutOfStock
        );
        assert_eq!(AppointmentStatus::CheckedIn.to_string(), "Checked In");
        assert_eq!(
            AppointmentStatus::from_str("In Progress").unwrap(),
            AppointmentStatus::InProgress
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(OrderItemStatus::from_str("Backordered").is_err());
    }
}
