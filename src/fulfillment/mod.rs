//! Client and boundary decoders for the external workflow-automation
//! ("fulfillment") service. Every outbound call and every loose response
//! shape is normalized here, before any business logic sees it.

pub mod client;
pub mod response;

pub use client::{FulfillmentClient, RequestedMedicine};
pub use response::{BillSummary, DispenseReport, FulfilledLine, LabOrderReply, RegistrationReply};
