pub mod discharge;
pub mod doctor;
pub mod lab;
pub mod pharmacy;
pub mod registration;

use std::sync::Arc;

use crate::db::DbPool;
use crate::fulfillment::FulfillmentClient;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub registration: Arc<crate::services::registration::RegistrationService>,
    pub doctor: Arc<crate::services::doctor::DoctorService>,
    pub lab: Arc<crate::services::lab::LabService>,
    pub pharmacy: Arc<crate::services::pharmacy::PharmacyService>,
    pub discharge: Arc<crate::services::discharge::DischargeService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, fulfillment: Arc<FulfillmentClient>) -> Self {
        let registration = Arc::new(crate::services::registration::RegistrationService::new(
            db_pool.clone(),
            fulfillment.clone(),
        ));
        let doctor = Arc::new(crate::services::doctor::DoctorService::new(
            db_pool.clone(),
            fulfillment.clone(),
        ));
        let lab = Arc::new(crate::services::lab::LabService::new(
            db_pool.clone(),
            fulfillment.clone(),
        ));
        let pharmacy = Arc::new(crate::services::pharmacy::PharmacyService::new(
            db_pool.clone(),
            fulfillment.clone(),
        ));
        let discharge = Arc::new(crate::services::discharge::DischargeService::new(
            db_pool,
            fulfillment,
        ));

        Self {
            registration,
            doctor,
            lab,
            pharmacy,
            discharge,
        }
    }
}
