use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{Method, Request, Response},
    Router,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::MockServer;

use medflow_api::{
    config::AppConfig,
    db,
    entities::{admission, medicine_batch, medicine_master, patient, AdmissionStatus},
    fulfillment::FulfillmentClient,
    handlers::AppServices,
    AppState,
};

/// Helper harness: application state backed by a throwaway SQLite file and
/// a wiremock stand-in for the fulfillment service.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub fulfillment: MockServer,
    _db_dir: TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let fulfillment = MockServer::start().await;

        let db_dir = tempfile::tempdir().expect("create temp dir");
        let db_path = db_dir.path().join("medflow_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.fulfillment_base_url = fulfillment.uri();

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("connect to test database");
        db::run_migrations(&pool).await.expect("run migrations");

        let db_arc = Arc::new(pool);
        let client = Arc::new(FulfillmentClient::new(
            cfg.fulfillment_base_url.clone(),
            Duration::from_secs(2),
        ));
        let services = AppServices::new(db_arc.clone(), client);
        let state = AppState {
            db: db_arc,
            config: cfg,
            services,
        };

        let router = Router::new()
            .nest("/api/v1", medflow_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            fulfillment,
            _db_dir: db_dir,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Response<Body> {
        let builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("build request"),
            None => builder.body(Body::empty()).expect("build request"),
        };

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("dispatch request")
    }

    #[allow(dead_code)]
    pub async fn seed_medicine(
        &self,
        brand: &str,
        generic: &str,
        price: Decimal,
    ) -> medicine_master::Model {
        medicine_master::ActiveModel {
            brand_name: Set(brand.to_string()),
            generic_name: Set(generic.to_string()),
            price_per_unit: Set(price),
            min_threshold: Set(0),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed medicine")
    }

    #[allow(dead_code)]
    pub async fn seed_batch(
        &self,
        medicine_id: i32,
        batch_no: &str,
        stock: i32,
    ) -> medicine_batch::Model {
        medicine_batch::ActiveModel {
            medicine_id: Set(medicine_id),
            batch_no: Set(batch_no.to_string()),
            current_stock: Set(stock),
            expiry_date: Set(NaiveDate::from_ymd_opt(2027, 6, 30).expect("valid date")),
            rack_location: Set(Some("A-01".to_string())),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed batch")
    }

    #[allow(dead_code)]
    pub async fn seed_patient(&self, patient_id: &str, full_name: &str) -> patient::Model {
        patient::ActiveModel {
            patient_id: Set(patient_id.to_string()),
            full_name: Set(full_name.to_string()),
            phone: Set("9876543210".to_string()),
            age: Set(Some("42".to_string())),
            gender: Set(None),
            department: Set("General Medicine".to_string()),
            email: Set(None),
            address: Set(None),
            aadhar_card: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed patient")
    }

    #[allow(dead_code)]
    pub async fn seed_admission(&self, patient_id: &str, admission_id: &str) -> admission::Model {
        admission::ActiveModel {
            admission_id: Set(admission_id.to_string()),
            patient_id: Set(patient_id.to_string()),
            doctor_name: Set("Dr. Sarah Smith".to_string()),
            diagnosis: Set(Some("Observation".to_string())),
            status: Set(AdmissionStatus::Admitted.to_string()),
            admission_date: Set(Utc::now()),
            discharge_date: Set(None),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed admission")
    }
}

pub async fn response_json(response: Response<Body>) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("parse response body")
}

/// Decimals serialize as strings; tolerate numbers too and compare by value.
#[allow(dead_code)]
pub fn decimal_value(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().expect("parse decimal string"),
        Value::Number(n) => n.to_string().parse().expect("parse decimal number"),
        other => panic!("expected a decimal value, got {other:?}"),
    }
}
