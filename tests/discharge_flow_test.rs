mod common;

use axum::http::{Method, StatusCode};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use medflow_api::entities::admission::{self, Entity as AdmissionEntity};

use common::{response_json, TestApp};

const FAKE_PDF: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n%%EOF";

#[tokio::test]
async fn discharge_closes_the_admission_and_returns_the_document() {
    let app = TestApp::new().await;
    app.seed_patient("PAT-2026-0001", "Rajesh Kumar").await;
    app.seed_admission("PAT-2026-0001", "ADM-TEST00000001").await;

    Mock::given(method("POST"))
        .and(path("/webhook/discharge-patient"))
        .and(body_partial_json(serde_json::json!({"patient_id": "PAT-2026-0001"})))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(FAKE_PDF))
        .mount(&app.fulfillment)
        .await;

    let response = app
        .request(Method::POST, "/api/v1/discharges/PAT-2026-0001", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let data = &body["data"];
    assert_eq!(data["patient_id"], "PAT-2026-0001");
    assert_eq!(data["admission_id"], "ADM-TEST00000001");

    let decoded = BASE64
        .decode(data["pdf_base64"].as_str().unwrap())
        .expect("valid base64 document");
    assert_eq!(decoded, FAKE_PDF);

    let saved = AdmissionEntity::find()
        .filter(admission::Column::AdmissionId.eq("ADM-TEST00000001"))
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.status, "Discharged");
    assert!(saved.discharge_date.is_some());
}

#[tokio::test]
async fn discharge_without_an_active_admission_still_returns_the_document() {
    let app = TestApp::new().await;
    app.seed_patient("PAT-2026-0002", "Meena Iyer").await;

    Mock::given(method("POST"))
        .and(path("/webhook/discharge-patient"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(FAKE_PDF))
        .mount(&app.fulfillment)
        .await;

    let response = app
        .request(Method::POST, "/api/v1/discharges/PAT-2026-0002", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert!(body["data"]["admission_id"].is_null());
    assert!(!body["data"]["pdf_base64"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn document_failure_surfaces_but_the_admission_stays_closed() {
    let app = TestApp::new().await;
    app.seed_patient("PAT-2026-0003", "Arun Nair").await;
    app.seed_admission("PAT-2026-0003", "ADM-TEST00000002").await;

    Mock::given(method("POST"))
        .and(path("/webhook/discharge-patient"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.fulfillment)
        .await;

    let response = app
        .request(Method::POST, "/api/v1/discharges/PAT-2026-0003", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    // The admission update is deliberately not rolled back.
    let saved = AdmissionEntity::find()
        .filter(admission::Column::AdmissionId.eq("ADM-TEST00000002"))
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.status, "Discharged");
}
