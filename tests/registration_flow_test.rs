mod common;

use axum::http::{Method, StatusCode};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use medflow_api::entities::{
    appointment::{self, Entity as AppointmentEntity},
    patient::{self, Entity as PatientEntity},
};

use common::{response_json, TestApp};

fn registration_form() -> serde_json::Value {
    json!({
        "full_name": "Rajesh Kumar",
        "phone": "9876543210",
        "age": "42",
        "gender": "Male",
        "department": "General Medicine",
        "email": "rajesh@example.com",
        "address": "12 MG Road, Pune",
        "aadhar": "1234-5678-9012"
    })
}

#[tokio::test]
async fn registers_patient_once_ids_are_confirmed() {
    let app = TestApp::new().await;

    Mock::given(method("POST"))
        .and(path("/webhook/hospital-reg"))
        .and(body_partial_json(json!({"full_name": "Rajesh Kumar"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "patient_id": "PAT-2026-0001",
            "appointment_id": "APP-1001"
        })))
        .mount(&app.fulfillment)
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/patients/register",
            Some(registration_form()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert!(body["success"].as_bool().unwrap());
    assert_eq!(body["data"]["patient_id"], "PAT-2026-0001");
    assert_eq!(body["data"]["appointment_id"], "APP-1001");

    let saved_patient = PatientEntity::find()
        .filter(patient::Column::PatientId.eq("PAT-2026-0001"))
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved_patient.full_name, "Rajesh Kumar");
    assert_eq!(saved_patient.department, "General Medicine");

    let saved_appointment = AppointmentEntity::find()
        .filter(appointment::Column::AppointmentId.eq("APP-1001"))
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved_appointment.patient_id, "PAT-2026-0001");
    assert_eq!(saved_appointment.status, "Pending");
    assert_eq!(
        saved_appointment.reason_for_visit.as_deref(),
        Some("Initial Consultation")
    );
}

#[tokio::test]
async fn repeated_registration_does_not_duplicate_rows() {
    let app = TestApp::new().await;

    Mock::given(method("POST"))
        .and(path("/webhook/hospital-reg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "digital_id": "PAT-2026-0002",
            "appointment_id": "APP-1002"
        })))
        .mount(&app.fulfillment)
        .await;

    for _ in 0..2 {
        let response = app
            .request(
                Method::POST,
                "/api/v1/patients/register",
                Some(registration_form()),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let patients = PatientEntity::find()
        .filter(patient::Column::PatientId.eq("PAT-2026-0002"))
        .count(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(patients, 1);

    let appointments = AppointmentEntity::find()
        .filter(appointment::Column::AppointmentId.eq("APP-1002"))
        .count(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(appointments, 1);
}

#[tokio::test]
async fn webhook_failure_writes_nothing_locally() {
    let app = TestApp::new().await;

    Mock::given(method("POST"))
        .and(path("/webhook/hospital-reg"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.fulfillment)
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/patients/register",
            Some(registration_form()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let patients = PatientEntity::find().count(&*app.state.db).await.unwrap();
    assert_eq!(patients, 0);
    let appointments = AppointmentEntity::find()
        .count(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(appointments, 0);
}

#[tokio::test]
async fn reply_without_an_appointment_id_fails_the_operation() {
    let app = TestApp::new().await;

    Mock::given(method("POST"))
        .and(path("/webhook/hospital-reg"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"patient_id": "PAT-2026-0003"})),
        )
        .mount(&app.fulfillment)
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/patients/register",
            Some(registration_form()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = response_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("appointment"));

    let patients = PatientEntity::find().count(&*app.state.db).await.unwrap();
    assert_eq!(patients, 0);
}

#[tokio::test]
async fn blank_form_is_rejected_before_the_webhook() {
    let app = TestApp::new().await;
    // No mock mounted: a webhook call here would fail the test via the
    // connection error surfacing as 502 instead of 400.

    let response = app
        .request(
            Method::POST,
            "/api/v1/patients/register",
            Some(json!({"full_name": "", "phone": "", "department": ""})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["success"], false);
    assert!(!body["errors"].as_array().unwrap().is_empty());
}
