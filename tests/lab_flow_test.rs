mod common;

use axum::http::{Method, StatusCode};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use medflow_api::entities::lab_order::{self, Entity as LabOrderEntity};

use common::{response_json, TestApp};

#[tokio::test]
async fn lab_order_round_trip_from_doctor_to_result() {
    let app = TestApp::new().await;
    app.seed_patient("PAT-2026-0001", "Rajesh Kumar").await;

    Mock::given(method("POST"))
        .and(path("/webhook/create-lab-order"))
        .and(body_partial_json(json!({"test_type": "CBC"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Barcode": "LAB-2026-0001",
            "Technician": "Amit Lab Tech",
            "Order_Status": "Pending"
        })))
        .mount(&app.fulfillment)
        .await;
    Mock::given(method("POST"))
        .and(path("/webhook/submit-lab-result"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.fulfillment)
        .await;

    // Doctor places the order; barcode and technician come from the reply.
    let placed = app
        .request(
            Method::POST,
            "/api/v1/lab-orders",
            Some(json!({
                "patient_id": "PAT-2026-0001",
                "doctor_id": "doc1",
                "test_type": "CBC"
            })),
        )
        .await;
    assert_eq!(placed.status(), StatusCode::CREATED);

    let placed_body = response_json(placed).await;
    assert_eq!(placed_body["data"]["barcode"], "LAB-2026-0001");
    assert_eq!(placed_body["data"]["technician"], "Amit Lab Tech");
    assert_eq!(placed_body["data"]["status"], "Pending");

    // It shows on the pending worklist with the patient's name.
    let worklist = app.request(Method::GET, "/api/v1/lab/worklist", None).await;
    let worklist_body = response_json(worklist).await;
    let entries = worklist_body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["order_id"], "LAB-2026-0001");
    assert_eq!(entries[0]["patient_name"], "Rajesh Kumar");

    let stats = app.request(Method::GET, "/api/v1/lab/stats", None).await;
    let stats_body = response_json(stats).await;
    assert_eq!(stats_body["data"]["pending_count"], 1);
    assert_eq!(stats_body["data"]["completed_today"], 0);

    // Technician uploads the result.
    let uploaded = app
        .request(
            Method::POST,
            "/api/v1/lab/orders/LAB-2026-0001/result",
            Some(json!({
                "result_value": "WBC 7.2, RBC 4.8",
                "remarks": "Within normal limits"
            })),
        )
        .await;
    assert_eq!(uploaded.status(), StatusCode::OK);

    let uploaded_body = response_json(uploaded).await;
    assert_eq!(uploaded_body["data"]["status"], "Completed");
    assert_eq!(uploaded_body["data"]["result_value"], "WBC 7.2, RBC 4.8");

    // The order moves from the pending list to the completed one.
    let pending = app.request(Method::GET, "/api/v1/lab/worklist", None).await;
    assert!(response_json(pending).await["data"]
        .as_array()
        .unwrap()
        .is_empty());

    let completed = app
        .request(Method::GET, "/api/v1/lab/worklist?status=Completed", None)
        .await;
    let completed_body = response_json(completed).await;
    assert_eq!(completed_body["data"].as_array().unwrap().len(), 1);

    let stats = app.request(Method::GET, "/api/v1/lab/stats", None).await;
    let stats_body = response_json(stats).await;
    assert_eq!(stats_body["data"]["pending_count"], 0);
    assert_eq!(stats_body["data"]["completed_today"], 1);

    // And the patient's order history reflects it.
    let history = app
        .request(
            Method::GET,
            "/api/v1/patients/PAT-2026-0001/lab-orders",
            None,
        )
        .await;
    let history_body = response_json(history).await;
    assert_eq!(history_body["data"].as_array().unwrap().len(), 1);

    let saved = LabOrderEntity::find()
        .filter(lab_order::Column::Barcode.eq("LAB-2026-0001"))
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.status, "Completed");
    assert_eq!(
        saved.technician_remarks.as_deref(),
        Some("Within normal limits")
    );
}

#[tokio::test]
async fn lab_order_is_not_created_when_the_webhook_fails() {
    let app = TestApp::new().await;

    Mock::given(method("POST"))
        .and(path("/webhook/create-lab-order"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&app.fulfillment)
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/lab-orders",
            Some(json!({
                "patient_id": "PAT-2026-0001",
                "doctor_id": "doc1",
                "test_type": "CBC"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let count = LabOrderEntity::find().all(&*app.state.db).await.unwrap();
    assert!(count.is_empty());
}

#[tokio::test]
async fn reply_without_a_barcode_is_a_shape_error() {
    let app = TestApp::new().await;

    Mock::given(method("POST"))
        .and(path("/webhook/create-lab-order"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"Technician": "Amit Lab Tech"})),
        )
        .mount(&app.fulfillment)
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/lab-orders",
            Some(json!({
                "patient_id": "PAT-2026-0001",
                "doctor_id": "doc1",
                "test_type": "LFT"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = response_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("did not decode"));
}

#[tokio::test]
async fn uploading_against_an_unknown_barcode_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/lab/orders/NO-SUCH-BARCODE/result",
            Some(json!({"result_value": "positive"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
