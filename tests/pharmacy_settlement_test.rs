mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use medflow_api::entities::{
    pharmacy_order::{self, Entity as OrderEntity},
    pharmacy_order_item::{Column as ItemColumn, Entity as ItemEntity},
};

use common::{decimal_value, response_json, TestApp};

fn order_payload() -> serde_json::Value {
    json!({
        "patient_id": "PAT-2026-0001",
        "doctor_id": "doc1",
        "items": [
            {"name": "Paracetamol", "qty": 2},
            {"name": "Azithromycin", "qty": 1}
        ]
    })
}

#[tokio::test]
async fn settles_order_against_dispense_report() {
    let app = TestApp::new().await;
    app.seed_medicine("Paracetamol", "Paracetamol", dec!(2.0)).await;

    Mock::given(method("POST"))
        .and(path("/webhook/dispense-medicine"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "bill_summary": {"total_amount_to_collect": 999, "items_dispensed": 1, "items_missing": 1},
            "dispensed_medicines": [
                {"medicine": "paracetamol", "price": 2.0, "batch": "BATCH-PAR-001"}
            ],
            "unavailable_medicines": [{"medicine": "Azithromycin"}]
        })))
        .mount(&app.fulfillment)
        .await;

    let response = app
        .request(Method::POST, "/api/v1/pharmacy/orders", Some(order_payload()))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert!(body["success"].as_bool().unwrap());

    let data = &body["data"];
    assert_eq!(data["fulfillment_status"], "Processed");
    let order = &data["order"];
    assert_eq!(order["status"], "Processed");
    assert_eq!(order["items_dispensed"], 1);
    assert_eq!(order["items_missing"], 1);
    // Authoritative pricing, not the webhook's bill summary
    assert_eq!(decimal_value(&order["total_amount"]), dec!(4.0));

    let items = order["items"].as_array().unwrap();
    let paracetamol = items
        .iter()
        .find(|i| i["medicine_name"] == "Paracetamol")
        .unwrap();
    assert_eq!(paracetamol["status"], "Dispensed");
    assert_eq!(paracetamol["quantity_dispensed"], 2);
    assert_eq!(decimal_value(&paracetamol["total_price"]), dec!(4.0));
    assert_eq!(paracetamol["batch_id"], "BATCH-PAR-001");

    let azithromycin = items
        .iter()
        .find(|i| i["medicine_name"] == "Azithromycin")
        .unwrap();
    assert_eq!(azithromycin["status"], "Out of Stock");
    assert_eq!(azithromycin["quantity_dispensed"], 0);

    // Same picture in the store
    let order_id = order["id"].as_i64().unwrap() as i32;
    let saved = OrderEntity::find_by_id(order_id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.status, "Processed");
    assert_eq!(saved.total_amount, dec!(4.0));
}

#[tokio::test]
async fn master_price_overrides_the_reported_price() {
    let app = TestApp::new().await;
    app.seed_medicine("Azithral 500", "Azithromycin", dec!(10)).await;

    Mock::given(method("POST"))
        .and(path("/webhook/dispense-medicine"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dispensed_medicines": [{"medicine": "Azithral 500", "price": 100.0, "batch": "B-9"}]
        })))
        .mount(&app.fulfillment)
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/pharmacy/orders",
            Some(json!({
                "patient_id": "PAT-2026-0002",
                "doctor_id": "doc1",
                "items": [{"name": "Azithral 500", "qty": 2}]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    let order = &body["data"]["order"];
    assert_eq!(decimal_value(&order["total_amount"]), dec!(20));
    assert_eq!(
        decimal_value(&order["items"][0]["unit_price"]),
        dec!(10)
    );
}

#[tokio::test]
async fn nested_report_shape_settles_like_the_flat_one() {
    let app = TestApp::new().await;
    app.seed_medicine("Dolo 650", "Paracetamol", dec!(2.0)).await;

    Mock::given(method("POST"))
        .and(path("/webhook/dispense-medicine"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "dispensed_medicines": {
                "dispensed_medicines": [{"medicine": " DOLO 650 ", "price": 2.0, "batch": "B-1"}]
            }
        }])))
        .mount(&app.fulfillment)
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/pharmacy/orders",
            Some(json!({
                "patient_id": "PAT-2026-0003",
                "doctor_id": "doc1",
                "items": [{"name": "Dolo 650", "qty": 3}]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    let order = &body["data"]["order"];
    assert_eq!(order["items"][0]["status"], "Dispensed");
    assert_eq!(decimal_value(&order["total_amount"]), dec!(6.0));
}

#[tokio::test]
async fn unreachable_service_leaves_the_order_pending() {
    let app = TestApp::new().await;

    Mock::given(method("POST"))
        .and(path("/webhook/dispense-medicine"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&app.fulfillment)
        .await;

    let response = app
        .request(Method::POST, "/api/v1/pharmacy/orders", Some(order_payload()))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    let data = &body["data"];
    assert_eq!(data["fulfillment_status"], "Failed");
    assert!(data["message"]
        .as_str()
        .unwrap()
        .contains("manual review"));
    assert_eq!(data["order"]["status"], "Pending");

    let saved = OrderEntity::find()
        .filter(pharmacy_order::Column::PatientId.eq("PAT-2026-0001"))
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.status, "Pending");
    assert_eq!(saved.total_amount, dec!(0));
}

#[tokio::test]
async fn malformed_reply_fails_with_excerpt_and_keeps_order_pending() {
    let app = TestApp::new().await;

    Mock::given(method("POST"))
        .and(path("/webhook/dispense-medicine"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html>workflow editor page</html>"),
        )
        .mount(&app.fulfillment)
        .await;

    let response = app
        .request(Method::POST, "/api/v1/pharmacy/orders", Some(order_payload()))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = response_json(response).await;
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("invalid JSON"));
    assert!(message.contains("<html>"));

    // No rollback, no settlement: the rows sit Pending for follow-up.
    let saved = OrderEntity::find()
        .filter(pharmacy_order::Column::PatientId.eq("PAT-2026-0001"))
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.status, "Pending");

    let items = ItemEntity::find()
        .filter(ItemColumn::OrderId.eq(saved.id))
        .all(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i.status == "Pending"));
}

#[tokio::test]
async fn processed_orders_show_in_queue_and_complete_on_payment() {
    let app = TestApp::new().await;
    app.seed_patient("PAT-2026-0001", "Rajesh Kumar").await;
    app.seed_medicine("Paracetamol", "Paracetamol", dec!(2.0)).await;

    Mock::given(method("POST"))
        .and(path("/webhook/dispense-medicine"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dispensed_medicines": [{"medicine": "Paracetamol", "price": 2.0, "batch": "B-1"}],
            "unavailable_medicines": [{"medicine": "Azithromycin"}]
        })))
        .mount(&app.fulfillment)
        .await;

    let created = app
        .request(Method::POST, "/api/v1/pharmacy/orders", Some(order_payload()))
        .await;
    let created_body = response_json(created).await;
    let order_id = created_body["data"]["order"]["id"].as_i64().unwrap();

    let queue = app.request(Method::GET, "/api/v1/pharmacy/queue", None).await;
    let queue_body = response_json(queue).await;
    let entries = queue_body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["patient"]["full_name"], "Rajesh Kumar");
    assert_eq!(entries[0]["items"].as_array().unwrap().len(), 2);

    let paid = app
        .request(
            Method::POST,
            &format!("/api/v1/pharmacy/orders/{order_id}/paid"),
            None,
        )
        .await;
    assert_eq!(paid.status(), StatusCode::OK);
    let paid_body = response_json(paid).await;
    assert_eq!(paid_body["data"]["status"], "Completed");

    // Paying twice is a conflict
    let again = app
        .request(
            Method::POST,
            &format!("/api/v1/pharmacy/orders/{order_id}/paid"),
            None,
        )
        .await;
    assert_eq!(again.status(), StatusCode::CONFLICT);

    // Completed orders drop out of the queue
    let queue = app.request(Method::GET, "/api/v1/pharmacy/queue", None).await;
    let queue_body = response_json(queue).await;
    assert!(queue_body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn invoice_deducts_stock_and_prices_from_the_master() {
    let app = TestApp::new().await;
    let medicine = app.seed_medicine("Pan 40", "Pantoprazole", dec!(5.0)).await;
    app.seed_batch(medicine.id, "BATCH-PAN-001", 100).await;

    // Invoice rendering is a fire-and-forget notification; accept it.
    Mock::given(method("POST"))
        .and(path("/webhook/generate-invoice"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.fulfillment)
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/pharmacy/invoices",
            Some(json!({
                "patient_id": "PAT-2026-0009",
                "items": [
                    {"batch_no": "BATCH-PAN-001", "quantity": 4},
                    {"batch_no": "NO-SUCH-BATCH", "quantity": 1}
                ]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let data = &body["data"];
    assert_eq!(decimal_value(&data["total"]), dec!(20.0));
    // The unknown batch line was skipped, not billed
    assert_eq!(data["items"].as_array().unwrap().len(), 1);

    let inventory = app
        .request(Method::GET, "/api/v1/pharmacy/inventory", None)
        .await;
    let inventory_body = response_json(inventory).await;
    assert_eq!(inventory_body["data"][0]["current_stock"], 96);
}
