use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        medicine_batch::{self, Entity as BatchEntity},
        medicine_master::{self, Entity as MedicineEntity},
        patient::{self, Entity as PatientEntity},
        pharmacy_order::{
            self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel,
        },
        pharmacy_order_item::{
            self, ActiveModel as ItemActiveModel, Entity as OrderItemEntity, Model as ItemModel,
        },
        OrderItemStatus, PharmacyOrderStatus,
    },
    errors::ServiceError,
    fulfillment::{DispenseReport, FulfillmentClient, RequestedMedicine},
};

/// Request/response types for the pharmacy service

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePharmacyOrderRequest {
    #[validate(length(min = 1, message = "patient_id is required"))]
    pub patient_id: String,
    #[validate(length(min = 1, message = "doctor_id is required"))]
    pub doctor_id: String,
    #[validate(length(min = 1, message = "at least one medicine is required"))]
    pub items: Vec<PrescriptionLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PrescriptionLine {
    pub name: String,
    pub qty: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PharmacyOrderItemResponse {
    pub id: i32,
    pub medicine_name: String,
    pub quantity_requested: i32,
    pub quantity_dispensed: i32,
    pub status: String,
    pub unit_price: Option<Decimal>,
    pub total_price: Option<Decimal>,
    pub batch_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PharmacyOrderResponse {
    pub id: i32,
    pub patient_id: String,
    pub doctor_id: String,
    pub status: String,
    pub total_items_requested: i32,
    pub total_amount: Decimal,
    pub items_dispensed: i32,
    pub items_missing: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub items: Vec<PharmacyOrderItemResponse>,
}

/// Whether the external dispense run confirmed the order this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum FulfillmentStatus {
    Processed,
    Failed,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderOutcome {
    pub order: PharmacyOrderResponse,
    pub fulfillment_status: FulfillmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PatientSummary {
    pub patient_id: String,
    pub full_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QueueEntry {
    #[serde(flatten)]
    pub order: PharmacyOrderResponse,
    pub patient: Option<PatientSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MedicineResponse {
    pub id: i32,
    pub brand_name: String,
    pub generic_name: String,
    pub price_per_unit: Decimal,
    pub min_threshold: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryBatchResponse {
    pub id: i32,
    pub batch_no: String,
    pub current_stock: i32,
    pub expiry_date: chrono::NaiveDate,
    pub rack_location: Option<String>,
    pub medicine: Option<MedicineResponse>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddBatchRequest {
    /// Existing master row; omit when registering a new brand.
    pub medicine_id: Option<i32>,
    pub brand_name: Option<String>,
    pub generic_name: Option<String>,
    #[validate(length(min = 1, message = "batch_no is required"))]
    pub batch_no: String,
    #[validate(range(min = 0))]
    pub stock: i32,
    /// Unit price; required when creating a new master row.
    pub price: Option<Decimal>,
    pub expiry: chrono::NaiveDate,
    pub rack: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateInvoiceRequest {
    #[validate(length(min = 1, message = "patient_id is required"))]
    pub patient_id: String,
    #[validate(length(min = 1, message = "at least one line is required"))]
    pub items: Vec<InvoiceLineRequest>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct InvoiceLineRequest {
    pub batch_no: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceLine {
    pub medicine_name: String,
    pub qty: i32,
    pub price: Decimal,
    pub batch_no: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceResponse {
    pub patient_id: String,
    pub total: Decimal,
    pub items: Vec<InvoiceLine>,
}

/// Service for pharmacy dispensing, settlement and billing.
#[derive(Clone)]
pub struct PharmacyService {
    db: Arc<DbPool>,
    fulfillment: Arc<FulfillmentClient>,
}

/// Case-insensitive, whitespace-trimmed key used for all medicine-name
/// matching. Exact equality on the normalized form; no fuzzy matching.
fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Planned rewrite of a single order item after matching it against the
/// dispense report.
#[derive(Debug, PartialEq, Eq)]
struct ItemResolution {
    item_id: i32,
    status: OrderItemStatus,
    quantity_dispensed: i32,
    unit_price: Option<Decimal>,
    total_price: Option<Decimal>,
    batch_id: Option<String>,
}

#[derive(Debug, Default)]
struct SettlementPlan {
    resolutions: Vec<ItemResolution>,
    total_amount: Decimal,
    items_dispensed: i32,
    items_missing: i32,
}

/// Matches each local item against the dispensed list, then the unavailable
/// list. Dispensed takes precedence when a name appears in both; an item
/// matching neither produces no resolution and keeps its initial status.
/// Dispensed pricing comes from the master map when the brand is known
/// there, otherwise the externally reported price is kept as-is.
fn reconcile_items(
    items: &[ItemModel],
    report: &DispenseReport,
    master_prices: &HashMap<String, Decimal>,
) -> SettlementPlan {
    let mut plan = SettlementPlan::default();

    for item in items {
        let key = normalize_name(&item.medicine_name);

        let dispensed = report
            .dispensed
            .iter()
            .find(|line| normalize_name(&line.medicine) == key);

        if let Some(line) = dispensed {
            let qty = item.quantity_requested;
            let (unit_price, total_price) = match master_prices.get(&key) {
                Some(master_price) => (
                    Some(*master_price),
                    Some(*master_price * Decimal::from(qty)),
                ),
                // No master row for this brand: keep the reported price.
                None => (line.price, line.price.map(|p| p * Decimal::from(qty))),
            };

            plan.total_amount += total_price.unwrap_or_default();
            plan.items_dispensed += 1;
            plan.resolutions.push(ItemResolution {
                item_id: item.id,
                status: OrderItemStatus::Dispensed,
                quantity_dispensed: qty,
                unit_price,
                total_price,
                batch_id: line.batch.clone(),
            });
            continue;
        }

        let unavailable = report
            .unavailable
            .iter()
            .any(|line| normalize_name(&line.medicine) == key);

        if unavailable {
            plan.items_missing += 1;
            plan.resolutions.push(ItemResolution {
                item_id: item.id,
                status: OrderItemStatus::OutOfStock,
                quantity_dispensed: 0,
                unit_price: None,
                total_price: None,
                batch_id: None,
            });
        }
        // Matching neither list is a silent no-op; the item stays Pending.
    }

    plan
}

impl PharmacyService {
    pub fn new(db: Arc<DbPool>, fulfillment: Arc<FulfillmentClient>) -> Self {
        Self { db, fulfillment }
    }

    /// Creates a pharmacy order, asks the fulfillment service to dispense
    /// it and settles the reply against local state.
    ///
    /// The order and its items are persisted `Pending` before the external
    /// call; on external failure they stay that way for manual follow-up
    /// (no rollback).
    #[instrument(skip(self, request), fields(patient_id = %request.patient_id))]
    pub async fn create_order(
        &self,
        request: CreatePharmacyOrderRequest,
    ) -> Result<CreateOrderOutcome, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        for line in &request.items {
            if line.name.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "medicine name must not be blank".to_string(),
                ));
            }
            if line.qty < 1 {
                return Err(ServiceError::ValidationError(format!(
                    "quantity for {} must be at least 1",
                    line.name
                )));
            }
        }

        let db = &*self.db;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "failed to start transaction for pharmacy order");
            ServiceError::DatabaseError(e)
        })?;

        let order = OrderActiveModel {
            patient_id: Set(request.patient_id.clone()),
            doctor_id: Set(request.doctor_id.clone()),
            status: Set(PharmacyOrderStatus::Pending.to_string()),
            total_items_requested: Set(request.items.len() as i32),
            total_amount: Set(Decimal::ZERO),
            items_dispensed: Set(0),
            items_missing: Set(0),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for line in &request.items {
            ItemActiveModel {
                order_id: Set(order.id),
                medicine_name: Set(line.name.clone()),
                quantity_requested: Set(line.qty),
                quantity_dispensed: Set(0),
                status: Set(OrderItemStatus::Pending.to_string()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        info!(order_id = order.id, items = request.items.len(), "pharmacy order recorded");

        let medicines: Vec<RequestedMedicine> = request
            .items
            .iter()
            .map(|line| RequestedMedicine {
                name: line.name.clone(),
                qty: line.qty,
            })
            .collect();

        let report = match self
            .fulfillment
            .dispense_medicines(&request.patient_id, &medicines)
            .await
        {
            Ok(report) => report,
            Err(ServiceError::ExternalServiceError(reason)) => {
                // Order stays Pending; the pharmacist picks it up manually.
                warn!(order_id = order.id, reason = %reason, "dispense call failed; order left pending");
                return Ok(CreateOrderOutcome {
                    order: self.load_order(order.id).await?,
                    fulfillment_status: FulfillmentStatus::Failed,
                    message: Some(format!(
                        "Order recorded but not confirmed: {}. Awaiting manual review.",
                        reason
                    )),
                });
            }
            Err(other) => return Err(other),
        };

        let settled = self.settle(order, &report).await?;

        Ok(CreateOrderOutcome {
            order: settled,
            fulfillment_status: FulfillmentStatus::Processed,
            message: None,
        })
    }

    /// Applies a dispense report to an order: resolves authoritative
    /// prices, then writes every item and the order totals in one
    /// transaction, so no reader observes intermediate pricing.
    #[instrument(skip(self, report), fields(order_id = order.id))]
    async fn settle(
        &self,
        order: OrderModel,
        report: &DispenseReport,
    ) -> Result<PharmacyOrderResponse, ServiceError> {
        let db = &*self.db;
        let order_id = order.id;

        let items = OrderItemEntity::find()
            .filter(pharmacy_order_item::Column::OrderId.eq(order_id))
            .all(db)
            .await?;

        let master_prices = self
            .master_prices_for(report.dispensed.iter().map(|line| line.medicine.as_str()))
            .await?;

        let plan = reconcile_items(&items, report, &master_prices);

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, order_id, "failed to start settlement transaction");
            ServiceError::DatabaseError(e)
        })?;

        for resolution in &plan.resolutions {
            let active = ItemActiveModel {
                id: Set(resolution.item_id),
                status: Set(resolution.status.to_string()),
                quantity_dispensed: Set(resolution.quantity_dispensed),
                unit_price: Set(resolution.unit_price),
                total_price: Set(resolution.total_price),
                batch_id: Set(resolution.batch_id.clone()),
                ..Default::default()
            };
            active.update(&txn).await?;
        }

        let mut order_active: OrderActiveModel = order.into();
        order_active.status = Set(PharmacyOrderStatus::Processed.to_string());
        order_active.total_amount = Set(plan.total_amount);
        order_active.items_dispensed = Set(plan.items_dispensed);
        order_active.items_missing = Set(plan.items_missing);
        order_active.updated_at = Set(Some(Utc::now()));
        order_active.update(&txn).await?;

        txn.commit().await?;

        info!(
            order_id,
            dispensed = plan.items_dispensed,
            missing = plan.items_missing,
            total = %plan.total_amount,
            "pharmacy order settled"
        );

        self.load_order(order_id).await
    }

    /// Case-insensitive master-price lookup for the given brand names,
    /// keyed by normalized name.
    async fn master_prices_for(
        &self,
        names: impl Iterator<Item = &str>,
    ) -> Result<HashMap<String, Decimal>, ServiceError> {
        let normalized: Vec<String> = names.map(normalize_name).collect();
        if normalized.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = MedicineEntity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(medicine_master::Column::BrandName)))
                    .is_in(normalized),
            )
            .all(&*self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (normalize_name(&row.brand_name), row.price_per_unit))
            .collect())
    }

    /// Fetches an order with its items.
    pub async fn load_order(&self, order_id: i32) -> Result<PharmacyOrderResponse, ServiceError> {
        let db = &*self.db;

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Pharmacy order {} not found", order_id))
            })?;

        let items = OrderItemEntity::find()
            .filter(pharmacy_order_item::Column::OrderId.eq(order_id))
            .all(db)
            .await?;

        Ok(order_to_response(order, items))
    }

    /// Billing queue: Pending and Processed orders, newest first, with
    /// patient details joined in manually (the orders table carries only
    /// the external patient id).
    #[instrument(skip(self))]
    pub async fn queue(&self) -> Result<Vec<QueueEntry>, ServiceError> {
        let db = &*self.db;

        let orders_with_items = OrderEntity::find()
            .filter(pharmacy_order::Column::Status.is_in([
                PharmacyOrderStatus::Pending.to_string(),
                PharmacyOrderStatus::Processed.to_string(),
            ]))
            .order_by_desc(pharmacy_order::Column::CreatedAt)
            .find_with_related(OrderItemEntity)
            .all(db)
            .await?;

        let mut patient_ids: Vec<String> = orders_with_items
            .iter()
            .map(|(order, _)| order.patient_id.clone())
            .collect();
        patient_ids.sort();
        patient_ids.dedup();

        let patients: HashMap<String, patient::Model> = PatientEntity::find()
            .filter(patient::Column::PatientId.is_in(patient_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.patient_id.clone(), p))
            .collect();

        Ok(orders_with_items
            .into_iter()
            .map(|(order, items)| {
                let patient = patients.get(&order.patient_id).map(|p| PatientSummary {
                    patient_id: p.patient_id.clone(),
                    full_name: p.full_name.clone(),
                    phone: Some(p.phone.clone()),
                });
                QueueEntry {
                    order: order_to_response(order, items),
                    patient,
                }
            })
            .collect())
    }

    /// Marks a processed order as paid.
    #[instrument(skip(self))]
    pub async fn mark_order_paid(&self, order_id: i32) -> Result<PharmacyOrderResponse, ServiceError> {
        let db = &*self.db;

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Pharmacy order {} not found", order_id))
            })?;

        match PharmacyOrderStatus::from_str(&order.status) {
            Ok(PharmacyOrderStatus::Processed) => {}
            Ok(PharmacyOrderStatus::Completed) => {
                return Err(ServiceError::Conflict(format!(
                    "Pharmacy order {} is already completed",
                    order_id
                )))
            }
            _ => {
                return Err(ServiceError::InvalidStatus(format!(
                    "Pharmacy order {} has not been processed yet",
                    order_id
                )))
            }
        }

        let mut active: OrderActiveModel = order.into();
        active.status = Set(PharmacyOrderStatus::Completed.to_string());
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await?;

        info!(order_id, "pharmacy order marked paid");
        self.load_order(order_id).await
    }

    /// Sellable stock: batches with units remaining, soonest expiry first.
    #[instrument(skip(self))]
    pub async fn inventory(&self) -> Result<Vec<InventoryBatchResponse>, ServiceError> {
        let rows = BatchEntity::find()
            .filter(medicine_batch::Column::CurrentStock.gt(0))
            .order_by_asc(medicine_batch::Column::ExpiryDate)
            .find_also_related(MedicineEntity)
            .all(&*self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(batch, medicine)| InventoryBatchResponse {
                id: batch.id,
                batch_no: batch.batch_no,
                current_stock: batch.current_stock,
                expiry_date: batch.expiry_date,
                rack_location: batch.rack_location,
                medicine: medicine.map(medicine_to_response),
            })
            .collect())
    }

    /// Registers a stock batch, creating the master row first for a brand
    /// not seen before.
    #[instrument(skip(self, request), fields(batch_no = %request.batch_no))]
    pub async fn add_batch(
        &self,
        request: AddBatchRequest,
    ) -> Result<InventoryBatchResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db;

        let medicine_id = match (request.medicine_id, request.brand_name.as_deref()) {
            (Some(id), _) => {
                MedicineEntity::find_by_id(id).one(db).await?.ok_or_else(|| {
                    ServiceError::NotFound(format!("Medicine {} not found", id))
                })?;
                id
            }
            (None, Some(brand_name)) if !brand_name.trim().is_empty() => {
                let price = request.price.ok_or_else(|| {
                    ServiceError::ValidationError(
                        "price is required when registering a new brand".to_string(),
                    )
                })?;
                let created = medicine_master::ActiveModel {
                    brand_name: Set(brand_name.trim().to_string()),
                    generic_name: Set(request.generic_name.clone().unwrap_or_default()),
                    price_per_unit: Set(price),
                    min_threshold: Set(0),
                    ..Default::default()
                }
                .insert(db)
                .await?;
                info!(medicine_id = created.id, brand = %created.brand_name, "medicine master row created");
                created.id
            }
            _ => {
                return Err(ServiceError::ValidationError(
                    "either medicine_id or brand_name must be provided".to_string(),
                ))
            }
        };

        let batch = medicine_batch::ActiveModel {
            medicine_id: Set(medicine_id),
            batch_no: Set(request.batch_no.clone()),
            current_stock: Set(request.stock),
            expiry_date: Set(request.expiry),
            rack_location: Set(request.rack.clone()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        let medicine = MedicineEntity::find_by_id(medicine_id).one(db).await?;

        Ok(InventoryBatchResponse {
            id: batch.id,
            batch_no: batch.batch_no,
            current_stock: batch.current_stock,
            expiry_date: batch.expiry_date,
            rack_location: batch.rack_location,
            medicine: medicine.map(medicine_to_response),
        })
    }

    /// The full master price list, alphabetical.
    pub async fn medicine_list(&self) -> Result<Vec<MedicineResponse>, ServiceError> {
        let rows = MedicineEntity::find()
            .order_by_asc(medicine_master::Column::BrandName)
            .all(&*self.db)
            .await?;

        Ok(rows.into_iter().map(medicine_to_response).collect())
    }

    /// Walk-in billing: deducts stock for every satisfiable line, prices
    /// it from the master, and forwards the bill for invoice rendering.
    /// Lines with an unknown batch or not enough stock are skipped, same
    /// as the counter workflow.
    #[instrument(skip(self, request), fields(patient_id = %request.patient_id))]
    pub async fn generate_invoice(
        &self,
        request: GenerateInvoiceRequest,
    ) -> Result<InvoiceResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db;
        let txn = db.begin().await?;

        let mut total = Decimal::ZERO;
        let mut lines: Vec<InvoiceLine> = Vec::new();

        for line in &request.items {
            let found = BatchEntity::find()
                .filter(medicine_batch::Column::BatchNo.eq(line.batch_no.clone()))
                .find_also_related(MedicineEntity)
                .one(&txn)
                .await?;

            let Some((batch, Some(medicine))) = found else {
                warn!(batch_no = %line.batch_no, "invoice line skipped: unknown batch");
                continue;
            };

            if batch.current_stock < line.quantity {
                warn!(
                    batch_no = %line.batch_no,
                    requested = line.quantity,
                    available = batch.current_stock,
                    "invoice line skipped: not enough stock"
                );
                continue;
            }

            let remaining = batch.current_stock - line.quantity;
            let mut batch_active: medicine_batch::ActiveModel = batch.into();
            batch_active.current_stock = Set(remaining);
            batch_active.update(&txn).await?;

            let cost = medicine.price_per_unit * Decimal::from(line.quantity);
            total += cost;
            lines.push(InvoiceLine {
                medicine_name: medicine.brand_name,
                qty: line.quantity,
                price: cost,
                batch_no: line.batch_no.clone(),
            });
        }

        txn.commit().await?;

        self.fulfillment.notify_invoice(json!({
            "patient_id": request.patient_id,
            "medicines": lines,
            "total_amount": total,
            "date": Utc::now(),
        }));

        info!(patient_id = %request.patient_id, lines = lines.len(), total = %total, "invoice generated");

        Ok(InvoiceResponse {
            patient_id: request.patient_id,
            total,
            items: lines,
        })
    }
}

fn medicine_to_response(model: medicine_master::Model) -> MedicineResponse {
    MedicineResponse {
        id: model.id,
        brand_name: model.brand_name,
        generic_name: model.generic_name,
        price_per_unit: model.price_per_unit,
        min_threshold: model.min_threshold,
    }
}

fn order_to_response(order: OrderModel, items: Vec<ItemModel>) -> PharmacyOrderResponse {
    PharmacyOrderResponse {
        id: order.id,
        patient_id: order.patient_id,
        doctor_id: order.doctor_id,
        status: order.status,
        total_items_requested: order.total_items_requested,
        total_amount: order.total_amount,
        items_dispensed: order.items_dispensed,
        items_missing: order.items_missing,
        created_at: order.created_at,
        updated_at: order.updated_at,
        items: items
            .into_iter()
            .map(|item| PharmacyOrderItemResponse {
                id: item.id,
                medicine_name: item.medicine_name,
                quantity_requested: item.quantity_requested,
                quantity_dispensed: item.quantity_dispensed,
                status: item.status,
                unit_price: item.unit_price,
                total_price: item.total_price,
                batch_id: item.batch_id,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::fulfillment::FulfilledLine;

    fn item(id: i32, name: &str, qty: i32) -> ItemModel {
        ItemModel {
            id,
            order_id: 1,
            medicine_name: name.to_string(),
            quantity_requested: qty,
            quantity_dispensed: 0,
            status: OrderItemStatus::Pending.to_string(),
            unit_price: None,
            total_price: None,
            batch_id: None,
            created_at: Utc::now(),
        }
    }

    fn line(medicine: &str, price: Option<Decimal>, batch: Option<&str>) -> FulfilledLine {
        FulfilledLine {
            medicine: medicine.to_string(),
            price,
            batch: batch.map(str::to_string),
        }
    }

    #[test]
    fn settles_a_mixed_dispense_report() {
        // Paracetamol dispensed at 2.0/unit, Azithromycin unavailable.
        let items = vec![item(1, "Paracetamol", 2), item(2, "Azithromycin", 1)];
        let report = DispenseReport {
            dispensed: vec![line("Paracetamol", Some(dec!(2.0)), Some("B-01"))],
            unavailable: vec![line("Azithromycin", None, None)],
            ..Default::default()
        };
        let prices = HashMap::from([("paracetamol".to_string(), dec!(2.0))]);

        let plan = reconcile_items(&items, &report, &prices);

        assert_eq!(plan.items_dispensed, 1);
        assert_eq!(plan.items_missing, 1);
        assert_eq!(plan.total_amount, dec!(4.0));

        let dispensed = &plan.resolutions[0];
        assert_eq!(dispensed.status, OrderItemStatus::Dispensed);
        assert_eq!(dispensed.quantity_dispensed, 2);
        assert_eq!(dispensed.unit_price, Some(dec!(2.0)));
        assert_eq!(dispensed.total_price, Some(dec!(4.0)));
        assert_eq!(dispensed.batch_id.as_deref(), Some("B-01"));

        let missing = &plan.resolutions[1];
        assert_eq!(missing.status, OrderItemStatus::OutOfStock);
        assert_eq!(missing.quantity_dispensed, 0);
        assert_eq!(missing.total_price, None);
    }

    #[test]
    fn matching_ignores_case_and_surrounding_whitespace() {
        let items = vec![item(1, " Dolo 650 ", 3)];
        let report = DispenseReport {
            dispensed: vec![line("dolo 650", Some(dec!(2.0)), None)],
            ..Default::default()
        };
        let prices = HashMap::from([("dolo 650".to_string(), dec!(2.0))]);

        let plan = reconcile_items(&items, &report, &prices);

        assert_eq!(plan.items_dispensed, 1);
        assert_eq!(plan.total_amount, dec!(6.0));
    }

    #[test]
    fn master_price_overrides_reported_price() {
        // Fulfillment claims 100/unit, the master says 10.
        let items = vec![item(1, "Azithral 500", 2)];
        let report = DispenseReport {
            dispensed: vec![line("Azithral 500", Some(dec!(100)), None)],
            ..Default::default()
        };
        let prices = HashMap::from([("azithral 500".to_string(), dec!(10))]);

        let plan = reconcile_items(&items, &report, &prices);

        assert_eq!(plan.resolutions[0].unit_price, Some(dec!(10)));
        assert_eq!(plan.resolutions[0].total_price, Some(dec!(20)));
        assert_eq!(plan.total_amount, dec!(20));
    }

    #[test]
    fn falls_back_to_reported_price_without_a_master_row() {
        let items = vec![item(1, "Unlisted Syrup", 3)];
        let report = DispenseReport {
            dispensed: vec![line("Unlisted Syrup", Some(dec!(7.5)), None)],
            ..Default::default()
        };

        let plan = reconcile_items(&items, &report, &HashMap::new());

        assert_eq!(plan.resolutions[0].unit_price, Some(dec!(7.5)));
        assert_eq!(plan.resolutions[0].total_price, Some(dec!(22.5)));
        assert_eq!(plan.total_amount, dec!(22.5));
    }

    #[test]
    fn dispensed_wins_when_a_name_appears_in_both_lists() {
        let items = vec![item(1, "Pan 40", 1)];
        let report = DispenseReport {
            dispensed: vec![line("Pan 40", Some(dec!(5)), None)],
            unavailable: vec![line("Pan 40", None, None)],
            ..Default::default()
        };
        let prices = HashMap::from([("pan 40".to_string(), dec!(5))]);

        let plan = reconcile_items(&items, &report, &prices);

        assert_eq!(plan.resolutions.len(), 1);
        assert_eq!(plan.resolutions[0].status, OrderItemStatus::Dispensed);
        assert_eq!(plan.items_missing, 0);
    }

    #[test]
    fn items_matching_neither_list_are_untouched() {
        let items = vec![item(1, "Dolo 650", 2), item(2, "Mystery Med", 1)];
        let report = DispenseReport {
            dispensed: vec![line("Dolo 650", Some(dec!(2)), None)],
            ..Default::default()
        };
        let prices = HashMap::from([("dolo 650".to_string(), dec!(2))]);

        let plan = reconcile_items(&items, &report, &prices);

        // Only the matched item gets a resolution; the other stays Pending.
        assert_eq!(plan.resolutions.len(), 1);
        assert_eq!(plan.resolutions[0].item_id, 1);
        assert_eq!(plan.total_amount, dec!(4));
    }

    #[test]
    fn order_total_is_the_sum_of_dispensed_totals_only() {
        let items = vec![
            item(1, "Dolo 650", 2),
            item(2, "Pan 40", 4),
            item(3, "Azithral 500", 1),
        ];
        let report = DispenseReport {
            dispensed: vec![
                line("Dolo 650", Some(dec!(2)), None),
                line("Pan 40", Some(dec!(5)), None),
            ],
            unavailable: vec![line("Azithral 500", None, None)],
            ..Default::default()
        };
        let prices = HashMap::from([
            ("dolo 650".to_string(), dec!(2)),
            ("pan 40".to_string(), dec!(5)),
        ]);

        let plan = reconcile_items(&items, &report, &prices);

        assert_eq!(plan.total_amount, dec!(24)); // 2*2 + 4*5
        assert_eq!(plan.items_dispensed, 2);
        assert_eq!(plan.items_missing, 1);
    }
}
