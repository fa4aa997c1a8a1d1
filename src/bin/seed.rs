//! Seeds a fresh database with staff accounts, the lab-facing departments'
//! reference data and the pharmacy master list, mirroring what a new
//! installation needs before the dashboards are usable.

use anyhow::{anyhow, Context, Result};
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHasher};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use tracing::info;

use medflow_api as api;

use api::entities::{medicine_batch, medicine_master, user};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = api::config::load_config().context("loading configuration")?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    let db = api::db::establish_connection_from_app_config(&cfg)
        .await
        .context("connecting to database")?;
    api::db::run_migrations(&db).await.context("migrating")?;

    info!("Start seeding ...");

    // 1. Staff accounts, one per role
    let password_hash = hash_password("password123")?;
    let users = [
        ("admin", "admin", "Super Admin"),
        ("doc1", "doctor", "Dr. Sarah Smith"),
        ("recep1", "receptionist", "Ravi Receptionist"),
        ("lab1", "lab_technician", "Amit Lab Tech"),
        ("pharm1", "pharmacist", "Priya Pharmacist"),
    ];

    for (username, role, name) in users {
        let existing = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&db)
            .await?;
        if existing.is_some() {
            continue;
        }
        user::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash.clone()),
            role: Set(role.to_string()),
            name: Set(name.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        info!("Created user: {}", username);
    }

    // 2. Pharmacy master list + an opening batch for each brand
    let medicines: [(&str, &str, Decimal, i32); 4] = [
        ("Dolo 650", "Paracetamol", dec!(2.0), 50),
        ("Augmentin 625", "Amoxicillin + Clavulanate", dec!(15.0), 20),
        ("Azithral 500", "Azithromycin", dec!(10.0), 15),
        ("Pan 40", "Pantoprazole", dec!(5.0), 30),
    ];

    let expiry = NaiveDate::from_ymd_opt(2026, 12, 31).expect("valid expiry date");

    for (brand, generic, price, threshold) in medicines {
        let medicine = match medicine_master::Entity::find()
            .filter(medicine_master::Column::BrandName.eq(brand))
            .one(&db)
            .await?
        {
            Some(existing) => existing,
            None => {
                medicine_master::ActiveModel {
                    brand_name: Set(brand.to_string()),
                    generic_name: Set(generic.to_string()),
                    price_per_unit: Set(price),
                    min_threshold: Set(threshold),
                    ..Default::default()
                }
                .insert(&db)
                .await?
            }
        };

        let prefix: String = brand.chars().take(3).collect();
        let batch_no = format!("BATCH-{}-001", prefix.to_uppercase());

        let existing_batch = medicine_batch::Entity::find()
            .filter(medicine_batch::Column::BatchNo.eq(batch_no.clone()))
            .one(&db)
            .await?;
        if existing_batch.is_none() {
            medicine_batch::ActiveModel {
                medicine_id: Set(medicine.id),
                batch_no: Set(batch_no),
                current_stock: Set(100),
                expiry_date: Set(expiry),
                rack_location: Set(Some("A-01".to_string())),
                created_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(&db)
            .await?;
        }
    }
    info!("Seeded Medicines & Inventory");

    info!("Seeding finished.");
    Ok(())
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("password hashing failed: {e}"))
}
