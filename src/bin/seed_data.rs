//! Seed data script - populates the database with demo pharmacies and stock
//!
//! Run with: cargo run --bin seed-data
//!
//! This creates:
//! - 4 pharmacy accounts around Colombo (3 verified, 1 left pending)
//! - A shared medicine list stocked at each pharmacy with varied price and stock
//! - 1 personal account
//! - The administrator account, when APP__ADMIN_EMAIL / APP__ADMIN_PASSWORD are set
//!
//! Every account uses the password `demo-password-123`.

use anyhow::Context;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing::info;

use medfinder_api::config::{load_config, AppConfig, DEV_DEFAULT_JWT_SECRET};
use medfinder_api::db::{establish_connection_from_app_config, run_migrations};
use medfinder_api::events;
use medfinder_api::handlers::AppServices;
use medfinder_api::models::{AppUser, GeoPoint};
use medfinder_api::services::accounts::{RegisterPersonalRequest, RegisterPharmacyRequest};
use medfinder_api::services::inventory::InventoryItemInput;
use medfinder_api::services::pharmacies::VerificationDecision;

const DEMO_PASSWORD: &str = "demo-password-123";

struct DemoPharmacy {
    email: &'static str,
    name: &'static str,
    district: &'static str,
    location: (f64, f64),
    opening_hours: &'static str,
    verified: bool,
    /// Percentage applied to list price
    price_factor: i64,
}

const PHARMACIES: &[DemoPharmacy] = &[
    DemoPharmacy {
        email: "fort@pharmacy.demo",
        name: "Fort City Pharmacy",
        district: "Colombo 01",
        location: (6.9344, 79.8428),
        opening_hours: "Open 24 hours",
        verified: true,
        price_factor: 100,
    },
    DemoPharmacy {
        email: "bambalapitiya@pharmacy.demo",
        name: "Bambalapitiya Health Care",
        district: "Colombo 04",
        location: (6.8905, 79.8567),
        opening_hours: "8:00 AM - 10:00 PM",
        verified: true,
        price_factor: 95,
    },
    DemoPharmacy {
        email: "nugegoda@pharmacy.demo",
        name: "Nugegoda Medicals",
        district: "Nugegoda",
        location: (6.8649, 79.8997),
        opening_hours: "Open 7 days, 7:30 AM - 9:00 PM",
        verified: true,
        price_factor: 90,
    },
    DemoPharmacy {
        email: "dehiwala@pharmacy.demo",
        name: "Dehiwala Family Pharmacy",
        district: "Dehiwala",
        location: (6.8511, 79.8659),
        opening_hours: "9:00 AM - 6:00 PM",
        verified: false,
        price_factor: 85,
    },
];

/// (name, category, list price, base stock)
const MEDICINES: &[(&str, &str, Decimal, i32)] = &[
    ("Paracetamol 500mg", "Analgesic", dec!(45.00), 400),
    ("Paracetamol Syrup 120mg/5ml", "Analgesic", dec!(220.00), 30),
    ("Amoxicillin 250mg", "Antibiotic", dec!(180.00), 60),
    ("Cetirizine 10mg", "Antihistamine", dec!(75.00), 120),
    ("Metformin 500mg", "Antidiabetic", dec!(95.00), 20),
    ("Omeprazole 20mg", "Antacid", dec!(130.00), 0),
    ("Salbutamol Inhaler", "Bronchodilator", dec!(950.00), 8),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("=== MedFinder Seed Data ===");

    let cfg = load_config().or_else(|e| {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://medfinder.db?mode=rwc".to_string());
        info!("Configuration not loaded ({}); seeding {}", e, database_url);
        Ok::<_, anyhow::Error>(AppConfig::new(
            database_url,
            DEV_DEFAULT_JWT_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            8080,
            "development".to_string(),
        ))
    })?;

    let db = establish_connection_from_app_config(&cfg)
        .await
        .context("connecting to database")?;
    run_migrations(&db).await.context("running migrations")?;
    info!("Connected and migrated");

    let (event_sender, event_rx) = events::channel(cfg.event_channel_capacity);
    tokio::spawn(events::process_events(event_rx));
    let services = AppServices::new(Arc::new(db), event_sender, cfg.search_pharmacy_fanout);

    if let Some((email, password)) = cfg.admin_credentials() {
        services.accounts.ensure_admin(email, password).await?;
        info!("Administrator {} ready", email);
    }

    let mut stocked = 0usize;
    for (index, demo) in PHARMACIES.iter().enumerate() {
        let (_, user) = services
            .accounts
            .register_pharmacy(RegisterPharmacyRequest {
                email: demo.email.to_string(),
                password: DEMO_PASSWORD.to_string(),
                pharmacy_name: demo.name.to_string(),
                license_id: format!("NMRA-DEMO-{:03}", index + 1),
                license_document_url: None,
                owner_name: "Demo Owner".to_string(),
                phone: format!("+94 11 200 {:04}", index + 1),
                address: format!("{} Main Street, {}", 10 + index, demo.district),
                city: "Colombo".to_string(),
                district: demo.district.to_string(),
                location: Some(GeoPoint::new(demo.location.0, demo.location.1)),
                opening_hours: Some(demo.opening_hours.to_string()),
                description: None,
            })
            .await
            .with_context(|| format!("registering {}", demo.email))?;
        let pharmacy_id = user.id();

        if demo.verified {
            services
                .pharmacies
                .verify_pharmacy(pharmacy_id, VerificationDecision::Verified)
                .await?;
        }

        for (offset, (name, category, price, stock)) in MEDICINES.iter().enumerate() {
            // Vary stock so every status shows up somewhere.
            let stock = (*stock - (index as i32 * 7) - offset as i32).max(0);
            services
                .inventory
                .add_item(
                    pharmacy_id,
                    InventoryItemInput {
                        medicine_name: name.to_string(),
                        medicine_id: Some(format!("MED-{:03}", offset + 1)),
                        price: (*price * Decimal::from(demo.price_factor) / dec!(100)).round_dp(2),
                        stock,
                        low_stock_threshold: None,
                        category: Some(category.to_string()),
                        description: None,
                    },
                )
                .await?;
            stocked += 1;
        }
        info!(
            "  {} ({}) with {} medicines",
            demo.name,
            if demo.verified { "verified" } else { "pending" },
            MEDICINES.len()
        );
    }

    let (_, patient) = services
        .accounts
        .register_personal(RegisterPersonalRequest {
            email: "patient@medfinder.demo".to_string(),
            password: DEMO_PASSWORD.to_string(),
            full_name: "Demo Patient".to_string(),
            phone: None,
            city: Some("Colombo".to_string()),
            district: None,
        })
        .await?;
    if let AppUser::Personal { profile } = &patient {
        info!("  Personal account {}", profile.email);
    }

    info!("=== Seed Data Complete: {} stock lines ===", stocked);
    info!("Try these API calls:");
    info!("  curl 'http://localhost:8080/api/v1/medicines/search?q=Paracetamol&lat=6.9271&lng=79.8612'");
    info!("  curl 'http://localhost:8080/api/v1/medicines/compare?q=Paracetamol%20500mg'");
    info!("Or explore interactively at: http://localhost:8080/swagger-ui");

    Ok(())
}
