use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::pharmacy::VerificationStatus;
use crate::entities::{inventory_item, pharmacy};
use crate::models::{GeoPoint, StockStatus};

/// An inventory item joined with the display fields of its pharmacy.
/// Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MedicineOffer {
    pub id: Uuid,
    pub pharmacy_id: Uuid,
    pub medicine_id: String,
    pub medicine_name: String,
    #[schema(value_type = String, example = "120.00")]
    pub price: Decimal,
    pub stock: i32,
    pub low_stock_threshold: Option<i32>,
    pub available: bool,
    pub category: Option<String>,
    pub description: Option<String>,
    pub last_updated: DateTime<Utc>,
    pub pharmacy_name: String,
    pub address: String,
    pub phone: String,
    pub opening_hours: Option<String>,
    pub location: Option<GeoPoint>,
    pub pharmacy_status: VerificationStatus,
    /// Great-circle distance from the caller; null when either coordinate is unknown.
    pub distance_km: Option<f64>,
    pub stock_status: StockStatus,
}

impl MedicineOffer {
    pub fn enrich(
        item: inventory_item::Model,
        pharmacy: &pharmacy::Model,
        distance_km: Option<f64>,
    ) -> Self {
        let stock_status = item.stock_status();
        Self {
            id: item.id,
            pharmacy_id: item.pharmacy_id,
            medicine_id: item.medicine_id,
            medicine_name: item.medicine_name,
            price: item.price,
            stock: item.stock,
            low_stock_threshold: item.low_stock_threshold,
            available: item.available,
            category: item.category,
            description: item.description,
            last_updated: item.last_updated,
            pharmacy_name: pharmacy.pharmacy_name.clone(),
            address: pharmacy.address.clone(),
            phone: pharmacy.phone.clone(),
            opening_hours: pharmacy.opening_hours.clone(),
            location: pharmacy.location(),
            pharmacy_status: pharmacy.status,
            distance_km,
            stock_status,
        }
    }
}
