use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::entities::inventory_item;
use crate::entities::pharmacy::VerificationStatus;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{StockStatus, DEFAULT_LOW_STOCK_THRESHOLD};
use crate::repositories::{InventoryRepository, PharmacyRepository};

/// Fields a pharmacy supplies when adding or editing a stock line.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct InventoryItemInput {
    #[validate(custom = "not_blank", length(max = 200))]
    pub medicine_name: String,
    /// Catalogue reference; generated when omitted on create
    #[serde(default)]
    pub medicine_id: Option<String>,
    #[validate(custom = "non_negative_price")]
    #[schema(value_type = String, example = "120.50")]
    pub price: Decimal,
    #[validate(range(min = 0))]
    pub stock: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub low_stock_threshold: Option<i32>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

fn non_negative_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        let mut err = ValidationError::new("negative_price");
        err.message = Some("price must be zero or greater".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StockFilter {
    #[default]
    All,
    Low,
    Out,
}

impl StockFilter {
    fn matches(self, status: StockStatus) -> bool {
        match self {
            StockFilter::All => true,
            StockFilter::Low => status == StockStatus::LowStock,
            StockFilter::Out => status == StockStatus::OutOfStock,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct StockListQuery {
    /// all | low | out
    #[serde(default)]
    pub filter: StockFilter,
}

/// A stock line with its computed status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StockRow {
    #[serde(flatten)]
    #[schema(inline)]
    pub item: inventory_item::Model,
    pub stock_status: StockStatus,
}

impl From<inventory_item::Model> for StockRow {
    fn from(item: inventory_item::Model) -> Self {
        let stock_status = item.stock_status();
        Self { item, stock_status }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PharmacyDashboard {
    pub total_items: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub verification_status: VerificationStatus,
}

/// Stock management for a pharmacy's own inventory.
#[derive(Clone)]
pub struct InventoryService {
    repo: Arc<dyn InventoryRepository>,
    pharmacies: Arc<dyn PharmacyRepository>,
    event_sender: EventSender,
}

impl InventoryService {
    pub fn new(
        repo: Arc<dyn InventoryRepository>,
        pharmacies: Arc<dyn PharmacyRepository>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            repo,
            pharmacies,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list_inventory(
        &self,
        pharmacy_id: Uuid,
        filter: StockFilter,
    ) -> Result<Vec<StockRow>, ServiceError> {
        let items = self.repo.list_for_pharmacy(pharmacy_id).await?;
        Ok(items
            .into_iter()
            .map(StockRow::from)
            .filter(|row| filter.matches(row.stock_status))
            .collect())
    }

    #[instrument(skip(self, input), fields(medicine = %input.medicine_name))]
    pub async fn add_item(
        &self,
        pharmacy_id: Uuid,
        input: InventoryItemInput,
    ) -> Result<StockRow, ServiceError> {
        input.validate()?;

        let now = Utc::now();
        let medicine_id = input
            .medicine_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("manual-{}", now.timestamp_millis()));

        let item = inventory_item::Model {
            id: Uuid::new_v4(),
            pharmacy_id,
            medicine_id,
            medicine_name: input.medicine_name.trim().to_string(),
            price: input.price,
            stock: input.stock,
            low_stock_threshold: Some(
                input
                    .low_stock_threshold
                    .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
            ),
            available: input.stock > 0,
            category: input.category,
            description: input.description,
            last_updated: now,
        };

        let saved = self.repo.insert(item).await?;
        info!(item_id = %saved.id, "inventory item created");
        self.event_sender
            .send_or_log(Event::InventoryItemCreated {
                pharmacy_id,
                item_id: saved.id,
            })
            .await;
        Ok(saved.into())
    }

    #[instrument(skip(self, input))]
    pub async fn update_item(
        &self,
        pharmacy_id: Uuid,
        item_id: Uuid,
        input: InventoryItemInput,
    ) -> Result<StockRow, ServiceError> {
        input.validate()?;

        let mut item = self
            .repo
            .find_for_pharmacy(pharmacy_id, item_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Inventory item", item_id))?;

        item.medicine_name = input.medicine_name.trim().to_string();
        if let Some(medicine_id) = input.medicine_id.filter(|id| !id.trim().is_empty()) {
            item.medicine_id = medicine_id;
        }
        item.price = input.price;
        item.stock = input.stock;
        if input.low_stock_threshold.is_some() {
            item.low_stock_threshold = input.low_stock_threshold;
        }
        item.category = input.category;
        item.description = input.description;
        item.available = item.stock > 0;
        item.last_updated = Utc::now();

        let saved = self.repo.update(item).await?;
        self.event_sender
            .send_or_log(Event::InventoryItemUpdated {
                pharmacy_id,
                item_id,
                stock: saved.stock,
            })
            .await;
        Ok(saved.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_item(&self, pharmacy_id: Uuid, item_id: Uuid) -> Result<(), ServiceError> {
        if !self.repo.delete_for_pharmacy(pharmacy_id, item_id).await? {
            return Err(ServiceError::not_found("Inventory item", item_id));
        }
        self.event_sender
            .send_or_log(Event::InventoryItemDeleted {
                pharmacy_id,
                item_id,
            })
            .await;
        Ok(())
    }

    /// Headline counts for the pharmacy's landing page.
    #[instrument(skip(self))]
    pub async fn dashboard(&self, pharmacy_id: Uuid) -> Result<PharmacyDashboard, ServiceError> {
        let pharmacy = self
            .pharmacies
            .find_by_id(pharmacy_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Pharmacy", pharmacy_id))?;
        let items = self.repo.list_for_pharmacy(pharmacy_id).await?;

        let mut dashboard = PharmacyDashboard {
            total_items: items.len(),
            low_stock: 0,
            out_of_stock: 0,
            verification_status: pharmacy.status,
        };
        for item in &items {
            match item.stock_status() {
                StockStatus::LowStock => dashboard.low_stock += 1,
                StockStatus::OutOfStock => dashboard.out_of_stock += 1,
                StockStatus::InStock => {}
            }
        }
        Ok(dashboard)
    }
}
