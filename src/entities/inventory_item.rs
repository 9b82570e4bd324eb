use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::stock_status::StockStatus;

/// One medicine line in a pharmacy's stock.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "inventory_items")]
#[schema(as = InventoryItem)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub pharmacy_id: Uuid,
    pub medicine_id: String,
    pub medicine_name: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,
    pub stock: i32,
    pub low_stock_threshold: Option<i32>,
    pub available: bool,
    pub category: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub last_updated: DateTime<Utc>,
}

impl Model {
    /// Display status computed from stock and threshold; the stored
    /// `available` flag is never consulted.
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::classify(self.stock, self.low_stock_threshold)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pharmacy::Entity",
        from = "Column::PharmacyId",
        to = "super::pharmacy::Column::Id",
        on_delete = "Cascade"
    )]
    Pharmacy,
}

impl Related<super::pharmacy::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pharmacy.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
