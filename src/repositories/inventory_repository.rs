use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::inventory_item::{self, Column, Entity as InventoryItem};
use crate::errors::ServiceError;

use super::InventoryRepository;

/// Exclusive upper bound appended to a search term to form a prefix range.
const PREFIX_RANGE_END: char = '\u{10FFFF}';

/// SeaORM-backed inventory storage
#[derive(Debug, Clone)]
pub struct SeaOrmInventoryRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmInventoryRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InventoryRepository for SeaOrmInventoryRepository {
    async fn find_available_by_prefix(
        &self,
        term: &str,
    ) -> Result<Vec<inventory_item::Model>, ServiceError> {
        let upper = format!("{}{}", term, PREFIX_RANGE_END);
        let rows = InventoryItem::find()
            .filter(Column::Available.eq(true))
            .filter(Column::MedicineName.gte(term))
            .filter(Column::MedicineName.lt(upper))
            .order_by_asc(Column::MedicineName)
            .order_by_asc(Column::Id)
            .all(&*self.db)
            .await?;

        // Backend collations may order strings differently from a raw
        // byte comparison; keep only true prefix matches.
        Ok(rows
            .into_iter()
            .filter(|item| item.medicine_name.starts_with(term))
            .collect())
    }

    async fn list_for_pharmacy(
        &self,
        pharmacy_id: Uuid,
    ) -> Result<Vec<inventory_item::Model>, ServiceError> {
        Ok(InventoryItem::find()
            .filter(Column::PharmacyId.eq(pharmacy_id))
            .order_by_asc(Column::MedicineName)
            .order_by_asc(Column::Id)
            .all(&*self.db)
            .await?)
    }

    async fn find_for_pharmacy(
        &self,
        pharmacy_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<inventory_item::Model>, ServiceError> {
        Ok(InventoryItem::find_by_id(item_id)
            .filter(Column::PharmacyId.eq(pharmacy_id))
            .one(&*self.db)
            .await?)
    }

    async fn insert(
        &self,
        item: inventory_item::Model,
    ) -> Result<inventory_item::Model, ServiceError> {
        Ok(item.into_active_model().reset_all().insert(&*self.db).await?)
    }

    async fn update(
        &self,
        item: inventory_item::Model,
    ) -> Result<inventory_item::Model, ServiceError> {
        Ok(item.into_active_model().reset_all().update(&*self.db).await?)
    }

    async fn delete_for_pharmacy(
        &self,
        pharmacy_id: Uuid,
        item_id: Uuid,
    ) -> Result<bool, ServiceError> {
        let result = InventoryItem::delete_many()
            .filter(Column::Id.eq(item_id))
            .filter(Column::PharmacyId.eq(pharmacy_id))
            .exec(&*self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
