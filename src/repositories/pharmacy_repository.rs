use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Value,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::pharmacy::{self, Column, Entity as Pharmacy, VerificationStatus};
use crate::errors::ServiceError;

use super::PharmacyRepository;

#[derive(Debug, Clone)]
pub struct SeaOrmPharmacyRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmPharmacyRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PharmacyRepository for SeaOrmPharmacyRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<pharmacy::Model>, ServiceError> {
        Ok(Pharmacy::find_by_id(id).one(&*self.db).await?)
    }

    async fn find_by_status(
        &self,
        status: VerificationStatus,
    ) -> Result<Vec<pharmacy::Model>, ServiceError> {
        Ok(Pharmacy::find()
            .filter(Column::Status.eq(status))
            .order_by_asc(Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    async fn update(&self, pharmacy: pharmacy::Model) -> Result<pharmacy::Model, ServiceError> {
        let mut active = pharmacy.into_active_model().reset_all();
        active.status = NotSet;
        Ok(active.update(&*self.db).await?)
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: VerificationStatus,
        to: VerificationStatus,
    ) -> Result<Option<pharmacy::Model>, ServiceError> {
        let result = Pharmacy::update_many()
            .col_expr(Column::Status, Expr::value(Into::<Value>::into(to)))
            .col_expr(Column::UpdatedAt, Expr::value(Value::from(Utc::now())))
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(from))
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }
}
