use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Profile of a personal (non-pharmacy) user.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "patients")]
#[schema(as = PatientProfile)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub city: String,
    pub district: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::saved_medicine::Entity")]
    SavedMedicine,
}

impl Related<super::saved_medicine::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SavedMedicine.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
