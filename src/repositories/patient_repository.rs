use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::patient::{self, Entity as Patient};
use crate::entities::saved_medicine::{self, Entity as SavedMedicine};
use crate::errors::ServiceError;

use super::{PatientRepository, SavedMedicineRepository};

#[derive(Debug, Clone)]
pub struct SeaOrmPatientRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmPatientRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PatientRepository for SeaOrmPatientRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<patient::Model>, ServiceError> {
        Ok(Patient::find_by_id(id).one(&*self.db).await?)
    }

    async fn update(&self, patient: patient::Model) -> Result<patient::Model, ServiceError> {
        Ok(patient
            .into_active_model()
            .reset_all()
            .update(&*self.db)
            .await?)
    }
}

#[derive(Debug, Clone)]
pub struct SeaOrmSavedMedicineRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmSavedMedicineRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SavedMedicineRepository for SeaOrmSavedMedicineRepository {
    async fn list_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<saved_medicine::Model>, ServiceError> {
        Ok(SavedMedicine::find()
            .filter(saved_medicine::Column::PatientId.eq(patient_id))
            .order_by_desc(saved_medicine::Column::SavedAt)
            .all(&*self.db)
            .await?)
    }

    async fn insert(
        &self,
        saved: saved_medicine::Model,
    ) -> Result<saved_medicine::Model, ServiceError> {
        Ok(saved.into_active_model().reset_all().insert(&*self.db).await?)
    }

    async fn delete_for_patient(&self, patient_id: Uuid, id: Uuid) -> Result<bool, ServiceError> {
        let result = SavedMedicine::delete_many()
            .filter(saved_medicine::Column::Id.eq(id))
            .filter(saved_medicine::Column::PatientId.eq(patient_id))
            .exec(&*self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
