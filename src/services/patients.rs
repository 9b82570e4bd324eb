use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::{patient, saved_medicine};
use crate::errors::ServiceError;
use crate::repositories::{PatientRepository, SavedMedicineRepository};

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct PatientProfileUpdate {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(length(max = 32))]
    #[serde(default)]
    pub phone: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub city: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub district: String,
}

/// Snapshot of a search result to bookmark.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct SaveMedicineRequest {
    #[serde(default)]
    pub inventory_item_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub medicine_name: String,
    #[serde(default)]
    pub pharmacy_id: Option<Uuid>,
    #[serde(default)]
    pub pharmacy_name: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "120.50")]
    pub price: Option<Decimal>,
}

/// Personal user profile and saved medicines.
#[derive(Clone)]
pub struct PatientService {
    patients: Arc<dyn PatientRepository>,
    saved: Arc<dyn SavedMedicineRepository>,
}

impl PatientService {
    pub fn new(
        patients: Arc<dyn PatientRepository>,
        saved: Arc<dyn SavedMedicineRepository>,
    ) -> Self {
        Self { patients, saved }
    }

    #[instrument(skip(self))]
    pub async fn get_profile(&self, patient_id: Uuid) -> Result<patient::Model, ServiceError> {
        self.patients
            .find_by_id(patient_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Patient profile", patient_id))
    }

    #[instrument(skip(self, update))]
    pub async fn update_profile(
        &self,
        patient_id: Uuid,
        update: PatientProfileUpdate,
    ) -> Result<patient::Model, ServiceError> {
        update.validate()?;
        let mut profile = self.get_profile(patient_id).await?;
        profile.full_name = update.full_name.trim().to_string();
        profile.phone = update.phone;
        profile.city = update.city;
        profile.district = update.district;
        profile.updated_at = Utc::now();
        self.patients.update(profile).await
    }

    #[instrument(skip(self))]
    pub async fn list_saved(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<saved_medicine::Model>, ServiceError> {
        self.saved.list_for_patient(patient_id).await
    }

    #[instrument(skip(self, request))]
    pub async fn save(
        &self,
        patient_id: Uuid,
        request: SaveMedicineRequest,
    ) -> Result<saved_medicine::Model, ServiceError> {
        request.validate()?;
        if request.price.map_or(false, |p| p.is_sign_negative() && !p.is_zero()) {
            return Err(ServiceError::ValidationError(
                "price must be zero or greater".into(),
            ));
        }

        self.saved
            .insert(saved_medicine::Model {
                id: Uuid::new_v4(),
                patient_id,
                inventory_item_id: request.inventory_item_id,
                medicine_name: request.medicine_name,
                pharmacy_id: request.pharmacy_id,
                pharmacy_name: request.pharmacy_name,
                price: request.price,
                saved_at: Utc::now(),
            })
            .await
    }

    /// Only the owner's rows can be removed; anything else is not found.
    #[instrument(skip(self))]
    pub async fn remove_saved(&self, patient_id: Uuid, saved_id: Uuid) -> Result<(), ServiceError> {
        if self.saved.delete_for_patient(patient_id, saved_id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found("Saved medicine", saved_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MockPatientRepository, MockSavedMedicineRepository};
    use assert_matches::assert_matches;
    use mockall::predicate::eq;
    use rust_decimal_macros::dec;

    fn request(name: &str, price: Option<Decimal>) -> SaveMedicineRequest {
        SaveMedicineRequest {
            inventory_item_id: Some(Uuid::new_v4()),
            medicine_name: name.into(),
            pharmacy_id: None,
            pharmacy_name: Some("City Pharmacy".into()),
            price,
        }
    }

    #[tokio::test]
    async fn save_snapshots_for_owner() {
        let patient_id = Uuid::new_v4();
        let mut saved = MockSavedMedicineRepository::new();
        saved.expect_insert().times(1).returning(Ok);

        let service = PatientService::new(Arc::new(MockPatientRepository::new()), Arc::new(saved));
        let row = service
            .save(patient_id, request("Paracetamol", Some(dec!(45.00))))
            .await
            .unwrap();
        assert_eq!(row.patient_id, patient_id);
        assert_eq!(row.price, Some(dec!(45.00)));
    }

    #[tokio::test]
    async fn save_rejects_negative_price() {
        let mut saved = MockSavedMedicineRepository::new();
        saved.expect_insert().never();
        let service = PatientService::new(Arc::new(MockPatientRepository::new()), Arc::new(saved));
        let result = service
            .save(Uuid::new_v4(), request("Paracetamol", Some(dec!(-1))))
            .await;
        assert_matches!(result, Err(ServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn removing_someone_elses_row_is_not_found() {
        let (owner, row) = (Uuid::new_v4(), Uuid::new_v4());
        let mut saved = MockSavedMedicineRepository::new();
        saved
            .expect_delete_for_patient()
            .with(eq(owner), eq(row))
            .returning(|_, _| Ok(false));
        let service = PatientService::new(Arc::new(MockPatientRepository::new()), Arc::new(saved));
        assert_matches!(
            service.remove_saved(owner, row).await,
            Err(ServiceError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let mut patients = MockPatientRepository::new();
        patients.expect_find_by_id().returning(|_| Ok(None));
        let service =
            PatientService::new(Arc::new(patients), Arc::new(MockSavedMedicineRepository::new()));
        assert_matches!(
            service.get_profile(Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        );
    }
}
