//! Storage seams. Services depend on these traits; the SeaORM
//! implementations live alongside them.

use async_trait::async_trait;
use uuid::Uuid;

use crate::entities::{inventory_item, patient, pharmacy, saved_medicine};
use crate::entities::pharmacy::VerificationStatus;
use crate::errors::ServiceError;

pub mod inventory_repository;
pub mod patient_repository;
pub mod pharmacy_repository;

pub use inventory_repository::SeaOrmInventoryRepository;
pub use patient_repository::{SeaOrmPatientRepository, SeaOrmSavedMedicineRepository};
pub use pharmacy_repository::SeaOrmPharmacyRepository;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Available items whose name starts with `term` (case-sensitive), in name order.
    async fn find_available_by_prefix(
        &self,
        term: &str,
    ) -> Result<Vec<inventory_item::Model>, ServiceError>;

    async fn list_for_pharmacy(
        &self,
        pharmacy_id: Uuid,
    ) -> Result<Vec<inventory_item::Model>, ServiceError>;

    async fn find_for_pharmacy(
        &self,
        pharmacy_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<inventory_item::Model>, ServiceError>;

    async fn insert(&self, item: inventory_item::Model)
        -> Result<inventory_item::Model, ServiceError>;

    async fn update(&self, item: inventory_item::Model)
        -> Result<inventory_item::Model, ServiceError>;

    /// Returns false when no row owned by `pharmacy_id` matched.
    async fn delete_for_pharmacy(
        &self,
        pharmacy_id: Uuid,
        item_id: Uuid,
    ) -> Result<bool, ServiceError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PharmacyRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<pharmacy::Model>, ServiceError>;

    async fn find_by_status(
        &self,
        status: VerificationStatus,
    ) -> Result<Vec<pharmacy::Model>, ServiceError>;

    /// Saves profile fields. The stored verification status is left untouched.
    async fn update(&self, pharmacy: pharmacy::Model) -> Result<pharmacy::Model, ServiceError>;

    /// Sets `to` only while the stored status is still `from`.
    /// Returns `None` when another writer changed the status first.
    async fn transition_status(
        &self,
        id: Uuid,
        from: VerificationStatus,
        to: VerificationStatus,
    ) -> Result<Option<pharmacy::Model>, ServiceError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatientRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<patient::Model>, ServiceError>;

    async fn update(&self, patient: patient::Model) -> Result<patient::Model, ServiceError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SavedMedicineRepository: Send + Sync {
    async fn list_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<saved_medicine::Model>, ServiceError>;

    async fn insert(
        &self,
        saved: saved_medicine::Model,
    ) -> Result<saved_medicine::Model, ServiceError>;

    async fn delete_for_patient(&self, patient_id: Uuid, id: Uuid) -> Result<bool, ServiceError>;
}
