pub mod admin;
pub mod auth;
pub mod extract;
pub mod pharmacies;
pub mod search;
pub mod users;

use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::repositories::{
    SeaOrmInventoryRepository, SeaOrmPatientRepository, SeaOrmPharmacyRepository,
    SeaOrmSavedMedicineRepository,
};
use crate::services::{
    accounts::AccountService, inventory::InventoryService, patients::PatientService,
    pharmacies::PharmacyService, search::SearchService,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub search: Arc<SearchService>,
    pub inventory: Arc<InventoryService>,
    pub pharmacies: Arc<PharmacyService>,
    pub accounts: Arc<AccountService>,
    pub patients: Arc<PatientService>,
}

impl AppServices {
    /// Wires every service to the SeaORM repositories over one pool.
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender, search_fanout: usize) -> Self {
        let inventory_repo = Arc::new(SeaOrmInventoryRepository::new(db_pool.clone()));
        let pharmacy_repo = Arc::new(SeaOrmPharmacyRepository::new(db_pool.clone()));
        let patient_repo = Arc::new(SeaOrmPatientRepository::new(db_pool.clone()));
        let saved_repo = Arc::new(SeaOrmSavedMedicineRepository::new(db_pool.clone()));

        Self {
            search: Arc::new(SearchService::new(
                inventory_repo.clone(),
                pharmacy_repo.clone(),
                search_fanout,
            )),
            inventory: Arc::new(InventoryService::new(
                inventory_repo,
                pharmacy_repo.clone(),
                event_sender.clone(),
            )),
            pharmacies: Arc::new(PharmacyService::new(pharmacy_repo, event_sender.clone())),
            accounts: Arc::new(AccountService::new(db_pool, event_sender)),
            patients: Arc::new(PatientService::new(patient_repo, saved_repo)),
        }
    }
}
