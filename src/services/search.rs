use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::entities::pharmacy;
use crate::errors::ServiceError;
use crate::models::geo::maybe_distance_km;
use crate::models::{GeoPoint, MedicineOffer};
use crate::repositories::{InventoryRepository, PharmacyRepository};
use crate::services::ranking::{self, CompareSort, OfferFilter, PriceComparison, SortBy};

/// Joins matching inventory with verified pharmacies and measures distance
/// from the caller.
#[derive(Clone)]
pub struct SearchService {
    inventory: Arc<dyn InventoryRepository>,
    pharmacies: Arc<dyn PharmacyRepository>,
    fanout: usize,
}

impl SearchService {
    pub fn new(
        inventory: Arc<dyn InventoryRepository>,
        pharmacies: Arc<dyn PharmacyRepository>,
        fanout: usize,
    ) -> Self {
        Self {
            inventory,
            pharmacies,
            fanout: fanout.max(1),
        }
    }

    /// Finds every available item whose name starts with `term` at a
    /// verified pharmacy, in store order.
    ///
    /// Each distinct pharmacy is read once. A failed read fails the whole
    /// search; there are no partial results.
    #[instrument(skip(self), fields(results = tracing::field::Empty))]
    pub async fn search_medicines(
        &self,
        term: &str,
        user_location: Option<GeoPoint>,
    ) -> Result<Vec<MedicineOffer>, ServiceError> {
        let started = Instant::now();
        let result = self.search_inner(term, user_location).await;
        match &result {
            Ok(offers) => {
                tracing::Span::current().record("results", offers.len());
                crate::tracing::record_search("ok", offers.len(), started.elapsed());
            }
            Err(_) => crate::tracing::record_search("error", 0, started.elapsed()),
        }
        result
    }

    /// Search followed by filtering and sorting.
    pub async fn search_ranked(
        &self,
        term: &str,
        user_location: Option<GeoPoint>,
        filter: &OfferFilter,
        sort: SortBy,
    ) -> Result<Vec<MedicineOffer>, ServiceError> {
        let offers = self.search_medicines(term, user_location).await?;
        Ok(ranking::rank(offers, filter, sort))
    }

    /// Search followed by the price-comparison view.
    pub async fn compare_prices(
        &self,
        term: &str,
        user_location: Option<GeoPoint>,
        sort: CompareSort,
    ) -> Result<PriceComparison, ServiceError> {
        let offers = self.search_medicines(term, user_location).await?;
        Ok(ranking::compare(offers, sort))
    }

    async fn search_inner(
        &self,
        term: &str,
        user_location: Option<GeoPoint>,
    ) -> Result<Vec<MedicineOffer>, ServiceError> {
        if term.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "search term must not be empty".into(),
            ));
        }
        if let Some(loc) = &user_location {
            if !loc.is_valid() {
                return Err(ServiceError::ValidationError(
                    "location must have lat in [-90, 90] and lng in [-180, 180]".into(),
                ));
            }
        }

        let candidates = self.inventory.find_available_by_prefix(term).await?;
        debug!(candidates = candidates.len(), "prefix match");
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let mut seen = HashSet::new();
        let pharmacy_ids: Vec<Uuid> = candidates
            .iter()
            .map(|item| item.pharmacy_id)
            .filter(|id| seen.insert(*id))
            .collect();
        let pharmacies = self.load_pharmacies(pharmacy_ids).await?;

        let offers = candidates
            .into_iter()
            .filter_map(|item| {
                let pharmacy = pharmacies.get(&item.pharmacy_id)?;
                if !pharmacy.is_verified() {
                    return None;
                }
                let distance = maybe_distance_km(user_location.as_ref(), pharmacy.location().as_ref());
                Some(MedicineOffer::enrich(item, pharmacy, distance))
            })
            .collect();

        Ok(offers)
    }

    /// Fetches each pharmacy concurrently and waits for all of them.
    /// Ids with no stored profile are simply absent from the map.
    async fn load_pharmacies(
        &self,
        ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, pharmacy::Model>, ServiceError> {
        let repo = self.pharmacies.as_ref();
        stream::iter(ids)
            .map(|id| async move { repo.find_by_id(id).await })
            .buffer_unordered(self.fanout)
            .try_filter_map(|found| async move {
                Ok::<_, ServiceError>(found.map(|p| (p.id, p)))
            })
            .try_collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::inventory_item;
    use crate::entities::pharmacy::VerificationStatus;
    use crate::models::StockStatus;
    use crate::repositories::{MockInventoryRepository, MockPharmacyRepository};
    use assert_matches::assert_matches;
    use chrono::Utc;
    use mockall::predicate::eq;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use sea_orm::DbErr;

    fn pharmacy(status: VerificationStatus, location: Option<(f64, f64)>) -> pharmacy::Model {
        let now = Utc::now();
        pharmacy::Model {
            id: Uuid::new_v4(),
            email: "ph@example.com".into(),
            pharmacy_name: "City Pharmacy".into(),
            license_id: "LIC-1".into(),
            license_document_url: None,
            owner_name: "Owner".into(),
            phone: "0112345678".into(),
            address: "12 Galle Rd".into(),
            city: "Colombo".into(),
            district: "Colombo".into(),
            latitude: location.map(|l| l.0),
            longitude: location.map(|l| l.1),
            opening_hours: Some("Open 24 hours".into()),
            description: None,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    fn item(pharmacy_id: Uuid, name: &str, stock: i32) -> inventory_item::Model {
        inventory_item::Model {
            id: Uuid::new_v4(),
            pharmacy_id,
            medicine_id: format!("manual-{name}"),
            medicine_name: name.into(),
            price: Decimal::new(12050, 2),
            stock,
            low_stock_threshold: Some(50),
            available: stock > 0,
            category: None,
            description: None,
            last_updated: Utc::now(),
        }
    }

    fn service(inventory: MockInventoryRepository, pharmacies: MockPharmacyRepository) -> SearchService {
        SearchService::new(Arc::new(inventory), Arc::new(pharmacies), 4)
    }

    #[tokio::test]
    async fn enriches_verified_and_drops_pending() {
        let p1 = pharmacy(VerificationStatus::Verified, Some((6.93, 79.86)));
        let p2 = pharmacy(VerificationStatus::Pending, Some((6.95, 79.90)));
        let item1 = item(p1.id, "Paracetamol", 5);
        let item2 = item(p2.id, "Paracetamol 500", 100);
        let item1_id = item1.id;

        let mut inventory = MockInventoryRepository::new();
        inventory
            .expect_find_available_by_prefix()
            .times(1)
            .returning(move |_| Ok(vec![item1.clone(), item2.clone()]));

        let mut pharmacies = MockPharmacyRepository::new();
        let (p1c, p2c) = (p1.clone(), p2.clone());
        pharmacies
            .expect_find_by_id()
            .with(eq(p1.id))
            .times(1)
            .returning(move |_| Ok(Some(p1c.clone())));
        pharmacies
            .expect_find_by_id()
            .with(eq(p2.id))
            .times(1)
            .returning(move |_| Ok(Some(p2c.clone())));

        let offers = service(inventory, pharmacies)
            .search_medicines("Paracetamol", Some(GeoPoint::new(6.93, 79.86)))
            .await
            .unwrap();

        assert_eq!(offers.len(), 1);
        let offer = &offers[0];
        assert_eq!(offer.id, item1_id);
        assert_eq!(offer.stock_status, StockStatus::LowStock);
        assert_eq!(offer.pharmacy_name, "City Pharmacy");
        assert!(offer.distance_km.unwrap() < 1e-9);
    }

    #[rstest]
    #[case(VerificationStatus::Verified, 2)]
    #[case(VerificationStatus::Pending, 0)]
    #[case(VerificationStatus::Rejected, 0)]
    #[tokio::test]
    async fn only_verified_pharmacies_are_offered(
        #[case] status: VerificationStatus,
        #[case] expected: usize,
    ) {
        let p = pharmacy(status, Some((6.93, 79.86)));
        let stock = vec![item(p.id, "Zyrtec 10mg", 100), item(p.id, "Zyrtec syrup", 3)];

        let mut inventory = MockInventoryRepository::new();
        inventory
            .expect_find_available_by_prefix()
            .returning(move |_| Ok(stock.clone()));
        let mut pharmacies = MockPharmacyRepository::new();
        pharmacies
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(p.clone())));

        let offers = service(inventory, pharmacies)
            .search_medicines("Zyr", None)
            .await
            .unwrap();
        assert_eq!(offers.len(), expected);
        assert!(offers
            .iter()
            .all(|o| o.pharmacy_status == VerificationStatus::Verified));
    }

    #[tokio::test]
    async fn fetches_each_pharmacy_once() {
        let p1 = pharmacy(VerificationStatus::Verified, None);
        let items = vec![
            item(p1.id, "Amoxicillin 250", 10),
            item(p1.id, "Amoxicillin 500", 80),
            item(p1.id, "Amoxicillin syrup", 0),
        ];

        let mut inventory = MockInventoryRepository::new();
        inventory
            .expect_find_available_by_prefix()
            .returning(move |_| Ok(items.clone()));
        let mut pharmacies = MockPharmacyRepository::new();
        let p1c = p1.clone();
        pharmacies
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(p1c.clone())));

        let offers = service(inventory, pharmacies)
            .search_medicines("Amoxicillin", None)
            .await
            .unwrap();

        let names: Vec<_> = offers.iter().map(|o| o.medicine_name.as_str()).collect();
        assert_eq!(names, ["Amoxicillin 250", "Amoxicillin 500", "Amoxicillin syrup"]);
        assert!(offers.iter().all(|o| o.distance_km.is_none()));
        assert_eq!(offers[2].stock_status, StockStatus::OutOfStock);
    }

    #[tokio::test]
    async fn missing_pharmacy_is_excluded_silently() {
        let orphan = item(Uuid::new_v4(), "Cetirizine", 40);
        let mut inventory = MockInventoryRepository::new();
        inventory
            .expect_find_available_by_prefix()
            .returning(move |_| Ok(vec![orphan.clone()]));
        let mut pharmacies = MockPharmacyRepository::new();
        pharmacies.expect_find_by_id().returning(|_| Ok(None));

        let offers = service(inventory, pharmacies)
            .search_medicines("Cet", None)
            .await
            .unwrap();
        assert!(offers.is_empty());
    }

    #[tokio::test]
    async fn pharmacy_without_coordinate_has_null_distance() {
        let p = pharmacy(VerificationStatus::Verified, None);
        let it = item(p.id, "Ibuprofen", 70);
        let mut inventory = MockInventoryRepository::new();
        inventory
            .expect_find_available_by_prefix()
            .returning(move |_| Ok(vec![it.clone()]));
        let mut pharmacies = MockPharmacyRepository::new();
        pharmacies
            .expect_find_by_id()
            .returning(move |_| Ok(Some(p.clone())));

        let offers = service(inventory, pharmacies)
            .search_medicines("Ibu", Some(GeoPoint::new(6.9, 79.8)))
            .await
            .unwrap();
        assert_eq!(offers[0].distance_km, None);
        assert_eq!(offers[0].stock_status, StockStatus::InStock);
    }

    #[tokio::test]
    async fn read_failure_fails_whole_search() {
        let p1 = pharmacy(VerificationStatus::Verified, None);
        let p2_id = Uuid::new_v4();
        let items = vec![item(p1.id, "Aspirin", 60), item(p2_id, "Aspirin 75", 60)];

        let mut inventory = MockInventoryRepository::new();
        inventory
            .expect_find_available_by_prefix()
            .returning(move |_| Ok(items.clone()));
        let mut pharmacies = MockPharmacyRepository::new();
        pharmacies
            .expect_find_by_id()
            .with(eq(p1.id))
            .returning(move |_| Ok(Some(p1.clone())));
        pharmacies
            .expect_find_by_id()
            .with(eq(p2_id))
            .returning(|_| Err(ServiceError::DatabaseError(DbErr::Custom("timeout".into()))));

        let result = service(inventory, pharmacies)
            .search_medicines("Aspirin", None)
            .await;
        assert_matches!(result, Err(ServiceError::DatabaseError(_)));
    }

    #[tokio::test]
    async fn blank_term_is_rejected_before_any_read() {
        let mut inventory = MockInventoryRepository::new();
        inventory.expect_find_available_by_prefix().never();
        let result = service(inventory, MockPharmacyRepository::new())
            .search_medicines("   ", None)
            .await;
        assert_matches!(result, Err(ServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn out_of_range_location_is_rejected() {
        let result = service(MockInventoryRepository::new(), MockPharmacyRepository::new())
            .search_medicines("Para", Some(GeoPoint::new(120.0, 0.0)))
            .await;
        assert_matches!(result, Err(ServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn no_candidates_means_no_pharmacy_reads() {
        let mut inventory = MockInventoryRepository::new();
        inventory
            .expect_find_available_by_prefix()
            .returning(|_| Ok(Vec::new()));
        let mut pharmacies = MockPharmacyRepository::new();
        pharmacies.expect_find_by_id().never();

        let offers = service(inventory, pharmacies)
            .search_medicines("Zinc", None)
            .await
            .unwrap();
        assert!(offers.is_empty());
    }
}
