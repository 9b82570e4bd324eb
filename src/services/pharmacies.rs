use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::entities::pharmacy::{self, VerificationStatus};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::GeoPoint;
use crate::repositories::PharmacyRepository;

/// Self-editable pharmacy fields. Status and id are not editable here.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct PharmacyProfileUpdate {
    #[validate(length(min = 1, max = 200))]
    pub pharmacy_name: String,
    #[validate(length(min = 1, max = 100))]
    pub license_id: String,
    #[serde(default)]
    pub license_document_url: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub owner_name: String,
    #[validate(length(min = 1, max = 32))]
    pub phone: String,
    #[validate(length(min = 1, max = 500))]
    pub address: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 100))]
    pub district: String,
    /// Both halves or neither
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub opening_hours: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Outcome an administrator can assign to a pending pharmacy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VerificationDecision {
    Verified,
    Rejected,
}

impl From<VerificationDecision> for VerificationStatus {
    fn from(decision: VerificationDecision) -> Self {
        match decision {
            VerificationDecision::Verified => VerificationStatus::Verified,
            VerificationDecision::Rejected => VerificationStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct VerifyPharmacyRequest {
    pub status: VerificationDecision,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct PharmacyStatusQuery {
    /// pending (default) | verified | rejected
    pub status: Option<VerificationStatus>,
}

pub(crate) fn check_location(location: Option<&GeoPoint>) -> Result<(), ServiceError> {
    match location {
        Some(loc) if !loc.is_valid() => Err(ServiceError::ValidationError(
            "location must have lat in [-90, 90] and lng in [-180, 180]".into(),
        )),
        _ => Ok(()),
    }
}

/// Pharmacy profiles and the administrator verification queue.
#[derive(Clone)]
pub struct PharmacyService {
    repo: Arc<dyn PharmacyRepository>,
    event_sender: EventSender,
}

impl PharmacyService {
    pub fn new(repo: Arc<dyn PharmacyRepository>, event_sender: EventSender) -> Self {
        Self { repo, event_sender }
    }

    #[instrument(skip(self))]
    pub async fn get_profile(&self, pharmacy_id: Uuid) -> Result<pharmacy::Model, ServiceError> {
        self.repo
            .find_by_id(pharmacy_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Pharmacy", pharmacy_id))
    }

    /// Public view: unverified pharmacies are indistinguishable from missing ones.
    #[instrument(skip(self))]
    pub async fn public_profile(&self, pharmacy_id: Uuid) -> Result<pharmacy::Model, ServiceError> {
        match self.repo.find_by_id(pharmacy_id).await? {
            Some(p) if p.is_verified() => Ok(p),
            _ => Err(ServiceError::not_found("Pharmacy", pharmacy_id)),
        }
    }

    #[instrument(skip(self, update))]
    pub async fn update_profile(
        &self,
        pharmacy_id: Uuid,
        update: PharmacyProfileUpdate,
    ) -> Result<pharmacy::Model, ServiceError> {
        update.validate()?;
        check_location(update.location.as_ref())?;

        let mut profile = self.get_profile(pharmacy_id).await?;
        profile.pharmacy_name = update.pharmacy_name;
        profile.license_id = update.license_id;
        profile.license_document_url = update.license_document_url;
        profile.owner_name = update.owner_name;
        profile.phone = update.phone;
        profile.address = update.address;
        profile.city = update.city;
        profile.district = update.district;
        profile.latitude = update.location.map(|l| l.lat);
        profile.longitude = update.location.map(|l| l.lng);
        profile.opening_hours = update.opening_hours;
        profile.description = update.description;
        profile.updated_at = Utc::now();

        self.repo.update(profile).await
    }

    #[instrument(skip(self))]
    pub async fn pharmacies_by_status(
        &self,
        status: VerificationStatus,
    ) -> Result<Vec<pharmacy::Model>, ServiceError> {
        self.repo.find_by_status(status).await
    }

    /// Moves a pending pharmacy to a terminal status.
    ///
    /// Re-applying the status a pharmacy already has is a no-op. Any other
    /// move out of a terminal status is a conflict.
    #[instrument(skip(self))]
    pub async fn verify_pharmacy(
        &self,
        pharmacy_id: Uuid,
        decision: VerificationDecision,
    ) -> Result<pharmacy::Model, ServiceError> {
        let profile = self.get_profile(pharmacy_id).await?;
        let target = VerificationStatus::from(decision);
        let current = profile.status;

        if current == target {
            return Ok(profile);
        }
        if current.is_terminal() {
            return Err(Self::terminal_conflict(pharmacy_id, current, target));
        }

        let saved = match self.repo.transition_status(pharmacy_id, current, target).await? {
            Some(saved) => saved,
            None => {
                // Another decision landed between the read and the write.
                let latest = self.get_profile(pharmacy_id).await?;
                if latest.status == target {
                    return Ok(latest);
                }
                return Err(Self::terminal_conflict(pharmacy_id, latest.status, target));
            }
        };

        info!(%pharmacy_id, from = %current, to = %target, "pharmacy verification changed");
        self.event_sender
            .send_or_log(Event::PharmacyVerificationChanged {
                pharmacy_id,
                old_status: current,
                new_status: target,
            })
            .await;
        Ok(saved)
    }

    fn terminal_conflict(
        pharmacy_id: Uuid,
        current: VerificationStatus,
        target: VerificationStatus,
    ) -> ServiceError {
        warn!(%current, %target, "rejected verification transition");
        ServiceError::Conflict(format!("pharmacy {} is already {}", pharmacy_id, current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MockPharmacyRepository;
    use assert_matches::assert_matches;
    use rstest::rstest;

    fn profile(status: VerificationStatus) -> pharmacy::Model {
        let now = Utc::now();
        pharmacy::Model {
            id: Uuid::new_v4(),
            email: "ph@example.com".into(),
            pharmacy_name: "Lanka Pharmacy".into(),
            license_id: "NMRA-77".into(),
            license_document_url: None,
            owner_name: "S. Perera".into(),
            phone: "0771234567".into(),
            address: "3 Temple Rd".into(),
            city: "Kandy".into(),
            district: "Kandy".into(),
            latitude: None,
            longitude: None,
            opening_hours: None,
            description: None,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    fn service_with(current: pharmacy::Model, expect_transition: bool) -> PharmacyService {
        let mut repo = MockPharmacyRepository::new();
        let stored = current.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        if expect_transition {
            repo.expect_transition_status()
                .times(1)
                .returning(move |_, _, to| {
                    Ok(Some(pharmacy::Model {
                        status: to,
                        ..current.clone()
                    }))
                });
        } else {
            repo.expect_transition_status().never();
        }
        repo.expect_update().never();
        let (events, _rx) = crate::events::channel(8);
        PharmacyService::new(Arc::new(repo), events)
    }

    /// The first read sees `pending`, then a concurrent decision stores `decided`.
    fn service_losing_race(pending: pharmacy::Model, decided: VerificationStatus) -> PharmacyService {
        let mut repo = MockPharmacyRepository::new();
        let mut seq = mockall::Sequence::new();
        let first = pending.clone();
        repo.expect_find_by_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(Some(first.clone())));
        repo.expect_transition_status()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(None));
        repo.expect_find_by_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| {
                Ok(Some(pharmacy::Model {
                    status: decided,
                    ..pending.clone()
                }))
            });
        let (events, _rx) = crate::events::channel(8);
        PharmacyService::new(Arc::new(repo), events)
    }

    #[rstest]
    #[case(VerificationDecision::Verified, VerificationStatus::Verified)]
    #[case(VerificationDecision::Rejected, VerificationStatus::Rejected)]
    #[tokio::test]
    async fn pending_moves_to_decision(
        #[case] decision: VerificationDecision,
        #[case] expected: VerificationStatus,
    ) {
        let p = profile(VerificationStatus::Pending);
        let id = p.id;
        let saved = service_with(p, true)
            .verify_pharmacy(id, decision)
            .await
            .unwrap();
        assert_eq!(saved.status, expected);
    }

    #[tokio::test]
    async fn reapplying_terminal_status_is_noop() {
        let p = profile(VerificationStatus::Verified);
        let id = p.id;
        let saved = service_with(p, false)
            .verify_pharmacy(id, VerificationDecision::Verified)
            .await
            .unwrap();
        assert_eq!(saved.status, VerificationStatus::Verified);
    }

    #[rstest]
    #[case(VerificationStatus::Verified, VerificationDecision::Rejected)]
    #[case(VerificationStatus::Rejected, VerificationDecision::Verified)]
    #[tokio::test]
    async fn leaving_terminal_status_conflicts(
        #[case] current: VerificationStatus,
        #[case] decision: VerificationDecision,
    ) {
        let p = profile(current);
        let id = p.id;
        let result = service_with(p, false).verify_pharmacy(id, decision).await;
        assert_matches!(result, Err(ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn concurrent_opposite_decision_conflicts() {
        let p = profile(VerificationStatus::Pending);
        let id = p.id;
        let result = service_losing_race(p, VerificationStatus::Rejected)
            .verify_pharmacy(id, VerificationDecision::Verified)
            .await;
        assert_matches!(result, Err(ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn concurrent_identical_decision_is_noop() {
        let p = profile(VerificationStatus::Pending);
        let id = p.id;
        let saved = service_losing_race(p, VerificationStatus::Verified)
            .verify_pharmacy(id, VerificationDecision::Verified)
            .await
            .unwrap();
        assert_eq!(saved.status, VerificationStatus::Verified);
    }

    #[rstest]
    #[case(VerificationStatus::Pending)]
    #[case(VerificationStatus::Rejected)]
    #[tokio::test]
    async fn public_profile_hides_unverified(#[case] status: VerificationStatus) {
        let p = profile(status);
        let id = p.id;
        let result = service_with(p, false).public_profile(id).await;
        assert_matches!(result, Err(ServiceError::NotFound(_)));
    }
}
