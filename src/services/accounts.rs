use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::AuthError;
use crate::auth::user::{self, Entity as User, UserRole};
use crate::entities::pharmacy::VerificationStatus;
use crate::entities::{patient, pharmacy};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{AccountSummary, AppUser, GeoPoint};
use crate::services::pharmacies::check_location;

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct RegisterPersonalRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct RegisterPharmacyRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
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
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub opening_hours: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Account lifecycle: registration, sign-in and profile resolution.
#[derive(Clone)]
pub struct AccountService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl AccountService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    async fn ensure_email_free<C: sea_orm::ConnectionTrait>(
        conn: &C,
        email: &str,
    ) -> Result<(), ServiceError> {
        let existing = User::find()
            .filter(user::Column::Email.eq(email))
            .one(conn)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "an account with email {} already exists",
                email
            )));
        }
        Ok(())
    }

    fn new_account(email: String, password_hash: String, role: UserRole) -> user::ActiveModel {
        let now = Utc::now();
        user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(password_hash),
            role: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    /// Creates a personal account and its profile in one transaction.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register_personal(
        &self,
        request: RegisterPersonalRequest,
    ) -> Result<(user::Model, AppUser), ServiceError> {
        request.validate()?;
        let email = normalize_email(&request.email);
        let password_hash = hash_password(&request.password)?;

        let txn = self.db.begin().await?;
        Self::ensure_email_free(&txn, &email).await?;

        let account = Self::new_account(email.clone(), password_hash, UserRole::Personal)
            .insert(&txn)
            .await?;
        let now = Utc::now();
        let profile = patient::ActiveModel {
            id: Set(account.id),
            email: Set(email),
            full_name: Set(request.full_name.trim().to_string()),
            phone: Set(request.phone.unwrap_or_default()),
            city: Set(request.city.unwrap_or_default()),
            district: Set(request.district.unwrap_or_default()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(user_id = %account.id, "personal account registered");
        self.event_sender
            .send_or_log(Event::PatientRegistered(account.id))
            .await;
        Ok((account, AppUser::Personal { profile }))
    }

    /// Creates a pharmacy account whose profile starts out `pending`.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register_pharmacy(
        &self,
        request: RegisterPharmacyRequest,
    ) -> Result<(user::Model, AppUser), ServiceError> {
        request.validate()?;
        check_location(request.location.as_ref())?;
        let email = normalize_email(&request.email);
        let password_hash = hash_password(&request.password)?;

        let txn = self.db.begin().await?;
        Self::ensure_email_free(&txn, &email).await?;

        let account = Self::new_account(email.clone(), password_hash, UserRole::Pharmacy)
            .insert(&txn)
            .await?;
        let now = Utc::now();
        let profile = pharmacy::ActiveModel {
            id: Set(account.id),
            email: Set(email),
            pharmacy_name: Set(request.pharmacy_name.trim().to_string()),
            license_id: Set(request.license_id),
            license_document_url: Set(request.license_document_url),
            owner_name: Set(request.owner_name),
            phone: Set(request.phone),
            address: Set(request.address),
            city: Set(request.city),
            district: Set(request.district),
            latitude: Set(request.location.map(|l| l.lat)),
            longitude: Set(request.location.map(|l| l.lng)),
            opening_hours: Set(request.opening_hours),
            description: Set(request.description),
            status: Set(VerificationStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(user_id = %account.id, "pharmacy account registered");
        self.event_sender
            .send_or_log(Event::PharmacyRegistered(account.id))
            .await;
        Ok((account, AppUser::Pharmacy { profile }))
    }

    /// Verifies credentials. Unknown email and wrong password are
    /// indistinguishable to the caller.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn authenticate(&self, request: &LoginRequest) -> Result<user::Model, ServiceError> {
        request.validate()?;
        let email = normalize_email(&request.email);
        let invalid = || ServiceError::from(AuthError::InvalidCredentials);

        let account = User::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&request.password, &account.password_hash)? {
            warn!(user_id = %account.id, "failed sign-in");
            return Err(invalid());
        }
        Ok(account)
    }

    /// Resolves an account id to the role-specific view of the user.
    #[instrument(skip(self))]
    pub async fn current_user(&self, user_id: Uuid) -> Result<AppUser, ServiceError> {
        let account = User::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id))?;
        self.resolve(account).await
    }

    pub async fn resolve(&self, account: user::Model) -> Result<AppUser, ServiceError> {
        match account.role {
            UserRole::Personal => {
                let profile = patient::Entity::find_by_id(account.id)
                    .one(&*self.db)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Patient profile", account.id))?;
                Ok(AppUser::Personal { profile })
            }
            UserRole::Pharmacy => {
                let profile = pharmacy::Entity::find_by_id(account.id)
                    .one(&*self.db)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Pharmacy", account.id))?;
                Ok(AppUser::Pharmacy { profile })
            }
            UserRole::Admin => Ok(AppUser::Admin {
                account: AccountSummary {
                    id: account.id,
                    email: account.email,
                },
            }),
        }
    }

    /// Makes sure the configured administrator account exists.
    ///
    /// An existing admin keeps its stored password. An existing non-admin
    /// account with the same email is left alone and reported as a conflict.
    #[instrument(skip(self, password))]
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<user::Model, ServiceError> {
        let email = normalize_email(email);
        if let Some(existing) = User::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .one(&*self.db)
            .await?
        {
            if existing.role != UserRole::Admin {
                return Err(ServiceError::Conflict(format!(
                    "{} is registered as a {} account",
                    email, existing.role
                )));
            }
            return Ok(existing);
        }

        let account = Self::new_account(email, hash_password(password)?, UserRole::Admin)
            .insert(&*self.db)
            .await?;
        info!(user_id = %account.id, "administrator account provisioned");
        Ok(account)
    }
}
