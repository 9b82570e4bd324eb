use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{patient, pharmacy};

/// Minimal view of an account that has no domain profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AccountSummary {
    pub id: Uuid,
    pub email: String,
}

/// The signed-in user, resolved to the profile that matches their role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum AppUser {
    Personal {
        #[schema(value_type = patient::Model)]
        profile: patient::Model,
    },
    Pharmacy {
        #[schema(value_type = pharmacy::Model)]
        profile: pharmacy::Model,
    },
    Admin {
        account: AccountSummary,
    },
}

impl AppUser {
    pub fn id(&self) -> Uuid {
        match self {
            AppUser::Personal { profile } => profile.id,
            AppUser::Pharmacy { profile } => profile.id,
            AppUser::Admin { account } => account.id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            AppUser::Personal { profile } => &profile.email,
            AppUser::Pharmacy { profile } => &profile.email,
            AppUser::Admin { account } => &account.email,
        }
    }

    /// Name to greet the user with.
    pub fn display_name(&self) -> &str {
        match self {
            AppUser::Personal { profile } => &profile.full_name,
            AppUser::Pharmacy { profile } => &profile.pharmacy_name,
            AppUser::Admin { account } => &account.email,
        }
    }
}
