use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MedFinder API",
        version = "1.0.0",
        description = r#"
# MedFinder API

Find which verified pharmacies stock a medicine, at what price, and how far away.

## Authentication

Protected endpoints take a bearer token issued by `/auth/login` or one of the
registration endpoints:

```
Authorization: Bearer <token>
```

## Roles

- **personal**: profile and saved medicines under `/api/v1/users/me`
- **pharmacy**: own profile, dashboard and inventory under `/api/v1/pharmacy`
- **admin**: the verification queue under `/api/v1/admin`

Search and public pharmacy pages need no token.
"#,
        license(name = "MIT"),
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "search", description = "Medicine search and price comparison"),
        (name = "pharmacies", description = "Public pharmacy pages"),
        (name = "pharmacy", description = "Signed-in pharmacy: profile, dashboard, inventory"),
        (name = "users", description = "Signed-in personal user: profile and saved medicines"),
        (name = "admin", description = "Pharmacy verification"),
        (name = "auth", description = "Registration, sign-in and sessions"),
    ),
    paths(
        crate::handlers::search::search_medicines,
        crate::handlers::search::compare_prices,

        crate::handlers::pharmacies::get_public_pharmacy,
        crate::handlers::pharmacies::get_profile,
        crate::handlers::pharmacies::update_profile,
        crate::handlers::pharmacies::dashboard,
        crate::handlers::pharmacies::list_inventory,
        crate::handlers::pharmacies::create_item,
        crate::handlers::pharmacies::update_item,
        crate::handlers::pharmacies::delete_item,

        crate::handlers::users::get_me,
        crate::handlers::users::update_me,
        crate::handlers::users::list_saved,
        crate::handlers::users::save_medicine,
        crate::handlers::users::remove_saved,

        crate::handlers::admin::list_pharmacies,
        crate::handlers::admin::verify_pharmacy,

        crate::handlers::auth::register_personal,
        crate::handlers::auth::register_pharmacy,
        crate::handlers::auth::login,
        crate::handlers::auth::logout,
        crate::handlers::auth::me,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,
            crate::ResponseMeta,

            crate::models::MedicineOffer,
            crate::models::GeoPoint,
            crate::models::StockStatus,
            crate::models::AppUser,
            crate::models::AccountSummary,
            crate::services::ranking::SortBy,
            crate::services::ranking::CompareSort,
            crate::services::ranking::PriceComparison,

            crate::entities::pharmacy::Model,
            crate::entities::pharmacy::VerificationStatus,
            crate::entities::inventory_item::Model,
            crate::entities::patient::Model,
            crate::entities::saved_medicine::Model,

            crate::services::inventory::InventoryItemInput,
            crate::services::inventory::StockFilter,
            crate::services::inventory::StockRow,
            crate::services::inventory::PharmacyDashboard,
            crate::services::pharmacies::PharmacyProfileUpdate,
            crate::services::pharmacies::VerificationDecision,
            crate::services::pharmacies::VerifyPharmacyRequest,
            crate::services::patients::PatientProfileUpdate,
            crate::services::patients::SaveMedicineRequest,
            crate::services::accounts::LoginRequest,
            crate::services::accounts::RegisterPersonalRequest,
            crate::services::accounts::RegisterPharmacyRequest,
            crate::auth::AccessToken,
            crate::auth::UserRole,
            crate::handlers::auth::AuthSession,

            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_search_and_bearer_scheme() {
        let json = serde_json::to_string(&ApiDocV1::openapi()).unwrap();
        assert!(json.contains("MedFinder API"));
        assert!(json.contains("/api/v1/medicines/search"));
        assert!(json.contains("/api/v1/admin/pharmacies/{id}/verify"));
        assert!(json.contains("bearer_auth"));
    }

    #[test]
    fn entity_schemas_are_registered_with_timestamps() {
        let doc = serde_json::to_value(ApiDocV1::openapi()).unwrap();
        let schemas = &doc["components"]["schemas"];
        for name in ["Pharmacy", "PatientProfile", "InventoryItem", "SavedMedicine", "AppUser"] {
            assert!(schemas.get(name).is_some(), "missing schema {name}");
        }
        let created_at = &schemas["Pharmacy"]["properties"]["created_at"];
        assert_eq!(created_at["type"], "string");
        assert_eq!(created_at["format"], "date-time");
    }
}
