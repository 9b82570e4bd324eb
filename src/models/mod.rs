pub mod app_user;
pub mod geo;
pub mod offer;
pub mod stock_status;

pub use app_user::{AccountSummary, AppUser};
pub use geo::GeoPoint;
pub use offer::MedicineOffer;
pub use stock_status::{StockStatus, DEFAULT_LOW_STOCK_THRESHOLD};
