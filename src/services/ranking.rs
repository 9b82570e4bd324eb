//! Caller-side presentation of search results: sorting, filtering and the
//! price-comparison view. Nothing here touches storage, and nothing here
//! changes an offer's stock status.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{MedicineOffer, StockStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Store order
    #[default]
    Default,
    PriceAsc,
    PriceDesc,
    /// Nearest first; offers without a distance go last
    Distance,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CompareSort {
    #[default]
    Price,
    Distance,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OfferFilter {
    pub in_stock_only: bool,
    pub open_now: bool,
}

impl OfferFilter {
    pub fn matches(&self, offer: &MedicineOffer) -> bool {
        if self.in_stock_only && offer.stock_status != StockStatus::InStock {
            return false;
        }
        if self.open_now && !is_open_now(offer.opening_hours.as_deref()) {
            return false;
        }
        true
    }
}

/// Best-effort reading of free-text opening hours. Unknown hours count as closed.
pub fn is_open_now(opening_hours: Option<&str>) -> bool {
    match opening_hours {
        Some(hours) => hours.to_lowercase().contains("open") || hours.contains("24"),
        None => false,
    }
}

/// Filters then stably sorts a result list.
pub fn rank(offers: Vec<MedicineOffer>, filter: &OfferFilter, sort: SortBy) -> Vec<MedicineOffer> {
    let mut ranked: Vec<MedicineOffer> = offers.into_iter().filter(|o| filter.matches(o)).collect();
    sort_offers(&mut ranked, sort);
    ranked
}

pub fn sort_offers(offers: &mut [MedicineOffer], sort: SortBy) {
    match sort {
        SortBy::Default => {}
        SortBy::PriceAsc => offers.sort_by(|a, b| a.price.cmp(&b.price)),
        SortBy::PriceDesc => offers.sort_by(|a, b| b.price.cmp(&a.price)),
        SortBy::Distance => offers.sort_by(|a, b| cmp_distance(a.distance_km, b.distance_km)),
    }
}

fn cmp_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Side-by-side view of every offer for a medicine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceComparison {
    pub offers: Vec<MedicineOffer>,
    /// Offer with the lowest price; first in store order on ties
    pub best_price_id: Option<Uuid>,
    /// Offer with the smallest known distance; first in store order on ties
    pub closest_id: Option<Uuid>,
}

pub fn compare(offers: Vec<MedicineOffer>, sort: CompareSort) -> PriceComparison {
    let best_price_id = offers
        .iter()
        .fold(None::<&MedicineOffer>, |best, o| match best {
            Some(b) if b.price <= o.price => Some(b),
            _ => Some(o),
        })
        .map(|o| o.id);

    let closest_id = offers
        .iter()
        .filter_map(|o| o.distance_km.map(|d| (o.id, d)))
        .fold(None::<(Uuid, f64)>, |best, (id, d)| match best {
            Some((_, bd)) if bd <= d => best,
            _ => Some((id, d)),
        })
        .map(|(id, _)| id);

    let mut offers = offers;
    match sort {
        CompareSort::Price => sort_offers(&mut offers, SortBy::PriceAsc),
        CompareSort::Distance => sort_offers(&mut offers, SortBy::Distance),
    }

    PriceComparison {
        offers,
        best_price_id,
        closest_id,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::entities::pharmacy::VerificationStatus;
    use crate::models::StockStatus;
    use chrono::Utc;
    use rust_decimal::Decimal;

    pub fn offer(name: &str, price: i64, stock: i32, distance_km: Option<f64>) -> MedicineOffer {
        MedicineOffer {
            id: Uuid::new_v4(),
            pharmacy_id: Uuid::new_v4(),
            medicine_id: format!("med-{name}"),
            medicine_name: name.to_string(),
            price: Decimal::new(price, 0),
            stock,
            low_stock_threshold: Some(50),
            available: stock > 0,
            category: None,
            description: None,
            last_updated: Utc::now(),
            pharmacy_name: "Test Pharmacy".into(),
            address: "1 Main St".into(),
            phone: "0110000000".into(),
            opening_hours: None,
            location: None,
            pharmacy_status: VerificationStatus::Verified,
            distance_km,
            stock_status: StockStatus::classify(stock, Some(50)),
        }
    }
}
