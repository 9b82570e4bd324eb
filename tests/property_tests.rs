//! Property-based tests for distance, stock classification and ranking.

use chrono::Utc;
use medfinder_api::entities::pharmacy::VerificationStatus;
use medfinder_api::models::geo::distance_km;
use medfinder_api::models::{GeoPoint, MedicineOffer, StockStatus};
use medfinder_api::services::ranking::{rank, OfferFilter, SortBy};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

fn lat_strategy() -> impl Strategy<Value = f64> {
    -90.0f64..=90.0
}

fn lng_strategy() -> impl Strategy<Value = f64> {
    -180.0f64..=180.0
}

fn offer_strategy() -> impl Strategy<Value = MedicineOffer> {
    (
        0i64..100_000,
        -5i32..500,
        proptest::option::of(0i32..200),
        proptest::option::of(0.0f64..500.0),
    )
        .prop_map(|(cents, stock, threshold, distance)| MedicineOffer {
            id: Uuid::new_v4(),
            pharmacy_id: Uuid::new_v4(),
            medicine_id: "MED-1".into(),
            medicine_name: "Paracetamol".into(),
            price: Decimal::new(cents, 2),
            stock,
            low_stock_threshold: threshold,
            available: stock > 0,
            category: None,
            description: None,
            last_updated: Utc::now(),
            pharmacy_name: "Pharmacy".into(),
            address: "1 Road".into(),
            phone: "000".into(),
            opening_hours: None,
            location: None,
            pharmacy_status: VerificationStatus::Verified,
            distance_km: distance,
            stock_status: StockStatus::classify(stock, threshold),
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn distance_is_symmetric(
        lat1 in lat_strategy(), lng1 in lng_strategy(),
        lat2 in lat_strategy(), lng2 in lng_strategy(),
    ) {
        let there = distance_km(lat1, lng1, lat2, lng2);
        let back = distance_km(lat2, lng2, lat1, lng1);
        prop_assert!((there - back).abs() < 1e-6, "{} vs {}", there, back);
    }

    #[test]
    fn distance_to_self_is_zero(lat in lat_strategy(), lng in lng_strategy()) {
        prop_assert!(distance_km(lat, lng, lat, lng).abs() < 1e-9);
        let p = GeoPoint::new(lat, lng);
        prop_assert!(p.distance_to(&p).abs() < 1e-9);
    }

    #[test]
    fn distance_is_bounded_by_half_circumference(
        lat1 in lat_strategy(), lng1 in lng_strategy(),
        lat2 in lat_strategy(), lng2 in lng_strategy(),
    ) {
        let d = distance_km(lat1, lng1, lat2, lng2);
        prop_assert!(d >= 0.0);
        prop_assert!(d <= std::f64::consts::PI * 6371.0 + 1e-6);
    }
}

proptest! {
    #[test]
    fn non_positive_stock_is_out_of_stock(stock in -1000i32..=0, threshold in proptest::option::of(-10i32..1000)) {
        prop_assert_eq!(StockStatus::classify(stock, threshold), StockStatus::OutOfStock);
    }

    #[test]
    fn classification_follows_threshold(stock in 1i32..10_000, threshold in 1i32..1000) {
        let expected = if stock < threshold { StockStatus::LowStock } else { StockStatus::InStock };
        prop_assert_eq!(StockStatus::classify(stock, Some(threshold)), expected);
    }

    #[test]
    fn missing_threshold_defaults_to_fifty(stock in 1i32..10_000) {
        prop_assert_eq!(
            StockStatus::classify(stock, None),
            StockStatus::classify(stock, Some(50))
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn price_sort_is_ordered_and_keeps_labels(offers in proptest::collection::vec(offer_strategy(), 0..30)) {
        let ranked = rank(offers.clone(), &OfferFilter::default(), SortBy::PriceAsc);
        prop_assert_eq!(ranked.len(), offers.len());
        prop_assert!(ranked.windows(2).all(|w| w[0].price <= w[1].price));
        for offer in &ranked {
            let original = offers.iter().find(|o| o.id == offer.id).unwrap();
            prop_assert_eq!(offer.stock_status, original.stock_status);
        }

        let desc = rank(offers.clone(), &OfferFilter::default(), SortBy::PriceDesc);
        prop_assert!(desc.windows(2).all(|w| w[0].price >= w[1].price));
    }

    #[test]
    fn price_sort_is_stable(offers in proptest::collection::vec(offer_strategy(), 0..30)) {
        let ranked = rank(offers.clone(), &OfferFilter::default(), SortBy::PriceAsc);
        let position = |id: Uuid| offers.iter().position(|o| o.id == id).unwrap();
        for w in ranked.windows(2) {
            if w[0].price == w[1].price {
                prop_assert!(position(w[0].id) < position(w[1].id));
            }
        }
    }

    #[test]
    fn in_stock_filter_keeps_exactly_in_stock(offers in proptest::collection::vec(offer_strategy(), 0..30)) {
        let filter = OfferFilter { in_stock_only: true, open_now: false };
        let ranked = rank(offers.clone(), &filter, SortBy::Default);
        let expected: Vec<Uuid> = offers
            .iter()
            .filter(|o| o.stock_status == StockStatus::InStock)
            .map(|o| o.id)
            .collect();
        let got: Vec<Uuid> = ranked.iter().map(|o| o.id).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn distance_sort_puts_unknown_last(offers in proptest::collection::vec(offer_strategy(), 0..30)) {
        let ranked = rank(offers, &OfferFilter::default(), SortBy::Distance);
        let first_unknown = ranked.iter().position(|o| o.distance_km.is_none()).unwrap_or(ranked.len());
        prop_assert!(ranked[first_unknown..].iter().all(|o| o.distance_km.is_none()));
        prop_assert!(ranked[..first_unknown]
            .windows(2)
            .all(|w| w[0].distance_km <= w[1].distance_km));
    }
}

#[test]
fn reference_point_distance_to_itself_is_zero() {
    assert_eq!(distance_km(6.9271, 79.8612, 6.9271, 79.8612), 0.0);
}
