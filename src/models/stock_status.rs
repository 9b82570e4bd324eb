use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Threshold applied when an item has none recorded.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 50;

/// Display classification of an item's stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum StockStatus {
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Low Stock")]
    LowStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

impl StockStatus {
    /// Classifies a stock count against a low-stock threshold.
    ///
    /// `stock == 0` is out of stock, anything below the threshold is low,
    /// everything else is in stock. A missing or zero threshold falls back
    /// to [`DEFAULT_LOW_STOCK_THRESHOLD`].
    pub fn classify(stock: i32, threshold: Option<i32>) -> Self {
        let threshold = effective_threshold(threshold);
        if stock <= 0 {
            StockStatus::OutOfStock
        } else if stock < threshold {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StockStatus::InStock => "In Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolves the threshold actually used for classification.
pub fn effective_threshold(threshold: Option<i32>) -> i32 {
    match threshold {
        Some(t) if t > 0 => t,
        _ => DEFAULT_LOW_STOCK_THRESHOLD,
    }
}
