use serde::{Deserialize, Serialize};

/// 24h rolling statistics for one symbol, already normalized to floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSnapshot {
    pub symbol: String,
    pub last_price: f64,
    pub open_price: f64,
    pub price_change_percent: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub quote_volume: f64,
}

impl TickerSnapshot {
    /// Minimal snapshot for callers that only know the latest price.
    pub fn from_last_price(symbol: impl Into<String>, last_price: f64, open_price: f64) -> Self {
        let price_change_percent = if open_price.abs() > f64::EPSILON {
            (last_price - open_price) / open_price * 100.0
        } else {
            0.0
        };
        Self {
            symbol: symbol.into(),
            last_price,
            open_price,
            price_change_percent,
            high_price: last_price.max(open_price),
            low_price: last_price.min(open_price),
            quote_volume: 0.0,
        }
    }
}
