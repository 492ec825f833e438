//! Time-series primitives. Pure functions over ordered numeric sequences.
mod ema;
mod rsi;

pub use ema::calculate_ema;
pub use rsi::calculate_rsi;

use crate::{config::EmaPeriods, domain::Candle};

/// An indicator series aligned index-for-index with its candles. `None` = not yet computed.
pub type Series = Vec<Option<f64>>;

/// Every series the analysis pipeline needs for one symbol, computed in one pass.
#[derive(Debug, Clone)]
pub struct IndicatorSet {
    pub ema_fast: Series,
    pub ema_mid: Series,
    pub ema_slow: Series,
    /// Empty when the candle window is not longer than the RSI period.
    pub rsi: Series,
}

impl IndicatorSet {
    pub fn compute(candles: &[Candle], periods: &EmaPeriods, rsi_period: usize) -> Self {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        Self {
            ema_fast: calculate_ema(&closes, periods.fast),
            ema_mid: calculate_ema(&closes, periods.mid),
            ema_slow: calculate_ema(&closes, periods.slow),
            rsi: calculate_rsi(&closes, rsi_period),
        }
    }
}
