use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Colour of the volume bar under a candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum VolumeColor {
    Green,
    Red,
    Neutral,
}

impl VolumeColor {
    pub fn from_prices(open: f64, close: f64) -> Self {
        if close > open {
            Self::Green
        } else if close < open {
            Self::Red
        } else {
            Self::Neutral
        }
    }
}

/// One OHLCV bar. `rsi` and `volume_color` are derived once per fetch and attached by the analysis
/// pipeline; `None` means they have not been derived (or RSI is not yet defined at this index).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp_ms: i64,

    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,

    pub rsi: Option<f64>,
    pub volume_color: Option<VolumeColor>,
}

impl Candle {
    // A constructor for convenience
    pub fn new(timestamp_ms: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Candle {
            timestamp_ms,
            open,
            high,
            low,
            close,
            volume,
            rsi: None,
            volume_color: None,
        }
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Body size relative to the full high-low range. A zero-range bar has ratio 0.
    pub fn body_to_range_ratio(&self) -> f64 {
        let range = self.range();
        if range <= f64::EPSILON {
            0.0
        } else {
            self.body() / range
        }
    }
}

/// Attach RSI (index-aligned, may be empty when too short) and volume colours.
pub fn attach_derived_fields(candles: &mut [Candle], rsi: &[Option<f64>]) {
    for (i, candle) in candles.iter_mut().enumerate() {
        candle.rsi = rsi.get(i).copied().flatten();
        candle.volume_color = Some(VolumeColor::from_prices(candle.open, candle.close));
    }
}
