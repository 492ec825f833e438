use {
    serde::{Deserialize, Serialize},
    strum_macros::Display,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
}

/// Whether the crossover level now acts as a floor (bullish) or a ceiling (bearish).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LevelKind {
    Support,
    Resistance,
}

/// Main trend derived from the EMA70/EMA200 pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub trend: Trend,
    pub kind: LevelKind,
    pub crossover_price: f64,
    /// `None` when no crossover was found in the scanned range.
    pub breakout: Option<bool>,
    pub is_near: bool,
    pub is_doji_after_breakout: bool,
}
