use {
    serde::{Deserialize, Serialize},
    strum_macros::{Display, EnumIter},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum RsiDirection {
    Pump,
    Dump,
    Neutral,
}

/// High/low of the recent RSI window and the strength derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiRange {
    pub high: f64,
    pub low: f64,
    pub start: f64,
    pub end: f64,
    pub pump_strength: f64,
    /// Computed as `|low - high|`, which always equals `pump_strength`.
    pub dump_strength: f64,
    pub direction: RsiDirection,
}

/// Discrete label for the recent RSI range, ordered by classification priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, Default,
)]
pub enum ZoneSignal {
    #[strum(serialize = "MAX ZONE PUMP")]
    MaxZonePump,
    #[strum(serialize = "MAX ZONE DUMP")]
    MaxZoneDump,
    #[strum(serialize = "BALANCE ZONE PUMP")]
    BalanceZonePump,
    #[strum(serialize = "BALANCE ZONE DUMP")]
    BalanceZoneDump,
    #[strum(serialize = "LOWEST ZONE PUMP")]
    LowestZonePump,
    #[strum(serialize = "LOWEST ZONE DUMP")]
    LowestZoneDump,
    #[default]
    #[strum(serialize = "NO STRONG SIGNAL")]
    NoStrongSignal,
}

impl ZoneSignal {
    pub fn is_signal(&self) -> bool {
        *self != Self::NoStrongSignal
    }

    /// Sort rank: lower is stronger.
    pub fn rank(&self) -> u8 {
        *self as u8
    }
}
