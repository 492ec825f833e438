use {
    crate::utils::TimeUtils,
    serde::{Deserialize, Serialize},
    strum_macros::{Display, EnumIter, EnumString},
};

/// Candle timeframes the scanner supports. The textual form matches Binance interval names.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
    Default,
)]
pub enum Timeframe {
    #[strum(serialize = "15m")]
    #[serde(rename = "15m")]
    M15,
    #[strum(serialize = "4h")]
    #[serde(rename = "4h")]
    H4,
    #[default]
    #[strum(serialize = "1d")]
    #[serde(rename = "1d")]
    D1,
}

impl Timeframe {
    pub fn interval_ms(&self) -> i64 {
        match self {
            Self::M15 => TimeUtils::MS_IN_15_MIN,
            Self::H4 => TimeUtils::MS_IN_4_H,
            Self::D1 => TimeUtils::MS_IN_D,
        }
    }

    pub fn is_daily(&self) -> bool {
        matches!(self, Self::D1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn parses_binance_interval_names() {
        assert_eq!(Timeframe::from_str("15m").ok(), Some(Timeframe::M15));
        assert_eq!(Timeframe::from_str("4h").ok(), Some(Timeframe::H4));
        assert_eq!(Timeframe::from_str("1d").ok(), Some(Timeframe::D1));
        assert!(Timeframe::from_str("1w").is_err());
    }

    #[test]
    fn display_round_trips_with_interval_names() {
        for tf in Timeframe::iter() {
            assert_eq!(Timeframe::from_str(&tf.to_string()).ok(), Some(tf));
        }
    }
}
