//! Analysis and computation configuration (Immutable Blueprints)

/// EMA periods used across the trend classifier and the composite detectors.
pub struct EmaPeriods {
    pub fast: usize,
    pub mid: usize,
    pub slow: usize,
}

/// Settings for the main trend classifier (EMA70/EMA200 crossover scan)
pub struct TrendSettings {
    /// How close (percent) the last close must be to the crossover price to count as "near".
    pub tolerance_pct: f64,
    /// Max body/range ratio of the last candle for it to count as a doji.
    pub doji_tolerance_ratio: f64,
}

/// One row of the tiered "tested level" table: prices strictly above `above` use `threshold_pct`.
pub struct TestedTier {
    pub above: f64,
    pub threshold_pct: f64,
}

pub struct PatternSettings {
    /// Double top/bottom: latest extreme within this percent of the prior one.
    pub double_extreme_tolerance_pct: f64,
    /// How many past sessions feed the top/bottom detectors.
    pub session_history: usize,
    /// Candles per half-window when comparing recent vs prior swing for divergence.
    pub divergence_lookback: usize,
    /// Ordered from the highest price tier down; the fallback applies below the last tier.
    pub tested_tiers: &'static [TestedTier],
    pub tested_fallback_pct: f64,
}

pub struct SignalSettings {
    /// How far back (candles) to look for the EMA14 crossover.
    pub crossover_lookback: usize,
    /// Entry is the close offset by this fraction in the trade direction.
    pub entry_offset: f64,
    pub rsi_midline: f64,
    /// Close within this percent of EMA70 counts as touching it.
    pub ema_proximity_pct: f64,
    /// Number of RSI points used for the monotonic trajectory checks.
    pub rsi_trajectory_len: usize,
}

/// Inclusive RSI-range band for a zone label.
pub struct ZoneBand {
    pub min: f64,
    pub max: f64,
}

pub struct ZoneSettings {
    pub lookback: usize,
    pub max_zone_min: f64,
    pub balance: ZoneBand,
    pub lowest: ZoneBand,
}

pub struct AnalysisConfig {
    /// Rolling window of candles analysed per symbol.
    pub candle_window: usize,
    pub ema: EmaPeriods,
    pub trend: TrendSettings,
    pub patterns: PatternSettings,
    pub signals: SignalSettings,
    pub zones: ZoneSettings,
}

pub const ANALYSIS: AnalysisConfig = AnalysisConfig {
    candle_window: 500,
    ema: EmaPeriods {
        fast: 14,
        mid: 70,
        slow: 200,
    },
    trend: TrendSettings {
        tolerance_pct: 0.5,
        doji_tolerance_ratio: 0.1,
    },
    patterns: PatternSettings {
        double_extreme_tolerance_pct: 1.0,
        session_history: 5,
        divergence_lookback: 14,
        tested_tiers: &[
            TestedTier {
                above: 10_000.0,
                threshold_pct: 0.005,
            },
            TestedTier {
                above: 1_000.0,
                threshold_pct: 0.01,
            },
            TestedTier {
                above: 1.0,
                threshold_pct: 0.1,
            },
        ],
        tested_fallback_pct: 1.0,
    },
    signals: SignalSettings {
        crossover_lookback: 10,
        entry_offset: 0.001,
        rsi_midline: 50.0,
        ema_proximity_pct: 0.5,
        rsi_trajectory_len: 3,
    },
    zones: ZoneSettings {
        lookback: 14,
        max_zone_min: 30.0,
        balance: ZoneBand { min: 21.0, max: 26.0 },
        lowest: ZoneBand { min: 1.0, max: 10.0 },
    },
};
