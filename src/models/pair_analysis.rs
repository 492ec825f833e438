use {
    crate::{
        analysis::SessionWindow,
        domain::Timeframe,
        indicators::Series,
        models::{
            BottomPatterns, BreakoutStatus, Divergence, EngulfingStatus, RsiRange, SignalSetup,
            TopPatterns, TrendResult, ZoneSignal,
        },
    },
    serde::{Deserialize, Serialize},
};

/// Session extremes used by the breakout and tested-level detectors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SessionExtremes {
    pub today_high: Option<f64>,
    pub today_low: Option<f64>,
    pub prev_high: Option<f64>,
    pub prev_low: Option<f64>,
}

/// The four composite detectors for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CompositeSignals {
    pub bullish_to_bearish: SignalSetup,
    pub bearish_to_bullish: SignalSetup,
    pub bullish_spike: SignalSetup,
    pub bearish_collapse: SignalSetup,
}

impl CompositeSignals {
    pub fn any_reversal(&self) -> bool {
        self.bullish_to_bearish.is_signal() || self.bearish_to_bullish.is_signal()
    }

    pub fn any_spike_or_collapse(&self) -> bool {
        self.bullish_spike.is_signal() || self.bearish_collapse.is_signal()
    }

    pub fn any(&self) -> bool {
        self.any_reversal() || self.any_spike_or_collapse()
    }
}

/// One row of the scanner: everything derived for a symbol on one poll tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairAnalysis {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub analysed_at_ms: i64,
    pub candle_count: usize,

    // Ticker
    pub current_price: f64,
    pub open_price: f64,
    pub price_change_percent: f64,
    pub quote_volume: f64,

    pub session: SessionWindow,
    pub extremes: SessionExtremes,

    pub trend: Option<TrendResult>,
    pub breakout: BreakoutStatus,
    pub tested_prev_high: bool,
    pub tested_prev_low: bool,
    pub tops: TopPatterns,
    pub bottoms: BottomPatterns,
    pub rsi_divergence: Divergence,
    pub volume_divergence: Divergence,
    pub engulfing: EngulfingStatus,
    pub signals: CompositeSignals,

    pub rsi: Series,
    pub latest_rsi: Option<f64>,
    pub rsi_range: Option<RsiRange>,
    pub zone: ZoneSignal,

    /// `(price - ema) / ema * 100`
    pub ema70_gap_pct: Option<f64>,
    pub ema200_gap_pct: Option<f64>,
}
