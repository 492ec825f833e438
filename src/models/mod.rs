mod pair_analysis;
mod patterns;
mod signal;
mod trend;
mod zone;

pub use {
    pair_analysis::{CompositeSignals, PairAnalysis, SessionExtremes},
    patterns::{BottomPatterns, BreakoutStatus, Divergence, EngulfingStatus, TopPatterns},
    signal::{SignalSetup, TradeDirection, TradeSetup},
    trend::{LevelKind, Trend, TrendResult},
    zone::{RsiDirection, RsiRange, ZoneSignal},
};
