//! Indicator-driven analysis: sessions, trend, patterns, composite signals and zones.
mod pair_analysis;
mod patterns;
mod session;
mod signals;
mod trend;
mod zone;

pub use {
    pair_analysis::{AnalysisParams, analyze_pair},
    patterns::{
        detect_bottom_patterns, detect_breakout, detect_engulfing, detect_price_divergence,
        detect_rsi_divergence, detect_tested_prev_high, detect_tested_prev_low,
        detect_top_patterns, detect_volume_divergence, tested_threshold_pct,
    },
    session::{
        SessionWindow, last_session_starts, resolve_session, session_highs, session_lows,
        session_step_ms, window_extremes, window_indices,
    },
    signals::{
        SignalContext, detect_bearish_collapse, detect_bearish_to_bullish, detect_bullish_spike,
        detect_bullish_to_bearish, detect_composite_signals,
    },
    trend::get_main_trend,
    zone::{classify_zone, get_recent_rsi_diff},
};
