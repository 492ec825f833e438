use crate::{
    analysis::{
        patterns::{
            detect_bottom_patterns, detect_breakout, detect_engulfing, detect_rsi_divergence,
            detect_tested_prev_high, detect_tested_prev_low, detect_top_patterns,
            detect_volume_divergence,
        },
        session::{
            last_session_starts, resolve_session, session_highs, session_lows, window_extremes,
            window_indices,
        },
        signals::{SignalContext, detect_composite_signals},
        trend::get_main_trend,
        zone::{classify_zone, get_recent_rsi_diff},
    },
    config::{ANALYSIS, DF},
    domain::{Candle, TickerSnapshot, Timeframe, attach_derived_fields},
    indicators::IndicatorSet,
    models::{PairAnalysis, SessionExtremes},
    trace_time,
    utils::{pct_gap, value_at},
};

/// Per-run analysis inputs. No `Default`: callers must pick the RSI period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisParams {
    pub timeframe: Timeframe,
    pub rsi_period: usize,
}

impl AnalysisParams {
    pub fn new(timeframe: Timeframe, rsi_period: usize) -> Self {
        Self {
            timeframe,
            rsi_period,
        }
    }
}

/// Run the full indicator and signal pipeline for one symbol.
///
/// `candles` are the scanned timeframe; only the most recent `ANALYSIS.candle_window` are used.
/// `session_candles` are a finer intraday series for the session detectors (breakout, tested
/// levels, engulfing, top/bottom history). Both must be ascending by timestamp.
/// This never fails: short or empty input degrades every field to its "no signal" value.
pub fn analyze_pair(
    symbol: &str,
    candles: &[Candle],
    session_candles: &[Candle],
    ticker: &TickerSnapshot,
    params: &AnalysisParams,
    now_ms: i64,
) -> PairAnalysis {
    trace_time!("analyze_pair", 2_000, {
        analyze_pair_inner(symbol, candles, session_candles, ticker, params, now_ms)
    })
}

/// Series for the daily session history: the intraday one when it reaches back to the oldest
/// session, otherwise the scanned candles.
fn history_source<'a>(
    session_candles: &'a [Candle],
    candles: &'a [Candle],
    oldest: i64,
) -> &'a [Candle] {
    match session_candles.first() {
        Some(first) if first.timestamp_ms <= oldest => session_candles,
        _ => candles,
    }
}

fn analyze_pair_inner(
    symbol: &str,
    candles: &[Candle],
    session_candles: &[Candle],
    ticker: &TickerSnapshot,
    params: &AnalysisParams,
    now_ms: i64,
) -> PairAnalysis {
    // 1. Rolling window + indicators
    let skip = candles.len().saturating_sub(ANALYSIS.candle_window);
    let mut candles = candles[skip..].to_vec();
    let ind = IndicatorSet::compute(&candles, &ANALYSIS.ema, params.rsi_period);
    attach_derived_fields(&mut candles, &ind.rsi);
    let last_idx = candles.len().saturating_sub(1);

    // 2. Sessions (intraday series)
    let session = resolve_session(params.timeframe, now_ms);
    let (today_high, today_low) =
        window_extremes(session_candles, session.session_start, session.session_end);
    let (prev_high, prev_low) =
        window_extremes(session_candles, session.prev_session_start, session.prev_session_end);
    let extremes = SessionExtremes {
        today_high,
        today_low,
        prev_high,
        prev_low,
    };

    // 3. Trend
    let trend = get_main_trend(&ind.ema_mid, &ind.ema_slow, &candles, &ANALYSIS.trend);

    // 4. Patterns
    let p = &ANALYSIS.patterns;
    let starts = last_session_starts(now_ms, p.session_history);
    let history = history_source(
        session_candles,
        &candles,
        starts.first().copied().unwrap_or(now_ms),
    );
    // Empty sessions carry no price, so they are dropped rather than compared.
    let highs: Vec<f64> = session_highs(history, &starts).into_iter().flatten().collect();
    let lows: Vec<f64> = session_lows(history, &starts).into_iter().flatten().collect();
    let today_range = window_indices(session_candles, session.session_start, session.session_end);

    // 5. Composite signals
    let ctx = SignalContext {
        candles: &candles,
        ema_fast: &ind.ema_fast,
        ema_mid: &ind.ema_mid,
        ema_slow: &ind.ema_slow,
        rsi: &ind.rsi,
        trend: trend.as_ref(),
    };
    let signals = detect_composite_signals(&ctx, &ANALYSIS.signals);
    if DF.log_signals && signals.any() {
        log::info!("{} [{}]: composite signal {:?}", symbol, params.timeframe, signals);
    }

    // 6. Zone
    let rsi_range = get_recent_rsi_diff(&ind.rsi, ANALYSIS.zones.lookback);
    let zone = classify_zone(rsi_range.as_ref(), &ANALYSIS.zones);

    let ema70_gap_pct =
        value_at(&ind.ema_mid, last_idx).and_then(|ema| pct_gap(ticker.last_price, ema));
    let ema200_gap_pct =
        value_at(&ind.ema_slow, last_idx).and_then(|ema| pct_gap(ticker.last_price, ema));

    PairAnalysis {
        symbol: symbol.to_string(),
        timeframe: params.timeframe,
        analysed_at_ms: now_ms,
        candle_count: candles.len(),
        current_price: ticker.last_price,
        open_price: ticker.open_price,
        price_change_percent: ticker.price_change_percent,
        quote_volume: ticker.quote_volume,
        session,
        extremes,
        trend,
        breakout: detect_breakout(today_high, prev_high, today_low, prev_low),
        tested_prev_high: detect_tested_prev_high(prev_high, today_high, p),
        tested_prev_low: detect_tested_prev_low(prev_low, today_low, p),
        tops: detect_top_patterns(&highs, p),
        bottoms: detect_bottom_patterns(&lows, p),
        rsi_divergence: detect_rsi_divergence(&candles, &ind.rsi, p.divergence_lookback),
        volume_divergence: detect_volume_divergence(&candles, p.divergence_lookback),
        engulfing: detect_engulfing(session_candles, today_range),
        signals,
        latest_rsi: ind.rsi.last().copied().flatten(),
        rsi: ind.rsi,
        rsi_range,
        zone,
        ema70_gap_pct,
        ema200_gap_pct,
    }
}
