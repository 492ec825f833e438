//! Session window resolution.
//!
//! Everything here is a pure function of `(timeframe, reference instant)`: callers pass `now_ms`
//! explicitly so results are reproducible.

use {
    crate::{
        config::constants::session::{
            DAILY_CUTOVER_LOCAL_MS, DAILY_SESSION_LENGTH_MS, EXCHANGE_UTC_OFFSET_MS,
        },
        domain::{Candle, Timeframe},
        utils::{TimeUtils, max_finite, min_finite},
    },
    serde::{Deserialize, Serialize},
    std::ops::Range,
};

/// Active and previous session boundaries in epoch ms. Ends are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub session_start: i64,
    pub session_end: i64,
    pub prev_session_start: i64,
    pub prev_session_end: i64,
}

impl SessionWindow {
    pub fn length_ms(&self) -> i64 {
        self.session_end - self.session_start
    }
}

/// Distance between consecutive session starts.
pub fn session_step_ms(timeframe: Timeframe) -> i64 {
    if timeframe.is_daily() {
        TimeUtils::MS_IN_D
    } else {
        timeframe.interval_ms()
    }
}

/// Start of the daily session containing `now_ms`: the most recent 08:00 exchange-local cutover.
fn daily_session_start(now_ms: i64) -> i64 {
    let local_now = now_ms + EXCHANGE_UTC_OFFSET_MS;
    let local_midnight = local_now.div_euclid(TimeUtils::MS_IN_D) * TimeUtils::MS_IN_D;
    let today_cutover = local_midnight + DAILY_CUTOVER_LOCAL_MS - EXCHANGE_UTC_OFFSET_MS;
    if now_ms >= today_cutover {
        today_cutover
    } else {
        today_cutover - TimeUtils::MS_IN_D
    }
}

fn session_start(timeframe: Timeframe, now_ms: i64) -> i64 {
    if timeframe.is_daily() {
        daily_session_start(now_ms)
    } else {
        let bucket = timeframe.interval_ms();
        now_ms.div_euclid(bucket) * bucket
    }
}

fn session_length(timeframe: Timeframe) -> i64 {
    if timeframe.is_daily() {
        DAILY_SESSION_LENGTH_MS
    } else {
        timeframe.interval_ms()
    }
}

/// Resolve the active and previous session for `timeframe` at `now_ms`.
///
/// Daily sessions run from 08:00 to 07:45 exchange-local (UTC-8) the next day, i.e. 23h45m.
/// Sub-daily sessions are epoch-aligned buckets of the timeframe's size.
pub fn resolve_session(timeframe: Timeframe, now_ms: i64) -> SessionWindow {
    let start = session_start(timeframe, now_ms);
    let length = session_length(timeframe);
    let prev_start = start - session_step_ms(timeframe);
    SessionWindow {
        session_start: start,
        session_end: start + length,
        prev_session_start: prev_start,
        prev_session_end: prev_start + length,
    }
}

/// The `n` most recent daily session starts, oldest first. Always anchored to the daily cutover
/// and one day apart, whatever the scanned timeframe. The last element is the active day.
pub fn last_session_starts(now_ms: i64, n: usize) -> Vec<i64> {
    let current = daily_session_start(now_ms);
    (0..n as i64)
        .rev()
        .map(|back| current - back * TimeUtils::MS_IN_D)
        .collect()
}

/// Index range of candles whose timestamp lies in `[start, end)`. Candles must be ascending.
pub fn window_indices(candles: &[Candle], start: i64, end: i64) -> Range<usize> {
    let lo = candles.partition_point(|c| c.timestamp_ms < start);
    let hi = candles.partition_point(|c| c.timestamp_ms < end).max(lo);
    lo..hi
}

/// (highest high, lowest low) over `[start, end)`; `None` for an empty window.
pub fn window_extremes(candles: &[Candle], start: i64, end: i64) -> (Option<f64>, Option<f64>) {
    let slice = &candles[window_indices(candles, start, end)];
    (
        max_finite(slice.iter().map(|c| c.high)),
        min_finite(slice.iter().map(|c| c.low)),
    )
}

fn per_session<F>(candles: &[Candle], starts: &[i64], extreme: F) -> Vec<Option<f64>>
where
    F: Fn(&[Candle]) -> Option<f64>,
{
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts
                .get(i + 1)
                .copied()
                .unwrap_or(start + TimeUtils::MS_IN_D);
            extreme(&candles[window_indices(candles, start, end)])
        })
        .collect()
}

/// Highest high per session in `[start_i, start_{i+1})`; the last session runs one day. Empty
/// sessions are `None`.
pub fn session_highs(candles: &[Candle], starts: &[i64]) -> Vec<Option<f64>> {
    per_session(candles, starts, |slice| max_finite(slice.iter().map(|c| c.high)))
}

/// Lowest low per session in `[start_i, start_{i+1})`. Empty sessions are `None`.
pub fn session_lows(candles: &[Candle], starts: &[i64]) -> Vec<Option<f64>> {
    per_session(candles, starts, |slice| min_finite(slice.iter().map(|c| c.low)))
}
