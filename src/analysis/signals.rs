//! Composite reversal, spike and collapse detectors.
//!
//! All four detectors share one rule engine parameterised by [`SetupRule`]: a trend guard, an
//! EMA14 crossover search, a tracked extreme and a set of latest-candle confirmations. A setup that
//! passes every check becomes an entry/stop with 1R and 2R targets.

use {
    crate::{
        analysis::trend::{Cross, cross_at},
        config::SignalSettings,
        domain::Candle,
        models::{CompositeSignals, SignalSetup, TradeDirection, TradeSetup, Trend, TrendResult},
        utils::{last_n_present, max_finite, min_finite, value_at},
    },
    itertools::Itertools,
};

/// Everything the composite detectors read for one symbol. All series are index-aligned with
/// `candles` (RSI may be empty when the window was too short).
#[derive(Debug, Clone, Copy)]
pub struct SignalContext<'a> {
    pub candles: &'a [Candle],
    pub ema_fast: &'a [Option<f64>],
    pub ema_mid: &'a [Option<f64>],
    pub ema_slow: &'a [Option<f64>],
    pub rsi: &'a [Option<f64>],
    pub trend: Option<&'a TrendResult>,
}

#[derive(Debug, Clone, Copy)]
struct SetupRule {
    direction: TradeDirection,
    prior_trend: Trend,
    /// Spike/collapse also need EMA14 to cross EMA200 inside the window.
    needs_slow_cross: bool,
}

const BULLISH_TO_BEARISH: SetupRule = SetupRule {
    direction: TradeDirection::Short,
    prior_trend: Trend::Bullish,
    needs_slow_cross: false,
};

const BEARISH_TO_BULLISH: SetupRule = SetupRule {
    direction: TradeDirection::Long,
    prior_trend: Trend::Bearish,
    needs_slow_cross: false,
};

const BULLISH_SPIKE: SetupRule = SetupRule {
    direction: TradeDirection::Long,
    prior_trend: Trend::Bullish,
    needs_slow_cross: true,
};

const BEARISH_COLLAPSE: SetupRule = SetupRule {
    direction: TradeDirection::Short,
    prior_trend: Trend::Bearish,
    needs_slow_cross: true,
};

pub fn detect_bullish_to_bearish(ctx: &SignalContext, settings: &SignalSettings) -> SignalSetup {
    evaluate(ctx, &BULLISH_TO_BEARISH, settings)
}

pub fn detect_bearish_to_bullish(ctx: &SignalContext, settings: &SignalSettings) -> SignalSetup {
    evaluate(ctx, &BEARISH_TO_BULLISH, settings)
}

pub fn detect_bullish_spike(ctx: &SignalContext, settings: &SignalSettings) -> SignalSetup {
    evaluate(ctx, &BULLISH_SPIKE, settings)
}

pub fn detect_bearish_collapse(ctx: &SignalContext, settings: &SignalSettings) -> SignalSetup {
    evaluate(ctx, &BEARISH_COLLAPSE, settings)
}

/// Run all four detectors.
pub fn detect_composite_signals(ctx: &SignalContext, settings: &SignalSettings) -> CompositeSignals {
    CompositeSignals {
        bullish_to_bearish: detect_bullish_to_bearish(ctx, settings),
        bearish_to_bullish: detect_bearish_to_bullish(ctx, settings),
        bullish_spike: detect_bullish_spike(ctx, settings),
        bearish_collapse: detect_bearish_collapse(ctx, settings),
    }
}

fn expected_cross(direction: TradeDirection) -> Cross {
    match direction {
        TradeDirection::Long => Cross::Up,
        TradeDirection::Short => Cross::Down,
    }
}

/// Strictly monotonic in `direction` (falling for short, rising for long).
fn moves_with(values: &[f64], direction: TradeDirection) -> bool {
    values.len() >= 2
        && values.iter().tuple_windows().all(|(a, b)| match direction {
            TradeDirection::Long => b > a,
            TradeDirection::Short => b < a,
        })
}

fn opposite(direction: TradeDirection) -> TradeDirection {
    match direction {
        TradeDirection::Long => TradeDirection::Short,
        TradeDirection::Short => TradeDirection::Long,
    }
}

/// Most recent crossover of `fast` over `slow` in `direction` within the last `lookback` candles.
fn recent_cross(
    fast: &[Option<f64>],
    slow: &[Option<f64>],
    n: usize,
    lookback: usize,
    cross: Cross,
) -> Option<usize> {
    let from = n.saturating_sub(lookback).max(1);
    (from..n).rev().find(|&i| cross_at(fast, slow, i) == Some(cross))
}

fn evaluate(ctx: &SignalContext, rule: &SetupRule, settings: &SignalSettings) -> SignalSetup {
    build_setup(ctx, rule, settings).map_or(SignalSetup::NoSignal, SignalSetup::Signal)
}

fn build_setup(ctx: &SignalContext, rule: &SetupRule, s: &SignalSettings) -> Option<TradeSetup> {
    let candles = ctx.candles;
    let n = candles.len();
    if n < 2 || ctx.rsi.len() != n {
        return None;
    }
    let dir = rule.direction;

    // 1. Guards
    if ctx.trend?.trend != rule.prior_trend {
        return None;
    }
    let trajectory = last_n_present(ctx.rsi, s.rsi_trajectory_len)?;
    if moves_with(&trajectory, opposite(dir)) {
        return None;
    }

    // 2. Crossovers
    let cross = expected_cross(dir);
    let mid_cross = recent_cross(ctx.ema_fast, ctx.ema_mid, n, s.crossover_lookback, cross)?;
    let (anchor, reference) = if rule.needs_slow_cross {
        let slow_cross = recent_cross(ctx.ema_fast, ctx.ema_slow, n, s.crossover_lookback, cross)?;
        (mid_cross.min(slow_cross), mid_cross.max(slow_cross))
    } else {
        (mid_cross, mid_cross)
    };

    // 3. Tracked extreme since the crossover
    let since = &candles[anchor..];
    let extreme = match dir {
        TradeDirection::Short => max_finite(since.iter().map(|c| c.high))?,
        TradeDirection::Long => min_finite(since.iter().map(|c| c.low))?,
    };

    // 4. Latest candle confirmations
    let last = &candles[n - 1];
    let prev = &candles[n - 2];
    let ema_mid = value_at(ctx.ema_mid, n - 1)?;
    let rsi_since: Vec<f64> = ctx.rsi[anchor..].iter().flatten().copied().collect();
    let last_rsi = value_at(ctx.rsi, n - 1)?;
    let crossed = &candles[reference];
    let proximity = s.ema_proximity_pct / 100.0;

    let confirmed = match dir {
        TradeDirection::Short => {
            last.close <= ema_mid * (1.0 + proximity)
                && last.high < prev.high
                && max_finite(rsi_since.iter().copied()).is_some_and(|m| m >= s.rsi_midline)
                && last_rsi < s.rsi_midline
                && last.close < crossed.low
        }
        TradeDirection::Long => {
            last.close >= ema_mid * (1.0 - proximity)
                && last.low > prev.low
                && min_finite(rsi_since.iter().copied()).is_some_and(|m| m <= s.rsi_midline)
                && last_rsi > s.rsi_midline
                && last.close > crossed.high
        }
    };
    if !confirmed || !moves_with(&trajectory, dir) {
        return None;
    }

    // 5. Entry, stop and targets
    let sign = dir.sign();
    let entry = last.close * (1.0 + sign * s.entry_offset);
    let stop_loss = extreme;
    // The stop must sit strictly on the losing side of the entry.
    if (entry - stop_loss) * sign <= 0.0 {
        return None;
    }
    let risk = (entry - stop_loss).abs();
    Some(TradeSetup {
        entry,
        stop_loss,
        tp1: entry + sign * risk,
        tp2: entry + sign * 2.0 * risk,
    })
}
