//! Pattern detectors over session extremes and raw candles.
//!
//! Every detector degrades to `false` (or an all-false struct) on missing or short input.

use {
    crate::{
        config::PatternSettings,
        domain::Candle,
        models::{BottomPatterns, BreakoutStatus, Divergence, EngulfingStatus, TopPatterns},
        utils::{max_finite, min_finite, pct_distance, value_at},
    },
    std::ops::Range,
};

/// Compare today's session extremes against the previous session's.
pub fn detect_breakout(
    today_high: Option<f64>,
    prev_high: Option<f64>,
    today_low: Option<f64>,
    prev_low: Option<f64>,
) -> BreakoutStatus {
    let (Some(today_high), Some(prev_high), Some(today_low), Some(prev_low)) =
        (today_high, prev_high, today_low, prev_low)
    else {
        return BreakoutStatus::default();
    };

    let failed_bullish = today_high <= prev_high;
    let failed_bearish = today_low >= prev_low;
    BreakoutStatus {
        bullish: today_high > prev_high,
        bearish: today_low < prev_low,
        failure: failed_bullish && failed_bearish,
    }
}

/// Percent tolerance for a "tested" level at this price.
pub fn tested_threshold_pct(price: f64, settings: &PatternSettings) -> f64 {
    settings
        .tested_tiers
        .iter()
        .find(|tier| price > tier.above)
        .map_or(settings.tested_fallback_pct, |tier| tier.threshold_pct)
}

fn tested(level: f64, extreme: f64, exceeded: bool, settings: &PatternSettings) -> bool {
    if exceeded {
        return false;
    }
    pct_distance(extreme, level)
        .is_some_and(|d| d <= tested_threshold_pct(level, settings))
}

/// Today's high came within the tiered threshold of the previous session high without exceeding it.
pub fn detect_tested_prev_high(
    prev_high: Option<f64>,
    todays_high: Option<f64>,
    settings: &PatternSettings,
) -> bool {
    match (prev_high, todays_high) {
        (Some(prev), Some(today)) => tested(prev, today, today > prev, settings),
        _ => false,
    }
}

/// Mirror of [`detect_tested_prev_high`] for session lows.
pub fn detect_tested_prev_low(
    prev_low: Option<f64>,
    todays_low: Option<f64>,
    settings: &PatternSettings,
) -> bool {
    match (prev_low, todays_low) {
        (Some(prev), Some(today)) => tested(prev, today, today < prev, settings),
        _ => false,
    }
}

/// Double/descending top and top failure over chronological session highs.
pub fn detect_top_patterns(highs: &[f64], settings: &PatternSettings) -> TopPatterns {
    let n = highs.len();
    if n < 2 {
        return TopPatterns::default();
    }
    let latest = highs[n - 1];
    let prior = highs[n - 2];
    let Some(prior_max) = max_finite(highs[..n - 1].iter().copied()) else {
        return TopPatterns::default();
    };

    let within = pct_distance(latest, prior)
        .is_some_and(|d| d <= settings.double_extreme_tolerance_pct);
    TopPatterns {
        double_top: within && latest < prior_max,
        descending_top: n >= 3 && highs[n - 3] > highs[n - 2] && highs[n - 2] > latest,
        top_failure: latest > prior_max,
    }
}

/// Double/ascending bottom and bottom failure over chronological session lows.
pub fn detect_bottom_patterns(lows: &[f64], settings: &PatternSettings) -> BottomPatterns {
    let n = lows.len();
    if n < 2 {
        return BottomPatterns::default();
    }
    let latest = lows[n - 1];
    let prior = lows[n - 2];
    let Some(prior_min) = min_finite(lows[..n - 1].iter().copied()) else {
        return BottomPatterns::default();
    };

    let within = pct_distance(latest, prior)
        .is_some_and(|d| d <= settings.double_extreme_tolerance_pct);
    BottomPatterns {
        double_bottom: within && latest > prior_min,
        ascending_bottom: n >= 3 && lows[n - 3] < lows[n - 2] && lows[n - 2] < latest,
        bottom_failure: latest < prior_min,
    }
}

/// Index of the first maximum (or minimum) of `key` over `range`.
fn extreme_index<F>(candles: &[Candle], range: Range<usize>, key: F, highest: bool) -> Option<usize>
where
    F: Fn(&Candle) -> f64,
{
    range.fold(None, |best: Option<usize>, i| match best {
        Some(b) if highest && key(&candles[i]) <= key(&candles[b]) => Some(b),
        Some(b) if !highest && key(&candles[i]) >= key(&candles[b]) => Some(b),
        _ => Some(i),
    })
}

/// Price vs oscillator divergence between the last `lookback` candles and the `lookback` before.
///
/// Bearish: the recent window makes a higher high but the oscillator at that high is lower.
/// Bullish: the recent window makes a lower low but the oscillator at that low is higher.
pub fn detect_price_divergence(
    candles: &[Candle],
    oscillator: &[Option<f64>],
    lookback: usize,
) -> Divergence {
    let n = candles.len();
    if lookback == 0 || n < 2 * lookback {
        return Divergence::default();
    }
    let prior = n - 2 * lookback..n - lookback;
    let recent = n - lookback..n;

    let compare = |highest: bool, key: fn(&Candle) -> f64| -> bool {
        let (Some(p), Some(r)) = (
            extreme_index(candles, prior.clone(), key, highest),
            extreme_index(candles, recent.clone(), key, highest),
        ) else {
            return false;
        };
        let (Some(osc_p), Some(osc_r)) = (value_at(oscillator, p), value_at(oscillator, r)) else {
            return false;
        };
        let (price_p, price_r) = (key(&candles[p]), key(&candles[r]));
        if highest {
            price_r > price_p && osc_r < osc_p
        } else {
            price_r < price_p && osc_r > osc_p
        }
    };

    Divergence {
        bearish: compare(true, |c| c.high),
        bullish: compare(false, |c| c.low),
    }
}

pub fn detect_rsi_divergence(candles: &[Candle], rsi: &[Option<f64>], lookback: usize) -> Divergence {
    detect_price_divergence(candles, rsi, lookback)
}

pub fn detect_volume_divergence(candles: &[Candle], lookback: usize) -> Divergence {
    let volumes: Vec<Option<f64>> = candles.iter().map(|c| Some(c.volume)).collect();
    detect_price_divergence(candles, &volumes, lookback)
}

fn bullish_engulfs(prev: &Candle, cur: &Candle) -> bool {
    prev.is_bearish() && cur.is_bullish() && cur.open <= prev.close && cur.close >= prev.open
}

fn bearish_engulfs(prev: &Candle, cur: &Candle) -> bool {
    prev.is_bullish() && cur.is_bearish() && cur.open >= prev.close && cur.close <= prev.open
}

/// Confirmed engulfing patterns inside the current session (`session` is an index range).
///
/// A bullish engulfing counts only when the next candle closes higher and the engulfing candle
/// comes after the candle that formed the session high. Bearish mirrors against the session low.
pub fn detect_engulfing(candles: &[Candle], session: Range<usize>) -> EngulfingStatus {
    let session = session.start..session.end.min(candles.len());
    if session.len() < 3 {
        return EngulfingStatus::default();
    }
    let (Some(high_idx), Some(low_idx)) = (
        extreme_index(candles, session.clone(), |c| c.high, true),
        extreme_index(candles, session.clone(), |c| c.low, false),
    ) else {
        return EngulfingStatus::default();
    };

    let mut status = EngulfingStatus::default();
    for i in session.start + 1..session.end - 1 {
        let (prev, cur, next) = (&candles[i - 1], &candles[i], &candles[i + 1]);
        if i > high_idx && bullish_engulfs(prev, cur) && next.close > cur.close {
            status.bullish = true;
        }
        if i > low_idx && bearish_engulfs(prev, cur) && next.close < cur.close {
            status.bearish = true;
        }
    }
    status
}

#[cfg(test)]
mod tests {
    use {super::*, crate::config::ANALYSIS};

    const P: &PatternSettings = &ANALYSIS.patterns;

    #[test]
    fn breakout_failure_is_a_conjunction() {
        let s = detect_breakout(Some(105.0), Some(100.0), Some(95.0), Some(90.0));
        assert!(s.bullish && !s.bearish && !s.failure);

        let s = detect_breakout(Some(99.0), Some(100.0), Some(91.0), Some(90.0));
        assert!(!s.bullish && !s.bearish && s.failure);

        let s = detect_breakout(Some(99.0), Some(100.0), Some(89.0), Some(90.0));
        assert!(s.bearish && !s.failure);

        assert_eq!(
            detect_breakout(None, Some(100.0), Some(1.0), Some(1.0)),
            BreakoutStatus::default()
        );
    }

    #[test]
    fn tested_prev_high_uses_tiered_threshold() {
        assert!(detect_tested_prev_high(Some(100.0), Some(99.995), P));
        assert!(!detect_tested_prev_high(Some(100.0), Some(100.01), P));
        assert!(!detect_tested_prev_high(Some(100.0), Some(99.0), P));
        assert!(!detect_tested_prev_high(None, Some(99.995), P));

        // BTC-sized levels get a much tighter band.
        assert!(detect_tested_prev_high(Some(50_000.0), Some(49_998.0), P));
        assert!(!detect_tested_prev_high(Some(50_000.0), Some(49_990.0), P));
    }

    #[test]
    fn tested_prev_low_mirrors_high() {
        assert!(detect_tested_prev_low(Some(100.0), Some(100.05), P));
        assert!(!detect_tested_prev_low(Some(100.0), Some(99.99), P));
        // Sub-unit prices fall back to 1%.
        assert!(detect_tested_prev_low(Some(0.0001), Some(0.000_100_5), P));
    }

    #[test]
    fn threshold_tiers() {
        assert_eq!(tested_threshold_pct(20_000.0, P), 0.005);
        assert_eq!(tested_threshold_pct(2_000.0, P), 0.01);
        assert_eq!(tested_threshold_pct(2.0, P), 0.1);
        assert_eq!(tested_threshold_pct(0.5, P), 1.0);
    }

    #[test]
    fn top_patterns() {
        let t = detect_top_patterns(&[110.0, 100.0, 100.5], P);
        assert!(t.double_top && !t.descending_top && !t.top_failure);

        let t = detect_top_patterns(&[110.0, 105.0, 100.0], P);
        assert!(t.descending_top && !t.double_top);

        let t = detect_top_patterns(&[100.0, 105.0, 111.0], P);
        assert!(t.top_failure && !t.double_top);

        assert_eq!(detect_top_patterns(&[100.0], P), TopPatterns::default());
    }

    #[test]
    fn bottom_patterns() {
        let b = detect_bottom_patterns(&[90.0, 100.0, 99.5], P);
        assert!(b.double_bottom && !b.bottom_failure);

        let b = detect_bottom_patterns(&[90.0, 95.0, 99.0], P);
        assert!(b.ascending_bottom);

        let b = detect_bottom_patterns(&[90.0, 95.0, 85.0], P);
        assert!(b.bottom_failure && !b.double_bottom);
    }

    fn bar(i: usize, open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle::new(i as i64, open, high, low, close, 1.0)
    }

    #[test]
    fn bearish_rsi_divergence_on_higher_high() {
        let mut candles: Vec<Candle> = (0..6).map(|i| bar(i, 10.0, 11.0, 9.0, 10.0)).collect();
        candles[1].high = 12.0;
        candles[4].high = 13.0;
        let mut rsi = vec![Some(50.0); 6];
        rsi[1] = Some(70.0);
        rsi[4] = Some(60.0);

        let d = detect_rsi_divergence(&candles, &rsi, 3);
        assert!(d.bearish && !d.bullish);

        rsi[4] = Some(75.0);
        assert!(!detect_rsi_divergence(&candles, &rsi, 3).any());
        assert!(!detect_rsi_divergence(&candles[..5], &rsi, 3).any());
    }

    #[test]
    fn bullish_volume_divergence_on_lower_low() {
        let mut candles: Vec<Candle> = (0..4).map(|i| bar(i, 10.0, 11.0, 9.0, 10.0)).collect();
        candles[0].low = 8.0;
        candles[0].volume = 1.0;
        candles[3].low = 7.0;
        candles[3].volume = 3.0;
        let d = detect_volume_divergence(&candles, 2);
        assert!(d.bullish && !d.bearish);
    }

    #[test]
    fn engulfing_after_session_high() {
        let candles = vec![
            bar(0, 10.0, 15.0, 9.5, 11.0), // session high
            bar(1, 11.0, 11.2, 9.8, 10.0), // bearish
            bar(2, 9.9, 11.5, 9.7, 11.2),  // engulfs 1
            bar(3, 11.2, 12.0, 11.0, 11.8), // confirms
        ];
        let e = detect_engulfing(&candles, 0..4);
        assert!(e.bullish);
        assert!(!e.bearish);

        // Same structure but the high forms after the engulfing candle.
        let mut late_high = candles.clone();
        late_high[3].high = 20.0;
        assert!(!detect_engulfing(&late_high, 0..4).bullish);

        // Outside the session range nothing is scanned.
        assert!(!detect_engulfing(&candles, 2..4).bullish);
    }

    #[test]
    fn bearish_engulfing_after_session_low() {
        let candles = vec![
            bar(0, 10.0, 10.5, 5.0, 9.0),  // session low
            bar(1, 9.0, 10.2, 8.9, 10.0),  // bullish
            bar(2, 10.1, 10.3, 8.5, 8.8),  // engulfs 1
            bar(3, 8.8, 9.0, 8.0, 8.2),    // confirms
        ];
        let e = detect_engulfing(&candles, 0..4);
        assert!(e.bearish && !e.bullish);
    }
}
