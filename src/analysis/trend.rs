use crate::{
    config::TrendSettings,
    domain::Candle,
    models::{LevelKind, Trend, TrendResult},
    utils::{pct_distance, value_at},
};

/// Sign change of `fast - slow` between `i - 1` and `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cross {
    Up,
    Down,
}

/// Crossover of `fast` over `slow` landing on index `i`, if any.
pub(crate) fn cross_at(fast: &[Option<f64>], slow: &[Option<f64>], i: usize) -> Option<Cross> {
    if i == 0 {
        return None;
    }
    let (pf, ps) = (value_at(fast, i - 1)?, value_at(slow, i - 1)?);
    let (cf, cs) = (value_at(fast, i)?, value_at(slow, i)?);
    if pf <= ps && cf > cs {
        Some(Cross::Up)
    } else if pf >= ps && cf < cs {
        Some(Cross::Down)
    } else {
        None
    }
}

/// Classify the main trend from the EMA70/EMA200 pair.
///
/// Scans backward from the second-to-last index down to 1 for the most recent crossover. The
/// crossover candle's close becomes the support (bullish) or resistance (bearish) level, and the
/// last candle is checked for a breakout beyond EMA200 and for a doji after that breakout.
///
/// Without a crossover in range, the current EMA ordering decides and `breakout` is `None`.
/// Returns `None` only when there are no candles or the latest EMA values are not computed yet.
pub fn get_main_trend(
    ema70: &[Option<f64>],
    ema200: &[Option<f64>],
    candles: &[Candle],
    settings: &TrendSettings,
) -> Option<TrendResult> {
    let last = candles.last()?;
    let last_idx = candles.len() - 1;
    let last_70 = value_at(ema70, last_idx)?;
    let last_200 = value_at(ema200, last_idx)?;

    let is_near = |level: f64| {
        pct_distance(last.close, level).is_some_and(|d| d <= settings.tolerance_pct)
    };
    let is_doji = last.body_to_range_ratio() <= settings.doji_tolerance_ratio;

    for i in (1..last_idx).rev() {
        let (trend, kind, breakout) = match cross_at(ema70, ema200, i) {
            Some(Cross::Up) => (Trend::Bullish, LevelKind::Support, last.close > last_200),
            Some(Cross::Down) => (Trend::Bearish, LevelKind::Resistance, last.close < last_200),
            None => continue,
        };
        let crossover_price = candles[i].close;
        return Some(TrendResult {
            trend,
            kind,
            crossover_price,
            breakout: Some(breakout),
            is_near: is_near(crossover_price),
            is_doji_after_breakout: breakout && is_doji,
        });
    }

    let (trend, kind) = if last_70 >= last_200 {
        (Trend::Bullish, LevelKind::Support)
    } else {
        (Trend::Bearish, LevelKind::Resistance)
    };
    Some(TrendResult {
        trend,
        kind,
        crossover_price: last.close,
        breakout: None,
        is_near: true,
        is_doji_after_breakout: false,
    })
}

#[cfg(test)]
mod tests {
    use {super::*, crate::config::ANALYSIS};

    fn flat_candles(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new(i as i64, c - 0.5, c + 1.0, c - 1.0, c, 1.0))
            .collect()
    }

    #[test]
    fn planted_bullish_crossover_is_found() {
        let k = 6;
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let candles = flat_candles(&closes);
        let ema200: Vec<Option<f64>> = vec![Some(105.0); 10];
        let ema70: Vec<Option<f64>> = (0..10)
            .map(|i| Some(if i < k { 104.0 } else { 106.0 }))
            .collect();

        let result = get_main_trend(&ema70, &ema200, &candles, &ANALYSIS.trend).unwrap();
        assert_eq!(result.trend, Trend::Bullish);
        assert_eq!(result.kind, LevelKind::Support);
        assert_eq!(result.crossover_price, closes[k]);
        assert_eq!(result.breakout, Some(closes[9] > 105.0));
        assert!(!result.is_near);
    }

    #[test]
    fn most_recent_crossover_wins() {
        let candles = flat_candles(&[10.0; 8]);
        let ema200 = vec![Some(10.0); 8];
        // Up at 2, down at 5.
        let ema70 = [9.0, 9.0, 11.0, 11.0, 11.0, 9.0, 9.0, 9.0].map(Some).to_vec();
        let result = get_main_trend(&ema70, &ema200, &candles, &ANALYSIS.trend).unwrap();
        assert_eq!(result.trend, Trend::Bearish);
        assert_eq!(result.kind, LevelKind::Resistance);
        assert_eq!(result.breakout, Some(false));
        assert!(result.is_near);
    }

    #[test]
    fn crossover_on_last_index_is_not_scanned() {
        let candles = flat_candles(&[10.0; 5]);
        let ema200 = vec![Some(10.0); 5];
        let ema70 = [9.0, 9.0, 9.0, 9.0, 11.0].map(Some).to_vec();
        let result = get_main_trend(&ema70, &ema200, &candles, &ANALYSIS.trend).unwrap();
        assert_eq!(result.trend, Trend::Bullish);
        assert_eq!(result.breakout, None);
        assert!(result.is_near);
        assert_eq!(result.crossover_price, 10.0);
    }

    #[test]
    fn doji_after_breakout_needs_breakout() {
        let mut candles = flat_candles(&[10.0, 10.0, 10.0, 12.0]);
        // Doji: body 0.01 over range 2.
        candles[3] = Candle::new(3, 12.0, 13.0, 11.0, 12.01, 1.0);
        let ema200 = vec![Some(11.0); 4];
        let ema70 = [10.0, 10.0, 12.0, 12.0].map(Some).to_vec();
        let result = get_main_trend(&ema70, &ema200, &candles, &ANALYSIS.trend).unwrap();
        assert_eq!(result.breakout, Some(true));
        assert!(result.is_doji_after_breakout);

        let ema200 = vec![Some(12.5); 4];
        let ema70 = [12.0, 12.0, 13.0, 13.0].map(Some).to_vec();
        let result = get_main_trend(&ema70, &ema200, &candles, &ANALYSIS.trend).unwrap();
        assert_eq!(result.breakout, Some(false));
        assert!(!result.is_doji_after_breakout);
    }

    #[test]
    fn missing_data_yields_none() {
        assert!(get_main_trend(&[], &[], &[], &ANALYSIS.trend).is_none());
        let candles = flat_candles(&[1.0, 2.0]);
        assert!(get_main_trend(&[None, None], &[None, None], &candles, &ANALYSIS.trend).is_none());
    }
}
