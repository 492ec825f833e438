/// Relative Strength Index with Wilder smoothing.
///
/// The first `period` slots are `None`. Average gain/loss are seeded with the simple mean of the
/// first `period` deltas and then smoothed as `avg = (avg * (period - 1) + current) / period`.
/// A zero average loss gives an infinite RS and therefore an RSI of exactly 100.
///
/// Returns an empty vector when `closes.len() <= period` (nothing can be computed).
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || closes.len() <= period {
        return Vec::new();
    }

    let mut results = vec![None; period];

    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in 1..=period {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change; // losses are positive values
        }
    }

    let mut avg_gain = gains / period as f64;
    let mut avg_loss = losses / period as f64;
    results.push(rsi_from_averages(avg_gain, avg_loss));

    for i in (period + 1)..closes.len() {
        let change = closes[i] - closes[i - 1];
        let (current_gain, current_loss) = if change > 0.0 {
            (change, 0.0)
        } else {
            (0.0, -change)
        };

        avg_gain = (avg_gain * (period - 1) as f64 + current_gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + current_loss) / period as f64;
        results.push(rsi_from_averages(avg_gain, avg_loss));
    }
    results
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rs = if avg_loss == 0.0 {
        f64::INFINITY
    } else {
        avg_gain / avg_loss
    };
    let rsi = 100.0 - 100.0 / (1.0 + rs);
    Some(rsi).filter(|v| v.is_finite())
}
