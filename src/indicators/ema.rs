/// Exponential Moving Average.
///
/// Multiplier `k = 2 / (period + 1)`. The value at index `period - 1` is seeded with the SMA of the
/// first `period` inputs; every earlier slot is `None`. Output length always equals input length,
/// so a series shorter than `period` comes back as all `None`.
pub fn calculate_ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || values.len() < period {
        return vec![None; values.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut results = Vec::with_capacity(values.len());
    results.extend(std::iter::repeat_n(None, period - 1));

    let seed: f64 = values[..period].iter().sum::<f64>() / period as f64;
    results.push(Some(seed).filter(|v| v.is_finite()));

    let mut prev = seed;
    for &value in &values[period..] {
        let ema = value * k + prev * (1.0 - k);
        results.push(Some(ema).filter(|v| v.is_finite()));
        prev = ema;
    }
    results
}
