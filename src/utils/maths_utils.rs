use std::f64;

/// Absolute distance between `value` and `reference`, as a percentage of `reference`.
/// Returns None when the reference is zero or either side is not finite.
#[inline]
pub(crate) fn pct_distance(value: f64, reference: f64) -> Option<f64> {
    if !value.is_finite() || !reference.is_finite() || reference.abs() <= f64::EPSILON {
        return None;
    }
    Some((value - reference).abs() / reference.abs() * 100.0)
}

/// Signed gap of `value` above `reference` in percent.
#[inline]
pub(crate) fn pct_gap(value: f64, reference: f64) -> Option<f64> {
    if !value.is_finite() || !reference.is_finite() || reference.abs() <= f64::EPSILON {
        return None;
    }
    Some((value - reference) / reference * 100.0)
}

/// Largest finite value of an iterator, None when there is none.
#[inline]
pub(crate) fn max_finite<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
}

/// Smallest finite value of an iterator, None when there is none.
#[inline]
pub(crate) fn min_finite<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.min(v))))
}

/// Value of an indicator series at `idx`, flattening out-of-range and not-yet-computed slots.
#[inline]
pub(crate) fn value_at(series: &[Option<f64>], idx: usize) -> Option<f64> {
    series.get(idx).copied().flatten()
}

/// The last `n` values of a series, all of which must be present.
pub(crate) fn last_n_present(series: &[Option<f64>], n: usize) -> Option<Vec<f64>> {
    if n == 0 || series.len() < n {
        return None;
    }
    series[series.len() - n..].iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pct_helpers_reject_zero_reference() {
        assert_eq!(pct_distance(1.0, 0.0), None);
        assert_eq!(pct_gap(1.0, 0.0), None);
        assert_eq!(pct_distance(99.0, 100.0), Some(1.0));
        assert_eq!(pct_gap(110.0, 100.0), Some(10.0));
    }

    #[test]
    fn extremes_skip_non_finite() {
        let values = [1.0, f64::NAN, 5.0, f64::INFINITY, -2.0];
        assert_eq!(max_finite(values), Some(5.0));
        assert_eq!(min_finite(values), Some(-2.0));
        assert_eq!(max_finite(Vec::<f64>::new()), None);
    }

    #[test]
    fn last_n_requires_every_value() {
        let series = [None, Some(1.0), Some(2.0), Some(3.0)];
        assert_eq!(last_n_present(&series, 3), Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(last_n_present(&series, 4), None);
        assert_eq!(last_n_present(&series, 5), None);
        assert_eq!(value_at(&series, 0), None);
        assert_eq!(value_at(&series, 9), None);
    }
}
