//! Common time and statistics helpers for gaze_core.

/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: f64 = 1_000.0;

/// Sampling frequency implied by an inter-sample interval, if the interval is positive.
#[inline]
pub fn hz_from_interval_ms(dt_ms: f64) -> Option<f64> {
    if dt_ms > 0.0 && dt_ms.is_finite() {
        Some(MILLIS_PER_SEC / dt_ms)
    } else {
        None
    }
}

/// Mean and population standard deviation. `(0, 0)` for an empty input.
pub fn mean_std<I>(values: I) -> (f64, f64)
where
    I: IntoIterator<Item = f64>,
    I::IntoIter: Clone,
{
    let it = values.into_iter();
    let n = it.clone().count();
    if n == 0 {
        return (0.0, 0.0);
    }
    let n = n as f64;
    let mean = it.clone().sum::<f64>() / n;
    let var = it.map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_to_hz() {
        assert_eq!(hz_from_interval_ms(50.0), Some(20.0));
        assert_eq!(hz_from_interval_ms(0.0), None);
        assert_eq!(hz_from_interval_ms(-10.0), None);
        assert_eq!(hz_from_interval_ms(f64::NAN), None);
    }

    #[test]
    fn population_std() {
        let (m, s) = mean_std([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(m, 5.0);
        assert_eq!(s, 2.0);
        assert_eq!(mean_std(std::iter::empty::<f64>()), (0.0, 0.0));
    }
}
