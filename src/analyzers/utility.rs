/// Computes the arithmetic mean of a slice of values. Returns `None` for
/// empty input so callers can report a missing value instead of zero.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty_is_none() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_mean_values() {
        assert_eq!(mean(&[0.4]), Some(0.4));
        assert_eq!(mean(&[0.25, 0.5, 0.75]), Some(0.5));
    }

    #[test]
    fn test_mean_inexact_sum() {
        // 0.2 + 0.4 + 0.6 does not sum exactly in binary
        let m = mean(&[0.2, 0.4, 0.6]).unwrap();
        assert!((m - 0.4).abs() < 1e-9);
    }
}
