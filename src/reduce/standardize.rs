/// What a zero-deviation column turns into.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum ConstantPolicy {
    /// Every value becomes NaN (0 / 0)
    #[default]
    Nan,
    /// Every present value becomes 0
    Zero,
}

/// Result of standardizing one column.
#[derive(Clone, Debug, PartialEq)]
pub struct Standardized {
    pub values: Vec<f64>,
    pub mean: f64,
    /// Population standard deviation (ddof = 0)
    pub std: f64,
    /// True when present values exist but do not vary
    pub constant: bool,
}

/// Z-scores a column: `(x - mean) / std` with the population deviation.
/// NaN marks missing values; they are left out of the moments and stay NaN.
pub fn zscore(values: &[f64], policy: ConstantPolicy) -> Standardized {
    let present: Vec<f64> = values.iter().copied().filter(|value| !value.is_nan()).collect();
    if present.is_empty() {
        return Standardized {
            values: vec![f64::NAN; values.len()],
            mean: f64::NAN,
            std: f64::NAN,
            constant: false,
        };
    }

    // Rounding leaves a tiny nonzero deviation on repeated values, so compare them directly.
    let constant = present.iter().all(|value| *value == present[0]);
    let count = present.len() as f64;
    let mean = present.iter().sum::<f64>() / count;
    let std = if constant {
        0.0
    } else {
        (present.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / count).sqrt()
    };

    let values = values
        .iter()
        .map(|value| match (constant, policy) {
            _ if value.is_nan() => f64::NAN,
            (true, ConstantPolicy::Nan) => f64::NAN,
            (true, ConstantPolicy::Zero) => 0.0,
            (false, _) => (value - mean) / std,
        })
        .collect();
    Standardized { values, mean, std, constant }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(left: &[f64], right: &[f64]) -> bool {
        left.len() == right.len()
            && left.iter().zip(right).all(|(a, b)| (a.is_nan() && b.is_nan()) || (a - b).abs() < 1e-12)
    }

    #[test]
    fn zero_mean_unit_variance() {
        let result = zscore(&[1.0, 2.0, 3.0, 4.0, 5.0], ConstantPolicy::Nan);
        assert_eq!(result.mean, 3.0);
        assert!((result.std - 2f64.sqrt()).abs() < 1e-15);
        assert!(!result.constant);
        let half = 1.0 / 2f64.sqrt();
        assert!(close(&result.values, &[-2.0 * half, -half, 0.0, half, 2.0 * half]));
    }

    #[test]
    fn missing_values_excluded() {
        let result = zscore(&[2.0, f64::NAN, 4.0], ConstantPolicy::Nan);
        assert_eq!(result.mean, 3.0);
        assert_eq!(result.std, 1.0);
        assert!(close(&result.values, &[-1.0, f64::NAN, 1.0]));
    }

    #[test]
    fn constant_column() {
        let result = zscore(&[3.0, 3.0, f64::NAN, 3.0], ConstantPolicy::Nan);
        assert!(result.constant);
        assert!(result.values.iter().all(|value| value.is_nan()));

        let result = zscore(&[3.0, 3.0, f64::NAN, 3.0], ConstantPolicy::Zero);
        assert!(result.constant);
        assert!(close(&result.values, &[0.0, 0.0, f64::NAN, 0.0]));
    }

    #[test]
    fn repeated_inexact_values_are_constant() {
        for value in [0.1, 3.3] {
            let result = zscore(&[value; 7], ConstantPolicy::Zero);
            assert!(result.constant, "{value} repeated is constant");
            assert_eq!(result.std, 0.0);
            assert_eq!(result.values, vec![0.0; 7]);
        }

        let result = zscore(&[0.1; 3], ConstantPolicy::Nan);
        assert!(result.constant);
        assert!(result.values.iter().all(|value| value.is_nan()));

        let scaled = vec![30f64.ln_1p() / 121f64.ln(); 6];
        let result = zscore(&scaled, ConstantPolicy::Nan);
        assert!(result.constant);
        assert!(result.values.iter().all(|value| value.is_nan()));
    }

    #[test]
    fn all_missing_column() {
        let result = zscore(&[f64::NAN, f64::NAN], ConstantPolicy::Zero);
        assert!(!result.constant);
        assert!(result.values.iter().all(|value| value.is_nan()));
        assert!(zscore(&[], ConstantPolicy::Nan).values.is_empty());
    }
}
