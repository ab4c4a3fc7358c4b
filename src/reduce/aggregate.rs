/// How a row with missing contributions is averaged.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MissingPolicy {
    /// Any missing contribution makes the row missing
    #[default]
    Propagate,
    /// Average the present contributions; missing only when none is present
    Skip,
}

/// Row-wise arithmetic mean across equally long columns.
/// Without columns every row is missing.
pub fn row_mean(columns: &[Vec<f64>], height: usize, policy: MissingPolicy) -> Vec<f64> {
    (0..height)
        .map(|row| {
            let mut sum = 0.0;
            let mut count = 0usize;
            for column in columns {
                let value = column[row];
                if value.is_nan() {
                    if policy == MissingPolicy::Propagate {
                        return f64::NAN;
                    }
                } else {
                    sum += value;
                    count += 1;
                }
            }
            if count == 0 {
                f64::NAN
            } else {
                sum / count as f64
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairwise_mean_is_exact() {
        let a = vec![-1.3, 0.25, 7.0 / 3.0];
        let b = vec![0.7, 0.5, -1.0 / 3.0];
        let mean = row_mean(&[a.clone(), b.clone()], 3, MissingPolicy::Propagate);
        for row in 0..3 {
            assert_eq!(mean[row], (a[row] + b[row]) / 2.0);
        }
    }

    #[test]
    fn missing_propagates() {
        let mean = row_mean(&[vec![1.0, f64::NAN], vec![3.0, 5.0]], 2, MissingPolicy::Propagate);
        assert_eq!(mean[0], 2.0);
        assert!(mean[1].is_nan());
    }

    #[test]
    fn missing_skipped() {
        let columns = [vec![1.0, f64::NAN, f64::NAN], vec![3.0, 5.0, f64::NAN]];
        let mean = row_mean(&columns, 3, MissingPolicy::Skip);
        assert_eq!(mean[0], 2.0);
        assert_eq!(mean[1], 5.0);
        assert!(mean[2].is_nan());
    }

    #[test]
    fn no_columns() {
        let mean = row_mean(&[], 2, MissingPolicy::Skip);
        assert_eq!(mean.len(), 2);
        assert!(mean.iter().all(|value| value.is_nan()));
    }
}
