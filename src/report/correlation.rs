use std::fmt;

/// Pearson correlations between named columns, as `DataFrame.corr`.
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    /// Row-major, `names.len()` squared entries
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Correlates every pair of columns over the rows where both are present.
    pub fn compute(columns: &[(String, Vec<f64>)]) -> CorrelationMatrix {
        let names = columns.iter().map(|(name, _)| name.to_owned()).collect();
        let values = columns
            .iter()
            .map(|(_, left)| columns.iter().map(|(_, right)| pearson(left, right)).collect())
            .collect();
        CorrelationMatrix { names, values }
    }

    /// Looks up the correlation between two columns by name.
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let row = self.names.iter().position(|name| name == row)?;
        let col = self.names.iter().position(|name| name == col)?;
        Some(self.values[row][col])
    }
}

/// Pearson coefficient over pairwise-complete observations.
/// NaN with fewer than two pairs or when either side does not vary.
pub fn pearson(left: &[f64], right: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = left
        .iter()
        .zip(right)
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .map(|(x, y)| (*x, *y))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let count = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / count;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / count;
    let (mut covariance, mut variance_x, mut variance_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }
    if variance_x == 0.0 || variance_y == 0.0 {
        return f64::NAN;
    }
    (covariance / (variance_x * variance_y).sqrt()).clamp(-1.0, 1.0)
}

impl fmt::Display for CorrelationMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self.names.iter().map(|name| name.chars().count()).max().unwrap_or(0);
        let widths: Vec<usize> = self.names.iter().map(|name| name.chars().count().max(9)).collect();

        write!(f, "{:label_width$}", "")?;
        for (name, width) in self.names.iter().zip(&widths) {
            write!(f, "  {name:>width$}")?;
        }
        writeln!(f)?;
        for (name, row) in self.names.iter().zip(&self.values) {
            write!(f, "{name:label_width$}")?;
            for (value, width) in row.iter().zip(&widths) {
                write!(f, "  {value:>width$.6}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_correlations() {
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]), 1.0);
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]), -1.0);
    }

    #[test]
    fn pairwise_complete_rows() {
        let left = [1.0, 2.0, f64::NAN, 4.0];
        let right = [1.0, f64::NAN, 100.0, 3.0];
        assert_eq!(pearson(&left, &right), 1.0);
    }

    #[test]
    fn undefined_correlations() {
        assert!(pearson(&[1.0], &[2.0]).is_nan());
        assert!(pearson(&[1.0, f64::NAN], &[f64::NAN, 2.0]).is_nan());
        assert!(pearson(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]).is_nan());
    }

    #[test]
    fn matrix_lookup_and_display() {
        let matrix = CorrelationMatrix::compute(&[
            ("q1".to_owned(), vec![1.0, 2.0, 3.0]),
            ("reduced".to_owned(), vec![3.0, 2.0, 1.0]),
        ]);
        assert_eq!(matrix.get("q1", "reduced"), Some(-1.0));
        assert_eq!(matrix.get("reduced", "reduced"), Some(1.0));
        assert_eq!(matrix.get("q1", "q9"), None);

        let rendered = matrix.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "                q1    reduced");
        assert_eq!(lines[1], "q1        1.000000  -1.000000");
        assert_eq!(lines[2], "reduced  -1.000000   1.000000");
    }
}
