use std::fmt;

/// Descriptive statistics of one numeric column, as `DataFrame.describe`.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (ddof = 1)
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl Summary {
    /// Describes the present (non-NaN) values. Statistics of an empty sample are NaN.
    pub fn describe(name: &str, values: &[f64]) -> Summary {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|value| !value.is_nan()).collect();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = if count == 0 {
            f64::NAN
        } else {
            sorted.iter().sum::<f64>() / count as f64
        };
        let std = if count < 2 {
            f64::NAN
        } else {
            let squares = sorted.iter().map(|value| (value - mean).powi(2)).sum::<f64>();
            (squares / (count - 1) as f64).sqrt()
        };

        Summary {
            name: name.to_owned(),
            count,
            mean,
            std,
            min: quantile(&sorted, 0.0),
            q25: quantile(&sorted, 0.25),
            q50: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: quantile(&sorted, 1.0),
        }
    }

    fn rows(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.q50),
            ("75%", self.q75),
            ("max", self.max),
        ]
    }
}

/// Linear interpolation between closest ranks of sorted values.
pub(crate) fn quantile(sorted: &[f64], probability: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let position = probability * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<String> = self.rows().iter().map(|(_, value)| format!("{value:.6}")).collect();
        let width = cells
            .iter()
            .map(|cell| cell.len())
            .chain([self.name.chars().count()])
            .max()
            .unwrap_or(0);
        writeln!(f, "{:5}  {:>width$}", "", self.name)?;
        for ((label, _), cell) in self.rows().iter().zip(&cells) {
            writeln!(f, "{label:5}  {cell:>width$}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_sample() {
        let summary = Summary::describe("score", &[4.0, 1.0, f64::NAN, 3.0, 2.0]);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, 2.5);
        assert!((summary.std - (5.0f64 / 3.0).sqrt()).abs() < 1e-15);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.q25, 1.75);
        assert_eq!(summary.q50, 2.5);
        assert_eq!(summary.q75, 3.25);
        assert_eq!(summary.max, 4.0);
    }

    #[test]
    fn describe_degenerate() {
        let empty = Summary::describe("score", &[f64::NAN]);
        assert_eq!(empty.count, 0);
        assert!(empty.mean.is_nan() && empty.std.is_nan() && empty.min.is_nan() && empty.max.is_nan());

        let single = Summary::describe("score", &[7.0]);
        assert_eq!(single.mean, 7.0);
        assert!(single.std.is_nan());
        assert_eq!(single.q75, 7.0);
    }

    #[test]
    fn display_layout() {
        let rendered = Summary::describe("score", &[1.0, 3.0]).to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "          score");
        assert_eq!(lines[1], "count  2.000000");
        assert_eq!(lines[2], "mean   2.000000");
        assert_eq!(lines[8], "max    3.000000");
    }
}
