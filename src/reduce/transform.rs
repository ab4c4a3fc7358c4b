use crate::reduce::tagging::ColumnKind;
use crate::reduce::ReduceError;

/// How duration columns are log-scaled before standardization.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum DurationScaling {
    /// `ln(1 + x)`
    #[default]
    Log1p,
    /// Clip to `[1, n]`, then `ln(1 + x) / ln(1 + n)`, mapping durations into `(0, 1]`.
    Bounded { n: f64 },
}

impl DurationScaling {
    /// Rejects bounds that are not finite or below one.
    pub fn validate(&self) -> Result<(), ReduceError> {
        match *self {
            DurationScaling::Bounded { n } if !n.is_finite() || n < 1.0 => Err(ReduceError::InvalidBound(n)),
            _ => Ok(()),
        }
    }

    /// Scales a single duration value. Missing values stay missing.
    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        match *self {
            DurationScaling::Log1p => log1p(value),
            DurationScaling::Bounded { n } => log1p(value.clamp(1.0, n)) / log1p(n),
        }
    }
}

/// `ln(1 + x)`; -1 maps to negative infinity and anything below to NaN.
#[inline]
pub fn log1p(value: f64) -> f64 {
    value.ln_1p()
}

/// Inverse of [`log1p`].
#[inline]
pub fn inverse_log1p(value: f64) -> f64 {
    value.exp_m1()
}

/// Applies the per-column transform: durations are scaled, Likert items pass through.
pub fn transform(values: &[f64], kind: ColumnKind, scaling: DurationScaling) -> Vec<f64> {
    match kind {
        ColumnKind::Likert => values.to_vec(),
        ColumnKind::Duration => values.iter().map(|value| scaling.apply(*value)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log1p_round_trip() {
        for value in [0.0, 0.5, 1.0, 3.0, 30.0, 1e-12, 12345.678, 1e9] {
            let restored = inverse_log1p(log1p(value));
            assert!((restored - value).abs() <= 1e-12 * value.abs().max(1.0), "{value} -> {restored}");
        }
    }

    #[test]
    fn log1p_domain_edges() {
        assert_eq!(log1p(-1.0), f64::NEG_INFINITY);
        assert!(log1p(-2.0).is_nan());
        assert!(log1p(f64::NAN).is_nan());
    }

    #[test]
    fn bounded_clipping() {
        let scaling = DurationScaling::Bounded { n: 5.0 };
        assert_eq!(scaling.apply(30.0), scaling.apply(5.0));
        assert_eq!(scaling.apply(5.0), 1.0);
        assert_eq!(scaling.apply(0.5), scaling.apply(1.0));
        assert_eq!(scaling.apply(-4.0), scaling.apply(1.0));
        assert!((scaling.apply(1.0) - 2f64.ln() / 6f64.ln()).abs() < 1e-15);
        assert!(scaling.apply(f64::NAN).is_nan());
    }

    #[test]
    fn bound_validation() {
        assert!(DurationScaling::Log1p.validate().is_ok());
        assert!(DurationScaling::Bounded { n: 1.0 }.validate().is_ok());
        assert!(matches!(DurationScaling::Bounded { n: 0.5 }.validate(), Err(ReduceError::InvalidBound(_))));
        assert!(DurationScaling::Bounded { n: f64::INFINITY }.validate().is_err());
        assert!(DurationScaling::Bounded { n: f64::NAN }.validate().is_err());
    }

    #[test]
    fn likert_passes_through() {
        let values = [1.0, f64::NAN, 5.0];
        let transformed = transform(&values, ColumnKind::Likert, DurationScaling::Log1p);
        assert_eq!(transformed[0], 1.0);
        assert!(transformed[1].is_nan());
        assert_eq!(transformed[2], 5.0);

        let transformed = transform(&[0.0, 9.0], ColumnKind::Duration, DurationScaling::Log1p);
        assert_eq!(transformed[0], 0.0);
        assert!((transformed[1] - 10f64.ln()).abs() < 1e-15);
    }
}
