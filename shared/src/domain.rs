use serde::{Deserialize, Serialize};

/// Measure and target-variance bounds across all data points. Both pairs
/// default to 0 when no data point contributed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Domain {
    pub start: f64,
    pub end: f64,
    pub start_target_variance: f64,
    pub end_target_variance: f64,
}

/// Running min/max accumulator used during the view-model build.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DomainAccumulator {
    value: Option<(f64, f64)>,
    variance: Option<(f64, f64)>,
}

impl DomainAccumulator {
    pub fn include_value(&mut self, value: f64) {
        self.value = Some(match self.value {
            Some((min, max)) => (min.min(value), max.max(value)),
            None => (value, value),
        });
    }

    /// Non-finite variances (e.g. from a zero target) are excluded, not
    /// substituted with zero.
    pub fn include_variance(&mut self, variance: f64) {
        if !variance.is_finite() {
            return;
        }
        self.variance = Some(match self.variance {
            Some((min, max)) => (min.min(variance), max.max(variance)),
            None => (variance, variance),
        });
    }

    pub fn finish(self) -> Domain {
        let (start, end) = self.value.unwrap_or((0.0, 0.0));
        let (start_target_variance, end_target_variance) = self.variance.unwrap_or((0.0, 0.0));
        Domain {
            start,
            end,
            start_target_variance,
            end_target_variance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_accumulator_yields_zero_domain() {
        assert_eq!(DomainAccumulator::default().finish(), Domain::default());
    }

    #[test]
    fn tracks_running_min_max() {
        let mut acc = DomainAccumulator::default();
        acc.include_value(10.0);
        acc.include_value(20.0);
        acc.include_value(-5.0);
        let domain = acc.finish();
        assert_eq!(domain.start, -5.0);
        assert_eq!(domain.end, 20.0);
    }

    #[test]
    fn non_finite_variance_is_skipped() {
        let mut acc = DomainAccumulator::default();
        acc.include_variance(f64::INFINITY);
        acc.include_variance(f64::NAN);
        acc.include_variance(-0.5);
        let domain = acc.finish();
        assert_eq!(domain.start_target_variance, -0.5);
        assert_eq!(domain.end_target_variance, -0.5);
    }

    #[test]
    fn zero_variance_is_a_real_contribution() {
        let mut acc = DomainAccumulator::default();
        acc.include_variance(0.0);
        acc.include_variance(0.25);
        let domain = acc.finish();
        assert_eq!(domain.start_target_variance, 0.0);
        assert_eq!(domain.end_target_variance, 0.25);
    }
}
