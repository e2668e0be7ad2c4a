//! Fill saturation: wash a data point's color toward white according to
//! where its value sits inside the configured (or data-derived) band.

use chorograph_shared::{DataPointSettings, Domain, Rgb, white_blend};

/// Saturation fraction for a raw measure value. The configured min/max
/// percentages scale the data domain; a 0% bound means "use the domain
/// bound itself".
pub fn value_fraction(value: f64, settings: &DataPointSettings, domain: &Domain) -> f64 {
    let low = if settings.saturate_min != 0.0 {
        (settings.saturate_min / 100.0) * domain.start
    } else {
        domain.start
    };
    let high = if settings.saturate_max != 0.0 {
        (settings.saturate_max / 100.0) * domain.end
    } else {
        domain.end
    };
    fraction(value, low, high)
}

/// Saturation fraction for a target variance. Here the configured
/// percentages are variances themselves, not domain multipliers.
pub fn variance_fraction(variance: f64, settings: &DataPointSettings, domain: &Domain) -> f64 {
    let low = if settings.saturate_min != 0.0 {
        settings.saturate_min / 100.0
    } else {
        domain.start_target_variance
    };
    let high = if settings.saturate_max != 0.0 {
        settings.saturate_max / 100.0
    } else {
        domain.end_target_variance
    };
    fraction(variance, low, high)
}

fn fraction(value: f64, low: f64, high: f64) -> f64 {
    let fraction = (value - low) / (high - low);
    if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Apply a saturation fraction: 1 keeps the full color, 0 washes it all
/// the way to white.
pub fn apply(color: Rgb, fraction: f64) -> Rgb {
    white_blend(color, 1.0 - fraction.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(min: f64, max: f64) -> DataPointSettings {
        let mut settings = DataPointSettings::default();
        settings.saturate = true;
        settings.saturate_min = min;
        settings.saturate_max = max;
        settings
    }

    fn domain(start: f64, end: f64) -> Domain {
        Domain {
            start,
            end,
            start_target_variance: -0.5,
            end_target_variance: 0.5,
        }
    }

    #[test]
    fn zero_bounds_fall_back_to_domain() {
        let domain = domain(10.0, 20.0);
        assert_eq!(value_fraction(10.0, &settings(0.0, 100.0), &domain), 0.0);
        assert_eq!(value_fraction(20.0, &settings(0.0, 100.0), &domain), 1.0);
        assert_eq!(value_fraction(15.0, &settings(0.0, 100.0), &domain), 0.5);
    }

    #[test]
    fn configured_bounds_scale_the_domain() {
        let domain = domain(100.0, 200.0);
        let settings = settings(50.0, 100.0);
        // band is 50%..100% of the 100..200 domain, i.e. 50..200
        assert_eq!(value_fraction(50.0, &settings, &domain), 0.0);
        assert_eq!(value_fraction(200.0, &settings, &domain), 1.0);
        assert_eq!(value_fraction(125.0, &settings, &domain), 0.5);
    }

    #[test]
    fn variance_bounds_are_plain_fractions() {
        let domain = domain(0.0, 0.0);
        let settings = settings(0.0, 100.0);
        // -0.5..1.0 band: domain start, configured end
        assert_eq!(variance_fraction(-0.5, &settings, &domain), 0.0);
        assert_eq!(variance_fraction(1.0, &settings, &domain), 1.0);
        assert_eq!(variance_fraction(0.25, &settings, &domain), 0.5);
    }

    #[test]
    fn out_of_band_values_clamp() {
        let domain = domain(10.0, 20.0);
        let settings = settings(0.0, 100.0);
        assert_eq!(value_fraction(-100.0, &settings, &domain), 0.0);
        assert_eq!(value_fraction(1000.0, &settings, &domain), 1.0);
    }

    #[test]
    fn degenerate_band_yields_zero() {
        let flat = Domain::default();
        assert_eq!(value_fraction(5.0, &settings(0.0, 0.0), &flat), 0.0);
        assert_eq!(variance_fraction(f64::NAN, &settings(0.0, 100.0), &flat), 0.0);
    }

    #[test]
    fn apply_washes_toward_white() {
        let color = Rgb::new(0x01, 0xb8, 0xaa);
        assert_eq!(apply(color, 1.0), color);
        assert_eq!(apply(color, 0.0), Rgb::WHITE);
        let half = apply(color, 0.5);
        assert!(half.r > color.r && half.g > color.g);
    }
}
