use chorograph_shared::settings::DisplayUnit;

/// A format string containing `%` marks the measure as a percentage; the
/// builder then treats target variance as a raw difference.
pub fn is_percent_format(format: &str) -> bool {
    format.contains('%')
}

fn unit_for(value: f64, unit: DisplayUnit) -> (f64, &'static str) {
    match unit {
        DisplayUnit::None => (1.0, ""),
        DisplayUnit::Thousands => (1e3, "K"),
        DisplayUnit::Millions => (1e6, "M"),
        DisplayUnit::Billions => (1e9, "bn"),
        DisplayUnit::Auto => {
            let magnitude = value.abs();
            if magnitude >= 1e9 {
                (1e9, "bn")
            } else if magnitude >= 1e6 {
                (1e6, "M")
            } else if magnitude >= 1e4 {
                (1e3, "K")
            } else {
                (1.0, "")
            }
        }
    }
}

fn trim_decimals(text: &str) -> String {
    if !text.contains('.') {
        return text.to_string();
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Format a measure value for labels and tooltips. Percentage formats
/// scale by 100 and suffix `%`; other values apply the display unit and
/// the configured precision (or a trimmed default).
pub fn format_value(value: f64, format: Option<&str>, unit: DisplayUnit, precision: Option<u8>) -> String {
    if format.is_some_and(is_percent_format) {
        let scaled = value * 100.0;
        return match precision {
            Some(p) => format!("{scaled:.0$}%", p as usize),
            None => format!("{}%", trim_decimals(&format!("{scaled:.2}"))),
        };
    }

    let (divisor, suffix) = unit_for(value, unit);
    let scaled = value / divisor;
    let body = match precision {
        Some(p) => format!("{scaled:.0$}", p as usize),
        None if divisor > 1.0 => trim_decimals(&format!("{scaled:.2}")),
        None => trim_decimals(&format!("{scaled:.4}")),
    };
    format!("{body}{suffix}")
}
