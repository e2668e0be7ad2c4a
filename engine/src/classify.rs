//! State classification: derive the comparison operand from a data
//! point and walk the sorted thresholds until one holds.

use chorograph_shared::{CalculateMode, Comparison, DataPoint, StateThreshold};

/// Difference and target-relative variance of a state value. Without a
/// target both are zero, so absolute classification still works.
/// When the state measure is already percent-formatted the raw
/// difference *is* the variance.
pub fn target_metrics(state_value: f64, target: Option<f64>, are_percentages: bool) -> (f64, f64) {
    match target {
        Some(target) => {
            let diff = state_value - target;
            let variance = if are_percentages { diff } else { diff / target };
            (diff, variance)
        }
        None => (0.0, 0.0),
    }
}

/// The classification operand for one data point under a calculate mode.
/// `None` when the point has no state value to classify.
pub fn operand(
    point: &DataPoint,
    mode: CalculateMode,
    are_percentages: bool,
    has_highlights: bool,
) -> Option<f64> {
    let state_value = point
        .effective_state_value(has_highlights)
        .or(point.effective_value(has_highlights))?;
    let value = match mode {
        CalculateMode::Absolute => state_value,
        CalculateMode::Modifier => target_metrics(state_value, point.target, are_percentages).0,
        CalculateMode::Percentage => target_metrics(state_value, point.target, are_percentages).1,
    };
    Some(value)
}

/// First threshold the point falls into, honoring per-point threshold
/// restrictions. Thresholds must already be in evaluation order.
pub fn classify<'a>(
    point: &DataPoint,
    thresholds: &'a [StateThreshold],
    mode: CalculateMode,
    comparison: Comparison,
    are_percentages: bool,
    has_highlights: bool,
) -> Option<&'a StateThreshold> {
    let operand = operand(point, mode, are_percentages, has_highlights)?;
    thresholds.iter().find(|threshold| {
        let applies = match &threshold.data_point_identity {
            Some(owner) => point.identity.as_ref() == Some(owner),
            None => true,
        };
        applies && comparison.holds(operand, threshold.value)
    })
}
