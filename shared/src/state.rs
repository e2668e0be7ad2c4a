use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::colors::{self, Rgb};
use crate::datapoint::SelectionKey;

/// How the classification operand is derived from a data point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculateMode {
    /// Compare the raw value.
    #[default]
    Absolute,
    /// Compare `value - target`.
    Modifier,
    /// Compare the target-relative variance.
    Percentage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Comparison {
    #[default]
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "=")]
    Eq,
}

impl Comparison {
    pub fn holds(self, operand: f64, boundary: f64) -> bool {
        match self {
            Comparison::Gt => operand > boundary,
            Comparison::Ge => operand >= boundary,
            Comparison::Lt => operand < boundary,
            Comparison::Le => operand <= boundary,
            Comparison::Eq => operand == boundary,
        }
    }

    pub fn is_ascending(self) -> bool {
        matches!(self, Comparison::Lt | Comparison::Le)
    }
}

/// One classification boundary. Thresholds are walked in their final
/// sorted order at render time; the first hit wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateThreshold {
    pub value: f64,
    pub color: Option<Rgb>,
    pub display_name: Option<String>,
    pub is_target: bool,
    pub source_position: usize,
    /// Selection key of the measure that produced this threshold, if any.
    pub identity: Option<SelectionKey>,
    /// When set, the threshold only applies to the data point with this key.
    pub data_point_identity: Option<SelectionKey>,
}

/// Sort thresholds for evaluation. `=` keeps source order; `<`-style
/// comparisons sort ascending by value, `>`-style descending; equal
/// values keep ascending source position either way.
pub fn sort_thresholds(thresholds: &mut [StateThreshold], comparison: Comparison) {
    if comparison == Comparison::Eq {
        return;
    }
    let ascending = comparison.is_ascending();
    thresholds.sort_by(|a, b| {
        let by_value = if ascending {
            a.value.partial_cmp(&b.value)
        } else {
            b.value.partial_cmp(&a.value)
        }
        .unwrap_or(Ordering::Equal);
        by_value.then_with(|| a.source_position.cmp(&b.source_position))
    });
}

/// Move every target threshold to the end of the list, preserving the
/// relative order among targets, so the target band is evaluated last.
pub fn relocate_targets(thresholds: &mut Vec<StateThreshold>) {
    let (rest, targets): (Vec<_>, Vec<_>) =
        thresholds.drain(..).partition(|state| !state.is_target);
    thresholds.extend(rest);
    thresholds.extend(targets);
}

/// Fill in missing colors from the generated ramp, sized to the
/// threshold count and keyed by comparison direction.
pub fn assign_palette(thresholds: &mut [StateThreshold], comparison: Comparison) {
    let palette = colors::state_palette(thresholds.len(), comparison);
    for (threshold, ramp_color) in thresholds.iter_mut().zip(palette) {
        if threshold.color.is_none() {
            threshold.color = Some(ramp_color);
        }
    }
}
