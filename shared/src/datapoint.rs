use serde::{Deserialize, Serialize};

use crate::colors::Rgb;

/// Opaque selection identity issued by the host. The engine stores and
/// compares these; it never mints them except through the injected
/// identity issuer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionKey(String);

impl SelectionKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipEntry {
    pub label: String,
    pub value: String,
}

impl TooltipEntry {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// One normalized cell of the bound table. Exactly one naming mode
/// applies: category-only, group-only, category+group, or measure-only;
/// `display_name` carries the result and drives area matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub category: Option<String>,
    pub group: Option<String>,
    pub display_name: String,
    pub value: Option<f64>,
    pub highlight_value: Option<f64>,
    pub state_value: Option<f64>,
    pub highlight_state_value: Option<f64>,
    pub target: Option<f64>,
    pub color: Rgb,
    pub format: Option<String>,
    pub tooltips: Vec<TooltipEntry>,
    pub identity: Option<SelectionKey>,
    pub selected: bool,
    pub highlight: bool,
}

impl DataPoint {
    /// A bare data point matched by display name, with the stock fill.
    pub fn named(display_name: impl Into<String>) -> Self {
        Self {
            category: None,
            group: None,
            display_name: display_name.into(),
            value: None,
            highlight_value: None,
            state_value: None,
            highlight_state_value: None,
            target: None,
            color: crate::settings::DEFAULT_FILL,
            format: None,
            tooltips: Vec::new(),
            identity: None,
            selected: false,
            highlight: false,
        }
    }

    /// The value shown in labels: the highlighted value when highlights
    /// are active, the plain value otherwise.
    pub fn effective_value(&self, has_highlights: bool) -> Option<f64> {
        if has_highlights {
            self.highlight_value
        } else {
            self.value
        }
    }

    /// The value driving state classification.
    pub fn effective_state_value(&self, has_highlights: bool) -> Option<f64> {
        if has_highlights {
            self.highlight_state_value
        } else {
            self.state_value
        }
    }

    /// Names under which this data point is registered in the matching
    /// index, per its naming mode.
    pub fn lookup_names(&self) -> Vec<&str> {
        let mut names = Vec::with_capacity(2);
        if let Some(category) = self.category.as_deref() {
            names.push(category);
        }
        if let Some(group) = self.group.as_deref() {
            names.push(group);
        }
        if names.is_empty() {
            names.push(self.display_name.as_str());
        }
        names
    }
}

/// One entry of the rendered legend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgb,
    pub identity: Option<SelectionKey>,
    pub selected: bool,
}

/// One entry of the host's property-editing surface (per-key color slots).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumerationEntry {
    pub display_name: String,
    pub color: Rgb,
    pub identity: Option<SelectionKey>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_point() -> DataPoint {
        DataPoint {
            category: None,
            group: None,
            display_name: "Sales".into(),
            value: Some(10.0),
            highlight_value: Some(4.0),
            state_value: Some(10.0),
            highlight_state_value: Some(4.0),
            target: None,
            color: Rgb::new(1, 184, 170),
            format: None,
            tooltips: Vec::new(),
            identity: None,
            selected: false,
            highlight: true,
        }
    }

    #[test]
    fn effective_values_follow_highlight_state() {
        let dp = data_point();
        assert_eq!(dp.effective_value(false), Some(10.0));
        assert_eq!(dp.effective_value(true), Some(4.0));
        assert_eq!(dp.effective_state_value(true), Some(4.0));
    }

    #[test]
    fn lookup_names_per_naming_mode() {
        let mut dp = data_point();
        assert_eq!(dp.lookup_names(), vec!["Sales"]);

        dp.category = Some("North".into());
        assert_eq!(dp.lookup_names(), vec!["North"]);

        dp.group = Some("Retail".into());
        assert_eq!(dp.lookup_names(), vec!["North", "Retail"]);

        dp.category = None;
        assert_eq!(dp.lookup_names(), vec!["Retail"]);
    }
}
