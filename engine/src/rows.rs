//! Input model supplied by the host's data-query layer: one optional
//! category column, one optional series dimension, and measures tagged
//! with a role. Roles are resolved once per schema, not re-inspected
//! per cell.

use chorograph_shared::Rgb;
use chorograph_shared::SelectionKey;

/// What a measure contributes to the view model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasureRole {
    /// Drives domain, color, and labels.
    Value,
    /// Drives state classification: supplies the per-cell state value
    /// and an automatic classification threshold.
    State,
    /// The target the state value is compared against.
    Target,
    /// Tooltip-only measure.
    Tooltip,
}

/// A categorical column: the category itself or the legacy map-binding
/// column.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryColumn {
    pub display_name: String,
    pub query_name: String,
    pub values: Vec<String>,
    /// Host-persisted per-row colors, when the host stored any.
    pub colors: Vec<Option<Rgb>>,
}

impl CategoryColumn {
    pub fn new(display_name: impl Into<String>, query_name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            display_name: display_name.into(),
            query_name: query_name.into(),
            values,
            colors: Vec::new(),
        }
    }

    pub fn row_color(&self, row: usize) -> Option<Rgb> {
        self.colors.get(row).copied().flatten()
    }
}

/// One measure column, with one cell per category row.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureColumn {
    pub display_name: String,
    pub query_name: String,
    pub role: MeasureRole,
    pub format: Option<String>,
    pub values: Vec<Option<f64>>,
    /// Cross-filter highlight values, present only while a highlight is
    /// active in the host.
    pub highlights: Option<Vec<Option<f64>>>,
    /// Host-persisted color for this measure (data-point or state fill).
    pub color: Option<Rgb>,
}

impl MeasureColumn {
    pub fn new(
        display_name: impl Into<String>,
        role: MeasureRole,
        values: Vec<Option<f64>>,
    ) -> Self {
        let display_name = display_name.into();
        Self {
            query_name: display_name.clone(),
            display_name,
            role,
            format: None,
            values,
            highlights: None,
            color: None,
        }
    }

    pub fn value_at(&self, row: usize) -> Option<f64> {
        self.values.get(row).copied().flatten()
    }

    pub fn highlight_at(&self, row: usize) -> Option<f64> {
        self.highlights
            .as_ref()
            .and_then(|values| values.get(row).copied().flatten())
    }
}

/// One series bucket: all measures for one group value (or the single
/// unnamed bucket when no series dimension exists).
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureGroup {
    pub name: Option<String>,
    pub measures: Vec<MeasureColumn>,
    /// Host-persisted color for the whole series bucket.
    pub color: Option<Rgb>,
}

impl MeasureGroup {
    pub fn unnamed(measures: Vec<MeasureColumn>) -> Self {
        Self {
            name: None,
            measures,
            color: None,
        }
    }

    pub fn named(name: impl Into<String>, measures: Vec<MeasureColumn>) -> Self {
        Self {
            name: Some(name.into()),
            measures,
            color: None,
        }
    }

    /// True when exactly one cell in this bucket carries a value, in
    /// which case the group name doubles as the data point name.
    pub fn single_valued(&self, value_measure: &MeasureColumn) -> bool {
        value_measure
            .values
            .iter()
            .filter(|cell| cell.is_some())
            .count()
            <= 1
    }
}

/// The queried table handed to the view-model builder.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryTable {
    pub category: Option<CategoryColumn>,
    /// Legacy map-binding column: each row names or embeds a map.
    pub map_series: Option<CategoryColumn>,
    pub groups: Vec<MeasureGroup>,
}

/// Capability for minting selection identities. Identities are owned by
/// the host; the engine is only delegated their construction through
/// this trait and otherwise stores and compares them opaquely.
pub trait IdentityIssuer {
    fn category(&self, query_name: &str, row: usize) -> SelectionKey;
    fn series(&self, group_name: &str) -> SelectionKey;
    fn measure(&self, query_name: &str) -> SelectionKey;
}

/// Deterministic issuer for hosts (and tests) without a richer identity
/// scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyedIssuer;

impl IdentityIssuer for KeyedIssuer {
    fn category(&self, query_name: &str, row: usize) -> SelectionKey {
        SelectionKey::new(format!("category/{query_name}/{row}"))
    }

    fn series(&self, group_name: &str) -> SelectionKey {
        SelectionKey::new(format!("series/{group_name}"))
    }

    fn measure(&self, query_name: &str) -> SelectionKey {
        SelectionKey::new(format!("measure/{query_name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_cells_are_option_backed() {
        let measure = MeasureColumn::new("Sales", MeasureRole::Value, vec![Some(1.0), None]);
        assert_eq!(measure.value_at(0), Some(1.0));
        assert_eq!(measure.value_at(1), None);
        assert_eq!(measure.value_at(9), None);
        assert_eq!(measure.highlight_at(0), None);
    }

    #[test]
    fn single_valued_group_detection() {
        let sparse = MeasureColumn::new("Sales", MeasureRole::Value, vec![Some(1.0), None, None]);
        let dense = MeasureColumn::new("Sales", MeasureRole::Value, vec![Some(1.0), Some(2.0), None]);
        let group = MeasureGroup::named("Retail", vec![sparse.clone()]);
        assert!(group.single_valued(&sparse));
        assert!(!group.single_valued(&dense));
    }

    #[test]
    fn keyed_issuer_is_deterministic() {
        let issuer = KeyedIssuer;
        assert_eq!(issuer.series("Retail"), issuer.series("Retail"));
        assert_ne!(issuer.series("Retail"), issuer.measure("Retail"));
    }
}
