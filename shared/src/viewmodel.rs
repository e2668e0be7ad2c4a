use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::datapoint::{DataPoint, EnumerationEntry, LegendEntry};
use crate::domain::Domain;
use crate::map::MapDocument;
use crate::settings::Settings;
use crate::state::StateThreshold;

/// What the rendering collaborator must discard and rebuild after an
/// update, computed by diffing against the previous view model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetActions {
    pub canvas: bool,
    pub labels: bool,
    pub selection: bool,
    pub toolbar: bool,
}

impl Default for ResetActions {
    fn default() -> Self {
        Self {
            canvas: true,
            labels: true,
            selection: false,
            toolbar: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelFlags {
    pub has_highlights: bool,
    pub has_categories: bool,
    pub has_groups: bool,
    pub has_target: bool,
    pub has_states: bool,
    pub are_percentages: bool,
}

/// The complete normalized view of one update: data points, matching
/// index, maps, thresholds, domain, and the post-update action set.
/// Built as a pure function of (input, previous model); the caller owns
/// persistence between invocations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub data_points: Vec<DataPoint>,
    /// Every supported identifier encoding of every data point name,
    /// lower-cased, to data point index.
    pub match_index: HashMap<String, usize>,
    pub enumeration: Vec<EnumerationEntry>,
    pub legend: Vec<LegendEntry>,
    pub maps: Vec<MapDocument>,
    pub states: Vec<StateThreshold>,
    pub domain: Domain,
    pub settings: Settings,
    pub flags: ModelFlags,
    pub actions: ResetActions,
}

impl ViewModel {
    /// The map currently selected for display, falling back to the first
    /// map when the persisted index is out of range.
    pub fn selected_map(&self) -> Option<&MapDocument> {
        let index = self.settings.general.selected_map;
        self.maps.get(index).or_else(|| self.maps.first())
    }

    pub fn selected_map_mut(&mut self) -> Option<&mut MapDocument> {
        let index = self.settings.general.selected_map;
        let index = if index < self.maps.len() { index } else { 0 };
        self.maps.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapDocument;

    #[test]
    fn default_actions_reset_everything_visual() {
        let actions = ResetActions::default();
        assert!(actions.canvas);
        assert!(actions.labels);
        assert!(!actions.selection);
        assert!(!actions.toolbar);
    }

    #[test]
    fn selected_map_falls_back_to_first() {
        let mut model = ViewModel::default();
        model.maps.push(MapDocument::from_inline("<svg/>", "only"));
        model.settings.general.selected_map = 7;
        assert_eq!(model.selected_map().map(|m| m.display_name.as_str()), Some("only"));
    }

    #[test]
    fn selected_map_empty_model() {
        assert!(ViewModel::default().selected_map().is_none());
    }
}
