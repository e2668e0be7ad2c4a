use serde::{Deserialize, Serialize};

use crate::colors::Rgb;
use crate::state::{CalculateMode, Comparison};

pub const DEFAULT_FILL: Rgb = Rgb::new(0x01, 0xb8, 0xaa);
pub const DEFAULT_LEGEND_COLOR: Rgb = Rgb::new(0x66, 0x66, 0x66);
pub const DEFAULT_FONT_FAMILY: &str = "wf_standard-font,helvetica,arial,sans-serif";
pub const MAX_MANUAL_THRESHOLDS: usize = 5;

/// All recognized option groups, as persisted by the host.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub general: GeneralSettings,
    pub toolbar: ToolbarSettings,
    pub data_point: DataPointSettings,
    pub states: StateSettings,
    pub data_labels: LabelSettings,
    pub legend: LegendSettings,
}

impl Settings {
    /// Normalize interdependent options after load: the saturation window
    /// must be at least one percent wide, and the map scale bound applies.
    pub fn normalized(mut self) -> Self {
        self.data_point.saturate_max = self
            .data_point
            .saturate_max
            .max(self.data_point.saturate_min + 1.0);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneralSettings {
    pub show_unmatched: bool,
    pub strict_validation: bool,
    /// Index into the map list of the currently displayed map.
    pub selected_map: usize,
    /// Persisted map payload (JSON array, or a legacy bare URL/document).
    pub map_payload: Option<String>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            show_unmatched: true,
            strict_validation: false,
            selected_map: 0,
            map_payload: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolbarSettings {
    pub keep: bool,
    pub filter: bool,
    pub zoom: bool,
}

impl Default for ToolbarSettings {
    fn default() -> Self {
        Self {
            keep: false,
            filter: false,
            zoom: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataPointSettings {
    pub unmatched_fill: Option<Rgb>,
    pub borders: bool,
    pub default_fill: Rgb,
    pub show_all: bool,
    pub color_by_category: bool,
    pub saturate: bool,
    /// Saturation window bounds, as percentages of the relevant domain.
    pub saturate_min: f64,
    pub saturate_max: f64,
}

impl Default for DataPointSettings {
    fn default() -> Self {
        Self {
            unmatched_fill: None,
            borders: true,
            default_fill: DEFAULT_FILL,
            show_all: false,
            color_by_category: true,
            saturate: false,
            saturate_min: 0.0,
            saturate_max: 100.0,
        }
    }
}

/// One manually configured threshold slot. Slots missing either half are
/// skipped entirely.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualThreshold {
    pub value: Option<f64>,
    pub fill: Option<Rgb>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StateSettings {
    pub show: bool,
    pub calculate: CalculateMode,
    pub comparison: Comparison,
    pub font_size: f64,
    pub manual: [ManualThreshold; MAX_MANUAL_THRESHOLDS],
}

impl Default for StateSettings {
    fn default() -> Self {
        Self {
            show: true,
            calculate: CalculateMode::Absolute,
            comparison: Comparison::Gt,
            font_size: 10.0,
            manual: [ManualThreshold::default(); MAX_MANUAL_THRESHOLDS],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    #[default]
    Category,
    Area,
    Value,
    /// Data point name plus bracketed value.
    Both,
    /// Area name plus bracketed value.
    Both2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelPosition {
    Top,
    Centroid,
    #[default]
    Best,
}

/// Display unit applied to formatted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayUnit {
    #[default]
    Auto,
    None,
    Thousands,
    Millions,
    Billions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabelSettings {
    pub show: bool,
    pub unmatched_labels: bool,
    pub style: LabelStyle,
    pub position: LabelPosition,
    /// Constrain label width to the inscribed area width.
    pub enclose: bool,
    pub word_wrap: bool,
    pub fill: Option<Rgb>,
    pub font_family: String,
    /// Point size; converted to pixels at placement time.
    pub font_size: f64,
    pub unit: DisplayUnit,
    pub precision: Option<u8>,
    pub locale: String,
    /// When false, labels shrink as the map zooms in.
    pub zoom_enlarge: bool,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            show: false,
            unmatched_labels: true,
            style: LabelStyle::Category,
            position: LabelPosition::Best,
            enclose: true,
            word_wrap: true,
            fill: None,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: 9.0,
            unit: DisplayUnit::Auto,
            precision: None,
            locale: String::new(),
            zoom_enlarge: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegendSettings {
    pub show: bool,
    pub position: String,
    pub show_title: bool,
    pub title_text: String,
    pub label_color: Rgb,
    pub font_size: f64,
}

impl Default for LegendSettings {
    fn default() -> Self {
        Self {
            show: false,
            position: "Top".to_string(),
            show_title: false,
            title_text: String::new(),
            label_color: DEFAULT_LEGEND_COLOR,
            font_size: 8.0,
        }
    }
}
