pub mod colors;
pub mod datapoint;
pub mod domain;
pub mod map;
pub mod settings;
pub mod state;
pub mod viewmodel;

pub use colors::{Rgb, auto_text_color, name_color, state_palette, white_blend};
pub use datapoint::{DataPoint, EnumerationEntry, LegendEntry, SelectionKey, TooltipEntry};
pub use domain::{Domain, DomainAccumulator};
pub use map::{
    Area, AreaShape, AreaStyle, BoundingBox, MapDocument, MapSource, MapTransform, is_valid_url,
    maps_from_persisted, readable_url_name,
};
pub use settings::{
    DataPointSettings, DisplayUnit, GeneralSettings, LabelPosition, LabelSettings, LabelStyle,
    LegendSettings, ManualThreshold, Settings, StateSettings, ToolbarSettings,
};
pub use state::{
    CalculateMode, Comparison, StateThreshold, assign_palette, relocate_targets, sort_thresholds,
};
pub use viewmodel::{ModelFlags, ResetActions, ViewModel};
