//! Data-binding engine for region maps: turns query rows and settings
//! into a normalized view model, matches data points to the named
//! areas of parsed vector documents, and computes per-area styling and
//! label placement for the rendering collaborator.

pub mod classify;
pub mod error;
pub mod format;
pub mod geometry;
pub mod idents;
pub mod labels;
pub mod matching;
pub mod render;
pub mod rows;
pub mod saturate;
pub mod svgdoc;
pub mod transform;

pub use error::{Alert, MapError};
pub use labels::{HeuristicMeasurer, LabelDirective, TextMeasurer};
pub use render::{AreaDirective, RenderOutput, render_map};
pub use rows::{
    CategoryColumn, IdentityIssuer, KeyedIssuer, MeasureColumn, MeasureGroup, MeasureRole,
    QueryTable,
};
pub use svgdoc::{SvgDocument, parse_svg};
pub use transform::build_view_model;
