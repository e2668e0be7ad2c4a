use serde::{Deserialize, Serialize};

use crate::datapoint::SelectionKey;

pub const MIN_MAP_SCALE: f64 = 1.0;
pub const MAX_MAP_SCALE: f64 = 10.0;

/// Where a map document comes from: a remote URL or inline content,
/// never both.
#[derive(Debug, Clone, PartialEq)]
pub enum MapSource {
    Url(String),
    Inline(String),
}

impl MapSource {
    pub fn url(&self) -> Option<&str> {
        match self {
            MapSource::Url(url) => Some(url),
            MapSource::Inline(_) => None,
        }
    }

    pub fn inline(&self) -> Option<&str> {
        match self {
            MapSource::Inline(content) => Some(content),
            MapSource::Url(_) => None,
        }
    }

    /// Dedup key: whole URL for remote sources, content prefix for
    /// inline payloads.
    pub fn dedup_key(&self) -> &str {
        match self {
            MapSource::Url(url) => url,
            MapSource::Inline(content) => {
                let end = content
                    .char_indices()
                    .nth(256)
                    .map(|(i, _)| i)
                    .unwrap_or(content.len());
                &content[..end]
            }
        }
    }
}

/// Persisted pan/zoom state of one map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapTransform {
    pub scale: f64,
    pub translation: [f64; 2],
}

impl Default for MapTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translation: [0.0, 0.0],
        }
    }
}

impl MapTransform {
    pub fn clamped(self) -> Self {
        Self {
            scale: self.scale.clamp(MIN_MAP_SCALE, MAX_MAP_SCALE),
            translation: self.translation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn center(&self) -> [f64; 2] {
        [self.x + self.width / 2.0, self.y + self.height / 2.0]
    }

    pub fn union(self, other: BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        BoundingBox {
            x,
            y,
            width: right - x,
            height: bottom - y,
        }
    }
}

/// Geometry of one paintable element, as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AreaShape {
    Path { d: String },
    Polygon { points: Vec<[f64; 2]>, closed: bool },
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64 },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    Text { x: f64, y: f64, content: String },
    Group,
}

impl AreaShape {
    pub fn is_text(&self) -> bool {
        matches!(self, AreaShape::Text { .. })
    }
}

/// Style snapshot captured at parse time; used as the unmatched/fallback
/// style. Values are raw CSS strings exactly as authored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaStyle {
    pub fill: Option<String>,
    pub fill_opacity: Option<String>,
    pub stroke: Option<String>,
    pub stroke_opacity: Option<String>,
    pub stroke_width: Option<String>,
    pub opacity: Option<String>,
}

/// One paintable element of a parsed map document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    /// Stable handle the rendering collaborator uses to address the element.
    pub selector: String,
    pub element_id: Option<String>,
    pub display_name: String,
    /// Explicitly excluded: never colored by data.
    pub unmatchable: bool,
    /// Display name of a matchable ancestor. When set, the element never
    /// receives direct coloring; it inherits the ancestor's match for
    /// tooltip purposes only.
    pub matchable_parent: Option<String>,
    pub source_style: AreaStyle,
    pub shape: AreaShape,
    pub bounding_box: Option<BoundingBox>,
}

/// One vector map bound to the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PersistedMap", into = "PersistedMap")]
pub struct MapDocument {
    pub source: MapSource,
    pub display_name: String,
    pub areas: Vec<Area>,
    pub transform: MapTransform,
    /// Query name of the measure this map was row-bound to, if any.
    pub map_measure: Option<String>,
    /// Selection keys of the rows that referenced this map, when row-bound.
    pub identities: Option<Vec<SelectionKey>>,
}

impl MapDocument {
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let display_name = readable_url_name(&url);
        Self::new(MapSource::Url(url), display_name)
    }

    pub fn from_inline(content: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(MapSource::Inline(content.into()), display_name.into())
    }

    fn new(source: MapSource, display_name: String) -> Self {
        Self {
            source,
            display_name,
            areas: Vec::new(),
            transform: MapTransform::default(),
            map_measure: None,
            identities: None,
        }
    }
}

/// Persisted wire layout: `{URL xor data, displayName, areas (empty until
/// re-parsed), scale, mapMeasure}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedMap {
    #[serde(rename = "URL", default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    display_name: String,
    #[serde(default)]
    scale: MapTransform,
    #[serde(default)]
    map_measure: Option<String>,
}

impl TryFrom<PersistedMap> for MapDocument {
    type Error = String;

    fn try_from(persisted: PersistedMap) -> Result<Self, Self::Error> {
        let source = match (persisted.url, persisted.data) {
            (Some(url), None) => MapSource::Url(url),
            (None, Some(data)) => MapSource::Inline(data),
            (Some(_), Some(_)) => return Err("map has both URL and inline content".into()),
            (None, None) => return Err("map has neither URL nor inline content".into()),
        };
        Ok(MapDocument {
            source,
            display_name: persisted.display_name,
            areas: Vec::new(),
            transform: persisted.scale.clamped(),
            map_measure: persisted.map_measure,
            identities: None,
        })
    }
}

impl From<MapDocument> for PersistedMap {
    fn from(map: MapDocument) -> Self {
        let (url, data) = match map.source {
            MapSource::Url(url) => (Some(url), None),
            MapSource::Inline(content) => (None, Some(content)),
        };
        PersistedMap {
            url,
            data,
            display_name: map.display_name,
            scale: map.transform,
            map_measure: map.map_measure,
        }
    }
}

/// Decode a persisted map payload. The current layout is a JSON array of
/// maps; legacy payloads are a bare URL or raw document text and are
/// migrated transparently.
pub fn maps_from_persisted(payload: &str) -> Vec<MapDocument> {
    if let Ok(maps) = serde_json::from_str::<Vec<MapDocument>>(payload) {
        return maps;
    }
    if is_valid_url(payload) {
        vec![MapDocument::from_url(payload)]
    } else {
        vec![MapDocument::from_inline(payload, "Local file")]
    }
}

pub fn is_valid_url(text: &str) -> bool {
    (text.starts_with("https://") || text.starts_with("http://"))
        && !text.chars().any(char::is_whitespace)
}

/// Derive a readable display name from a URL: last path segment, minus
/// extension, with encoded spaces and separators restored.
pub fn readable_url_name(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let segment = without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(without_query);
    let stem = segment.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(segment);
    let readable: String = stem
        .replace("%20", " ")
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect();
    let trimmed = readable.trim();
    if trimmed.is_empty() {
        url.to_string()
    } else {
        trimmed.to_string()
    }
}
