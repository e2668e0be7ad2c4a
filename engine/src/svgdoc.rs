//! Streaming SVG parser. Walks a map document once and extracts every
//! paintable element as an [`Area`]: id, readable name, authored style
//! snapshot, geometry, and bounding box. Non-paintable machinery
//! (defs, gradients, metadata) is skipped wholesale.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use chorograph_shared::{Area, AreaShape, AreaStyle, BoundingBox};

use crate::error::MapError;
use crate::geometry::shape_bbox;
use crate::idents::decode_id;

/// Result of parsing one SVG document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SvgDocument {
    /// Declared `viewBox`, or one repaired from width/height.
    pub view_box: Option<[f64; 4]>,
    pub areas: Vec<Area>,
}

const PAINTABLE: [&str; 9] = [
    "g", "path", "rect", "circle", "ellipse", "line", "polygon", "polyline", "text",
];

const SKIPPED: [&str; 8] = [
    "defs", "style", "metadata", "symbol", "clipPath", "mask", "pattern", "marker",
];

/// Reserved ids, in both raw and Illustrator-escaped spellings. An
/// ignored subtree is dropped entirely; an excluded one stays visible
/// but never matches data.
const IGNORED_IDS: [&str; 2] = ["_ignored", "_x5F_ignored"];
const EXCLUDED_IDS: [&str; 2] = ["_excluded", "_x5F_excluded"];

enum Capture {
    None,
    /// `<title>` child of the area at this index.
    Title(usize),
    /// Character data of the `<text>` area at this index.
    Text(usize),
}

struct Frame {
    is_group_area: bool,
    area: Option<usize>,
    /// Name offered to descendants as their matchable ancestor.
    parent_name: Option<String>,
    excluded: bool,
    capture: Capture,
    bbox: Option<BoundingBox>,
}

/// Parse SVG text into its paintable areas.
pub fn parse_svg(text: &str) -> Result<SvgDocument, MapError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut doc = SvgDocument::default();
    let mut stack: Vec<Frame> = Vec::new();
    let mut seen_root = false;
    let mut skipping = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if skipping > 0 {
                    skipping += 1;
                    continue;
                }
                let tag = local_name(&e);
                if !seen_root {
                    if tag != "svg" {
                        return Err(MapError::InvalidSvg);
                    }
                    seen_root = true;
                    doc.view_box = read_view_box(&e);
                    stack.push(Frame {
                        is_group_area: false,
                        area: None,
                        parent_name: None,
                        excluded: false,
                        capture: Capture::None,
                        bbox: None,
                    });
                    continue;
                }
                if tag == "title" {
                    let target = stack.last().and_then(|frame| match frame.capture {
                        Capture::Title(idx) => Some(idx),
                        _ => None,
                    });
                    stack.push(Frame {
                        is_group_area: false,
                        area: None,
                        parent_name: inherited_parent(&stack),
                        excluded: inherited_excluded(&stack),
                        capture: target.map(Capture::Title).unwrap_or(Capture::None),
                        bbox: None,
                    });
                    continue;
                }
                if SKIPPED.contains(&tag.as_str()) {
                    skipping = 1;
                    continue;
                }
                if PAINTABLE.contains(&tag.as_str()) {
                    if let Some(frame) = open_element(&e, &tag, &mut doc, &stack)? {
                        stack.push(frame);
                    } else {
                        // ignored subtree rooted at this element
                        skipping = 1;
                    }
                } else {
                    // unknown container (tspan, a, foreignObject): pass
                    // through, keep inherited context and text capture
                    let capture = match stack.last().map(|f| &f.capture) {
                        Some(Capture::Text(idx)) => Capture::Text(*idx),
                        _ => Capture::None,
                    };
                    stack.push(Frame {
                        is_group_area: false,
                        area: None,
                        parent_name: inherited_parent(&stack),
                        excluded: inherited_excluded(&stack),
                        capture,
                        bbox: None,
                    });
                }
            }
            Ok(Event::Empty(e)) => {
                if skipping > 0 {
                    continue;
                }
                let tag = local_name(&e);
                if !seen_root {
                    if tag != "svg" {
                        return Err(MapError::InvalidSvg);
                    }
                    seen_root = true;
                    doc.view_box = read_view_box(&e);
                    continue;
                }
                if PAINTABLE.contains(&tag.as_str())
                    && let Some(frame) = open_element(&e, &tag, &mut doc, &stack)?
                {
                    close_frame(frame, &mut doc, &mut stack);
                }
            }
            Ok(Event::Text(t)) => {
                if skipping > 0 {
                    continue;
                }
                let content = t.unescape().map_err(|_| MapError::InvalidSvg)?;
                match stack.last().map(|f| &f.capture) {
                    Some(Capture::Title(idx)) => {
                        doc.areas[*idx].display_name = content.trim().to_string();
                    }
                    Some(Capture::Text(idx)) => {
                        if let AreaShape::Text { content: existing, .. } = &mut doc.areas[*idx].shape {
                            if !existing.is_empty() {
                                existing.push(' ');
                            }
                            existing.push_str(content.trim());
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(_)) => {
                if skipping > 0 {
                    skipping -= 1;
                    continue;
                }
                if let Some(frame) = stack.pop() {
                    close_frame(frame, &mut doc, &mut stack);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(_) => return Err(MapError::InvalidSvg),
        }
    }

    if !seen_root {
        return Err(MapError::InvalidSvg);
    }
    Ok(doc)
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_string()
}

/// Build the area for one paintable element. Returns `None` when the
/// element (and its subtree) is authored as ignored.
fn open_element(
    e: &BytesStart<'_>,
    tag: &str,
    doc: &mut SvgDocument,
    stack: &[Frame],
) -> Result<Option<Frame>, MapError> {
    let attrs = read_attrs(e)?;
    let id = attrs.id.clone();

    // only the reserved ids are special; an area that merely ends in
    // "_excluded" is an ordinary region
    if id.as_deref().is_some_and(|id| IGNORED_IDS.contains(&id)) {
        return Ok(None);
    }

    let excluded = inherited_excluded(stack)
        || id.as_deref().is_some_and(|id| EXCLUDED_IDS.contains(&id))
        || attrs
            .class
            .as_deref()
            .is_some_and(|class| class.split_whitespace().any(|token| token == "excluded"));

    let shape = build_shape(tag, &attrs);
    let mut display_name = match (&attrs.title, &id) {
        (Some(title), _) => title.clone(),
        (None, Some(id)) => decode_id(id),
        (None, None) => String::new(),
    };
    if attrs.title.is_none()
        && let Some(id) = &id
        && id.starts_with("XMLID_")
    {
        // authoring-tool serial ids carry no meaning; the text content
        // or <title> child will supply the name
        display_name = String::new();
    }

    let parent_name = inherited_parent(stack);
    let bbox = shape_bbox(&shape);

    let index = doc.areas.len();
    doc.areas.push(Area {
        selector: format!("region-{index}"),
        element_id: id,
        display_name,
        unmatchable: excluded,
        matchable_parent: parent_name.clone(),
        source_style: attrs.style,
        shape: shape.clone(),
        bounding_box: bbox,
    });

    let offers_name = tag == "g" && !excluded && !doc.areas[index].display_name.is_empty();
    let capture = match &shape {
        AreaShape::Text { .. } => Capture::Text(index),
        _ if attrs.title.is_none() => Capture::Title(index),
        _ => Capture::None,
    };
    Ok(Some(Frame {
        is_group_area: tag == "g",
        area: Some(index),
        parent_name: if offers_name {
            Some(doc.areas[index].display_name.clone())
        } else {
            parent_name
        },
        excluded,
        capture,
        bbox,
    }))
}

fn close_frame(frame: Frame, doc: &mut SvgDocument, stack: &mut [Frame]) {
    let mut bbox = frame.bbox;
    if let Some(index) = frame.area {
        if frame.is_group_area {
            doc.areas[index].bounding_box = bbox;
        }
        if let AreaShape::Text { content, .. } = &doc.areas[index].shape
            && doc.areas[index].display_name.is_empty()
            && !content.is_empty()
        {
            doc.areas[index].display_name = content.clone();
        }
        bbox = doc.areas[index].bounding_box;
    }
    if let (Some(bbox), Some(parent)) = (bbox, stack.last_mut()) {
        parent.bbox = Some(match parent.bbox {
            Some(existing) => existing.union(bbox),
            None => bbox,
        });
    }
}

fn inherited_parent(stack: &[Frame]) -> Option<String> {
    stack.last().and_then(|frame| frame.parent_name.clone())
}

fn inherited_excluded(stack: &[Frame]) -> bool {
    stack.last().is_some_and(|frame| frame.excluded)
}

struct ElementAttrs {
    id: Option<String>,
    title: Option<String>,
    class: Option<String>,
    style: AreaStyle,
    numbers: Vec<(String, f64)>,
    d: Option<String>,
    points: Option<String>,
}

impl ElementAttrs {
    fn number(&self, name: &str) -> f64 {
        self.numbers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| *value)
            .unwrap_or(0.0)
    }
}

fn read_attrs(e: &BytesStart<'_>) -> Result<ElementAttrs, MapError> {
    let mut out = ElementAttrs {
        id: None,
        title: None,
        class: None,
        style: AreaStyle::default(),
        numbers: Vec::new(),
        d: None,
        points: None,
    };
    for attr in e.attributes() {
        let attr = attr.map_err(|_| MapError::InvalidSvg)?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|_| MapError::InvalidSvg)?
            .to_string();
        match key.as_str() {
            "id" => out.id = Some(value),
            "title" => out.title = Some(value),
            "class" => out.class = Some(value),
            "d" => out.d = Some(value),
            "points" => out.points = Some(value),
            "fill" => out.style.fill = Some(value),
            "fill-opacity" => out.style.fill_opacity = Some(value),
            "stroke" => out.style.stroke = Some(value),
            "stroke-opacity" => out.style.stroke_opacity = Some(value),
            "stroke-width" => out.style.stroke_width = Some(value),
            "opacity" => out.style.opacity = Some(value),
            "style" => apply_inline_style(&value, &mut out.style),
            _ => {
                if let Some(parsed) = parse_length(&value) {
                    out.numbers.push((key, parsed));
                }
            }
        }
    }
    Ok(out)
}

/// Inline `style` declarations override presentation attributes.
fn apply_inline_style(style: &str, out: &mut AreaStyle) {
    for declaration in style.split(';') {
        let Some((name, value)) = declaration.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match name.trim() {
            "fill" => out.fill = Some(value),
            "fill-opacity" => out.fill_opacity = Some(value),
            "stroke" => out.stroke = Some(value),
            "stroke-opacity" => out.stroke_opacity = Some(value),
            "stroke-width" => out.stroke_width = Some(value),
            "opacity" => out.opacity = Some(value),
            _ => {}
        }
    }
}

fn build_shape(tag: &str, attrs: &ElementAttrs) -> AreaShape {
    match tag {
        "path" => AreaShape::Path {
            d: attrs.d.clone().unwrap_or_default(),
        },
        "rect" => AreaShape::Rect {
            x: attrs.number("x"),
            y: attrs.number("y"),
            width: attrs.number("width"),
            height: attrs.number("height"),
        },
        "circle" => AreaShape::Ellipse {
            cx: attrs.number("cx"),
            cy: attrs.number("cy"),
            rx: attrs.number("r"),
            ry: attrs.number("r"),
        },
        "ellipse" => AreaShape::Ellipse {
            cx: attrs.number("cx"),
            cy: attrs.number("cy"),
            rx: attrs.number("rx"),
            ry: attrs.number("ry"),
        },
        "line" => AreaShape::Line {
            x1: attrs.number("x1"),
            y1: attrs.number("y1"),
            x2: attrs.number("x2"),
            y2: attrs.number("y2"),
        },
        "polygon" => AreaShape::Polygon {
            points: parse_points(attrs.points.as_deref().unwrap_or("")),
            closed: true,
        },
        "polyline" => AreaShape::Polygon {
            points: parse_points(attrs.points.as_deref().unwrap_or("")),
            closed: false,
        },
        "text" => AreaShape::Text {
            x: attrs.number("x"),
            y: attrs.number("y"),
            content: String::new(),
        },
        _ => AreaShape::Group,
    }
}

fn parse_points(text: &str) -> Vec<[f64; 2]> {
    let values: Vec<f64> = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse().ok())
        .collect();
    values.chunks_exact(2).map(|pair| [pair[0], pair[1]]).collect()
}

fn read_view_box(e: &BytesStart<'_>) -> Option<[f64; 4]> {
    let mut view_box = None;
    let mut width = None;
    let mut height = None;
    for attr in e.attributes().flatten() {
        let key = attr.key.local_name();
        let value = attr.unescape_value().ok()?;
        match key.as_ref() {
            b"viewBox" => {
                let parts: Vec<f64> = value
                    .split(|c: char| c.is_whitespace() || c == ',')
                    .filter(|token| !token.is_empty())
                    .filter_map(|token| token.parse().ok())
                    .collect();
                if parts.len() == 4 {
                    view_box = Some([parts[0], parts[1], parts[2], parts[3]]);
                }
            }
            b"width" => width = parse_length(&value),
            b"height" => height = parse_length(&value),
            _ => {}
        }
    }
    // documents exported without a viewBox still declare dimensions
    view_box.or_else(|| Some([0.0, 0.0, width?, height?]))
}

fn parse_length(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if let Ok(parsed) = trimmed.parse() {
        return Some(parsed);
    }
    trimmed
        .trim_end_matches(|c: char| c.is_alphabetic() || c == '%')
        .parse()
        .ok()
}
