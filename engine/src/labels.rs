//! Label placement: compose the label text for an area, pick an anchor
//! (top corner, bounding-box centroid, or pole of inaccessibility), and
//! fit the text to the available width by wrapping or truncating.

use chorograph_shared::{
    Area, DataPoint, LabelPosition, LabelSettings, LabelStyle, Rgb, auto_text_color,
};

use crate::format::format_value;
use crate::geometry::{outline_points, pole_of_inaccessibility};

/// Pixels of padding kept between a label and the area edge for the
/// top and centroid positions.
const EDGE_PADDING: f64 = 10.0;
const ELLIPSIS: char = '\u{2026}';

/// Text width oracle. The host supplies a real canvas-backed measurer;
/// the bundled heuristic is good enough for tests and headless use.
pub trait TextMeasurer {
    /// Width in pixels of `text` at `font_px` pixels.
    fn text_width(&self, text: &str, font_px: f64) -> f64;
}

/// Approximates proportional text as a fixed fraction of the font size
/// per character.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicMeasurer {
    pub advance_ratio: f64,
}

impl Default for HeuristicMeasurer {
    fn default() -> Self {
        Self { advance_ratio: 0.6 }
    }
}

impl TextMeasurer for HeuristicMeasurer {
    fn text_width(&self, text: &str, font_px: f64) -> f64 {
        text.chars().count() as f64 * font_px * self.advance_ratio
    }
}

/// One placed label, ready for the rendering collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelDirective {
    pub selector: String,
    pub anchor: [f64; 2],
    pub lines: Vec<String>,
    pub font_px: f64,
    pub font_family: String,
    pub color: Rgb,
    /// Unmatched areas are labeled in italics.
    pub italic: bool,
    /// Top-positioned labels are start-aligned; the rest are centered.
    pub align_start: bool,
}

/// Everything about the area the placer needs from the renderer.
pub struct LabelContext<'a> {
    pub area: &'a Area,
    pub point: Option<&'a DataPoint>,
    /// Fill the area ended up with, for automatic text contrast.
    pub resolved_fill: Option<Rgb>,
    pub zoom: f64,
    pub has_highlights: bool,
}

/// Place one label, or nothing when the area has no usable bounds or
/// the configured style produces empty text.
pub fn place_label(
    ctx: &LabelContext<'_>,
    settings: &LabelSettings,
    measurer: &dyn TextMeasurer,
    outline_step: f64,
) -> Option<LabelDirective> {
    let bbox = ctx.area.bounding_box?;
    let mut font_px = settings.font_size * 4.0 / 3.0;
    if !settings.zoom_enlarge {
        font_px /= ctx.zoom.max(1.0);
    }

    let text = label_text(ctx, settings)?;
    if text.is_empty() {
        return None;
    }

    let (mut anchor, align_start, max_width) = match settings.position {
        LabelPosition::Top => (
            [bbox.x + EDGE_PADDING, bbox.y + font_px + EDGE_PADDING],
            true,
            bbox.width - EDGE_PADDING,
        ),
        LabelPosition::Centroid => (
            [bbox.center()[0], bbox.y + bbox.height / 2.0 + font_px],
            false,
            bbox.width - EDGE_PADDING,
        ),
        LabelPosition::Best => {
            let outline = outline_points(&ctx.area.shape, outline_step);
            match pole_of_inaccessibility(&outline, 1.0) {
                Some(pole) if pole.radius > 0.0 => {
                    let width = if settings.enclose {
                        pole.radius * 2.0
                    } else {
                        bbox.width - EDGE_PADDING
                    };
                    ([pole.x, pole.y], false, width)
                }
                _ => (
                    [bbox.center()[0], bbox.y + bbox.height / 2.0 + font_px],
                    false,
                    bbox.width - EDGE_PADDING,
                ),
            }
        }
    };

    let fit_text = settings.style != LabelStyle::Value;
    let lines = if settings.word_wrap && fit_text {
        wrap(&text, max_width, font_px, measurer)
    } else if settings.enclose && fit_text {
        vec![truncate(&text, max_width, font_px, measurer)]
    } else {
        vec![text]
    };

    if !align_start && lines.len() > 1 {
        anchor[1] -= (lines.len() - 1) as f64 * font_px / 2.0;
    }

    let color = settings
        .fill
        .or_else(|| ctx.resolved_fill.map(auto_text_color))
        .unwrap_or(Rgb::BLACK);

    Some(LabelDirective {
        selector: ctx.area.selector.clone(),
        anchor,
        lines,
        font_px,
        font_family: settings.font_family.clone(),
        color,
        italic: ctx.point.is_none(),
        align_start,
    })
}

/// Compose the label text per the configured style. `None` when the
/// style needs a value the area does not have.
fn label_text(ctx: &LabelContext<'_>, settings: &LabelSettings) -> Option<String> {
    let value_text = ctx.point.and_then(|point| {
        let value = point.effective_value(ctx.has_highlights)?;
        Some(format_value(
            value,
            point.format.as_deref(),
            settings.unit,
            settings.precision,
        ))
    });
    let point_name = ctx
        .point
        .map(|point| point.display_name.as_str())
        .unwrap_or(ctx.area.display_name.as_str());

    let text = match settings.style {
        LabelStyle::Category => point_name.to_string(),
        LabelStyle::Area => ctx.area.display_name.clone(),
        LabelStyle::Value => value_text?,
        LabelStyle::Both => bracketed(point_name, value_text),
        LabelStyle::Both2 => bracketed(&ctx.area.display_name, value_text),
    };
    Some(text)
}

fn bracketed(name: &str, value: Option<String>) -> String {
    match value {
        Some(value) => format!("{name} [{value}]"),
        None => name.to_string(),
    }
}

/// Greedy word wrap; a single word wider than the line stands alone.
fn wrap(text: &str, max_width: f64, font_px: f64, measurer: &dyn TextMeasurer) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if current.is_empty() || measurer.text_width(&candidate, font_px) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Trim to the available width and mark the cut with an ellipsis.
fn truncate(text: &str, max_width: f64, font_px: f64, measurer: &dyn TextMeasurer) -> String {
    if measurer.text_width(text, font_px) <= max_width {
        return text.to_string();
    }
    let mut kept: String = text.to_string();
    while kept.chars().count() > 1 {
        kept.pop();
        let candidate = format!("{}{ELLIPSIS}", kept.trim_end());
        if measurer.text_width(&candidate, font_px) <= max_width {
            return candidate;
        }
    }
    format!("{kept}{ELLIPSIS}")
}
