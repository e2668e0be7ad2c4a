//! Per-area render directives: resolve every area of the selected map
//! against the view model into concrete style overrides plus placed
//! labels. The output is declarative; the rendering collaborator only
//! applies it.

use chorograph_shared::{
    Area, DataPoint, LabelStyle, MapDocument, Rgb, TooltipEntry, ViewModel,
};

use crate::classify::{classify, target_metrics};
use crate::labels::{LabelContext, LabelDirective, TextMeasurer, place_label};
use crate::matching::{AreaBinding, bind_area};
use crate::saturate;

/// Opacity applied to areas outside the current selection or highlight.
const DIM_OPACITY: &str = "0.3";
const MATCHED_FILL_OPACITY: &str = "0.8";

/// Style overrides for one area. `None` fields leave the authored value
/// in place; `visible: false` hides the element entirely.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AreaDirective {
    pub selector: String,
    pub visible: bool,
    pub fill: Option<String>,
    pub fill_opacity: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<String>,
    pub stroke_opacity: Option<String>,
    pub opacity: Option<String>,
    pub tooltips: Vec<TooltipEntry>,
    /// Data point index backing this area, when bound.
    pub matched: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderOutput {
    pub areas: Vec<AreaDirective>,
    pub labels: Vec<LabelDirective>,
}

/// Resolve one map against the model.
pub fn render_map(
    model: &ViewModel,
    map: &MapDocument,
    measurer: &dyn TextMeasurer,
    outline_step: f64,
) -> RenderOutput {
    let has_selection = model.data_points.iter().any(|point| point.selected);
    let zoom = map.transform.clamped().scale;
    let mut output = RenderOutput::default();

    for area in &map.areas {
        let binding = bind_area(area, &model.match_index);
        let (directive, point) = match binding {
            AreaBinding::Excluded => (authored(area), None),
            AreaBinding::ParentBound(i) => (parent_bound(area, i), None),
            AreaBinding::Matched(i) => {
                let point = &model.data_points[i];
                (matched(area, point, i, model, has_selection), Some(point))
            }
            AreaBinding::Unmatched => (unmatched(area, model), None),
        };

        if directive.visible && wants_label(area, point.is_some(), model) {
            let fill = directive
                .fill
                .as_deref()
                .or(area.source_style.fill.as_deref())
                .and_then(Rgb::parse);
            let ctx = LabelContext {
                area,
                point,
                resolved_fill: fill,
                zoom,
                has_highlights: model.flags.has_highlights,
            };
            if let Some(label) =
                place_label(&ctx, &model.settings.data_labels, measurer, outline_step)
            {
                output.labels.push(label);
            }
        }
        output.areas.push(directive);
    }
    output
}

fn wants_label(area: &Area, is_matched: bool, model: &ViewModel) -> bool {
    let labels = &model.settings.data_labels;
    labels.show
        && !area.shape.is_text()
        && (is_matched || (labels.unmatched_labels && labels.style != LabelStyle::Value))
}

/// Excluded areas render exactly as authored.
fn authored(area: &Area) -> AreaDirective {
    AreaDirective {
        selector: area.selector.clone(),
        visible: true,
        ..AreaDirective::default()
    }
}

/// Descendant of a matchable group: its own paint is cleared so the
/// ancestor's fill shows through, and its tooltip names the ancestor.
fn parent_bound(area: &Area, point_index: Option<usize>) -> AreaDirective {
    AreaDirective {
        selector: area.selector.clone(),
        visible: true,
        fill: Some("none".to_string()),
        fill_opacity: Some("0".to_string()),
        stroke: Some("none".to_string()),
        tooltips: vec![TooltipEntry {
            label: "Area".to_string(),
            value: area.matchable_parent.clone().unwrap_or_default(),
        }],
        matched: point_index,
        ..AreaDirective::default()
    }
}

fn matched(
    area: &Area,
    point: &DataPoint,
    point_index: usize,
    model: &ViewModel,
    has_selection: bool,
) -> AreaDirective {
    let color = resolve_fill(point, model);
    let settings = &model.settings.data_point;
    let is_text = area.shape.is_text();

    let mut directive = AreaDirective {
        selector: area.selector.clone(),
        visible: true,
        fill: Some(color.to_hex()),
        tooltips: point.tooltips.clone(),
        matched: Some(point_index),
        ..AreaDirective::default()
    };
    if settings.borders && !is_text {
        directive.fill_opacity = Some(MATCHED_FILL_OPACITY.to_string());
        directive.stroke = Some(color.to_hex());
        directive.stroke_width = Some("2".to_string());
    } else if is_text {
        directive.stroke_width = Some("0".to_string());
    }

    let dimmed = (has_selection && !point.selected)
        || (model.flags.has_highlights && !point.highlight);
    if dimmed {
        directive.opacity = Some(DIM_OPACITY.to_string());
    }
    directive
}

/// Final fill of a matched data point. With states visible the state
/// value (falling back to the plain value) is classified and a winning
/// threshold color replaces the point's own; saturation then washes
/// whichever color resolved. States hidden leaves the point color
/// untouched.
fn resolve_fill(point: &DataPoint, model: &ViewModel) -> Rgb {
    let mut color = point.color;
    let states = &model.settings.states;
    if !states.show {
        return color;
    }

    if model.flags.has_states
        && let Some(state_color) = classify(
            point,
            &model.states,
            states.calculate,
            states.comparison,
            model.flags.are_percentages,
            model.flags.has_highlights,
        )
        .and_then(|threshold| threshold.color)
    {
        color = state_color;
    }

    if !model.settings.data_point.saturate {
        return color;
    }
    let has_highlights = model.flags.has_highlights;
    let Some(state_value) = point
        .effective_state_value(has_highlights)
        .or(point.effective_value(has_highlights))
    else {
        return color;
    };
    let fraction = if point.target.is_some() {
        let (_, variance) = target_metrics(state_value, point.target, model.flags.are_percentages);
        saturate::variance_fraction(variance, &model.settings.data_point, &model.domain)
    } else {
        saturate::value_fraction(state_value, &model.settings.data_point, &model.domain)
    };
    saturate::apply(color, fraction)
}

fn unmatched(area: &Area, model: &ViewModel) -> AreaDirective {
    if !model.settings.general.show_unmatched {
        return AreaDirective {
            selector: area.selector.clone(),
            visible: false,
            ..AreaDirective::default()
        };
    }
    AreaDirective {
        selector: area.selector.clone(),
        visible: true,
        fill: model
            .settings
            .data_point
            .unmatched_fill
            .map(|color| color.to_hex()),
        ..AreaDirective::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::HeuristicMeasurer;
    use crate::matching::build_match_index;
    use chorograph_shared::{AreaShape, AreaStyle, BoundingBox, StateThreshold};

    fn area(id: &str) -> Area {
        Area {
            selector: format!("region-{id}"),
            element_id: Some(id.into()),
            display_name: id.into(),
            unmatchable: false,
            matchable_parent: None,
            source_style: AreaStyle::default(),
            shape: AreaShape::Rect {
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 50.0,
            },
            bounding_box: Some(BoundingBox {
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 50.0,
            }),
        }
    }

    fn model_with(points: Vec<DataPoint>, areas: Vec<Area>) -> (ViewModel, MapDocument) {
        let mut model = ViewModel::default();
        model.match_index = build_match_index(&points);
        model.data_points = points;
        let mut map = MapDocument::from_inline("<svg/>", "test");
        map.areas = areas;
        (model, map)
    }

    fn render(model: &ViewModel, map: &MapDocument) -> RenderOutput {
        render_map(model, map, &HeuristicMeasurer::default(), 5.0)
    }

    #[test]
    fn matched_area_gets_point_color_and_borders() {
        let mut point = DataPoint::named("North");
        point.color = Rgb::new(0x11, 0x22, 0x33);
        let (model, map) = model_with(vec![point], vec![area("North")]);
        let output = render(&model, &map);
        let directive = &output.areas[0];
        assert_eq!(directive.fill.as_deref(), Some("#112233"));
        assert_eq!(directive.fill_opacity.as_deref(), Some("0.8"));
        assert_eq!(directive.stroke.as_deref(), Some("#112233"));
        assert_eq!(directive.stroke_width.as_deref(), Some("2"));
        assert_eq!(directive.matched, Some(0));
    }

    #[test]
    fn unmatched_area_hidden_when_disabled() {
        let (mut model, map) = model_with(vec![], vec![area("Atlantis")]);
        model.settings.general.show_unmatched = false;
        let output = render(&model, &map);
        assert!(!output.areas[0].visible);
    }

    #[test]
    fn unmatched_area_uses_configured_fill() {
        let (mut model, map) = model_with(vec![], vec![area("Atlantis")]);
        model.settings.data_point.unmatched_fill = Some(Rgb::new(0xee, 0xee, 0xee));
        let output = render(&model, &map);
        assert!(output.areas[0].visible);
        assert_eq!(output.areas[0].fill.as_deref(), Some("#eeeeee"));
    }

    #[test]
    fn state_color_overrides_point_color() {
        let mut point = DataPoint::named("North");
        point.state_value = Some(80.0);
        let (mut model, map) = model_with(vec![point], vec![area("North")]);
        model.flags.has_states = true;
        model.states.push(StateThreshold {
            value: 50.0,
            color: Some(Rgb::new(0xd7, 0x19, 0x1c)),
            display_name: None,
            is_target: false,
            source_position: 0,
            identity: None,
            data_point_identity: None,
        });
        let output = render(&model, &map);
        assert_eq!(output.areas[0].fill.as_deref(), Some("#d7191c"));
    }

    #[test]
    fn selection_dims_unselected_areas() {
        let mut north = DataPoint::named("North");
        north.selected = true;
        let south = DataPoint::named("South");
        let (model, map) = model_with(vec![north, south], vec![area("North"), area("South")]);
        let output = render(&model, &map);
        assert!(output.areas[0].opacity.is_none());
        assert_eq!(output.areas[1].opacity.as_deref(), Some("0.3"));
    }

    #[test]
    fn saturation_washes_low_values() {
        let mut low = DataPoint::named("North");
        low.value = Some(10.0);
        low.color = Rgb::new(0x00, 0x80, 0x00);
        let mut high = DataPoint::named("South");
        high.value = Some(20.0);
        high.color = Rgb::new(0x00, 0x80, 0x00);
        let (mut model, map) =
            model_with(vec![low, high], vec![area("North"), area("South")]);
        model.settings.data_point.saturate = true;
        model.domain.start = 10.0;
        model.domain.end = 20.0;
        let output = render(&model, &map);
        assert_eq!(output.areas[0].fill.as_deref(), Some("#ffffff"));
        assert_eq!(output.areas[1].fill.as_deref(), Some("#008000"));
    }

    #[test]
    fn state_colors_are_saturated_too() {
        let mut point = DataPoint::named("North");
        point.state_value = Some(80.0);
        let (mut model, map) = model_with(vec![point], vec![area("North")]);
        model.flags.has_states = true;
        model.states.push(StateThreshold {
            value: 50.0,
            color: Some(Rgb::new(0xd7, 0x19, 0x1c)),
            display_name: None,
            is_target: false,
            source_position: 0,
            identity: None,
            data_point_identity: None,
        });
        model.settings.data_point.saturate = true;
        model.domain.start = 80.0;
        model.domain.end = 160.0;
        // fraction 0 at the domain start washes the state color fully
        let output = render(&model, &map);
        assert_eq!(output.areas[0].fill.as_deref(), Some("#ffffff"));
    }

    #[test]
    fn hidden_states_disable_saturation() {
        let mut point = DataPoint::named("North");
        point.value = Some(10.0);
        point.color = Rgb::new(0x00, 0x80, 0x00);
        let (mut model, map) = model_with(vec![point], vec![area("North")]);
        model.settings.states.show = false;
        model.settings.data_point.saturate = true;
        model.domain.start = 10.0;
        model.domain.end = 20.0;
        let output = render(&model, &map);
        assert_eq!(output.areas[0].fill.as_deref(), Some("#008000"));
    }

    #[test]
    fn target_without_state_measure_saturates_by_variance() {
        let mut point = DataPoint::named("North");
        point.value = Some(80.0);
        point.target = Some(100.0);
        point.color = Rgb::new(0x00, 0x80, 0x00);
        let (mut model, map) = model_with(vec![point], vec![area("North")]);
        model.settings.data_point.saturate = true;
        // variance = (80 - 100) / 100 = -0.2, the variance domain start
        model.domain.start_target_variance = -0.2;
        model.domain.end_target_variance = 0.2;
        // a value-based fraction over this domain would keep full color
        model.domain.start = 0.0;
        model.domain.end = 80.0;
        let output = render(&model, &map);
        assert_eq!(output.areas[0].fill.as_deref(), Some("#ffffff"));
    }

    #[test]
    fn highlighted_points_keep_full_opacity() {
        let mut lit = DataPoint::named("North");
        lit.highlight = true;
        lit.selected = true;
        let dimmed = DataPoint::named("South");
        let (mut model, map) =
            model_with(vec![lit, dimmed], vec![area("North"), area("South")]);
        model.flags.has_highlights = true;
        let output = render(&model, &map);
        assert!(output.areas[0].opacity.is_none());
        assert_eq!(output.areas[1].opacity.as_deref(), Some("0.3"));
    }

    #[test]
    fn parent_bound_child_is_cleared() {
        let mut lobby = area("Lobby");
        lobby.matchable_parent = Some("West Wing".into());
        let (model, map) = model_with(vec![DataPoint::named("West Wing")], vec![lobby]);
        let output = render(&model, &map);
        let directive = &output.areas[0];
        assert_eq!(directive.fill.as_deref(), Some("none"));
        assert_eq!(directive.matched, Some(0));
        assert_eq!(directive.tooltips[0].label, "Area");
        assert_eq!(directive.tooltips[0].value, "West Wing");
    }

    #[test]
    fn child_of_unknown_parent_is_never_colored() {
        // own id is in the index, but the ancestor owns this element
        let mut hall = area("North");
        hall.matchable_parent = Some("Unknown Parent".into());
        let (model, map) = model_with(vec![DataPoint::named("North")], vec![hall]);
        let output = render(&model, &map);
        let directive = &output.areas[0];
        assert_eq!(directive.fill.as_deref(), Some("none"));
        assert!(directive.matched.is_none());
        assert_eq!(directive.tooltips[0].value, "Unknown Parent");
    }

    #[test]
    fn excluded_area_keeps_authored_paint() {
        let mut yard = area("Yard");
        yard.unmatchable = true;
        let (model, map) = model_with(vec![DataPoint::named("Yard")], vec![yard]);
        let output = render(&model, &map);
        let directive = &output.areas[0];
        assert!(directive.visible);
        assert!(directive.fill.is_none());
        assert!(directive.matched.is_none());
    }

    #[test]
    fn labels_follow_visibility_and_style() {
        let (mut model, map) = model_with(
            vec![DataPoint::named("North")],
            vec![area("North"), area("Atlantis")],
        );
        model.settings.data_labels.show = true;
        let both = render(&model, &map);
        assert_eq!(both.labels.len(), 2);

        // value-style labels never apply to unmatched areas
        model.settings.data_labels.style = LabelStyle::Value;
        model.data_points[0].value = Some(1.0);
        let value_only = render(&model, &map);
        assert_eq!(value_only.labels.len(), 1);

        model.settings.data_labels.show = false;
        assert!(render(&model, &map).labels.is_empty());
    }
}
