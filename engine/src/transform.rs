//! The view-model builder: a pure function over (query table, settings,
//! previous model) producing the next model. It owns data point
//! assembly, domain accumulation, threshold construction, map list
//! derivation, and the reset-action diff against the previous model.

use chorograph_shared::{
    CalculateMode, DataPoint, DisplayUnit, DomainAccumulator, EnumerationEntry, LegendEntry,
    MapDocument, MapSource, ModelFlags, ResetActions, SelectionKey, Settings, StateThreshold,
    TooltipEntry, ViewModel, assign_palette, is_valid_url, maps_from_persisted, relocate_targets,
    sort_thresholds,
};

use crate::classify::target_metrics;
use crate::format::{format_value, is_percent_format};
use crate::matching::build_match_index;
use crate::rows::{IdentityIssuer, MeasureColumn, MeasureGroup, MeasureRole, QueryTable};
use crate::svgdoc::parse_svg;

/// Measures of one series bucket, resolved by role once per build.
struct Roles<'a> {
    value: Option<&'a MeasureColumn>,
    states: Vec<&'a MeasureColumn>,
    target: Option<&'a MeasureColumn>,
    tooltips: Vec<&'a MeasureColumn>,
}

fn roles_of(group: &MeasureGroup) -> Roles<'_> {
    let mut roles = Roles {
        value: None,
        states: Vec::new(),
        target: None,
        tooltips: Vec::new(),
    };
    for measure in &group.measures {
        match measure.role {
            MeasureRole::Value => roles.value = roles.value.or(Some(measure)),
            MeasureRole::State => roles.states.push(measure),
            MeasureRole::Target => roles.target = roles.target.or(Some(measure)),
            MeasureRole::Tooltip => roles.tooltips.push(measure),
        }
    }
    roles
}

/// Build the next view model. The caller persists the returned model and
/// passes it back as `previous` on the following update.
pub fn build_view_model(
    table: Option<&QueryTable>,
    settings: Settings,
    previous: &ViewModel,
    ids: &dyn IdentityIssuer,
) -> ViewModel {
    let mut settings = settings.normalized();

    let mut build = Build::default();
    if let Some(table) = table {
        build.consume(table, &settings, ids);
    }
    let Build {
        mut points,
        mut thresholds,
        enumeration,
        legend,
        domain,
        has_target,
        has_highlights,
        are_percentages,
        has_state_measures,
        ..
    } = build;

    if !has_state_measures {
        for (i, slot) in settings.states.manual.iter().enumerate() {
            if let (Some(value), Some(fill)) = (slot.value, slot.fill) {
                thresholds.push(StateThreshold {
                    value,
                    color: Some(fill),
                    display_name: None,
                    is_target: false,
                    source_position: i,
                    identity: None,
                    data_point_identity: None,
                });
            }
        }
    }

    // percentage and modifier comparisons are meaningless without a target
    if !has_target {
        settings.states.calculate = CalculateMode::Absolute;
    }
    sort_thresholds(&mut thresholds, settings.states.comparison);
    relocate_targets(&mut thresholds);
    let has_states = !thresholds.is_empty();
    if has_states {
        assign_palette(&mut thresholds, settings.states.comparison);
    }

    let mut maps = derive_maps(table, &settings, ids);
    let reused = maps_equivalent(
        &previous.maps,
        previous.settings.general.selected_map,
        &maps,
        settings.general.selected_map,
    );
    if reused {
        maps = previous.maps.clone();
    } else {
        hydrate_inline_maps(&mut maps);
    }

    for point in &mut points {
        point.selected = previous
            .data_points
            .iter()
            .any(|old| old.selected && old.identity.is_some() && old.identity == point.identity);
    }

    // rebuilding the canvas destroys the labels with it
    let labels_unchanged = reused
        && points == previous.data_points
        && thresholds == previous.states
        && settings.data_labels == previous.settings.data_labels
        && settings.data_point == previous.settings.data_point
        && settings.general.show_unmatched == previous.settings.general.show_unmatched;
    let actions = ResetActions {
        canvas: !reused,
        labels: !labels_unchanged,
        selection: settings.toolbar.filter != previous.settings.toolbar.filter,
        toolbar: settings.toolbar.zoom != previous.settings.toolbar.zoom,
    };

    let flags = ModelFlags {
        has_highlights,
        has_categories: table.is_some_and(|t| t.category.is_some()),
        has_groups: table.is_some_and(|t| t.groups.iter().any(|g| g.name.is_some())),
        has_target,
        has_states,
        are_percentages,
    };

    tracing::debug!(
        points = points.len(),
        maps = maps.len(),
        states = thresholds.len(),
        reset_canvas = actions.canvas,
        "view model built"
    );

    ViewModel {
        match_index: build_match_index(&points),
        data_points: points,
        enumeration,
        legend,
        maps,
        states: thresholds,
        domain,
        settings,
        flags,
        actions,
    }
}

/// Mutable state of one build pass over the query table.
#[derive(Default)]
struct Build {
    points: Vec<DataPoint>,
    thresholds: Vec<StateThreshold>,
    enumeration: Vec<EnumerationEntry>,
    legend: Vec<LegendEntry>,
    domain: chorograph_shared::Domain,
    has_target: bool,
    has_highlights: bool,
    are_percentages: bool,
    has_state_measures: bool,
    seen_keys: Vec<String>,
    accumulator: DomainAccumulator,
}

impl Build {
    fn consume(&mut self, table: &QueryTable, settings: &Settings, ids: &dyn IdentityIssuer) {
        self.has_highlights = table
            .groups
            .iter()
            .flat_map(|group| &group.measures)
            .any(|measure| measure.highlights.is_some());
        self.are_percentages = table
            .groups
            .iter()
            .find_map(|group| roles_of(group).value?.format.clone())
            .is_some_and(|format| is_percent_format(&format));

        let bare = MeasureGroup::unnamed(Vec::new());
        let groups: Vec<&MeasureGroup> = if table.groups.is_empty() {
            vec![&bare]
        } else {
            table.groups.iter().collect()
        };
        let row_count = table
            .category
            .as_ref()
            .map(|c| c.values.len())
            .unwrap_or(1);

        for group in groups {
            let roles = roles_of(group);
            self.has_target |= roles.target.is_some();
            self.has_state_measures |= !roles.states.is_empty();

            if table.category.is_none() && group.name.is_none() {
                self.consume_measure_keyed(table, group, &roles, settings, ids);
            } else {
                for row in 0..row_count {
                    self.consume_cell(table, group, &roles, row, row_count, settings, ids);
                }
            }
        }
        self.domain = self.accumulator.finish();
    }

    /// No category and no series: each value measure is its own point.
    fn consume_measure_keyed(
        &mut self,
        table: &QueryTable,
        group: &MeasureGroup,
        roles: &Roles<'_>,
        settings: &Settings,
        ids: &dyn IdentityIssuer,
    ) {
        for measure in group
            .measures
            .iter()
            .filter(|m| m.role == MeasureRole::Value)
        {
            let identity = Some(ids.measure(&measure.query_name));
            let color = measure
                .color
                .unwrap_or_else(|| fallback_color(&measure.display_name, settings));
            self.record_key(&measure.display_name, color, &identity);

            let mut point = DataPoint::named(measure.display_name.clone());
            point.value = measure.value_at(0);
            point.highlight_value = measure.highlight_at(0);
            point.state_value = roles.states.first().and_then(|m| m.value_at(0));
            point.highlight_state_value = roles.states.first().and_then(|m| m.highlight_at(0));
            point.target = roles.target.and_then(|m| m.value_at(0));
            point.color = color;
            point.format = measure.format.clone();
            point.identity = identity.clone();
            point.highlight = point.highlight_value.is_some();
            point.tooltips = self.cell_tooltips(table, group, roles, 0, Some(measure));
            self.accumulate(&point);
            self.points.push(point);
        }
        self.push_auto_thresholds(roles, 0, settings, None, ids);
    }

    fn consume_cell(
        &mut self,
        table: &QueryTable,
        group: &MeasureGroup,
        roles: &Roles<'_>,
        row: usize,
        row_count: usize,
        settings: &Settings,
        ids: &dyn IdentityIssuer,
    ) {
        let category = table.category.as_ref();

        // naming/coloring precedence: group, then category, then measure
        let keyed_by_group =
            group.name.is_some() && (!settings.data_point.color_by_category || category.is_none());
        let (key, identity, explicit_color) = if keyed_by_group {
            let name = group.name.as_deref().unwrap_or_default().to_string();
            (name.clone(), Some(ids.series(&name)), group.color)
        } else if let Some(category) = category {
            (
                category.values[row].clone(),
                Some(ids.category(&category.query_name, row)),
                category.row_color(row),
            )
        } else if let Some(measure) = roles.value {
            (
                measure.display_name.clone(),
                Some(ids.measure(&measure.query_name)),
                measure.color,
            )
        } else {
            return;
        };
        let color = explicit_color.unwrap_or_else(|| fallback_color(&key, settings));
        self.record_key(&key, color, &identity);

        // a series bucket with at most one populated cell is named after
        // the bucket itself rather than the row
        let display_name = if let (Some(name), Some(measure)) = (&group.name, roles.value)
            && group.single_valued(measure)
        {
            name.clone()
        } else if let Some(category) = category {
            category.values[row].clone()
        } else if let Some(measure) = roles.value {
            measure.display_name.clone()
        } else {
            key.clone()
        };
        let mut point = DataPoint::named(display_name);
        point.category = category.map(|c| c.values[row].clone());
        point.group = group.name.clone();
        point.value = roles.value.and_then(|m| m.value_at(row));
        point.highlight_value = roles.value.and_then(|m| m.highlight_at(row));
        point.state_value = roles.states.first().and_then(|m| m.value_at(row));
        point.highlight_state_value = roles.states.first().and_then(|m| m.highlight_at(row));
        point.target = roles.target.and_then(|m| m.value_at(row));
        point.color = color;
        point.format = roles.value.and_then(|m| m.format.clone());
        point.identity = identity.clone();
        point.highlight = point.highlight_value.is_some();
        point.tooltips = self.cell_tooltips(table, group, roles, row, roles.value);

        self.accumulate(&point);
        let restriction = if category.is_some() && row_count > 1 {
            identity
        } else {
            None
        };
        self.push_auto_thresholds(roles, row, settings, restriction, ids);
        self.points.push(point);
    }

    fn accumulate(&mut self, point: &DataPoint) {
        if let Some(value) = point.value {
            self.accumulator.include_value(value);
        }
        if let (Some(state_value), Some(target)) =
            (point.state_value.or(point.value), point.target)
        {
            let (_, variance) = target_metrics(state_value, Some(target), self.are_percentages);
            self.accumulator.include_variance(variance);
        }
    }

    /// Dedicated state measures (and the target alongside them) become
    /// automatic thresholds. With multiple category rows a threshold is
    /// restricted to the row's data point, since each row carries its
    /// own boundary value.
    fn push_auto_thresholds(
        &mut self,
        roles: &Roles<'_>,
        row: usize,
        settings: &Settings,
        restriction: Option<SelectionKey>,
        ids: &dyn IdentityIssuer,
    ) {
        if roles.states.is_empty() {
            return;
        }
        for measure in &roles.states {
            if let Some(value) = measure.value_at(row) {
                self.push_threshold(measure, value, false, &restriction, ids);
            }
        }
        if let Some(measure) = roles.target
            && let Some(value) = measure.value_at(row)
        {
            // under modifier/percentage modes the operand is already
            // target-relative, so the target band boundary is 0
            let boundary = match settings.states.calculate {
                CalculateMode::Absolute => value,
                CalculateMode::Modifier | CalculateMode::Percentage => 0.0,
            };
            self.push_threshold(measure, boundary, true, &restriction, ids);
        }
    }

    fn push_threshold(
        &mut self,
        measure: &MeasureColumn,
        value: f64,
        is_target: bool,
        restriction: &Option<SelectionKey>,
        ids: &dyn IdentityIssuer,
    ) {
        self.thresholds.push(StateThreshold {
            value,
            color: measure.color,
            display_name: Some(measure.display_name.clone()),
            is_target,
            source_position: self.thresholds.len(),
            identity: Some(ids.measure(&measure.query_name)),
            data_point_identity: restriction.clone(),
        });
    }

    fn record_key(&mut self, key: &str, color: chorograph_shared::Rgb, identity: &Option<SelectionKey>) {
        if self.seen_keys.iter().any(|seen| seen == key) {
            return;
        }
        self.seen_keys.push(key.to_string());
        self.enumeration.push(EnumerationEntry {
            display_name: key.to_string(),
            color,
            identity: identity.clone(),
        });
        self.legend.push(LegendEntry {
            label: key.to_string(),
            color,
            identity: identity.clone(),
            selected: false,
        });
    }

    fn cell_tooltips(
        &self,
        table: &QueryTable,
        group: &MeasureGroup,
        roles: &Roles<'_>,
        row: usize,
        value_measure: Option<&MeasureColumn>,
    ) -> Vec<TooltipEntry> {
        let mut tooltips = Vec::new();
        if let Some(category) = &table.category {
            let label = if category.display_name.is_empty() {
                "Category".to_string()
            } else {
                category.display_name.clone()
            };
            tooltips.push(TooltipEntry {
                label,
                value: category.values[row].clone(),
            });
        }
        if let Some(name) = &group.name {
            tooltips.push(TooltipEntry {
                label: "Subcategory".to_string(),
                value: name.clone(),
            });
        }
        let mut push_measure = |measure: &MeasureColumn| {
            let shown = if measure.highlights.is_some() {
                measure.highlight_at(row)
            } else {
                measure.value_at(row)
            };
            if let Some(value) = shown {
                tooltips.push(TooltipEntry {
                    label: measure.display_name.clone(),
                    value: format_value(value, measure.format.as_deref(), DisplayUnit::None, None),
                });
            }
        };
        if let Some(measure) = value_measure {
            push_measure(measure);
        }
        for measure in &roles.states {
            push_measure(measure);
        }
        if let Some(measure) = roles.target {
            push_measure(measure);
        }
        for measure in &roles.tooltips {
            push_measure(measure);
        }
        tooltips
    }
}

/// Color for a key without a persisted slot: the stock fill, or a
/// stable name-derived color per key when distinct coloring is on.
fn fallback_color(key: &str, settings: &Settings) -> chorograph_shared::Rgb {
    if settings.data_point.show_all {
        chorograph_shared::name_color(key)
    } else {
        settings.data_point.default_fill
    }
}

/// New map list for this update: row-bound maps from the map-series
/// column, else the persisted payload, else nothing. Persisted maps that
/// still carry a measure binding are dropped once the binding is gone.
fn derive_maps(
    table: Option<&QueryTable>,
    settings: &Settings,
    ids: &dyn IdentityIssuer,
) -> Vec<MapDocument> {
    if let Some(series) = table.and_then(|t| t.map_series.as_ref()) {
        let mut maps: Vec<MapDocument> = Vec::new();
        for (row, value) in series.values.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let source = if is_valid_url(value) {
                MapSource::Url(value.clone())
            } else {
                MapSource::Inline(value.clone())
            };
            let identity = ids.category(&series.query_name, row);
            if let Some(existing) = maps
                .iter_mut()
                .find(|map| map.source.dedup_key() == source.dedup_key())
            {
                if let Some(identities) = &mut existing.identities {
                    identities.push(identity);
                }
                continue;
            }
            let mut map = match source {
                MapSource::Url(url) => MapDocument::from_url(url),
                MapSource::Inline(content) => {
                    let name = format!("Bound map {}", maps.len() + 1);
                    MapDocument::from_inline(content, name)
                }
            };
            map.map_measure = Some(series.query_name.clone());
            map.identities = Some(vec![identity]);
            maps.push(map);
        }
        maps
    } else if let Some(payload) = &settings.general.map_payload {
        let maps = maps_from_persisted(payload);
        if maps.first().is_some_and(|map| map.map_measure.is_some()) {
            // the rows these maps were bound to are no longer queried
            Vec::new()
        } else {
            maps
        }
    } else {
        Vec::new()
    }
}

/// The parsed-geometry reuse rule: counts, selected index, and pairwise
/// (bound measure, source key) must all match.
fn maps_equivalent(
    previous: &[MapDocument],
    previous_selected: usize,
    next: &[MapDocument],
    next_selected: usize,
) -> bool {
    previous.len() == next.len()
        && previous_selected == next_selected
        && previous.iter().zip(next).all(|(a, b)| {
            a.map_measure == b.map_measure && a.source.dedup_key() == b.source.dedup_key()
        })
}

/// Parse inline documents that have not been parsed yet. Remote maps
/// stay empty until the host fetches them.
fn hydrate_inline_maps(maps: &mut [MapDocument]) {
    for map in maps.iter_mut() {
        if !map.areas.is_empty() {
            continue;
        }
        let Some(content) = map.source.inline() else {
            continue;
        };
        match parse_svg(content) {
            Ok(doc) => map.areas = doc.areas,
            Err(err) => {
                tracing::warn!(map = %map.display_name, %err, "inline map failed to parse");
            }
        }
    }
}
