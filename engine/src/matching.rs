//! Name-to-data-point matching. Every lookup name of every data point
//! is indexed under all authoring-tool id encodings, lowercased, so an
//! area matches no matter which tool exported the map.

use std::collections::HashMap;

use chorograph_shared::{Area, DataPoint};

use crate::idents::{ALL_CONVENTIONS, encode_id};

/// Build the lookup table from lowercased candidate ids to data point
/// indices. Later data points win collisions.
pub fn build_match_index(points: &[DataPoint]) -> HashMap<String, usize> {
    let mut index = HashMap::new();
    for (i, point) in points.iter().enumerate() {
        for name in point.lookup_names() {
            index.insert(name.to_lowercase(), i);
            for convention in ALL_CONVENTIONS {
                index.insert(encode_id(name, convention).to_lowercase(), i);
            }
        }
    }
    index
}

/// How one area relates to the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaBinding {
    /// Authored as excluded: never colored by data.
    Excluded,
    /// Under a matchable ancestor: cleared down to the ancestor, which
    /// owns any coloring. Carries the ancestor's data point when the
    /// ancestor name resolved in the index.
    ParentBound(Option<usize>),
    Matched(usize),
    Unmatched,
}

/// Resolve an area against the match index. Exclusion beats everything.
/// An area under a matchable ancestor is never matched by its own id,
/// even when the ancestor itself misses the index.
pub fn bind_area(area: &Area, index: &HashMap<String, usize>) -> AreaBinding {
    if area.unmatchable {
        return AreaBinding::Excluded;
    }
    if let Some(parent) = &area.matchable_parent {
        return AreaBinding::ParentBound(index.get(&parent.to_lowercase()).copied());
    }
    if let Some(id) = &area.element_id
        && let Some(&i) = index.get(&id.to_lowercase())
    {
        return AreaBinding::Matched(i);
    }
    AreaBinding::Unmatched
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorograph_shared::{AreaShape, AreaStyle};

    fn point(category: &str) -> DataPoint {
        let mut point = DataPoint::named(category);
        point.category = Some(category.to_string());
        point
    }

    fn area(id: &str) -> Area {
        Area {
            selector: "region-0".into(),
            element_id: Some(id.into()),
            display_name: id.into(),
            unmatchable: false,
            matchable_parent: None,
            source_style: AreaStyle::default(),
            shape: AreaShape::Group,
            bounding_box: None,
        }
    }

    #[test]
    fn matches_across_encodings() {
        use crate::idents::IdConvention;
        let index = build_match_index(&[point("Café & Bar")]);
        assert!(index.contains_key("café & bar"));
        for convention in [
            IdConvention::Illustrator,
            IdConvention::Inkscape,
            IdConvention::Legacy,
        ] {
            let id = encode_id("Café & Bar", convention);
            assert_eq!(
                bind_area(&area(&id), &index),
                AreaBinding::Matched(0),
                "convention {convention:?} id {id}"
            );
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let index = build_match_index(&[point("North")]);
        assert_eq!(bind_area(&area("NORTH"), &index), AreaBinding::Matched(0));
        assert_eq!(bind_area(&area("north"), &index), AreaBinding::Matched(0));
    }

    #[test]
    fn later_points_win_collisions() {
        let index = build_match_index(&[point("North"), point("north")]);
        assert_eq!(bind_area(&area("North"), &index), AreaBinding::Matched(1));
    }

    #[test]
    fn parent_match_outranks_own_id() {
        let index = build_match_index(&[point("West Wing"), point("Lobby")]);
        let mut lobby = area("Lobby");
        lobby.matchable_parent = Some("West Wing".into());
        assert_eq!(bind_area(&lobby, &index), AreaBinding::ParentBound(Some(0)));
    }

    #[test]
    fn unresolved_parent_still_blocks_own_id() {
        let index = build_match_index(&[point("North")]);
        let mut hall = area("North");
        hall.matchable_parent = Some("Unknown Parent".into());
        assert_eq!(bind_area(&hall, &index), AreaBinding::ParentBound(None));
    }

    #[test]
    fn exclusion_outranks_everything() {
        let index = build_match_index(&[point("Yard")]);
        let mut yard = area("Yard");
        yard.unmatchable = true;
        assert_eq!(bind_area(&yard, &index), AreaBinding::Excluded);
    }

    #[test]
    fn unbound_area_is_unmatched() {
        let index = build_match_index(&[point("North")]);
        assert_eq!(bind_area(&area("Atlantis"), &index), AreaBinding::Unmatched);
    }
}
