//! Shape geometry: flattened outlines, bounding boxes, and the
//! pole-of-inaccessibility search used to anchor labels inside
//! irregular areas.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use kurbo::{BezPath, PathEl, Shape};

use chorograph_shared::{AreaShape, BoundingBox};

/// Arc-length spacing, in user units, at which outlines are resampled.
pub const DEFAULT_OUTLINE_STEP: f64 = 5.0;

/// Flatten an area shape into a polygon resampled at a fixed step.
/// Only paths and polygons carry an outline; rects, circles, lines,
/// text, and groups yield an empty polygon and callers fall back to
/// the bounding-box centroid.
pub fn outline_points(shape: &AreaShape, step: f64) -> Vec<[f64; 2]> {
    let polyline = match shape {
        AreaShape::Path { d } => match BezPath::from_svg(d) {
            Ok(path) => flatten_path(&path),
            Err(_) => Vec::new(),
        },
        // open polylines are treated as implicitly closed rings
        AreaShape::Polygon { points, .. } => points.clone(),
        _ => Vec::new(),
    };
    resample(&polyline, step)
}

/// Bounding box of a shape, when one can be computed without layout.
pub fn shape_bbox(shape: &AreaShape) -> Option<BoundingBox> {
    match shape {
        AreaShape::Path { d } => {
            let path = BezPath::from_svg(d).ok()?;
            if path.elements().is_empty() {
                return None;
            }
            let rect = path.bounding_box();
            Some(BoundingBox {
                x: rect.x0,
                y: rect.y0,
                width: rect.x1 - rect.x0,
                height: rect.y1 - rect.y0,
            })
        }
        AreaShape::Polygon { points, .. } => bbox_of_points(points),
        AreaShape::Rect { x, y, width, height } => Some(BoundingBox {
            x: *x,
            y: *y,
            width: *width,
            height: *height,
        }),
        AreaShape::Ellipse { cx, cy, rx, ry } => Some(BoundingBox {
            x: cx - rx,
            y: cy - ry,
            width: rx * 2.0,
            height: ry * 2.0,
        }),
        AreaShape::Line { x1, y1, x2, y2 } => bbox_of_points(&[[*x1, *y1], [*x2, *y2]]),
        AreaShape::Text { .. } | AreaShape::Group => None,
    }
}

fn bbox_of_points(points: &[[f64; 2]]) -> Option<BoundingBox> {
    let first = points.first()?;
    let (mut min_x, mut min_y) = (first[0], first[1]);
    let (mut max_x, mut max_y) = (first[0], first[1]);
    for p in points {
        min_x = min_x.min(p[0]);
        min_y = min_y.min(p[1]);
        max_x = max_x.max(p[0]);
        max_y = max_y.max(p[1]);
    }
    Some(BoundingBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x,
        height: max_y - min_y,
    })
}

fn flatten_path(path: &BezPath) -> Vec<[f64; 2]> {
    let mut out = Vec::new();
    path.flatten(0.25, |el| match el {
        PathEl::MoveTo(p) | PathEl::LineTo(p) => out.push([p.x, p.y]),
        PathEl::ClosePath => {
            if let Some(&first) = out.first() {
                out.push(first);
            }
        }
        _ => {}
    });
    out
}

/// Walk a polyline and emit points every `step` units of arc length.
/// The first vertex is always kept so degenerate outlines still anchor
/// somewhere.
fn resample(polyline: &[[f64; 2]], step: f64) -> Vec<[f64; 2]> {
    if polyline.len() < 2 || step <= 0.0 {
        return polyline.to_vec();
    }
    let mut out = vec![polyline[0]];
    let mut carried = 0.0;
    for pair in polyline.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let dx = b[0] - a[0];
        let dy = b[1] - a[1];
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 {
            continue;
        }
        let mut travelled = step - carried;
        while travelled <= len {
            let t = travelled / len;
            out.push([a[0] + dx * t, a[1] + dy * t]);
            travelled += step;
        }
        carried = len - (travelled - step);
    }
    out
}

/// Interior anchor produced by [`pole_of_inaccessibility`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoleResult {
    pub x: f64,
    pub y: f64,
    /// Distance from the anchor to the nearest polygon edge.
    pub radius: f64,
}

struct Cell {
    x: f64,
    y: f64,
    half: f64,
    dist: f64,
    max: f64,
}

impl Cell {
    fn new(x: f64, y: f64, half: f64, polygon: &[[f64; 2]]) -> Self {
        let dist = signed_distance(x, y, polygon);
        Self {
            x,
            y,
            half,
            dist,
            max: dist + half * std::f64::consts::SQRT_2,
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.max == other.max
    }
}

impl Eq for Cell {}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        self.max.partial_cmp(&other.max).unwrap_or(Ordering::Equal)
    }
}

/// Signed distance from a point to the polygon outline: positive
/// inside, negative outside.
fn signed_distance(x: f64, y: f64, polygon: &[[f64; 2]]) -> f64 {
    let mut inside = false;
    let mut min_sq = f64::INFINITY;
    let n = polygon.len();
    let mut j = n - 1;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[j];
        if (a[1] > y) != (b[1] > y) && x < (b[0] - a[0]) * (y - a[1]) / (b[1] - a[1]) + a[0] {
            inside = !inside;
        }
        min_sq = min_sq.min(segment_distance_sq(x, y, a, b));
        j = i;
    }
    let dist = min_sq.sqrt();
    if inside { dist } else { -dist }
}

fn segment_distance_sq(px: f64, py: f64, a: [f64; 2], b: [f64; 2]) -> f64 {
    let (mut x, mut y) = (a[0], a[1]);
    let dx = b[0] - x;
    let dy = b[1] - y;
    if dx != 0.0 || dy != 0.0 {
        let t = ((px - x) * dx + (py - y) * dy) / (dx * dx + dy * dy);
        if t > 1.0 {
            x = b[0];
            y = b[1];
        } else if t > 0.0 {
            x += dx * t;
            y += dy * t;
        }
    }
    let ex = px - x;
    let ey = py - y;
    ex * ex + ey * ey
}

/// Quadtree search for the interior point farthest from every edge.
/// `precision` bounds how far the result may be from the true pole.
pub fn pole_of_inaccessibility(polygon: &[[f64; 2]], precision: f64) -> Option<PoleResult> {
    let bbox = bbox_of_points(polygon)?;
    if polygon.len() < 3 {
        return None;
    }
    let size = bbox.width.min(bbox.height);
    if size == 0.0 {
        return Some(PoleResult {
            x: bbox.x,
            y: bbox.y,
            radius: 0.0,
        });
    }

    let mut half = size / 2.0;
    let mut queue = BinaryHeap::new();
    let mut x = bbox.x;
    while x < bbox.x + bbox.width {
        let mut y = bbox.y;
        while y < bbox.y + bbox.height {
            queue.push(Cell::new(x + half, y + half, half, polygon));
            y += size;
        }
        x += size;
    }

    // The centroid cell is a good initial candidate for convex shapes.
    let mut best = centroid_cell(polygon);
    let center = Cell::new(bbox.x + bbox.width / 2.0, bbox.y + bbox.height / 2.0, 0.0, polygon);
    if center.dist > best.dist {
        best = center;
    }

    while let Some(cell) = queue.pop() {
        if cell.dist > best.dist {
            best = Cell::new(cell.x, cell.y, 0.0, polygon);
            best.dist = cell.dist;
        }
        if cell.max - best.dist <= precision {
            continue;
        }
        half = cell.half / 2.0;
        queue.push(Cell::new(cell.x - half, cell.y - half, half, polygon));
        queue.push(Cell::new(cell.x + half, cell.y - half, half, polygon));
        queue.push(Cell::new(cell.x - half, cell.y + half, half, polygon));
        queue.push(Cell::new(cell.x + half, cell.y + half, half, polygon));
    }

    Some(PoleResult {
        x: best.x,
        y: best.y,
        radius: best.dist.max(0.0),
    })
}

fn centroid_cell(polygon: &[[f64; 2]]) -> Cell {
    let mut area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    let n = polygon.len();
    let mut j = n - 1;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[j];
        let f = a[0] * b[1] - b[0] * a[1];
        cx += (a[0] + b[0]) * f;
        cy += (a[1] + b[1]) * f;
        area += f * 3.0;
        j = i;
    }
    if area == 0.0 {
        Cell::new(polygon[0][0], polygon[0][1], 0.0, polygon)
    } else {
        Cell::new(cx / area, cy / area, 0.0, polygon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Vec<[f64; 2]> {
        vec![[0.0, 0.0], [size, 0.0], [size, size], [0.0, size], [0.0, 0.0]]
    }

    #[test]
    fn pole_of_square_is_its_center() {
        let pole = pole_of_inaccessibility(&square(10.0), 0.1).unwrap();
        assert!((pole.x - 5.0).abs() < 0.5);
        assert!((pole.y - 5.0).abs() < 0.5);
        assert!((pole.radius - 5.0).abs() < 0.5);
    }

    #[test]
    fn pole_avoids_concave_notch() {
        // U-shape: the pole must land in one of the prongs, not the gap.
        let polygon = vec![
            [0.0, 0.0],
            [30.0, 0.0],
            [30.0, 30.0],
            [20.0, 30.0],
            [20.0, 5.0],
            [10.0, 5.0],
            [10.0, 30.0],
            [0.0, 30.0],
            [0.0, 0.0],
        ];
        let pole = pole_of_inaccessibility(&polygon, 0.1).unwrap();
        assert!(signed_distance(pole.x, pole.y, &polygon) > 0.0);
        assert!(!(10.0..20.0).contains(&pole.x) || pole.y < 5.0);
    }

    #[test]
    fn resample_spacing_is_uniform() {
        let points = resample(&square(10.0), 5.0);
        for pair in points.windows(2) {
            let dx = pair[1][0] - pair[0][0];
            let dy = pair[1][1] - pair[0][1];
            let len = (dx * dx + dy * dy).sqrt();
            assert!(len <= 5.0 + 1e-9, "segment of length {len}");
        }
    }

    #[test]
    fn path_outline_and_bbox() {
        let shape = AreaShape::Path {
            d: "M 0 0 L 40 0 L 40 20 L 0 20 Z".into(),
        };
        let bbox = shape_bbox(&shape).unwrap();
        assert_eq!(bbox.width, 40.0);
        assert_eq!(bbox.height, 20.0);
        assert!(outline_points(&shape, 5.0).len() >= 4);
    }

    #[test]
    fn boxy_shapes_have_no_outline() {
        let rect = AreaShape::Rect {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        };
        let circle = AreaShape::Ellipse {
            cx: 5.0,
            cy: 5.0,
            rx: 5.0,
            ry: 5.0,
        };
        let line = AreaShape::Line {
            x1: 0.0,
            y1: 0.0,
            x2: 10.0,
            y2: 10.0,
        };
        assert!(outline_points(&rect, 5.0).is_empty());
        assert!(outline_points(&circle, 5.0).is_empty());
        assert!(outline_points(&line, 5.0).is_empty());
    }

    #[test]
    fn text_has_no_outline() {
        let shape = AreaShape::Text {
            x: 1.0,
            y: 2.0,
            content: "hi".into(),
        };
        assert!(outline_points(&shape, 5.0).is_empty());
        assert!(shape_bbox(&shape).is_none());
    }
}
