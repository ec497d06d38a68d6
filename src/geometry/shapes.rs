//! Stock shape path generators.
//!
//! Keynote stores stock shapes (polygon, star, arrows, rounded rectangle,
//! callout, quote bubble) as a shape kind plus a couple of parameters; the
//! actual outline has to be synthesized. Each generator works in a
//! normalized unit square, scales the point set into the target size, and
//! converts it to a [`Path`] of line segments. Adjacent equal points are
//! deduplicated and the outline is closed automatically when the first and
//! last points coincide. Fewer than 2 distinct points yield no path.

use super::{Path, Size, Transformation};

const EPS: f64 = 1e-9;

/// A point set pending conversion to a path.
struct Outline {
    points: Vec<(f64, f64)>,
    closed: bool,
}

impl Outline {
    fn new(closed: bool) -> Self {
        Self {
            points: Vec::new(),
            closed,
        }
    }

    fn push(&mut self, x: f64, y: f64) {
        self.points.push((x, y));
    }

    /// Scale the normalized point set into `size` and polyline-ize.
    fn into_path(mut self, size: Size) -> Option<Path> {
        let tr = Transformation::scale(size.width, size.height);
        for point in &mut self.points {
            let (x, y) = tr.apply(point.0, point.1, false);
            // Snap away trigonometric noise.
            *point = (snap(x), snap(y));
        }

        // Drop adjacent duplicates.
        self.points.dedup_by(|a, b| {
            (a.0 - b.0).abs() < EPS && (a.1 - b.1).abs() < EPS
        });

        // An explicitly repeated first point means "closed".
        if self.points.len() > 1 {
            let first = self.points[0];
            let last = *self.points.last().unwrap();
            if (first.0 - last.0).abs() < EPS && (first.1 - last.1).abs() < EPS {
                self.points.pop();
                self.closed = true;
            }
        }

        if self.points.len() < 2 {
            return None;
        }

        let mut path = Path::new();
        let mut points = self.points.into_iter();
        let (x, y) = points.next().unwrap();
        path.append_move_to(x, y);
        for (x, y) in points {
            path.append_line_to(x, y);
        }
        if self.closed && path.segments().len() >= 3 {
            path.append_close();
        }
        Some(path)
    }
}

fn snap(value: f64) -> f64 {
    (value * 1e9).round() / 1e9
}

/// Regular polygon with `edges` vertices, first vertex at the top.
pub fn make_polygon_path(size: Size, edges: u32) -> Option<Path> {
    if edges < 3 {
        return None;
    }
    let mut outline = Outline::new(true);
    let step = 2.0 * std::f64::consts::PI / f64::from(edges);
    for i in 0..edges {
        let angle = f64::from(i) * step;
        // The top point (0.5, 0) swept around the center.
        outline.push(0.5 + 0.5 * angle.sin(), 0.5 - 0.5 * angle.cos());
    }
    outline.into_path(size)
}

/// Star with `points` spikes; `inner_radius` is relative to the outer one.
pub fn make_star_path(size: Size, points: u32, inner_radius: f64) -> Option<Path> {
    if points < 3 {
        return None;
    }
    let inner = 0.5 * inner_radius.clamp(0.0, 1.0);
    let mut outline = Outline::new(true);
    let step = std::f64::consts::PI / f64::from(points);
    for i in 0..(2 * points) {
        let angle = f64::from(i) * step;
        let radius = if i % 2 == 0 { 0.5 } else { inner };
        outline.push(0.5 + radius * angle.sin(), 0.5 - radius * angle.cos());
    }
    outline.into_path(size)
}

/// Right-pointing arrow.
///
/// `head_width` is the head's share of the total width, `stem_thickness`
/// the stem's share of the total height; both in `(0, 1)`.
pub fn make_arrow_path(size: Size, head_width: f64, stem_thickness: f64) -> Option<Path> {
    let head = 1.0 - head_width.clamp(0.0, 1.0);
    let stem = stem_thickness.clamp(0.0, 1.0);
    let top = (1.0 - stem) / 2.0;
    let bottom = (1.0 + stem) / 2.0;

    let mut outline = Outline::new(true);
    outline.push(0.0, top);
    outline.push(head, top);
    outline.push(head, 0.0);
    outline.push(1.0, 0.5);
    outline.push(head, 1.0);
    outline.push(head, bottom);
    outline.push(0.0, bottom);
    outline.into_path(size)
}

/// Arrow with heads at both ends.
pub fn make_double_arrow_path(size: Size, head_width: f64, stem_thickness: f64) -> Option<Path> {
    // Each head gets half of the head allowance.
    let head = head_width.clamp(0.0, 1.0) / 2.0;
    let stem = stem_thickness.clamp(0.0, 1.0);
    let top = (1.0 - stem) / 2.0;
    let bottom = (1.0 + stem) / 2.0;

    let mut outline = Outline::new(true);
    outline.push(0.0, 0.5);
    outline.push(head, 0.0);
    outline.push(head, top);
    outline.push(1.0 - head, top);
    outline.push(1.0 - head, 0.0);
    outline.push(1.0, 0.5);
    outline.push(1.0 - head, 1.0);
    outline.push(1.0 - head, bottom);
    outline.push(head, bottom);
    outline.push(head, 1.0);
    outline.into_path(size)
}

/// How many line segments approximate a quarter arc.
const ARC_SEGMENTS: u32 = 8;

/// Append a quarter-circle arc around `(cx, cy)` from `start_angle`.
fn push_corner(outline: &mut Outline, cx: f64, cy: f64, radius: f64, start_angle: f64) {
    for i in 0..=ARC_SEGMENTS {
        let angle = start_angle + f64::from(i) / f64::from(ARC_SEGMENTS) * std::f64::consts::FRAC_PI_2;
        outline.push(cx + radius * angle.cos(), cy + radius * angle.sin());
    }
}

/// Rectangle with rounded corners; `radius` is relative to the smaller
/// normalized half-extent and clamped to `[0, 0.5]`.
pub fn make_rounded_rectangle_path(size: Size, radius: f64) -> Option<Path> {
    let r = radius.clamp(0.0, 0.5);
    if r < EPS {
        let mut outline = Outline::new(true);
        outline.push(0.0, 0.0);
        outline.push(1.0, 0.0);
        outline.push(1.0, 1.0);
        outline.push(0.0, 1.0);
        return outline.into_path(size);
    }

    let mut outline = Outline::new(true);
    // Clockwise from the top edge; angles are in the y-down frame.
    push_corner(&mut outline, 1.0 - r, r, r, -std::f64::consts::FRAC_PI_2);
    push_corner(&mut outline, 1.0 - r, 1.0 - r, r, 0.0);
    push_corner(&mut outline, r, 1.0 - r, r, std::f64::consts::FRAC_PI_2);
    push_corner(&mut outline, r, r, r, std::f64::consts::PI);
    outline.into_path(size)
}

/// Speech callout: a rounded box with a tail reaching `(tail_x, tail_y)`
/// (normalized coordinates, typically outside the box).
pub fn make_callout_path(size: Size, radius: f64, tail_x: f64, tail_y: f64) -> Option<Path> {
    let r = radius.clamp(0.0, 0.4);
    let mut outline = Outline::new(true);
    if r < EPS {
        outline.push(0.0, 0.0);
        outline.push(1.0, 0.0);
        outline.push(1.0, 1.0);
    } else {
        push_corner(&mut outline, 1.0 - r, r, r, -std::f64::consts::FRAC_PI_2);
        push_corner(&mut outline, 1.0 - r, 1.0 - r, r, 0.0);
    }
    // Tail springs from the lower edge.
    outline.push(0.55, 1.0);
    outline.push(tail_x, tail_y);
    outline.push(0.35, 1.0);
    if r < EPS {
        outline.push(0.0, 1.0);
    } else {
        push_corner(&mut outline, r, 1.0 - r, r, std::f64::consts::FRAC_PI_2);
        push_corner(&mut outline, r, r, r, std::f64::consts::PI);
    }
    outline.into_path(size)
}

/// Quote bubble: a callout with a fixed, stubbier tail.
pub fn make_quote_bubble_path(size: Size, radius: f64, tail_x: f64, tail_y: f64) -> Option<Path> {
    make_callout_path(size, radius.max(0.2), tail_x, tail_y)
}

/// Connector between two objects, bowed through a midpoint.
pub fn make_connection_path(size: Size, middle_x: f64, middle_y: f64) -> Option<Path> {
    let tr = Transformation::scale(size.width, size.height);
    let (mx, my) = tr.apply(middle_x, middle_y, false);
    let (ex, ey) = tr.apply(1.0, 1.0, false);
    let mut path = Path::new();
    path.append_move_to(0.0, 0.0);
    path.append_curve_to(mx, my, mx, my, ex, ey);
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_EPS: f64 = 1e-9;

    fn diamond() -> Path {
        let mut path = Path::new();
        path.append_move_to(50.0, 0.0);
        path.append_line_to(100.0, 50.0);
        path.append_line_to(50.0, 100.0);
        path.append_line_to(0.0, 50.0);
        path.append_close();
        path
    }

    #[test]
    fn test_polygon_diamond() {
        let path = make_polygon_path(Size::new(100.0, 100.0), 4).unwrap();
        assert!(path.approx_eq(&diamond(), TEST_EPS), "got {}", path.to_source());
    }

    #[test]
    fn test_polygon_rejects_degenerate() {
        assert!(make_polygon_path(Size::new(100.0, 100.0), 2).is_none());
    }

    #[test]
    fn test_star_point_count() {
        let path = make_star_path(Size::new(100.0, 100.0), 5, 0.5).unwrap();
        // 10 outline points: one move, nine lines, one close.
        assert_eq!(path.segments().len(), 11);
    }

    #[test]
    fn test_star_inner_radius_shrinks_even_points() {
        let path = make_star_path(Size::new(2.0, 2.0), 4, 0.5).unwrap();
        // Second point is an inner vertex at 45°, radius 0.25 (normalized).
        let crate::geometry::PathSegment::LineTo { x, y } = path.segments()[1] else {
            panic!("expected a line segment");
        };
        let expected_x = 1.0 + 2.0 * 0.25 * std::f64::consts::FRAC_PI_4.sin();
        let expected_y = 1.0 - 2.0 * 0.25 * std::f64::consts::FRAC_PI_4.cos();
        assert!((x - expected_x).abs() < TEST_EPS);
        assert!((y - expected_y).abs() < TEST_EPS);
    }

    #[test]
    fn test_arrow_is_closed_heptagon() {
        let path = make_arrow_path(Size::new(100.0, 40.0), 0.4, 0.5).unwrap();
        // 7 points: move + 6 lines + close.
        assert_eq!(path.segments().len(), 8);
        assert!(matches!(
            path.segments().last(),
            Some(crate::geometry::PathSegment::Close)
        ));
    }

    #[test]
    fn test_rounded_rectangle_zero_radius_is_rectangle() {
        let path = make_rounded_rectangle_path(Size::new(10.0, 20.0), 0.0).unwrap();
        let mut expected = Path::new();
        expected.append_move_to(0.0, 0.0);
        expected.append_line_to(10.0, 0.0);
        expected.append_line_to(10.0, 20.0);
        expected.append_line_to(0.0, 20.0);
        expected.append_close();
        assert!(path.approx_eq(&expected, TEST_EPS));
    }

    #[test]
    fn test_degenerate_size_yields_nothing() {
        assert!(make_rounded_rectangle_path(Size::new(0.0, 0.0), 0.25).is_none());
    }
}
