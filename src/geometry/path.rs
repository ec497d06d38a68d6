//! Vector path representation.
//!
//! Paths are ordered segment lists built either programmatically (by the
//! stock shape generators) or parsed from the compact `"M 0 0 L 1 1 Z"`
//! source form that legacy iWork files store in bezier elements.

use super::Transformation;
use crate::common::{Error, Result};

/// One segment of a [`Path`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    /// Start a new subpath at the given point.
    MoveTo { x: f64, y: f64 },
    /// Straight line to the given point.
    LineTo { x: f64, y: f64 },
    /// Cubic Bezier curve with two control points.
    CurveTo {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x: f64,
        y: f64,
    },
    /// Close the current subpath.
    Close,
}

/// An ordered sequence of path segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// Create an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a path from its compact source form.
    ///
    /// The grammar is a whitespace-separated token stream: `M x y`,
    /// `L x y`, `C x1 y1 x2 y2 x y`, and `Z`. Anything else fails.
    pub fn from_source(source: &str) -> Result<Self> {
        fn read_number<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<f64> {
            let token = tokens
                .next()
                .ok_or_else(|| Error::ParseError("truncated path source".to_string()))?;
            fast_float2::parse::<f64, _>(token)
                .map_err(|_| Error::ParseError(format!("bad coordinate in path: '{}'", token)))
        }

        let mut path = Self::new();
        let mut tokens = source.split_whitespace();

        while let Some(op) = tokens.next() {
            match op {
                "M" => {
                    let x = read_number(&mut tokens)?;
                    let y = read_number(&mut tokens)?;
                    path.append_move_to(x, y);
                },
                "L" => {
                    let x = read_number(&mut tokens)?;
                    let y = read_number(&mut tokens)?;
                    path.append_line_to(x, y);
                },
                "C" => {
                    let x1 = read_number(&mut tokens)?;
                    let y1 = read_number(&mut tokens)?;
                    let x2 = read_number(&mut tokens)?;
                    let y2 = read_number(&mut tokens)?;
                    let x = read_number(&mut tokens)?;
                    let y = read_number(&mut tokens)?;
                    path.append_curve_to(x1, y1, x2, y2, x, y);
                },
                "Z" => path.append_close(),
                other => {
                    return Err(Error::ParseError(format!(
                        "unknown path operator: '{}'",
                        other
                    )));
                },
            }
        }

        Ok(path)
    }

    /// Render the path back to its compact source form.
    pub fn to_source(&self) -> String {
        let mut out = String::new();

        for segment in &self.segments {
            if !out.is_empty() {
                out.push(' ');
            }
            match *segment {
                PathSegment::MoveTo { x, y } => {
                    out.push('M');
                    push_coordinate(&mut out, x);
                    push_coordinate(&mut out, y);
                },
                PathSegment::LineTo { x, y } => {
                    out.push('L');
                    push_coordinate(&mut out, x);
                    push_coordinate(&mut out, y);
                },
                PathSegment::CurveTo {
                    x1,
                    y1,
                    x2,
                    y2,
                    x,
                    y,
                } => {
                    out.push('C');
                    push_coordinate(&mut out, x1);
                    push_coordinate(&mut out, y1);
                    push_coordinate(&mut out, x2);
                    push_coordinate(&mut out, y2);
                    push_coordinate(&mut out, x);
                    push_coordinate(&mut out, y);
                },
                PathSegment::Close => out.push('Z'),
            }
        }

        out
    }

    /// Append a move-to segment.
    pub fn append_move_to(&mut self, x: f64, y: f64) {
        self.segments.push(PathSegment::MoveTo { x, y });
    }

    /// Append a line-to segment.
    pub fn append_line_to(&mut self, x: f64, y: f64) {
        self.segments.push(PathSegment::LineTo { x, y });
    }

    /// Append a curve-to segment.
    pub fn append_curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) {
        self.segments.push(PathSegment::CurveTo {
            x1,
            y1,
            x2,
            y2,
            x,
            y,
        });
    }

    /// Append a close segment.
    pub fn append_close(&mut self) {
        self.segments.push(PathSegment::Close);
    }

    /// Whether the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segments, in order.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Apply an affine transformation to every point, in place.
    pub fn transform(&mut self, tr: &Transformation) {
        for segment in &mut self.segments {
            match segment {
                PathSegment::MoveTo { x, y } | PathSegment::LineTo { x, y } => {
                    (*x, *y) = tr.apply(*x, *y, false);
                },
                PathSegment::CurveTo {
                    x1,
                    y1,
                    x2,
                    y2,
                    x,
                    y,
                } => {
                    (*x1, *y1) = tr.apply(*x1, *y1, false);
                    (*x2, *y2) = tr.apply(*x2, *y2, false);
                    (*x, *y) = tr.apply(*x, *y, false);
                },
                PathSegment::Close => {},
            }
        }
    }

    /// Segment-wise comparison within `eps`.
    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        if self.segments.len() != other.segments.len() {
            return false;
        }
        let close = |a: f64, b: f64| (a - b).abs() < eps;
        self.segments
            .iter()
            .zip(&other.segments)
            .all(|(a, b)| match (*a, *b) {
                (PathSegment::MoveTo { x, y }, PathSegment::MoveTo { x: ox, y: oy })
                | (PathSegment::LineTo { x, y }, PathSegment::LineTo { x: ox, y: oy }) => {
                    close(x, ox) && close(y, oy)
                },
                (
                    PathSegment::CurveTo {
                        x1,
                        y1,
                        x2,
                        y2,
                        x,
                        y,
                    },
                    PathSegment::CurveTo {
                        x1: ox1,
                        y1: oy1,
                        x2: ox2,
                        y2: oy2,
                        x: ox,
                        y: oy,
                    },
                ) => {
                    close(x1, ox1)
                        && close(y1, oy1)
                        && close(x2, ox2)
                        && close(y2, oy2)
                        && close(x, ox)
                        && close(y, oy)
                },
                (PathSegment::Close, PathSegment::Close) => true,
                _ => false,
            })
    }
}

/// Render a coordinate, preferring the short integral form.
fn push_coordinate(out: &mut String, v: f64) {
    out.push(' ');
    if v == v.trunc() && v.abs() < 1e15 {
        let mut buffer = itoa::Buffer::new();
        out.push_str(buffer.format(v as i64));
    } else {
        let mut buffer = ryu::Buffer::new();
        out.push_str(buffer.format(v));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_from_source_matches_manual_build() {
        let parsed = Path::from_source("M 0 0 L 1 1").unwrap();
        let mut built = Path::new();
        built.append_move_to(0.0, 0.0);
        built.append_line_to(1.0, 1.0);
        assert!(parsed.approx_eq(&built, EPS));
    }

    #[test]
    fn test_source_round_trip() {
        let source = "M 0 0 L 100 0 C 120 0 120 20 100 20 Z";
        let path = Path::from_source(source).unwrap();
        let rendered = path.to_source();
        let reparsed = Path::from_source(&rendered).unwrap();
        assert!(path.approx_eq(&reparsed, EPS));
        assert_eq!(source, rendered);
    }

    #[test]
    fn test_bad_source_rejected() {
        assert!(Path::from_source("M 0").is_err());
        assert!(Path::from_source("Q 0 0").is_err());
        assert!(Path::from_source("M x y").is_err());
    }

    #[test]
    fn test_transform_moves_all_points() {
        let mut path = Path::from_source("M 0 0 L 1 0 C 1 1 0 1 0 0 Z").unwrap();
        path.transform(&Transformation::translate(10.0, 5.0));
        let expected = Path::from_source("M 10 5 L 11 5 C 11 6 10 6 10 5 Z").unwrap();
        assert!(path.approx_eq(&expected, EPS));
    }
}
