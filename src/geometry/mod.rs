//! Geometry value types shared across the import pipeline.
//!
//! iWork geometries store a natural size, a position, and a handful of
//! optional presentation attributes (rotation angle, shear angles, flips).
//! Absent attributes are filled in by the per-version defaults strategy at
//! collection time. A [`Geometry`] yields an affine [`Transformation`]
//! through a fixed composition order that must be reproduced exactly for
//! visual correctness; see [`Geometry::transformation`].

mod path;
mod shapes;
mod transform;

pub use path::{Path, PathSegment};
pub use shapes::{
    make_arrow_path, make_callout_path, make_connection_path, make_double_arrow_path,
    make_polygon_path, make_quote_bubble_path, make_rounded_rectangle_path, make_star_path,
};
pub use transform::Transformation;

/// A width/height pair in document units (points).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a new size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An x/y pair in document units (points).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Create a new position.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Placement and orientation of a drawable object.
///
/// All attributes except natural size and position are optional; `None`
/// means "not present in the file", and the effective value is decided by
/// the format-version defaults policy.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Geometry {
    /// Unscaled size of the object.
    pub natural_size: Size,
    /// Position of the top-left corner within the parent coordinate space.
    pub position: Position,
    /// Clockwise-negative rotation angle, in radians.
    pub angle: Option<f64>,
    /// Horizontal shear angle, in radians.
    pub shear_x_angle: Option<f64>,
    /// Vertical shear angle, in radians.
    pub shear_y_angle: Option<f64>,
    /// Mirror over the vertical axis.
    pub horizontal_flip: Option<bool>,
    /// Mirror over the horizontal axis.
    pub vertical_flip: Option<bool>,
    /// The aspect ratio is locked in the editor. Carried through verbatim.
    pub aspect_ratio_locked: Option<bool>,
    /// The size is locked in the editor. Carried through verbatim.
    pub sizes_locked: Option<bool>,
}

impl Geometry {
    /// Build the affine transformation placing this geometry on the canvas.
    ///
    /// The composition order is fixed: move to origin, shear, horizontal
    /// flip, vertical flip, rotate, move back to center, translate to
    /// position. Reordering any of these produces visually wrong output.
    pub fn transformation(&self) -> Transformation {
        let w = self.natural_size.width;
        let h = self.natural_size.height;

        let mut tr = Transformation::origin(w, h);
        if self.shear_x_angle.is_some() || self.shear_y_angle.is_some() {
            tr = tr * Transformation::shear(
                self.shear_x_angle.unwrap_or(0.0),
                self.shear_y_angle.unwrap_or(0.0),
            );
        }
        if self.horizontal_flip.unwrap_or(false) {
            tr = tr * Transformation::flip(true, false);
        }
        if self.vertical_flip.unwrap_or(false) {
            tr = tr * Transformation::flip(false, true);
        }
        if let Some(angle) = self.angle {
            tr = tr * Transformation::rotate(angle);
        }
        tr = tr * Transformation::center(w, h);
        tr * Transformation::translate(self.position.x, self.position.y)
    }
}
