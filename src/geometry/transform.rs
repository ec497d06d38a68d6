//! 2D affine transformations.
//!
//! The transform is stored as six coefficients (a 2×2 linear part plus a
//! translation column). Multiplication composes left to right: `a * b` is
//! "apply `a`, then `b`". This matches the order the drawing pipeline
//! reads, so geometry code can be written as a chain in apply order.

use std::ops::Mul;

/// A 2D affine transformation.
///
/// A point `(x, y)` maps to `(xx*x + xy*y + x0, yx*x + yy*y + y0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformation {
    pub xx: f64,
    pub yx: f64,
    pub xy: f64,
    pub yy: f64,
    pub x0: f64,
    pub y0: f64,
}

impl Default for Transformation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transformation {
    /// The identity transformation.
    pub fn identity() -> Self {
        Self {
            xx: 1.0,
            yx: 0.0,
            xy: 0.0,
            yy: 1.0,
            x0: 0.0,
            y0: 0.0,
        }
    }

    /// Construct from raw coefficients.
    pub fn new(xx: f64, yx: f64, xy: f64, yy: f64, x0: f64, y0: f64) -> Self {
        Self {
            xx,
            yx,
            xy,
            yy,
            x0,
            y0,
        }
    }

    /// Translation by `(tx, ty)`.
    pub fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Scale by `(sx, sy)` about the origin.
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Counterclockwise rotation with the screen's y-down convention.
    pub fn rotate(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(c, -s, s, c, 0.0, 0.0)
    }

    /// Mirror over the vertical and/or horizontal axis.
    pub fn flip(horizontal: bool, vertical: bool) -> Self {
        Self::scale(
            if horizontal { -1.0 } else { 1.0 },
            if vertical { -1.0 } else { 1.0 },
        )
    }

    /// Shear by the given angles, via their tangents.
    pub fn shear(angle_x: f64, angle_y: f64) -> Self {
        Self::new(1.0, angle_y.tan(), angle_x.tan(), 1.0, 0.0, 0.0)
    }

    /// Translate the origin to the center of a `width`×`height` box.
    pub fn center(width: f64, height: f64) -> Self {
        Self::translate(width / 2.0, height / 2.0)
    }

    /// Translate the center of a `width`×`height` box to the origin.
    pub fn origin(width: f64, height: f64) -> Self {
        Self::translate(-width / 2.0, -height / 2.0)
    }

    /// Apply the transformation to a point.
    ///
    /// With `distance` set, the translation column is skipped; this is the
    /// calling mode used for vectors (e.g. line endpoint deltas), not a
    /// separate transform type.
    pub fn apply(&self, x: f64, y: f64, distance: bool) -> (f64, f64) {
        let mut rx = self.xx * x + self.xy * y;
        let mut ry = self.yx * x + self.yy * y;
        if !distance {
            rx += self.x0;
            ry += self.y0;
        }
        (rx, ry)
    }

    /// Coefficient-wise comparison within `eps`.
    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        (self.xx - other.xx).abs() < eps
            && (self.yx - other.yx).abs() < eps
            && (self.xy - other.xy).abs() < eps
            && (self.yy - other.yy).abs() < eps
            && (self.x0 - other.x0).abs() < eps
            && (self.y0 - other.y0).abs() < eps
    }
}

impl Mul for Transformation {
    type Output = Transformation;

    /// `a * b` applies `a` first, then `b`.
    fn mul(self, rhs: Self) -> Self {
        Self {
            xx: rhs.xx * self.xx + rhs.xy * self.yx,
            yx: rhs.yx * self.xx + rhs.yy * self.yx,
            xy: rhs.xx * self.xy + rhs.xy * self.yy,
            yy: rhs.yx * self.xy + rhs.yy * self.yy,
            x0: rhs.xx * self.x0 + rhs.xy * self.y0 + rhs.x0,
            y0: rhs.yx * self.x0 + rhs.yy * self.y0 + rhs.y0,
        }
    }
}
