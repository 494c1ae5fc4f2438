//! Affine transform helpers.

use crate::foundation::core::{Affine, Point, Rect, Vec2};
use crate::foundation::math::smooth;

#[inline]
/// Compose so that `first` is applied to points before `then`.
pub fn compose(first: Affine, then: Affine) -> Affine {
    then * first
}

#[inline]
pub fn identity() -> Affine {
    Affine::IDENTITY
}

/// Non-uniform scale about `center`.
pub fn scale_about(sx: f64, sy: f64, center: Point) -> Affine {
    let c = center.to_vec2();
    Affine::translate(c) * Affine::scale_non_uniform(sx, sy) * Affine::translate(-c)
}

/// Rotation by `radians` about `center`.
pub fn rotate_about(radians: f64, center: Point) -> Affine {
    Affine::rotate_about(radians, center)
}

/// Drop float noise from every coefficient.
pub fn smooth_affine(m: Affine) -> Affine {
    Affine::new(m.as_coeffs().map(smooth))
}

pub fn is_identity(m: Affine) -> bool {
    smooth_affine(m) == Affine::IDENTITY
}

/// Bounding box of the `width × height` rectangle after `m`.
pub fn transformed_bounds(m: Affine, width: f64, height: f64) -> Rect {
    let corners = [
        Point::new(0.0, 0.0),
        Point::new(0.0, height),
        Point::new(width, 0.0),
        Point::new(width, height),
    ]
    .map(|p| m * p);

    let mut min = Vec2::new(f64::INFINITY, f64::INFINITY);
    let mut max = Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in corners {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Rect::new(min.x, min.y, max.x, max.y)
}

#[cfg(test)]
#[path = "../../tests/unit/transform/affine.rs"]
mod tests;
