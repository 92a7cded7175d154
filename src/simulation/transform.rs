use std::f64::consts::{PI, TAU};

use super::Vector2d;

/// Placement of a rectangle of `size` in world space.
///
/// A local point `p` (in the rectangle's own frame, origin at its lower left
/// corner) maps to `position + rotate(p - pivot, angle)`, so `position` is
/// where the pivot lands in the world.
#[derive(Debug, Clone)]
pub struct RectTransform {
    size: Vector2d,
    position: Vector2d,
    pivot: Vector2d,
    angle: f64,
    sin_cos: Option<(f64, f64)>,
}

impl RectTransform {
    pub fn new(size: Vector2d, position: Vector2d, pivot: Vector2d, angle: f64) -> Self {
        Self {
            size,
            position,
            pivot,
            angle: wrap_angle(angle),
            sin_cos: None,
        }
    }

    pub fn move_by(&mut self, offset: Vector2d) {
        self.position += offset;
    }

    pub fn rotate(&mut self, angle: f64) {
        self.set_angle(self.angle + angle);
    }

    pub fn set_position(&mut self, position: Vector2d) {
        self.position = position;
    }

    pub fn set_angle(&mut self, angle: f64) {
        self.angle = wrap_angle(angle);
        self.sin_cos = None;
    }

    pub fn set_pivot(&mut self, pivot: Vector2d) {
        self.pivot = pivot;
    }

    pub fn size(&self) -> Vector2d {
        self.size
    }

    pub fn position(&self) -> Vector2d {
        self.position
    }

    pub fn pivot(&self) -> Vector2d {
        self.pivot
    }

    /// Angle in radians, counter-clockwise, wrapped to `[-PI, PI)`.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn sin_cos(&mut self) -> (f64, f64) {
        let angle = self.angle;
        *self.sin_cos.get_or_insert_with(|| angle.sin_cos())
    }

    pub fn transform_point(&mut self, point: Vector2d) -> Vector2d {
        let sin_cos = self.sin_cos();
        (point - self.pivot).rotate(sin_cos) + self.position
    }

    /// Local +y axis in world space.
    pub fn up(&mut self) -> Vector2d {
        Vector2d::new(0., 1.).rotate(self.sin_cos())
    }
}

pub(crate) fn wrap_angle(angle: f64) -> f64 {
    if (-PI..PI).contains(&angle) {
        angle
    } else {
        (angle + PI).rem_euclid(TAU) - PI
    }
}
