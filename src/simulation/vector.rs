use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector2d {
    pub x: f64,
    pub y: f64,
}

impl Vector2d {
    pub const ZERO: Self = Self { x: 0., y: 0. };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const fn splat(v: f64) -> Self {
        Self { x: v, y: v }
    }

    pub fn dot(self, w: Vector2d) -> f64 {
        self.x * w.x + self.y * w.y
    }

    /// Scalar z-component of the 3D cross product.
    pub fn cross(self, w: Vector2d) -> f64 {
        self.x * w.y - self.y * w.x
    }

    pub fn norm_sq(self) -> f64 {
        self.dot(self)
    }

    pub fn norm(self) -> f64 {
        self.norm_sq().sqrt()
    }

    /// Unit vector in the same direction. The zero vector yields NaNs.
    pub fn normalize(self) -> Self {
        self / self.norm()
    }

    /// Rotated by 90 degrees counter-clockwise: `(x, y) -> (-y, x)`.
    pub fn normal(self) -> Self {
        Self::new(-self.y, self.x)
    }

    pub fn rotate(self, (sin, cos): (f64, f64)) -> Self {
        Self::new(cos * self.x - sin * self.y, sin * self.x + cos * self.y)
    }
}

impl Add for Vector2d {
    type Output = Self;

    fn add(self, w: Self) -> Self {
        Self::new(self.x + w.x, self.y + w.y)
    }
}

impl Sub for Vector2d {
    type Output = Self;

    fn sub(self, w: Self) -> Self {
        Self::new(self.x - w.x, self.y - w.y)
    }
}

impl Neg for Vector2d {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Vector2d {
    type Output = Self;

    fn mul(self, k: f64) -> Self {
        Self::new(self.x * k, self.y * k)
    }
}

impl Mul<Vector2d> for f64 {
    type Output = Vector2d;

    fn mul(self, v: Vector2d) -> Vector2d {
        v * self
    }
}

impl Div<f64> for Vector2d {
    type Output = Self;

    fn div(self, k: f64) -> Self {
        self * (1. / k)
    }
}

impl AddAssign for Vector2d {
    fn add_assign(&mut self, w: Self) {
        *self = *self + w;
    }
}

impl SubAssign for Vector2d {
    fn sub_assign(&mut self, w: Self) {
        *self = *self - w;
    }
}

impl MulAssign<f64> for Vector2d {
    fn mul_assign(&mut self, k: f64) {
        *self = *self * k;
    }
}

impl DivAssign<f64> for Vector2d {
    fn div_assign(&mut self, k: f64) {
        *self = *self / k;
    }
}
