use super::transform::wrap_angle;
use super::{Aabb, RectTransform, Segment, Vector2d};

/// Squared MTV length under which two shapes are considered to be touching
/// rather than interpenetrating.
pub const TOUCH_EPSILON_SQ: f64 = 1e-15;

const DEGENERATE_EDGE_SQ: f64 = 1e-24;

pub type Polygon = [Vector2d; RectCollider::VERTICES];

/// Shapes a collider can be tested against.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    Segment(&'a Segment),
    Polygon(&'a RectCollider),
}

impl<'a> From<&'a Segment> for Shape<'a> {
    fn from(segment: &'a Segment) -> Self {
        Shape::Segment(segment)
    }
}

impl<'a> From<&'a RectCollider> for Shape<'a> {
    fn from(polygon: &'a RectCollider) -> Self {
        Shape::Polygon(polygon)
    }
}

pub trait Collider {
    fn aabb(&self) -> &Aabb;

    fn check_aabb(&self, other: &Aabb) -> bool {
        self.aabb().intersects(other)
    }

    /// Cheap test of the bounding box against the segment: the boxes must
    /// overlap and the box corners must straddle the segment's line.
    fn check_aabb_segment(&self, segment: &Segment) -> bool {
        if !self.check_aabb(&Aabb::from(segment)) {
            return false;
        }
        let axis = segment.normal();
        let (min, max) = projection(&self.aabb().corners(), axis);
        let line = axis.dot(segment.a);
        min <= line && line <= max
    }

    /// Exact test. On collision returns the minimum translation vector that
    /// moves `self` out of `other`.
    fn check_collision(&self, other: Shape<'_>) -> Option<Vector2d>;
}

/// Rectangle collider with cached world-space vertices.
#[derive(Debug, Clone)]
pub struct RectCollider {
    transform: RectTransform,
    vertices: Polygon,
    vertices_dirty: bool,
    aabb: Aabb,
}

impl RectCollider {
    pub const VERTICES: usize = 4;

    pub fn new(size: Vector2d, position: Vector2d, pivot: Vector2d, angle: f64) -> Self {
        let mut collider = Self {
            transform: RectTransform::new(size, position, pivot, angle),
            vertices: [Vector2d::ZERO; Self::VERTICES],
            vertices_dirty: true,
            aabb: Aabb::default(),
        };
        collider.update_aabb();
        collider
    }

    pub fn move_by(&mut self, offset: Vector2d) {
        self.transform.move_by(offset);
        self.shift(offset);
    }

    pub fn rotate(&mut self, angle: f64) {
        self.transform.rotate(angle);
        self.vertices_dirty = true;
        self.update_aabb();
    }

    pub fn set_position(&mut self, position: Vector2d) {
        let offset = position - self.transform.position();
        self.transform.set_position(position);
        self.shift(offset);
    }

    pub fn set_angle(&mut self, angle: f64) {
        if wrap_angle(angle) == self.transform.angle() {
            return;
        }
        self.transform.set_angle(angle);
        self.vertices_dirty = true;
        self.update_aabb();
    }

    pub fn set_pivot(&mut self, pivot: Vector2d) {
        self.transform.set_pivot(pivot);
        self.vertices_dirty = true;
        self.update_aabb();
    }

    pub fn transform(&self) -> &RectTransform {
        &self.transform
    }

    /// World-space corners in counter-clockwise order (for a non-negative
    /// size).
    pub fn vertices(&self) -> &Polygon {
        debug_assert!(!self.vertices_dirty);
        &self.vertices
    }

    pub fn center(&self) -> Vector2d {
        centroid(self.vertices())
    }

    /// Vertex furthest along `direction`.
    pub fn support(&self, direction: Vector2d) -> Vector2d {
        let vertices = self.vertices();
        vertices[1..].iter().fold(vertices[0], |best, &v| {
            if v.dot(direction) > best.dot(direction) {
                v
            } else {
                best
            }
        })
    }

    fn shift(&mut self, offset: Vector2d) {
        self.aabb.translate(offset);
        self.vertices.iter_mut().for_each(|v| *v += offset);
    }

    fn update_aabb(&mut self) {
        self.update_vertices();
        self.aabb = Aabb::enclosing(&self.vertices);
    }

    fn update_vertices(&mut self) {
        if !self.vertices_dirty {
            return;
        }
        let Vector2d { x: w, y: h } = self.transform.size();
        let corners = [
            Vector2d::new(0., 0.),
            Vector2d::new(w, 0.),
            Vector2d::new(w, h),
            Vector2d::new(0., h),
        ];
        for (vertex, corner) in self.vertices.iter_mut().zip(corners) {
            *vertex = self.transform.transform_point(corner);
        }
        self.vertices_dirty = false;
    }
}

impl Collider for RectCollider {
    fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    fn check_collision(&self, other: Shape<'_>) -> Option<Vector2d> {
        match other {
            Shape::Segment(segment) => {
                if !self.check_aabb(&Aabb::from(segment)) {
                    return None;
                }
                separating_axis_test(self.vertices(), &segment.vertices())
            }
            Shape::Polygon(polygon) => {
                if !self.check_aabb(polygon.aabb()) {
                    return None;
                }
                separating_axis_test(self.vertices(), polygon.vertices())
            }
        }
    }
}

/// SAT between two convex vertex loops. A two-vertex loop is a segment and
/// contributes a single axis.
///
/// Returns `None` as soon as a separating axis is found, otherwise the MTV
/// along the axis of least overlap, pointing from `rhs` towards `lhs`.
pub fn separating_axis_test(lhs: &[Vector2d], rhs: &[Vector2d]) -> Option<Vector2d> {
    let mut best: Option<(Vector2d, f64)> = None;
    for axis in edge_axes(lhs).chain(edge_axes(rhs)) {
        let (lhs_min, lhs_max) = projection(lhs, axis);
        let (rhs_min, rhs_max) = projection(rhs, axis);
        if lhs_max < rhs_min || lhs_min > rhs_max {
            return None;
        }
        let overlap = (lhs_max - rhs_min).min(rhs_max - lhs_min);
        if best.map_or(true, |(_, least)| overlap < least) {
            best = Some((axis, overlap));
        }
    }

    let (axis, overlap) = best?;
    let axis = if (centroid(lhs) - centroid(rhs)).dot(axis) < 0. {
        -axis
    } else {
        axis
    };
    Some(axis * overlap)
}

fn edge_axes(vertices: &[Vector2d]) -> impl Iterator<Item = Vector2d> + '_ {
    let len = vertices.len();
    let edges = if len == 2 { 1 } else { len };
    (0..edges).filter_map(move |i| {
        let edge = vertices[(i + 1) % len] - vertices[i];
        (edge.norm_sq() > DEGENERATE_EDGE_SQ).then(|| edge.normal().normalize())
    })
}

fn projection(vertices: &[Vector2d], axis: Vector2d) -> (f64, f64) {
    vertices
        .iter()
        .map(|v| v.dot(axis))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), p| {
            (min.min(p), max.max(p))
        })
}

fn centroid(vertices: &[Vector2d]) -> Vector2d {
    vertices
        .iter()
        .fold(Vector2d::ZERO, |sum, &v| sum + v)
        / vertices.len() as f64
}

#[cfg(test)]
mod collider_tests {
    use std::f64::consts::FRAC_PI_4;

    use super::*;

    fn assert_feq(left: f64, right: f64) {
        if (left - right).abs() > 1e-9 {
            panic!("Float equal assertion failed, {left} != {right}");
        }
    }

    fn rect(x: f64, y: f64, w: f64, h: f64) -> RectCollider {
        RectCollider::new(Vector2d::new(w, h), Vector2d::new(x, y), Vector2d::ZERO, 0.)
    }

    fn segment(ax: f64, ay: f64, bx: f64, by: f64) -> Segment {
        Segment::new(Vector2d::new(ax, ay), Vector2d::new(bx, by))
    }

    #[test]
    fn axis_aligned_vertices_and_aabb() {
        let collider = rect(1., 2., 4., 3.);
        assert_eq!(
            collider.vertices(),
            &[
                Vector2d::new(1., 2.),
                Vector2d::new(5., 2.),
                Vector2d::new(5., 5.),
                Vector2d::new(1., 5.),
            ]
        );
        assert_eq!(collider.aabb(), &Aabb::new(1., 5., 2., 5.));
        assert_eq!(collider.center(), Vector2d::new(3., 3.5));
    }

    #[test]
    fn aabb_stays_tight_after_rotation() {
        let mut collider = RectCollider::new(
            Vector2d::new(2., 2.),
            Vector2d::ZERO,
            Vector2d::new(1., 1.),
            0.,
        );
        collider.rotate(FRAC_PI_4);
        let half_diagonal = 2f64.sqrt();
        let aabb = collider.aabb();
        assert_feq(aabb.min_x, -half_diagonal);
        assert_feq(aabb.max_x, half_diagonal);
        assert_feq(aabb.min_y, -half_diagonal);
        assert_feq(aabb.max_y, half_diagonal);
        assert_eq!(aabb, &Aabb::enclosing(collider.vertices()));
    }

    #[test]
    fn translation_shifts_cached_state() {
        let mut collider = RectCollider::new(
            Vector2d::new(2., 1.),
            Vector2d::ZERO,
            Vector2d::new(1., 0.5),
            0.3,
        );
        let before = *collider.vertices();
        collider.move_by(Vector2d::new(3., -1.));
        for (moved, original) in collider.vertices().iter().zip(before) {
            assert_feq(moved.x, original.x + 3.);
            assert_feq(moved.y, original.y - 1.);
        }
        collider.set_position(Vector2d::new(-2., 7.));
        assert_eq!(collider.transform().position(), Vector2d::new(-2., 7.));
        let fresh = RectCollider::new(
            Vector2d::new(2., 1.),
            Vector2d::new(-2., 7.),
            Vector2d::new(1., 0.5),
            0.3,
        );
        for (moved, expected) in collider.vertices().iter().zip(fresh.vertices()) {
            assert_feq(moved.x, expected.x);
            assert_feq(moved.y, expected.y);
        }
        assert_eq!(collider.aabb(), &Aabb::enclosing(collider.vertices()));
    }

    #[test]
    fn pivot_change_moves_shape() {
        let mut collider = rect(0., 0., 2., 2.);
        collider.set_pivot(Vector2d::new(1., 1.));
        assert_eq!(collider.aabb(), &Aabb::new(-1., 1., -1., 1.));
        assert_eq!(collider.center(), Vector2d::ZERO);
    }

    #[test]
    fn overlapping_rectangles_mtv_is_minimum_overlap() {
        let a = rect(0., 0., 4., 4.);
        let b = rect(3., 1., 4., 4.);
        let mtv = a.check_collision(Shape::Polygon(&b)).unwrap();
        assert_feq(mtv.norm(), 1.);
        assert_feq(mtv.x, -1.);
        assert_feq(mtv.y, 0.);

        let mtv = b.check_collision((&a).into()).unwrap();
        assert_feq(mtv.x, 1.);
    }

    #[test]
    fn separated_rectangles_do_not_collide() {
        let a = rect(0., 0., 2., 2.);
        let b = rect(2.5, 0., 2., 2.);
        assert!(a.check_collision(Shape::Polygon(&b)).is_none());
        assert!(b.check_collision(Shape::Polygon(&a)).is_none());
    }

    #[test]
    fn rotated_rectangle_clears_corner_gap() {
        // Bounding boxes overlap but the diamond's edge stays off the square.
        let mut diamond = RectCollider::new(
            Vector2d::new(2., 2.),
            Vector2d::new(3.3, 3.3),
            Vector2d::new(1., 1.),
            0.,
        );
        diamond.rotate(FRAC_PI_4);
        let square = rect(0., 0., 2., 2.);
        assert!(diamond.check_aabb(square.aabb()));
        assert!(diamond.check_collision(Shape::Polygon(&square)).is_none());
    }

    #[test]
    fn touching_rectangles_yield_zero_mtv() {
        let a = rect(0., 0., 2., 2.);
        let b = rect(2., 0., 2., 2.);
        let mtv = a.check_collision(Shape::Polygon(&b)).unwrap();
        assert!(mtv.norm_sq() < TOUCH_EPSILON_SQ);
    }

    #[test]
    fn rectangle_sinking_into_flat_segment() {
        let leg = rect(4., -0.25, 1., 2.);
        let ground = segment(0., 0., 10., 0.);
        let mtv = leg.check_collision(Shape::Segment(&ground)).unwrap();
        assert_feq(mtv.x, 0.);
        assert_feq(mtv.y, 0.25);

        let reversed = segment(10., 0., 0., 0.);
        let mtv = leg.check_collision(Shape::Segment(&reversed)).unwrap();
        assert_feq(mtv.y, 0.25);
    }

    #[test]
    fn rectangle_above_segment() {
        let leg = rect(4., 0.6, 1., 2.);
        let ground = segment(0., 0., 10., 1.);
        assert!(leg.check_collision(Shape::Segment(&ground)).is_none());

        let far = rect(20., 0., 1., 1.);
        assert!(far.check_collision(Shape::Segment(&ground)).is_none());
    }

    #[test]
    fn aabb_segment_test_uses_segment_line() {
        let collider = rect(0., 0., 1., 1.);
        assert!(collider.check_aabb_segment(&segment(-1., 0.5, 2., 0.5)));
        // Boxes overlap but the line passes above the collider's box.
        assert!(!collider.check_aabb_segment(&segment(0.5, 2., 2., 0.5)));
        assert!(!collider.check_aabb_segment(&segment(0.9, 1.5, 3., 1.1)));
        assert!(!collider.check_aabb_segment(&segment(3., 0., 4., 1.)));
    }

    #[test]
    fn support_picks_extreme_vertex() {
        let collider = rect(0., 0., 2., 1.);
        assert_eq!(collider.support(Vector2d::new(1., 1.)), Vector2d::new(2., 1.));
        assert_eq!(collider.support(Vector2d::new(0., -1.)).y, 0.);
    }

    #[test]
    fn set_angle_to_same_value_keeps_cache() {
        let mut collider = rect(0., 0., 2., 1.);
        collider.set_angle(0.);
        assert!(!collider.vertices_dirty);
        assert_eq!(collider.aabb(), &Aabb::new(0., 2., 0., 1.));
    }
}
