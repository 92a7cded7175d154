use super::Vector2d;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Vector2d,
    pub b: Vector2d,
}

impl Segment {
    pub fn new(a: Vector2d, b: Vector2d) -> Self {
        Self { a, b }
    }

    /// Perpendicular to `b - a`, not normalized. Its side depends on the
    /// endpoint order.
    pub fn normal(&self) -> Vector2d {
        (self.b - self.a).normal()
    }

    pub fn vertices(&self) -> [Vector2d; 2] {
        [self.a, self.b]
    }
}

/// Axis-aligned bounding box in y-up world space. Closed on both axes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Aabb {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Aabb {
    /// Extents are reordered when given reversed.
    pub fn new(x0: f64, x1: f64, y0: f64, y1: f64) -> Self {
        Self {
            min_x: x0.min(x1),
            max_x: x0.max(x1),
            min_y: y0.min(y1),
            max_y: y0.max(y1),
        }
    }

    pub fn from_points(p: Vector2d, q: Vector2d) -> Self {
        Self::new(p.x, q.x, p.y, q.y)
    }

    /// Tight box around `vertices`; an empty slice yields the default box.
    pub fn enclosing(vertices: &[Vector2d]) -> Self {
        let Some((first, rest)) = vertices.split_first() else {
            return Self::default();
        };
        rest.iter().fold(
            Self::from_points(*first, *first),
            |Self {
                 min_x,
                 max_x,
                 min_y,
                 max_y,
             },
             v| Self {
                min_x: min_x.min(v.x),
                max_x: max_x.max(v.x),
                min_y: min_y.min(v.y),
                max_y: max_y.max(v.y),
            },
        )
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        !(self.max_x < other.min_x
            || self.min_x > other.max_x
            || self.max_y < other.min_y
            || self.min_y > other.max_y)
    }

    pub fn union(&self, other: &Aabb) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            max_x: self.max_x.max(other.max_x),
            min_y: self.min_y.min(other.min_y),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn translate(&mut self, offset: Vector2d) {
        self.min_x += offset.x;
        self.max_x += offset.x;
        self.min_y += offset.y;
        self.max_y += offset.y;
    }

    pub fn corners(&self) -> [Vector2d; 4] {
        [
            Vector2d::new(self.min_x, self.min_y),
            Vector2d::new(self.max_x, self.min_y),
            Vector2d::new(self.max_x, self.max_y),
            Vector2d::new(self.min_x, self.max_y),
        ]
    }
}

impl From<&Segment> for Aabb {
    fn from(segment: &Segment) -> Self {
        Self::from_points(segment.a, segment.b)
    }
}
