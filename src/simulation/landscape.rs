use std::collections::BTreeMap;

use log::trace;

use super::{Aabb, Collider, CollisionInfo, CompositeBody, Contact, Segment, Shape, Vector2d};

/// Bracketing pair of the last interior height query.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cursor {
    left: (u32, f64),
    right: (u32, f64),
}

impl Cursor {
    fn contains(&self, x: f64) -> bool {
        self.left.0 as f64 <= x && x < self.right.0 as f64
    }

    fn spans(&self, x: u32) -> bool {
        self.left.0 <= x && x <= self.right.0
    }

    fn interpolate(&self, x: f64) -> f64 {
        interpolate(self.left, self.right, x)
    }
}

enum Bracket {
    Inside(Cursor),
    Outside(f64),
}

/// Piecewise-linear ground profile: integer x coordinates mapped to heights,
/// consecutive points joined by straight segments.
#[derive(Debug, Clone, Default)]
pub struct Landscape {
    ground: BTreeMap<u32, f64>,
    cursor: Option<Cursor>,
}

impl Landscape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: impl IntoIterator<Item = (u32, f64)>) -> Self {
        Self {
            ground: points.into_iter().collect(),
            cursor: None,
        }
    }

    /// Inserts or overwrites the height at `x`. A cached bracket touching `x`
    /// is dropped and rebuilt by the next query.
    pub fn add_point(&mut self, x: u32, height: f64) {
        self.ground.insert(x, height);
        if self.cursor.is_some_and(|cursor| cursor.spans(x)) {
            self.cursor = None;
        }
    }

    pub fn clear(&mut self) {
        self.ground.clear();
        self.cursor = None;
    }

    pub fn len(&self) -> usize {
        self.ground.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ground.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.ground.iter().map(|(&x, &h)| (x, h))
    }

    /// First and last x coordinates, if any.
    pub fn x_range(&self) -> Option<(u32, u32)> {
        let (&first, _) = self.ground.first_key_value()?;
        let (&last, _) = self.ground.last_key_value()?;
        Some((first, last))
    }

    /// Ground height at `x`, clamped to the outermost points outside the
    /// profile and 0 for an empty profile.
    ///
    /// Sequential queries are served from the cached bracket of the previous
    /// one while `x` stays inside it.
    pub fn height(&mut self, x: f64) -> f64 {
        if self.ground.is_empty() {
            return 0.;
        }
        if let Some(cursor) = self.cursor.filter(|cursor| cursor.contains(x)) {
            return cursor.interpolate(x);
        }

        trace!("terrain cursor miss at x = {x}");
        match self.bracket(x) {
            Bracket::Inside(cursor) => {
                self.cursor = Some(cursor);
                cursor.interpolate(x)
            }
            Bracket::Outside(height) => height,
        }
    }

    /// Reference implementation of [`Landscape::height`] walking every
    /// point.
    pub fn height_naive(&self, x: f64) -> f64 {
        let mut points = self.points();
        let Some(mut left) = points.next() else {
            return 0.;
        };
        if x < left.0 as f64 {
            return left.1;
        }
        for right in points {
            if x < right.0 as f64 {
                return interpolate(left, right, x);
            }
            left = right;
        }
        left.1
    }

    /// Terrain segments whose x-range overlaps `[min_x, max_x]`, including
    /// the ones starting before `min_x` or ending after `max_x`.
    pub fn segments_in_range(&self, min_x: f64, max_x: f64) -> impl Iterator<Item = Segment> + '_ {
        let start = (min_x > 0.)
            .then(|| self.ground.range(..=floor_key(min_x)).next_back())
            .flatten()
            .map(|(&x, _)| x);
        let mut points = match start {
            Some(start) => self.ground.range(start..),
            None => self.ground.range(..),
        }
        .map(|(&x, &h)| Vector2d::new(x as f64, h));

        let first = points.next();
        points.scan(first, move |previous, point| {
            let left = (*previous)?;
            if left.x > max_x {
                return None;
            }
            *previous = Some(point);
            Some(Segment::new(left, point))
        })
    }

    /// Appends one contact per (part, terrain segment) pair in collision.
    /// Both the MTV and the normal of every contact point upward.
    pub fn collect_contacts<B: CompositeBody>(&self, body: &B, contacts: &mut Vec<Contact>) {
        let bounds = body.aabb();
        if !self
            .segments_in_range(bounds.min_x, bounds.max_x)
            .any(|segment| bounds.intersects(&Aabb::from(&segment)))
        {
            return;
        }

        for (part, collider) in body.colliders() {
            let aabb = collider.aabb();
            for segment in self.segments_in_range(aabb.min_x, aabb.max_x) {
                if !collider.check_aabb_segment(&segment) {
                    continue;
                }
                if let Some(mtv) = collider.check_collision(Shape::Segment(&segment)) {
                    contacts.push(Contact {
                        part,
                        info: CollisionInfo::upward(mtv, segment.normal().normalize()),
                    });
                }
            }
        }
    }

    pub fn check_collision<B: CompositeBody>(&self, body: &B) -> Vec<Contact> {
        let mut contacts = Vec::new();
        self.collect_contacts(body, &mut contacts);
        contacts
    }

    fn bracket(&self, x: f64) -> Bracket {
        let key = floor_key(x);
        let left = (x >= 0.)
            .then(|| self.ground.range(..=key).next_back())
            .flatten();
        let right = match key.checked_add(1) {
            Some(next) if x >= 0. => self.ground.range(next..).next(),
            Some(_) => self.ground.first_key_value(),
            None => None,
        };

        match (left, right) {
            (Some((&lx, &lh)), Some((&rx, &rh))) => Bracket::Inside(Cursor {
                left: (lx, lh),
                right: (rx, rh),
            }),
            (Some((_, &h)), None) | (None, Some((_, &h))) => Bracket::Outside(h),
            (None, None) => Bracket::Outside(0.),
        }
    }
}

fn floor_key(x: f64) -> u32 {
    // Saturating float to int conversion.
    x.floor() as u32
}

fn interpolate((x1, h1): (u32, f64), (x2, h2): (u32, f64), x: f64) -> f64 {
    let t = (x2 as f64 - x) / (x2 as f64 - x1 as f64);
    h1 * t + h2 * (1. - t)
}
