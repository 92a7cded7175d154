use super::{Aabb, Collider, Landscape, RectCollider, Rocket, Shape, Vector2d, TOUCH_EPSILON_SQ};

/// Index of a part inside a composite body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId(pub usize);

/// Resolution data for one contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInfo {
    /// Translation separating the part from what it hit.
    pub mtv: Vector2d,
    /// Unit contact normal.
    pub normal: Vector2d,
}

impl CollisionInfo {
    /// Flips `mtv` and `normal` independently so both point away from the
    /// ground (`y >= 0`).
    pub fn upward(mtv: Vector2d, normal: Vector2d) -> Self {
        Self {
            mtv: if mtv.y < 0. { -mtv } else { mtv },
            normal: if normal.y < 0. { -normal } else { normal },
        }
    }

    pub fn is_touching(&self) -> bool {
        self.mtv.norm_sq() < TOUCH_EPSILON_SQ
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub part: PartId,
    pub info: CollisionInfo,
}

/// A rigid body made of several colliders sharing one reference frame.
pub trait CompositeBody {
    /// Box enclosing every part.
    fn aabb(&self) -> Aabb;

    fn colliders(&self) -> impl Iterator<Item = (PartId, &RectCollider)>;
}

/// Contact detection and dispatch for one body per tick.
///
/// The contact buffer is kept between calls to avoid reallocating, but it is
/// cleared at the start of every call.
#[derive(Debug, Default)]
pub struct CollisionPipeline {
    contacts: Vec<Contact>,
}

impl CollisionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn detect<B: CompositeBody>(
        &mut self,
        landscape: &Landscape,
        obstacles: &[RectCollider],
        body: &B,
    ) -> &[Contact] {
        self.contacts.clear();
        landscape.collect_contacts(body, &mut self.contacts);
        for obstacle in obstacles {
            collect_obstacle_contacts(body, obstacle, &mut self.contacts);
        }
        &self.contacts
    }

    /// Detects the rocket's contacts and feeds each of them to its collision
    /// response. Returns the number of contacts.
    pub fn step(
        &mut self,
        landscape: &Landscape,
        obstacles: &[RectCollider],
        rocket: &mut Rocket,
        dt: f64,
    ) -> usize {
        self.detect(landscape, obstacles, &*rocket);
        let count = self.contacts.len();
        for contact in &self.contacts {
            rocket.apply_collision_response(contact.part, &contact.info, dt, count);
        }
        count
    }

    pub fn last_contacts(&self) -> &[Contact] {
        &self.contacts
    }
}

/// Contacts between every part of `body` and a convex obstacle. The normal
/// is the MTV direction, or zero when the shapes merely touch.
pub fn collect_obstacle_contacts<B: CompositeBody>(
    body: &B,
    obstacle: &RectCollider,
    contacts: &mut Vec<Contact>,
) {
    if !body.aabb().intersects(obstacle.aabb()) {
        return;
    }
    for (part, collider) in body.colliders() {
        if let Some(mtv) = collider.check_collision(Shape::Polygon(obstacle)) {
            let normal = if mtv.norm_sq() < TOUCH_EPSILON_SQ {
                Vector2d::ZERO
            } else {
                mtv.normalize()
            };
            contacts.push(Contact {
                part,
                info: CollisionInfo { mtv, normal },
            });
        }
    }
}
