use log::{debug, info, warn};

use super::{
    Aabb, Collider, CollisionInfo, CompositeBody, PartId, RectCollider, RectTransform, Vector2d,
};

pub(crate) mod defaults {
    pub const GRAVITY: f64 = 1.62;
    pub const MASS: f64 = 1000.;
    pub const MAX_THRUST: f64 = 5000.;
    pub const THRUST_RAMP: f64 = 2500.;
    pub const ATTITUDE_TORQUE: f64 = 300.;
    pub const MAX_FUEL: f64 = 500.;
    pub const FUEL_PER_THRUST: f64 = 8e-4;
    pub const MAX_ATTITUDE_PROPELLANT: f64 = 50.;
    pub const ATTITUDE_PROPELLANT_PER_TORQUE: f64 = 3e-3;
    pub const STABILIZATION_THRESHOLD: f64 = 0.01;
    pub const CRASH_SPEED: f64 = 5.;
    pub const MAX_SURFACE_TILT_DEG: f64 = 15.;
    pub const FRICTION: f64 = 4.;
    pub const SPAWN_X: f64 = 100.;
    pub const SPAWN_Y: f64 = 150.;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    Idle,
    IncreaseThrust,
    DecreaseThrust,
    SetMaxThrust,
    SetNoThrust,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttitudeMode {
    /// Clockwise torque.
    Cw,
    /// Counter-clockwise torque.
    Ccw,
    Idle,
    /// Counter the angular velocity while it exceeds the threshold.
    Stabilize,
    /// Whichever of `Idle` / `Stabilize` is currently selected.
    Passive,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Crash {
    TooFast { speed: f64 },
    TooSteep { tilt: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightState {
    InFlight,
    Landed,
    Crashed(Crash),
}

impl FlightState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FlightState::InFlight)
    }
}

#[derive(Debug, Clone)]
pub struct RocketSettings {
    pub mass: f64,
    pub max_thrust: f64,
    /// Thrust change per second while ramping.
    pub thrust_ramp: f64,
    pub attitude_torque: f64,
    pub max_fuel: f64,
    pub fuel_per_thrust: f64,
    pub max_attitude_propellant: f64,
    pub attitude_propellant_per_torque: f64,
    pub gravity: Vector2d,
    pub stabilization_threshold: f64,
    /// Contact speed above which the rocket is destroyed.
    pub crash_speed: f64,
    /// Steepest surface (radians from horizontal) the rocket may touch.
    pub max_surface_tilt: f64,
    /// Tangential damping rate on contact, per second.
    pub friction: f64,
    pub spawn_position: Vector2d,
    pub spawn_angle: f64,
}

impl Default for RocketSettings {
    fn default() -> Self {
        Self {
            mass: defaults::MASS,
            max_thrust: defaults::MAX_THRUST,
            thrust_ramp: defaults::THRUST_RAMP,
            attitude_torque: defaults::ATTITUDE_TORQUE,
            max_fuel: defaults::MAX_FUEL,
            fuel_per_thrust: defaults::FUEL_PER_THRUST,
            max_attitude_propellant: defaults::MAX_ATTITUDE_PROPELLANT,
            attitude_propellant_per_torque: defaults::ATTITUDE_PROPELLANT_PER_TORQUE,
            gravity: Vector2d::new(0., -defaults::GRAVITY),
            stabilization_threshold: defaults::STABILIZATION_THRESHOLD,
            crash_speed: defaults::CRASH_SPEED,
            max_surface_tilt: defaults::MAX_SURFACE_TILT_DEG.to_radians(),
            friction: defaults::FRICTION,
            spawn_position: Vector2d::new(defaults::SPAWN_X, defaults::SPAWN_Y),
            spawn_angle: 0.,
        }
    }
}

impl RocketSettings {
    pub fn with_mass(self, mass: f64) -> Self {
        Self { mass, ..self }
    }
    pub fn with_max_thrust(self, max_thrust: f64) -> Self {
        Self { max_thrust, ..self }
    }
    pub fn with_thrust_ramp(self, thrust_ramp: f64) -> Self {
        Self {
            thrust_ramp,
            ..self
        }
    }
    pub fn with_attitude_torque(self, attitude_torque: f64) -> Self {
        Self {
            attitude_torque,
            ..self
        }
    }
    pub fn with_max_fuel(self, max_fuel: f64) -> Self {
        Self { max_fuel, ..self }
    }
    pub fn with_fuel_per_thrust(self, fuel_per_thrust: f64) -> Self {
        Self {
            fuel_per_thrust,
            ..self
        }
    }
    pub fn with_max_attitude_propellant(self, max_attitude_propellant: f64) -> Self {
        Self {
            max_attitude_propellant,
            ..self
        }
    }
    pub fn with_attitude_propellant_per_torque(self, attitude_propellant_per_torque: f64) -> Self {
        Self {
            attitude_propellant_per_torque,
            ..self
        }
    }
    pub fn with_gravity(self, gravity: Vector2d) -> Self {
        Self { gravity, ..self }
    }
    pub fn with_stabilization_threshold(self, stabilization_threshold: f64) -> Self {
        Self {
            stabilization_threshold,
            ..self
        }
    }
    pub fn with_crash_speed(self, crash_speed: f64) -> Self {
        Self {
            crash_speed,
            ..self
        }
    }
    pub fn with_max_surface_tilt(self, max_surface_tilt: f64) -> Self {
        Self {
            max_surface_tilt,
            ..self
        }
    }
    pub fn with_friction(self, friction: f64) -> Self {
        Self { friction, ..self }
    }
    pub fn with_spawn_position(self, spawn_position: Vector2d) -> Self {
        Self {
            spawn_position,
            ..self
        }
    }
    pub fn with_spawn_angle(self, spawn_angle: f64) -> Self {
        Self {
            spawn_angle,
            ..self
        }
    }
}

/// Static description of a rocket part.
#[derive(Debug, Clone)]
pub struct PartSpec {
    pub name: &'static str,
    pub size: Vector2d,
    /// Part center relative to the rocket pivot, in the rocket frame.
    pub offset: Vector2d,
    pub angle: f64,
    pub is_leg: bool,
    pub render_id: usize,
}

/// Overall box of the default layout; the pivot sits at the body center.
pub const DEFAULT_SIZE: Vector2d = Vector2d::new(5.2, 6.5);
pub const DEFAULT_PIVOT: Vector2d = Vector2d::new(2.6, 4.);

pub const DEFAULT_LAYOUT: [PartSpec; 4] = [
    PartSpec {
        name: "body",
        size: Vector2d::new(4., 5.),
        offset: Vector2d::new(0., 0.),
        angle: 0.,
        is_leg: false,
        render_id: 0,
    },
    PartSpec {
        name: "left_leg",
        size: Vector2d::new(0.6, 2.),
        offset: Vector2d::new(-2.3, -3.),
        angle: 0.,
        is_leg: true,
        render_id: 1,
    },
    PartSpec {
        name: "right_leg",
        size: Vector2d::new(0.6, 2.),
        offset: Vector2d::new(2.3, -3.),
        angle: 0.,
        is_leg: true,
        render_id: 2,
    },
    PartSpec {
        name: "nozzle",
        size: Vector2d::new(1.2, 0.8),
        offset: Vector2d::new(0., -2.9),
        angle: 0.,
        is_leg: false,
        render_id: 3,
    },
];

#[derive(Debug, Clone)]
pub struct Part {
    name: &'static str,
    offset: Vector2d,
    angle: f64,
    collider: RectCollider,
    is_leg: bool,
    render_id: usize,
    touched_down: bool,
}

impl Part {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn offset(&self) -> Vector2d {
        self.offset
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn collider(&self) -> &RectCollider {
        &self.collider
    }

    pub fn is_leg(&self) -> bool {
        self.is_leg
    }

    pub fn render_id(&self) -> usize {
        self.render_id
    }

    pub fn touched_down(&self) -> bool {
        self.touched_down
    }
}

/// Snapshot of the observable rocket state.
#[derive(Debug, Clone, PartialEq)]
pub struct RocketTelemetry {
    pub position: Vector2d,
    pub velocity: Vector2d,
    pub angle: f64,
    pub angular_velocity: f64,
    pub thrust: f64,
    pub fuel: f64,
    pub attitude_propellant: f64,
    pub flight_state: FlightState,
}

pub struct Rocket {
    settings: RocketSettings,
    transform: RectTransform,
    parts: Vec<Part>,
    aabb: Aabb,

    velocity: Vector2d,
    acceleration: Vector2d,
    angular_velocity: f64,
    angular_acceleration: f64,

    fuel: f64,
    attitude_propellant: f64,
    thrust: f64,

    engine_mode: EngineMode,
    attitude_mode: AttitudeMode,
    passive_attitude_mode: AttitudeMode,
    flight_state: FlightState,
}

impl Rocket {
    pub fn new(settings: RocketSettings) -> Self {
        Self::with_layout(settings, DEFAULT_SIZE, DEFAULT_PIVOT, &DEFAULT_LAYOUT)
    }

    pub fn with_layout(
        settings: RocketSettings,
        size: Vector2d,
        pivot: Vector2d,
        layout: &[PartSpec],
    ) -> Self {
        let parts = layout
            .iter()
            .map(|template| Part {
                name: template.name,
                offset: template.offset,
                angle: template.angle,
                collider: RectCollider::new(
                    template.size,
                    Vector2d::ZERO,
                    template.size / 2.,
                    template.angle,
                ),
                is_leg: template.is_leg,
                render_id: template.render_id,
                touched_down: false,
            })
            .collect();
        let mut rocket = Self {
            transform: RectTransform::new(
                size,
                settings.spawn_position,
                pivot,
                settings.spawn_angle,
            ),
            parts,
            aabb: Aabb::default(),
            velocity: Vector2d::ZERO,
            acceleration: Vector2d::ZERO,
            angular_velocity: 0.,
            angular_acceleration: 0.,
            fuel: settings.max_fuel,
            attitude_propellant: settings.max_attitude_propellant,
            thrust: 0.,
            engine_mode: EngineMode::Idle,
            attitude_mode: AttitudeMode::Idle,
            passive_attitude_mode: AttitudeMode::Idle,
            flight_state: FlightState::InFlight,
            settings,
        };
        rocket.sync_parts();
        rocket
    }

    /// Puts the rocket back at its spawn point with full tanks, keeping the
    /// part allocation.
    pub fn reset(&mut self) {
        self.transform.set_position(self.settings.spawn_position);
        self.transform.set_angle(self.settings.spawn_angle);
        self.velocity = Vector2d::ZERO;
        self.acceleration = Vector2d::ZERO;
        self.angular_velocity = 0.;
        self.angular_acceleration = 0.;
        self.fuel = self.settings.max_fuel;
        self.attitude_propellant = self.settings.max_attitude_propellant;
        self.thrust = 0.;
        self.engine_mode = EngineMode::Idle;
        self.attitude_mode = AttitudeMode::Idle;
        self.passive_attitude_mode = AttitudeMode::Idle;
        self.flight_state = FlightState::InFlight;
        self.parts.iter_mut().for_each(|p| p.touched_down = false);
        self.sync_parts();
    }

    /// Advances the rocket by `dt` seconds. Does nothing once landed or
    /// crashed.
    pub fn update(&mut self, dt: f64) {
        if self.flight_state.is_terminal() {
            return;
        }

        self.update_thrust(dt);
        self.update_angular_acceleration();

        let heading = self.transform.up();
        self.acceleration = self.settings.gravity + heading * (self.thrust / self.total_mass());
        self.burn_propellants(dt);

        // position and angle advance with the velocities of the previous tick
        let offset = self.velocity * dt;
        let rotation = self.angular_velocity * dt;
        self.velocity += self.acceleration * dt;
        self.angular_velocity += self.angular_acceleration * dt;

        self.transform.move_by(offset);
        self.transform.rotate(rotation);
        self.sync_parts();
    }

    pub fn toggle_engine(&mut self, mode: EngineMode) {
        self.engine_mode = mode;
    }

    pub fn toggle_attitude(&mut self, mode: AttitudeMode) {
        self.attitude_mode = mode;
    }

    /// Flips the passive attitude mode between idle and stabilization.
    pub fn toggle_stabilization(&mut self) {
        self.passive_attitude_mode = match self.passive_attitude_mode {
            AttitudeMode::Stabilize => AttitudeMode::Idle,
            _ => AttitudeMode::Stabilize,
        };
        if matches!(
            self.attitude_mode,
            AttitudeMode::Idle | AttitudeMode::Stabilize | AttitudeMode::Passive
        ) {
            self.attitude_mode = AttitudeMode::Passive;
        }
        debug!("passive attitude mode: {:?}", self.passive_attitude_mode);
    }

    /// Resolves one contact of `part`.
    ///
    /// `contacts` is the number of contacts found this tick; positional and
    /// angular corrections are split between them.
    pub fn apply_collision_response(
        &mut self,
        part: PartId,
        info: &CollisionInfo,
        dt: f64,
        contacts: usize,
    ) {
        if matches!(self.flight_state, FlightState::Crashed(_)) || info.is_touching() {
            return;
        }
        let Some(index) = (part.0 < self.parts.len()).then_some(part.0) else {
            warn!("contact reported for unknown part {part:?}");
            return;
        };

        if self.flight_state == FlightState::InFlight {
            let speed = self.velocity.norm();
            if speed > self.settings.crash_speed {
                self.crash(Crash::TooFast { speed });
                return;
            }
            let slope = info.normal.x.abs();
            if slope > self.settings.max_surface_tilt.sin() {
                self.crash(Crash::TooSteep { tilt: slope.asin() });
                return;
            }
            self.touch_down(index);
        }

        let share = 1. / contacts.max(1) as f64;
        let direction = info.mtv.normalize();
        let lever = self.parts[index].collider.support(-direction) - self.position();
        self.move_by(info.mtv * share);

        let normal_speed = self.velocity.dot(direction);
        if normal_speed >= 0. {
            return;
        }
        let tangential = self.velocity - direction * normal_speed;
        let damped = tangential * (1. - self.settings.friction * dt).max(0.);
        let inertia = self.transform.size().norm_sq() + lever.norm_sq();
        self.velocity = damped;
        self.angular_velocity += lever.cross(damped - tangential) / inertia * share;
    }

    pub fn move_by(&mut self, offset: Vector2d) {
        self.transform.move_by(offset);
        self.parts
            .iter_mut()
            .for_each(|part| part.collider.move_by(offset));
        self.aabb.translate(offset);
    }

    pub fn rotate(&mut self, angle: f64) {
        self.transform.rotate(angle);
        self.sync_parts();
    }

    pub fn set_position(&mut self, position: Vector2d) {
        self.transform.set_position(position);
        self.sync_parts();
    }

    pub fn set_angle(&mut self, angle: f64) {
        self.transform.set_angle(angle);
        self.sync_parts();
    }

    pub fn set_velocity(&mut self, velocity: Vector2d) {
        self.velocity = velocity;
    }

    pub fn set_angular_velocity(&mut self, angular_velocity: f64) {
        self.angular_velocity = angular_velocity;
    }

    pub fn flight_state(&self) -> FlightState {
        self.flight_state
    }

    pub fn fuel(&self) -> f64 {
        self.fuel
    }

    pub fn max_fuel(&self) -> f64 {
        self.settings.max_fuel
    }

    pub fn attitude_propellant(&self) -> f64 {
        self.attitude_propellant
    }

    pub fn max_attitude_propellant(&self) -> f64 {
        self.settings.max_attitude_propellant
    }

    pub fn thrust(&self) -> f64 {
        self.thrust
    }

    pub fn max_thrust(&self) -> f64 {
        self.settings.max_thrust
    }

    pub fn engine_mode(&self) -> EngineMode {
        self.engine_mode
    }

    pub fn attitude_mode(&self) -> AttitudeMode {
        self.attitude_mode
    }

    pub fn passive_attitude_mode(&self) -> AttitudeMode {
        self.passive_attitude_mode
    }

    /// World position of the rocket pivot.
    pub fn position(&self) -> Vector2d {
        self.transform.position()
    }

    pub fn angle(&self) -> f64 {
        self.transform.angle()
    }

    pub fn velocity(&self) -> Vector2d {
        self.velocity
    }

    pub fn acceleration(&self) -> Vector2d {
        self.acceleration
    }

    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    pub fn angular_acceleration(&self) -> f64 {
        self.angular_acceleration
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn part(&self, id: PartId) -> Option<&Part> {
        self.parts.get(id.0)
    }

    /// Box enclosing every part.
    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    pub fn part_id(&self, name: &str) -> Option<PartId> {
        self.parts.iter().position(|p| p.name == name).map(PartId)
    }

    pub fn settings(&self) -> &RocketSettings {
        &self.settings
    }

    pub fn telemetry(&self) -> RocketTelemetry {
        RocketTelemetry {
            position: self.position(),
            velocity: self.velocity,
            angle: self.angle(),
            angular_velocity: self.angular_velocity,
            thrust: self.thrust,
            fuel: self.fuel,
            attitude_propellant: self.attitude_propellant,
            flight_state: self.flight_state,
        }
    }

    fn total_mass(&self) -> f64 {
        self.settings.mass + self.fuel
    }

    fn update_thrust(&mut self, dt: f64) {
        if self.fuel <= 0. {
            self.thrust = 0.;
            return;
        }

        let RocketSettings {
            max_thrust,
            thrust_ramp,
            ..
        } = self.settings;
        self.thrust = match self.engine_mode {
            EngineMode::Idle => self.thrust,
            EngineMode::IncreaseThrust => (self.thrust + thrust_ramp * dt).min(max_thrust),
            EngineMode::DecreaseThrust => (self.thrust - thrust_ramp * dt).max(0.),
            EngineMode::SetMaxThrust => max_thrust,
            EngineMode::SetNoThrust => 0.,
        };
    }

    fn update_angular_acceleration(&mut self) {
        if self.attitude_propellant <= 0. {
            self.angular_acceleration = 0.;
            return;
        }

        let authority = self.settings.attitude_torque / self.total_mass();
        let threshold = self.settings.stabilization_threshold;
        self.angular_acceleration = match self.effective_attitude_mode() {
            AttitudeMode::Cw => -authority,
            AttitudeMode::Ccw => authority,
            AttitudeMode::Stabilize if self.angular_velocity > threshold => -authority,
            AttitudeMode::Stabilize if self.angular_velocity < -threshold => authority,
            _ => 0.,
        };
    }

    fn effective_attitude_mode(&self) -> AttitudeMode {
        match self.attitude_mode {
            AttitudeMode::Passive => self.passive_attitude_mode,
            mode => mode,
        }
    }

    fn burn_propellants(&mut self, dt: f64) {
        let had_fuel = self.fuel > 0.;
        self.fuel = (self.fuel - self.thrust * dt * self.settings.fuel_per_thrust).max(0.);
        if had_fuel && self.fuel == 0. {
            info!("main propellant exhausted");
        }

        let had_attitude = self.attitude_propellant > 0.;
        let burned = self.angular_acceleration.abs()
            * self.total_mass()
            * dt
            * self.settings.attitude_propellant_per_torque;
        self.attitude_propellant = (self.attitude_propellant - burned).max(0.);
        if had_attitude && self.attitude_propellant == 0. {
            info!("attitude propellant exhausted");
        }
    }

    fn touch_down(&mut self, index: usize) {
        let part = &mut self.parts[index];
        if !part.is_leg || part.touched_down {
            return;
        }
        part.touched_down = true;
        debug!("{} touched down", part.name);

        if self.parts.iter().filter(|p| p.is_leg).all(|p| p.touched_down) {
            self.flight_state = FlightState::Landed;
            info!(
                "landed at ({:.2}, {:.2}) with {:.1} fuel left",
                self.position().x,
                self.position().y,
                self.fuel
            );
        }
    }

    fn crash(&mut self, crash: Crash) {
        self.flight_state = FlightState::Crashed(crash);
        warn!(
            "crashed at ({:.2}, {:.2}): {crash:?}",
            self.position().x,
            self.position().y
        );
    }

    fn sync_parts(&mut self) {
        let angle = self.transform.angle();
        let pivot = self.transform.pivot();
        for part in &mut self.parts {
            let anchor = self.transform.transform_point(pivot + part.offset);
            part.collider.set_angle(angle + part.angle);
            part.collider.set_position(anchor);
        }
        self.aabb = self
            .parts
            .iter()
            .map(|part| *part.collider.aabb())
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
    }
}

impl CompositeBody for Rocket {
    fn aabb(&self) -> Aabb {
        self.aabb
    }

    fn colliders(&self) -> impl Iterator<Item = (PartId, &RectCollider)> {
        self.parts
            .iter()
            .enumerate()
            .map(|(id, part)| (PartId(id), &part.collider))
    }
}

#[cfg(test)]
mod rocket_tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    fn assert_feq(left: f64, right: f64) {
        if (left - right).abs() > 1e-9 {
            panic!("Float equal assertion failed, {left} != {right}");
        }
    }

    fn assert_close(left: f64, right: f64, range: f64) {
        if (left - right).abs() > range {
            panic!("Assertion failed {left} not close to {right} within a range {range}");
        }
    }

    fn rocket() -> Rocket {
        Rocket::new(RocketSettings::default().with_spawn_position(Vector2d::new(50., 50.)))
    }

    fn ground_contact(depth: f64) -> CollisionInfo {
        CollisionInfo::upward(Vector2d::new(0., depth), Vector2d::new(0., 1.))
    }

    fn leg_ids(rocket: &Rocket) -> (PartId, PartId) {
        (
            rocket.part_id("left_leg").unwrap(),
            rocket.part_id("right_leg").unwrap(),
        )
    }

    #[test]
    fn free_fall_is_semi_implicit() {
        let mut rocket = rocket();
        let dt = 0.1;
        rocket.update(dt);
        assert_feq(rocket.position().y, 50.);
        assert_feq(rocket.velocity().y, -defaults::GRAVITY * dt);

        rocket.update(dt);
        assert_feq(rocket.position().y, 50. - defaults::GRAVITY * dt * dt);
        assert_feq(rocket.velocity().y, -2. * defaults::GRAVITY * dt);
        assert_feq(rocket.position().x, 50.);
    }

    #[test]
    fn max_thrust_accounts_for_propellant_mass() {
        let mut rocket = rocket();
        rocket.toggle_engine(EngineMode::SetMaxThrust);
        rocket.update(0.1);
        assert_eq!(rocket.thrust(), defaults::MAX_THRUST);
        assert_feq(
            rocket.acceleration().y,
            -defaults::GRAVITY + defaults::MAX_THRUST / (defaults::MASS + defaults::MAX_FUEL),
        );
        assert_feq(rocket.acceleration().x, 0.);
    }

    #[test]
    fn thrust_ramps_and_clamps() {
        let mut rocket = rocket();
        rocket.toggle_engine(EngineMode::IncreaseThrust);
        rocket.update(1.);
        assert_feq(rocket.thrust(), defaults::THRUST_RAMP);
        rocket.update(1.);
        rocket.update(1.);
        assert_feq(rocket.thrust(), defaults::MAX_THRUST);

        rocket.toggle_engine(EngineMode::Idle);
        rocket.update(1.);
        assert_feq(rocket.thrust(), defaults::MAX_THRUST);

        rocket.toggle_engine(EngineMode::DecreaseThrust);
        for _ in 0..3 {
            rocket.update(1.);
        }
        assert_eq!(rocket.thrust(), 0.);

        rocket.toggle_engine(EngineMode::SetMaxThrust);
        rocket.update(0.01);
        rocket.toggle_engine(EngineMode::SetNoThrust);
        rocket.update(0.01);
        assert_eq!(rocket.thrust(), 0.);
    }

    #[test]
    fn fuel_consumption() {
        let mut rocket = rocket();
        rocket.toggle_engine(EngineMode::SetMaxThrust);
        rocket.update(0.5);
        assert_feq(
            rocket.max_fuel() - rocket.fuel(),
            defaults::MAX_THRUST * 0.5 * defaults::FUEL_PER_THRUST,
        );
    }

    #[test]
    fn no_thrust_without_fuel() {
        let mut rocket = Rocket::new(RocketSettings::default().with_max_fuel(0.1));
        rocket.toggle_engine(EngineMode::SetMaxThrust);
        rocket.update(1.);
        assert_eq!(rocket.fuel(), 0.);
        rocket.update(1.);
        assert_eq!(rocket.thrust(), 0.);
        assert_feq(rocket.acceleration().y, -defaults::GRAVITY);
    }

    #[test]
    fn thrust_follows_heading() {
        let mut rocket = rocket();
        rocket.set_angle(FRAC_PI_2);
        rocket.toggle_engine(EngineMode::SetMaxThrust);
        rocket.update(0.1);
        assert!(rocket.acceleration().x < 0.);
        assert_feq(rocket.acceleration().y, -defaults::GRAVITY);
    }

    #[test]
    fn attitude_torque_direction() {
        let authority = defaults::ATTITUDE_TORQUE / (defaults::MASS + defaults::MAX_FUEL);
        let mut rocket = rocket();
        rocket.toggle_attitude(AttitudeMode::Cw);
        rocket.update(0.1);
        assert_feq(rocket.angular_acceleration(), -authority);

        rocket.toggle_attitude(AttitudeMode::Ccw);
        rocket.update(0.1);
        assert_feq(rocket.angular_acceleration(), authority);

        rocket.toggle_attitude(AttitudeMode::Idle);
        rocket.update(0.1);
        assert_eq!(rocket.angular_acceleration(), 0.);
    }

    #[test]
    fn attitude_propellant_consumption() {
        let mut rocket = rocket();
        rocket.toggle_attitude(AttitudeMode::Ccw);
        rocket.update(0.5);
        let total_mass = defaults::MASS + defaults::MAX_FUEL;
        let expected = defaults::ATTITUDE_TORQUE / total_mass
            * total_mass
            * 0.5
            * defaults::ATTITUDE_PROPELLANT_PER_TORQUE;
        assert_feq(
            rocket.max_attitude_propellant() - rocket.attitude_propellant(),
            expected,
        );
    }

    #[test]
    fn no_torque_without_attitude_propellant() {
        let mut rocket =
            Rocket::new(RocketSettings::default().with_max_attitude_propellant(0.));
        rocket.toggle_attitude(AttitudeMode::Cw);
        rocket.update(0.1);
        assert_eq!(rocket.angular_acceleration(), 0.);
        assert_eq!(rocket.angular_velocity(), 0.);
    }

    #[test]
    fn stabilization_opposes_spin_above_threshold() {
        let mut rocket = rocket();
        rocket.toggle_attitude(AttitudeMode::Stabilize);
        rocket.set_angular_velocity(0.5);
        rocket.update(0.1);
        assert!(rocket.angular_acceleration() < 0.);

        rocket.set_angular_velocity(-0.5);
        rocket.update(0.1);
        assert!(rocket.angular_acceleration() > 0.);

        rocket.set_angular_velocity(defaults::STABILIZATION_THRESHOLD / 2.);
        rocket.update(0.1);
        assert_eq!(rocket.angular_acceleration(), 0.);
    }

    #[test]
    fn passive_mode_toggle() {
        let mut rocket = rocket();
        rocket.toggle_stabilization();
        assert_eq!(rocket.attitude_mode(), AttitudeMode::Passive);
        assert_eq!(rocket.passive_attitude_mode(), AttitudeMode::Stabilize);
        rocket.set_angular_velocity(1.);
        rocket.update(0.1);
        assert!(rocket.angular_acceleration() < 0.);

        rocket.toggle_attitude(AttitudeMode::Ccw);
        rocket.toggle_stabilization();
        assert_eq!(rocket.attitude_mode(), AttitudeMode::Ccw);
        assert_eq!(rocket.passive_attitude_mode(), AttitudeMode::Idle);
    }

    #[test]
    fn rotation_integrates_semi_implicitly() {
        let mut rocket = rocket();
        rocket.set_angular_velocity(0.2);
        rocket.update(0.5);
        assert_feq(rocket.angle(), 0.1);
    }

    #[test]
    fn parts_follow_the_body() {
        let mut rocket = rocket();
        let (left, _) = leg_ids(&rocket);
        let center = rocket.part(left).unwrap().collider().center();
        assert_feq(center.x, 47.7);
        assert_feq(center.y, 47.);

        rocket.set_angle(FRAC_PI_2);
        let center = rocket.part(left).unwrap().collider().center();
        assert_feq(center.x, 53.);
        assert_feq(center.y, 47.7);

        rocket.move_by(Vector2d::new(1., 2.));
        let center = rocket.part(left).unwrap().collider().center();
        assert_feq(center.x, 54.);
        assert_feq(center.y, 49.7);
    }

    #[test]
    fn composite_aabb_encloses_parts() {
        let mut rocket = rocket();
        rocket.rotate(0.4);
        let aabb = CompositeBody::aabb(&rocket);
        for (_, collider) in rocket.colliders() {
            let part = collider.aabb();
            assert!(aabb.min_x <= part.min_x && part.max_x <= aabb.max_x);
            assert!(aabb.min_y <= part.min_y && part.max_y <= aabb.max_y);
        }
        let lowest = rocket
            .parts()
            .iter()
            .map(|p| p.collider().aabb().min_y)
            .fold(f64::INFINITY, f64::min);
        assert_feq(aabb.min_y, lowest);
    }

    #[test]
    fn fast_contact_crashes() {
        let mut rocket = rocket();
        let (left, _) = leg_ids(&rocket);
        rocket.set_velocity(Vector2d::new(0., -8.));
        rocket.apply_collision_response(left, &ground_contact(0.5), 0.1, 1);
        assert!(matches!(
            rocket.flight_state(),
            FlightState::Crashed(Crash::TooFast { speed }) if speed == 8.
        ));
        assert_eq!(rocket.position(), Vector2d::new(50., 50.));
    }

    #[test]
    fn steep_surface_crashes() {
        let mut rocket = rocket();
        let (left, _) = leg_ids(&rocket);
        rocket.set_velocity(Vector2d::new(0., -1.));
        let normal = Vector2d::new(-0.5, 1.).normalize();
        let info = CollisionInfo::upward(normal * 0.1, normal);
        rocket.apply_collision_response(left, &info, 0.1, 1);
        assert!(matches!(
            rocket.flight_state(),
            FlightState::Crashed(Crash::TooSteep { .. })
        ));
    }

    #[test]
    fn gentle_slope_is_accepted() {
        let mut rocket = rocket();
        let (left, _) = leg_ids(&rocket);
        rocket.set_velocity(Vector2d::new(0., -1.));
        let normal = Vector2d::new(0.1, 1.).normalize();
        let info = CollisionInfo::upward(normal * 0.1, normal);
        rocket.apply_collision_response(left, &info, 0.1, 1);
        assert_eq!(rocket.flight_state(), FlightState::InFlight);
        assert!(rocket.part(left).unwrap().touched_down());
    }

    #[test]
    fn landing_requires_every_leg() {
        let mut rocket = rocket();
        let (left, right) = leg_ids(&rocket);
        rocket.set_velocity(Vector2d::new(0., -1.));
        rocket.apply_collision_response(left, &ground_contact(0.1), 0.1, 1);
        assert_eq!(rocket.flight_state(), FlightState::InFlight);

        let body = rocket.part_id("body").unwrap();
        rocket.apply_collision_response(body, &ground_contact(0.1), 0.1, 1);
        assert_eq!(rocket.flight_state(), FlightState::InFlight);

        rocket.apply_collision_response(right, &ground_contact(0.1), 0.1, 1);
        assert_eq!(rocket.flight_state(), FlightState::Landed);
    }

    #[test]
    fn terminal_states_stick() {
        let mut rocket = rocket();
        let (left, right) = leg_ids(&rocket);
        rocket.set_velocity(Vector2d::new(0., -1.));
        rocket.apply_collision_response(left, &ground_contact(0.1), 0.1, 2);
        rocket.apply_collision_response(right, &ground_contact(0.1), 0.1, 2);
        assert_eq!(rocket.flight_state(), FlightState::Landed);

        rocket.set_velocity(Vector2d::new(0., -20.));
        rocket.apply_collision_response(left, &ground_contact(0.1), 0.1, 1);
        assert_eq!(rocket.flight_state(), FlightState::Landed);
        let position = rocket.position();
        rocket.update(1.);
        assert_eq!(rocket.position(), position);

        let mut rocket = self::rocket();
        rocket.set_velocity(Vector2d::new(0., -20.));
        rocket.apply_collision_response(left, &ground_contact(0.1), 0.1, 1);
        let crashed = rocket.flight_state();
        rocket.set_velocity(Vector2d::new(0., -1.));
        rocket.apply_collision_response(left, &ground_contact(0.1), 0.1, 1);
        rocket.apply_collision_response(right, &ground_contact(0.1), 0.1, 1);
        assert_eq!(rocket.flight_state(), crashed);

        rocket.reset();
        assert_eq!(rocket.flight_state(), FlightState::InFlight);
    }

    #[test]
    fn corrections_are_shared_between_contacts() {
        let mut rocket = rocket();
        let body = rocket.part_id("body").unwrap();
        let mtvs = [0.3, 0.6, 0.9];
        for depth in mtvs {
            rocket.apply_collision_response(body, &ground_contact(depth), 0.1, mtvs.len());
        }
        assert_feq(rocket.position().y, 50. + (0.3 + 0.6 + 0.9) / 3.);
    }

    #[test]
    fn inelastic_normal_response_with_friction() {
        let mut rocket = rocket();
        let body = rocket.part_id("body").unwrap();
        rocket.set_velocity(Vector2d::new(2., -1.));
        rocket.apply_collision_response(body, &ground_contact(0.2), 0.1, 1);
        assert_feq(rocket.velocity().y, 0.);
        assert_feq(rocket.velocity().x, 2. * (1. - defaults::FRICTION * 0.1));
        assert_close(rocket.position().y, 50.2, 1e-9);
    }

    #[test]
    fn separating_contact_keeps_velocity() {
        let mut rocket = rocket();
        let body = rocket.part_id("body").unwrap();
        rocket.set_velocity(Vector2d::new(2., 1.));
        rocket.apply_collision_response(body, &ground_contact(0.2), 0.1, 1);
        assert_eq!(rocket.velocity(), Vector2d::new(2., 1.));
        assert_eq!(rocket.angular_velocity(), 0.);
        assert_feq(rocket.position().y, 50.2);
    }

    #[test]
    fn touching_contact_is_ignored() {
        let mut rocket = rocket();
        let (left, _) = leg_ids(&rocket);
        rocket.set_velocity(Vector2d::new(0., -20.));
        rocket.apply_collision_response(left, &ground_contact(1e-10), 0.1, 1);
        assert_eq!(rocket.flight_state(), FlightState::InFlight);
        assert_eq!(rocket.position(), Vector2d::new(50., 50.));
    }

    #[test]
    fn friction_at_the_feet_tips_the_rocket_forward() {
        let mut rocket = rocket();
        let (left, _) = leg_ids(&rocket);
        rocket.set_velocity(Vector2d::new(2., -1.));
        rocket.apply_collision_response(left, &ground_contact(0.1), 0.1, 1);
        assert!(rocket.angular_velocity() < 0.);
    }

    #[test]
    fn reset_restores_spawn_state() {
        let mut rocket = rocket();
        rocket.toggle_engine(EngineMode::SetMaxThrust);
        rocket.toggle_attitude(AttitudeMode::Cw);
        for _ in 0..10 {
            rocket.update(0.1);
        }
        rocket.reset();
        assert_eq!(rocket.position(), Vector2d::new(50., 50.));
        assert_eq!(rocket.angle(), 0.);
        assert_eq!(rocket.velocity(), Vector2d::ZERO);
        assert_eq!(rocket.fuel(), rocket.max_fuel());
        assert_eq!(rocket.attitude_propellant(), rocket.max_attitude_propellant());
        assert_eq!(rocket.engine_mode(), EngineMode::Idle);
        assert_eq!(rocket.parts().len(), DEFAULT_LAYOUT.len());
        let (left, _) = leg_ids(&rocket);
        let center = rocket.part(left).unwrap().collider().center();
        assert_feq(center.x, 47.7);
        assert_feq(center.y, 47.);
    }
}
