use log::{debug, info};

use super::{
    AttitudeMode, CollisionPipeline, EngineMode, FlightState, Landscape, RectCollider, Rocket,
    RocketTelemetry,
};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExecutionStatus {
    InProgress,
    Finished(FlightState),
    /// The control source asked to stop.
    Aborted,
}

/// Per-tick pilot input.
///
/// `toggle_stabilization` is expected to be edge detected by the source:
/// returning `true` on consecutive ticks flips the passive mode each time.
pub trait ControlSource {
    /// Called once per tick before any signal is read.
    fn observe(&mut self, _rocket: &Rocket) {}

    fn thrust_up(&self) -> bool {
        false
    }
    fn thrust_down(&self) -> bool {
        false
    }
    fn rotate_ccw(&self) -> bool {
        false
    }
    fn rotate_cw(&self) -> bool {
        false
    }
    fn toggle_stabilization(&self) -> bool {
        false
    }
    fn quit(&self) -> bool {
        false
    }
}

/// Fixed set of signals, held for as long as the value lives.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    pub thrust_up: bool,
    pub thrust_down: bool,
    pub rotate_ccw: bool,
    pub rotate_cw: bool,
    pub toggle_stabilization: bool,
    pub quit: bool,
}

impl ControlSource for ControlState {
    fn thrust_up(&self) -> bool {
        self.thrust_up
    }
    fn thrust_down(&self) -> bool {
        self.thrust_down
    }
    fn rotate_ccw(&self) -> bool {
        self.rotate_ccw
    }
    fn rotate_cw(&self) -> bool {
        self.rotate_cw
    }
    fn toggle_stabilization(&self) -> bool {
        self.toggle_stabilization
    }
    fn quit(&self) -> bool {
        self.quit
    }
}

mod defaults {
    pub const TARGET_SPEED: f64 = -1.5;
    pub const SPEED_GAIN: f64 = 1.;
    pub const THRUST_TOLERANCE: f64 = 60.;
}

/// Holds a vertical speed with the main engine and keeps the attitude
/// stabilised.
#[derive(Debug, Clone)]
pub struct Autopilot {
    target_speed: f64,
    gain: f64,
    tolerance: f64,
    stabilizing: bool,
    toggle: bool,
    up: bool,
    down: bool,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new(defaults::TARGET_SPEED)
    }
}

impl Autopilot {
    /// `target_speed` is the vertical velocity to hold, negative when
    /// descending.
    pub fn new(target_speed: f64) -> Self {
        Self {
            target_speed,
            gain: defaults::SPEED_GAIN,
            tolerance: defaults::THRUST_TOLERANCE,
            stabilizing: false,
            toggle: false,
            up: false,
            down: false,
        }
    }

    pub fn with_gain(self, gain: f64) -> Self {
        Self { gain, ..self }
    }

    pub fn with_tolerance(self, tolerance: f64) -> Self {
        Self { tolerance, ..self }
    }

    pub fn target_speed(&self) -> f64 {
        self.target_speed
    }

    fn desired_thrust(&self, rocket: &Rocket) -> f64 {
        let mass = rocket.settings().mass + rocket.fuel();
        let gravity = -rocket.settings().gravity.y;
        let error = rocket.velocity().y - self.target_speed;
        (mass * (gravity - self.gain * error)).clamp(0., rocket.max_thrust())
    }
}

impl ControlSource for Autopilot {
    fn observe(&mut self, rocket: &Rocket) {
        self.toggle = !self.stabilizing;
        self.stabilizing = true;

        let desired = self.desired_thrust(rocket);
        self.up = rocket.thrust() < desired - self.tolerance;
        self.down = rocket.thrust() > desired + self.tolerance;
    }

    fn thrust_up(&self) -> bool {
        self.up
    }
    fn thrust_down(&self) -> bool {
        self.down
    }
    fn toggle_stabilization(&self) -> bool {
        self.toggle
    }
}

/// Maps control signals onto engine and attitude modes.
pub fn apply_controls<C: ControlSource + ?Sized>(rocket: &mut Rocket, controls: &C) {
    let engine = if controls.thrust_up() {
        EngineMode::IncreaseThrust
    } else if controls.thrust_down() {
        EngineMode::DecreaseThrust
    } else {
        EngineMode::Idle
    };
    rocket.toggle_engine(engine);

    if controls.toggle_stabilization() {
        rocket.toggle_stabilization();
    }
    let attitude = if controls.rotate_ccw() {
        AttitudeMode::Ccw
    } else if controls.rotate_cw() {
        AttitudeMode::Cw
    } else {
        AttitudeMode::Passive
    };
    rocket.toggle_attitude(attitude);
}

/// Drives one rocket over a landscape, one tick per `iterate`.
pub struct LanderRunner {
    rocket: Rocket,
    landscape: Landscape,
    obstacles: Vec<RectCollider>,
    pipeline: CollisionPipeline,
    tick: usize,
    last_contacts: usize,
}

impl LanderRunner {
    pub fn new(rocket: Rocket, landscape: Landscape, obstacles: Vec<RectCollider>) -> Self {
        Self {
            rocket,
            landscape,
            obstacles,
            pipeline: CollisionPipeline::new(),
            tick: 0,
            last_contacts: 0,
        }
    }

    pub fn reinitialize(&mut self) {
        self.rocket.reset();
        self.pipeline = CollisionPipeline::new();
        self.tick = 0;
        self.last_contacts = 0;
    }

    /// Reads the controls, advances the rocket by `dt` and resolves its
    /// contacts.
    pub fn iterate<C: ControlSource + ?Sized>(
        &mut self,
        controls: &mut C,
        dt: f64,
    ) -> Result<ExecutionStatus> {
        if !dt.is_finite() || dt <= 0. {
            return Err(Error::InvalidTimeStep(dt));
        }
        if self.rocket.flight_state().is_terminal() {
            return Ok(ExecutionStatus::Finished(self.rocket.flight_state()));
        }

        controls.observe(&self.rocket);
        if controls.quit() {
            info!("run aborted at tick {}", self.tick);
            return Ok(ExecutionStatus::Aborted);
        }
        apply_controls(&mut self.rocket, controls);

        self.rocket.update(dt);
        self.last_contacts =
            self.pipeline
                .step(&self.landscape, &self.obstacles, &mut self.rocket, dt);
        if self.last_contacts > 0 {
            debug!("tick {}: {} contacts", self.tick, self.last_contacts);
        }
        self.tick += 1;

        Ok(match self.rocket.flight_state() {
            FlightState::InFlight => ExecutionStatus::InProgress,
            state => ExecutionStatus::Finished(state),
        })
    }

    pub fn rocket(&self) -> &Rocket {
        &self.rocket
    }

    pub fn rocket_mut(&mut self) -> &mut Rocket {
        &mut self.rocket
    }

    pub fn landscape(&self) -> &Landscape {
        &self.landscape
    }

    pub fn landscape_mut(&mut self) -> &mut Landscape {
        &mut self.landscape
    }

    pub fn obstacles(&self) -> &[RectCollider] {
        &self.obstacles
    }

    pub fn tick(&self) -> usize {
        self.tick
    }

    /// Contacts resolved during the last tick.
    pub fn last_contacts(&self) -> usize {
        self.last_contacts
    }
}

#[derive(Debug, Clone, Default)]
pub struct LanderHistory {
    states: Vec<RocketTelemetry>,
}

impl LanderHistory {
    pub fn with_initial_state(state: RocketTelemetry) -> Self {
        Self {
            states: vec![state],
        }
    }

    pub fn append_state(&mut self, state: RocketTelemetry) {
        self.states.push(state);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn last(&self) -> Option<&RocketTelemetry> {
        self.states.last()
    }

    pub fn iter_history(&self) -> impl Iterator<Item = &RocketTelemetry> + '_ {
        self.states.iter()
    }

    pub fn pretty_to_string(&self) -> String {
        self.iter_history().fold(
            format!(
                "{:>9}{:>9}{:>9}{:>9}{:>9}{:>9}{:>9}",
                "X", "Y", "VX", "VY", "ANGLE", "THRUST", "FUEL"
            ),
            |out,
             RocketTelemetry {
                 position,
                 velocity,
                 angle,
                 thrust,
                 fuel,
                 ..
             }| {
                out + &format!(
                    "\n{:9.2}{:9.2}{:9.2}{:9.2}{:9.3}{:9.0}{:9.2}",
                    position.x, position.y, velocity.x, velocity.y, angle, thrust, fuel
                )
            },
        )
    }
}
