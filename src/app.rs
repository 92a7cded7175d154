use std::time::{Duration, Instant};

use log::debug;

use crate::error::{Error, Result};
use crate::simulation::*;

mod defaults {
    pub const DT: f64 = 0.02;
    pub const MAX_TICKS: usize = 20_000;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSettings {
    /// Tick length in seconds.
    pub dt: f64,
    /// Ticks after which `run` gives up and reports the flight as unfinished.
    pub max_ticks: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            dt: defaults::DT,
            max_ticks: defaults::MAX_TICKS,
        }
    }
}

impl RunSettings {
    pub fn with_dt(self, dt: f64) -> Self {
        Self { dt, ..self }
    }
    pub fn with_max_ticks(self, max_ticks: usize) -> Self {
        Self { max_ticks, ..self }
    }
}

pub struct App {
    lander_runner: LanderRunner,
    planet: Planet,
    flight_history: LanderHistory,
    settings: RunSettings,
}

impl App {
    pub fn try_new(
        rocket_settings: RocketSettings,
        planet: Planet,
        obstacles: Vec<RectCollider>,
        settings: RunSettings,
    ) -> Result<Self> {
        if !settings.dt.is_finite() || settings.dt <= 0. {
            return Err(Error::InvalidTimeStep(settings.dt));
        }
        let rocket = Rocket::new(rocket_settings);
        let flight_history = LanderHistory::with_initial_state(rocket.telemetry());
        let lander_runner = LanderRunner::new(rocket, planet.landscape().clone(), obstacles);
        Ok(Self {
            lander_runner,
            planet,
            flight_history,
            settings,
        })
    }

    /// One tick; the resulting state is appended to the history.
    pub fn step<C: ControlSource + ?Sized>(&mut self, controls: &mut C) -> Result<ExecutionStatus> {
        let status = self.lander_runner.iterate(controls, self.settings.dt)?;
        if status != ExecutionStatus::Aborted {
            self.flight_history
                .append_state(self.lander_runner.rocket().telemetry());
        }
        Ok(status)
    }

    /// Steps until the flight ends, the controls quit or the tick limit is
    /// hit, in which case `InProgress` is returned.
    pub fn run<C: ControlSource + ?Sized>(&mut self, controls: &mut C) -> Result<ExecutionStatus> {
        while self.lander_runner.tick() < self.settings.max_ticks {
            match self.step(controls)? {
                ExecutionStatus::InProgress => {}
                status => return Ok(status),
            }
        }
        debug!("tick limit {} reached", self.settings.max_ticks);
        Ok(ExecutionStatus::InProgress)
    }

    /// Puts the rocket back at its spawn point and clears the history.
    pub fn restart(&mut self) {
        self.lander_runner.reinitialize();
        self.flight_history =
            LanderHistory::with_initial_state(self.lander_runner.rocket().telemetry());
    }

    pub fn rocket(&self) -> &Rocket {
        self.lander_runner.rocket()
    }

    pub fn lander_runner(&self) -> &LanderRunner {
        &self.lander_runner
    }

    pub fn planet(&self) -> &Planet {
        &self.planet
    }

    pub fn history(&self) -> &LanderHistory {
        &self.flight_history
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub fn print_flight_results(&self) {
        println!("{}", self.flight_history.pretty_to_string());
        println!("Finished {:?}", self.rocket().flight_state());
    }
}

/// Tick rate bookkeeping for an outer loop.
#[derive(Debug, Clone)]
pub struct TickStats {
    started: Instant,
    window_start: Instant,
    window_ticks: u64,
    ticks: u64,
    report_every: Duration,
}

impl Default for TickStats {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl TickStats {
    pub fn new(report_every: Duration) -> Self {
        let now = Instant::now();
        Self {
            started: now,
            window_start: now,
            window_ticks: 0,
            ticks: 0,
            report_every,
        }
    }

    /// Counts one tick. Returns the tick rate of the window that just closed,
    /// if any.
    pub fn record(&mut self) -> Option<f64> {
        self.ticks += 1;
        self.window_ticks += 1;
        let elapsed = self.window_start.elapsed();
        if elapsed < self.report_every {
            return None;
        }
        let rate = self.window_ticks as f64 / elapsed.as_secs_f64();
        self.window_start = Instant::now();
        self.window_ticks = 0;
        Some(rate)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Mean ticks per second since creation.
    pub fn mean_rate(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0. {
            self.ticks as f64 / secs
        } else {
            0.
        }
    }
}
