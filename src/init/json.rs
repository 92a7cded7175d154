use std::{fs::File, io::Read, path::Path};

use json::{self, JsonValue};

use crate::error::{Error, Result};
use crate::simulation::*;
use crate::RunSettings;

macro_rules! opt_json {
    ($json:ident => $($key:literal),+ ; $func:ident) => {
        optional(&$json$([$key])+, concat!($("/", $key),+), JsonValue::$func)?
    };
}

/// Everything needed to set up a run.
#[derive(Debug, Clone)]
pub struct Config {
    pub rocket: RocketSettings,
    pub terrain: TerrainConfig,
    /// Axis-aligned blocks as `(x, y, width, height)`, lower left corner first.
    pub obstacles: Vec<(f64, f64, f64, f64)>,
    pub run: RunSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TerrainConfig {
    Points(Vec<(u32, f64)>),
    Generated(TerrainSettings),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rocket: RocketSettings::default(),
            terrain: TerrainConfig::Generated(TerrainSettings::default()),
            obstacles: Vec::new(),
            run: RunSettings::default(),
        }
    }
}

impl Config {
    pub fn planet(&self) -> Result<Planet> {
        match &self.terrain {
            TerrainConfig::Points(points) => Ok(Planet::from_landscape(Landscape::from_points(
                points.iter().copied(),
            ))),
            TerrainConfig::Generated(settings) => Planet::try_generate(settings.clone()),
        }
    }

    pub fn obstacle_colliders(&self) -> Vec<RectCollider> {
        self.obstacles
            .iter()
            .map(|&(x, y, w, h)| {
                RectCollider::new(Vector2d::new(w, h), Vector2d::new(x, y), Vector2d::ZERO, 0.)
            })
            .collect()
    }
}

pub fn from_file<P: AsRef<Path>>(file_path: P) -> Result<Config> {
    parse_from_string(&read_file(file_path.as_ref())?)
}

pub fn parse_from_string(content: &str) -> Result<Config> {
    let json = json::parse(content)?;
    Ok(Config {
        rocket: parse_rocket(&json)?,
        terrain: parse_terrain(&json)?,
        obstacles: parse_obstacles(&json["Obstacles"])?,
        run: parse_run(&json)?,
    })
}

fn read_file(file_path: &Path) -> Result<String> {
    let mut file_content = String::new();
    File::open(file_path)
        .and_then(|mut file| file.read_to_string(&mut file_content))
        .map_err(|source| Error::Io {
            path: file_path.to_path_buf(),
            source,
        })?;
    Ok(file_content)
}

/// `None` for an absent key, an error for a present key of the wrong type.
fn optional<T>(
    value: &JsonValue,
    key: &'static str,
    get: impl Fn(&JsonValue) -> Option<T>,
) -> Result<Option<T>> {
    if value.is_null() {
        return Ok(None);
    }
    get(value)
        .map(Some)
        .ok_or_else(|| Error::invalid_value(key, format!("unexpected value {value}")))
}

fn parse_rocket(json: &JsonValue) -> Result<RocketSettings> {
    let mut settings = RocketSettings::default();
    if let Some(mass) = opt_json!(json => "Rocket", "Mass"; as_f64) {
        settings = settings.with_mass(positive("/Rocket/Mass", mass)?);
    }
    if let Some(max_thrust) = opt_json!(json => "Rocket", "MaxThrust"; as_f64) {
        settings = settings.with_max_thrust(non_negative("/Rocket/MaxThrust", max_thrust)?);
    }
    if let Some(ramp) = opt_json!(json => "Rocket", "ThrustRamp"; as_f64) {
        settings = settings.with_thrust_ramp(non_negative("/Rocket/ThrustRamp", ramp)?);
    }
    if let Some(torque) = opt_json!(json => "Rocket", "AttitudeTorque"; as_f64) {
        settings = settings.with_attitude_torque(torque);
    }
    if let Some(fuel) = opt_json!(json => "Rocket", "MaxFuel"; as_f64) {
        settings = settings.with_max_fuel(non_negative("/Rocket/MaxFuel", fuel)?);
    }
    if let Some(rate) = opt_json!(json => "Rocket", "FuelPerThrust"; as_f64) {
        settings = settings.with_fuel_per_thrust(rate);
    }
    if let Some(propellant) = opt_json!(json => "Rocket", "MaxAttitudePropellant"; as_f64) {
        settings = settings.with_max_attitude_propellant(non_negative(
            "/Rocket/MaxAttitudePropellant",
            propellant,
        )?);
    }
    if let Some(rate) = opt_json!(json => "Rocket", "AttitudePropellantPerTorque"; as_f64) {
        settings = settings.with_attitude_propellant_per_torque(rate);
    }
    if let Some(gravity) = opt_json!(json => "Rocket", "Gravity"; as_f64) {
        settings = settings.with_gravity(Vector2d::new(0., -gravity));
    }
    if let Some(threshold) = opt_json!(json => "Rocket", "StabilizationThreshold"; as_f64) {
        settings = settings.with_stabilization_threshold(threshold);
    }
    if let Some(speed) = opt_json!(json => "Rocket", "CrashSpeed"; as_f64) {
        settings = settings.with_crash_speed(positive("/Rocket/CrashSpeed", speed)?);
    }
    if let Some(tilt) = opt_json!(json => "Rocket", "MaxSurfaceTiltDeg"; as_f64) {
        settings = settings.with_max_surface_tilt(tilt.to_radians());
    }
    if let Some(friction) = opt_json!(json => "Rocket", "Friction"; as_f64) {
        settings = settings.with_friction(non_negative("/Rocket/Friction", friction)?);
    }
    let spawn = settings.spawn_position;
    let x = opt_json!(json => "Rocket", "X"; as_f64).unwrap_or(spawn.x);
    let y = opt_json!(json => "Rocket", "Y"; as_f64).unwrap_or(spawn.y);
    settings = settings.with_spawn_position(Vector2d::new(x, y));
    if let Some(angle) = opt_json!(json => "Rocket", "Angle"; as_f64) {
        settings = settings.with_spawn_angle(angle.to_radians());
    }
    Ok(settings)
}

fn parse_terrain(json: &JsonValue) -> Result<TerrainConfig> {
    let points = &json["Terrain"];
    if !points.is_null() {
        return parse_points(points).map(TerrainConfig::Points);
    }

    let mut settings = TerrainSettings::default();
    if let Some(width) = opt_json!(json => "Generator", "Width"; as_u32) {
        settings = settings.with_width(width);
    }
    if let Some(spacing) = opt_json!(json => "Generator", "Spacing"; as_u32) {
        settings = settings.with_spacing(spacing);
    }
    if let Some(mean) = opt_json!(json => "Generator", "MeanHeight"; as_f64) {
        settings = settings.with_mean_height(mean);
    }
    if let Some(spread) = opt_json!(json => "Generator", "Spread"; as_f64) {
        settings = settings.with_spread(spread);
    }
    if let Some(seed) = opt_json!(json => "Generator", "Seed"; as_u64) {
        settings = settings.with_seed(seed);
    }
    let pad = &json["Generator"]["Pad"];
    if pad.as_bool() == Some(false) {
        settings = settings.without_pad();
    } else if !pad.is_null() {
        let err = || Error::invalid_value("/Generator/Pad", "expected [start, width]");
        let start = pad[0].as_u32().ok_or_else(err)?;
        let width = pad[1].as_u32().ok_or_else(err)?;
        settings = settings.with_pad(start, width);
    }
    Ok(TerrainConfig::Generated(settings))
}

fn parse_points(points: &JsonValue) -> Result<Vec<(u32, f64)>> {
    if !points.is_array() {
        return Err(Error::invalid_value("/Terrain", "expected an array of [x, h]"));
    }
    points
        .members()
        .map(|point| -> Result<(u32, f64)> {
            let err = || Error::invalid_value("/Terrain", format!("bad point {point}"));
            let x = point[0].as_u32().ok_or_else(err)?;
            let h = point[1].as_f64().filter(|h| h.is_finite()).ok_or_else(err)?;
            Ok((x, h))
        })
        .collect()
}

fn parse_obstacles(obstacles: &JsonValue) -> Result<Vec<(f64, f64, f64, f64)>> {
    if obstacles.is_null() {
        return Ok(Vec::new());
    }
    if !obstacles.is_array() {
        return Err(Error::invalid_value(
            "/Obstacles",
            "expected an array of [x, y, w, h]",
        ));
    }
    obstacles
        .members()
        .map(|block| -> Result<(f64, f64, f64, f64)> {
            let err = || Error::invalid_value("/Obstacles", format!("bad block {block}"));
            let mut values = [0.; 4];
            for (i, value) in values.iter_mut().enumerate() {
                *value = block[i].as_f64().ok_or_else(err)?;
            }
            let [x, y, w, h] = values;
            if w <= 0. || h <= 0. {
                return Err(err());
            }
            Ok((x, y, w, h))
        })
        .collect()
}

fn parse_run(json: &JsonValue) -> Result<RunSettings> {
    let mut settings = RunSettings::default();
    if let Some(dt) = opt_json!(json => "Run", "Dt"; as_f64) {
        if !dt.is_finite() || dt <= 0. {
            return Err(Error::InvalidTimeStep(dt));
        }
        settings = settings.with_dt(dt);
    }
    if let Some(max_ticks) = opt_json!(json => "Run", "MaxTicks"; as_usize) {
        settings = settings.with_max_ticks(max_ticks);
    }
    Ok(settings)
}

fn positive(key: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0. {
        Ok(value)
    } else {
        Err(Error::invalid_value(key, format!("must be positive, got {value}")))
    }
}

fn non_negative(key: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0. {
        Ok(value)
    } else {
        Err(Error::invalid_value(key, format!("must not be negative, got {value}")))
    }
}
