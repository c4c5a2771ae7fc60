//! Demo configuration: emitter shape, velocity cone, simulation and sprite parameters
//!
//! Every section has compiled-in defaults (the fountain demo), so a TOML file
//! only needs to name the fields it overrides.

use crate::rand::ParticleRng;
use plume_core::{Color, PlumeError, Result, Vec3};
use serde::{Deserialize, Serialize};

/// Where particles start (and respawn)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum EmitterShape {
    /// Every particle starts at `origin`
    Point { origin: Vec3 },
    /// Particles are spread uniformly along `origin ± direction * half_length`
    Line {
        origin: Vec3,
        direction: Vec3,
        half_length: f32,
    },
}

impl EmitterShape {
    pub fn origin(&self) -> Vec3 {
        match *self {
            EmitterShape::Point { origin } | EmitterShape::Line { origin, .. } => origin,
        }
    }

    /// Sample a start position for one particle
    pub fn sample(&self, rng: &mut ParticleRng) -> Vec3 {
        match *self {
            EmitterShape::Point { origin } => origin,
            EmitterShape::Line {
                origin,
                direction,
                half_length,
            } => origin + direction.normalized() * rng.range(-half_length, half_length),
        }
    }
}

impl Default for EmitterShape {
    fn default() -> Self {
        EmitterShape::Point {
            origin: Vec3::ZERO,
        }
    }
}

/// Initial velocity distribution: a cone around `axis` with a speed range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityCone {
    pub axis: Vec3,
    /// Half-angle of the emission cone in degrees, in [0, 180]
    pub half_angle_deg: f32,
    pub speed_min: f32,
    pub speed_max: f32,
}

impl Default for VelocityCone {
    fn default() -> Self {
        Self {
            axis: Vec3::UP,
            half_angle_deg: 30.0,
            speed_min: 1.25,
            speed_max: 1.5,
        }
    }
}

impl VelocityCone {
    pub fn half_angle_rad(&self) -> f32 {
        self.half_angle_deg.to_radians()
    }

    /// Sample one initial velocity
    pub fn sample(&self, rng: &mut ParticleRng) -> Vec3 {
        let dir = rng.cone_direction(self.axis, self.half_angle_rad());
        dir * rng.range(self.speed_min, self.speed_max)
    }
}

/// Simulation parameters. `particle_count` is fixed for the life of a particle
/// store; the rest may change between frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub particle_count: u32,
    /// Seconds between consecutive particle spawn times
    pub rate: f32,
    /// Seconds a particle lives before it respawns
    pub lifetime: f32,
    pub acceleration: Vec3,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            particle_count: 4000,
            rate: 0.001,
            lifetime: 3.5,
            acceleration: Vec3::new(0.0, -0.6, 0.0),
        }
    }
}

/// Cosmetic sprite parameters for the render pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteParams {
    /// World-space sprite size at spawn
    pub size_start: f32,
    /// World-space sprite size at the end of the lifetime
    pub size_end: f32,
    pub tint: Color,
    /// Sprite image path; a white sprite is used when absent or unreadable
    pub texture: Option<String>,
    pub additive: bool,
    pub clear_color: Color,
}

impl Default for SpriteParams {
    fn default() -> Self {
        Self {
            size_start: 0.08,
            size_end: 0.08,
            tint: Color::new(0.55, 0.75, 1.0, 1.0),
            texture: None,
            additive: false,
            clear_color: Color::new(0.1, 0.1, 0.1, 1.0),
        }
    }
}

/// Initial orbit camera placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraParams {
    pub target: Vec3,
    pub distance: f32,
    pub yaw_deg: f32,
    pub pitch_deg: f32,
    pub fov_deg: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            target: Vec3::new(0.0, 0.8, 0.0),
            distance: 5.0,
            yaw_deg: 0.0,
            pitch_deg: 10.0,
            fov_deg: 45.0,
        }
    }
}

/// Full configuration for one demo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub name: String,
    pub seed: u32,
    pub emitter: EmitterShape,
    pub velocity: VelocityCone,
    pub simulation: SimulationParams,
    pub sprite: SpriteParams,
    pub camera: CameraParams,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            name: "fountain".to_string(),
            seed: 0x5EED_u32,
            emitter: EmitterShape::default(),
            velocity: VelocityCone::default(),
            simulation: SimulationParams::default(),
            sprite: SpriteParams::default(),
            camera: CameraParams::default(),
        }
    }
}

impl DemoConfig {
    /// Layer a partial TOML document over this config. Tables merge key by
    /// key, so an override file only names what it changes.
    pub fn merged_with(&self, overrides: &str) -> Result<Self> {
        let toml::Value::Table(mut base) = toml::Value::try_from(self)? else {
            return Err(PlumeError::InvalidConfig("config did not serialize to a table".into()));
        };
        let patch: toml::Table = toml::from_str(overrides)?;
        merge_tables(&mut base, patch);

        let config: DemoConfig = toml::Value::Table(base).try_into()?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject parameter combinations the initializer cannot honour
    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        if sim.particle_count == 0 {
            return Err(PlumeError::InvalidConfig(
                "simulation.particle_count must be at least 1".into(),
            ));
        }
        if !(sim.rate >= 0.0) {
            return Err(PlumeError::InvalidConfig(format!(
                "simulation.rate must be non-negative, got {}",
                sim.rate
            )));
        }
        if !(sim.lifetime > 0.0) {
            return Err(PlumeError::InvalidConfig(format!(
                "simulation.lifetime must be positive, got {}",
                sim.lifetime
            )));
        }
        let vel = &self.velocity;
        if !(0.0..=180.0).contains(&vel.half_angle_deg) {
            return Err(PlumeError::InvalidConfig(format!(
                "velocity.half_angle_deg must be between 0 and 180, got {}",
                vel.half_angle_deg
            )));
        }
        if vel.speed_min > vel.speed_max || vel.speed_min < 0.0 {
            return Err(PlumeError::InvalidConfig(format!(
                "velocity speed range [{}, {}] is invalid",
                vel.speed_min, vel.speed_max
            )));
        }
        if vel.axis.length() <= f32::EPSILON {
            return Err(PlumeError::InvalidConfig(
                "velocity.axis must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

fn merge_tables(base: &mut toml::Table, patch: toml::Table) {
    for (key, value) in patch {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(inner)) => {
                merge_tables(existing, inner)
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

impl std::str::FromStr for DemoConfig {
    type Err = PlumeError;
    fn from_str(serialized: &str) -> Result<Self> {
        let config: DemoConfig = toml::from_str(serialized)?;
        config.validate()?;
        Ok(config)
    }
}
