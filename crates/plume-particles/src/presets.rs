//! Built-in demo presets
//!
//! Values mirror the fountain, fire and smoke demos the engine was built for.

use crate::config::{
    CameraParams, DemoConfig, EmitterShape, SimulationParams, SpriteParams, VelocityCone,
};
use plume_core::{Color, PlumeError, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Fountain,
    Fire,
    Smoke,
}

impl Preset {
    pub fn all() -> [Preset; 3] {
        [Preset::Fountain, Preset::Fire, Preset::Smoke]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Fountain => "fountain",
            Preset::Fire => "fire",
            Preset::Smoke => "smoke",
        }
    }

    pub fn config(&self) -> DemoConfig {
        match self {
            Preset::Fountain => fountain(),
            Preset::Fire => fire(),
            Preset::Smoke => smoke(),
        }
    }
}

impl std::str::FromStr for Preset {
    type Err = PlumeError;
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Preset::all()
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| PlumeError::UnknownPreset {
                name: name.to_string(),
                allowed: Preset::all().iter().map(|p| p.name().to_string()).collect(),
            })
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A water fountain: narrow upward cone falling back under gravity
pub fn fountain() -> DemoConfig {
    DemoConfig {
        name: "fountain".to_string(),
        ..DemoConfig::default()
    }
}

/// A wall of fire: particles rise straight up from a horizontal line
pub fn fire() -> DemoConfig {
    DemoConfig {
        name: "fire".to_string(),
        seed: 0xF12E,
        emitter: EmitterShape::Line {
            origin: Vec3::ZERO,
            direction: Vec3::RIGHT,
            half_length: 2.0,
        },
        velocity: VelocityCone {
            axis: Vec3::UP,
            half_angle_deg: 0.0,
            speed_min: 0.1,
            speed_max: 0.5,
        },
        simulation: SimulationParams {
            particle_count: 4000,
            rate: 0.001,
            lifetime: 4.0,
            acceleration: Vec3::new(0.0, 0.1, 0.0),
        },
        sprite: SpriteParams {
            size_start: 0.35,
            size_end: 0.1,
            tint: Color::new(1.0, 0.45, 0.1, 0.8),
            texture: Some("assets/fire.png".to_string()),
            additive: false,
            clear_color: Color::new(0.02, 0.02, 0.02, 1.0),
        },
        camera: CameraParams {
            target: Vec3::new(0.0, 0.6, 0.0),
            distance: 6.0,
            ..CameraParams::default()
        },
    }
}

/// A smoke plume: wide slow cone with sprites that grow as they age
pub fn smoke() -> DemoConfig {
    DemoConfig {
        name: "smoke".to_string(),
        seed: 0x5A0C,
        emitter: EmitterShape::Point { origin: Vec3::ZERO },
        velocity: VelocityCone {
            axis: Vec3::UP,
            half_angle_deg: 120.0,
            speed_min: 0.1,
            speed_max: 0.2,
        },
        simulation: SimulationParams {
            particle_count: 1000,
            rate: 0.01,
            lifetime: 6.0,
            acceleration: Vec3::new(0.0, 0.1, 0.0),
        },
        sprite: SpriteParams {
            size_start: 0.05,
            size_end: 1.0,
            tint: Color::new(0.8, 0.8, 0.8, 0.35),
            texture: Some("assets/smoke.png".to_string()),
            additive: false,
            clear_color: Color::new(0.1, 0.1, 0.1, 1.0),
        },
        camera: CameraParams {
            target: Vec3::new(0.0, 0.6, 0.0),
            distance: 3.5,
            ..CameraParams::default()
        },
    }
}
