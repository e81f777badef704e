//! Game configuration
//!
//! Read from an optional JSON file; anything missing falls back to the defaults.

use crate::input::DEFAULT_DEADZONE;
use crate::ship::ShipParams;
use anyhow::Context;
use macroquad::color::Color;
use macroquad::math::{vec2, Vec2};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Window settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Title bar text.
    pub title: String,
    /// Width in logical pixels.
    pub width: i32,
    /// Height in logical pixels.
    pub height: i32,
    /// MSAA samples.
    pub sample_count: i32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Lumiax".into(),
            width: 1280,
            height: 720,
            sample_count: 8,
        }
    }
}

/// Simulation rate and solver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Fixed ticks per second.
    pub tick_rate: f32,
    /// Solver iterations per step.
    pub velocity_iterations: usize,
    /// Stabilization iterations per step.
    pub position_iterations: usize,
    /// Most fixed ticks run for a single rendered frame.
    pub max_substeps: u32,
    /// World units per second squared; y points down.
    pub gravity: [f32; 2],
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            velocity_iterations: 8,
            position_iterations: 3,
            max_substeps: 8,
            gravity: [0.0, 0.0],
        }
    }
}

impl PhysicsConfig {
    /// Seconds per tick.
    pub fn step(&self) -> f32 {
        1.0 / self.tick_rate
    }

    /// Gravity as a vector.
    pub fn gravity(&self) -> Vec2 {
        vec2(self.gravity[0], self.gravity[1])
    }
}

/// Which joystick drives the second ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GamepadConfig {
    /// Read joystick input at all.
    pub enabled: bool,
    /// Axis travel ignored around rest, on a -100..100 scale.
    pub deadzone: f32,
}

impl Default for GamepadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            deadzone: DEFAULT_DEADZONE,
        }
    }
}

/// Where and how one ship starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipSpawn {
    /// RGBA, `0.0..=1.0`.
    pub color: [f32; 4],
    /// Hull width and height in world units.
    pub size: [f32; 2],
    /// Spawn point in world units.
    pub position: [f32; 2],
    /// Radians.
    #[serde(default)]
    pub angle: f32,
}

impl ShipSpawn {
    /// Hull color.
    pub fn color(&self) -> Color {
        let [r, g, b, a] = self.color;
        Color::new(r, g, b, a)
    }

    /// Hull size as a vector.
    pub fn size(&self) -> Vec2 {
        vec2(self.size[0], self.size[1])
    }

    /// Spawn point as a vector.
    pub fn position(&self) -> Vec2 {
        vec2(self.position[0], self.position[1])
    }
}

/// Everything the game reads at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Tiled JSON map to load.
    pub level: PathBuf,
    /// Window settings.
    pub window: WindowConfig,
    /// Visible world width in tiles.
    pub camera_width: f32,
    /// Simulation settings.
    pub physics: PhysicsConfig,
    /// Force law shared by every ship.
    pub ship: ShipParams,
    /// One entry per ship, in control order.
    pub ships: Vec<ShipSpawn>,
    /// Draw physics debug shapes.
    pub debug_draw: bool,
    /// Joystick settings for the second ship.
    pub gamepad: GamepadConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            level: PathBuf::from("data/levels/level01.json"),
            window: WindowConfig::default(),
            camera_width: 40.0,
            physics: PhysicsConfig::default(),
            ship: ShipParams::default(),
            ships: vec![
                ShipSpawn {
                    color: [0.0, 0.89, 0.19, 1.0],
                    size: [1.0, 1.4],
                    position: [5.0, 10.0],
                    angle: 0.0,
                },
                ShipSpawn {
                    color: [0.9, 0.16, 0.22, 1.0],
                    size: [1.0, 1.5],
                    position: [5.0, 5.0],
                    angle: 0.0,
                },
            ],
            debug_draw: false,
            gamepad: GamepadConfig::default(),
        }
    }
}

impl GameConfig {
    /// Reads and validates a JSON config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let txt = std::fs::read_to_string(path)
            .with_context(|| format!("Reading config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&txt)
            .with_context(|| format!("Parsing config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values the simulation can't run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.physics.tick_rate > 0.0) {
            anyhow::bail!("physics.tick_rate must be positive, got {}", self.physics.tick_rate);
        }
        if !(self.camera_width > 0.0) {
            anyhow::bail!("camera_width must be positive, got {}", self.camera_width);
        }
        if self.physics.max_substeps == 0 {
            anyhow::bail!("physics.max_substeps must be at least 1");
        }
        if !(0.0..100.0).contains(&self.gamepad.deadzone) {
            anyhow::bail!("gamepad.deadzone must be in 0..100, got {}", self.gamepad.deadzone);
        }
        Ok(())
    }
}
