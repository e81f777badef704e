#![warn(missing_docs)]

//! Two-ship thruster arcade game over Tiled JSON levels, on macroquad and rapier.

mod error;
/// Game settings file.
pub mod config;
/// The running simulation.
pub mod game;
/// Gamepad axes mapped onto ship controls.
pub mod input;
/// Level model: tile chunks, rect objects, animation paths, tilesets.
pub mod level;
mod loader {
    pub mod json_loader;
}
/// Rigid-body world and its debug draw bridge.
pub mod physics;
mod render {
    pub mod level_renderer;
    pub mod ship_renderer;
}
/// Thruster ships.
pub mod ship;
mod spatial {
    mod tile_code;
    pub use tile_code::*;
}
/// Fixed-step accumulator.
pub mod timestep;

pub use config::GameConfig;
pub use error::{CollisionPass, DrawError, LevelError, MapError};
pub use game::Game;
pub use input::{GamepadAxes, Gamepads};
pub use level::{AnimationPath, Chunk, IdWrapper, Level, Rect, Tileset, TILE_PIXELS};
pub use loader::json_loader::load_level;
pub use render::level_renderer::{build_tile_quads, LevelRenderer, TileQuad};
pub use render::ship_renderer::ShipRenderer;
pub use ship::{Direction, Ship, ShipControls, ShipParams};
pub use spatial::{TileId, TileTransform};
pub use timestep::FixedTimestep;
