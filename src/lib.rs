//! Tower Stack - a 3D block-stacking arcade game
//!
//! Core modules:
//! - `sim`: Pure gameplay model (stack geometry, trim math, game state machine)
//! - `physics`: Rapier world wrapper owning the falling debris
//! - `scene`: Renderable boxes and the orthographic camera
//! - `game`: Per-frame session driver tying sim, physics and scene together
//! - `renderer`: WebGPU rendering pipeline

pub mod game;
pub mod physics;
pub mod renderer;
pub mod scene;
pub mod sim;

pub use game::Game;
pub use sim::{GameEvent, GameState, Mode, TickInput};

/// Game configuration constants
pub mod consts {
    /// Height of every layer box
    pub const BOX_HEIGHT: f32 = 1.0;
    /// Width and depth of an untrimmed box
    pub const BOX_BASE_SIZE: f32 = 3.0;

    /// Slide speed of the active block, world units per millisecond
    pub const BLOCK_SPEED: f32 = 0.008;
    /// Coordinate a fresh layer starts from along its slide axis
    pub const SPAWN_COORD: f32 = -10.0;
    /// Sliding past this coordinate without an action is a miss
    pub const DROP_BOUND: f32 = 10.0;

    /// Vertical gravity applied to debris
    pub const GRAVITY: f32 = -10.0;
    /// Debris mass for a full-size footprint; shrinks with the footprint ratio
    pub const DEBRIS_BASE_MASS: f32 = 5.0;

    /// Robot precision offset is sampled uniformly from +-this bound
    pub const ROBOT_PRECISION_RANGE: f32 = 0.5;

    /// Camera eye height above the second-to-top layer
    pub const CAMERA_BASE_HEIGHT: f32 = 4.0;
    /// Horizontal extent of the orthographic view, world units
    pub const CAMERA_VIEW_WIDTH: f32 = 10.0;
    pub const CAMERA_NEAR: f32 = 1.0;
    pub const CAMERA_FAR: f32 = 100.0;
}
