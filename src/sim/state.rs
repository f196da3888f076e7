//! Game session state
//!
//! The stack is the authoritative model: scoring and overlap logic read box
//! positions from here, never from the physics world. Overhangs are recorded
//! with their creation-time geometry only; from then on the physics body owns
//! their transform and game logic never reads them again.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::block::{Axis, Block};
use crate::consts::*;

/// Who is steering the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Attract mode: the robot drops blocks with a randomized precision offset
    Autopilot,
    /// A player is timing the drops
    Manual,
}

/// Debris cut away from the stack, owned by the physics world from creation on
#[derive(Debug, Clone, PartialEq)]
pub struct Overhang {
    /// Center at creation time
    pub position: Vec3,
    pub width: f32,
    pub depth: f32,
}

/// State changes a single tick produced, consumed by the session driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A fresh layer was appended to the stack
    LayerSpawned { index: usize },
    /// The layer at `index` was trimmed to its overlap
    LayerTrimmed { index: usize },
    /// `overhangs[index]` was created and needs a dynamic body
    OverhangSpawned { index: usize },
    /// The layer at `index` missed completely and left the stack
    LayerDropped { index: usize },
    /// A successful placement happened
    Scored { score: u32 },
    /// The session ended; results are suppressed during autopilot
    Ended { show_results: bool },
    /// Stack and overhangs were cleared and the base layers re-added
    SessionReset,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub mode: Mode,
    pub ended: bool,
    /// Resting boxes, index = layer number, 0 = foundation
    pub stack: Vec<Block>,
    /// Debris records; append-only for the session
    pub overhangs: Vec<Overhang>,
    /// Signed offset the robot accepts from perfect placement
    pub robot_precision: f32,
    rng: Pcg32,
}

impl GameState {
    /// Create the attract-mode session shown on load
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let robot_precision = sample_precision(&mut rng);

        let mut state = Self {
            mode: Mode::Autopilot,
            ended: false,
            stack: Vec::new(),
            overhangs: Vec::new(),
            robot_precision,
            rng,
        };
        state.spawn_base();
        state
    }

    /// Start a fresh player-controlled session
    pub fn restart(&mut self) {
        self.mode = Mode::Manual;
        self.ended = false;
        self.stack.clear();
        self.overhangs.clear();
        self.spawn_base();
    }

    /// Foundation plus the first sliding layer
    fn spawn_base(&mut self) {
        self.add_layer(0.0, 0.0, BOX_BASE_SIZE, BOX_BASE_SIZE, None);
        self.add_layer(SPAWN_COORD, 0.0, BOX_BASE_SIZE, BOX_BASE_SIZE, Some(Axis::X));
    }

    /// Append a resting layer one box-height above the current top
    pub fn add_layer(&mut self, x: f32, z: f32, width: f32, depth: f32, direction: Option<Axis>) {
        let y = BOX_HEIGHT * self.stack.len() as f32;
        self.stack.push(Block::new(x, y, z, width, depth, direction));
    }

    /// Record debris at the current top layer's height
    pub fn add_overhang(&mut self, x: f32, z: f32, width: f32, depth: f32) {
        let y = BOX_HEIGHT * (self.stack.len() as f32 - 1.0);
        self.overhangs.push(Overhang {
            position: Vec3::new(x, y, z),
            width,
            depth,
        });
    }

    /// Successful placements so far; neither the foundation nor the block
    /// still sliding counts. Once the session has ended there is no active
    /// block left on the stack.
    pub fn score(&self) -> u32 {
        let resting = if self.ended { 1 } else { 2 };
        self.stack.len().saturating_sub(resting) as u32
    }

    /// Draw a new precision offset after an autopilot placement
    pub fn resample_robot_precision(&mut self) {
        self.robot_precision = sample_precision(&mut self.rng);
    }
}

fn sample_precision(rng: &mut Pcg32) -> f32 {
    rng.random::<f32>() * 2.0 * ROBOT_PRECISION_RANGE - ROBOT_PRECISION_RANGE
}
