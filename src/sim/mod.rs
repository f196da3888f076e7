//! Pure gameplay model
//!
//! All stacking logic lives here. This module knows nothing about rendering
//! or the physics engine:
//! - The stack of boxes is the single source of truth for resting geometry
//! - Trim/overlap arithmetic is exact, not simulated
//! - Debris is only *described* here; its motion belongs to the physics world
//! - Seeded RNG only (robot precision sampling)

pub mod block;
pub mod state;
pub mod tick;

pub use block::{Axis, Block};
pub use state::{GameEvent, GameState, Mode, Overhang};
pub use tick::{TickInput, tick};
