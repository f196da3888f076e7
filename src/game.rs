//! Per-frame session driver
//!
//! `Game` owns the authoritative sim state, the physics world and the
//! renderable scene, plus the handle maps tying them together (one body and
//! one scene slot per stack layer or overhang). Each frame it ticks the sim,
//! mirrors the resulting events into physics and scene, pushes the active
//! block's transform into its kinematic body, steps the physics world by the
//! elapsed time, and copies debris transforms back into the scene.
//!
//! Resting boxes are game-owned: their scene transform comes from the sim
//! and is never read from physics. Debris is physics-owned: its scene
//! transform comes from the body and the sim never looks at it again.

use glam::{Quat, Vec3};

use crate::consts::*;
use crate::physics::{BodyHandle, PhysicsWorld};
use crate::scene::{Camera, Scene, SceneBox, layer_color};
use crate::sim::{GameEvent, GameState, TickInput, tick};

pub struct Game {
    pub state: GameState,
    pub camera: Camera,
    physics: PhysicsWorld,
    scene: Scene,
    /// Body and scene slot per stack layer, parallel to `state.stack`
    stack_bodies: Vec<BodyHandle>,
    stack_slots: Vec<usize>,
    /// Body and scene slot per overhang, parallel to `state.overhangs`
    overhang_bodies: Vec<BodyHandle>,
    overhang_slots: Vec<usize>,
    events: Vec<GameEvent>,
    input: TickInput,
    last_time: f64,
}

impl Game {
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            state: GameState::new(seed),
            camera: Camera::new(),
            physics: PhysicsWorld::new(),
            scene: Scene::new(),
            stack_bodies: Vec::new(),
            stack_slots: Vec::new(),
            overhang_bodies: Vec::new(),
            overhang_slots: Vec::new(),
            events: Vec::new(),
            input: TickInput::default(),
            last_time: 0.0,
        };
        game.rebuild();
        log::info!("session created with seed {seed}");
        game
    }

    /// Queue the drop action for the next frame
    pub fn queue_action(&mut self) {
        self.input.action = true;
    }

    /// Queue a session restart for the next frame
    pub fn queue_restart(&mut self) {
        self.input.restart = true;
    }

    pub fn score(&self) -> u32 {
        self.state.score()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Events produced by the most recent frame
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Advance the session to the given timestamp (milliseconds).
    ///
    /// The very first call only records the timestamp; there is no elapsed
    /// time to scale by yet.
    pub fn frame(&mut self, now_ms: f64) {
        self.events.clear();
        if self.last_time > 0.0 {
            let dt_ms = (now_ms - self.last_time) as f32;

            let mut events = std::mem::take(&mut self.events);
            tick(&mut self.state, &self.input, dt_ms, &mut events);
            self.apply_events(&events);
            self.events = events;

            self.sync_active_layer();

            let target =
                BOX_HEIGHT * self.state.stack.len().saturating_sub(2) as f32 + CAMERA_BASE_HEIGHT;
            self.camera.rise_toward(target, dt_ms);

            self.physics.step(dt_ms / 1000.0);
            self.sync_overhangs();

            self.input = TickInput::default();
        }
        self.last_time = now_ms;
    }

    fn apply_events(&mut self, events: &[GameEvent]) {
        for event in events {
            match *event {
                GameEvent::SessionReset => {
                    log::info!("session reset");
                    self.rebuild();
                }
                GameEvent::LayerSpawned { index } => self.add_layer_mirror(index),
                GameEvent::LayerTrimmed { index } => {
                    let block = &self.state.stack[index];
                    let handle = self.stack_bodies[index];
                    self.physics.set_translation(handle, block.position);
                    self.physics.replace_shape(handle, block.half_extents());
                    if let Some(slot) = self.scene.get_mut(self.stack_slots[index]) {
                        slot.position = block.position;
                        slot.size = Vec3::new(block.width, BOX_HEIGHT, block.depth);
                    }
                }
                GameEvent::OverhangSpawned { index } => self.add_overhang_mirror(index),
                GameEvent::LayerDropped { index } => {
                    let handle = self.stack_bodies.remove(index);
                    self.physics.remove_body(handle);
                    let slot = self.stack_slots.remove(index);
                    self.scene.remove(slot);
                }
                GameEvent::Scored { score } => log::debug!("placed layer, score {score}"),
                GameEvent::Ended { .. } => log::info!("session ended at score {}", self.score()),
            }
        }
    }

    /// Attach a body and scene slot for the stack layer at `index`
    fn add_layer_mirror(&mut self, index: usize) {
        let block = &self.state.stack[index];
        let handle = self
            .physics
            .attach_resting(block.position, block.half_extents());
        let slot = self.scene.insert(SceneBox {
            position: block.position,
            rotation: Quat::IDENTITY,
            size: Vec3::new(block.width, BOX_HEIGHT, block.depth),
            color: layer_color(index),
        });
        self.stack_bodies.push(handle);
        self.stack_slots.push(slot);
    }

    /// Attach a dynamic body and scene slot for the overhang at `index`
    fn add_overhang_mirror(&mut self, index: usize) {
        let overhang = &self.state.overhangs[index];
        let half = Vec3::new(overhang.width / 2.0, BOX_HEIGHT / 2.0, overhang.depth / 2.0);
        // Mass shrinks with the footprint so small shards tumble lightly
        let mass = DEBRIS_BASE_MASS * (overhang.width / BOX_BASE_SIZE)
            * (overhang.depth / BOX_BASE_SIZE);
        let handle = self.physics.attach_debris(overhang.position, half, mass);

        let level = (overhang.position.y / BOX_HEIGHT).round() as usize;
        let slot = self.scene.insert(SceneBox {
            position: overhang.position,
            rotation: Quat::IDENTITY,
            size: Vec3::new(overhang.width, BOX_HEIGHT, overhang.depth),
            color: layer_color(level + 1),
        });
        self.overhang_bodies.push(handle);
        self.overhang_slots.push(slot);
    }

    /// Keep the sliding block's kinematic body and scene slot in lock-step
    /// with the authoritative position
    fn sync_active_layer(&mut self) {
        if self.state.ended {
            return;
        }
        let top = self.state.stack.len() - 1;
        if self.state.stack[top].direction.is_none() {
            return;
        }
        let position = self.state.stack[top].position;
        self.physics.set_translation(self.stack_bodies[top], position);
        if let Some(slot) = self.scene.get_mut(self.stack_slots[top]) {
            slot.position = position;
        }
    }

    /// Copy debris transforms from their physics bodies into the scene.
    /// One-directional; resting boxes are never synced from physics.
    fn sync_overhangs(&mut self) {
        for (handle, slot) in self.overhang_bodies.iter().zip(&self.overhang_slots) {
            if let Some((position, rotation)) = self.physics.body_transform(*handle)
                && let Some(value) = self.scene.get_mut(*slot)
            {
                value.position = position;
                value.rotation = rotation;
            }
        }
    }

    /// Tear down and recreate the physics and scene mirrors from the sim
    /// state, used at construction and on session reset
    fn rebuild(&mut self) {
        self.physics.clear();
        self.scene.clear();
        self.stack_bodies.clear();
        self.stack_slots.clear();
        self.overhang_bodies.clear();
        self.overhang_slots.clear();
        self.camera.reset();

        for index in 0..self.state.stack.len() {
            self.add_layer_mirror(index);
        }
        for index in 0..self.state.overhangs.len() {
            self.add_overhang_mirror(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Mode;

    const FRAME_MS: f64 = 16.0;

    /// Drive the game with a synthetic clock; returns the final timestamp
    fn run_frames(game: &mut Game, start: f64, count: usize) -> f64 {
        let mut now = start;
        for _ in 0..count {
            now += FRAME_MS;
            game.frame(now);
        }
        now
    }

    #[test]
    fn test_first_frame_only_records_the_clock() {
        let mut game = Game::new(1);
        let before = game.state.stack[1].position;
        game.frame(1000.0);
        assert_eq!(game.state.stack[1].position, before);
    }

    #[test]
    fn test_mirrors_track_the_stack_and_overhangs() {
        let mut game = Game::new(11);
        assert_eq!(game.scene.len(), 2);
        assert_eq!(game.physics.body_count(), 2);

        run_frames(&mut game, 0.0, 4000);

        let layers = game.state.stack.len();
        let debris = game.state.overhangs.len();
        assert!(game.score() >= 1, "autopilot should have placed layers");
        assert_eq!(game.scene.len(), layers + debris);
        assert_eq!(game.physics.body_count(), layers + debris);
        assert_eq!(game.stack_bodies.len(), layers);
        assert_eq!(game.overhang_bodies.len(), debris);

        // Resting scene boxes mirror the authoritative model exactly
        for (index, block) in game.state.stack.iter().enumerate() {
            let slot = game.scene.get(game.stack_slots[index]).unwrap();
            assert_eq!(slot.position, block.position);
        }
    }

    #[test]
    fn test_missed_block_becomes_falling_debris() {
        let mut game = Game::new(5);
        game.queue_action();
        game.frame(16.0);
        game.frame(32.0);
        assert_eq!(game.state.mode, Mode::Manual);

        // Never act again: the block slides past the bound and the run ends
        let mut now = 32.0;
        while !game.state.ended {
            now += FRAME_MS;
            game.frame(now);
            assert!(now < 120_000.0, "session never ended");
        }
        assert_eq!(game.state.overhangs.len(), 1);
        assert_eq!(game.stack_bodies.len(), game.state.stack.len());

        let slot = game.overhang_slots[0];
        let spawn_y = game.scene.get(slot).unwrap().position.y;
        run_frames(&mut game, now, 120);
        let fallen = game.scene.get(slot).unwrap();
        assert!(
            fallen.position.y < spawn_y,
            "debris transform should follow the physics body down"
        );
    }

    #[test]
    fn test_restart_rebuilds_the_world() {
        let mut game = Game::new(21);
        let now = run_frames(&mut game, 0.0, 4000);
        assert!(game.state.overhangs.len() + game.state.stack.len() > 2);

        game.queue_restart();
        game.frame(now + FRAME_MS);

        assert_eq!(game.score(), 0);
        assert_eq!(game.state.stack.len(), 2);
        assert_eq!(game.state.overhangs.len(), 0);
        assert_eq!(game.scene.len(), 2);
        assert_eq!(game.physics.body_count(), 2);
        assert_eq!(game.camera.eye.y, CAMERA_BASE_HEIGHT);
    }

    #[test]
    fn test_camera_climbs_with_the_tower() {
        let mut game = Game::new(31);
        run_frames(&mut game, 0.0, 6000);
        assert!(game.score() >= 2);
        assert!(game.camera.eye.y > CAMERA_BASE_HEIGHT);
    }
}
