//! Rigid-body world for falling debris
//!
//! Thin wrapper around Rapier. The resting stack is mirrored here as
//! kinematic bodies so debris can collide with the tower, but their
//! transforms are pushed in from the game model every frame and never read
//! back. Debris bodies are dynamic; once one is attached, the physics world
//! is the sole owner of its transform.

use glam::{Quat, Vec3};
use rapier3d::prelude as rapier;
use rapier::nalgebra::Vector3;

use crate::consts::GRAVITY;

pub type BodyHandle = rapier::RigidBodyHandle;

pub struct PhysicsWorld {
    gravity: Vector3<f32>,
    integration_parameters: rapier::IntegrationParameters,
    physics_pipeline: rapier::PhysicsPipeline,
    island_manager: rapier::IslandManager,
    broad_phase: rapier::DefaultBroadPhase,
    narrow_phase: rapier::NarrowPhase,
    bodies: rapier::RigidBodySet,
    colliders: rapier::ColliderSet,
    impulse_joints: rapier::ImpulseJointSet,
    multibody_joints: rapier::MultibodyJointSet,
    ccd_solver: rapier::CCDSolver,
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self {
            gravity: Vector3::new(0.0, GRAVITY, 0.0),
            integration_parameters: rapier::IntegrationParameters::default(),
            physics_pipeline: rapier::PhysicsPipeline::new(),
            island_manager: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
        }
    }

    /// Register a resting stack box. Kinematic: debris collides with it, the
    /// simulation never moves it.
    pub fn attach_resting(&mut self, position: Vec3, half_extents: Vec3) -> BodyHandle {
        let body = rapier::RigidBodyBuilder::kinematic_position_based()
            .translation(Vector3::new(position.x, position.y, position.z));
        let handle = self.bodies.insert(body);
        let collider =
            rapier::ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z);
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    /// Register a debris box with an explicit mass; gravity owns it from here
    pub fn attach_debris(&mut self, position: Vec3, half_extents: Vec3, mass: f32) -> BodyHandle {
        let body = rapier::RigidBodyBuilder::dynamic().translation(Vector3::new(
            position.x, position.y, position.z,
        ));
        let handle = self.bodies.insert(body);
        let collider =
            rapier::ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
                .mass(mass);
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    /// Move a kinematic body in lock-step with the game model
    pub fn set_translation(&mut self, handle: BodyHandle, position: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_next_kinematic_translation(Vector3::new(position.x, position.y, position.z));
        }
    }

    /// Swap a body's collision shape after a trim.
    ///
    /// Shapes are immutable once attached; resizing is always detach-old /
    /// attach-new, never an in-place rescale.
    pub fn replace_shape(&mut self, handle: BodyHandle, half_extents: Vec3) {
        let attached: Vec<rapier::ColliderHandle> = self
            .bodies
            .get(handle)
            .map(|body| body.colliders().to_vec())
            .unwrap_or_default();
        for collider in attached {
            self.colliders
                .remove(collider, &mut self.island_manager, &mut self.bodies, false);
        }
        let collider =
            rapier::ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z);
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
    }

    pub fn remove_body(&mut self, handle: BodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Advance the whole world; kinematic bodies step to their queued targets
    pub fn step(&mut self, dt_seconds: f32) {
        if dt_seconds <= 0.0 {
            return;
        }
        self.integration_parameters.dt = dt_seconds;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }

    /// Current position and orientation of a body, physics -> render only
    pub fn body_transform(&self, handle: BodyHandle) -> Option<(Vec3, Quat)> {
        self.bodies.get(handle).map(|body| {
            let translation = body.translation();
            let rotation = body.rotation();
            (
                Vec3::new(translation.x, translation.y, translation.z),
                Quat::from_xyzw(rotation.i, rotation.j, rotation.k, rotation.w),
            )
        })
    }

    /// Drop every body, for a session reset
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: f32 = 1.0 / 60.0;

    #[test]
    fn test_debris_falls_under_gravity() {
        let mut world = PhysicsWorld::new();
        let handle = world.attach_debris(Vec3::new(2.0, 5.0, 0.0), Vec3::new(0.5, 0.5, 1.5), 5.0);

        for _ in 0..60 {
            world.step(STEP);
        }

        let (position, _) = world.body_transform(handle).unwrap();
        assert!(position.y < 4.0, "debris should have fallen, y={}", position.y);
        assert!((position.x - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_kinematic_body_holds_its_set_position() {
        let mut world = PhysicsWorld::new();
        let handle = world.attach_resting(Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.5, 0.5, 1.5));

        world.set_translation(handle, Vec3::new(0.25, 1.0, 0.0));
        for _ in 0..30 {
            world.step(STEP);
        }

        let (position, _) = world.body_transform(handle).unwrap();
        assert!((position.x - 0.25).abs() < 1e-4);
        assert!((position.y - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_replace_shape_keeps_the_body() {
        let mut world = PhysicsWorld::new();
        let handle = world.attach_resting(Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.5, 0.5, 1.5));

        world.replace_shape(handle, Vec3::new(1.0, 0.5, 1.5));
        world.step(STEP);

        assert!(world.body_transform(handle).is_some());
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut world = PhysicsWorld::new();
        let a = world.attach_resting(Vec3::ZERO, Vec3::splat(0.5));
        let _b = world.attach_debris(Vec3::new(0.0, 3.0, 0.0), Vec3::splat(0.5), 1.0);

        world.remove_body(a);
        assert_eq!(world.body_count(), 1);
        assert!(world.body_transform(a).is_none());

        world.clear();
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_zero_dt_step_is_a_no_op() {
        let mut world = PhysicsWorld::new();
        let handle = world.attach_debris(Vec3::new(0.0, 5.0, 0.0), Vec3::splat(0.5), 1.0);

        world.step(0.0);

        let (position, _) = world.body_transform(handle).unwrap();
        assert_eq!(position.y, 5.0);
    }
}
