//! Renderable scene and camera
//!
//! Each box in the scene mirrors either a resting stack layer (transform
//! pushed in from the game model) or a piece of debris (transform copied
//! from its physics body). Slots keep stable ids when a missed layer is
//! removed mid-session.

use glam::{Mat4, Quat, Vec3};

use crate::consts::*;

/// One renderable box
#[derive(Debug, Clone)]
pub struct SceneBox {
    pub position: Vec3,
    pub rotation: Quat,
    pub size: Vec3,
    pub color: [f32; 4],
}

/// Slot-addressed box list
#[derive(Debug, Default)]
pub struct Scene {
    slots: Vec<Option<SceneBox>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a box, reusing the first free slot
    pub fn insert(&mut self, value: SceneBox) -> usize {
        if let Some(id) = self.slots.iter().position(Option::is_none) {
            self.slots[id] = Some(value);
            id
        } else {
            self.slots.push(Some(value));
            self.slots.len() - 1
        }
    }

    pub fn remove(&mut self, id: usize) {
        self.slots[id] = None;
    }

    pub fn get(&self, id: usize) -> Option<&SceneBox> {
        self.slots.get(id).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: usize) -> Option<&mut SceneBox> {
        self.slots.get_mut(id).and_then(Option::as_mut)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneBox> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Color ramp climbing the tower: one hue step per level
pub fn layer_color(level: usize) -> [f32; 4] {
    let hue = (60.0 + level as f32 * 10.0) % 360.0;
    let [r, g, b] = hsl_to_rgb(hue, 0.45, 0.5);
    [r, g, b, 1.0]
}

fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    [r + m, g + m, b + m]
}

/// Orthographic camera looking down at the tower from a fixed diagonal.
///
/// Only the eye height changes during play; the view direction set at
/// construction is kept for the whole session.
#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    direction: Vec3,
}

impl Camera {
    pub fn new() -> Self {
        let eye = Vec3::new(4.0, CAMERA_BASE_HEIGHT, 4.0);
        Self {
            eye,
            direction: (-eye).normalize(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Climb toward the target height at the block slide speed. The gate
    /// stops further increments once the target is reached.
    pub fn rise_toward(&mut self, target_y: f32, dt_ms: f32) {
        if self.eye.y < target_y {
            self.eye.y += BLOCK_SPEED * dt_ms;
        }
    }

    /// Combined view-projection matrix for the given viewport aspect ratio
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let width = CAMERA_VIEW_WIDTH;
        let height = width / aspect;
        let projection = Mat4::orthographic_rh(
            -width / 2.0,
            width / 2.0,
            -height / 2.0,
            height / 2.0,
            CAMERA_NEAR,
            CAMERA_FAR,
        );
        let view = Mat4::look_to_rh(self.eye, self.direction, Vec3::Y);
        projection * view
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(y: f32) -> SceneBox {
        SceneBox {
            position: Vec3::new(0.0, y, 0.0),
            rotation: Quat::IDENTITY,
            size: Vec3::new(3.0, 1.0, 3.0),
            color: layer_color(0),
        }
    }

    #[test]
    fn test_slots_are_reused_after_removal() {
        let mut scene = Scene::new();
        let a = scene.insert(boxed(0.0));
        let b = scene.insert(boxed(1.0));
        scene.remove(a);
        assert_eq!(scene.len(), 1);

        let c = scene.insert(boxed(2.0));
        assert_eq!(c, a);
        assert_eq!(scene.len(), 2);
        assert!(scene.get(b).is_some());
    }

    #[test]
    fn test_layer_colors_step_around_the_wheel() {
        let a = layer_color(0);
        let b = layer_color(1);
        assert_ne!(a, b);
        for channel in layer_color(40) {
            assert!((0.0..=1.0).contains(&channel));
        }
    }

    #[test]
    fn test_camera_rise_is_gated_by_the_target() {
        let mut camera = Camera::new();
        camera.rise_toward(CAMERA_BASE_HEIGHT, 100.0);
        assert_eq!(camera.eye.y, CAMERA_BASE_HEIGHT);

        camera.rise_toward(CAMERA_BASE_HEIGHT + 1.0, 100.0);
        assert!(camera.eye.y > CAMERA_BASE_HEIGHT);

        camera.reset();
        assert_eq!(camera.eye.y, CAMERA_BASE_HEIGHT);
    }

    #[test]
    fn test_view_proj_is_finite() {
        let camera = Camera::new();
        let matrix = camera.view_proj(16.0 / 9.0);
        assert!(matrix.to_cols_array().iter().all(|v| v.is_finite()));
    }
}
