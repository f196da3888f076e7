//! Box tessellation
//!
//! Scene boxes are tessellated on the CPU every frame, transformed into
//! world space by their position and orientation. Normals are rotated with
//! the box so debris stays lit correctly while tumbling.

use glam::{Quat, Vec3};

use super::vertex::Vertex;

/// Unit-cube faces: outward normal plus four corners
const FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
    (
        [1.0, 0.0, 0.0],
        [
            [1.0, -1.0, -1.0],
            [1.0, 1.0, -1.0],
            [1.0, 1.0, 1.0],
            [1.0, -1.0, 1.0],
        ],
    ),
    (
        [-1.0, 0.0, 0.0],
        [
            [-1.0, -1.0, -1.0],
            [-1.0, -1.0, 1.0],
            [-1.0, 1.0, 1.0],
            [-1.0, 1.0, -1.0],
        ],
    ),
    (
        [0.0, 1.0, 0.0],
        [
            [-1.0, 1.0, -1.0],
            [-1.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
            [1.0, 1.0, -1.0],
        ],
    ),
    (
        [0.0, -1.0, 0.0],
        [
            [-1.0, -1.0, -1.0],
            [1.0, -1.0, -1.0],
            [1.0, -1.0, 1.0],
            [-1.0, -1.0, 1.0],
        ],
    ),
    (
        [0.0, 0.0, 1.0],
        [
            [-1.0, -1.0, 1.0],
            [1.0, -1.0, 1.0],
            [1.0, 1.0, 1.0],
            [-1.0, 1.0, 1.0],
        ],
    ),
    (
        [0.0, 0.0, -1.0],
        [
            [-1.0, -1.0, -1.0],
            [-1.0, 1.0, -1.0],
            [1.0, 1.0, -1.0],
            [1.0, -1.0, -1.0],
        ],
    ),
];

/// Append the 36 vertices of an oriented box
pub fn box_mesh(out: &mut Vec<Vertex>, position: Vec3, rotation: Quat, size: Vec3, color: [f32; 4]) {
    let half = size / 2.0;
    for (normal, corners) in FACES {
        let n = rotation * Vec3::from(normal);
        let quad = corners.map(|corner| position + rotation * (Vec3::from(corner) * half));

        out.push(Vertex::new(quad[0], n, color));
        out.push(Vertex::new(quad[1], n, color));
        out.push(Vertex::new(quad[2], n, color));

        out.push(Vertex::new(quad[0], n, color));
        out.push(Vertex::new(quad[2], n, color));
        out.push(Vertex::new(quad[3], n, color));
    }
}
