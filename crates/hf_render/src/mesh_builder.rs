//! CPU-side mesh assembly.
//!
//! The scene is rebuilt every frame from simulation state into one vertex/index
//! pair that is streamed into GPU buffers. Everything in the game is drawn from
//! a handful of primitives: oriented boxes, flat discs and unlit boxes.

use glam::{Quat, Vec3};

use crate::vertex::MeshVertex;

/// Face normals and the four corner signs (in the face's local frame) for a
/// unit cube, wound counter-clockwise when viewed from outside.
const BOX_FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
    // +X
    (
        [1.0, 0.0, 0.0],
        [[1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0]],
    ),
    // -X
    (
        [-1.0, 0.0, 0.0],
        [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]],
    ),
    // +Y
    (
        [0.0, 1.0, 0.0],
        [[-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0]],
    ),
    // -Y
    (
        [0.0, -1.0, 0.0],
        [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]],
    ),
    // +Z
    (
        [0.0, 0.0, 1.0],
        [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]],
    ),
    // -Z
    (
        [0.0, 0.0, -1.0],
        [[1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0]],
    ),
];

#[derive(Debug, Default, Clone)]
pub struct MeshBuilder {
    vertices: Vec<MeshVertex>,
    indices: Vec<u32>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(boxes: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(boxes * 24),
            indices: Vec::with_capacity(boxes * 36),
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Box rotated `yaw` radians around +Y (same convention as the camera).
    pub fn push_box(&mut self, center: Vec3, half_extents: Vec3, yaw: f32, color: [f32; 4]) {
        let rotation = Quat::from_rotation_y(-yaw);
        self.push_box_inner(center, half_extents, rotation, color, true);
    }

    /// Box whose faces ignore lighting and fog.
    pub fn push_unlit_box(&mut self, center: Vec3, half_extents: Vec3, color: [f32; 4]) {
        self.push_box_inner(center, half_extents, Quat::IDENTITY, color, false);
    }

    /// Flat disc facing +Y, built as a triangle fan.
    pub fn push_disc(&mut self, center: Vec3, radius: f32, segments: u32, color: [f32; 4]) {
        let segments = segments.max(3);
        let base = self.vertices.len() as u32;
        let up = [0.0, 1.0, 0.0];
        self.vertices.push(MeshVertex {
            position: center.to_array(),
            normal: up,
            color,
        });
        for i in 0..=segments {
            let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
            let (sin, cos) = angle.sin_cos();
            self.vertices.push(MeshVertex {
                position: [center.x + cos * radius, center.y, center.z - sin * radius],
                normal: up,
                color,
            });
        }
        for i in 0..segments {
            self.indices
                .extend_from_slice(&[base, base + 1 + i, base + 2 + i]);
        }
    }

    fn push_box_inner(
        &mut self,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        color: [f32; 4],
        lit: bool,
    ) {
        for (normal, corners) in BOX_FACES.iter() {
            let base = self.vertices.len() as u32;
            let face_normal = if lit {
                (rotation * Vec3::from_array(*normal)).to_array()
            } else {
                [0.0, 0.0, 0.0]
            };
            for corner in corners {
                let local = Vec3::from_array(*corner) * half_extents;
                let world = center + rotation * local;
                self.vertices.push(MeshVertex {
                    position: world.to_array(),
                    normal: face_normal,
                    color,
                });
            }
            self.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_emits_six_quads() {
        let mut mesh = MeshBuilder::new();
        mesh.push_box(Vec3::ZERO, Vec3::ONE, 0.0, [1.0; 4]);
        assert_eq!(mesh.vertices().len(), 24);
        assert_eq!(mesh.indices().len(), 36);
    }

    #[test]
    fn indices_stay_in_bounds_across_primitives() {
        let mut mesh = MeshBuilder::new();
        mesh.push_disc(Vec3::ZERO, 50.0, 32, [0.2, 0.4, 0.2, 1.0]);
        mesh.push_box(Vec3::new(3.0, 1.0, 0.0), Vec3::splat(0.5), 1.0, [1.0; 4]);
        mesh.push_unlit_box(Vec3::ZERO, Vec3::splat(200.0), [0.5, 0.6, 0.8, 1.0]);
        let count = mesh.vertices().len() as u32;
        assert!(mesh.indices().iter().all(|&i| i < count));
        assert_eq!(mesh.indices().len() % 3, 0);
    }

    #[test]
    fn box_corners_respect_half_extents() {
        let mut mesh = MeshBuilder::new();
        mesh.push_box(Vec3::new(10.0, 2.0, -4.0), Vec3::new(1.0, 2.0, 0.5), 0.0, [1.0; 4]);
        for v in mesh.vertices() {
            assert!((v.position[0] - 10.0).abs() <= 1.0 + 1e-5);
            assert!((v.position[1] - 2.0).abs() <= 2.0 + 1e-5);
            assert!((v.position[2] + 4.0).abs() <= 0.5 + 1e-5);
        }
    }

    #[test]
    fn yawed_box_swaps_footprint_axes() {
        let mut mesh = MeshBuilder::new();
        mesh.push_box(
            Vec3::ZERO,
            Vec3::new(2.0, 1.0, 0.5),
            std::f32::consts::FRAC_PI_2,
            [1.0; 4],
        );
        let max_x = mesh
            .vertices()
            .iter()
            .map(|v| v.position[0].abs())
            .fold(0.0f32, f32::max);
        let max_z = mesh
            .vertices()
            .iter()
            .map(|v| v.position[2].abs())
            .fold(0.0f32, f32::max);
        assert!((max_x - 0.5).abs() < 1e-4);
        assert!((max_z - 2.0).abs() < 1e-4);
    }

    #[test]
    fn unlit_box_has_zero_normals() {
        let mut mesh = MeshBuilder::new();
        mesh.push_unlit_box(Vec3::ZERO, Vec3::ONE, [1.0; 4]);
        assert!(mesh.vertices().iter().all(|v| v.normal == [0.0, 0.0, 0.0]));
    }

    #[test]
    fn disc_vertices_lie_on_radius() {
        let mut mesh = MeshBuilder::new();
        mesh.push_disc(Vec3::ZERO, 5.0, 8, [1.0; 4]);
        assert_eq!(mesh.vertices().len(), 1 + 9);
        assert_eq!(mesh.indices().len(), 8 * 3);
        for v in &mesh.vertices()[1..] {
            let r = (v.position[0] * v.position[0] + v.position[2] * v.position[2]).sqrt();
            assert!((r - 5.0).abs() < 1e-4);
        }
    }

    #[test]
    fn clear_empties_buffers() {
        let mut mesh = MeshBuilder::new();
        mesh.push_box(Vec3::ZERO, Vec3::ONE, 0.0, [1.0; 4]);
        mesh.clear();
        assert!(mesh.is_empty());
        assert!(mesh.vertices().is_empty());
    }
}
