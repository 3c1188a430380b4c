//! Unit UV sphere for the globes.
//!
//! Texture space is equirectangular: u runs west to east with the prime
//! meridian at u = 0.5, v runs north (0) to south (1). Geometry follows the
//! y-down scene convention, so the north pole is at y = -1, and the
//! meridian faces the camera at z = -1. The seam column is duplicated so
//! u can reach 1.0 without wrapping.

use std::f32::consts::{PI, TAU};

use crate::vertex::GlobeVertex;

/// Segments around the equator; rings pole to pole are half of this.
pub const DEFAULT_DIVISIONS: u32 = 64;

pub struct SphereMesh {
    pub vertices: Vec<GlobeVertex>,
    pub indices: Vec<u32>,
}

pub fn build_uv_sphere(divisions: u32) -> SphereMesh {
    let segments = divisions.max(4);
    let rings = (segments / 2).max(2);
    let row = segments + 1;

    let mut vertices = Vec::with_capacity((row * (rings + 1)) as usize);
    for i in 0..=rings {
        let v = i as f32 / rings as f32;
        let theta = v * PI;
        let (sin_t, cos_t) = theta.sin_cos();
        for j in 0..=segments {
            let u = j as f32 / segments as f32;
            let phi = (u - 0.5) * TAU;
            let (sin_p, cos_p) = phi.sin_cos();
            vertices.push(GlobeVertex {
                position: [sin_t * sin_p, -cos_t, -sin_t * cos_p],
                tex_coords: [u, v],
                tangent: [cos_p, 0.0, sin_p],
            });
        }
    }

    let mut indices = Vec::with_capacity((rings * segments * 6) as usize);
    for i in 0..rings {
        for j in 0..segments {
            let a = i * row + j;
            let b = a + row;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }

    SphereMesh { vertices, indices }
}
