//! Render-ready copies of the shared vertex buffer.

use macroquad::prelude::*;

use crate::vertex::{TileVertex, QUAD_VERTICES};

/// Largest vertex count per mesh. Meshes use `u16` indices, and a whole
/// number of quads keeps every triangle inside one chunk.
pub const MAX_MESH_VERTICES: usize = (u16::MAX as usize + 1) / QUAD_VERTICES * QUAD_VERTICES;

/// Splits `vertices` into non-indexed triangle-list meshes.
pub fn build_meshes(
    vertices: &[TileVertex],
    texture_size: Vec2,
    texture: Option<Texture2D>,
) -> Vec<Mesh> {
    vertices
        .chunks(MAX_MESH_VERTICES)
        .map(|chunk| Mesh {
            vertices: chunk
                .iter()
                .map(|v| v.to_mesh_vertex(texture_size))
                .collect(),
            indices: (0..chunk.len() as u16).collect(),
            texture: texture.clone(),
        })
        .collect()
}

/// One `draw_mesh` call per mesh.
pub fn draw_meshes(meshes: &[Mesh]) {
    for mesh in meshes {
        draw_mesh(mesh);
    }
}
