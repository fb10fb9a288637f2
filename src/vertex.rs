use macroquad::prelude::*;

/// One corner of a tessellated triangle.
///
/// `tex_coords` are in atlas pixels, not normalized; the render pass divides
/// by the texture size when it builds meshes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileVertex {
    /// Scene-space position.
    pub position: Vec2,
    /// Atlas pixel coordinates.
    pub tex_coords: Vec2,
    /// Tint multiplied with the texture.
    pub color: Color,
}

impl Default for TileVertex {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            tex_coords: Vec2::ZERO,
            color: WHITE,
        }
    }
}

impl TileVertex {
    /// A white vertex.
    pub fn new(position: Vec2, tex_coords: Vec2) -> Self {
        Self {
            position,
            tex_coords,
            color: WHITE,
        }
    }

    /// Converts to a macroquad mesh vertex, normalizing the texture coordinates
    /// against `texture_size`. A zero-sized texture yields zero UVs.
    pub fn to_mesh_vertex(&self, texture_size: Vec2) -> Vertex {
        let u = if texture_size.x > 0.0 {
            self.tex_coords.x / texture_size.x
        } else {
            0.0
        };
        let v = if texture_size.y > 0.0 {
            self.tex_coords.y / texture_size.y
        } else {
            0.0
        };
        Vertex::new(self.position.x, self.position.y, 0.0, u, v, self.color)
    }
}

/// Vertices per quad: two triangles, no index sharing.
pub const QUAD_VERTICES: usize = 6;
