use macroquad::prelude::*;

/// The backing atlas image of a tile set.
///
/// Tessellation only needs the image dimensions; the handle itself is kept for
/// draw calls.
pub trait AtlasTexture {
    /// Width and height in pixels.
    fn size(&self) -> Vec2;

    /// Texture bound to the render meshes, if this handle is drawable.
    fn mesh_texture(&self) -> Option<Texture2D> {
        None
    }
}

impl AtlasTexture for Texture2D {
    fn size(&self) -> Vec2 {
        Texture2D::size(self)
    }

    fn mesh_texture(&self) -> Option<Texture2D> {
        Some(self.clone())
    }
}

/// Dimensions-only texture, for building geometry without a graphics context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureSize(pub Vec2);

impl AtlasTexture for TextureSize {
    fn size(&self) -> Vec2 {
        self.0
    }
}
