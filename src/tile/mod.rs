//! A single tile: its rectangle, texture policy and the slice of the shared
//! vertex buffer it writes into.

mod extension;
mod frame;
mod rule;
mod tessellate;
mod transform;

use macroquad::prelude::*;

use crate::arena::{SliceHandle, VertexArena};
use crate::atlas::{SubTextureRect, SubTextureTable};
use crate::error::TileError;
use crate::vertex::TileVertex;

pub use extension::{ExtensionObject, TileExtension};
pub use rule::TextureRule;
pub use tessellate::MAX_TILE_CELLS;

use frame::Frame;
use tessellate::Layout;

/// Construction parameters for a [`Tile`].
#[derive(Debug, Clone, PartialEq)]
pub struct TileDesc {
    /// Top-left corner, in scene units.
    pub position: Vec2,
    /// Width and height, in scene units.
    pub size: Vec2,
    /// `None` draws a single solid-color quad.
    pub sub_texture: Option<usize>,
    /// Reaction to resize and rescale.
    pub rule: TextureRule,
    /// Texture zoom relative to 1:1.
    pub scale: Vec2,
    /// Tint of every vertex.
    pub color: Color,
    /// Fraction of the size locating the point reported by [`Tile::position`].
    pub anchor: Vec2,
    /// Degrees, clockwise in screen space.
    pub angle: f32,
}

impl TileDesc {
    /// An untextured, white tile.
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            sub_texture: None,
            rule: TextureRule::default(),
            scale: Vec2::ONE,
            color: WHITE,
            anchor: Vec2::ZERO,
            angle: 0.0,
        }
    }

    /// Textured tile with a 1:1 zoom.
    pub fn textured(position: Vec2, size: Vec2, sub_texture: usize, rule: TextureRule) -> Self {
        Self {
            sub_texture: Some(sub_texture),
            rule,
            ..Self::new(position, size)
        }
    }

    /// Samples sub-texture `index`.
    pub fn with_sub_texture(mut self, index: usize) -> Self {
        self.sub_texture = Some(index);
        self
    }

    /// Sets the texture rule.
    pub fn with_rule(mut self, rule: TextureRule) -> Self {
        self.rule = rule;
        self
    }

    /// Sets the texture zoom.
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the tint.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Sets the anchor as a fraction of the size.
    pub fn with_anchor(mut self, anchor: Vec2) -> Self {
        self.anchor = anchor;
        self
    }

    /// Sets the orientation in degrees.
    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }
}

fn normalize_angle(angle: f32) -> f32 {
    angle.rem_euclid(360.0)
}

/// A placed tile and the geometry state its vertices are rebuilt from.
#[derive(Debug, Clone)]
pub struct Tile {
    rect: Rect,
    angle: f32,
    scale: Vec2,
    rule: TextureRule,
    sub_texture: Option<usize>,
    color: Color,
    anchor: Vec2,
    slice: SliceHandle,
    extension: Option<Box<dyn TileExtension>>,
}

impl Tile {
    /// Reserves a slice at the end of `arena` and tessellates into it.
    pub fn new(
        desc: TileDesc,
        arena: &mut VertexArena,
        atlas: &SubTextureTable,
    ) -> Result<Self, TileError> {
        Self::build(desc, None, arena, atlas)
    }

    /// Like [`Tile::new`], carrying an extension payload.
    pub fn with_extension(
        desc: TileDesc,
        extension: Box<dyn TileExtension>,
        arena: &mut VertexArena,
        atlas: &SubTextureTable,
    ) -> Result<Self, TileError> {
        Self::build(desc, Some(extension), arena, atlas)
    }

    fn build(
        desc: TileDesc,
        extension: Option<Box<dyn TileExtension>>,
        arena: &mut VertexArena,
        atlas: &SubTextureTable,
    ) -> Result<Self, TileError> {
        if let Some(index) = desc.sub_texture {
            atlas.get(index)?;
        }

        let mut tile = Tile {
            rect: Rect::new(desc.position.x, desc.position.y, desc.size.x, desc.size.y),
            angle: normalize_angle(desc.angle),
            scale: desc.scale,
            rule: desc.rule,
            sub_texture: desc.sub_texture,
            color: desc.color,
            anchor: desc.anchor,
            slice: arena.push_slice(0),
            extension,
        };
        tile.rebuild(arena, atlas)?;
        Ok(tile)
    }

    /// Copies this tile, state and extension included, into a fresh slice at
    /// the end of `arena`.
    pub fn copy_into(
        &self,
        arena: &mut VertexArena,
        atlas: &SubTextureTable,
    ) -> Result<Self, TileError> {
        self.sub_texture(atlas)?;
        let mut tile = self.clone();
        tile.slice = arena.push_slice(0);
        tile.rebuild(arena, atlas)?;
        Ok(tile)
    }

    /// Re-tessellates the tile into its slice, resizing the slice when the
    /// vertex count changes.
    pub fn rebuild(
        &mut self,
        arena: &mut VertexArena,
        atlas: &SubTextureTable,
    ) -> Result<(), TileError> {
        let sub = self.sub_texture.map(|index| atlas.get(index)).transpose()?;
        let size = self.size();

        let layout = match sub {
            Some(sub) if size.x > 0.0 && size.y > 0.0 => {
                if self.rule == TextureRule::FillSpace && sub.width > 0.0 && sub.height > 0.0 {
                    self.scale = size / sub.size();
                    Layout::stretched(size, self.scale, sub)
                } else {
                    Layout::plan(size, self.scale, Some(sub))
                }
            }
            _ => {
                self.rule = TextureRule::FillSpace;
                Layout::Solid { sub }
            }
        };

        arena.resize_slice(self.slice, layout.vertex_count())?;

        let frame = self.frame();
        let color = self.color;
        let out = arena.slice_mut(self.slice)?;
        layout.write(size, out);
        for v in out.iter_mut() {
            v.position = frame.to_world(v.position);
            v.color = color;
        }
        if let Some(ext) = &self.extension {
            ext.decorate(self, out);
        }
        Ok(())
    }

    fn frame(&self) -> Frame {
        Frame::new(self.rect.point(), self.angle)
    }

    /// Handle to this tile's vertices in the arena.
    pub fn slice(&self) -> SliceHandle {
        self.slice
    }

    pub(crate) fn set_slice(&mut self, slice: SliceHandle) {
        self.slice = slice;
    }

    /// This tile's vertices.
    pub fn vertices<'a>(&self, arena: &'a VertexArena) -> Result<&'a [TileVertex], TileError> {
        arena.slice(self.slice)
    }

    /// Length of this tile's slice.
    pub fn vertex_count(&self, arena: &VertexArena) -> Result<usize, TileError> {
        arena.slice_len(self.slice)
    }

    /// Unrotated rectangle: top-left corner and size.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Width and height.
    pub fn size(&self) -> Vec2 {
        self.rect.size()
    }

    /// Unrotated width.
    pub fn width(&self) -> f32 {
        self.rect.w
    }

    /// Unrotated height.
    pub fn height(&self) -> f32 {
        self.rect.h
    }

    /// The anchored point, `top_left + size * anchor` in the tile's frame.
    pub fn position(&self) -> Vec2 {
        self.frame().to_world(self.size() * self.anchor)
    }

    /// Corner the tile rotates about.
    pub fn top_left(&self) -> Vec2 {
        self.rect.point()
    }

    /// Corner after rotation.
    pub fn top_right(&self) -> Vec2 {
        self.frame().to_world(vec2(self.rect.w, 0.0))
    }

    /// Corner after rotation.
    pub fn bottom_left(&self) -> Vec2 {
        self.frame().to_world(vec2(0.0, self.rect.h))
    }

    /// Corner after rotation.
    pub fn bottom_right(&self) -> Vec2 {
        self.frame().to_world(self.size())
    }

    /// Whether `point` lies inside the (rotated) rectangle, edges included.
    pub fn contains(&self, point: Vec2) -> bool {
        let local = self.frame().to_local(point);
        (0.0..=self.rect.w).contains(&local.x) && (0.0..=self.rect.h).contains(&local.y)
    }

    /// Texture zoom.
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Current texture rule.
    pub fn texture_rule(&self) -> TextureRule {
        self.rule
    }

    /// Index into the sub-texture table, `None` when untextured.
    pub fn sub_texture_index(&self) -> Option<usize> {
        self.sub_texture
    }

    /// The sub-texture this tile samples, if any.
    pub fn sub_texture(
        &self,
        atlas: &SubTextureTable,
    ) -> Result<Option<SubTextureRect>, TileError> {
        self.sub_texture.map(|index| atlas.get(index)).transpose()
    }

    /// Size of the sampled sub-texture, if any.
    pub fn sub_texture_size(&self, atlas: &SubTextureTable) -> Result<Option<Vec2>, TileError> {
        Ok(self.sub_texture(atlas)?.map(|sub| sub.size()))
    }

    /// Current tint.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Orientation in degrees, within `0..360`.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Anchor, as a fraction of the size.
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// The extension's kind, or `"tile"` for plain tiles.
    pub fn kind(&self) -> &'static str {
        self.extension.as_ref().map_or("tile", |ext| ext.kind())
    }

    /// The extension payload, if any.
    pub fn extension(&self) -> Option<&dyn TileExtension> {
        self.extension.as_deref()
    }

    /// The extension downcast to `E`, if it is one.
    pub fn extension_as<E: TileExtension + 'static>(&self) -> Option<&E> {
        self.extension.as_ref()?.as_any().downcast_ref::<E>()
    }

    /// Mutable counterpart of [`Tile::extension_as`].
    pub fn extension_as_mut<E: TileExtension + 'static>(&mut self) -> Option<&mut E> {
        self.extension.as_mut()?.as_any_mut().downcast_mut::<E>()
    }

    /// Swaps the extension. Vertices are not rewritten until the next rebuild.
    pub fn set_extension(
        &mut self,
        extension: Option<Box<dyn TileExtension>>,
    ) -> Option<Box<dyn TileExtension>> {
        std::mem::replace(&mut self.extension, extension)
    }
}
