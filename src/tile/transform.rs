use macroquad::prelude::*;

use super::{normalize_angle, TextureRule, Tile};
use crate::arena::VertexArena;
use crate::atlas::SubTextureTable;
use crate::error::TileError;

impl Tile {
    /// Translates the tile, patching its vertices in place.
    pub fn move_by(&mut self, arena: &mut VertexArena, offset: Vec2) -> Result<(), TileError> {
        let out = arena.slice_mut(self.slice)?;
        for v in out.iter_mut() {
            v.position += offset;
        }
        self.rect.x += offset.x;
        self.rect.y += offset.y;
        Ok(())
    }

    /// Moves the tile so its anchored point lands on `position`.
    pub fn set_position(
        &mut self,
        arena: &mut VertexArena,
        position: Vec2,
    ) -> Result<(), TileError> {
        let offset = position - self.position();
        self.move_by(arena, offset)
    }

    /// Zooms the tile by `factor` relative to its current state, following the
    /// current [`TextureRule`].
    pub fn rescale(
        &mut self,
        arena: &mut VertexArena,
        atlas: &SubTextureTable,
        factor: Vec2,
    ) -> Result<(), TileError> {
        let (size, scale) = self.rule.rescale(self.size(), self.scale, factor);
        self.rect.w = size.x;
        self.rect.h = size.y;
        self.scale = scale;
        self.rebuild(arena, atlas)
    }

    /// Sets the rule, then rescales under it.
    pub fn rescale_with_rule(
        &mut self,
        arena: &mut VertexArena,
        atlas: &SubTextureTable,
        factor: Vec2,
        rule: TextureRule,
    ) -> Result<(), TileError> {
        self.rule = rule;
        self.rescale(arena, atlas, factor)
    }

    /// Requests a new tile size; the current [`TextureRule`] decides how much
    /// of it is honoured.
    pub fn resize(
        &mut self,
        arena: &mut VertexArena,
        atlas: &SubTextureTable,
        size: Vec2,
    ) -> Result<(), TileError> {
        let (size, scale) = self.rule.resize(self.size(), self.scale, size);
        self.rect.w = size.x;
        self.rect.h = size.y;
        self.scale = scale;
        self.rebuild(arena, atlas)
    }

    /// Sets the rule, then resizes under it.
    pub fn resize_with_rule(
        &mut self,
        arena: &mut VertexArena,
        atlas: &SubTextureTable,
        size: Vec2,
        rule: TextureRule,
    ) -> Result<(), TileError> {
        self.rule = rule;
        self.resize(arena, atlas, size)
    }

    /// Adds `degrees` to the orientation.
    pub fn rotate(
        &mut self,
        arena: &mut VertexArena,
        atlas: &SubTextureTable,
        degrees: f32,
    ) -> Result<(), TileError> {
        self.angle = normalize_angle(self.angle + degrees);
        self.rebuild(arena, atlas)
    }

    /// Sets the absolute orientation in degrees.
    pub fn set_orientation(
        &mut self,
        arena: &mut VertexArena,
        atlas: &SubTextureTable,
        degrees: f32,
    ) -> Result<(), TileError> {
        self.angle = normalize_angle(degrees);
        self.rebuild(arena, atlas)
    }

    /// Switches to another sub-texture.
    ///
    /// An out-of-range index is rejected without touching the tile. When both
    /// sub-textures share a size only the texture coordinates are shifted.
    pub fn change_texture_rect(
        &mut self,
        arena: &mut VertexArena,
        atlas: &SubTextureTable,
        index: usize,
    ) -> Result<(), TileError> {
        let next = atlas.get(index)?;
        let current = self.sub_texture(atlas)?;

        match current {
            Some(current) if current.size() == next.size() => {
                let shift = next.position() - current.position();
                for v in arena.slice_mut(self.slice)?.iter_mut() {
                    v.tex_coords += shift;
                }
                self.sub_texture = Some(index);
                Ok(())
            }
            _ => {
                self.sub_texture = Some(index);
                self.rebuild(arena, atlas)
            }
        }
    }

    /// Drops the sub-texture; the tile becomes one solid-color quad.
    pub fn clear_texture(
        &mut self,
        arena: &mut VertexArena,
        atlas: &SubTextureTable,
    ) -> Result<(), TileError> {
        self.sub_texture = None;
        self.rebuild(arena, atlas)
    }

    /// Re-applies the sub-texture after the table changed. A stored index past
    /// the end of the new table is clamped to the last entry.
    pub fn reload_texture(
        &mut self,
        arena: &mut VertexArena,
        atlas: &SubTextureTable,
    ) -> Result<(), TileError> {
        if let Some(index) = self.sub_texture {
            if atlas.is_empty() {
                log::warn!("sub-texture {index} dropped: table is empty");
                self.sub_texture = None;
            } else if index >= atlas.len() {
                log::warn!(
                    "sub-texture {index} clamped to {} after reload",
                    atlas.len() - 1
                );
                self.sub_texture = Some(atlas.len() - 1);
            }
        }
        self.rebuild(arena, atlas)
    }

    /// Recolors every vertex of the tile in place.
    pub fn change_color(&mut self, arena: &mut VertexArena, color: Color) -> Result<(), TileError> {
        self.color = color;
        let out = arena.slice_mut(self.slice)?;
        for v in out.iter_mut() {
            v.color = color;
        }
        if let Some(ext) = &self.extension {
            ext.decorate(self, out);
        }
        Ok(())
    }

    /// Recolors the tile white.
    pub fn reset_color(&mut self, arena: &mut VertexArena) -> Result<(), TileError> {
        self.change_color(arena, WHITE)
    }

    /// Changes the rule without rebuilding; it applies from the next resize,
    /// rescale or rebuild.
    pub fn set_texture_rule(&mut self, rule: TextureRule) {
        self.rule = rule;
    }

    /// Moves the anchored point; the rectangle stays where it is.
    pub fn set_anchor(&mut self, anchor: Vec2) {
        self.anchor = anchor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::SubTextureRect;
    use crate::tile::TileDesc;

    fn atlas() -> SubTextureTable {
        SubTextureTable::from_rects(vec![
            SubTextureRect::new(0.0, 0.0, 50.0, 50.0),
            SubTextureRect::new(50.0, 0.0, 50.0, 50.0),
            SubTextureRect::new(0.0, 50.0, 20.0, 20.0),
        ])
    }

    fn textured(arena: &mut VertexArena, rule: TextureRule) -> Tile {
        Tile::new(
            TileDesc::textured(vec2(10.0, 10.0), vec2(100.0, 100.0), 0, rule),
            arena,
            &atlas(),
        )
        .unwrap()
    }

    #[test]
    fn move_round_trip_is_exact() {
        let mut arena = VertexArena::new();
        let mut tile = textured(&mut arena, TextureRule::RepeatTexture);
        let before = tile.vertices(&arena).unwrap().to_vec();

        tile.move_by(&mut arena, vec2(13.0, -7.0)).unwrap();
        assert_ne!(tile.vertices(&arena).unwrap(), before.as_slice());
        tile.move_by(&mut arena, vec2(-13.0, 7.0)).unwrap();

        assert_eq!(tile.vertices(&arena).unwrap(), before.as_slice());
        assert_eq!(tile.top_left(), vec2(10.0, 10.0));
    }

    #[test]
    fn set_position_uses_anchor() {
        let mut arena = VertexArena::new();
        let mut tile = textured(&mut arena, TextureRule::RepeatTexture);
        tile.set_anchor(vec2(0.5, 0.5));

        tile.set_position(&mut arena, vec2(0.0, 0.0)).unwrap();
        assert_eq!(tile.top_left(), vec2(-50.0, -50.0));
        assert_eq!(tile.vertices(&arena).unwrap()[0].position, vec2(-50.0, -50.0));
    }

    #[test]
    fn keep_size_rescale_leaves_rect_alone() {
        let mut arena = VertexArena::new();
        let mut tile = textured(&mut arena, TextureRule::KeepSize);
        let size = tile.size();

        tile.rescale(&mut arena, &atlas(), vec2(2.0, 2.0)).unwrap();

        assert_eq!(tile.size(), size);
        assert_eq!(tile.scale(), vec2(2.0, 2.0));
        assert_eq!(tile.vertex_count(&arena).unwrap(), 6);
    }

    #[test]
    fn fill_space_resize_recomputes_scale() {
        let mut arena = VertexArena::new();
        let mut tile = textured(&mut arena, TextureRule::AdjustableSize);
        tile.rescale(&mut arena, &atlas(), vec2(3.0, 3.0)).unwrap();

        tile.resize_with_rule(&mut arena, &atlas(), vec2(75.0, 150.0), TextureRule::FillSpace)
            .unwrap();

        assert_eq!(tile.scale(), vec2(1.5, 3.0));
        assert_eq!(tile.vertex_count(&arena).unwrap(), 6);
    }

    #[test]
    fn same_size_texture_change_shifts_coordinates() {
        let mut arena = VertexArena::new();
        let mut tile = textured(&mut arena, TextureRule::RepeatTexture);
        let before = tile.vertices(&arena).unwrap().to_vec();

        tile.change_texture_rect(&mut arena, &atlas(), 1).unwrap();

        let after = tile.vertices(&arena).unwrap();
        assert_eq!(after.len(), before.len());
        for (a, b) in after.iter().zip(&before) {
            assert_eq!(a.position, b.position);
            assert_eq!(a.tex_coords, b.tex_coords + vec2(50.0, 0.0));
        }
        assert_eq!(tile.sub_texture_index(), Some(1));
    }

    #[test]
    fn differently_sized_texture_change_retessellates() {
        let mut arena = VertexArena::new();
        let mut tile = textured(&mut arena, TextureRule::RepeatTexture);
        assert_eq!(tile.vertex_count(&arena).unwrap(), 24);

        tile.change_texture_rect(&mut arena, &atlas(), 2).unwrap();
        assert_eq!(tile.vertex_count(&arena).unwrap(), 5 * 5 * 6);
    }

    #[test]
    fn invalid_texture_change_is_a_no_op() {
        let mut arena = VertexArena::new();
        let mut tile = textured(&mut arena, TextureRule::RepeatTexture);
        let before = arena.vertices().to_vec();

        let err = tile.change_texture_rect(&mut arena, &atlas(), 3).unwrap_err();

        assert!(matches!(err, TileError::SubTextureOutOfRange { index: 3, .. }));
        assert_eq!(arena.vertices(), before.as_slice());
        assert_eq!(tile.sub_texture_index(), Some(0));
    }

    #[test]
    fn reload_clamps_to_last_sub_texture() {
        let mut arena = VertexArena::new();
        let mut tile = Tile::new(
            TileDesc::textured(Vec2::ZERO, vec2(40.0, 40.0), 2, TextureRule::RepeatTexture),
            &mut arena,
            &atlas(),
        )
        .unwrap();

        let smaller = SubTextureTable::uniform(vec2(80.0, 40.0), 2);
        tile.reload_texture(&mut arena, &smaller).unwrap();

        assert_eq!(tile.sub_texture_index(), Some(1));
        assert_eq!(tile.vertex_count(&arena).unwrap(), 6);
    }

    #[test]
    fn color_change_touches_only_color() {
        let mut arena = VertexArena::new();
        let mut tile = textured(&mut arena, TextureRule::RepeatTexture);
        let before = tile.vertices(&arena).unwrap().to_vec();

        tile.change_color(&mut arena, BLUE).unwrap();
        let after = tile.vertices(&arena).unwrap();
        assert!(after.iter().all(|v| v.color == BLUE));
        assert!(after.iter().zip(&before).all(|(a, b)| a.position == b.position));

        tile.reset_color(&mut arena).unwrap();
        assert_eq!(tile.color(), WHITE);
    }

    #[test]
    fn rotate_wraps_past_full_turn() {
        let mut arena = VertexArena::new();
        let mut tile = textured(&mut arena, TextureRule::RepeatTexture);
        tile.rotate(&mut arena, &atlas(), 300.0).unwrap();
        tile.rotate(&mut arena, &atlas(), 90.0).unwrap();
        assert_eq!(tile.angle(), 30.0);

        tile.set_orientation(&mut arena, &atlas(), -90.0).unwrap();
        assert_eq!(tile.angle(), 270.0);
        assert_eq!(tile.vertex_count(&arena).unwrap(), 24);
    }
}
