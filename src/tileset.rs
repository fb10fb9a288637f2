use std::path::Path;

use macroquad::prelude::*;

use crate::arena::VertexArena;
use crate::atlas::{SubTextureRect, SubTextureTable};
use crate::batch::TileBatch;
use crate::error::TileError;
use crate::ir_level::IrLevel;
use crate::loader::json_loader::decode_level_file_to_ir;
use crate::render::mesh::{build_meshes, draw_meshes};
use crate::texture::AtlasTexture;
use crate::tile::{TextureRule, Tile, TileDesc, TileExtension};
use crate::vertex::TileVertex;

/// Many tiles sharing one atlas and one vertex buffer.
///
/// Every mutation re-derives the render meshes straight away, unless a
/// [`TileBatch`] is open; then the meshes are rebuilt once when the outermost
/// batch closes.
pub struct TileSet<T = Texture2D> {
    tiles: Vec<Tile>,
    arena: VertexArena,
    atlas: SubTextureTable,
    texture: Option<T>,
    meshes: Vec<Mesh>,
    pub(crate) batch_depth: usize,
    flushes: usize,
}

impl<T> Default for TileSet<T> {
    fn default() -> Self {
        Self {
            tiles: Vec::new(),
            arena: VertexArena::new(),
            atlas: SubTextureTable::new(),
            texture: None,
            meshes: Vec::new(),
            batch_depth: 0,
            flushes: 0,
        }
    }
}

impl<T: AtlasTexture> TileSet<T> {
    /// An empty set with no texture.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty set over `texture`.
    pub fn with_atlas(texture: T, atlas: SubTextureTable) -> Self {
        Self {
            texture: Some(texture),
            atlas,
            ..Self::default()
        }
    }

    /// Swaps texture and sub-texture table; every tile is re-applied against
    /// the new table.
    pub fn set_texture(&mut self, texture: T, atlas: SubTextureTable) -> Result<(), TileError> {
        self.texture = Some(texture);
        self.set_sub_textures(atlas)
    }

    /// Swaps the texture and splits it into `count` equal strips.
    pub fn set_texture_uniform(&mut self, texture: T, count: usize) -> Result<(), TileError> {
        let atlas = SubTextureTable::uniform(texture.size(), count);
        self.set_texture(texture, atlas)
    }

    /// Swaps the texture, reading its sub-textures from a rules file.
    pub fn set_texture_with_rules(
        &mut self,
        texture: T,
        rules: impl AsRef<Path>,
    ) -> Result<(), TileError> {
        let atlas = SubTextureTable::load_rules(rules)?;
        self.set_texture(texture, atlas)
    }

    /// Replaces the table, reloading every tile with one flush.
    pub fn set_sub_textures(&mut self, atlas: SubTextureTable) -> Result<(), TileError> {
        self.atlas = atlas;
        let mut batch = self.batch();
        let set = &mut *batch;
        for tile in &mut set.tiles {
            tile.reload_texture(&mut set.arena, &set.atlas)?;
        }
        Ok(())
    }

    /// The atlas texture, if one is set.
    pub fn texture(&self) -> Option<&T> {
        self.texture.as_ref()
    }

    /// The sub-texture table.
    pub fn sub_textures(&self) -> &SubTextureTable {
        &self.atlas
    }

    /// Sub-texture `index` of the table.
    pub fn sub_texture(&self, index: usize) -> Result<SubTextureRect, TileError> {
        self.atlas.get(index)
    }

    /// Size of sub-texture `index`.
    pub fn sub_texture_size(&self, index: usize) -> Result<Vec2, TileError> {
        Ok(self.atlas.get(index)?.size())
    }

    /// Appends a tile built from `desc`; returns its index.
    pub fn add(&mut self, desc: TileDesc) -> Result<usize, TileError> {
        let tile = Tile::new(desc, &mut self.arena, &self.atlas)?;
        Ok(self.push(tile))
    }

    /// Appends a tile carrying `extension`.
    pub fn add_with_extension(
        &mut self,
        desc: TileDesc,
        extension: impl TileExtension + 'static,
    ) -> Result<usize, TileError> {
        let tile = Tile::with_extension(desc, Box::new(extension), &mut self.arena, &self.atlas)?;
        Ok(self.push(tile))
    }

    /// Appends a copy of `tile`, which may come from another set.
    pub fn add_tile(&mut self, tile: &Tile) -> Result<usize, TileError> {
        let tile = tile.copy_into(&mut self.arena, &self.atlas)?;
        Ok(self.push(tile))
    }

    /// Appends a copy of the tile at `index`.
    pub fn duplicate(&mut self, index: usize) -> Result<usize, TileError> {
        let len = self.tiles.len();
        let source = self
            .tiles
            .get(index)
            .ok_or(TileError::TileOutOfRange { index, len })?;
        let copy = source.copy_into(&mut self.arena, &self.atlas)?;
        Ok(self.push(copy))
    }

    fn push(&mut self, tile: Tile) -> usize {
        self.tiles.push(tile);
        self.after_mutation();
        self.tiles.len() - 1
    }

    /// Removes one tile, closing the gap it leaves in the buffer.
    pub fn remove(&mut self, index: usize) -> Result<Tile, TileError> {
        let slice = self.tile(index)?.slice();
        self.arena.remove_slice(slice)?;
        let tile = self.tiles.remove(index);
        for (slot, tile) in self.tiles.iter_mut().enumerate() {
            if let Some(handle) = self.arena.handle(slot) {
                tile.set_slice(handle);
            }
        }
        log::debug!("removed tile {index}, {} left", self.tiles.len());
        self.after_mutation();
        Ok(tile)
    }

    /// Drops every tile and clears the buffer.
    pub fn reset_tiles(&mut self) {
        log::debug!("resetting {} tiles", self.tiles.len());
        self.tiles.clear();
        self.arena.clear();
        self.after_mutation();
    }

    /// Tile `index`.
    pub fn tile(&self, index: usize) -> Result<&Tile, TileError> {
        self.tiles.get(index).ok_or(TileError::TileOutOfRange {
            index,
            len: self.tiles.len(),
        })
    }

    /// Every tile, in buffer order.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// The extension of tile `index` as `E`, or `None` when it is another kind.
    pub fn derived<E: TileExtension + 'static>(&self, index: usize) -> Result<Option<&E>, TileError> {
        Ok(self.tile(index)?.extension_as::<E>())
    }

    /// Mutable access to a tile's extension. Vertices are not rewritten; call
    /// [`TileSet::rebuild`] if the change affects them.
    pub fn derived_mut<E: TileExtension + 'static>(
        &mut self,
        index: usize,
    ) -> Result<Option<&mut E>, TileError> {
        let len = self.tiles.len();
        let tile = self
            .tiles
            .get_mut(index)
            .ok_or(TileError::TileOutOfRange { index, len })?;
        Ok(tile.extension_as_mut::<E>())
    }

    fn with_tile<R>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut Tile, &mut VertexArena, &SubTextureTable) -> Result<R, TileError>,
    ) -> Result<R, TileError> {
        let len = self.tiles.len();
        let tile = self
            .tiles
            .get_mut(index)
            .ok_or(TileError::TileOutOfRange { index, len })?;
        let out = f(tile, &mut self.arena, &self.atlas)?;
        self.after_mutation();
        Ok(out)
    }

    /// Translates tile `index`.
    pub fn move_tile(&mut self, index: usize, offset: Vec2) -> Result<(), TileError> {
        self.with_tile(index, |tile, arena, _| tile.move_by(arena, offset))
    }

    /// Moves tile `index` so its anchored point lands on `position`.
    pub fn set_position(&mut self, index: usize, position: Vec2) -> Result<(), TileError> {
        self.with_tile(index, |tile, arena, _| tile.set_position(arena, position))
    }

    /// Multiplies the zoom of tile `index` by `factor`, following its rule.
    pub fn rescale(&mut self, index: usize, factor: Vec2) -> Result<(), TileError> {
        self.with_tile(index, |tile, arena, atlas| tile.rescale(arena, atlas, factor))
    }

    /// Sets the rule of tile `index`, then rescales it.
    pub fn rescale_with_rule(
        &mut self,
        index: usize,
        factor: Vec2,
        rule: TextureRule,
    ) -> Result<(), TileError> {
        self.with_tile(index, |tile, arena, atlas| {
            tile.rescale_with_rule(arena, atlas, factor, rule)
        })
    }

    /// Requests a new size for tile `index`, following its rule.
    pub fn resize(&mut self, index: usize, size: Vec2) -> Result<(), TileError> {
        self.with_tile(index, |tile, arena, atlas| tile.resize(arena, atlas, size))
    }

    /// Sets the rule of tile `index`, then resizes it.
    pub fn resize_with_rule(
        &mut self,
        index: usize,
        size: Vec2,
        rule: TextureRule,
    ) -> Result<(), TileError> {
        self.with_tile(index, |tile, arena, atlas| {
            tile.resize_with_rule(arena, atlas, size, rule)
        })
    }

    /// Adds `degrees` to the orientation of tile `index`.
    pub fn rotate(&mut self, index: usize, degrees: f32) -> Result<(), TileError> {
        self.with_tile(index, |tile, arena, atlas| tile.rotate(arena, atlas, degrees))
    }

    /// Sets the orientation of tile `index` in degrees.
    pub fn set_orientation(&mut self, index: usize, degrees: f32) -> Result<(), TileError> {
        self.with_tile(index, |tile, arena, atlas| {
            tile.set_orientation(arena, atlas, degrees)
        })
    }

    /// Points tile `index` at another sub-texture. Fails without side effects
    /// when `sub_texture` is not in the table.
    pub fn change_texture_rect(&mut self, index: usize, sub_texture: usize) -> Result<(), TileError> {
        self.with_tile(index, |tile, arena, atlas| {
            tile.change_texture_rect(arena, atlas, sub_texture)
        })
    }

    /// Turns tile `index` into one solid quad.
    pub fn clear_texture(&mut self, index: usize) -> Result<(), TileError> {
        self.with_tile(index, |tile, arena, atlas| tile.clear_texture(arena, atlas))
    }

    /// Recolors tile `index`.
    pub fn change_color(&mut self, index: usize, color: Color) -> Result<(), TileError> {
        self.with_tile(index, |tile, arena, _| tile.change_color(arena, color))
    }

    /// Recolors tile `index` white.
    pub fn reset_color(&mut self, index: usize) -> Result<(), TileError> {
        self.with_tile(index, |tile, arena, _| tile.reset_color(arena))
    }

    /// Tint of tile `index`.
    pub fn color(&self, index: usize) -> Result<Color, TileError> {
        Ok(self.tile(index)?.color())
    }

    /// Changes the rule of tile `index` without rebuilding it.
    pub fn set_texture_rule(&mut self, index: usize, rule: TextureRule) -> Result<(), TileError> {
        self.with_tile(index, |tile, _, _| {
            tile.set_texture_rule(rule);
            Ok(())
        })
    }

    /// Sets the anchor of tile `index`.
    pub fn set_anchor(&mut self, index: usize, anchor: Vec2) -> Result<(), TileError> {
        self.with_tile(index, |tile, _, _| {
            tile.set_anchor(anchor);
            Ok(())
        })
    }

    /// Re-tessellates tile `index` from its current state.
    pub fn rebuild(&mut self, index: usize) -> Result<(), TileError> {
        self.with_tile(index, |tile, arena, atlas| tile.rebuild(arena, atlas))
    }

    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// The shared buffer, every tile's slice in tile order.
    pub fn vertices(&self) -> &[TileVertex] {
        self.arena.vertices()
    }

    /// First vertex of every tile.
    pub fn offsets(&self) -> &[usize] {
        self.arena.offsets()
    }

    /// Vertices owned by tile `index`.
    pub fn vertex_count(&self, index: usize) -> Result<usize, TileError> {
        self.tile(index)?.vertex_count(&self.arena)
    }

    /// Vertices of tile `index`.
    pub fn tile_vertices(&self, index: usize) -> Result<&[TileVertex], TileError> {
        self.tile(index)?.vertices(&self.arena)
    }

    /// The underlying arena.
    pub fn arena(&self) -> &VertexArena {
        &self.arena
    }

    /// Checks the buffer layout and that tile `i` owns slot `i`.
    pub fn check_invariants(&self) -> Result<(), String> {
        self.arena.check_invariants()?;
        if self.arena.slot_count() != self.tiles.len() {
            return Err(format!(
                "{} slots for {} tiles",
                self.arena.slot_count(),
                self.tiles.len()
            ));
        }
        for (i, tile) in self.tiles.iter().enumerate() {
            if self.arena.handle(i) != Some(tile.slice()) {
                return Err(format!("tile {i} holds handle {:?}", tile.slice()));
            }
        }
        Ok(())
    }

    /// Opens a batch: mutations made through the guard skip the per-call
    /// flush, and the meshes are rebuilt once when the outermost guard drops.
    pub fn batch(&mut self) -> TileBatch<'_, T> {
        TileBatch::new(self)
    }

    /// Runs `f` inside a batch. The flush happens even when `f` fails.
    pub fn with_batch<R>(
        &mut self,
        f: impl FnOnce(&mut TileSet<T>) -> Result<R, TileError>,
    ) -> Result<R, TileError> {
        let mut batch = self.batch();
        f(&mut *batch)
    }

    /// Whether a [`TileBatch`] is open.
    pub fn is_batching(&self) -> bool {
        self.batch_depth > 0
    }

    fn after_mutation(&mut self) {
        if self.batch_depth == 0 {
            self.flush();
        }
    }

    /// Rebuilds the render meshes from the vertex buffer.
    pub fn flush(&mut self) {
        let (size, texture) = match &self.texture {
            Some(t) => (t.size(), t.mesh_texture()),
            None => (Vec2::ZERO, None),
        };
        self.meshes = build_meshes(self.arena.vertices(), size, texture);
        self.flushes += 1;
    }

    /// How many times the meshes have been rebuilt.
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// Render meshes as of the last flush.
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Draws the whole set, one `draw_mesh` call per mesh chunk.
    pub fn draw(&self) {
        draw_meshes(&self.meshes);
    }
}

impl<T: AtlasTexture> TileSet<T> {
    /// Builds a populated set from a decoded level, flushing once.
    pub fn from_ir(ir: &IrLevel, texture: Option<T>) -> Result<Self, TileError> {
        let size = texture.as_ref().map_or(Vec2::ZERO, |t| t.size());
        let atlas = ir.sub_textures.resolve(size)?;
        let mut set = Self {
            texture,
            atlas,
            ..Self::default()
        };
        set.with_batch(|set| {
            for desc in &ir.tiles {
                set.add(desc.clone())?;
            }
            Ok(())
        })?;
        Ok(set)
    }
}

impl TileSet<Texture2D> {
    /// Loads a level file and its atlas image.
    pub async fn load_level(path: impl AsRef<Path>) -> Result<Self, TileError> {
        let (ir, _) = decode_level_file_to_ir(path)?;
        let texture = match &ir.texture {
            Some(path) => Some(load_atlas_texture(path).await?),
            None => None,
        };
        Self::from_ir(&ir, texture)
    }

    /// Loads the atlas image and splits it into `count` equal strips.
    pub async fn load_texture(&mut self, path: impl AsRef<Path>, count: usize) -> Result<(), TileError> {
        let texture = load_atlas_texture(path.as_ref()).await?;
        self.set_texture_uniform(texture, count)
    }

    /// Loads the atlas image with a rules file.
    pub async fn load_texture_with_rules(
        &mut self,
        path: impl AsRef<Path>,
        rules: impl AsRef<Path>,
    ) -> Result<(), TileError> {
        let atlas = SubTextureTable::load_rules(rules)?;
        let texture = load_atlas_texture(path.as_ref()).await?;
        self.set_texture(texture, atlas)
    }

    /// Loads the atlas image with an explicit table.
    pub async fn load_texture_with_table(
        &mut self,
        path: impl AsRef<Path>,
        atlas: SubTextureTable,
    ) -> Result<(), TileError> {
        let texture = load_atlas_texture(path.as_ref()).await?;
        self.set_texture(texture, atlas)
    }
}

async fn load_atlas_texture(path: &Path) -> Result<Texture2D, TileError> {
    let texture_error = |reason: String| TileError::Texture {
        path: path.to_path_buf(),
        reason,
    };
    let name = path
        .to_str()
        .ok_or_else(|| texture_error("path is not valid UTF-8".to_owned()))?;
    let tex = macroquad::texture::load_texture(name)
        .await
        .map_err(|e| texture_error(e.to_string()))?;
    tex.set_filter(FilterMode::Nearest);
    log::debug!("loaded texture {} ({}x{})", path.display(), tex.width(), tex.height());
    Ok(tex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::TextureSize;

    fn set() -> TileSet<TextureSize> {
        TileSet::with_atlas(
            TextureSize(vec2(100.0, 50.0)),
            SubTextureTable::uniform(vec2(100.0, 50.0), 2),
        )
    }

    #[test]
    fn add_appends_offsets_and_flushes() {
        let mut set = set();
        let a = set.add(TileDesc::new(Vec2::ZERO, vec2(10.0, 10.0))).unwrap();
        let b = set
            .add(TileDesc::textured(vec2(0.0, 50.0), vec2(100.0, 100.0), 1, TextureRule::RepeatTexture))
            .unwrap();

        assert_eq!((a, b), (0, 1));
        assert_eq!(set.offsets(), &[0, 6]);
        assert_eq!(set.vertices().len(), 6 + 24);
        assert_eq!(set.flush_count(), 2);
        assert_eq!(set.meshes().len(), 1);
        assert_eq!(set.meshes()[0].vertices.len(), 30);
        set.check_invariants().unwrap();
    }

    #[test]
    fn out_of_range_tile_is_an_index_error() {
        let mut set = set();
        let err = set.move_tile(0, Vec2::ONE).unwrap_err();
        assert!(matches!(err, TileError::TileOutOfRange { index: 0, len: 0 }));
        assert!(set.color(4).is_err());
    }

    #[test]
    fn batch_flushes_once_on_close() {
        let mut set = set();
        let flushes = set.flush_count();
        {
            let mut batch = set.batch();
            for i in 0..10 {
                batch
                    .add(TileDesc::new(vec2(i as f32 * 10.0, 0.0), vec2(10.0, 10.0)))
                    .unwrap();
            }
            batch.move_tile(3, vec2(1.0, 1.0)).unwrap();
            assert!(batch.is_batching());
            assert_eq!(batch.flush_count(), flushes);
        }
        assert!(!set.is_batching());
        assert_eq!(set.flush_count(), flushes + 1);
        assert_eq!(set.meshes()[0].vertices.len(), 60);
    }

    #[test]
    fn batch_flushes_even_when_the_body_fails() {
        let mut set = set();
        let flushes = set.flush_count();
        let result = set.with_batch(|set| {
            set.add(TileDesc::new(Vec2::ZERO, vec2(5.0, 5.0)))?;
            set.change_texture_rect(0, 9)
        });

        assert!(result.is_err());
        assert_eq!(set.flush_count(), flushes + 1);
        assert_eq!(set.meshes()[0].vertices.len(), 6);
    }

    #[test]
    fn nested_batches_flush_at_the_outermost_close() {
        let mut set = set();
        let flushes = set.flush_count();
        {
            let mut outer = set.batch();
            {
                let mut inner = outer.batch();
                inner.add(TileDesc::new(Vec2::ZERO, Vec2::ONE)).unwrap();
            }
            assert_eq!(outer.flush_count(), flushes);
        }
        assert_eq!(set.flush_count(), flushes + 1);
    }

    #[test]
    fn remove_closes_the_gap() {
        let mut set = set();
        set.add(TileDesc::new(Vec2::ZERO, vec2(10.0, 10.0))).unwrap();
        set.add(TileDesc::textured(Vec2::ZERO, vec2(100.0, 100.0), 0, TextureRule::RepeatTexture))
            .unwrap();
        set.add(TileDesc::new(vec2(7.0, 7.0), vec2(1.0, 1.0)).with_color(RED))
            .unwrap();

        let removed = set.remove(1).unwrap();

        assert_eq!(removed.sub_texture_index(), Some(0));
        assert_eq!(set.len(), 2);
        assert_eq!(set.offsets(), &[0, 6]);
        assert!(set.tile_vertices(1).unwrap().iter().all(|v| v.color == RED));
        set.check_invariants().unwrap();

        // remaining tiles still mutate their own slices
        set.move_tile(1, vec2(1.0, 0.0)).unwrap();
        assert_eq!(set.tile_vertices(1).unwrap()[0].position, vec2(8.0, 7.0));
    }

    #[test]
    fn reset_clears_everything() {
        let mut set = set();
        set.add(TileDesc::new(Vec2::ZERO, vec2(10.0, 10.0))).unwrap();
        set.reset_tiles();

        assert!(set.is_empty());
        assert!(set.vertices().is_empty());
        assert!(set.offsets().is_empty());
        assert!(set.meshes().is_empty());
        set.check_invariants().unwrap();
    }

    #[test]
    fn new_table_reloads_every_tile() {
        let mut set = set();
        set.add(TileDesc::textured(Vec2::ZERO, vec2(50.0, 50.0), 1, TextureRule::RepeatTexture))
            .unwrap();

        set.set_texture_uniform(TextureSize(vec2(25.0, 25.0)), 1).unwrap();

        assert_eq!(set.tile(0).unwrap().sub_texture_index(), Some(0));
        assert_eq!(set.vertex_count(0).unwrap(), 4 * 6);
        set.check_invariants().unwrap();
    }

    #[test]
    fn duplicate_copies_state_into_a_new_slice() {
        let mut set = set();
        set.add(
            TileDesc::textured(vec2(3.0, 4.0), vec2(60.0, 50.0), 0, TextureRule::RepeatTexture)
                .with_color(GREEN),
        )
        .unwrap();

        let copy = set.duplicate(0).unwrap();

        assert_eq!(copy, 1);
        assert_eq!(set.tile_vertices(0).unwrap(), set.tile_vertices(1).unwrap());
        set.check_invariants().unwrap();
    }

    #[test]
    fn from_ir_builds_every_tile_with_one_flush() {
        use crate::ir_level::IrSubTextures;

        let ir = IrLevel {
            texture: None,
            sub_textures: IrSubTextures::Split(2),
            tiles: vec![
                TileDesc::textured(Vec2::ZERO, vec2(100.0, 50.0), 0, TextureRule::RepeatTexture),
                TileDesc::new(vec2(0.0, 60.0), vec2(10.0, 10.0)),
            ],
        };
        let set = TileSet::from_ir(&ir, Some(TextureSize(vec2(100.0, 50.0)))).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.offsets(), &[0, 12]);
        assert_eq!(set.flush_count(), 1);
        set.check_invariants().unwrap();
    }

    #[test]
    fn from_ir_rejects_unknown_sub_texture() {
        use crate::ir_level::IrSubTextures;

        let ir = IrLevel {
            texture: None,
            sub_textures: IrSubTextures::None,
            tiles: vec![TileDesc::textured(Vec2::ZERO, Vec2::ONE, 0, TextureRule::RepeatTexture)],
        };
        let err = TileSet::from_ir(&ir, None::<TextureSize>).err().unwrap();
        assert!(matches!(err, TileError::SubTextureOutOfRange { index: 0, len: 0 }));
    }

    #[test]
    fn uv_normalization_uses_texture_size() {
        let mut set = set();
        set.add(TileDesc::textured(Vec2::ZERO, vec2(50.0, 50.0), 1, TextureRule::RepeatTexture))
            .unwrap();
        let mesh = &set.meshes()[0];
        assert_eq!(mesh.vertices[0].uv, vec2(0.5, 0.0));
        assert!(mesh.texture.is_none());
    }
}
