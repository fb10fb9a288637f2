use std::path::PathBuf;

use macroquad::prelude::*;

use crate::atlas::SubTextureTable;
use crate::error::TileError;
use crate::tile::TileDesc;

/// Canonical, format-agnostic level.
#[derive(Debug, Clone)]
pub struct IrLevel {
    /// Atlas image, already resolved against the level file's directory.
    pub texture: Option<PathBuf>,
    /// How the sub-texture table is built.
    pub sub_textures: IrSubTextures,
    /// Tiles, in add order.
    pub tiles: Vec<TileDesc>,
}

/// Source of a level's sub-texture table.
#[derive(Debug, Clone, Default)]
pub enum IrSubTextures {
    /// No table; only untextured tiles are valid.
    #[default]
    None,
    /// `count` equal strips of the atlas.
    Split(usize),
    /// Rules file, resolved like `IrLevel::texture`.
    Rules(PathBuf),
    /// Inline rects.
    Rects(SubTextureTable),
}

impl IrSubTextures {
    /// Builds the table against an atlas of `texture_size`.
    pub fn resolve(&self, texture_size: Vec2) -> Result<SubTextureTable, TileError> {
        match self {
            IrSubTextures::None => Ok(SubTextureTable::new()),
            IrSubTextures::Split(count) => Ok(SubTextureTable::uniform(texture_size, *count)),
            IrSubTextures::Rules(path) => SubTextureTable::load_rules(path),
            IrSubTextures::Rects(table) => Ok(table.clone()),
        }
    }
}
