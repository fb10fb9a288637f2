#![warn(missing_docs)]
//! Batched tile geometry for Macroquad.
//!
//! A [`TileSet`] packs many textured tiles into one shared vertex buffer.
//! Each tile owns a contiguous slice of it, addressed through an offset table;
//! changing one tile's vertex count splices the buffer in place and shifts the
//! tiles after it. The buffer is handed to macroquad as a handful of meshes.

mod arena;
mod atlas;
mod batch;
mod error;
mod ir_level;
mod loader {
    pub mod json_loader;
}
mod render {
    pub mod mesh;
}
mod texture;
mod tile;
mod tileset;
mod vertex;

pub use arena::{SliceHandle, VertexArena};
pub use atlas::{parse_rules, SubTextureRect, SubTextureTable};
pub use batch::TileBatch;
pub use error::{ErrorKind, TileError};
pub use ir_level::{IrLevel, IrSubTextures};
pub use loader::json_loader::{decode_level_file_to_ir, decode_level_str};
pub use render::mesh::{build_meshes, draw_meshes, MAX_MESH_VERTICES};
pub use texture::{AtlasTexture, TextureSize};
pub use tile::{ExtensionObject, TextureRule, Tile, TileDesc, TileExtension, MAX_TILE_CELLS};
pub use tileset::TileSet;
pub use vertex::{TileVertex, QUAD_VERTICES};
