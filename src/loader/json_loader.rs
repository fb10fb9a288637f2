use crate::atlas::SubTextureTable;
use crate::error::TileError;
use crate::ir_level::*;
use crate::tile::{TextureRule, TileDesc};
use macroquad::prelude::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
struct JsonLevel {
    #[serde(default)]
    texture: Option<String>,
    #[serde(default)]
    sub_textures: Option<JsonSubTextures>,
    #[serde(default)]
    tiles: Vec<JsonTile>,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum JsonSubTextures {
    Split(usize),
    Rules(String),
    Rects(SubTextureTable),
}

#[derive(Deserialize)]
struct JsonTile {
    position: [f32; 2],
    size: [f32; 2],
    #[serde(default = "first_sub_texture")]
    sub_texture: Option<usize>,
    #[serde(default)]
    rule: TextureRule,
    #[serde(default = "unit_scale")]
    scale: [f32; 2],
    #[serde(default = "opaque_white")]
    color: [u8; 4],
    #[serde(default)]
    anchor: [f32; 2],
    #[serde(default)]
    angle: f32,
}

fn first_sub_texture() -> Option<usize> {
    Some(0)
}
fn unit_scale() -> [f32; 2] {
    [1.0, 1.0]
}
fn opaque_white() -> [u8; 4] {
    [255, 255, 255, 255]
}

impl From<JsonTile> for TileDesc {
    fn from(t: JsonTile) -> Self {
        let [r, g, b, a] = t.color;
        TileDesc {
            position: Vec2::from(t.position),
            size: Vec2::from(t.size),
            sub_texture: t.sub_texture,
            rule: t.rule,
            scale: Vec2::from(t.scale),
            color: Color::from_rgba(r, g, b, a),
            anchor: Vec2::from(t.anchor),
            angle: t.angle,
        }
    }
}

/// Decodes level JSON; relative paths resolve against `level_dir`. `origin`
/// only labels errors.
pub fn decode_level_str(json: &str, origin: &Path, level_dir: &Path) -> Result<IrLevel, TileError> {
    let j: JsonLevel = serde_json::from_str(json).map_err(|source| TileError::Json {
        path: origin.to_path_buf(),
        source,
    })?;

    let sub_textures = match j.sub_textures {
        None => IrSubTextures::None,
        Some(JsonSubTextures::Split(count)) => IrSubTextures::Split(count),
        Some(JsonSubTextures::Rules(rel)) => IrSubTextures::Rules(level_dir.join(rel)),
        Some(JsonSubTextures::Rects(table)) => IrSubTextures::Rects(table),
    };

    Ok(IrLevel {
        texture: j.texture.map(|rel| level_dir.join(rel)),
        sub_textures,
        tiles: j.tiles.into_iter().map(TileDesc::from).collect(),
    })
}

/// Reads a `.json` level file; also returns its directory.
pub fn decode_level_file_to_ir(path: impl AsRef<Path>) -> Result<(IrLevel, PathBuf), TileError> {
    let p = path.as_ref();
    if p.extension().and_then(|e| e.to_str()) != Some("json") {
        return Err(TileError::UnsupportedFormat(p.display().to_string()));
    }

    let txt = std::fs::read_to_string(p).map_err(|source| TileError::Io {
        path: p.to_path_buf(),
        source,
    })?;

    let level_dir = p
        .parent()
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./"));

    let ir = decode_level_str(&txt, p, &level_dir)?;
    log::debug!("decoded {} with {} tiles", p.display(), ir.tiles.len());
    Ok((ir, level_dir))
}
